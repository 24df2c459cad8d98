//! Dispatch table and shared helpers for action handlers.
//!
//! The action catalog is a closed enum, so the "handler table" is a
//! total match: every [`ActionType`] maps to exactly one handler with
//! the signature `(agent, target, world, contracts, tick) ->
//! Result<ActionEffect, ActionError>`. Unknown planner steps never
//! reach this module — they fail in the plan executor's parser and the
//! orchestrator resets the agent to idle.
//!
//! Every handler path ends by resetting the agent's action slot (the
//! orchestrator's "give me a new directive" signal), with one
//! exception: a move still underway keeps its slot and reports
//! [`ActionEffect::InProgress`].

use tracing::warn;

use steading_types::{ActionTarget, ActionType, Agent, AgentId, Position};
use steading_world::{ContractBook, EntityRegistry};

use crate::error::ActionError;

use super::{contracts, crafting, gathering, movement, storage, survival, trade};

/// Maximum distance for pickups and harvest swings.
pub const PICKUP_RANGE: f64 = 1.5;

/// Maximum distance for crafting stations, trading, and storage.
pub const INTERACT_RANGE: f64 = 2.0;

/// Maximum distance to a socializing partner.
pub const SOCIAL_RANGE: f64 = 3.0;

/// Maximum distance from a contract's build site for a build step.
pub const BUILD_RANGE: f64 = 5.0;

/// What an executed action did to the agent's directive slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEffect {
    /// The action finished; its world effects are applied and the slot
    /// was reset.
    Completed,
    /// The action continues next tick (move only); the slot is intact
    /// and the timer re-armed.
    InProgress,
}

/// Execute the agent's current action.
///
/// Dispatches to the per-type handler, then applies the slot-reset
/// protocol. A missing current action is an invariant warning and a
/// no-op.
///
/// # Errors
///
/// Propagates the handler's [`ActionError`] after resetting the slot;
/// all such errors are validation failures the orchestrator logs and
/// absorbs.
pub fn execute(
    agent_id: AgentId,
    registry: &mut EntityRegistry,
    contracts: &mut ContractBook,
    tick: u64,
) -> Result<ActionEffect, ActionError> {
    let Some(current) = registry.agent(agent_id).and_then(|a| a.current_action.clone()) else {
        warn!(agent = %agent_id, "execute called with no current action");
        return Ok(ActionEffect::Completed);
    };

    let result = match current.action {
        ActionType::Move => movement::step(agent_id, &current.target, registry, tick),
        ActionType::Pickup => gathering::pickup(agent_id, &current.target, registry),
        ActionType::Chop => {
            gathering::harvest(agent_id, &current.target, registry, gathering::HarvestMode::Chop)
        }
        ActionType::Mine => {
            gathering::harvest(agent_id, &current.target, registry, gathering::HarvestMode::Mine)
        }
        ActionType::Craft => crafting::craft(agent_id, &current.target, registry),
        ActionType::Eat => survival::eat(agent_id, &current.target, registry),
        ActionType::Sleep => survival::sleep(agent_id, registry),
        ActionType::Socialize => survival::socialize(agent_id, registry),
        ActionType::Idle => Ok(ActionEffect::Completed),
        ActionType::Buy => trade::buy(agent_id, &current.target, registry),
        ActionType::Sell => trade::sell(agent_id, &current.target, registry),
        ActionType::Store => storage::store(agent_id, &current.target, registry),
        ActionType::Retrieve => storage::retrieve(agent_id, &current.target, registry),
        ActionType::Place => storage::place(agent_id, registry),
        ActionType::DraftContract => {
            contracts::draft(agent_id, &current.target, registry, contracts, tick)
        }
        ActionType::SignContract => {
            contracts::sign(agent_id, &current.target, registry, contracts)
        }
        ActionType::PayPrepayment => {
            contracts::pay_prepayment(agent_id, &current.target, registry, contracts)
        }
        ActionType::BuildStep => {
            contracts::build_step(agent_id, &current.target, registry, contracts)
        }
        ActionType::PayFinal => {
            contracts::pay_final(agent_id, &current.target, registry, contracts)
        }
    };

    match result {
        Ok(ActionEffect::InProgress) => Ok(ActionEffect::InProgress),
        Ok(ActionEffect::Completed) => {
            reset_slot(agent_id, registry);
            Ok(ActionEffect::Completed)
        }
        Err(err) => {
            reset_slot(agent_id, registry);
            Err(err)
        }
    }
}

/// Reset the agent's directive slot.
fn reset_slot(agent_id: AgentId, registry: &mut EntityRegistry) {
    let _ = registry.update_agent(agent_id, |a| {
        a.current_action = None;
        a.progress.reset();
    });
}

// ---------------------------------------------------------------------------
// Shared handler helpers
// ---------------------------------------------------------------------------

/// Clone the acting agent, or report it missing.
pub(super) fn acting_agent(
    agent_id: AgentId,
    registry: &EntityRegistry,
) -> Result<Agent, ActionError> {
    registry
        .agent(agent_id)
        .cloned()
        .ok_or(ActionError::EntityMissing)
}

/// Range gate shared by every proximity-checked handler.
pub(super) fn require_range(
    from: &Position,
    to: &Position,
    limit: f64,
) -> Result<(), ActionError> {
    let distance = from.distance(to);
    if distance > limit {
        return Err(ActionError::OutOfRange { distance, limit });
    }
    Ok(())
}

/// Extract the entity uuid from a target or report it malformed.
pub(super) const fn entity_target(target: &ActionTarget) -> Result<uuid::Uuid, ActionError> {
    match target {
        ActionTarget::Entity(id) => Ok(*id),
        _ => Err(ActionError::MalformedTarget),
    }
}

#[cfg(test)]
mod tests {
    use steading_types::{
        ActionProgress, CurrentAction, Needs, Personality, Skills, Stats,
    };
    use steading_world::ContractBook;

    use super::*;

    fn seeded_registry() -> (EntityRegistry, AgentId) {
        let mut registry = EntityRegistry::new(20.0);
        let agent = Agent {
            id: AgentId::new(),
            name: String::from("Hale"),
            position: Position::new(0.0, 0.0),
            needs: Needs::default(),
            stats: Stats::default(),
            skills: Skills::default(),
            personality: Personality::default(),
            current_action: Some(CurrentAction::idle()),
            progress: ActionProgress {
                in_progress: true,
                started_at: 0,
                duration: 10,
            },
            inventory: Vec::new(),
            hands: None,
            owned_structures: Vec::new(),
            memory: Vec::new(),
        };
        let id = agent.id;
        let _ = registry.create_agent(agent);
        (registry, id)
    }

    #[test]
    fn idle_completes_and_resets_slot() {
        let (mut registry, id) = seeded_registry();
        let mut book = ContractBook::new();

        let effect = execute(id, &mut registry, &mut book, 10);
        assert_eq!(effect.ok(), Some(ActionEffect::Completed));

        let agent = registry.agent(id);
        assert!(agent.is_some_and(|a| a.current_action.is_none() && !a.progress.in_progress));
    }

    #[test]
    fn empty_slot_is_a_noop() {
        let (mut registry, id) = seeded_registry();
        let _ = registry.update_agent(id, |a| a.current_action = None);
        let mut book = ContractBook::new();

        let effect = execute(id, &mut registry, &mut book, 10);
        assert_eq!(effect.ok(), Some(ActionEffect::Completed));
    }

    #[test]
    fn failed_action_still_resets_slot() {
        let (mut registry, id) = seeded_registry();
        // An eat action for an item the agent does not hold.
        let _ = registry.update_agent(id, |a| {
            a.current_action = Some(CurrentAction::new(
                ActionType::Eat,
                ActionTarget::Item(steading_types::ItemKind::Bread),
            ));
        });
        let mut book = ContractBook::new();

        let effect = execute(id, &mut registry, &mut book, 10);
        assert!(effect.is_err());
        let agent = registry.agent(id);
        assert!(agent.is_some_and(|a| a.current_action.is_none()));
    }

    #[test]
    fn range_gate_reports_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        let err = require_range(&a, &b, 2.0);
        assert!(matches!(
            err,
            Err(ActionError::OutOfRange { limit, .. }) if (limit - 2.0).abs() < f64::EPSILON
        ));
        assert!(require_range(&a, &b, 5.0).is_ok());
    }
}

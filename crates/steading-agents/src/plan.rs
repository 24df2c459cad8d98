//! The plan executor: translates planner step identifiers into typed
//! actions and times them.
//!
//! Plans arrive from the external planner as ordered lists of step
//! identifiers in its naming scheme (`move_to_<uuid>`, `chop_<uuid>`,
//! `eat_<item>`, `buy_<uuid>|<item>`, ...). The executor keeps one
//! cursor per plan, parses the step under the cursor, computes its
//! duration from the per-type base table and the agent's skill and
//! energy, and installs it as the agent's current action. World-state
//! effects belong to the action engine, never to the executor.

use steading_types::{
    ActionTarget, ActionType, Agent, ContractId, CurrentAction, Plan, StructureKind,
};
use uuid::Uuid;

use crate::error::ActionError;
use crate::items;
use crate::skills;

/// Outcome of [`start_next_action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new action was installed and timed.
    Started(ActionType),
    /// The cursor was at the end; the plan and action slot were cleared.
    PlanExhausted,
    /// The step under the cursor did not parse; the caller should log
    /// and fall back to idle.
    BadStep(String),
}

/// Fixed per-type base duration, in ticks.
pub const fn base_duration(action: ActionType) -> u64 {
    match action {
        ActionType::Move => 5,
        ActionType::Pickup => 2,
        ActionType::Chop => 10,
        ActionType::Mine => 12,
        ActionType::Craft => 15,
        ActionType::Eat => 3,
        ActionType::Sleep => 30,
        ActionType::Socialize => 8,
        ActionType::Buy | ActionType::Sell => 4,
        ActionType::Store | ActionType::Retrieve => 3,
        ActionType::Idle => 10,
        ActionType::DraftContract
        | ActionType::SignContract
        | ActionType::PayPrepayment
        | ActionType::PayFinal => 2,
        ActionType::BuildStep => 20,
        ActionType::Place => 5,
    }
}

/// Compute the timed duration of an action for an agent.
///
/// `round(base x skill_modifier / energy_modifier)`, minimum 1 tick.
/// The energy modifier is a divisor: an exhausted agent (energy 0)
/// takes up to twice the base time.
pub fn duration_for(action: ActionType, agent: &Agent) -> u64 {
    let base = base_duration(action);
    let skill_mod = skills::relevant_skill(action)
        .map_or(1.0, |kind| skills::skill_modifier(agent.skills.get(kind)));
    let energy_mod = skills::energy_modifier(agent.needs.energy);

    // base <= 30, skill_mod <= 1, energy_mod >= 0.5: the result is a
    // small positive number, so the cast is lossless after rounding.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let ticks = {
        let raw = u32::try_from(base).map_or(f64::from(u32::MAX), f64::from);
        (raw * skill_mod / energy_mod).round() as u64
    };
    ticks.max(1)
}

/// Parse a planner step identifier into a typed action and target.
///
/// # Errors
///
/// Returns [`ActionError::UnknownStep`] for identifiers outside the
/// naming scheme — the spec's "unregistered action type" path.
pub fn parse_step(step: &str) -> Result<(ActionType, ActionTarget), ActionError> {
    let unknown = || ActionError::UnknownStep {
        step: String::from(step),
    };

    match step {
        "sleep" => return Ok((ActionType::Sleep, ActionTarget::None)),
        "idle" => return Ok((ActionType::Idle, ActionTarget::None)),
        "socialize" => return Ok((ActionType::Socialize, ActionTarget::None)),
        "place" => return Ok((ActionType::Place, ActionTarget::None)),
        _ => {}
    }

    if let Some(rest) = step.strip_prefix("move_to_") {
        return Ok(Uuid::parse_str(rest).map_or_else(
            |_| (ActionType::Move, ActionTarget::Landmark(String::from(rest))),
            |id| (ActionType::Move, ActionTarget::Entity(id)),
        ));
    }

    for (prefix, action) in [
        ("pickup_", ActionType::Pickup),
        ("chop_", ActionType::Chop),
        ("mine_", ActionType::Mine),
    ] {
        if let Some(rest) = step.strip_prefix(prefix) {
            let id = Uuid::parse_str(rest).map_err(|_| unknown())?;
            return Ok((action, ActionTarget::Entity(id)));
        }
    }

    for (prefix, action) in [("eat_", ActionType::Eat), ("craft_", ActionType::Craft)] {
        if let Some(rest) = step.strip_prefix(prefix) {
            let item = items::parse_item(rest).ok_or_else(unknown)?;
            return Ok((action, ActionTarget::Item(item)));
        }
    }

    for (prefix, action) in [
        ("buy_", ActionType::Buy),
        ("sell_", ActionType::Sell),
        ("store_", ActionType::Store),
        ("retrieve_", ActionType::Retrieve),
    ] {
        if let Some(rest) = step.strip_prefix(prefix) {
            // Composite `container|item` key.
            let (container, item) = rest.split_once('|').ok_or_else(unknown)?;
            let container = Uuid::parse_str(container).map_err(|_| unknown())?;
            let item = items::parse_item(item).ok_or_else(unknown)?;
            return Ok((action, ActionTarget::Stored { container, item }));
        }
    }

    if let Some(rest) = step.strip_prefix("draft_contract_") {
        let kind = parse_structure(rest).ok_or_else(unknown)?;
        return Ok((ActionType::DraftContract, ActionTarget::Structure(kind)));
    }

    for (prefix, action) in [
        ("sign_contract_", ActionType::SignContract),
        ("pay_prepayment_", ActionType::PayPrepayment),
        ("build_step_", ActionType::BuildStep),
        ("pay_final_", ActionType::PayFinal),
    ] {
        if let Some(rest) = step.strip_prefix(prefix) {
            let id = Uuid::parse_str(rest).map_err(|_| unknown())?;
            return Ok((action, ActionTarget::Contract(ContractId::from(id))));
        }
    }

    Err(unknown())
}

/// Parse a snake-case structure kind name.
fn parse_structure(name: &str) -> Option<StructureKind> {
    match name {
        "home" => Some(StructureKind::Home),
        "market" => Some(StructureKind::Market),
        "workshop" => Some(StructureKind::Workshop),
        "storehouse" => Some(StructureKind::Storehouse),
        "storage_barrel" => Some(StructureKind::StorageBarrel),
        _ => None,
    }
}

/// Install the plan's next action on the agent.
///
/// With the cursor at or past the end, clears both the plan and the
/// agent's action slot. Otherwise parses the current step, installs it
/// as the current action, and stamps the timing state.
pub fn start_next_action(agent: &mut Agent, plan: &mut Plan, tick: u64) -> StartOutcome {
    if plan.is_exhausted() {
        plan.steps.clear();
        plan.cursor = 0;
        agent.current_action = None;
        agent.progress.reset();
        return StartOutcome::PlanExhausted;
    }

    let step = plan.current_step().map(String::from).unwrap_or_default();
    match parse_step(&step) {
        Ok((action, target)) => {
            agent.current_action = Some(CurrentAction::new(action, target));
            agent.progress.in_progress = true;
            agent.progress.started_at = tick;
            agent.progress.duration = duration_for(action, agent);
            StartOutcome::Started(action)
        }
        Err(_) => StartOutcome::BadStep(step),
    }
}

/// Completion step after the action engine has applied an action's
/// effects: advance the cursor and clear the in-progress flag.
pub const fn complete_action(agent: &mut Agent, plan: &mut Plan) {
    plan.advance();
    agent.progress.reset();
}

//! Construction contract lifecycle handlers.
//!
//! Five action types drive the state machine draft -> signed ->
//! prepaid -> completed -> paid:
//!
//! - `draft` (customer) creates the contract in the book
//! - `sign` (any other agent) takes the provider role
//! - `pay_prepayment` (customer) moves the prepayment to the provider
//! - `build_step` (provider) consumes the template materials, raises
//!   the structure, and — for home-class templates only — grants first
//!   ownership to the customer
//! - `pay_final` (customer) settles the remainder
//!
//! Every transition validates the actor's role and the current status
//! first; a mismatch returns an error **without mutating the
//! contract**, which is what makes repeated or premature transitions
//! idempotent.

use rust_decimal::Decimal;
use tracing::info;

use steading_types::{
    ActionTarget, AgentId, Contract, ContractId, ContractStatus, Position, Structure,
    StructureId, StructureKind,
};
use steading_world::{ContractBook, EntityRegistry};

use crate::error::ActionError;
use crate::inventory;

use super::engine::{ActionEffect, BUILD_RANGE, acting_agent, require_range};

/// Fixed price and prepayment per structure kind.
pub fn contract_price(kind: StructureKind) -> (Decimal, Decimal) {
    match kind {
        StructureKind::Home => (Decimal::new(100, 0), Decimal::new(50, 0)),
        StructureKind::Market => (Decimal::new(150, 0), Decimal::new(75, 0)),
        StructureKind::Workshop => (Decimal::new(60, 0), Decimal::new(30, 0)),
        StructureKind::Storehouse => (Decimal::new(80, 0), Decimal::new(40, 0)),
        StructureKind::StorageBarrel => (Decimal::new(10, 0), Decimal::new(5, 0)),
    }
}

/// Extract the contract id from a target.
const fn contract_target(target: &ActionTarget) -> Result<ContractId, ActionError> {
    match target {
        ActionTarget::Contract(id) => Ok(*id),
        _ => Err(ActionError::MalformedTarget),
    }
}

/// Fetch a contract and check its status before transitioning.
fn checked_contract(
    book: &ContractBook,
    id: ContractId,
    expected: ContractStatus,
) -> Result<Contract, ActionError> {
    let contract = book.get(id).cloned().ok_or(ActionError::EntityMissing)?;
    if contract.status != expected {
        return Err(ActionError::InvalidContractStatus {
            expected,
            found: contract.status,
        });
    }
    Ok(contract)
}

/// Customer drafts a construction contract for the target kind.
///
/// The build site lands beside the customer's position.
///
/// # Errors
///
/// [`ActionError::MalformedTarget`] for non-structure targets.
pub fn draft(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
    book: &mut ContractBook,
    tick: u64,
) -> Result<ActionEffect, ActionError> {
    let ActionTarget::Structure(kind) = target else {
        return Err(ActionError::MalformedTarget);
    };
    let agent = acting_agent(agent_id, registry)?;
    let (cost, prepayment) = contract_price(*kind);
    let site = Position::new(agent.position.x + 4.0, agent.position.y);

    let id = book
        .draft(agent_id, *kind, site, cost, prepayment, tick)
        .map_err(|_| ActionError::MalformedTarget)?;
    info!(contract = %id, customer = %agent_id, kind = ?kind, "contract drafted");
    Ok(ActionEffect::Completed)
}

/// A provider signs a drafted contract.
///
/// # Errors
///
/// Status and role mismatches; the contract is left untouched.
pub fn sign(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
    book: &mut ContractBook,
) -> Result<ActionEffect, ActionError> {
    let _ = acting_agent(agent_id, registry)?;
    let id = contract_target(target)?;
    let contract = checked_contract(book, id, ContractStatus::Draft)?;

    if contract.customer == agent_id {
        return Err(ActionError::WrongRole {
            reason: String::from("the customer cannot sign as provider"),
        });
    }

    if let Some(c) = book.get_mut(id) {
        c.provider = Some(agent_id);
        c.status = ContractStatus::Signed;
    }
    Ok(ActionEffect::Completed)
}

/// The customer pays the prepayment on a signed contract.
///
/// # Errors
///
/// Status/role mismatches and [`ActionError::InsufficientFunds`]; no
/// partial transfers.
pub fn pay_prepayment(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
    book: &mut ContractBook,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let id = contract_target(target)?;
    let contract = checked_contract(book, id, ContractStatus::Signed)?;

    if contract.customer != agent_id {
        return Err(ActionError::WrongRole {
            reason: String::from("only the customer pays the prepayment"),
        });
    }
    let provider = contract.provider.ok_or(ActionError::EntityMissing)?;
    if agent.stats.money < contract.prepayment {
        return Err(ActionError::InsufficientFunds {
            needed: contract.prepayment,
            have: agent.stats.money,
        });
    }

    let amount = contract.prepayment;
    let _ = registry.update_agent(agent_id, |a| {
        a.stats.money = a.stats.money.saturating_sub(amount);
    });
    let _ = registry.update_agent(provider, |a| {
        a.stats.money = a.stats.money.saturating_add(amount);
    });
    if let Some(c) = book.get_mut(id) {
        c.status = ContractStatus::Prepaid;
    }
    Ok(ActionEffect::Completed)
}

/// The provider performs the build on a prepaid contract.
///
/// Validates that the provider stands near the site and holds every
/// template material, consumes them, creates the structure, and grants
/// first ownership to the customer for home-class templates.
///
/// # Errors
///
/// Status/role/range mismatches and
/// [`ActionError::MissingMaterials`]; nothing is consumed on failure.
pub fn build_step(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
    book: &mut ContractBook,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let id = contract_target(target)?;
    let contract = checked_contract(book, id, ContractStatus::Prepaid)?;

    if contract.provider != Some(agent_id) {
        return Err(ActionError::WrongRole {
            reason: String::from("only the signed provider builds"),
        });
    }
    require_range(&agent.position, &contract.site, BUILD_RANGE)?;

    for (item, needed) in &contract.materials {
        let have = inventory::count(&agent.inventory, *item);
        if have < *needed {
            return Err(ActionError::MissingMaterials {
                item: *item,
                needed: *needed,
                have,
            });
        }
    }

    let _ = registry.update_agent(agent_id, |a| {
        for (item, needed) in &contract.materials {
            // Presence verified above.
            let _ = inventory::remove(&mut a.inventory, *item, *needed);
        }
    });

    let spec = steading_world::template(contract.structure_kind);
    let is_home = contract.structure_kind.is_home_class();
    let structure = Structure {
        id: StructureId::new(),
        position: contract.site,
        kind: contract.structure_kind,
        inventory: Vec::new(),
        treasury: Decimal::ZERO,
        owner: is_home.then_some(contract.customer),
        blocks_movement: spec.blocks_movement,
        footprint: spec.footprint,
        work: None,
    };
    let sid = structure.id;
    let _ = registry.create_structure(structure);
    if is_home {
        let _ = registry.update_agent(contract.customer, |a| {
            a.owned_structures.push(sid);
        });
    }

    if let Some(c) = book.get_mut(id) {
        c.status = ContractStatus::Completed;
    }
    info!(contract = %id, structure = %sid, provider = %agent_id, "build completed");
    Ok(ActionEffect::Completed)
}

/// The customer settles the remainder on a completed contract.
///
/// # Errors
///
/// Status/role mismatches and [`ActionError::InsufficientFunds`].
pub fn pay_final(
    agent_id: AgentId,
    target: &ActionTarget,
    registry: &mut EntityRegistry,
    book: &mut ContractBook,
) -> Result<ActionEffect, ActionError> {
    let agent = acting_agent(agent_id, registry)?;
    let id = contract_target(target)?;
    let contract = checked_contract(book, id, ContractStatus::Completed)?;

    if contract.customer != agent_id {
        return Err(ActionError::WrongRole {
            reason: String::from("only the customer settles the contract"),
        });
    }
    let provider = contract.provider.ok_or(ActionError::EntityMissing)?;
    let remainder = contract.cost.saturating_sub(contract.prepayment);
    if agent.stats.money < remainder {
        return Err(ActionError::InsufficientFunds {
            needed: remainder,
            have: agent.stats.money,
        });
    }

    let _ = registry.update_agent(agent_id, |a| {
        a.stats.money = a.stats.money.saturating_sub(remainder);
    });
    let _ = registry.update_agent(provider, |a| {
        a.stats.money = a.stats.money.saturating_add(remainder);
    });
    if let Some(c) = book.get_mut(id) {
        c.status = ContractStatus::Paid;
    }
    Ok(ActionEffect::Completed)
}

#[cfg(test)]
mod tests {
    use steading_types::{
        ActionProgress, ActionType, Agent, CurrentAction, ItemKind, ItemStack, Needs,
        Personality, Skills, Stats,
    };

    use crate::actions::engine::execute;

    use super::*;

    fn make_agent(name: &str, money: i64) -> Agent {
        Agent {
            id: AgentId::new(),
            name: String::from(name),
            position: Position::new(0.0, 0.0),
            needs: Needs::default(),
            stats: Stats {
                money: Decimal::new(money, 0),
                ..Stats::default()
            },
            skills: Skills::default(),
            personality: Personality::default(),
            current_action: None,
            progress: ActionProgress::default(),
            inventory: Vec::new(),
            hands: None,
            owned_structures: Vec::new(),
            memory: Vec::new(),
        }
    }

    fn arm(registry: &mut EntityRegistry, aid: AgentId, action: ActionType, target: ActionTarget) {
        let _ = registry.update_agent(aid, |a| {
            a.current_action = Some(CurrentAction::new(action, target));
            a.progress.in_progress = true;
        });
    }

    fn run(
        registry: &mut EntityRegistry,
        book: &mut ContractBook,
        aid: AgentId,
        action: ActionType,
        target: ActionTarget,
    ) -> Result<ActionEffect, ActionError> {
        arm(registry, aid, action, target);
        execute(aid, registry, book, 0)
    }

    /// The spec's end-to-end scenario: A (1000) commissions a home for
    /// 100 with a 50 prepayment, B signs, builds, and is paid in full.
    #[test]
    fn full_home_contract_scenario() {
        let mut registry = EntityRegistry::new(20.0);
        let mut book = ContractBook::new();
        let customer = make_agent("Alder", 1000);
        let mut provider = make_agent("Bryn", 0);
        inventory::add(&mut provider.inventory, ItemStack::of(ItemKind::Wood, 20));
        inventory::add(&mut provider.inventory, ItemStack::of(ItemKind::Stone, 10));
        let a_id = customer.id;
        let b_id = provider.id;
        let _ = registry.create_agent(customer);
        let _ = registry.create_agent(provider);

        // A drafts.
        let effect = run(
            &mut registry,
            &mut book,
            a_id,
            ActionType::DraftContract,
            ActionTarget::Structure(StructureKind::Home),
        );
        assert_eq!(effect.ok(), Some(ActionEffect::Completed));
        let cid = book.contracts().next().map(|c| c.id).unwrap_or_default();

        // B signs.
        let effect = run(
            &mut registry,
            &mut book,
            b_id,
            ActionType::SignContract,
            ActionTarget::Contract(cid),
        );
        assert_eq!(effect.ok(), Some(ActionEffect::Completed));
        assert!(book.get(cid).is_some_and(|c| c.status == ContractStatus::Signed));

        // A pays the prepayment: A 950, B 50.
        let effect = run(
            &mut registry,
            &mut book,
            a_id,
            ActionType::PayPrepayment,
            ActionTarget::Contract(cid),
        );
        assert_eq!(effect.ok(), Some(ActionEffect::Completed));
        assert!(registry.agent(a_id).is_some_and(|a| a.stats.money == Decimal::new(950, 0)));
        assert!(registry.agent(b_id).is_some_and(|a| a.stats.money == Decimal::new(50, 0)));

        // B builds: structure exists, A owns it (home-class), materials gone.
        let effect = run(
            &mut registry,
            &mut book,
            b_id,
            ActionType::BuildStep,
            ActionTarget::Contract(cid),
        );
        assert_eq!(effect.ok(), Some(ActionEffect::Completed));
        assert!(book.get(cid).is_some_and(|c| c.status == ContractStatus::Completed));
        let home = registry.structures().find(|s| s.kind == StructureKind::Home).cloned();
        assert!(home.as_ref().is_some_and(|s| s.owner == Some(a_id)));
        assert!(registry.agent(a_id).is_some_and(|a| a.owned_structures.len() == 1));
        assert!(registry.agent(b_id).is_some_and(|a| inventory::count(&a.inventory, ItemKind::Wood) == 0));

        // A settles: A 900, B 100.
        let effect = run(
            &mut registry,
            &mut book,
            a_id,
            ActionType::PayFinal,
            ActionTarget::Contract(cid),
        );
        assert_eq!(effect.ok(), Some(ActionEffect::Completed));
        assert!(book.get(cid).is_some_and(|c| c.status == ContractStatus::Paid));
        assert!(registry.agent(a_id).is_some_and(|a| a.stats.money == Decimal::new(900, 0)));
        assert!(registry.agent(b_id).is_some_and(|a| a.stats.money == Decimal::new(100, 0)));
    }

    #[test]
    fn re_signing_a_signed_contract_changes_nothing() {
        let mut registry = EntityRegistry::new(20.0);
        let mut book = ContractBook::new();
        let customer = make_agent("Alder", 1000);
        let provider = make_agent("Bryn", 0);
        let rival = make_agent("Cole", 0);
        let a_id = customer.id;
        let b_id = provider.id;
        let c_id = rival.id;
        let _ = registry.create_agent(customer);
        let _ = registry.create_agent(provider);
        let _ = registry.create_agent(rival);

        let _ = run(
            &mut registry,
            &mut book,
            a_id,
            ActionType::DraftContract,
            ActionTarget::Structure(StructureKind::Home),
        );
        let cid = book.contracts().next().map(|c| c.id).unwrap_or_default();
        let _ = run(&mut registry, &mut book, b_id, ActionType::SignContract, ActionTarget::Contract(cid));

        // A rival tries to sign the already-signed contract.
        let effect = run(&mut registry, &mut book, c_id, ActionType::SignContract, ActionTarget::Contract(cid));
        assert!(matches!(
            effect,
            Err(ActionError::InvalidContractStatus {
                expected: ContractStatus::Draft,
                found: ContractStatus::Signed
            })
        ));
        // Provider unchanged.
        assert!(book.get(cid).is_some_and(|c| c.provider == Some(b_id)));
    }

    #[test]
    fn premature_final_payment_moves_no_money() {
        let mut registry = EntityRegistry::new(20.0);
        let mut book = ContractBook::new();
        let customer = make_agent("Alder", 1000);
        let provider = make_agent("Bryn", 0);
        let a_id = customer.id;
        let b_id = provider.id;
        let _ = registry.create_agent(customer);
        let _ = registry.create_agent(provider);

        let _ = run(
            &mut registry,
            &mut book,
            a_id,
            ActionType::DraftContract,
            ActionTarget::Structure(StructureKind::Home),
        );
        let cid = book.contracts().next().map(|c| c.id).unwrap_or_default();
        let _ = run(&mut registry, &mut book, b_id, ActionType::SignContract, ActionTarget::Contract(cid));

        // pay_final before the build: rejected, no transfer.
        let effect = run(&mut registry, &mut book, a_id, ActionType::PayFinal, ActionTarget::Contract(cid));
        assert!(matches!(effect, Err(ActionError::InvalidContractStatus { .. })));
        assert!(book.get(cid).is_some_and(|c| c.status == ContractStatus::Signed));
        assert!(registry.agent(a_id).is_some_and(|a| a.stats.money == Decimal::new(1000, 0)));
        assert!(registry.agent(b_id).is_some_and(|a| a.stats.money == Decimal::ZERO));
    }

    #[test]
    fn customer_cannot_sign_own_contract() {
        let mut registry = EntityRegistry::new(20.0);
        let mut book = ContractBook::new();
        let customer = make_agent("Alder", 1000);
        let a_id = customer.id;
        let _ = registry.create_agent(customer);

        let _ = run(
            &mut registry,
            &mut book,
            a_id,
            ActionType::DraftContract,
            ActionTarget::Structure(StructureKind::Home),
        );
        let cid = book.contracts().next().map(|c| c.id).unwrap_or_default();

        let effect = run(&mut registry, &mut book, a_id, ActionType::SignContract, ActionTarget::Contract(cid));
        assert!(matches!(effect, Err(ActionError::WrongRole { .. })));
        assert!(book.get(cid).is_some_and(|c| c.status == ContractStatus::Draft));
    }

    #[test]
    fn build_without_materials_fails_cleanly() {
        let mut registry = EntityRegistry::new(20.0);
        let mut book = ContractBook::new();
        let customer = make_agent("Alder", 1000);
        let provider = make_agent("Bryn", 0);
        let a_id = customer.id;
        let b_id = provider.id;
        let _ = registry.create_agent(customer);
        let _ = registry.create_agent(provider);

        let _ = run(
            &mut registry,
            &mut book,
            a_id,
            ActionType::DraftContract,
            ActionTarget::Structure(StructureKind::Home),
        );
        let cid = book.contracts().next().map(|c| c.id).unwrap_or_default();
        let _ = run(&mut registry, &mut book, b_id, ActionType::SignContract, ActionTarget::Contract(cid));
        let _ = run(&mut registry, &mut book, a_id, ActionType::PayPrepayment, ActionTarget::Contract(cid));

        let effect = run(&mut registry, &mut book, b_id, ActionType::BuildStep, ActionTarget::Contract(cid));
        assert!(matches!(effect, Err(ActionError::MissingMaterials { .. })));
        assert!(book.get(cid).is_some_and(|c| c.status == ContractStatus::Prepaid));
        assert_eq!(registry.structures().count(), 0);
    }

    #[test]
    fn only_the_provider_builds() {
        let mut registry = EntityRegistry::new(20.0);
        let mut book = ContractBook::new();
        let customer = make_agent("Alder", 1000);
        let mut provider = make_agent("Bryn", 0);
        inventory::add(&mut provider.inventory, ItemStack::of(ItemKind::Wood, 20));
        inventory::add(&mut provider.inventory, ItemStack::of(ItemKind::Stone, 10));
        let a_id = customer.id;
        let b_id = provider.id;
        let _ = registry.create_agent(customer);
        let _ = registry.create_agent(provider);

        let _ = run(
            &mut registry,
            &mut book,
            a_id,
            ActionType::DraftContract,
            ActionTarget::Structure(StructureKind::Home),
        );
        let cid = book.contracts().next().map(|c| c.id).unwrap_or_default();
        let _ = run(&mut registry, &mut book, b_id, ActionType::SignContract, ActionTarget::Contract(cid));
        let _ = run(&mut registry, &mut book, a_id, ActionType::PayPrepayment, ActionTarget::Contract(cid));

        // The customer tries to build its own home.
        let effect = run(&mut registry, &mut book, a_id, ActionType::BuildStep, ActionTarget::Contract(cid));
        assert!(matches!(effect, Err(ActionError::WrongRole { .. })));
    }

    #[test]
    fn non_home_builds_grant_no_ownership() {
        let mut registry = EntityRegistry::new(20.0);
        let mut book = ContractBook::new();
        let customer = make_agent("Alder", 1000);
        let mut provider = make_agent("Bryn", 0);
        inventory::add(&mut provider.inventory, ItemStack::of(ItemKind::Wood, 15));
        inventory::add(&mut provider.inventory, ItemStack::of(ItemKind::Stone, 5));
        let a_id = customer.id;
        let b_id = provider.id;
        let _ = registry.create_agent(customer);
        let _ = registry.create_agent(provider);

        let _ = run(
            &mut registry,
            &mut book,
            a_id,
            ActionType::DraftContract,
            ActionTarget::Structure(StructureKind::Storehouse),
        );
        let cid = book.contracts().next().map(|c| c.id).unwrap_or_default();
        let _ = run(&mut registry, &mut book, b_id, ActionType::SignContract, ActionTarget::Contract(cid));
        let _ = run(&mut registry, &mut book, a_id, ActionType::PayPrepayment, ActionTarget::Contract(cid));
        let effect = run(&mut registry, &mut book, b_id, ActionType::BuildStep, ActionTarget::Contract(cid));
        assert_eq!(effect.ok(), Some(ActionEffect::Completed));

        let built = registry.structures().next().cloned();
        assert!(built.is_some_and(|s| s.owner.is_none()));
        assert!(registry.agent(a_id).is_some_and(|a| a.owned_structures.is_empty()));
    }
}

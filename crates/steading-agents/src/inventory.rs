//! Stack-list inventory operations.
//!
//! Inventories are ordered lists of [`ItemStack`]s. Stackable kinds
//! merge into the first existing stack of the same kind; durable kinds
//! (tools) keep one stack per item so each carries its own durability.
//! The same operations serve agent packs and structure stores.

use steading_types::{ItemKind, ItemStack};

use crate::error::ActionError;
use crate::items;

/// Total units of a kind across all stacks.
pub fn count(inventory: &[ItemStack], kind: ItemKind) -> u32 {
    inventory
        .iter()
        .filter(|s| s.kind == kind)
        .fold(0_u32, |acc, s| acc.saturating_add(s.quantity))
}

/// Whether the inventory holds at least `quantity` units of a kind.
pub fn has(inventory: &[ItemStack], kind: ItemKind, quantity: u32) -> bool {
    count(inventory, kind) >= quantity
}

/// Add a stack, merging into an existing stack when the kind is
/// stackable and the incoming stack carries no durability.
pub fn add(inventory: &mut Vec<ItemStack>, stack: ItemStack) {
    if stack.quantity == 0 {
        return;
    }
    if items::is_stackable(stack.kind) && stack.durability.is_none() {
        if let Some(existing) = inventory
            .iter_mut()
            .find(|s| s.kind == stack.kind && s.durability.is_none())
        {
            existing.quantity = existing.quantity.saturating_add(stack.quantity);
            return;
        }
    }
    inventory.push(stack);
}

/// Remove `quantity` units of a kind, draining stacks front to back.
///
/// # Errors
///
/// Returns [`ActionError::MissingMaterials`] (and removes nothing) if
/// the inventory holds fewer than `quantity` units.
pub fn remove(
    inventory: &mut Vec<ItemStack>,
    kind: ItemKind,
    quantity: u32,
) -> Result<(), ActionError> {
    let have = count(inventory, kind);
    if have < quantity {
        return Err(ActionError::MissingMaterials {
            item: kind,
            needed: quantity,
            have,
        });
    }
    let mut left = quantity;
    for stack in inventory.iter_mut() {
        if left == 0 {
            break;
        }
        if stack.kind == kind {
            let taken = stack.quantity.min(left);
            stack.quantity = stack.quantity.saturating_sub(taken);
            left = left.saturating_sub(taken);
        }
    }
    inventory.retain(|s| s.quantity > 0);
    Ok(())
}

/// Whether a working (durability > 0) tool of this kind is present.
pub fn has_tool(inventory: &[ItemStack], tool: ItemKind) -> bool {
    inventory
        .iter()
        .any(|s| s.kind == tool && s.durability.is_some_and(|d| d > 0))
}

/// Wear the first working tool of this kind by one point, removing it
/// if the durability reaches zero.
///
/// Returns `true` if the tool broke and was removed.
///
/// # Errors
///
/// Returns [`ActionError::MissingTool`] if no working tool is present.
pub fn degrade_tool(inventory: &mut Vec<ItemStack>, tool: ItemKind) -> Result<bool, ActionError> {
    let Some(stack) = inventory
        .iter_mut()
        .find(|s| s.kind == tool && s.durability.is_some_and(|d| d > 0))
    else {
        return Err(ActionError::MissingTool { tool });
    };
    let worn = stack.durability.unwrap_or(0).saturating_sub(1);
    stack.durability = Some(worn);
    if worn == 0 {
        inventory.retain(|s| !(s.kind == tool && s.durability == Some(0)));
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stackables_merge() {
        let mut inv = Vec::new();
        add(&mut inv, ItemStack::of(ItemKind::Wood, 3));
        add(&mut inv, ItemStack::of(ItemKind::Wood, 2));
        assert_eq!(inv.len(), 1);
        assert_eq!(count(&inv, ItemKind::Wood), 5);
    }

    #[test]
    fn durables_keep_separate_stacks() {
        let mut inv = Vec::new();
        add(&mut inv, ItemStack::durable(ItemKind::Axe, 20));
        add(&mut inv, ItemStack::durable(ItemKind::Axe, 7));
        assert_eq!(inv.len(), 2);
        assert_eq!(count(&inv, ItemKind::Axe), 2);
    }

    #[test]
    fn zero_quantity_add_is_a_noop() {
        let mut inv = Vec::new();
        add(&mut inv, ItemStack::of(ItemKind::Stone, 0));
        assert!(inv.is_empty());
    }

    #[test]
    fn remove_spans_stacks() {
        let mut inv = vec![
            ItemStack::of(ItemKind::Berry, 2),
            ItemStack::of(ItemKind::Wood, 1),
        ];
        // A second berry stack (e.g. restored from a save).
        inv.push(ItemStack {
            kind: ItemKind::Berry,
            quantity: 3,
            durability: None,
        });

        assert!(remove(&mut inv, ItemKind::Berry, 4).is_ok());
        assert_eq!(count(&inv, ItemKind::Berry), 1);
        assert_eq!(count(&inv, ItemKind::Wood), 1);
    }

    #[test]
    fn remove_fails_without_mutating() {
        let mut inv = vec![ItemStack::of(ItemKind::Berry, 2)];
        let result = remove(&mut inv, ItemKind::Berry, 3);
        assert!(matches!(
            result,
            Err(ActionError::MissingMaterials {
                needed: 3,
                have: 2,
                ..
            })
        ));
        assert_eq!(count(&inv, ItemKind::Berry), 2);
    }

    #[test]
    fn degrade_tool_wears_and_breaks() {
        let mut inv = vec![ItemStack::durable(ItemKind::Axe, 2)];
        assert_eq!(degrade_tool(&mut inv, ItemKind::Axe).ok(), Some(false));
        assert_eq!(degrade_tool(&mut inv, ItemKind::Axe).ok(), Some(true));
        assert!(inv.is_empty());
        assert!(matches!(
            degrade_tool(&mut inv, ItemKind::Axe),
            Err(ActionError::MissingTool { .. })
        ));
    }

    #[test]
    fn has_tool_ignores_broken_tools() {
        let inv = vec![ItemStack {
            kind: ItemKind::Pickaxe,
            quantity: 1,
            durability: Some(0),
        }];
        assert!(!has_tool(&inv, ItemKind::Pickaxe));
    }
}

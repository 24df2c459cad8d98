//! Skill growth and the duration modifiers derived from skills and
//! energy.
//!
//! Skills are unbounded scores grown through use (+1 per successful
//! action, +2 for workstation or skill-gated crafts). Higher skill
//! shortens action durations via a diminishing modifier that never
//! reaches zero; low energy lengthens them up to 2x.

use steading_types::{ActionType, SkillKind};

/// Skill growth for a plain successful action.
pub const SKILL_GAIN: u32 = 1;

/// Skill growth for workstation or skill-gated crafts.
pub const SKILL_GAIN_GATED: u32 = 2;

/// Floor of the skill duration modifier; skill can at most quarter a
/// duration, never eliminate it.
pub const SKILL_MODIFIER_FLOOR: f64 = 0.25;

/// The skill that scales an action's duration, if any.
pub const fn relevant_skill(action: ActionType) -> Option<SkillKind> {
    match action {
        ActionType::Chop | ActionType::Mine | ActionType::Pickup => Some(SkillKind::Gathering),
        ActionType::Craft => Some(SkillKind::Crafting),
        ActionType::Buy | ActionType::Sell => Some(SkillKind::Trading),
        _ => None,
    }
}

/// Duration modifier from a skill score.
///
/// `max(0.25, 1 / (1 + 0.1 x skill))`: diminishing toward the floor,
/// never zero.
pub fn skill_modifier(skill: u32) -> f64 {
    let divisor = f64::from(skill).mul_add(0.1, 1.0);
    (1.0 / divisor).max(SKILL_MODIFIER_FLOOR)
}

/// Duration divisor from the energy need.
///
/// `0.5 + 0.5 x energy`, applied as a divisor: a fully rested agent
/// (energy 1.0) divides by 1.0, an exhausted one (energy 0.0) divides
/// by 0.5 and takes twice as long.
pub fn energy_modifier(energy: f64) -> f64 {
    energy.clamp(0.0, 1.0).mul_add(0.5, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_modifier_diminishes_toward_floor() {
        assert!((skill_modifier(0) - 1.0).abs() < f64::EPSILON);
        // 1 / (1 + 1.0) = 0.5
        assert!((skill_modifier(10) - 0.5).abs() < 1e-9);
        // Deep skill pins at the floor, never zero.
        assert!((skill_modifier(100) - SKILL_MODIFIER_FLOOR).abs() < f64::EPSILON);
        assert!((skill_modifier(u32::MAX) - SKILL_MODIFIER_FLOOR).abs() < f64::EPSILON);
    }

    #[test]
    fn energy_modifier_bounds() {
        assert!((energy_modifier(1.0) - 1.0).abs() < f64::EPSILON);
        assert!((energy_modifier(0.0) - 0.5).abs() < f64::EPSILON);
        // Out-of-range inputs clamp.
        assert!((energy_modifier(7.0) - 1.0).abs() < f64::EPSILON);
        assert!((energy_modifier(-3.0) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn relevant_skill_per_action_class() {
        assert_eq!(relevant_skill(ActionType::Chop), Some(SkillKind::Gathering));
        assert_eq!(relevant_skill(ActionType::Craft), Some(SkillKind::Crafting));
        assert_eq!(relevant_skill(ActionType::Sell), Some(SkillKind::Trading));
        assert_eq!(relevant_skill(ActionType::Sleep), None);
    }
}

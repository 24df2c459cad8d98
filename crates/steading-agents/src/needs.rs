//! Per-tick need drift.
//!
//! Needs move a small fixed amount every tick regardless of what the
//! agent is doing: hunger rises, energy and the social need decay.
//! Starvation (hunger pinned at 1.0) bleeds health. Actions (eat,
//! sleep, socialize) are the only way to push needs the other way.

use steading_types::Agent;

/// Hunger gained per tick.
pub const HUNGER_PER_TICK: f64 = 0.005;

/// Energy lost per tick.
pub const ENERGY_PER_TICK: f64 = 0.003;

/// Social satisfaction lost per tick.
pub const SOCIAL_PER_TICK: f64 = 0.002;

/// Health lost per tick while starving (hunger at the 1.0 cap).
pub const STARVATION_HEALTH_LOSS: f64 = 0.1;

/// Apply one tick of need drift to an agent.
pub fn apply_need_drift(agent: &mut Agent) {
    agent.needs.hunger = (agent.needs.hunger + HUNGER_PER_TICK).min(1.0);
    agent.needs.energy = (agent.needs.energy - ENERGY_PER_TICK).max(0.0);
    agent.needs.social = (agent.needs.social - SOCIAL_PER_TICK).max(0.0);

    if agent.needs.hunger >= 1.0 {
        agent.stats.health = (agent.stats.health - STARVATION_HEALTH_LOSS).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use steading_types::{
        ActionProgress, AgentId, Needs, Personality, Position, Skills, Stats,
    };

    use super::*;

    fn make_agent() -> Agent {
        Agent {
            id: AgentId::new(),
            name: String::from("Fenn"),
            position: Position::default(),
            needs: Needs::default(),
            stats: Stats::default(),
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

    #[test]
    fn drift_moves_each_need() {
        let mut agent = make_agent();
        apply_need_drift(&mut agent);
        assert!((agent.needs.hunger - HUNGER_PER_TICK).abs() < 1e-12);
        assert!((agent.needs.energy - (1.0 - ENERGY_PER_TICK)).abs() < 1e-12);
        assert!((agent.needs.social - (1.0 - SOCIAL_PER_TICK)).abs() < 1e-12);
    }

    #[test]
    fn needs_clamp_at_their_bounds() {
        let mut agent = make_agent();
        agent.needs.hunger = 0.999;
        agent.needs.energy = 0.001;
        agent.needs.social = 0.001;
        for _ in 0..10 {
            apply_need_drift(&mut agent);
        }
        assert!((agent.needs.hunger - 1.0).abs() < f64::EPSILON);
        assert!(agent.needs.energy.abs() < f64::EPSILON);
        assert!(agent.needs.social.abs() < f64::EPSILON);
    }

    #[test]
    fn starvation_bleeds_health() {
        let mut agent = make_agent();
        agent.needs.hunger = 1.0;
        apply_need_drift(&mut agent);
        assert!(agent.stats.health < 100.0);
    }

    #[test]
    fn health_never_goes_negative() {
        let mut agent = make_agent();
        agent.needs.hunger = 1.0;
        agent.stats.health = 0.05;
        apply_need_drift(&mut agent);
        assert!(agent.stats.health.abs() < f64::EPSILON);
    }
}

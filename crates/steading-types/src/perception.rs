//! Perception and planner-protocol payloads.
//!
//! [`SightedEntity`] is what an agent sees through the spatial index each
//! tick. The planner request/response shapes mirror the external planning
//! service's HTTP API: the service receives an agent's public state, its
//! active goal, and its surroundings, and returns either an ordered list
//! of action identifiers or a best-action/utility score for a candidate
//! set.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::ItemKind;
use crate::geometry::Position;
use crate::ids::{AgentId, EntityRef, StructureId};
use crate::structs::{Goal, Needs, Skills};

/// One entity visible to an agent this tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SightedEntity {
    /// The sighted entity.
    pub entity: EntityRef,
    /// Subtype label (resource/structure kind, or agent name).
    pub subtype: String,
    /// Where it was seen.
    pub position: Position,
}

/// The public slice of an agent's state shipped to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    /// The agent's identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Current position.
    pub position: Position,
    /// Need levels.
    pub needs: Needs,
    /// Health in `[0, 100]`.
    pub health: f64,
    /// Money held.
    pub money: Decimal,
    /// Skill scores.
    pub skills: Skills,
    /// Inventory flattened to kind -> total quantity.
    pub inventory: BTreeMap<ItemKind, u32>,
    /// The agent's home structure, if it owns one.
    pub home: Option<StructureId>,
}

/// A request for a multi-step plan toward a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// The requesting agent's public state.
    pub agent: AgentView,
    /// The goal the plan should satisfy.
    pub goal: Goal,
    /// Entities near the agent at request time.
    pub nearby: Vec<SightedEntity>,
    /// Tick at which the request was issued.
    pub tick: u64,
}

/// One candidate action offered to the utility scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAction {
    /// Step identifier, in the planner's naming scheme.
    pub name: String,
    /// Coarse action category (`gather`, `eat`, `sleep`, `move`, ...).
    pub kind: String,
    /// Free-form parameters (target type, value, distance).
    pub params: BTreeMap<String, serde_json::Value>,
}

/// A request to score candidate actions and pick the best.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilityRequest {
    /// The deciding agent's public state.
    pub agent: AgentView,
    /// The candidate actions to score.
    pub options: Vec<CandidateAction>,
}

/// The scorer's verdict: the chosen action and its utility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAction {
    /// Step identifier of the winning candidate.
    pub name: String,
    /// The computed utility value.
    pub utility: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{ConditionOp, GoalKind};
    use crate::ids::GoalId;
    use crate::structs::Condition;

    fn make_view() -> AgentView {
        AgentView {
            id: AgentId::new(),
            name: String::from("Bryn"),
            position: Position::new(1.0, 2.0),
            needs: Needs::default(),
            health: 100.0,
            money: Decimal::new(250, 1), // 25.0
            skills: Skills::default(),
            inventory: BTreeMap::from([(ItemKind::Berry, 3)]),
            home: None,
        }
    }

    #[test]
    fn plan_request_roundtrips() {
        let request = PlanRequest {
            agent: make_view(),
            goal: Goal {
                id: GoalId::new(),
                kind: GoalKind::MaintainNeed,
                priority: 0.8,
                conditions: vec![Condition {
                    key: String::from("hunger"),
                    op: ConditionOp::Lt,
                    value: 0.3,
                }],
                is_global: false,
                deadline: None,
                created_at: 7,
            },
            nearby: Vec::new(),
            tick: 7,
        };
        let json = serde_json::to_string(&request).ok();
        assert!(json.is_some());
        let back: Result<PlanRequest, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(back.is_ok());
    }

    #[test]
    fn utility_request_serializes_params() {
        let request = UtilityRequest {
            agent: make_view(),
            options: vec![CandidateAction {
                name: String::from("eat_berry"),
                kind: String::from("eat"),
                params: BTreeMap::from([(
                    String::from("value"),
                    serde_json::json!(0.4),
                )]),
            }],
        };
        let json = serde_json::to_string(&request).unwrap_or_default();
        assert!(json.contains("eat_berry"));
    }
}

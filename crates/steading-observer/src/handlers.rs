//! REST endpoint handlers for the control surface.
//!
//! All of these are thin commands into the scheduler and registry, per
//! the core's concurrency contract: consumers read snapshots and
//! changesets; only the orchestrator and handlers mutate entity state.
//! The entity CRUD endpoints exist for world editing and go through
//! the registry's invariant-preserving mutation paths.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/status` | Scheduler status + entity counts |
//! | `POST` | `/control/pause` | Pause tick advancement |
//! | `POST` | `/control/resume` | Resume tick advancement |
//! | `POST` | `/control/speed` | Set the speed multiplier |
//! | `POST` | `/control/tick` | Force the tick counter |
//! | `POST` | `/world/generate` | Regenerate the world |
//! | `GET` | `/world/snapshot` | Full authoritative snapshot |
//! | `GET` | `/world/changes` | Recent changesets (`?since=tick`) |
//! | `POST` | `/entities/agents` | Create an agent |
//! | `PATCH` | `/entities/{id}` | Move an entity |
//! | `DELETE` | `/entities/{id}` | Remove an entity |
//! | `POST` | `/agents/{id}/suggest` | Utility-score candidate actions |

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use steading_core::planner::PlanSource;
use steading_core::{SimConfig, SimState};
use steading_types::{Agent, AgentId, CandidateAction, Position, ScoredAction, UtilityRequest};
use steading_world::{ChangeSet, GenerateParams, WorldSnapshot, generate, snapshot};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request/response shapes
// ---------------------------------------------------------------------------

/// `GET /status` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Current tick number.
    pub tick: u64,
    /// Whether tick advancement is paused.
    pub paused: bool,
    /// Current speed multiplier.
    pub speed: u64,
    /// Whether the timer task is running.
    pub running: bool,
    /// Number of live agents.
    pub agents: usize,
    /// Number of live entities of all kinds.
    pub entities: usize,
    /// Number of contracts in the book.
    pub contracts: usize,
    /// ISO 8601 timestamp of when the server came up.
    pub started_at: String,
}

/// `POST /control/speed` body.
#[derive(Debug, Deserialize)]
pub struct SpeedBody {
    /// The requested multiplier; must be one of {1, 2, 4, 8, 16}.
    pub multiplier: u64,
}

/// `POST /control/tick` body.
#[derive(Debug, Deserialize)]
pub struct TickBody {
    /// The tick number to restore.
    pub tick: u64,
}

/// `POST /world/generate` body; omitted fields use config defaults.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateBody {
    /// Side length of the square map.
    pub size: Option<f64>,
    /// Number of agents.
    pub agent_count: Option<u32>,
    /// Resources per square world unit.
    pub resource_density: Option<f64>,
    /// RNG seed.
    pub seed: Option<u64>,
}

/// `GET /world/changes` query parameters.
#[derive(Debug, Deserialize)]
pub struct ChangesQuery {
    /// Only changesets from ticks strictly after this are returned.
    pub since: Option<u64>,
}

/// `PATCH /entities/{id}` body.
#[derive(Debug, Deserialize)]
pub struct MoveBody {
    /// New x coordinate.
    pub x: f64,
    /// New y coordinate.
    pub y: f64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /status`
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let scheduler = state.scheduler.status();
    let sim = state.sim.read().await;
    Json(StatusResponse {
        tick: scheduler.tick,
        paused: scheduler.paused,
        speed: scheduler.speed,
        running: scheduler.running,
        agents: sim.registry.agent_count(),
        entities: sim.registry.entity_count(),
        contracts: sim.contracts.len(),
        started_at: state.started_at.to_rfc3339(),
    })
}

/// `POST /control/pause`
pub async fn pause(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.scheduler.pause();
    info!("simulation paused");
    Json(serde_json::json!({"paused": true}))
}

/// `POST /control/resume`
pub async fn resume(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.scheduler.resume();
    info!("simulation resumed");
    Json(serde_json::json!({"paused": false}))
}

/// `POST /control/speed`
pub async fn set_speed(
    State(state): State<AppState>,
    Json(body): Json<SpeedBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .scheduler
        .set_speed(body.multiplier)
        .map_err(|e| ApiError::InvalidParameter(e.to_string()))?;
    Ok(Json(serde_json::json!({"speed": body.multiplier})))
}

/// `POST /control/tick`
pub async fn set_tick(
    State(state): State<AppState>,
    Json(body): Json<TickBody>,
) -> Json<serde_json::Value> {
    state.scheduler.set_tick(body.tick);
    Json(serde_json::json!({"tick": body.tick}))
}

/// `POST /world/generate`
///
/// Replaces the whole simulation state with a freshly generated world
/// and rewinds the tick counter.
pub async fn generate_world(
    State(state): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let config: SimConfig = {
        let sim = state.sim.read().await;
        sim.config.clone()
    };
    let params = GenerateParams {
        size: body.size.unwrap_or(config.world.size),
        agent_count: body.agent_count.unwrap_or(config.world.agent_count),
        resource_density: body.resource_density.unwrap_or(config.world.resource_density),
        seed: body.seed.or(config.world.seed),
    };
    let registry = generate(&params).map_err(|e| ApiError::InvalidParameter(e.to_string()))?;
    let agents = registry.agent_count();
    let entities = registry.entity_count();

    let mut sim = state.sim.write().await;
    *sim = SimState::new(registry, config);
    state.scheduler.set_tick(0);
    info!(agents, entities, "world regenerated");
    Ok(Json(serde_json::json!({
        "agents": agents,
        "entities": entities,
    })))
}

/// `GET /world/snapshot`
pub async fn world_snapshot(State(state): State<AppState>) -> Json<WorldSnapshot> {
    let tick = state.scheduler.status().tick;
    let sim = state.sim.read().await;
    Json(snapshot(&sim.registry, tick))
}

/// `GET /world/changes`
pub async fn world_changes(
    State(state): State<AppState>,
    Query(query): Query<ChangesQuery>,
) -> Json<Vec<ChangeSet>> {
    let since = query.since.unwrap_or(0);
    let ring = state.changes.read().await;
    Json(
        ring.iter()
            .filter(|set| set.tick > since)
            .cloned()
            .collect(),
    )
}

/// `POST /entities/agents`
pub async fn create_agent(
    State(state): State<AppState>,
    Json(agent): Json<Agent>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut sim = state.sim.write().await;
    let id = sim
        .registry
        .create_agent(agent)
        .map_err(|e| ApiError::InvalidParameter(e.to_string()))?;
    Ok(Json(serde_json::json!({"id": id})))
}

/// `PATCH /entities/{id}` — move an entity to a new position.
pub async fn move_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MoveBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = Uuid::parse_str(&id).map_err(|_| ApiError::InvalidUuid(id.clone()))?;
    let position = Position::new(body.x, body.y);

    let mut sim = state.sim.write().await;
    let kind = sim
        .registry
        .kind_of(raw)
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;
    let moved = match kind {
        steading_types::EntityKind::Agent => sim
            .registry
            .update_agent(raw.into(), |a| a.position = position),
        steading_types::EntityKind::Resource => sim
            .registry
            .update_resource(raw.into(), |r| r.position = position),
        steading_types::EntityKind::Structure => sim
            .registry
            .update_structure(raw.into(), |s| s.position = position),
    };
    moved.map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(serde_json::json!({"id": raw, "moved": true})))
}

/// `DELETE /entities/{id}`
pub async fn delete_entity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let raw = Uuid::parse_str(&id).map_err(|_| ApiError::InvalidUuid(id.clone()))?;
    let mut sim = state.sim.write().await;
    sim.registry
        .remove(raw)
        .map_err(|e| ApiError::NotFound(e.to_string()))?;
    sim.visibility.forget_agent(AgentId::from(raw));
    Ok(Json(serde_json::json!({"id": raw, "removed": true})))
}

/// `POST /agents/{id}/suggest` — pass candidate actions through the
/// planner's utility scorer.
pub async fn suggest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(options): Json<Vec<CandidateAction>>,
) -> Result<Json<ScoredAction>, ApiError> {
    let raw = Uuid::parse_str(&id).map_err(|_| ApiError::InvalidUuid(id.clone()))?;
    let view = {
        let sim = state.sim.read().await;
        let agent = sim
            .registry
            .agent(AgentId::from(raw))
            .ok_or_else(|| ApiError::NotFound(id.clone()))?;
        steading_core::perception::agent_view(agent)
    };

    let request = UtilityRequest {
        agent: view,
        options,
    };
    let best = state
        .planner
        .best_action(request)
        .await
        .map_err(|e| ApiError::Planner(e.to_string()))?;
    Ok(Json(best))
}

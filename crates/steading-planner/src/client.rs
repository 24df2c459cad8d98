//! The reqwest-backed [`PlanSource`] implementation.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use steading_core::{PlanError, PlanSource};
use steading_types::{PlanRequest, ScoredAction, UtilityRequest};

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// HTTP client for the external planning service.
pub struct HttpPlanner {
    /// Shared HTTP connection pool.
    client: reqwest::Client,
    /// Service base URL, without a trailing slash.
    base_url: String,
    /// Per-request timeout.
    timeout: std::time::Duration,
}

impl HttpPlanner {
    /// Create a client for the service at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// POST a JSON body and parse the JSON response.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, PlanError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| PlanError::Unreachable {
                message: format!("{path} request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unable to read error body"));
            return Err(PlanError::Protocol {
                message: format!("{path} returned {status}: {error_body}"),
            });
        }

        response.json().await.map_err(|e| PlanError::Protocol {
            message: format!("{path} response parse failed: {e}"),
        })
    }
}

/// Wire body for `/plan_actions`, in the service's naming.
fn plan_body(request: &PlanRequest) -> Value {
    serde_json::json!({
        "npc_state": request.agent,
        "goal": request.goal,
        "world_state": {
            "nearby": request.nearby,
            "tick": request.tick,
        },
    })
}

/// Wire body for `/calculate_utility`.
fn utility_body(request: &UtilityRequest) -> Value {
    serde_json::json!({
        "npc": request.agent,
        "options": request.options,
    })
}

/// `/plan_actions` response shape.
#[derive(Debug, Deserialize)]
struct PlanActionsResponse {
    /// The ordered step identifiers, or `null` when planning failed.
    plan: Option<Vec<String>>,
}

/// `/calculate_utility` response shape.
#[derive(Debug, Deserialize)]
struct UtilityResponse {
    /// The winning candidate's name, or `null` when nothing scored.
    name: Option<String>,
    /// The winning utility value.
    #[serde(default)]
    utility: f64,
}

/// Interpret a `/plan_actions` response.
fn extract_plan(json: &Value) -> Result<Vec<String>, PlanError> {
    let response: PlanActionsResponse =
        serde_json::from_value(json.clone()).map_err(|e| PlanError::Protocol {
            message: format!("malformed plan response: {e}"),
        })?;
    match response.plan {
        Some(steps) if !steps.is_empty() => Ok(steps),
        _ => Err(PlanError::Empty),
    }
}

/// Interpret a `/calculate_utility` response.
fn extract_best_action(json: &Value) -> Result<ScoredAction, PlanError> {
    let response: UtilityResponse =
        serde_json::from_value(json.clone()).map_err(|e| PlanError::Protocol {
            message: format!("malformed utility response: {e}"),
        })?;
    response.name.map_or(Err(PlanError::Empty), |name| {
        Ok(ScoredAction {
            name,
            utility: response.utility,
        })
    })
}

impl PlanSource for HttpPlanner {
    async fn plan(&self, request: PlanRequest) -> Result<Vec<String>, PlanError> {
        let body = plan_body(&request);
        let json = self.post("/plan_actions", &body).await?;
        let steps = extract_plan(&json)?;
        debug!(agent = %request.agent.id, steps = steps.len(), "plan received");
        Ok(steps)
    }

    async fn best_action(&self, request: UtilityRequest) -> Result<ScoredAction, PlanError> {
        let body = utility_body(&request);
        let json = self.post("/calculate_utility", &body).await?;
        extract_best_action(&json)
    }
}

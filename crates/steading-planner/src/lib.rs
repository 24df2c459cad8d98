//! HTTP client for the external planning service.
//!
//! The service exposes two endpoints:
//!
//! - `POST /plan_actions` — takes the agent's public state, its active
//!   goal, and a world-state summary; answers `{"plan": [...]}` with an
//!   ordered list of step identifiers, or `{"plan": null}` when it
//!   could not plan.
//! - `POST /calculate_utility` — takes the agent and a candidate action
//!   list; answers the best action's name and utility.
//!
//! Both calls are fallible and latency-bearing by contract: transport
//! failures, non-2xx statuses, and unparseable bodies all map to
//! [`PlanError`] so the orchestrator can abandon the goal and move on.

pub mod client;

pub use client::HttpPlanner;

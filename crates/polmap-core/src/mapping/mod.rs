//! Field resolution and mapping pipeline.
//!
//! Stages, in run order: candidate resolution ([`resolver`]) driven by a
//! per-insurer strategy ([`strategy`]), locale-aware parsing ([`locale`]),
//! master-data reconciliation ([`reconcile`]), schedule computation
//! ([`schedule`]) and observations/findings assembly ([`observations`]).
//! [`orchestrator`] wires the stages together fail-soft.

pub mod conflict;
pub mod locale;
pub mod observations;
pub mod orchestrator;
pub mod patterns;
pub mod reconcile;
pub mod resolver;
pub mod schedule;
pub mod strategy;

pub use conflict::check_policy_conflict;
pub use orchestrator::{MappingContext, PolicyMapper};
pub use reconcile::ReconcileOutcome;
pub use resolver::{FieldCandidate, ResolvedField};
pub use strategy::{strategy_for, MappingStrategy};

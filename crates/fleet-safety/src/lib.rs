//! Fleet-safety inspection core.
//!
//! The heart of the crate is [`workflows::inspection`]: the pre-trip and
//! post-trip wizard step tracker, the inspection status state machine, and
//! the scoring engines that derive section percentages, violation-point risk
//! levels, and final verdicts from checklist answers. Persistence,
//! authorization, and audit logging are collaborator traits supplied by the
//! embedding application.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

//! Inspection workflow core: the pre-trip/post-trip wizard step tracker,
//! the approval state machine, and the scoring engines that derive section
//! percentages, violation-point risk, and the final 50/50 verdict.

pub mod catalog;
pub mod domain;
pub mod evaluation;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
mod state;
pub mod steps;

#[cfg(test)]
mod tests;

pub use catalog::{ChecklistCatalog, ChecklistItem, DrivingBehaviorItem, TripBehaviorItem};
pub use domain::{
    ActorId, AnswerStatus, ChecklistAnswers, ChecklistItemAnswer, DriverId, InspectionError,
    InspectionId, InspectionInstance, InspectionStatus, InspectionSummary, MechanicId,
    SectionKind, SignOff, SignOffRole, StepPayload, SupervisorRemarks, TripDetails, VehicleId,
    WizardKind, STEPS_PER_WIZARD,
};
pub use evaluation::{EvaluationScores, EvaluationSummary, PerformanceLevel};
pub use repository::{
    AuditAction, AuditEntry, AuditError, AuditSink, Authorizer, InspectionStore, StoreError,
};
pub use router::inspection_router;
pub use scoring::risk::{RiskLevel, RiskPointCalculator, RiskScore, TripPointsEntry};
pub use scoring::{FinalScore, FinalStatus, RiskBand, ScoreSummary, ScoringEngine, SectionScore};
pub use service::{InspectionService, SavedStep, ServiceError, StartedInspection};
pub use steps::{StepProgress, StepRecord, StepSet, StepTracker};

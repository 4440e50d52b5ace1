use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{
    ActorId, ChecklistItemAnswer, DriverId, InspectionId, InspectionInstance, InspectionSummary,
    SectionKind, WizardKind,
};
use super::steps::{StepRecord, StepSet};

/// Storage abstraction. The core never retries store failures; retry policy
/// belongs to the implementation behind this trait.
pub trait InspectionStore: Send + Sync {
    fn insert_instance(
        &self,
        instance: InspectionInstance,
    ) -> Result<InspectionInstance, StoreError>;

    fn update_instance(&self, instance: InspectionInstance) -> Result<(), StoreError>;

    fn fetch_instance(&self, id: &InspectionId) -> Result<Option<InspectionInstance>, StoreError>;

    /// Returns an empty set when no steps have been saved for the wizard.
    fn load_step_set(&self, id: &InspectionId, wizard: WizardKind) -> Result<StepSet, StoreError>;

    /// Upsert keyed by (inspection, wizard, step number).
    fn upsert_step_record(
        &self,
        id: &InspectionId,
        wizard: WizardKind,
        record: StepRecord,
    ) -> Result<(), StoreError>;

    /// Replace every answer row for the section: delete-all-then-recreate,
    /// never a partial-item update.
    fn replace_answers(
        &self,
        id: &InspectionId,
        section: SectionKind,
        answers: Vec<ChecklistItemAnswer>,
    ) -> Result<(), StoreError>;

    fn list_answers(
        &self,
        id: &InspectionId,
        section: SectionKind,
    ) -> Result<Vec<ChecklistItemAnswer>, StoreError>;

    /// Inspections for one driver with `inspection_date` in `[from, to]`,
    /// both ends inclusive. Feeds the rolling risk window and may serve
    /// eventually-consistent data.
    fn list_driver_inspections(
        &self,
        driver: &DriverId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<InspectionSummary>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// External role logic. The core only asks; it implements no role rules of
/// its own.
pub trait Authorizer: Send + Sync {
    fn can_submit(&self, actor: &ActorId, inspection: &InspectionInstance) -> bool;
    fn can_approve(&self, actor: &ActorId) -> bool;
}

/// Action vocabulary recorded on the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    SaveStep,
    Submit,
    Approve,
    Reject,
    StartPostTrip,
    CompletePostTrip,
}

impl AuditAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::SaveStep => "save_step",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::StartPostTrip => "start_post_trip",
            Self::CompletePostTrip => "complete_post_trip",
        }
    }
}

/// One appended audit row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub inspection: InspectionId,
    pub action: AuditAction,
    pub actor: ActorId,
    pub timestamp: DateTime<Utc>,
}

/// Fire-and-forget audit appender. Failures are logged by the service and
/// never surface to callers.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit transport unavailable: {0}")]
    Transport(String),
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::evaluation::EvaluationScores;

/// Identifier wrapper for inspection instances.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InspectionId(pub String);

/// Identifier wrapper for drivers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub String);

/// Identifier wrapper for vehicles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub String);

/// Identifier wrapper for mechanics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MechanicId(pub String);

/// Identifier for any acting user (supervisors, fleet managers).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

/// Top-level status tracked throughout the inspection workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    PostTripInProgress,
    PostTripCompleted,
}

impl InspectionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::PostTripInProgress => "post_trip_in_progress",
            Self::PostTripCompleted => "post_trip_completed",
        }
    }

    /// Pre-trip steps may only be edited while the inspection is still with
    /// the supervisor.
    pub const fn can_edit_pre_trip(self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }

    pub const fn can_edit_post_trip(self) -> bool {
        matches!(self, Self::Approved | Self::PostTripInProgress)
    }
}

impl fmt::Display for InspectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two 9-step wizards that make up one inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardKind {
    PreTrip,
    PostTrip,
}

/// Both wizards carry the same number of ordered steps.
pub const STEPS_PER_WIZARD: u8 = 9;

impl WizardKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PreTrip => "pre_trip",
            Self::PostTrip => "post_trip",
        }
    }

    /// Checklist section backing a step, if the step is checklist-style.
    pub const fn section_for_step(self, step: u8) -> Option<SectionKind> {
        match (self, step) {
            (Self::PreTrip, 2) => Some(SectionKind::HealthFitness),
            (Self::PreTrip, 3) => Some(SectionKind::Documentation),
            (Self::PreTrip, 4) => Some(SectionKind::Exterior),
            (Self::PreTrip, 5) => Some(SectionKind::EngineFluid),
            (Self::PreTrip, 6) => Some(SectionKind::InteriorCabin),
            (Self::PreTrip, 7) => Some(SectionKind::Functional),
            (Self::PreTrip, 8) => Some(SectionKind::SafetyEquipment),
            (Self::PostTrip, 1) => Some(SectionKind::TripBehavior),
            (Self::PostTrip, 2) => Some(SectionKind::DrivingBehavior),
            (Self::PostTrip, 3) => Some(SectionKind::PostTripReport),
            _ => None,
        }
    }

    /// Behavior steps only count toward completion once every catalog item
    /// of their section carries a status; all other steps count as soon as a
    /// record exists.
    pub const fn requires_full_section(self, step: u8) -> bool {
        matches!((self, step), (Self::PostTrip, 1) | (Self::PostTrip, 2))
    }

    pub const fn step_label(self, step: u8) -> &'static str {
        match (self, step) {
            (Self::PreTrip, 1) => "Trip Details",
            (Self::PreTrip, 2) => "Health & Fitness Check",
            (Self::PreTrip, 3) => "Documentation & Compliance",
            (Self::PreTrip, 4) => "Exterior Checks",
            (Self::PreTrip, 5) => "Engine & Fluid Checks",
            (Self::PreTrip, 6) => "Interior & Cabin Checks",
            (Self::PreTrip, 7) => "Functional Checks",
            (Self::PreTrip, 8) => "Safety Equipment Checks",
            (Self::PreTrip, 9) => "Supervisor Remarks",
            (Self::PostTrip, 1) => "Trip Behavior Monitoring",
            (Self::PostTrip, 2) => "Driving Behavior Check",
            (Self::PostTrip, 3) => "Post-Trip Report",
            (Self::PostTrip, 4) => "Risk Review",
            (Self::PostTrip, 5) => "Corrective Measures",
            (Self::PostTrip, 6) => "Enforcement Actions",
            (Self::PostTrip, 7) => "Evaluation Summary",
            (Self::PostTrip, 8) => "Supervisor Sign-Off",
            (Self::PostTrip, 9) => "Driver Signature",
            _ => "Unknown Step",
        }
    }
}

impl fmt::Display for WizardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named checklist sections across both wizards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    HealthFitness,
    Documentation,
    Exterior,
    EngineFluid,
    InteriorCabin,
    Functional,
    SafetyEquipment,
    TripBehavior,
    DrivingBehavior,
    PostTripReport,
}

impl SectionKind {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::HealthFitness,
            Self::Documentation,
            Self::Exterior,
            Self::EngineFluid,
            Self::InteriorCabin,
            Self::Functional,
            Self::SafetyEquipment,
            Self::TripBehavior,
            Self::DrivingBehavior,
            Self::PostTripReport,
        ]
    }

    pub const fn pre_trip() -> [Self; 7] {
        [
            Self::HealthFitness,
            Self::Documentation,
            Self::Exterior,
            Self::EngineFluid,
            Self::InteriorCabin,
            Self::Functional,
            Self::SafetyEquipment,
        ]
    }

    pub const fn post_trip() -> [Self; 3] {
        [
            Self::TripBehavior,
            Self::DrivingBehavior,
            Self::PostTripReport,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::HealthFitness => "health_fitness",
            Self::Documentation => "documentation",
            Self::Exterior => "exterior",
            Self::EngineFluid => "engine_fluid",
            Self::InteriorCabin => "interior_cabin",
            Self::Functional => "functional",
            Self::SafetyEquipment => "safety_equipment",
            Self::TripBehavior => "trip_behavior",
            Self::DrivingBehavior => "driving_behavior",
            Self::PostTripReport => "post_trip_report",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HealthFitness => "Health & Fitness",
            Self::Documentation => "Documentation & Compliance",
            Self::Exterior => "Vehicle Exterior",
            Self::EngineFluid => "Engine & Fluids",
            Self::InteriorCabin => "Interior & Cabin",
            Self::Functional => "Functional Checks",
            Self::SafetyEquipment => "Safety Equipment",
            Self::TripBehavior => "Trip Behavior Monitoring",
            Self::DrivingBehavior => "Driving Behavior",
            Self::PostTripReport => "Post-Trip Report",
        }
    }

    pub const fn wizard(self) -> WizardKind {
        match self {
            Self::TripBehavior | Self::DrivingBehavior | Self::PostTripReport => {
                WizardKind::PostTrip
            }
            _ => WizardKind::PreTrip,
        }
    }

    /// Answer domains vary by section: vehicle checks are pass/fail, trip
    /// behavior is compliant/violation/none, and so on.
    pub const fn allowed_statuses(self) -> &'static [AnswerStatus] {
        match self {
            Self::HealthFitness => &[
                AnswerStatus::Pass,
                AnswerStatus::Fail,
                AnswerStatus::Yes,
                AnswerStatus::No,
            ],
            Self::Documentation => &[
                AnswerStatus::Valid,
                AnswerStatus::Invalid,
                AnswerStatus::Yes,
                AnswerStatus::No,
            ],
            Self::Exterior
            | Self::EngineFluid
            | Self::InteriorCabin
            | Self::Functional
            | Self::SafetyEquipment => &[AnswerStatus::Pass, AnswerStatus::Fail],
            Self::TripBehavior => &[
                AnswerStatus::Compliant,
                AnswerStatus::Violation,
                AnswerStatus::NotApplicable,
            ],
            Self::DrivingBehavior | Self::PostTripReport => {
                &[AnswerStatus::Yes, AnswerStatus::No]
            }
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Status of a single checklist answer. The pass-equivalent values are
/// `pass`, `yes`, `valid`, and `compliant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Pass,
    Fail,
    Yes,
    No,
    Valid,
    Invalid,
    Compliant,
    Violation,
    #[serde(rename = "none")]
    NotApplicable,
}

impl AnswerStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Yes => "yes",
            Self::No => "no",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Compliant => "compliant",
            Self::Violation => "violation",
            Self::NotApplicable => "none",
        }
    }

    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Pass | Self::Yes | Self::Valid | Self::Compliant)
    }

    pub const fn is_negative(self) -> bool {
        matches!(self, Self::Fail | Self::No | Self::Invalid | Self::Violation)
    }
}

impl fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One answered checklist item within a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItemAnswer {
    pub item: String,
    pub status: AnswerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl ChecklistItemAnswer {
    pub fn new(item: impl Into<String>, status: AnswerStatus) -> Self {
        Self {
            item: item.into(),
            status,
            remarks: None,
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    pub fn has_remarks(&self) -> bool {
        self.remarks
            .as_deref()
            .map(|text| !text.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Basic trip information captured by pre-trip step 1. Saving it creates the
/// inspection instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripDetails {
    pub driver: DriverId,
    pub vehicle: VehicleId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanic: Option<MechanicId>,
    pub supervisor: ActorId,
    pub inspection_date: NaiveDate,
    pub route: String,
    pub approved_driving_hours: String,
    #[serde(default)]
    pub approved_rest_stops: u32,
}

/// Free-text supervisor verdict captured by pre-trip step 9.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorRemarks {
    pub supervisor_name: String,
    pub remarks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

/// Acknowledgement that the computed risk score was reviewed (post-trip
/// step 4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAcknowledgement {
    pub reviewed_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureKind {
    SafetyTraining,
    PerformanceReview,
    ProbationaryPeriod,
    PolicyAcknowledgment,
}

impl MeasureKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SafetyTraining => "Safety Training",
            Self::PerformanceReview => "Performance Review",
            Self::ProbationaryPeriod => "Probationary Period",
            Self::PolicyAcknowledgment => "Policy Acknowledgment",
        }
    }
}

/// Corrective measure assigned off the back of inspection results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectiveMeasure {
    pub measure: MeasureKind,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    VerbalWarning,
    WrittenWarning,
    Suspension,
    FinalWarning,
    Termination,
    Other,
}

impl ActionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::VerbalWarning => "Verbal Warning",
            Self::WrittenWarning => "Written Warning",
            Self::Suspension => "Suspension",
            Self::FinalWarning => "Final Warning",
            Self::Termination => "Termination",
            Self::Other => "Other",
        }
    }
}

/// Enforcement action recorded against the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementAction {
    pub action: ActionKind,
    #[serde(default)]
    pub applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOffRole {
    Driver,
    Supervisor,
    Mechanic,
}

impl SignOffRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Driver => "Driver",
            Self::Supervisor => "Supervisor",
            Self::Mechanic => "Mechanic",
        }
    }
}

/// Signature record closing out a wizard (post-trip steps 8 and 9).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignOff {
    pub role: SignOffRole,
    pub signer_name: String,
}

/// Checklist answers for one section, saved as a single step payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistAnswers {
    pub section: SectionKind,
    pub answers: Vec<ChecklistItemAnswer>,
}

/// Structured payload for one wizard step. The accepted variant depends on
/// the step number; checklist-style steps all share the `Checklist` shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepPayload {
    TripDetails(TripDetails),
    Checklist(ChecklistAnswers),
    SupervisorRemarks(SupervisorRemarks),
    RiskReview(RiskAcknowledgement),
    CorrectiveMeasures { measures: Vec<CorrectiveMeasure> },
    EnforcementActions { actions: Vec<EnforcementAction> },
    Evaluation(EvaluationScores),
    SignOff(SignOff),
}

impl StepPayload {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::TripDetails(_) => "trip_details",
            Self::Checklist(_) => "checklist",
            Self::SupervisorRemarks(_) => "supervisor_remarks",
            Self::RiskReview(_) => "risk_review",
            Self::CorrectiveMeasures { .. } => "corrective_measures",
            Self::EnforcementActions { .. } => "enforcement_actions",
            Self::Evaluation(_) => "evaluation",
            Self::SignOff(_) => "sign_off",
        }
    }
}

/// One inspection run for a driver/vehicle pairing, spanning the pre-trip
/// wizard, the approval gate, and the post-trip wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionInstance {
    pub id: InspectionId,
    /// Human-readable code in the form `INSP-0001`.
    pub code: String,
    pub details: TripDetails,
    pub status: InspectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<ActorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_trip_completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Condensed listing row, used for rolling risk aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionSummary {
    pub id: InspectionId,
    pub driver: DriverId,
    pub inspection_date: NaiveDate,
    pub status: InspectionStatus,
}

/// Local validation failures. Every rejected operation leaves state
/// untouched; none of these are retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InspectionError {
    #[error("unknown checklist item '{item}' for section {section}")]
    UnknownChecklistItem { section: SectionKind, item: String },
    #[error("status '{status}' is not accepted for section {section}")]
    StatusNotAllowed {
        section: SectionKind,
        item: String,
        status: AnswerStatus,
    },
    #[error("checklist item '{item}' answered more than once")]
    DuplicateChecklistItem { item: String },
    #[error("remarks are required for the failing answer on '{item}'")]
    MissingRequiredRemarks { item: String },
    #[error("step {0} is outside the 1-9 range")]
    InvalidStepNumber(u8),
    #[error("step {step} cannot be saved before step {requires}")]
    StepOutOfOrder { step: u8, requires: u8 },
    #[error("step {step} of the {wizard} wizard does not accept a '{kind}' payload")]
    UnexpectedPayload {
        wizard: WizardKind,
        step: u8,
        kind: &'static str,
    },
    #[error("cannot transition from '{from}' to '{to}'")]
    IllegalTransition {
        from: InspectionStatus,
        to: InspectionStatus,
    },
    #[error("the {wizard} wizard cannot be edited while the inspection is '{status}'")]
    EditNotAllowed {
        wizard: WizardKind,
        status: InspectionStatus,
    },
    #[error("submission incomplete: missing steps {missing_steps:?}")]
    IncompleteSubmission { missing_steps: Vec<u8> },
    #[error("a rejection reason is required")]
    MissingRejectionReason,
    #[error("actor '{actor}' is not permitted to {action}")]
    Unauthorized { actor: String, action: &'static str },
    #[error("evaluation score {0} is outside the 1-5 range")]
    InvalidEvaluationScore(u8),
    #[error("a non-empty signer name is required for the {0} sign-off")]
    MissingSignature(&'static str),
}

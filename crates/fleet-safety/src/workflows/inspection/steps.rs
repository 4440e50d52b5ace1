use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::catalog::ChecklistCatalog;
use super::domain::{
    ChecklistAnswers, InspectionError, SectionKind, SignOffRole, StepPayload, WizardKind,
    STEPS_PER_WIZARD,
};

/// Persisted payload for one numbered step of one wizard instance.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    pub step: u8,
    pub payload: StepPayload,
    pub saved_at: DateTime<Utc>,
}

/// The saved steps of one wizard, keyed by step number.
#[derive(Debug, Clone, Default)]
pub struct StepSet {
    records: BTreeMap<u8, StepRecord>,
}

impl StepSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, step: u8) -> Option<&StepRecord> {
        self.records.get(&step)
    }

    pub fn contains(&self, step: u8) -> bool {
        self.records.contains_key(&step)
    }

    pub fn insert(&mut self, record: StepRecord) {
        self.records.insert(record.step, record);
    }

    pub fn records(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Completion snapshot returned after every save and on demand for resume
/// views. `next_step` is the smallest unfilled step number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub completed_steps: Vec<u8>,
    pub next_step: Option<u8>,
    pub completion_percentage: u8,
    pub is_complete: bool,
}

/// Validates and applies step saves for a wizard, and derives completion
/// state. The tracker owns no storage; callers pass the current `StepSet`.
pub struct StepTracker<'a> {
    catalog: &'a ChecklistCatalog,
}

impl<'a> StepTracker<'a> {
    pub fn new(catalog: &'a ChecklistCatalog) -> Self {
        Self { catalog }
    }

    /// Upsert one step. Saving the same step twice with the same payload is
    /// idempotent; a different payload overwrites without touching any other
    /// step.
    pub fn record_step(
        &self,
        wizard: WizardKind,
        set: &mut StepSet,
        step: u8,
        payload: StepPayload,
        saved_at: DateTime<Utc>,
    ) -> Result<StepProgress, InspectionError> {
        if !(1..=STEPS_PER_WIZARD).contains(&step) {
            return Err(InspectionError::InvalidStepNumber(step));
        }
        if step != 1 && !set.contains(1) {
            return Err(InspectionError::StepOutOfOrder { step, requires: 1 });
        }

        self.validate_payload(wizard, step, &payload)?;

        set.insert(StepRecord {
            step,
            payload,
            saved_at,
        });

        Ok(self.progress(wizard, set))
    }

    /// Completion state for the given wizard. Behavior steps (trip and
    /// driving behavior) only count once every catalog item of their section
    /// has a status; partial saves persist without counting.
    pub fn progress(&self, wizard: WizardKind, set: &StepSet) -> StepProgress {
        let completed_steps: Vec<u8> = (1..=STEPS_PER_WIZARD)
            .filter(|&step| self.step_is_complete(wizard, set, step))
            .collect();

        let next_step = (1..=STEPS_PER_WIZARD).find(|step| !completed_steps.contains(step));
        let is_complete = next_step.is_none();
        let completion_percentage = ((completed_steps.len() as f64 / STEPS_PER_WIZARD as f64)
            * 100.0)
            .round() as u8;

        StepProgress {
            completed_steps,
            next_step,
            completion_percentage,
            is_complete,
        }
    }

    /// Steps that still block a `draft -> submitted` transition: any step
    /// without a record, plus any pre-trip checklist step whose section is
    /// not fully answered.
    pub fn missing_for_submission(&self, set: &StepSet) -> Vec<u8> {
        (1..=STEPS_PER_WIZARD)
            .filter(|&step| {
                let Some(record) = set.record(step) else {
                    return true;
                };
                match WizardKind::PreTrip.section_for_step(step) {
                    Some(section) => !Self::covers_section(self.catalog, section, record),
                    None => false,
                }
            })
            .collect()
    }

    fn step_is_complete(&self, wizard: WizardKind, set: &StepSet, step: u8) -> bool {
        let Some(record) = set.record(step) else {
            return false;
        };
        if !wizard.requires_full_section(step) {
            return true;
        }
        match wizard.section_for_step(step) {
            Some(section) => Self::covers_section(self.catalog, section, record),
            None => true,
        }
    }

    fn covers_section(catalog: &ChecklistCatalog, section: SectionKind, record: &StepRecord) -> bool {
        let StepPayload::Checklist(checklist) = &record.payload else {
            return false;
        };
        catalog.items(section).iter().all(|spec| {
            checklist
                .answers
                .iter()
                .any(|answer| answer.item == spec.key)
        })
    }

    fn validate_payload(
        &self,
        wizard: WizardKind,
        step: u8,
        payload: &StepPayload,
    ) -> Result<(), InspectionError> {
        let unexpected = || InspectionError::UnexpectedPayload {
            wizard,
            step,
            kind: payload.kind(),
        };

        if let Some(section) = wizard.section_for_step(step) {
            let StepPayload::Checklist(checklist) = payload else {
                return Err(unexpected());
            };
            if checklist.section != section {
                return Err(unexpected());
            }
            return self.validate_checklist(checklist);
        }

        match (wizard, step, payload) {
            (WizardKind::PreTrip, 1, StepPayload::TripDetails(_)) => Ok(()),
            (WizardKind::PreTrip, 9, StepPayload::SupervisorRemarks(_)) => Ok(()),
            (WizardKind::PostTrip, 4, StepPayload::RiskReview(_)) => Ok(()),
            (WizardKind::PostTrip, 5, StepPayload::CorrectiveMeasures { .. }) => Ok(()),
            (WizardKind::PostTrip, 6, StepPayload::EnforcementActions { .. }) => Ok(()),
            (WizardKind::PostTrip, 7, StepPayload::Evaluation(scores)) => scores.validate(),
            (WizardKind::PostTrip, 8, StepPayload::SignOff(sign_off)) => {
                Self::validate_sign_off(sign_off, SignOffRole::Supervisor)
            }
            (WizardKind::PostTrip, 9, StepPayload::SignOff(sign_off)) => {
                Self::validate_sign_off(sign_off, SignOffRole::Driver)
            }
            _ => Err(unexpected()),
        }
    }

    /// The whole step save is rejected on the first invalid answer; nothing
    /// is written partially.
    fn validate_checklist(&self, checklist: &ChecklistAnswers) -> Result<(), InspectionError> {
        let section = checklist.section;
        let mut seen: Vec<&str> = Vec::with_capacity(checklist.answers.len());

        for answer in &checklist.answers {
            let Some(spec) = self.catalog.item(section, &answer.item) else {
                return Err(InspectionError::UnknownChecklistItem {
                    section,
                    item: answer.item.clone(),
                });
            };
            if seen.contains(&answer.item.as_str()) {
                return Err(InspectionError::DuplicateChecklistItem {
                    item: answer.item.clone(),
                });
            }
            seen.push(&answer.item);

            if !section.allowed_statuses().contains(&answer.status) {
                return Err(InspectionError::StatusNotAllowed {
                    section,
                    item: answer.item.clone(),
                    status: answer.status,
                });
            }

            if spec.remarks_required_on_negative
                && answer.status.is_negative()
                && !answer.has_remarks()
            {
                return Err(InspectionError::MissingRequiredRemarks {
                    item: answer.item.clone(),
                });
            }
        }

        Ok(())
    }

    fn validate_sign_off(
        sign_off: &super::domain::SignOff,
        expected: SignOffRole,
    ) -> Result<(), InspectionError> {
        if sign_off.role != expected {
            return Err(InspectionError::MissingSignature(expected.label()));
        }
        if sign_off.signer_name.trim().is_empty() {
            return Err(InspectionError::MissingSignature(expected.label()));
        }
        Ok(())
    }
}

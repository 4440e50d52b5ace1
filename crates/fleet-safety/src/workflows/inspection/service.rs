use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::catalog::ChecklistCatalog;
use super::domain::{
    ActorId, InspectionError, InspectionId, InspectionInstance, InspectionStatus, SectionKind,
    StepPayload, TripDetails, WizardKind,
};
use super::evaluation::EvaluationSummary;
use super::repository::{AuditAction, AuditEntry, AuditSink, Authorizer, InspectionStore, StoreError};
use super::scoring::risk::{RiskPointCalculator, RiskScore, TripPointsEntry};
use super::scoring::{FinalScore, ScoreSummary, ScoringEngine, SectionAnswers};
use super::state::ensure_transition;
use super::steps::{StepProgress, StepTracker};

/// Error raised by the inspection service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] InspectionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of creating an inspection by saving pre-trip step 1.
#[derive(Debug, Clone)]
pub struct StartedInspection {
    pub instance: InspectionInstance,
    pub progress: StepProgress,
}

/// Result of a step save: the (possibly transitioned) status plus fresh
/// completion info for the wizard.
#[derive(Debug, Clone)]
pub struct SavedStep {
    pub status: InspectionStatus,
    pub progress: StepProgress,
}

/// Facade composing the catalog, step tracker, scoring engines, state
/// machine, and the external collaborators. All writes for one inspection
/// id serialize on a per-instance lock so a precondition check can never
/// interleave with a concurrent step save.
pub struct InspectionService<S, Z, A> {
    store: Arc<S>,
    authorizer: Arc<Z>,
    audit: Arc<A>,
    catalog: Arc<ChecklistCatalog>,
    sequence: AtomicU64,
    locks: Mutex<HashMap<InspectionId, Arc<Mutex<()>>>>,
}

impl<S, Z, A> InspectionService<S, Z, A>
where
    S: InspectionStore + 'static,
    Z: Authorizer + 'static,
    A: AuditSink + 'static,
{
    pub fn new(store: Arc<S>, authorizer: Arc<Z>, audit: Arc<A>) -> Self {
        Self {
            store,
            authorizer,
            audit,
            catalog: Arc::new(ChecklistCatalog::standard()),
            sequence: AtomicU64::new(1),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &ChecklistCatalog {
        &self.catalog
    }

    /// Create an inspection in `draft` by saving pre-trip step 1. The
    /// supervisor on the trip details is recorded as the acting user.
    pub fn start(&self, details: TripDetails) -> Result<StartedInspection, ServiceError> {
        let now = Utc::now();
        let (id, code) = self.next_identity();
        let actor = details.supervisor.clone();

        let instance = InspectionInstance {
            id: id.clone(),
            code,
            details: details.clone(),
            status: InspectionStatus::Draft,
            rejection_reason: None,
            approved_by: None,
            approved_at: None,
            post_trip_completed_at: None,
            created_at: now,
        };
        let instance = self.store.insert_instance(instance)?;

        let tracker = StepTracker::new(&self.catalog);
        let mut set = self.store.load_step_set(&id, WizardKind::PreTrip)?;
        let progress = tracker.record_step(
            WizardKind::PreTrip,
            &mut set,
            1,
            StepPayload::TripDetails(details),
            now,
        )?;
        let record = set
            .record(1)
            .cloned()
            .ok_or_else(|| StoreError::Unavailable("step record vanished".to_string()))?;
        self.store
            .upsert_step_record(&id, WizardKind::PreTrip, record)?;

        self.append_audit(&id, AuditAction::Create, &actor);
        info!(inspection = %instance.code, "inspection created");

        Ok(StartedInspection { instance, progress })
    }

    /// Upsert one wizard step. Saving post-trip step 1 on an approved
    /// inspection opens the post-trip phase; saving it again later is a
    /// plain upsert that returns current completion info. Once every
    /// post-trip step is complete (driver signature included) the
    /// inspection closes automatically.
    pub fn save_step(
        &self,
        id: &InspectionId,
        wizard: WizardKind,
        step: u8,
        payload: StepPayload,
        actor: &ActorId,
    ) -> Result<SavedStep, ServiceError> {
        let instance_lock = self.lock_for(id);
        let _guard = instance_lock.lock().expect("instance mutex poisoned");

        let mut instance = self.fetch(id)?;
        self.ensure_editable(&instance, wizard)?;

        let tracker = StepTracker::new(&self.catalog);
        let mut set = self.store.load_step_set(id, wizard)?;
        let progress = tracker.record_step(wizard, &mut set, step, payload.clone(), Utc::now())?;

        // Checklist answers are replaced wholesale for the step's section
        // before the step record is written.
        if let StepPayload::Checklist(checklist) = &payload {
            self.store
                .replace_answers(id, checklist.section, checklist.answers.clone())?;
        }
        let record = set
            .record(step)
            .cloned()
            .ok_or_else(|| StoreError::Unavailable("step record vanished".to_string()))?;
        self.store.upsert_step_record(id, wizard, record)?;
        self.append_audit(id, AuditAction::SaveStep, actor);

        if wizard == WizardKind::PostTrip && instance.status == InspectionStatus::Approved {
            ensure_transition(instance.status, InspectionStatus::PostTripInProgress)?;
            instance.status = InspectionStatus::PostTripInProgress;
            self.store.update_instance(instance.clone())?;
            self.append_audit(id, AuditAction::StartPostTrip, actor);
            info!(inspection = %instance.code, "post-trip phase opened");
        }

        if wizard == WizardKind::PostTrip
            && instance.status == InspectionStatus::PostTripInProgress
            && progress.is_complete
        {
            ensure_transition(instance.status, InspectionStatus::PostTripCompleted)?;
            instance.status = InspectionStatus::PostTripCompleted;
            instance.post_trip_completed_at = Some(Utc::now());
            self.store.update_instance(instance.clone())?;
            self.append_audit(id, AuditAction::CompletePostTrip, actor);
            info!(inspection = %instance.code, "post-trip completed");
        }

        Ok(SavedStep {
            status: instance.status,
            progress,
        })
    }

    /// `draft/rejected -> submitted`. Requires every pre-trip step to be
    /// present and every pre-trip checklist section to be fully answered.
    pub fn submit(&self, id: &InspectionId, actor: &ActorId) -> Result<InspectionInstance, ServiceError> {
        let instance_lock = self.lock_for(id);
        let _guard = instance_lock.lock().expect("instance mutex poisoned");

        let mut instance = self.fetch(id)?;
        ensure_transition(instance.status, InspectionStatus::Submitted)?;

        if !self.authorizer.can_submit(actor, &instance) {
            return Err(InspectionError::Unauthorized {
                actor: actor.0.clone(),
                action: "submit this inspection",
            }
            .into());
        }

        let tracker = StepTracker::new(&self.catalog);
        let set = self.store.load_step_set(id, WizardKind::PreTrip)?;
        let missing_steps = tracker.missing_for_submission(&set);
        if !missing_steps.is_empty() {
            return Err(InspectionError::IncompleteSubmission { missing_steps }.into());
        }

        instance.status = InspectionStatus::Submitted;
        instance.rejection_reason = None;
        self.store.update_instance(instance.clone())?;
        self.append_audit(id, AuditAction::Submit, actor);
        info!(inspection = %instance.code, "inspection submitted for approval");

        Ok(instance)
    }

    /// `submitted -> approved`. The actor must hold the approval capability.
    pub fn approve(&self, id: &InspectionId, actor: &ActorId) -> Result<InspectionInstance, ServiceError> {
        let instance_lock = self.lock_for(id);
        let _guard = instance_lock.lock().expect("instance mutex poisoned");

        let mut instance = self.fetch(id)?;
        ensure_transition(instance.status, InspectionStatus::Approved)?;

        if !self.authorizer.can_approve(actor) {
            return Err(InspectionError::Unauthorized {
                actor: actor.0.clone(),
                action: "approve inspections",
            }
            .into());
        }

        instance.status = InspectionStatus::Approved;
        instance.approved_by = Some(actor.clone());
        instance.approved_at = Some(Utc::now());
        instance.rejection_reason = None;
        self.store.update_instance(instance.clone())?;
        self.append_audit(id, AuditAction::Approve, actor);
        info!(inspection = %instance.code, approver = %actor.0, "inspection approved");

        Ok(instance)
    }

    /// `submitted -> rejected`. A non-empty reason is mandatory and stays
    /// retrievable until re-submission.
    pub fn reject(
        &self,
        id: &InspectionId,
        actor: &ActorId,
        reason: &str,
    ) -> Result<InspectionInstance, ServiceError> {
        let instance_lock = self.lock_for(id);
        let _guard = instance_lock.lock().expect("instance mutex poisoned");

        let mut instance = self.fetch(id)?;
        ensure_transition(instance.status, InspectionStatus::Rejected)?;

        if !self.authorizer.can_approve(actor) {
            return Err(InspectionError::Unauthorized {
                actor: actor.0.clone(),
                action: "reject inspections",
            }
            .into());
        }
        if reason.trim().is_empty() {
            return Err(InspectionError::MissingRejectionReason.into());
        }

        instance.status = InspectionStatus::Rejected;
        instance.rejection_reason = Some(reason.trim().to_string());
        instance.approved_by = Some(actor.clone());
        self.store.update_instance(instance.clone())?;
        self.append_audit(id, AuditAction::Reject, actor);
        info!(inspection = %instance.code, "inspection rejected");

        Ok(instance)
    }

    pub fn instance(&self, id: &InspectionId) -> Result<InspectionInstance, ServiceError> {
        self.fetch(id)
    }

    /// Current completion info for resume views.
    pub fn progress(&self, id: &InspectionId, wizard: WizardKind) -> Result<StepProgress, ServiceError> {
        self.fetch(id)?;
        let tracker = StepTracker::new(&self.catalog);
        let set = self.store.load_step_set(id, wizard)?;
        Ok(tracker.progress(wizard, &set))
    }

    /// Section and overall scores for the pre-trip checklist, recomputed
    /// from the stored answers on every read.
    pub fn pre_trip_score(&self, id: &InspectionId) -> Result<ScoreSummary, ServiceError> {
        self.fetch(id)?;
        let answers = self.section_answers(id, &SectionKind::pre_trip())?;
        let engine = ScoringEngine::new(&self.catalog);
        Ok(engine.pre_trip_summary(&answers))
    }

    pub fn post_checklist_score(&self, id: &InspectionId) -> Result<ScoreSummary, ServiceError> {
        self.fetch(id)?;
        let answers = self.section_answers(id, &SectionKind::post_trip())?;
        let engine = ScoringEngine::new(&self.catalog);
        Ok(engine.post_checklist_summary(&answers))
    }

    /// Final 50/50 verdict over both checklists.
    pub fn final_score(&self, id: &InspectionId) -> Result<FinalScore, ServiceError> {
        let pre = self.pre_trip_score(id)?;
        let post = self.post_checklist_score(id)?;
        Ok(ScoringEngine::final_score(
            pre.overall_percentage,
            post.overall_percentage,
        ))
    }

    /// Violation-point assessment for this trip plus the driver's trailing
    /// 30-day window. The cross-instance read runs without taking other
    /// instances' locks and tolerates eventually-consistent listings.
    pub fn risk_score(&self, id: &InspectionId) -> Result<RiskScore, ServiceError> {
        let instance = self.fetch(id)?;
        let as_of = instance.details.inspection_date;
        let calculator = RiskPointCalculator::new(&self.catalog);

        let trip_answers = self.store.list_answers(id, SectionKind::TripBehavior)?;

        let window_start = as_of - Duration::days(30);
        let listed =
            self.store
                .list_driver_inspections(&instance.details.driver, window_start, as_of)?;

        let mut history = Vec::with_capacity(listed.len());
        for summary in &listed {
            let answers = self
                .store
                .list_answers(&summary.id, SectionKind::TripBehavior)?;
            history.push(TripPointsEntry {
                inspection_date: summary.inspection_date,
                points: calculator.this_trip_points(&answers),
            });
        }

        Ok(calculator.assess(&trip_answers, &history, as_of))
    }

    /// Supervisor evaluation derived from post-trip step 7, if saved.
    pub fn evaluation_summary(
        &self,
        id: &InspectionId,
    ) -> Result<Option<EvaluationSummary>, ServiceError> {
        self.fetch(id)?;
        let set = self.store.load_step_set(id, WizardKind::PostTrip)?;
        let Some(record) = set.record(7) else {
            return Ok(None);
        };
        let StepPayload::Evaluation(scores) = &record.payload else {
            return Ok(None);
        };
        Ok(Some(EvaluationSummary::from_scores(scores.clone())?))
    }

    fn fetch(&self, id: &InspectionId) -> Result<InspectionInstance, ServiceError> {
        Ok(self.store.fetch_instance(id)?.ok_or(StoreError::NotFound)?)
    }

    fn ensure_editable(
        &self,
        instance: &InspectionInstance,
        wizard: WizardKind,
    ) -> Result<(), InspectionError> {
        let editable = match wizard {
            WizardKind::PreTrip => instance.status.can_edit_pre_trip(),
            WizardKind::PostTrip => instance.status.can_edit_post_trip(),
        };
        if editable {
            Ok(())
        } else {
            Err(InspectionError::EditNotAllowed {
                wizard,
                status: instance.status,
            })
        }
    }

    fn section_answers(
        &self,
        id: &InspectionId,
        sections: &[SectionKind],
    ) -> Result<SectionAnswers, ServiceError> {
        let mut answers = SectionAnswers::new();
        for &section in sections {
            answers.insert(section, self.store.list_answers(id, section)?);
        }
        Ok(answers)
    }

    fn next_identity(&self) -> (InspectionId, String) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        (
            InspectionId(format!("insp-{sequence:06}")),
            format!("INSP-{sequence:04}"),
        )
    }

    fn lock_for(&self, id: &InspectionId) -> Arc<Mutex<()>> {
        let mut table = self.locks.lock().expect("lock table mutex poisoned");
        table
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn append_audit(&self, id: &InspectionId, action: AuditAction, actor: &ActorId) {
        let entry = AuditEntry {
            inspection: id.clone(),
            action,
            actor: actor.clone(),
            timestamp: Utc::now(),
        };
        if let Err(err) = self.audit.record(entry) {
            warn!(inspection = %id.0, action = action.label(), %err, "audit append failed");
        }
    }
}

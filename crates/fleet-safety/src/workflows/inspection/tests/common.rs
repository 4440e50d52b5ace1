use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::inspection::catalog::ChecklistCatalog;
use crate::workflows::inspection::domain::{
    ActorId, AnswerStatus, ChecklistAnswers, ChecklistItemAnswer, DriverId, InspectionId,
    InspectionInstance, MechanicId, RiskAcknowledgement, SectionKind, SignOff, SignOffRole,
    StepPayload, SupervisorRemarks, TripDetails, VehicleId, WizardKind,
};
use crate::workflows::inspection::evaluation::EvaluationScores;
use crate::workflows::inspection::repository::{
    AuditEntry, AuditError, AuditSink, Authorizer, InspectionStore, StoreError,
};
use crate::workflows::inspection::service::InspectionService;
use crate::workflows::inspection::steps::{StepRecord, StepSet};
use crate::workflows::inspection::InspectionSummary;

#[derive(Default)]
pub(super) struct MemoryStore {
    instances: Mutex<HashMap<InspectionId, InspectionInstance>>,
    steps: Mutex<HashMap<(InspectionId, WizardKind), StepSet>>,
    answers: Mutex<HashMap<(InspectionId, SectionKind), Vec<ChecklistItemAnswer>>>,
}

impl InspectionStore for MemoryStore {
    fn insert_instance(
        &self,
        instance: InspectionInstance,
    ) -> Result<InspectionInstance, StoreError> {
        let mut guard = self.instances.lock().expect("store mutex poisoned");
        if guard.contains_key(&instance.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(instance.id.clone(), instance.clone());
        Ok(instance)
    }

    fn update_instance(&self, instance: InspectionInstance) -> Result<(), StoreError> {
        let mut guard = self.instances.lock().expect("store mutex poisoned");
        if !guard.contains_key(&instance.id) {
            return Err(StoreError::NotFound);
        }
        guard.insert(instance.id.clone(), instance);
        Ok(())
    }

    fn fetch_instance(&self, id: &InspectionId) -> Result<Option<InspectionInstance>, StoreError> {
        let guard = self.instances.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn load_step_set(&self, id: &InspectionId, wizard: WizardKind) -> Result<StepSet, StoreError> {
        let guard = self.steps.lock().expect("store mutex poisoned");
        Ok(guard
            .get(&(id.clone(), wizard))
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_step_record(
        &self,
        id: &InspectionId,
        wizard: WizardKind,
        record: StepRecord,
    ) -> Result<(), StoreError> {
        let mut guard = self.steps.lock().expect("store mutex poisoned");
        guard
            .entry((id.clone(), wizard))
            .or_default()
            .insert(record);
        Ok(())
    }

    fn replace_answers(
        &self,
        id: &InspectionId,
        section: SectionKind,
        answers: Vec<ChecklistItemAnswer>,
    ) -> Result<(), StoreError> {
        let mut guard = self.answers.lock().expect("store mutex poisoned");
        guard.insert((id.clone(), section), answers);
        Ok(())
    }

    fn list_answers(
        &self,
        id: &InspectionId,
        section: SectionKind,
    ) -> Result<Vec<ChecklistItemAnswer>, StoreError> {
        let guard = self.answers.lock().expect("store mutex poisoned");
        Ok(guard
            .get(&(id.clone(), section))
            .cloned()
            .unwrap_or_default())
    }

    fn list_driver_inspections(
        &self,
        driver: &DriverId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<InspectionSummary>, StoreError> {
        let guard = self.instances.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .filter(|instance| &instance.details.driver == driver)
            .filter(|instance| {
                instance.details.inspection_date >= from && instance.details.inspection_date <= to
            })
            .map(|instance| InspectionSummary {
                id: instance.id.clone(),
                driver: instance.details.driver.clone(),
                inspection_date: instance.details.inspection_date,
                status: instance.status,
            })
            .collect())
    }
}

pub(super) struct AllowAllAuthorizer;

impl Authorizer for AllowAllAuthorizer {
    fn can_submit(&self, _actor: &ActorId, _inspection: &InspectionInstance) -> bool {
        true
    }

    fn can_approve(&self, _actor: &ActorId) -> bool {
        true
    }
}

pub(super) struct DenyAllAuthorizer;

impl Authorizer for DenyAllAuthorizer {
    fn can_submit(&self, _actor: &ActorId, _inspection: &InspectionInstance) -> bool {
        false
    }

    fn can_approve(&self, _actor: &ActorId) -> bool {
        false
    }
}

#[derive(Default)]
pub(super) struct MemoryAudit {
    events: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    pub(super) fn events(&self) -> Vec<AuditEntry> {
        self.events.lock().expect("audit mutex poisoned").clone()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        self.events.lock().expect("audit mutex poisoned").push(entry);
        Ok(())
    }
}

/// Audit sink that always fails, for exercising the fire-and-forget rule.
pub(super) struct FailingAudit;

impl AuditSink for FailingAudit {
    fn record(&self, _entry: AuditEntry) -> Result<(), AuditError> {
        Err(AuditError::Transport("audit log offline".to_string()))
    }
}

pub(super) type TestService = InspectionService<MemoryStore, AllowAllAuthorizer, MemoryAudit>;

pub(super) fn build_service() -> (Arc<TestService>, Arc<MemoryStore>, Arc<MemoryAudit>) {
    let store = Arc::new(MemoryStore::default());
    let audit = Arc::new(MemoryAudit::default());
    let service = Arc::new(InspectionService::new(
        store.clone(),
        Arc::new(AllowAllAuthorizer),
        audit.clone(),
    ));
    (service, store, audit)
}

pub(super) fn supervisor() -> ActorId {
    ActorId("supervisor-01".to_string())
}

pub(super) fn fleet_manager() -> ActorId {
    ActorId("fleet-manager-01".to_string())
}

pub(super) fn inspection_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date")
}

pub(super) fn trip_details() -> TripDetails {
    trip_details_for("driver-01", inspection_date())
}

pub(super) fn trip_details_for(driver: &str, date: NaiveDate) -> TripDetails {
    TripDetails {
        driver: DriverId(driver.to_string()),
        vehicle: VehicleId("ABZ-4521".to_string()),
        mechanic: Some(MechanicId("mechanic-07".to_string())),
        supervisor: supervisor(),
        inspection_date: date,
        route: "Lusaka - Ndola".to_string(),
        approved_driving_hours: "6 hrs 50 mins".to_string(),
        approved_rest_stops: 2,
    }
}

/// The first pass-equivalent status allowed for the section.
pub(super) fn positive_status(section: SectionKind) -> AnswerStatus {
    section
        .allowed_statuses()
        .iter()
        .copied()
        .find(|status| status.is_positive())
        .expect("every section has a positive status")
}

/// Full-coverage answers with every item on its positive status.
pub(super) fn full_positive_answers(
    catalog: &ChecklistCatalog,
    section: SectionKind,
) -> Vec<ChecklistItemAnswer> {
    let status = positive_status(section);
    catalog
        .items(section)
        .iter()
        .map(|spec| ChecklistItemAnswer::new(spec.key, status))
        .collect()
}

pub(super) fn checklist_payload(catalog: &ChecklistCatalog, section: SectionKind) -> StepPayload {
    StepPayload::Checklist(ChecklistAnswers {
        section,
        answers: full_positive_answers(catalog, section),
    })
}

pub(super) fn remarks_payload() -> StepPayload {
    StepPayload::SupervisorRemarks(SupervisorRemarks {
        supervisor_name: "T. Mwansa".to_string(),
        remarks: "Vehicle and driver ready for the route.".to_string(),
        recommendation: None,
    })
}

pub(super) fn evaluation_payload() -> StepPayload {
    StepPayload::Evaluation(EvaluationScores {
        pre_trip_inspection: 5,
        driving_conduct: 4,
        incident_management: 4,
        post_trip_reporting: 5,
        compliance_documentation: 4,
        comments: None,
    })
}

pub(super) fn sign_off_payload(role: SignOffRole, name: &str) -> StepPayload {
    StepPayload::SignOff(SignOff {
        role,
        signer_name: name.to_string(),
    })
}

/// Drive a freshly-started inspection through pre-trip steps 2-9.
pub(super) fn complete_pre_trip(service: &TestService, id: &InspectionId) {
    let actor = supervisor();
    for step in 2..=8u8 {
        let section = WizardKind::PreTrip
            .section_for_step(step)
            .expect("steps 2-8 are checklist steps");
        let payload = checklist_payload(service.catalog(), section);
        service
            .save_step(id, WizardKind::PreTrip, step, payload, &actor)
            .expect("pre-trip checklist step saves");
    }
    service
        .save_step(id, WizardKind::PreTrip, 9, remarks_payload(), &actor)
        .expect("supervisor remarks save");
}

/// Post-trip step payloads in wizard order, all compliant.
pub(super) fn post_trip_payload(service: &TestService, step: u8) -> StepPayload {
    match step {
        1 => checklist_payload(service.catalog(), SectionKind::TripBehavior),
        2 => checklist_payload(service.catalog(), SectionKind::DrivingBehavior),
        3 => checklist_payload(service.catalog(), SectionKind::PostTripReport),
        4 => StepPayload::RiskReview(RiskAcknowledgement {
            reviewed_by: "T. Mwansa".to_string(),
            notes: None,
        }),
        5 => StepPayload::CorrectiveMeasures {
            measures: Vec::new(),
        },
        6 => StepPayload::EnforcementActions {
            actions: Vec::new(),
        },
        7 => evaluation_payload(),
        8 => sign_off_payload(SignOffRole::Supervisor, "T. Mwansa"),
        9 => sign_off_payload(SignOffRole::Driver, "J. Banda"),
        other => panic!("no post-trip payload for step {other}"),
    }
}

/// Run an inspection from creation to an approved pre-trip.
pub(super) fn approved_inspection(service: &TestService) -> InspectionId {
    let started = service.start(trip_details()).expect("inspection starts");
    let id = started.instance.id;
    complete_pre_trip(service, &id);
    service.submit(&id, &supervisor()).expect("submits");
    service.approve(&id, &fleet_manager()).expect("approves");
    id
}

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{HashMap, HashSet};
use std::env;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

use fleet_safety::workflows::inspection::{
    ActorId, AuditEntry, AuditError, AuditSink, Authorizer, ChecklistItemAnswer, DriverId,
    InspectionId, InspectionInstance, InspectionStore, InspectionSummary, SectionKind, StepRecord,
    StepSet, StoreError, WizardKind,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store backing the service. Real deployments swap this for a
/// database-backed implementation of `InspectionStore`.
#[derive(Default)]
pub(crate) struct InMemoryInspectionStore {
    instances: Mutex<HashMap<InspectionId, InspectionInstance>>,
    steps: Mutex<HashMap<(InspectionId, WizardKind), StepSet>>,
    answers: Mutex<HashMap<(InspectionId, SectionKind), Vec<ChecklistItemAnswer>>>,
}

impl InspectionStore for InMemoryInspectionStore {
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

/// Capability checks driven by the `FLEET_APPROVERS` env var: a
/// comma-separated list of actor ids holding the approval capability. When
/// unset, every actor may approve (development mode). Role modelling proper
/// lives in the identity layer, not here.
pub(crate) struct EnvAuthorizer {
    approvers: Option<HashSet<String>>,
}

impl EnvAuthorizer {
    pub(crate) fn from_env() -> Self {
        let approvers = env::var("FLEET_APPROVERS").ok().map(|raw| {
            raw.split(',')
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect()
        });
        Self { approvers }
    }
}

impl Authorizer for EnvAuthorizer {
    fn can_submit(&self, _actor: &ActorId, _inspection: &InspectionInstance) -> bool {
        true
    }

    fn can_approve(&self, actor: &ActorId) -> bool {
        match &self.approvers {
            Some(approvers) => approvers.contains(&actor.0),
            None => true,
        }
    }
}

/// Structured-log audit sink. Entries land on the `audit` tracing target so
/// the log pipeline can route them to long-term storage.
#[derive(Default)]
pub(crate) struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) -> Result<(), AuditError> {
        info!(
            target: "audit",
            inspection = %entry.inspection.0,
            action = entry.action.label(),
            actor = %entry.actor.0,
            timestamp = %entry.timestamp,
            "inspection audit"
        );
        Ok(())
    }
}

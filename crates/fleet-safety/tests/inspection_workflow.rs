//! End-to-end scenarios for the inspection workflow, exercised through the
//! public service facade and HTTP router: wizard step saves, the approval
//! gate, the rejection loop, and the derived score reads.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;

    use fleet_safety::workflows::inspection::{
        inspection_router, ActorId, AnswerStatus, AuditEntry, AuditError, AuditSink, Authorizer,
        ChecklistAnswers, ChecklistCatalog, ChecklistItemAnswer, DriverId, InspectionId,
        InspectionInstance, InspectionService, InspectionStore, InspectionSummary, MechanicId,
        SectionKind, SignOff, SignOffRole, StepPayload, StepRecord, StepSet, StoreError,
        SupervisorRemarks, TripDetails, VehicleId, WizardKind,
    };
    use fleet_safety::workflows::inspection::domain::RiskAcknowledgement;
    use fleet_safety::workflows::inspection::evaluation::EvaluationScores;

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

        fn fetch_instance(
            &self,
            id: &InspectionId,
        ) -> Result<Option<InspectionInstance>, StoreError> {
            let guard = self.instances.lock().expect("store mutex poisoned");
            Ok(guard.get(id).cloned())
        }

        fn load_step_set(
            &self,
            id: &InspectionId,
            wizard: WizardKind,
        ) -> Result<StepSet, StoreError> {
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
                    instance.details.inspection_date >= from
                        && instance.details.inspection_date <= to
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

    pub(super) struct OpenAuthorizer;

    impl Authorizer for OpenAuthorizer {
        fn can_submit(&self, _actor: &ActorId, _inspection: &InspectionInstance) -> bool {
            true
        }

        fn can_approve(&self, _actor: &ActorId) -> bool {
            true
        }
    }

    #[derive(Default)]
    pub(super) struct NullAudit;

    impl AuditSink for NullAudit {
        fn record(&self, _entry: AuditEntry) -> Result<(), AuditError> {
            Ok(())
        }
    }

    pub(super) fn build_router() -> axum::Router {
        let service = Arc::new(InspectionService::new(
            Arc::new(MemoryStore::default()),
            Arc::new(OpenAuthorizer),
            Arc::new(NullAudit),
        ));
        inspection_router(service)
    }

    pub(super) fn trip_details() -> TripDetails {
        TripDetails {
            driver: DriverId("driver-01".to_string()),
            vehicle: VehicleId("ABZ-4521".to_string()),
            mechanic: Some(MechanicId("mechanic-07".to_string())),
            supervisor: ActorId("supervisor-01".to_string()),
            inspection_date: NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date"),
            route: "Lusaka - Ndola".to_string(),
            approved_driving_hours: "6 hrs 50 mins".to_string(),
            approved_rest_stops: 2,
        }
    }

    pub(super) fn full_positive_checklist(section: SectionKind) -> StepPayload {
        let catalog = ChecklistCatalog::standard();
        let status = section
            .allowed_statuses()
            .iter()
            .copied()
            .find(|status| status.is_positive())
            .expect("section has a positive status");
        StepPayload::Checklist(ChecklistAnswers {
            section,
            answers: catalog
                .items(section)
                .iter()
                .map(|spec| ChecklistItemAnswer::new(spec.key, status))
                .collect(),
        })
    }

    pub(super) fn pre_trip_step_payload(step: u8) -> StepPayload {
        match step {
            2..=8 => full_positive_checklist(
                WizardKind::PreTrip
                    .section_for_step(step)
                    .expect("checklist step"),
            ),
            9 => StepPayload::SupervisorRemarks(SupervisorRemarks {
                supervisor_name: "T. Mwansa".to_string(),
                remarks: "Ready for the route.".to_string(),
                recommendation: None,
            }),
            other => panic!("no pre-trip payload for step {other}"),
        }
    }

    pub(super) fn post_trip_step_payload(step: u8) -> StepPayload {
        match step {
            1 => full_positive_checklist(SectionKind::TripBehavior),
            2 => full_positive_checklist(SectionKind::DrivingBehavior),
            3 => full_positive_checklist(SectionKind::PostTripReport),
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
            7 => StepPayload::Evaluation(EvaluationScores {
                pre_trip_inspection: 5,
                driving_conduct: 5,
                incident_management: 5,
                post_trip_reporting: 5,
                compliance_documentation: 5,
                comments: None,
            }),
            8 => StepPayload::SignOff(SignOff {
                role: SignOffRole::Supervisor,
                signer_name: "T. Mwansa".to_string(),
            }),
            9 => StepPayload::SignOff(SignOff {
                role: SignOffRole::Driver,
                signer_name: "J. Banda".to_string(),
            }),
            other => panic!("no post-trip payload for step {other}"),
        }
    }

    pub(super) fn violation_trip_behavior(violations: &[&str]) -> StepPayload {
        let catalog = ChecklistCatalog::standard();
        StepPayload::Checklist(ChecklistAnswers {
            section: SectionKind::TripBehavior,
            answers: catalog
                .items(SectionKind::TripBehavior)
                .iter()
                .map(|spec| {
                    let status = if violations.contains(&spec.key) {
                        AnswerStatus::Violation
                    } else {
                        AnswerStatus::Compliant
                    };
                    ChecklistItemAnswer::new(spec.key, status)
                })
                .collect(),
        })
    }
}

mod http {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::common::*;
    use fleet_safety::workflows::inspection::StepPayload;

    pub(super) async fn send(
        router: &axum::Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                builder
                    .body(Body::from(serde_json::to_vec(&value).expect("serialize body")))
                    .expect("request builds")
            }
            None => builder.body(Body::empty()).expect("request builds"),
        };

        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router dispatch");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, payload)
    }

    pub(super) async fn create_inspection(router: &axum::Router) -> String {
        let details = serde_json::to_value(trip_details()).expect("serialize details");
        let (status, body) = send(router, "POST", "/api/v1/inspections", Some(details)).await;
        assert_eq!(status, StatusCode::CREATED);
        body.get("id")
            .and_then(Value::as_str)
            .expect("id returned")
            .to_string()
    }

    pub(super) async fn save_step(
        router: &axum::Router,
        id: &str,
        wizard: &str,
        step: u8,
        payload: StepPayload,
    ) -> (StatusCode, Value) {
        let body = serde_json::json!({
            "actor": "supervisor-01",
            "payload": serde_json::to_value(payload).expect("serialize payload"),
        });
        send(
            router,
            "PUT",
            &format!("/api/v1/inspections/{id}/{wizard}/steps/{step}"),
            Some(body),
        )
        .await
    }

    pub(super) async fn complete_pre_trip(router: &axum::Router, id: &str) {
        for step in 2..=9u8 {
            let (status, _) =
                save_step(router, id, "pre-trip", step, pre_trip_step_payload(step)).await;
            assert_eq!(status, StatusCode::OK, "pre-trip step {step} saves");
        }
    }

    pub(super) async fn submit(router: &axum::Router, id: &str) -> (StatusCode, Value) {
        send(
            router,
            "POST",
            &format!("/api/v1/inspections/{id}/submit"),
            Some(serde_json::json!({ "actor": "supervisor-01" })),
        )
        .await
    }

    pub(super) async fn approve(router: &axum::Router, id: &str) -> (StatusCode, Value) {
        send(
            router,
            "POST",
            &format!("/api/v1/inspections/{id}/approve"),
            Some(serde_json::json!({ "actor": "fleet-manager-01" })),
        )
        .await
    }
}

mod lifecycle {
    use axum::http::StatusCode;
    use serde_json::Value;

    use super::common::*;
    use super::http::*;

    #[tokio::test]
    async fn clean_run_completes_and_scores_full_marks() {
        let router = build_router();
        let id = create_inspection(&router).await;

        complete_pre_trip(&router, &id).await;

        let (status, body) = submit(&router, &id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("status"), Some(&Value::String("submitted".into())));

        let (status, body) = approve(&router, &id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("status"), Some(&Value::String("approved".into())));

        for step in 1..=9u8 {
            let (status, body) =
                save_step(&router, &id, "post-trip", step, post_trip_step_payload(step)).await;
            assert_eq!(status, StatusCode::OK, "post-trip step {step} saves");
            if step == 9 {
                assert_eq!(
                    body.get("status"),
                    Some(&Value::String("post_trip_completed".into()))
                );
            }
        }

        let (status, body) = send(
            &router,
            "GET",
            &format!("/api/v1/inspections/{id}/scores/final"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("final_percentage").and_then(Value::as_f64), Some(100.0));
        assert_eq!(body.get("final_status"), Some(&Value::String("passed".into())));
        assert_eq!(
            body.get("final_risk_level"),
            Some(&Value::String("no_risk".into()))
        );

        let (status, body) = send(
            &router,
            "GET",
            &format!("/api/v1/inspections/{id}/risk"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("this_trip_points").and_then(Value::as_u64), Some(0));
        assert_eq!(body.get("risk_level"), Some(&Value::String("low".into())));
    }

    #[tokio::test]
    async fn progress_endpoint_reports_resume_point() {
        let router = build_router();
        let id = create_inspection(&router).await;

        // Save steps 2 and 5 out of order, leaving 3 as the resume point.
        for step in [2u8, 5] {
            let (status, _) =
                save_step(&router, &id, "pre-trip", step, pre_trip_step_payload(step)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(
            &router,
            "GET",
            &format!("/api/v1/inspections/{id}/pre-trip/progress"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body.get("completed_steps"),
            Some(&serde_json::json!([1, 2, 5]))
        );
        assert_eq!(body.get("next_step").and_then(Value::as_u64), Some(3));
        assert_eq!(
            body.get("completion_percentage").and_then(Value::as_u64),
            Some(33)
        );
    }

    #[tokio::test]
    async fn behavior_violations_show_up_in_the_risk_read() {
        let router = build_router();
        let id = create_inspection(&router).await;
        complete_pre_trip(&router, &id).await;
        submit(&router, &id).await;
        approve(&router, &id).await;

        let (status, _) = save_step(
            &router,
            &id,
            "post-trip",
            1,
            violation_trip_behavior(&["railway_crossing", "toll_gate"]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &router,
            "GET",
            &format!("/api/v1/inspections/{id}/risk"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("this_trip_points").and_then(Value::as_u64), Some(12));
        assert_eq!(body.get("risk_level"), Some(&Value::String("high".into())));
    }
}

mod approval_gate {
    use axum::http::StatusCode;
    use serde_json::Value;

    use super::common::*;
    use super::http::*;

    #[tokio::test]
    async fn incomplete_submission_lists_missing_steps() {
        let router = build_router();
        let id = create_inspection(&router).await;

        let (status, body) = submit(&router, &id).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body.get("missing_steps"),
            Some(&serde_json::json!([2, 3, 4, 5, 6, 7, 8, 9]))
        );

        let (status, body) = send(
            &router,
            "GET",
            &format!("/api/v1/inspections/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("status"), Some(&Value::String("draft".into())));
    }

    #[tokio::test]
    async fn rejection_without_reason_is_refused() {
        let router = build_router();
        let id = create_inspection(&router).await;
        complete_pre_trip(&router, &id).await;
        submit(&router, &id).await;

        let (status, _) = send(
            &router,
            "POST",
            &format!("/api/v1/inspections/{id}/reject"),
            Some(serde_json::json!({ "actor": "fleet-manager-01", "reason": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn rejection_loop_allows_edit_and_resubmission() {
        let router = build_router();
        let id = create_inspection(&router).await;
        complete_pre_trip(&router, &id).await;
        submit(&router, &id).await;

        let (status, body) = send(
            &router,
            "POST",
            &format!("/api/v1/inspections/{id}/reject"),
            Some(serde_json::json!({
                "actor": "fleet-manager-01",
                "reason": "missing insurance",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("status"), Some(&Value::String("rejected".into())));
        assert_eq!(
            body.get("rejection_reason"),
            Some(&Value::String("missing insurance".into()))
        );

        // Fix the documentation step and resubmit.
        let (status, _) =
            save_step(&router, &id, "pre-trip", 3, pre_trip_step_payload(3)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = submit(&router, &id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.get("status"), Some(&Value::String("submitted".into())));
        assert!(body.get("rejection_reason").is_none());
    }

    #[tokio::test]
    async fn approving_twice_conflicts() {
        let router = build_router();
        let id = create_inspection(&router).await;
        complete_pre_trip(&router, &id).await;
        submit(&router, &id).await;

        let (status, _) = approve(&router, &id).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = approve(&router, &id).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_inspection_returns_not_found() {
        let router = build_router();
        let (status, _) = send(&router, "GET", "/api/v1/inspections/insp-999999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_checklist_items_are_unprocessable() {
        let router = build_router();
        let id = create_inspection(&router).await;

        let body = serde_json::json!({
            "actor": "supervisor-01",
            "payload": {
                "kind": "checklist",
                "section": "exterior",
                "answers": [{ "item": "spoiler", "status": "pass" }],
            },
        });
        let (status, response) = send(
            &router,
            "PUT",
            &format!("/api/v1/inspections/{id}/pre-trip/steps/4"),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .contains("spoiler"));
    }
}

//! End-to-end onboarding scenarios driven through the public service facade and HTTP router.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, Utc};

    use momscare::onboarding::{
        check_document, onboarding_router, ApplicantId, ApplicantKind, ApplicantRecord,
        ApplicantRepository, ApplicationStatus, Availability, DocumentRef, DoctorSubmission,
        NewApplicant, Notification, NotificationDispatcher, NurseSubmission, ObjectStorage,
        OnboardingApi, RepositoryError, StaticTokenAuthorizer, StorageError, StoredDocument,
        UploadTicket,
    };

    pub(super) const ADMIN_TOKEN: &str = "integration-admin-token";

    pub(super) fn nurse_submission(document: &str) -> NurseSubmission {
        NurseSubmission {
            name: "Lakshmi Iyer".to_string(),
            contact_number: "98450 12345".to_string(),
            email: "lakshmi.iyer@example.in".to_string(),
            gender: "female".to_string(),
            nursing_qualification: "GNM".to_string(),
            nursing_category: "Elderly care".to_string(),
            service_areas: vec!["Jayanagar".to_string(), "BTM Layout".to_string()],
            license_no: "KNC-10442".to_string(),
            document_id: DocumentRef(document.to_string()),
            specific_skills: "Wound dressing, vitals monitoring".to_string(),
            transport_mode: "Public transport".to_string(),
            languages_known: vec!["Tamil".to_string(), "English".to_string()],
        }
    }

    pub(super) fn doctor_submission(document: &str) -> DoctorSubmission {
        DoctorSubmission {
            name: "Dr. Arjun Shetty".to_string(),
            contact_number: "9988776655".to_string(),
            email: "arjun.shetty@example.in".to_string(),
            medical_qualification: "MBBS, DGO".to_string(),
            specialization: "Obstetrics".to_string(),
            service_areas: vec!["Malleshwaram".to_string()],
            license_no: String::new(),
            document_id: DocumentRef(document.to_string()),
            experience: Some(8.0),
            clinical_experience: "Labour ward registrar".to_string(),
            availability: Availability {
                days: vec!["saturday".to_string()],
                time_ranges: None,
                is_247: false,
            },
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryRepository {
        records: Mutex<HashMap<(ApplicantKind, ApplicantId), ApplicantRecord>>,
    }

    impl MemoryRepository {
        pub(super) fn len(&self) -> usize {
            self.records.lock().expect("lock").len()
        }
    }

    impl ApplicantRepository for MemoryRepository {
        fn insert(&self, applicant: NewApplicant) -> Result<ApplicantRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            let kind = applicant.profile.kind();
            if guard
                .values()
                .any(|record| record.kind == kind && record.profile.email() == applicant.profile.email())
            {
                return Err(RepositoryError::Conflict);
            }
            let sequence = guard.len() as i64 + 1;
            let record = ApplicantRecord {
                id: ApplicantId(format!("{}-{sequence}", kind.label())),
                kind,
                created_at: DateTime::<Utc>::from_timestamp(1_760_000_000 + sequence, 0)
                    .expect("valid timestamp"),
                status: applicant.status,
                profile: applicant.profile,
            };
            guard.insert((kind, record.id.clone()), record.clone());
            Ok(record)
        }

        fn find_by_email(
            &self,
            kind: ApplicantKind,
            email: &str,
        ) -> Result<Option<ApplicantRecord>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .find(|record| record.kind == kind && record.profile.email() == email)
                .cloned())
        }

        fn fetch(
            &self,
            kind: ApplicantKind,
            id: &ApplicantId,
        ) -> Result<Option<ApplicantRecord>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.get(&(kind, id.clone())).cloned())
        }

        fn set_status(
            &self,
            kind: ApplicantKind,
            id: &ApplicantId,
            status: ApplicationStatus,
        ) -> Result<ApplicantRecord, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            let record = guard
                .get_mut(&(kind, id.clone()))
                .ok_or(RepositoryError::NotFound)?;
            record.status = status;
            Ok(record.clone())
        }

        fn list(&self, kind: ApplicantKind) -> Result<Vec<ApplicantRecord>, RepositoryError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .filter(|record| record.kind == kind)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    pub(super) struct MemoryStorage {
        tickets: Mutex<Vec<String>>,
        documents: Mutex<HashMap<String, StoredDocument>>,
    }

    impl ObjectStorage for MemoryStorage {
        fn issue_upload(&self) -> Result<UploadTicket, StorageError> {
            let mut tickets = self.tickets.lock().expect("lock");
            let ticket = format!("upload-{}", tickets.len() + 1);
            tickets.push(ticket.clone());
            Ok(UploadTicket {
                upload_url: format!("http://localhost/api/v1/uploads/{ticket}"),
                ticket,
            })
        }

        fn complete_upload(
            &self,
            ticket: &str,
            content_type: &str,
            bytes: Vec<u8>,
        ) -> Result<DocumentRef, StorageError> {
            let mut tickets = self.tickets.lock().expect("lock");
            let position = tickets
                .iter()
                .position(|issued| issued == ticket)
                .ok_or(StorageError::UnknownTicket)?;
            check_document(content_type, bytes.len())?;
            tickets.remove(position);

            let id = format!("doc-{ticket}");
            self.documents.lock().expect("lock").insert(
                id.clone(),
                StoredDocument {
                    content_type: content_type.to_string(),
                    bytes,
                },
            );
            Ok(DocumentRef(id))
        }

        fn exists(&self, document: &DocumentRef) -> Result<bool, StorageError> {
            Ok(self.documents.lock().expect("lock").contains_key(&document.0))
        }

        fn resolve_url(&self, document: &DocumentRef) -> Result<Option<String>, StorageError> {
            Ok(self
                .exists(document)?
                .then(|| format!("http://localhost/files/{}", document.0)))
        }

        fn fetch(&self, document: &DocumentRef) -> Result<Option<StoredDocument>, StorageError> {
            Ok(self.documents.lock().expect("lock").get(&document.0).cloned())
        }
    }

    #[derive(Default)]
    pub(super) struct RecordingNotifier {
        pub(super) scheduled: Mutex<Vec<Notification>>,
    }

    impl NotificationDispatcher for RecordingNotifier {
        fn schedule(&self, notification: Notification) {
            self.scheduled.lock().expect("lock").push(notification);
        }
    }

    pub(super) fn api() -> (
        OnboardingApi<MemoryRepository, MemoryStorage, RecordingNotifier>,
        Arc<MemoryRepository>,
        Arc<RecordingNotifier>,
    ) {
        let repository = Arc::new(MemoryRepository::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let api = OnboardingApi::new(
            repository.clone(),
            Arc::new(MemoryStorage::default()),
            notifier.clone(),
            Arc::new(StaticTokenAuthorizer::new(ADMIN_TOKEN)),
        );
        (api, repository, notifier)
    }

    pub(super) fn router(
        api: OnboardingApi<MemoryRepository, MemoryStorage, RecordingNotifier>,
    ) -> axum::Router {
        onboarding_router(api)
    }
}

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use momscare::onboarding::{Notification, ObjectStorage, OnboardingError};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::*;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn upload_pdf(router: &axum::Router) -> String {
    let issued = router
        .clone()
        .oneshot(
            Request::post("/api/v1/uploads")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("issue upload");
    let ticket = body_json(issued).await["ticket"]
        .as_str()
        .expect("ticket")
        .to_string();

    let stored = router
        .clone()
        .oneshot(
            Request::post(format!("/api/v1/uploads/{ticket}").as_str())
                .header(header::CONTENT_TYPE, "application/pdf")
                .body(Body::from(b"%PDF-1.4 nursing council certificate".to_vec()))
                .expect("request"),
        )
        .await
        .expect("complete upload");
    assert_eq!(stored.status(), StatusCode::OK);
    body_json(stored).await["storageId"]
        .as_str()
        .expect("storage id")
        .to_string()
}

#[tokio::test]
async fn nurse_is_onboarded_and_approved_end_to_end() {
    let (api, _, notifier) = api();
    let router = router(api);

    let document = upload_pdf(&router).await;
    let submission = nurse_submission(&document);
    let created = router
        .clone()
        .oneshot(
            Request::post("/api/v1/nurses")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&submission).expect("encode submission"),
                ))
                .expect("request"),
        )
        .await
        .expect("submit nurse");
    assert_eq!(created.status(), StatusCode::CREATED);
    let id = body_json(created).await["id"]
        .as_str()
        .expect("id")
        .to_string();

    let detail = router
        .clone()
        .oneshot(
            Request::get(format!("/api/v1/nurses/{id}").as_str())
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("nurse detail");
    let record = body_json(detail).await;
    assert_eq!(record["status"], "pending");
    assert_eq!(record["name"], "Lakshmi Iyer");
    assert_eq!(record["contactNumber"], "98450 12345");
    assert_eq!(record["nursingCategory"], "Elderly care");
    assert_eq!(record["serviceAreas"], json!(["Jayanagar", "BTM Layout"]));
    assert_eq!(record["documentId"], document);

    let approved = router
        .clone()
        .oneshot(
            Request::patch(format!("/api/v1/nurses/{id}/status").as_str())
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"status":"approved"}"#))
                .expect("request"),
        )
        .await
        .expect("approve nurse");
    assert_eq!(approved.status(), StatusCode::NO_CONTENT);

    let listing = router
        .oneshot(
            Request::get("/api/v1/applicants")
                .header(header::AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("list applicants");
    let rows = body_json(listing).await;
    assert_eq!(rows[0]["id"], id);
    assert_eq!(rows[0]["status"], "approved");

    let scheduled = notifier.scheduled.lock().expect("lock");
    let approvals: Vec<&Notification> = scheduled
        .iter()
        .filter(|notification| matches!(notification, Notification::Approved(_)))
        .collect();
    assert_eq!(approvals.len(), 1);
    assert_eq!(approvals[0].applicant().email, "lakshmi.iyer@example.in");
}

#[test]
fn doctor_without_license_is_rejected_and_not_stored() {
    let (api, repository, notifier) = api();
    let ticket = api.storage.issue_upload().expect("ticket");
    let document = api
        .storage
        .complete_upload(&ticket.ticket, "application/pdf", b"%PDF-1.4".to_vec())
        .expect("upload");

    match api.onboarding.submit_doctor(doctor_submission(&document.0)) {
        Err(OnboardingError::ValidationFailed(errors)) => {
            assert!(errors.fields().contains(&"licenseNo"));
            assert_eq!(
                errors.message_for("licenseNo"),
                Some("License number is required")
            );
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    assert_eq!(repository.len(), 0);
    assert!(notifier.scheduled.lock().expect("lock").is_empty());
    assert!(api
        .review
        .list_applicants()
        .expect("listing")
        .is_empty());
}

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::onboarding::domain::{
    ApplicantId, ApplicantKind, ApplicationStatus, Availability, DocumentRef, DoctorSubmission,
    NurseSubmission, TimeRange,
};
use crate::onboarding::notifier::{Notification, NotificationDispatcher};
use crate::onboarding::repository::{
    ApplicantRecord, ApplicantRepository, NewApplicant, RepositoryError,
};
use crate::onboarding::storage::{
    check_document, ObjectStorage, StorageError, StoredDocument, UploadTicket,
};
use crate::onboarding::{
    onboarding_router, OnboardingApi, OnboardingService, ReviewDesk, StaticTokenAuthorizer,
};

pub(super) const ADMIN_TOKEN: &str = "review-desk-token";
pub(super) const DOCTOR_DOCUMENT: &str = "storage-doctor-license";
pub(super) const NURSE_DOCUMENT: &str = "storage-nurse-license";

pub(super) fn doctor_submission() -> DoctorSubmission {
    let mut time_ranges = BTreeMap::new();
    time_ranges.insert(
        "monday".to_string(),
        TimeRange {
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        },
    );

    DoctorSubmission {
        name: "Dr. Kavya Menon".to_string(),
        contact_number: "98765 43210".to_string(),
        email: "kavya.menon@example.in".to_string(),
        medical_qualification: "MBBS, MD".to_string(),
        specialization: "Obstetrics & Gynaecology".to_string(),
        service_areas: vec!["Koramangala".to_string(), "Indiranagar".to_string()],
        license_no: "KMC-45821".to_string(),
        document_id: DocumentRef(DOCTOR_DOCUMENT.to_string()),
        experience: Some(12.0),
        clinical_experience: "Twelve years in maternal care at a tertiary hospital".to_string(),
        availability: Availability {
            days: vec!["monday".to_string(), "wednesday".to_string()],
            time_ranges: Some(time_ranges),
            is_247: false,
        },
    }
}

pub(super) fn nurse_submission() -> NurseSubmission {
    NurseSubmission {
        name: "Anita Rao".to_string(),
        contact_number: "9123456780".to_string(),
        email: "anita.rao@example.in".to_string(),
        gender: "female".to_string(),
        nursing_qualification: "B.Sc Nursing".to_string(),
        nursing_category: "Postnatal care".to_string(),
        service_areas: vec!["Whitefield".to_string()],
        license_no: "KNC-77310".to_string(),
        document_id: DocumentRef(NURSE_DOCUMENT.to_string()),
        specific_skills: "Newborn care, lactation support".to_string(),
        transport_mode: "Two-wheeler".to_string(),
        languages_known: vec!["English".to_string(), "Kannada".to_string()],
    }
}

pub(super) type TestService = OnboardingService<MemoryRepository, MemoryStorage, RecordingNotifier>;

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryRepository>,
    Arc<RecordingNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let storage = Arc::new(MemoryStorage::with_documents(&[
        DOCTOR_DOCUMENT,
        NURSE_DOCUMENT,
    ]));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = OnboardingService::new(repository.clone(), storage, notifier.clone());
    (service, repository, notifier)
}

pub(super) fn build_desk() -> (
    TestService,
    ReviewDesk<MemoryRepository, MemoryStorage>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let storage = Arc::new(MemoryStorage::with_documents(&[
        DOCTOR_DOCUMENT,
        NURSE_DOCUMENT,
    ]));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = OnboardingService::new(repository.clone(), storage.clone(), notifier);
    let desk = ReviewDesk::new(repository, storage);
    (service, desk)
}

pub(super) fn build_router() -> (axum::Router, Arc<MemoryRepository>, Arc<RecordingNotifier>) {
    let repository = Arc::new(MemoryRepository::default());
    let storage = Arc::new(MemoryStorage::with_documents(&[
        DOCTOR_DOCUMENT,
        NURSE_DOCUMENT,
    ]));
    let notifier = Arc::new(RecordingNotifier::default());
    let api = OnboardingApi::new(
        repository.clone(),
        storage,
        notifier.clone(),
        Arc::new(StaticTokenAuthorizer::new(ADMIN_TOKEN)),
    );
    (onboarding_router(api), repository, notifier)
}

/// Store with deterministic ids (`doctor-1`, `nurse-2`, ...) and one-second-apart timestamps.
#[derive(Default)]
pub(super) struct MemoryRepository {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    sequence: i64,
    records: Vec<ApplicantRecord>,
}

impl MemoryRepository {
    pub(super) fn count(&self, kind: ApplicantKind) -> usize {
        self.state
            .lock()
            .expect("repository mutex poisoned")
            .records
            .iter()
            .filter(|record| record.kind == kind)
            .count()
    }
}

impl ApplicantRepository for MemoryRepository {
    fn insert(&self, applicant: NewApplicant) -> Result<ApplicantRecord, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        let kind = applicant.profile.kind();
        if state
            .records
            .iter()
            .any(|record| record.kind == kind && record.profile.email() == applicant.profile.email())
        {
            return Err(RepositoryError::Conflict);
        }

        state.sequence += 1;
        let record = ApplicantRecord {
            id: ApplicantId(format!("{}-{}", kind.label(), state.sequence)),
            kind,
            created_at: DateTime::<Utc>::from_timestamp(1_760_000_000 + state.sequence, 0)
                .expect("valid timestamp"),
            status: applicant.status,
            profile: applicant.profile,
        };
        state.records.push(record.clone());
        Ok(record)
    }

    fn find_by_email(
        &self,
        kind: ApplicantKind,
        email: &str,
    ) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state
            .records
            .iter()
            .find(|record| record.kind == kind && record.profile.email() == email)
            .cloned())
    }

    fn fetch(
        &self,
        kind: ApplicantKind,
        id: &ApplicantId,
    ) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state
            .records
            .iter()
            .find(|record| record.kind == kind && &record.id == id)
            .cloned())
    }

    fn set_status(
        &self,
        kind: ApplicantKind,
        id: &ApplicantId,
        status: ApplicationStatus,
    ) -> Result<ApplicantRecord, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        let record = state
            .records
            .iter_mut()
            .find(|record| record.kind == kind && &record.id == id)
            .ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }

    fn list(&self, kind: ApplicantKind) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state
            .records
            .iter()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableRepository;

impl ApplicantRepository for UnavailableRepository {
    fn insert(&self, _applicant: NewApplicant) -> Result<ApplicantRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_by_email(
        &self,
        _kind: ApplicantKind,
        _email: &str,
    ) -> Result<Option<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _kind: ApplicantKind,
        _id: &ApplicantId,
    ) -> Result<Option<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_status(
        &self,
        _kind: ApplicantKind,
        _id: &ApplicantId,
        _status: ApplicationStatus,
    ) -> Result<ApplicantRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _kind: ApplicantKind) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryStorage {
    state: Mutex<StorageState>,
}

#[derive(Default)]
struct StorageState {
    sequence: u64,
    tickets: HashSet<String>,
    documents: HashMap<String, StoredDocument>,
}

impl MemoryStorage {
    pub(super) fn with_documents(ids: &[&str]) -> Self {
        let storage = Self::default();
        {
            let mut state = storage.state.lock().expect("storage mutex poisoned");
            for id in ids {
                state.documents.insert(
                    (*id).to_string(),
                    StoredDocument {
                        content_type: "application/pdf".to_string(),
                        bytes: b"%PDF-1.7".to_vec(),
                    },
                );
            }
        }
        storage
    }
}

impl ObjectStorage for MemoryStorage {
    fn issue_upload(&self) -> Result<UploadTicket, StorageError> {
        let mut state = self.state.lock().expect("storage mutex poisoned");
        state.sequence += 1;
        let ticket = format!("ticket-{}", state.sequence);
        state.tickets.insert(ticket.clone());
        Ok(UploadTicket {
            upload_url: format!("https://files.test/api/v1/uploads/{ticket}"),
            ticket,
        })
    }

    fn complete_upload(
        &self,
        ticket: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentRef, StorageError> {
        let mut state = self.state.lock().expect("storage mutex poisoned");
        if !state.tickets.contains(ticket) {
            return Err(StorageError::UnknownTicket);
        }
        check_document(content_type, bytes.len())?;
        state.tickets.remove(ticket);

        state.sequence += 1;
        let id = format!("storage-{}", state.sequence);
        state.documents.insert(
            id.clone(),
            StoredDocument {
                content_type: content_type.to_string(),
                bytes,
            },
        );
        Ok(DocumentRef(id))
    }

    fn exists(&self, document: &DocumentRef) -> Result<bool, StorageError> {
        let state = self.state.lock().expect("storage mutex poisoned");
        Ok(state.documents.contains_key(&document.0))
    }

    fn resolve_url(&self, document: &DocumentRef) -> Result<Option<String>, StorageError> {
        let state = self.state.lock().expect("storage mutex poisoned");
        Ok(state
            .documents
            .contains_key(&document.0)
            .then(|| format!("https://files.test/files/{}", document.0)))
    }

    fn fetch(&self, document: &DocumentRef) -> Result<Option<StoredDocument>, StorageError> {
        let state = self.state.lock().expect("storage mutex poisoned");
        Ok(state.documents.get(&document.0).cloned())
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    scheduled: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(super) fn notifications(&self) -> Vec<Notification> {
        self.scheduled
            .lock()
            .expect("notifier mutex poisoned")
            .clone()
    }

    pub(super) fn approvals(&self) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|notification| matches!(notification, Notification::Approved(_)))
            .collect()
    }
}

impl NotificationDispatcher for RecordingNotifier {
    fn schedule(&self, notification: Notification) {
        self.scheduled
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

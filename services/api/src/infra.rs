use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use momscare::onboarding::{
    check_document, ApplicantId, ApplicantKind, ApplicantRecord, ApplicantRepository,
    ApplicationStatus, DocumentRef, MailTransport, NewApplicant, NotificationError,
    ObjectStorage, RepositoryError, StorageError, StoredDocument, UploadTicket,
};
use momscare::onboarding::notifier::OutboundEmail;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local applicant store: one collection per kind plus a per-kind email index.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicantRepository {
    state: Arc<Mutex<RepositoryState>>,
}

#[derive(Default)]
struct RepositoryState {
    records: HashMap<(ApplicantKind, ApplicantId), ApplicantRecord>,
    emails: HashMap<(ApplicantKind, String), ApplicantId>,
    last_created: Option<DateTime<Utc>>,
}

impl RepositoryState {
    /// Creation times are strictly increasing at millisecond resolution.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match self.last_created {
            Some(last) if now <= last + Duration::milliseconds(1) => {
                last + Duration::milliseconds(1)
            }
            _ => now,
        };
        self.last_created = Some(created_at);
        created_at
    }
}

impl InMemoryApplicantRepository {
    fn state(&self) -> Result<MutexGuard<'_, RepositoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".to_string()))
    }
}

impl ApplicantRepository for InMemoryApplicantRepository {
    fn insert(&self, applicant: NewApplicant) -> Result<ApplicantRecord, RepositoryError> {
        let mut state = self.state()?;
        let kind = applicant.profile.kind();
        let email_key = (kind, applicant.profile.email().to_string());
        if state.emails.contains_key(&email_key) {
            return Err(RepositoryError::Conflict);
        }

        let record = ApplicantRecord {
            id: ApplicantId(Uuid::new_v4().to_string()),
            kind,
            created_at: state.next_created_at(),
            status: applicant.status,
            profile: applicant.profile,
        };
        state.emails.insert(email_key, record.id.clone());
        state
            .records
            .insert((kind, record.id.clone()), record.clone());
        Ok(record)
    }

    fn find_by_email(
        &self,
        kind: ApplicantKind,
        email: &str,
    ) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .emails
            .get(&(kind, email.to_string()))
            .and_then(|id| state.records.get(&(kind, id.clone())))
            .cloned())
    }

    fn fetch(
        &self,
        kind: ApplicantKind,
        id: &ApplicantId,
    ) -> Result<Option<ApplicantRecord>, RepositoryError> {
        let state = self.state()?;
        Ok(state.records.get(&(kind, id.clone())).cloned())
    }

    fn set_status(
        &self,
        kind: ApplicantKind,
        id: &ApplicantId,
        status: ApplicationStatus,
    ) -> Result<ApplicantRecord, RepositoryError> {
        let mut state = self.state()?;
        let record = state
            .records
            .get_mut(&(kind, id.clone()))
            .ok_or(RepositoryError::NotFound)?;
        record.status = status;
        Ok(record.clone())
    }

    fn list(&self, kind: ApplicantKind) -> Result<Vec<ApplicantRecord>, RepositoryError> {
        let state = self.state()?;
        Ok(state
            .records
            .values()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect())
    }
}

/// Blob store whose upload and download URLs point back at this service.
#[derive(Clone)]
pub(crate) struct InMemoryObjectStorage {
    base_url: String,
    state: Arc<Mutex<StorageState>>,
}

#[derive(Default)]
struct StorageState {
    tickets: HashSet<String>,
    documents: HashMap<String, StoredDocument>,
}

impl InMemoryObjectStorage {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            state: Arc::default(),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, StorageState>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".to_string()))
    }
}

impl ObjectStorage for InMemoryObjectStorage {
    fn issue_upload(&self) -> Result<UploadTicket, StorageError> {
        let ticket = Uuid::new_v4().simple().to_string();
        self.state()?.tickets.insert(ticket.clone());
        Ok(UploadTicket {
            upload_url: format!("{}/api/v1/uploads/{ticket}", self.base_url),
            ticket,
        })
    }

    fn complete_upload(
        &self,
        ticket: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentRef, StorageError> {
        let mut state = self.state()?;
        if !state.tickets.contains(ticket) {
            return Err(StorageError::UnknownTicket);
        }
        check_document(content_type, bytes.len())?;
        state.tickets.remove(ticket);

        let id = Uuid::new_v4().to_string();
        info!(document = %id, size = bytes.len(), "credential document stored");
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
        Ok(self.state()?.documents.contains_key(&document.0))
    }

    fn resolve_url(&self, document: &DocumentRef) -> Result<Option<String>, StorageError> {
        Ok(self
            .exists(document)?
            .then(|| format!("{}/files/{}", self.base_url, document.0)))
    }

    fn fetch(&self, document: &DocumentRef) -> Result<Option<StoredDocument>, StorageError> {
        Ok(self.state()?.documents.get(&document.0).cloned())
    }
}

/// Mail transport that only logs, used by the demo walkthrough.
#[derive(Default, Clone)]
pub(crate) struct LoggingMailTransport {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl LoggingMailTransport {
    pub(crate) fn sent(&self) -> Vec<OutboundEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl MailTransport for LoggingMailTransport {
    fn deliver(&self, email: &OutboundEmail) -> Result<(), NotificationError> {
        info!(to = %email.to, subject = %email.subject, "email captured");
        self.sent
            .lock()
            .map_err(|_| NotificationError::DeliveryFailed("mail log poisoned".to_string()))?
            .push(email.clone());
        Ok(())
    }
}

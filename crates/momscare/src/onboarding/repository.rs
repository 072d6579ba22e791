use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ApplicantId, ApplicantKind, ApplicantProfile, ApplicationStatus};
use super::notifier::Recipient;

/// Insert payload; the store assigns identity and creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplicant {
    pub profile: ApplicantProfile,
    pub status: ApplicationStatus,
}

/// Stored applicant, serialized with the profile fields flattened alongside identity and status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRecord {
    pub id: ApplicantId,
    #[serde(rename = "type")]
    pub kind: ApplicantKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub status: ApplicationStatus,
    #[serde(flatten)]
    pub profile: ApplicantProfile,
}

impl ApplicantRecord {
    pub fn recipient(&self) -> Recipient {
        Recipient {
            name: self.profile.name().to_string(),
            email: self.profile.email().to_string(),
            kind: self.kind,
        }
    }

    pub fn summary(&self) -> ApplicantSummary {
        ApplicantSummary {
            id: self.id.clone(),
            kind: self.kind,
            name: self.profile.name().to_string(),
            email: self.profile.email().to_string(),
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Row shown on the review dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantSummary {
    pub id: ApplicantId,
    #[serde(rename = "type")]
    pub kind: ApplicantKind,
    pub name: String,
    pub email: String,
    pub status: ApplicationStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// Document store holding one collection per applicant kind.
///
/// `insert` must reject a second record with the same email in the same collection, and
/// `set_status` is a single-record patch: concurrent patches are last-write-wins.
pub trait ApplicantRepository: Send + Sync {
    fn insert(&self, applicant: NewApplicant) -> Result<ApplicantRecord, RepositoryError>;
    fn find_by_email(
        &self,
        kind: ApplicantKind,
        email: &str,
    ) -> Result<Option<ApplicantRecord>, RepositoryError>;
    fn fetch(
        &self,
        kind: ApplicantKind,
        id: &ApplicantId,
    ) -> Result<Option<ApplicantRecord>, RepositoryError>;
    fn set_status(
        &self,
        kind: ApplicantKind,
        id: &ApplicantId,
        status: ApplicationStatus,
    ) -> Result<ApplicantRecord, RepositoryError>;
    fn list(&self, kind: ApplicantKind) -> Result<Vec<ApplicantRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

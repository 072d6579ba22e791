use std::sync::Arc;

use super::domain::{ApplicantId, ApplicantKind, DocumentRef};
use super::repository::{ApplicantRecord, ApplicantRepository, ApplicantSummary};
use super::service::OnboardingError;
use super::storage::ObjectStorage;

/// Read side used by the operations dashboard.
pub struct ReviewDesk<R, S> {
    repository: Arc<R>,
    storage: Arc<S>,
}

impl<R, S> ReviewDesk<R, S>
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
{
    pub fn new(repository: Arc<R>, storage: Arc<S>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Every applicant of both kinds, newest first.
    pub fn list_applicants(&self) -> Result<Vec<ApplicantSummary>, OnboardingError> {
        let mut records = self.repository.list(ApplicantKind::Doctor)?;
        records.extend(self.repository.list(ApplicantKind::Nurse)?);

        let mut summaries: Vec<ApplicantSummary> =
            records.iter().map(ApplicantRecord::summary).collect();
        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(summaries)
    }

    pub fn applicant_detail(
        &self,
        kind: ApplicantKind,
        id: &ApplicantId,
    ) -> Result<ApplicantRecord, OnboardingError> {
        self.repository
            .fetch(kind, id)?
            .ok_or(OnboardingError::NotFound)
    }

    /// `None` when storage cannot resolve the reference.
    pub fn resolve_document_url(
        &self,
        document: &DocumentRef,
    ) -> Result<Option<String>, OnboardingError> {
        Ok(self.storage.resolve_url(document)?)
    }
}

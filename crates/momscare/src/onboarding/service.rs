use std::sync::Arc;

use tracing::info;

use super::domain::{
    ApplicantId, ApplicantKind, ApplicantProfile, ApplicationStatus, DoctorSubmission,
    NurseSubmission,
};
use super::intake::{IntakeGuard, ValidationErrors};
use super::notifier::{Notification, NotificationDispatcher};
use super::repository::{ApplicantRepository, NewApplicant, RepositoryError};
use super::storage::{ObjectStorage, StorageError};

/// Service composing the intake guard, document store, object storage, and notifier.
pub struct OnboardingService<R, S, N> {
    guard: IntakeGuard,
    repository: Arc<R>,
    storage: Arc<S>,
    notifier: Arc<N>,
}

impl<R, S, N> OnboardingService<R, S, N>
where
    R: ApplicantRepository + 'static,
    S: ObjectStorage + 'static,
    N: NotificationDispatcher + 'static,
{
    pub fn new(repository: Arc<R>, storage: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            guard: IntakeGuard,
            repository,
            storage,
            notifier,
        }
    }

    pub fn submit_doctor(
        &self,
        submission: DoctorSubmission,
    ) -> Result<ApplicantId, OnboardingError> {
        let profile = self.guard.doctor_profile(submission)?;
        self.register(ApplicantProfile::Doctor(profile))
    }

    pub fn submit_nurse(&self, submission: NurseSubmission) -> Result<ApplicantId, OnboardingError> {
        let profile = self.guard.nurse_profile(submission)?;
        self.register(ApplicantProfile::Nurse(profile))
    }

    /// Moves an applicant to `status`; entering `approved` emails the applicant once.
    pub fn update_status(
        &self,
        kind: ApplicantKind,
        id: &ApplicantId,
        status: ApplicationStatus,
    ) -> Result<(), OnboardingError> {
        let previous = self
            .repository
            .fetch(kind, id)?
            .ok_or(OnboardingError::NotFound)?
            .status;

        let updated = self
            .repository
            .set_status(kind, id, status)
            .map_err(|err| match err {
                RepositoryError::NotFound => OnboardingError::NotFound,
                other => OnboardingError::Repository(other),
            })?;

        info!(
            kind = kind.label(),
            applicant = %id,
            from = previous.label(),
            to = status.label(),
            "applicant status updated"
        );

        if status == ApplicationStatus::Approved && previous != ApplicationStatus::Approved {
            self.notifier
                .schedule(Notification::Approved(updated.recipient()));
        }
        Ok(())
    }

    fn register(&self, profile: ApplicantProfile) -> Result<ApplicantId, OnboardingError> {
        let kind = profile.kind();

        if self
            .repository
            .find_by_email(kind, profile.email())?
            .is_some()
        {
            return Err(OnboardingError::DuplicateEmail);
        }

        if !self.storage.exists(profile.document_id())? {
            return Err(OnboardingError::DocumentNotFound);
        }

        let record = self
            .repository
            .insert(NewApplicant {
                profile,
                status: ApplicationStatus::Pending,
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => OnboardingError::DuplicateEmail,
                other => OnboardingError::Repository(other),
            })?;

        info!(
            kind = kind.label(),
            applicant = %record.id,
            "application recorded"
        );

        let recipient = record.recipient();
        self.notifier
            .schedule(Notification::PendingVerification(recipient.clone()));
        self.notifier
            .schedule(Notification::AdminNewApplication(recipient));

        Ok(record.id)
    }
}

/// Error raised by the onboarding service.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error(transparent)]
    ValidationFailed(#[from] ValidationErrors),
    #[error("An application with this email already exists")]
    DuplicateEmail,
    #[error("Document not found")]
    DocumentNotFound,
    #[error("Applicant not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

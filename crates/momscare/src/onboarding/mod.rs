//! Doctor and nurse onboarding: intake validation, the applicant store, credential uploads,
//! transactional email, and the review surface used by operations staff.
//!
//! Everything external (document store, object storage, mail) sits behind a trait so the
//! HTTP service can wire real adapters while tests use in-memory doubles.

pub mod auth;
pub mod domain;
pub mod intake;
pub mod notifier;
pub mod repository;
pub mod review;
pub mod router;
pub mod service;
pub mod storage;

#[cfg(test)]
mod tests;

pub use auth::{AdminAuthorizer, AuthError, StaticTokenAuthorizer};
pub use domain::{
    ApplicantId, ApplicantKind, ApplicantProfile, ApplicationStatus, Availability, DocumentRef,
    DoctorProfile, DoctorSubmission, NurseProfile, NurseSubmission, TimeRange,
};
pub use intake::{FieldError, IntakeGuard, ValidationErrors};
pub use notifier::{
    MailTransport, Notification, NotificationDispatcher, NotificationError, QueuedNotifier,
    Recipient, SmtpMailTransport, TemplateSettings,
};
pub use repository::{
    ApplicantRecord, ApplicantRepository, ApplicantSummary, NewApplicant, RepositoryError,
};
pub use review::ReviewDesk;
pub use router::{onboarding_router, OnboardingApi};
pub use service::{OnboardingError, OnboardingService};
pub use storage::{
    check_document, ObjectStorage, StorageError, StoredDocument, UploadTicket, MAX_DOCUMENT_BYTES,
};

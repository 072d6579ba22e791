//! Transactional email for the onboarding workflow.
//!
//! The service only ever calls [`NotificationDispatcher::schedule`], which must return
//! immediately and never fail. Delivery happens later, once, through a [`MailTransport`];
//! failures are logged and dropped.

mod queue;
mod smtp;
pub mod templates;

pub use queue::QueuedNotifier;
pub use smtp::SmtpMailTransport;
pub use templates::{OutboundEmail, TemplateSettings};

use serde::Serialize;

use super::domain::ApplicantKind;

/// Who an applicant-facing email is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
    pub kind: ApplicantKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Applicant confirmation sent right after submission.
    PendingVerification(Recipient),
    /// Alert to the operations inbox about a new submission.
    AdminNewApplication(Recipient),
    /// Applicant email on entry into `approved`.
    Approved(Recipient),
}

impl Notification {
    pub const fn template(&self) -> &'static str {
        match self {
            Notification::PendingVerification(_) => "pending_verification",
            Notification::AdminNewApplication(_) => "admin_new_application",
            Notification::Approved(_) => "approved",
        }
    }

    pub fn applicant(&self) -> &Recipient {
        match self {
            Notification::PendingVerification(recipient)
            | Notification::AdminNewApplication(recipient)
            | Notification::Approved(recipient) => recipient,
        }
    }
}

/// Fire-and-forget hook invoked by the onboarding service.
pub trait NotificationDispatcher: Send + Sync {
    fn schedule(&self, notification: Notification);
}

/// Blocking mail delivery, run off the async executor by [`QueuedNotifier`].
pub trait MailTransport: Send + Sync {
    fn deliver(&self, email: &OutboundEmail) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("invalid mailbox '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("notification delivery failed: {0}")]
    DeliveryFailed(String),
}

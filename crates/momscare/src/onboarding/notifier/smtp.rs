use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};

use super::{MailTransport, NotificationError, OutboundEmail};
use crate::config::MailConfig;

/// STARTTLS SMTP relay with username/password authentication.
pub struct SmtpMailTransport {
    transport: SmtpTransport,
    sender: Mailbox,
}

impl SmtpMailTransport {
    pub fn from_config(config: &MailConfig) -> Result<Self, NotificationError> {
        let address: Address = config
            .sender_address
            .parse()
            .map_err(|err: AddressError| invalid_address(&config.sender_address, err))?;
        let sender = Mailbox::new(Some(config.sender_name.clone()), address);

        let transport = SmtpTransport::starttls_relay(&config.host)
            .map_err(|err| NotificationError::DeliveryFailed(err.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, sender })
    }
}

impl MailTransport for SmtpMailTransport {
    fn deliver(&self, email: &OutboundEmail) -> Result<(), NotificationError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|err: AddressError| invalid_address(&email.to, err))?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|err| NotificationError::DeliveryFailed(err.to_string()))?;

        self.transport
            .send(&message)
            .map_err(|err| NotificationError::DeliveryFailed(err.to_string()))?;
        Ok(())
    }
}

fn invalid_address(address: &str, err: AddressError) -> NotificationError {
    NotificationError::InvalidAddress {
        address: address.to_string(),
        reason: err.to_string(),
    }
}

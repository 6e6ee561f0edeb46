use std::net::IpAddr;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::debug;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

pub const SUBJECT: &str = "Dynamic DNS address change";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    /// The provider accepted the new address.
    Applied,

    /// A change was seen locally, but the provider did not confirm it.
    NeedsAttention,
}

/// One email worth of information for the operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub body: String,
}

impl Notice {
    pub fn applied(hostname: &str, old: IpAddr, new: IpAddr) -> Self {
        let body = format!(
            "The public IP address changed from {old} to {new}.\n\
             The DNS record for {hostname} was updated to {new}.\n"
        );

        Self {
            kind: NoticeKind::Applied,
            body,
        }
    }

    pub fn needs_attention(hostname: &str, old: IpAddr, new: IpAddr, reason: &str) -> Self {
        let body = format!(
            "The public IP address changed from {old} to {new}, but the DNS record \
             for {hostname} could not be confirmed as updated.\n\
             \n\
             Provider said: {reason}\n\
             \n\
             The recorded address was left at {old}, so the next run will try \
             again. Please check the provider account manually.\n"
        );

        Self {
            kind: NoticeKind::NeedsAttention,
            body,
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("unable to compose the message: {0}")]
    Compose(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[cfg_attr(test, automock)]
pub trait Notifier {
    /// Deliver `notice` to the operator. There is no second channel, so
    /// callers can only log a failure here.
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError>;
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub relay: Box<str>,
    pub port: u16,
    pub sender: Mailbox,
    pub password: Box<str>,
    pub recipient: Mailbox,
    pub timeout: Duration,
}

/// Submits mail to a relay over STARTTLS, logging in as the sender.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    sender: Mailbox,
    recipient: Mailbox,
}

impl SmtpNotifier {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let credentials =
            Credentials::new(config.sender.email.to_string(), config.password.to_string());

        let transport = SmtpTransport::starttls_relay(&config.relay)?
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(config.timeout))
            .build();

        Ok(Self {
            transport,
            sender: config.sender.clone(),
            recipient: config.recipient.clone(),
        })
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        let message = compose(&self.sender, &self.recipient, notice)?;
        debug!("Sending {:?} notice to {}", notice.kind, self.recipient);
        self.transport.send(&message)?;
        Ok(())
    }
}

fn compose(sender: &Mailbox, recipient: &Mailbox, notice: &Notice) -> Result<Message, NotifyError> {
    let message = Message::builder()
        .from(sender.clone())
        .to(recipient.clone())
        .subject(SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(notice.body.clone())?;

    Ok(message)
}

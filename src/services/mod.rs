pub mod dyndns;

use std::net::IpAddr;

#[cfg(test)]
use mockall::automock;
use thiserror::Error;

/// What the provider made of an update request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The record now points at the contained address.
    Updated(IpAddr),

    /// The provider claims the record already held the address.
    Unchanged,

    /// The provider refused the update. Carries an explanation fit for a
    /// human.
    Failed(Box<str>),
}

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum DdnsUpdateError {
    // used when the body could not even be read
    #[error("{0} returned an unreadable response: {1}")]
    Unreadable(Box<str>, Box<str>),

    #[error("HTTP transport error: {0}")]
    TransportError(Box<str>),
}

#[cfg_attr(test, automock)]
pub trait DdnsService {
    /// Point the configured hostname at `ip`. Only failures to talk to the
    /// provider at all are errors; whatever the provider answers is reported
    /// through [`UpdateOutcome`].
    fn update_record(&mut self, ip: IpAddr) -> Result<UpdateOutcome, DdnsUpdateError>;
}

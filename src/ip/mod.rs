mod html;
mod json;

use std::net::IpAddr;

use log::{error, warn};
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::http::{self, Client, Response};

pub use html::HtmlEcho;
pub use json::JsonEcho;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("unable to obtain IP using HTTP: {0}")]
    HttpFailure(Box<str>),

    #[error("received malformed response from {0}: {1}")]
    Malformed(Box<str>, Box<str>),

    #[error("neither IP source returned an address")]
    NoAddress,

    #[error("\"{0}\" is not a valid IP address")]
    InvalidAddress(Box<str>),
}

/// An external service that reports the address our requests come from.
#[cfg_attr(test, automock)]
pub trait IpLookup {
    /// Returns the raw address text as reported by the service. `None` means
    /// the service answered, but without an address in it.
    fn lookup(&self) -> Result<Option<Box<str>>, LookupError>;
}

/// Resolves the current public address, asking the fallback source only if
/// the primary one comes back empty.
pub struct Resolver {
    primary: Box<dyn IpLookup>,
    fallback: Box<dyn IpLookup>,
}

impl Resolver {
    pub fn new(primary: Box<dyn IpLookup>, fallback: Box<dyn IpLookup>) -> Self {
        Self { primary, fallback }
    }

    pub fn resolve(&self) -> Result<IpAddr, LookupError> {
        let address = match non_empty(self.primary.lookup()?) {
            Some(address) => address,
            None => {
                warn!("Primary IP source returned no address, trying the fallback");
                non_empty(self.fallback.lookup()?).ok_or(LookupError::NoAddress)?
            }
        };

        validate(&address).map_err(|e| {
            error!("Incorrect IP address parsed from response");
            e
        })
    }
}

fn non_empty(address: Option<Box<str>>) -> Option<Box<str>> {
    address.filter(|a| !a.trim().is_empty())
}

/// Parses `address` as an IPv4 or IPv6 address, ignoring surrounding
/// whitespace.
pub fn validate(address: &str) -> Result<IpAddr, LookupError> {
    let address = address.trim();
    address
        .parse::<IpAddr>()
        .map_err(|_| LookupError::InvalidAddress(address.into()))
}

fn fetch(client: &Client, url: &str) -> Result<Response, LookupError> {
    match client.get(url).call() {
        Ok(r) => Ok(r),
        Err(http::Error::Status(code, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(LookupError::HttpFailure(format!("HTTP {} {}", code, body.trim()).into()))
        }
        Err(http::Error::Transport(t)) => Err(LookupError::HttpFailure(t)),
    }
}

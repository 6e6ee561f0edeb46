use std::net::IpAddr;

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::ip::{LookupError, Resolver};
use crate::notify::{Notice, Notifier, NotifyError};
use crate::persistence::{StateError, StateFile};
use crate::services::{DdnsService, DdnsUpdateError, UpdateOutcome};

/// How an invocation ended, provided nothing fatal happened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The public address is still the recorded one. Nothing was done.
    Unchanged(IpAddr),

    /// The record was updated, the state file rewritten and the operator
    /// told about it.
    Updated { old: IpAddr, new: IpAddr },

    /// The provider did not confirm the update. The state file is left
    /// alone so that the next invocation tries again.
    NeedsAttention {
        old: IpAddr,
        new: IpAddr,
        reason: Box<str>,
    },
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error("unable to determine the public IP address: {0}")]
    Lookup(#[from] LookupError),

    #[error("unable to reach the DNS provider: {0}")]
    Update(#[from] DdnsUpdateError),

    #[error("unable to send the notification: {0}")]
    Notify(#[from] NotifyError),
}

/// The collaborators of a single invocation.
pub struct Workflow<'a> {
    pub hostname: &'a str,
    pub state: &'a StateFile,
    pub resolver: &'a Resolver,
    pub service: &'a mut dyn DdnsService,
    pub notifier: &'a dyn Notifier,
}

impl Workflow<'_> {
    /// Runs read state, resolve, compare, update, persist and notify, in that
    /// order. The state file is only written after the provider confirmed the
    /// new address.
    pub fn run(&mut self) -> Result<Outcome, WorkflowError> {
        let old_ip = self.state.read()?;
        debug!("old_ip = {}", old_ip);

        let new_ip = self.resolver.resolve()?;
        debug!("new_ip = {}", new_ip);

        if old_ip == new_ip {
            info!("IP address {} has not changed since last check", old_ip);
            return Ok(Outcome::Unchanged(old_ip));
        }

        info!("IP address {} has changed to {} since last check", old_ip, new_ip);

        let reason: Box<str> = match self.service.update_record(new_ip)? {
            UpdateOutcome::Updated(published) => {
                if published != new_ip {
                    warn!("Provider reports {} as published, expected {}", published, new_ip);
                }

                self.state.write(new_ip)?;
                info!("DNS record for {} successfully changed to {}", self.hostname, new_ip);

                self.notifier
                    .notify(&Notice::applied(self.hostname, old_ip, new_ip))?;

                return Ok(Outcome::Updated {
                    old: old_ip,
                    new: new_ip,
                });
            }

            UpdateOutcome::Unchanged => {
                error!("Provider reported no change although the address changed locally");
                "the provider answered \"nochg\", claiming the record already held this address"
                    .into()
            }

            UpdateOutcome::Failed(reason) => {
                error!("Error updating DNS record for {}: {}", self.hostname, reason);
                reason
            }
        };

        self.notifier
            .notify(&Notice::needs_attention(self.hostname, old_ip, new_ip, &reason))?;

        Ok(Outcome::NeedsAttention {
            old: old_ip,
            new: new_ip,
            reason,
        })
    }
}

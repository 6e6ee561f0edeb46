use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use lettre::message::Mailbox;

use crate::logging::Loglevel;
use crate::notify::SmtpConfig;
use crate::services::dyndns;

macro_rules! env_prefix {
    () => {
        "DYNDNS_"
    };
}

/// Keeps a dynamic DNS record pointed at this host's public IP address.
/// Meant to be started periodically by a timer; every invocation checks once
/// and exits.
#[derive(Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Hostname whose record is kept up to date
    #[arg(
        long,
        value_name = "HOSTNAME",
        value_parser = non_empty,
        env = concat!(env_prefix!(), "HOSTNAME")
    )]
    pub hostname: Box<str>,

    /// User name for the DNS provider
    #[arg(
        long,
        value_name = "USERNAME",
        value_parser = non_empty,
        env = concat!(env_prefix!(), "USERNAME")
    )]
    pub username: Box<str>,

    /// Password for the DNS provider
    #[arg(
        long,
        value_name = "PASSWORD",
        value_parser = non_empty,
        hide_env_values = true,
        env = concat!(env_prefix!(), "PASSWORD")
    )]
    pub password: Box<str>,

    /// Host of the provider's dyndns2 update endpoint (https://<SERVER>/nic/update).
    /// A `scheme://host[:port]` value is used as the base instead
    #[arg(
        long,
        value_name = "SERVER",
        value_parser = non_empty,
        default_value = "domains.google.com",
        env = concat!(env_prefix!(), "SERVER")
    )]
    pub server: Box<str>,

    /// Address notifications are sent from. Also the SMTP login
    #[arg(
        long,
        value_name = "MAILBOX",
        env = concat!(env_prefix!(), "MAIL_SENDER")
    )]
    pub mail_sender: Mailbox,

    /// SMTP password of the sender
    #[arg(
        long,
        value_name = "PASSWORD",
        value_parser = non_empty,
        hide_env_values = true,
        env = concat!(env_prefix!(), "MAIL_PASSWORD")
    )]
    pub mail_password: Box<str>,

    /// Address notifications are sent to
    #[arg(
        long,
        value_name = "MAILBOX",
        env = concat!(env_prefix!(), "MAIL_RECIPIENT")
    )]
    pub mail_recipient: Mailbox,

    /// Mail relay accepting authenticated submissions over STARTTLS
    #[arg(
        long,
        value_name = "HOST",
        value_parser = non_empty,
        default_value = "smtp.gmail.com",
        env = concat!(env_prefix!(), "SMTP_RELAY")
    )]
    pub smtp_relay: Box<str>,

    /// Submission port of the mail relay
    #[arg(
        long,
        value_name = "PORT",
        default_value_t = 587,
        env = concat!(env_prefix!(), "SMTP_PORT")
    )]
    pub smtp_port: u16,

    /// File holding the last address published to the provider
    #[arg(
        long,
        value_name = "PATH",
        default_value = "/var/lib/dynwatch/last_ip",
        env = concat!(env_prefix!(), "STATE_FILE")
    )]
    pub state_file: PathBuf,

    /// IP echo service answering with JSON ({"ip": "..."})
    #[arg(
        long,
        value_name = "URL",
        value_parser = non_empty,
        default_value = "https://api.ipify.org?format=json",
        env = concat!(env_prefix!(), "PRIMARY_URL")
    )]
    pub primary_url: Box<str>,

    /// IP echo service answering with an HTML page, asked when the primary one has no answer
    #[arg(
        long,
        value_name = "URL",
        value_parser = non_empty,
        default_value = "http://checkip.dyndns.org",
        env = concat!(env_prefix!(), "FALLBACK_URL")
    )]
    pub fallback_url: Box<str>,

    /// Timeout in seconds for every HTTP request and the SMTP session
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..),
        env = concat!(env_prefix!(), "TIMEOUT")
    )]
    pub timeout: u64,

    /// User-Agent sent with every HTTP request
    #[arg(
        long,
        value_name = "AGENT",
        value_parser = non_empty,
        default_value = concat!("dynwatch/", env!("CARGO_PKG_VERSION")),
        env = concat!(env_prefix!(), "USER_AGENT")
    )]
    pub user_agent: Box<str>,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOGLEVEL")
    )]
    pub loglevel: Loglevel,
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn dyndns(&self) -> dyndns::Config {
        dyndns::Config {
            server: self.server.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            hostname: self.hostname.clone(),
        }
    }

    pub fn smtp(&self) -> SmtpConfig {
        SmtpConfig {
            relay: self.smtp_relay.clone(),
            port: self.smtp_port,
            sender: self.mail_sender.clone(),
            password: self.mail_password.clone(),
            recipient: self.mail_recipient.clone(),
            timeout: self.timeout(),
        }
    }
}

fn non_empty(value: &str) -> Result<Box<str>, String> {
    let value = value.trim();
    if value.is_empty() {
        Err(String::from("must not be empty"))
    } else {
        Ok(value.into())
    }
}

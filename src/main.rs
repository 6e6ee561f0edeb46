mod config;
mod http;
mod ip;
mod logging;
mod notify;
mod persistence;
mod services;
mod util;
mod workflow;

use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info};

use config::Config;
use ip::{HtmlEcho, JsonEcho, Resolver};
use notify::SmtpNotifier;
use persistence::StateFile;
use services::dyndns;
use workflow::{Outcome, Workflow, WorkflowError};

fn main() -> ExitCode {
    let config = Config::parse();

    logging::init(config.loglevel.into());

    debug!("dynwatch v{} started", env!("CARGO_PKG_VERSION"));

    match run(&config) {
        Ok(Outcome::Unchanged(_)) => ExitCode::SUCCESS,
        Ok(Outcome::Updated { old, new }) => {
            info!("Updated {} from {} to {}", config.hostname, old, new);
            ExitCode::SUCCESS
        }
        // Already logged and mailed; the next run retries.
        Ok(Outcome::NeedsAttention { .. }) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<Outcome, WorkflowError> {
    let client = http::Client::new(&config.user_agent, config.timeout());

    let state = StateFile::new(config.state_file.clone());
    let _lock = state.lock()?;
    debug!("Using state file {}", state.path().display());

    let resolver = Resolver::new(
        Box::new(JsonEcho::new(client.clone(), &config.primary_url)),
        Box::new(HtmlEcho::new(client.clone(), &config.fallback_url)),
    );

    let mut service = dyndns::Service::from_config(client, &config.dyndns());
    let notifier = SmtpNotifier::from_config(&config.smtp())?;

    Workflow {
        hostname: &config.hostname,
        state: &state,
        resolver: &resolver,
        service: &mut service,
        notifier: &notifier,
    }
    .run()
}

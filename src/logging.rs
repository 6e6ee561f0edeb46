use clap::ValueEnum;
use env_logger::Builder;
use log::{LevelFilter, Log, Metadata, Record};

/// Used to set the applications loglevel
// log::Level doesn't derive ValueEnum, so it's mirrored here
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<Loglevel> for LevelFilter {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Error => LevelFilter::Error,
            Loglevel::Warn => LevelFilter::Warn,
            Loglevel::Info => LevelFilter::Info,
            Loglevel::Debug => LevelFilter::Debug,
            Loglevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Sends every record that passes the level filter to stderr and, when it
/// could be reached, to the local syslog daemon.
struct Tee {
    stderr: env_logger::Logger,
    syslog: Option<Box<dyn Log>>,
}

impl Log for Tee {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.stderr.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.stderr.matches(record) {
            return;
        }

        self.stderr.log(record);
        if let Some(syslog) = &self.syslog {
            syslog.log(record);
        }
    }

    fn flush(&self) {
        self.stderr.flush();
        if let Some(syslog) = &self.syslog {
            syslog.flush();
        }
    }
}

#[cfg(target_family = "unix")]
fn connect_syslog() -> Result<Box<dyn Log>, syslog::Error> {
    let formatter = syslog::Formatter3164 {
        facility: syslog::Facility::LOG_DAEMON,
        hostname: None,
        process: env!("CARGO_PKG_NAME").into(),
        pid: std::process::id(),
    };

    let logger = syslog::unix(formatter)?;
    Ok(Box::new(syslog::BasicLogger::new(logger)))
}

/// Installs the process logger. Records go to stderr and to syslog over
/// `/dev/log`. If syslog is unavailable, that is logged once on stderr and
/// the run carries on.
pub fn init(level: LevelFilter) {
    let stderr = Builder::new().filter_level(level).build();

    #[cfg(target_family = "unix")]
    let (syslog, syslog_error) = match connect_syslog() {
        Ok(logger) => (Some(logger), None),
        Err(e) => (None, Some(e.to_string())),
    };

    #[cfg(not(target_family = "unix"))]
    let (syslog, syslog_error): (Option<Box<dyn Log>>, Option<String>) = (None, None);

    let max_level = stderr.filter();
    if log::set_boxed_logger(Box::new(Tee { stderr, syslog })).is_ok() {
        log::set_max_level(max_level);
    }

    if let Some(e) = syslog_error {
        log::warn!("System log unavailable, logging to stderr only: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use log::Level;

    use super::*;

    /// Collects the messages it is handed.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<String>>>);

    impl Log for Captured {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            self.0.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    fn tee(level: LevelFilter, captured: &Captured) -> Tee {
        Tee {
            stderr: Builder::new().filter_level(level).is_test(true).build(),
            syslog: Some(Box::new(captured.clone())),
        }
    }

    #[test]
    fn syslog_receives_filtered_records() {
        let captured = Captured::default();
        let tee = tee(LevelFilter::Info, &captured);

        tee.log(
            &Record::builder()
                .level(Level::Error)
                .args(format_args!("Unable to send the notification"))
                .build(),
        );
        tee.log(&Record::builder().level(Level::Debug).args(format_args!("old_ip = 1.2.3.4")).build());

        assert_eq!(*captured.0.lock().unwrap(), vec!["Unable to send the notification"]);
    }

    #[test]
    fn level_follows_filter() {
        let captured = Captured::default();
        let tee = tee(LevelFilter::Warn, &captured);

        assert!(tee.enabled(&Metadata::builder().level(Level::Error).build()));
        assert!(tee.enabled(&Metadata::builder().level(Level::Warn).build()));
        assert!(!tee.enabled(&Metadata::builder().level(Level::Info).build()));
    }

    #[test]
    fn level_filters() {
        assert_eq!(LevelFilter::from(Loglevel::Warn), LevelFilter::Warn);
        assert_eq!(LevelFilter::from(Loglevel::Debug), LevelFilter::Debug);
    }
}

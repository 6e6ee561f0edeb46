use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The single file that survives between invocations. It holds the address
/// last published to the DNS provider and nothing else; surrounding
/// whitespace is tolerated when reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateFile {
    path: PathBuf,
}

/// Held for the duration of an invocation. Dropping it closes the lock file,
/// which releases the lock.
#[derive(Debug)]
pub struct StateLock {
    _file: File,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("unable to read state file {0}: {1}")]
    Read(Box<str>, io::Error),

    #[error("state file {0} is empty; seed it with the currently published address")]
    Empty(Box<str>),

    #[error("state file {0} does not hold a valid IP address: \"{1}\"")]
    Invalid(Box<str>, Box<str>),

    #[error("unable to write state file {0}: {1}")]
    Write(Box<str>, io::Error),

    #[error("unable to lock {0}: {1}")]
    Lock(Box<str>, io::Error),

    #[error("{0} is held by another invocation")]
    Locked(Box<str>),
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> Box<str> {
        self.path.display().to_string().into()
    }

    /// Loads the last-known address. A missing, empty or garbled file is an
    /// error; there is no implicit first run.
    pub fn read(&self) -> Result<IpAddr, StateError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| StateError::Read(self.display(), e))?;

        let contents = contents.trim();
        if contents.is_empty() {
            return Err(StateError::Empty(self.display()));
        }

        contents
            .parse::<IpAddr>()
            .map_err(|_| StateError::Invalid(self.display(), contents.into()))
    }

    /// Replaces the file contents with `ip`.
    pub fn write(&self, ip: IpAddr) -> Result<(), StateError> {
        let write = || -> io::Result<()> {
            let mut file = File::create(&self.path)?;
            writeln!(file, "{}", ip)?;
            file.sync_all()
        };

        write().map_err(|e| StateError::Write(self.display(), e))
    }

    /// Takes an exclusive lock on `<path>.lock` so that overlapping
    /// invocations cannot race on the state file. Fails immediately instead
    /// of waiting if the lock is taken.
    pub fn lock(&self) -> Result<StateLock, StateError> {
        let mut lock_path = OsString::from(self.path.as_os_str());
        lock_path.push(".lock");
        let lock_path = PathBuf::from(lock_path);
        let display: Box<str> = lock_path.display().to_string().into();

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| StateError::Lock(display.clone(), e))?;

        #[cfg(target_family = "unix")]
        {
            use std::os::unix::io::AsRawFd;

            // SAFETY: the descriptor belongs to `file`, which is alive here.
            let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
            if ret != 0 {
                let err = io::Error::last_os_error();
                return Err(match err.kind() {
                    io::ErrorKind::WouldBlock => StateError::Locked(display),
                    _ => StateError::Lock(display, err),
                });
            }
        }

        Ok(StateLock { _file: file })
    }
}

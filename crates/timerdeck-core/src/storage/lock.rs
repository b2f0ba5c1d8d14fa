//! Single-runner lock for the data directory.
//!
//! A foreground runner keeps the whole timer collection in memory and
//! saves it on every tick, so any write made by another process would be
//! overwritten a second later. The runner holds a pid file in the data
//! directory for as long as it ticks; mutating commands elsewhere check
//! it and refuse. A pid file left behind by a dead process is stale and
//! gets replaced.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};
use tracing::{debug, warn};

use crate::error::StorageError;

const LOCK_FILE: &str = "timerdeck-run.pid";

/// Held while a process ticks the timers in a data directory. Released
/// on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    pid: u32,
}

impl RunLock {
    /// Take the lock for this process.
    ///
    /// # Errors
    /// [`StorageError::Busy`] when another live process holds it.
    pub fn acquire(dir: &Path) -> Result<Self, StorageError> {
        let path = dir.join(LOCK_FILE);
        let pid = std::process::id();

        // Write the pid to a private file first and link it into place, so
        // the lock file never exists without its content.
        let staging = dir.join(format!("{LOCK_FILE}.{pid}"));
        fs::File::create(&staging)?.write_all(pid.to_string().as_bytes())?;
        let result = Self::link(&staging, &path);
        let _ = fs::remove_file(&staging);
        result?;

        debug!(pid, path = %path.display(), "run lock acquired");
        Ok(Self { path, pid })
    }

    fn link(staging: &Path, path: &Path) -> Result<(), StorageError> {
        for _ in 0..2 {
            match fs::hard_link(staging, path) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if let Some(holder) = live_holder(path) {
                        return Err(StorageError::Busy { pid: holder });
                    }
                    warn!(path = %path.display(), "replacing stale run lock");
                    match fs::remove_file(path) {
                        Ok(()) => {}
                        Err(e) if e.kind() == ErrorKind::NotFound => {}
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(StorageError::Locked)
    }

    /// Pid of another live process holding the lock, if any.
    pub fn holder(dir: &Path) -> Option<u32> {
        live_holder(&dir.join(LOCK_FILE))
    }

    /// Fail if another process is ticking the timers in `dir`.
    ///
    /// # Errors
    /// [`StorageError::Busy`] naming the holder.
    pub fn ensure_free(dir: &Path) -> Result<(), StorageError> {
        match Self::holder(dir) {
            Some(pid) => Err(StorageError::Busy { pid }),
            None => Ok(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        // Only remove the file if it is still ours.
        if read_pid(&self.path) == Some(self.pid) {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(error = %e, path = %self.path.display(), "failed to release run lock");
            }
        }
    }
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn live_holder(path: &Path) -> Option<u32> {
    let pid = read_pid(path)?;
    (pid != std::process::id() && is_alive(pid)).then_some(pid)
}

fn is_alive(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system
        .process(pid)
        .is_some_and(|process| process.status() != ProcessStatus::Zombie)
}

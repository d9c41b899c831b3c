//! Best-effort source revision lookup used to stamp `meta.version`.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::RevisionLookupFailure;

const POLL_INTERVAL_MS: u64 = 10;

/// Something that can name the current source revision.
pub trait RevisionSource {
    fn revision(&self) -> Result<String, RevisionLookupFailure>;
}

impl<F> RevisionSource for F
where
    F: Fn() -> Result<String, RevisionLookupFailure>,
{
    fn revision(&self) -> Result<String, RevisionLookupFailure> {
        self()
    }
}

/// Runs a command in `dir` and takes the first line of its stdout as the revision.
#[derive(Debug, Clone)]
pub struct CommandRevision {
    program: String,
    args: Vec<String>,
    dir: PathBuf,
    timeout: Duration,
}

impl CommandRevision {
    /// `git rev-parse --short HEAD` inside `dir`.
    pub fn git(dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::new("git", ["rev-parse", "--short", "HEAD"], dir, timeout)
    }

    pub fn new<I, S>(program: &str, args: I, dir: impl Into<PathBuf>, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            dir: dir.into(),
            timeout,
        }
    }
}

impl RevisionSource for CommandRevision {
    fn revision(&self) -> Result<String, RevisionLookupFailure> {
        let program = self.program.clone();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| RevisionLookupFailure::Spawn {
                program: program.clone(),
                source,
            })?;

        let start = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if start.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RevisionLookupFailure::TimedOut {
                        program,
                        timeout: self.timeout,
                    });
                }
                Ok(None) => thread::sleep(Duration::from_millis(POLL_INTERVAL_MS)),
                Err(source) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RevisionLookupFailure::Spawn { program, source });
                }
            }
        };

        if !status.success() {
            return Err(RevisionLookupFailure::Failed { program, status });
        }

        // a short hash fits in the pipe buffer, so reading after exit cannot block
        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            let _ = pipe.read_to_string(&mut stdout);
        }
        match stdout.lines().next().map(str::trim) {
            Some(rev) if !rev.is_empty() => Ok(rev.to_string()),
            _ => Err(RevisionLookupFailure::Empty { program }),
        }
    }
}

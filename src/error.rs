use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Fatal failures of a build run.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("{label} file doesn't exist: {}", path.display())]
    MissingInputFile { label: &'static str, path: PathBuf },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid JSON in the expected shape: {source}", path.display())]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialise output for {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Why the revision hash could not be obtained. Never fatal.
#[derive(Debug, thiserror::Error)]
pub enum RevisionLookupFailure {
    #[error("could not run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("`{program}` printed no revision")]
    Empty { program: String },
}

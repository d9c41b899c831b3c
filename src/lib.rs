//! Build the FunQA instruction dataset from extracted frame ids and QA annotations.

pub mod annotations;
pub mod builder;
pub mod error;
pub mod frames;
pub mod instructions;
pub mod revision;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

pub use builder::{build, make_meta, BuildOptions, BuildPaths, Meta, OutputDocument, AUTHOR};
pub use error::{BuildError, RevisionLookupFailure};
pub use revision::{CommandRevision, RevisionSource};

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, BuildError> {
    let raw = fs::read_to_string(path).map_err(|source| BuildError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| BuildError::MalformedJson {
        path: path.to_path_buf(),
        source,
    })
}

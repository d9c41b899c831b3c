use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::annotations::load_annotations;
use crate::error::BuildError;
use crate::frames::FrameIndex;
use crate::instructions::{make_instructions, Instructions};
use crate::revision::RevisionSource;

pub const AUTHOR: &str = "NobleAI";
pub const TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub version: String,
    pub author: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub meta: Meta,
    pub data: Instructions,
}

#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub image_json: PathBuf,
    pub annotations: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Pretty-print the output file.
    pub pretty: bool,
}

/// A failed revision lookup leaves `version` empty.
pub fn make_meta(revision: &dyn RevisionSource, now: DateTime<Local>) -> Meta {
    let version = match revision.revision() {
        Ok(rev) => rev,
        Err(e) => {
            warn!("Could not determine source revision: {e}");
            String::new()
        }
    };
    Meta {
        version,
        author: AUTHOR.to_string(),
        time: now.format(TIME_FORMAT).to_string(),
    }
}

fn ensure_exists(label: &'static str, path: &Path) -> Result<(), BuildError> {
    if path.exists() {
        Ok(())
    } else {
        Err(BuildError::MissingInputFile {
            label,
            path: path.to_path_buf(),
        })
    }
}

/// Load both inputs, join them, stamp metadata and write the result to `paths.output`.
///
/// Nothing is read or written unless both input files exist.
pub fn build(
    paths: &BuildPaths,
    options: &BuildOptions,
    revision: &dyn RevisionSource,
) -> Result<OutputDocument, BuildError> {
    ensure_exists("image json", &paths.image_json)?;
    ensure_exists("annotation json", &paths.annotations)?;

    let frames = FrameIndex::load(&paths.image_json)?;
    info!("Frame index {:?}: {} frame ids", paths.image_json, frames.len());

    let annotations = load_annotations(&paths.annotations)?;
    info!("Annotations {:?}: {} records", paths.annotations, annotations.len());

    let data = make_instructions(&frames, annotations);
    let meta = make_meta(revision, Local::now());
    info!("meta: version={:?} time={}", meta.version, meta.time);

    let doc = OutputDocument { meta, data };
    write_document(&paths.output, &doc, options.pretty)?;
    info!("Wrote {} instructions → {:?}", doc.data.len(), paths.output);

    Ok(doc)
}

fn write_document(path: &Path, doc: &OutputDocument, pretty: bool) -> Result<(), BuildError> {
    let write_err = |source: std::io::Error| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let mut out = BufWriter::new(File::create(path).map_err(write_err)?);

    let res = if pretty {
        serde_json::to_writer_pretty(&mut out, doc)
    } else {
        serde_json::to_writer(&mut out, doc)
    };
    res.map_err(|source| BuildError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    out.flush().map_err(write_err)
}

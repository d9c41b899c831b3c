//! Frame Index: the sorted frame identifiers and the clip prefix derived from each.
//!
//! Frame identifiers look like `<prefix>_<source>_<clip...>_<index>`. The clip part
//! is everything between the second and the last underscore, so `FunQA_train_H_A_101_0003`
//! belongs to clip `H_A_101`.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};
use serde::de::IgnoredAny;

use crate::error::BuildError;
use crate::read_json;

/// Clip token of a frame identifier: drop the first two and the last `_` segments.
///
/// Identifiers with three segments or fewer have no clip token and yield `""`.
pub fn prefix_token(key: &str) -> String {
    let parts: Vec<&str> = key.split('_').collect();
    if parts.len() <= 3 {
        return String::new();
    }
    parts[2..parts.len() - 1].join("_")
}

/// Sorted frame identifiers plus their clip tokens, kept positionally aligned.
#[derive(Debug, Clone, Default)]
pub struct FrameIndex {
    keys: Vec<String>,
    prefixes: Vec<String>,
}

impl FrameIndex {
    /// Read the frame json (an object keyed by frame id). Values are skipped.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let raw: BTreeMap<String, IgnoredAny> = read_json(path)?;
        debug!("Loaded {} frame ids from {}", raw.len(), path.display());
        Ok(Self::from_keys(raw.into_keys()))
    }

    pub fn from_keys<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut keys: Vec<String> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut prefixes: Vec<String> = keys.iter().map(|k| prefix_token(k)).collect();

        // The range search below needs the prefixes non-decreasing. Keys that break the
        // naming convention can violate that; re-sort both columns together in that case.
        if let Some(pos) = prefixes.windows(2).position(|w| w[0] > w[1]) {
            warn!(
                "Frame id {:?} breaks the clip prefix ordering; re-sorting frame ids by clip prefix",
                keys[pos + 1]
            );
            let mut pairs: Vec<(String, String)> = prefixes.into_iter().zip(keys).collect();
            pairs.sort_unstable();
            let (p, k): (Vec<String>, Vec<String>) = pairs.into_iter().unzip();
            prefixes = p;
            keys = k;
        }

        Self { keys, prefixes }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// All frame ids whose clip token equals `clip`, in sorted order.
    pub fn image_ids(&self, clip: &str) -> &[String] {
        let start = self.prefixes.partition_point(|p| p.as_str() < clip);
        let end = self.prefixes.partition_point(|p| p.as_str() <= clip);
        &self.keys[start..end]
    }
}

//! The join: annotations + frame index -> instruction records.

use std::collections::{BTreeMap, HashMap};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::annotations::Annotation;
use crate::frames::FrameIndex;

/// Attributes computed here; a raw annotation carrying one of them is overridden.
const COMPUTED_KEYS: [&str; 3] = ["answer", "image_ids", "rel_ins_ids"];

/// One finished entry of the instruction dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionRecord {
    pub answer: Value,
    pub image_ids: Vec<String>,
    pub rel_ins_ids: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type Instructions = BTreeMap<String, InstructionRecord>;

/// Link every annotation to its frames and to the other annotations of the same video.
///
/// `ID`, `task` and `visual_input` are consumed here and do not reach the output.
pub fn make_instructions(frames: &FrameIndex, annotations: Vec<Annotation>) -> Instructions {
    // key -> annotation, in annotation order; a repeated ID replaces the earlier entry in place
    let mut ordered: Vec<(String, Annotation)> = Vec::with_capacity(annotations.len());
    let mut position: HashMap<String, usize> = HashMap::with_capacity(annotations.len());
    for ann in annotations {
        let key = ann.key();
        match position.get(&key) {
            Some(&idx) => {
                warn!("Duplicate instruction id {key}; keeping the later record");
                ordered[idx].1 = ann;
            }
            None => {
                position.insert(key.clone(), ordered.len());
                ordered.push((key, ann));
            }
        }
    }

    // visual_input -> keys sharing that video
    let mut by_video: HashMap<&str, Vec<&str>> = HashMap::new();
    for (key, ann) in &ordered {
        by_video
            .entry(ann.visual_input.as_str())
            .or_default()
            .push(key.as_str());
    }

    let mut related: Vec<Vec<String>> = Vec::with_capacity(ordered.len());
    let mut images: Vec<Vec<String>> = Vec::with_capacity(ordered.len());
    for (key, ann) in &ordered {
        let siblings = by_video
            .get(ann.visual_input.as_str())
            .map(|group| {
                group
                    .iter()
                    .filter(|k| **k != key.as_str())
                    .map(|k| k.to_string())
                    .collect()
            })
            .unwrap_or_default();
        related.push(siblings);
        images.push(frames.image_ids(ann.clip_name()).to_vec());
    }

    let mut out = Instructions::new();
    let mut without_frames = 0usize;
    for (((key, ann), image_ids), rel_ins_ids) in ordered.into_iter().zip(images).zip(related) {
        if image_ids.is_empty() {
            without_frames += 1;
        }
        let mut extra = ann.extra;
        for k in COMPUTED_KEYS {
            extra.remove(k);
        }
        out.insert(
            key,
            InstructionRecord {
                answer: ann.output,
                image_ids,
                rel_ins_ids,
                extra,
            },
        );
    }

    info!(
        "Built {} instructions ({} without matching frames)",
        out.len(),
        without_frames
    );
    out
}

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::error::BuildError;
use crate::read_json;

/// Prefix of every synthesized instruction key.
pub const KEY_PREFIX: &str = "FunQA_";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AnnotationId {
    Text(String),
    Number(Number),
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationId::Text(s) => f.write_str(s),
            AnnotationId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One raw QA pair from the annotation file.
#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    #[serde(rename = "ID")]
    pub id: AnnotationId,
    pub visual_input: String,
    pub output: Value,
    pub task: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Annotation {
    /// `FunQA_<ID>`
    pub fn key(&self) -> String {
        format!("{KEY_PREFIX}{}", self.id)
    }

    /// Video file name without its extension (text after the last `.`).
    pub fn clip_name(&self) -> &str {
        clip_name(&self.visual_input)
    }
}

pub fn clip_name(visual_input: &str) -> &str {
    match visual_input.rfind('.') {
        Some(dot) => &visual_input[..dot],
        None => visual_input,
    }
}

/// Read the annotation file (a JSON array of objects).
pub fn load_annotations(path: &Path) -> Result<Vec<Annotation>, BuildError> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> Annotation {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn numeric_and_text_ids_make_keys() {
        let a = parse(json!({"ID": 12, "visual_input": "x.mp4", "output": "o", "task": "t"}));
        assert_eq!(a.key(), "FunQA_12");
        let b = parse(json!({"ID": "H_7", "visual_input": "x.mp4", "output": "o", "task": "t"}));
        assert_eq!(b.key(), "FunQA_H_7");
    }

    #[test]
    fn extra_fields_are_collected() {
        let a = parse(json!({
            "ID": 1, "visual_input": "x.mp4", "output": "o", "task": "t",
            "instruction": "why?", "difficulty": 3
        }));
        assert_eq!(a.extra.len(), 2);
        assert_eq!(a.extra["instruction"], json!("why?"));
        assert!(!a.extra.contains_key("ID"));
    }

    #[test]
    fn clip_name_strips_last_extension() {
        assert_eq!(clip_name("clipA.mp4"), "clipA");
        assert_eq!(clip_name("a.b.mp4"), "a.b");
        assert_eq!(clip_name("noext"), "noext");
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let r: Result<Annotation, _> =
            serde_json::from_value(json!({"ID": 1, "output": "o", "task": "t"}));
        assert!(r.is_err());
    }
}

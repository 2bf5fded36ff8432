//! @ai:module:intent Define data structures for span annotations and label sets
//! @ai:module:layer domain
//! @ai:module:public_api SpanAnnotation, LabelSet, char_len, slice_chars
//! @ai:module:stateless true

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// @ai:intent A labeled half-open interval [start, end) over a text, in characters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpanAnnotation {
    pub start: usize,
    pub end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SpanAnnotation {
    /// @ai:intent Create a bare span with only offsets and tag
    /// @ai:effects pure
    pub fn new(start: usize, end: usize, tag: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: None,
            tag: tag.into(),
            color: None,
        }
    }

    /// @ai:intent Attach the covered substring
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// @ai:intent Attach the display color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// @ai:intent Number of characters covered by the span
    /// @ai:effects pure
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// @ai:intent Check whether the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// @ai:intent Length of a text in characters (the unit of span offsets)
/// @ai:effects pure
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// @ai:intent Slice a text by character offsets, None when out of range
/// @ai:pre start <= end
/// @ai:effects pure
/// @ai:example ("héllo", 1, 3) -> Some("él")
pub fn slice_chars(text: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }

    let mut boundaries = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()));

    let start_byte = boundaries.nth(start)?;
    let end_byte = if end == start {
        start_byte
    } else {
        boundaries.nth(end - start - 1)?
    };

    Some(&text[start_byte..end_byte])
}

/// Raw label input: the original component accepts either one label or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LabelsInput {
    One(String),
    Many(Vec<String>),
}

/// @ai:intent Ordered sequence of unique label identifiers
/// @ai:invariant no duplicates; order fixes palette assignment and default selection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "LabelsInput", into = "Vec<String>")]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// @ai:intent Build a label set, rejecting duplicates
    /// @ai:effects pure
    pub fn new<I, S>(labels: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if collected.contains(&label) {
                return Err(ConfigurationError::DuplicateLabel(label));
            }
            collected.push(label);
        }
        Ok(Self { labels: collected })
    }

    /// @ai:intent Promote a single label to a one-element set
    pub fn single(label: impl Into<String>) -> Self {
        Self {
            labels: vec![label.into()],
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.labels.iter().any(|l| l == tag)
    }

    pub fn position(&self, tag: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == tag)
    }

    pub fn first(&self) -> Option<&str> {
        self.labels.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

impl TryFrom<LabelsInput> for LabelSet {
    type Error = ConfigurationError;

    fn try_from(input: LabelsInput) -> Result<Self, Self::Error> {
        match input {
            LabelsInput::One(label) => Ok(Self::single(label)),
            LabelsInput::Many(labels) => Self::new(labels),
        }
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(set: LabelSet) -> Self {
        set.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_chars_ascii() {
        assert_eq!(slice_chars("Hello world!", 0, 5), Some("Hello"));
        assert_eq!(slice_chars("Hello world!", 6, 12), Some("world!"));
        assert_eq!(slice_chars("hi", 0, 1000), None);
    }

    #[test]
    fn test_slice_chars_multibyte() {
        assert_eq!(slice_chars("héllo wörld", 1, 3), Some("él"));
        assert_eq!(slice_chars("héllo wörld", 6, 11), Some("wörld"));
        assert_eq!(char_len("héllo wörld"), 11);
    }

    #[test]
    fn test_label_set_rejects_duplicates() {
        let err = LabelSet::new(["PERSON", "ORG", "PERSON"]).unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateLabel("PERSON".to_string()));
    }

    #[test]
    fn test_label_set_accepts_single_string() {
        let set: LabelSet = serde_json::from_str(r#""PERSON""#).unwrap();
        assert_eq!(set.as_slice(), ["PERSON".to_string()]);

        let set: LabelSet = serde_json::from_str(r#"["PERSON", "ORG"]"#).unwrap();
        assert_eq!(set.position("ORG"), Some(1));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["PERSON","ORG"]"#);
    }

    #[test]
    fn test_annotation_optional_fields() {
        let ann: SpanAnnotation =
            serde_json::from_str(r#"{"start": 0, "end": 2, "tag": "ORG"}"#).unwrap();
        assert_eq!(ann, SpanAnnotation::new(0, 2, "ORG"));
        assert_eq!(
            serde_json::to_string(&ann).unwrap(),
            r#"{"start":0,"end":2,"tag":"ORG"}"#
        );
    }
}

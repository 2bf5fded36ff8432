//! @ai:module:intent Resolve a deterministic label to color mapping
//! @ai:module:layer domain
//! @ai:module:public_api Palette, resolve, BUILTIN_COLORS
//! @ai:module:depends_on annotation, error
//! @ai:module:stateless true

use crate::annotation::LabelSet;
use crate::error::ConfigurationError;
use serde::Serialize;

/// Colors assigned in order when the caller gives none. Repeats after nine labels.
pub const BUILTIN_COLORS: [&str; 9] = [
    "red", "green", "blue", "yellow", "orange", "purple", "pink", "cyan", "gray",
];

/// @ai:intent Total, immutable mapping from each label to exactly one color
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Palette {
    labels: LabelSet,
    colors: Vec<String>,
}

/// @ai:intent Resolve the palette for a label set and optional explicit colors
/// @ai:pre colors, when given, has one entry per label
/// @ai:post every label maps to exactly one color
/// @ai:effects pure
/// @ai:example (["PERSON", "ORG"], None) -> {PERSON: red, ORG: green}
/// @ai:example (["A", "B"], Some(["red"])) -> ColorCountMismatch
pub fn resolve(labels: &LabelSet, colors: Option<&[String]>) -> Result<Palette, ConfigurationError> {
    let colors = match colors {
        Some(colors) => {
            if colors.len() != labels.len() {
                return Err(ConfigurationError::ColorCountMismatch {
                    labels: labels.len(),
                    colors: colors.len(),
                });
            }
            colors.to_vec()
        }
        None => (0..labels.len())
            .map(|i| BUILTIN_COLORS[i % BUILTIN_COLORS.len()].to_string())
            .collect(),
    };

    Ok(Palette {
        labels: labels.clone(),
        colors,
    })
}

impl Palette {
    /// @ai:intent Look up the color for a tag
    /// @ai:effects pure
    pub fn color_of(&self, tag: &str) -> Option<&str> {
        self.labels
            .position(tag)
            .map(|i| self.colors[i].as_str())
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// @ai:intent Colors as an ordered sequence aligned to the label set
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// @ai:intent Iterate (label, color) pairs in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels
            .iter()
            .zip(self.colors.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> LabelSet {
        LabelSet::new(names.iter().copied()).unwrap()
    }

    #[test]
    fn test_default_palette_cycles_builtin_colors() {
        let names: Vec<String> = (0..20).map(|i| format!("L{}", i)).collect();
        let set = LabelSet::new(names.clone()).unwrap();

        let first = resolve(&set, None).unwrap();
        let second = resolve(&set, None).unwrap();
        assert_eq!(first, second);

        for (i, name) in names.iter().enumerate() {
            assert_eq!(first.color_of(name), Some(BUILTIN_COLORS[i % 9]));
        }
    }

    #[test]
    fn test_person_org_palette() {
        let palette = resolve(&labels(&["PERSON", "ORG"]), None).unwrap();
        assert_eq!(palette.color_of("PERSON"), Some("red"));
        assert_eq!(palette.color_of("ORG"), Some("green"));
        assert_eq!(palette.color_of("DATE"), None);
    }

    #[test]
    fn test_explicit_colors_pair_positionally() {
        let colors = vec!["#ff0000".to_string(), "teal".to_string()];
        let palette = resolve(&labels(&["A", "B"]), Some(&colors)).unwrap();
        assert_eq!(
            palette.iter().collect::<Vec<_>>(),
            vec![("A", "#ff0000"), ("B", "teal")]
        );
    }

    #[test]
    fn test_explicit_colors_arity_mismatch() {
        let colors = vec!["red".to_string()];
        let err = resolve(&labels(&["A", "B"]), Some(&colors)).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::ColorCountMismatch {
                labels: 2,
                colors: 1
            }
        );
    }

    #[test]
    fn test_empty_labels_resolve_to_empty_palette() {
        let palette = resolve(&LabelSet::default(), None).unwrap();
        assert!(palette.colors().is_empty());
    }
}

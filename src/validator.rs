//! @ai:module:intent Validate span annotations against a label set, palette and source text
//! @ai:module:layer application
//! @ai:module:public_api validate, validate_with_palette, audit, audit_file, audit_directory, ValidationReport, ValidationIssue
//! @ai:module:depends_on annotation, palette, session, error
//! @ai:module:stateless true

use crate::annotation::{char_len, slice_chars, LabelSet, SpanAnnotation};
use crate::error::{Result, ValidationError};
use crate::palette::Palette;
use crate::session::{SessionDefaults, SessionRequest};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Check every annotation's tag, bounds and text in input order
/// @ai:post Ok only if every tag is in labels, 0 <= start < end <= len(text) and text matches
/// @ai:effects pure
/// @ai:example ([{0, 1000, "ORG"}], ["ORG"], "hi") -> InvalidSpan
/// @ai:example ([{0, 2, "DATE"}], ["PERSON", "ORG"], "hi") -> UnknownTag
pub fn validate(
    annotations: &[SpanAnnotation],
    labels: &LabelSet,
    text: &str,
) -> std::result::Result<(), ValidationError> {
    let len = char_len(text);
    for (index, annotation) in annotations.iter().enumerate() {
        if let Some(err) = check_annotation(index, annotation, labels, None, text, len).into_iter().next() {
            return Err(err);
        }
    }
    Ok(())
}

/// @ai:intent Like validate, and also require each present color to match the palette
/// @ai:effects pure
pub fn validate_with_palette(
    annotations: &[SpanAnnotation],
    palette: &Palette,
    text: &str,
) -> std::result::Result<(), ValidationError> {
    let len = char_len(text);
    for (index, annotation) in annotations.iter().enumerate() {
        let issues = check_annotation(index, annotation, palette.labels(), Some(palette), text, len);
        if let Some(err) = issues.into_iter().next() {
            tracing::debug!("Rejecting annotation set: {}", err);
            return Err(err);
        }
    }
    Ok(())
}

/// @ai:intent Collect the problems of a single annotation, most fundamental first
/// @ai:effects pure
fn check_annotation(
    index: usize,
    annotation: &SpanAnnotation,
    labels: &LabelSet,
    palette: Option<&Palette>,
    text: &str,
    len: usize,
) -> Vec<ValidationError> {
    let mut issues = Vec::new();
    let known_tag = labels.contains(&annotation.tag);

    if !known_tag {
        issues.push(ValidationError::UnknownTag {
            index,
            tag: annotation.tag.clone(),
        });
    }

    let span_ok = annotation.start < annotation.end && annotation.end <= len;
    if !span_ok {
        issues.push(ValidationError::InvalidSpan {
            index,
            start: annotation.start,
            end: annotation.end,
            len,
        });
    }

    if span_ok {
        if let Some(found) = &annotation.text {
            // span_ok guarantees the slice exists
            let expected = slice_chars(text, annotation.start, annotation.end).unwrap_or_default();
            if found != expected {
                issues.push(ValidationError::TextMismatch {
                    index,
                    expected: expected.to_string(),
                    found: found.clone(),
                });
            }
        }
    }

    if let (Some(palette), Some(found), true) = (palette, &annotation.color, known_tag) {
        if let Some(expected) = palette.color_of(&annotation.tag) {
            if found != expected {
                issues.push(ValidationError::ColorMismatch {
                    index,
                    tag: annotation.tag.clone(),
                    expected: expected.to_string(),
                    found: found.clone(),
                });
            }
        }
    }

    issues
}

/// @ai:intent A single problem found while auditing an annotation set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub code: String,
    pub message: String,
    pub source: Option<PathBuf>,
    pub index: Option<usize>,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// @ai:intent Convert a validation error into a reportable issue with a hint
    /// @ai:effects pure
    fn from_error(err: &ValidationError, source: Option<&Path>) -> Self {
        let suggestion = match err {
            ValidationError::UnknownTag { .. } => "Add the tag to `labels` or retag the span".to_string(),
            ValidationError::InvalidSpan { len, .. } => {
                format!("Spans must satisfy 0 <= start < end <= {}", len)
            }
            ValidationError::TextMismatch { expected, .. } => {
                format!("Set `text` to \"{}\" or drop the field", expected)
            }
            ValidationError::ColorMismatch { expected, .. } => {
                format!("Set `color` to \"{}\" or drop the field", expected)
            }
        };

        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            source: source.map(Path::to_path_buf),
            index: Some(err.index()),
            suggestion: Some(suggestion),
        }
    }
}

/// @ai:intent Result of auditing one or more annotation sets
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationReport {
    pub documents_checked: usize,
    pub annotations_checked: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// @ai:intent Check if the audit found nothing
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    /// @ai:intent Merge another report into this one
    pub fn merge(&mut self, other: ValidationReport) {
        self.documents_checked += other.documents_checked;
        self.annotations_checked += other.annotations_checked;
        self.issues.extend(other.issues);
    }
}

/// @ai:intent Report every issue in an annotation set instead of stopping at the first
/// @ai:effects pure
pub fn audit(annotations: &[SpanAnnotation], palette: &Palette, text: &str) -> ValidationReport {
    audit_with_source(annotations, palette, text, None)
}

fn audit_with_source(
    annotations: &[SpanAnnotation],
    palette: &Palette,
    text: &str,
    source: Option<&Path>,
) -> ValidationReport {
    let len = char_len(text);
    let issues = annotations
        .iter()
        .enumerate()
        .flat_map(|(index, annotation)| {
            check_annotation(index, annotation, palette.labels(), Some(palette), text, len)
        })
        .map(|err| ValidationIssue::from_error(&err, source))
        .collect();

    ValidationReport {
        documents_checked: 1,
        annotations_checked: annotations.len(),
        issues,
    }
}

/// @ai:intent Audit a session document stored as JSON
/// @ai:pre path exists and is readable
/// @ai:effects fs:read
pub fn audit_file(path: &Path, defaults: &SessionDefaults) -> Result<ValidationReport> {
    let request = SessionRequest::load(path)?.with_defaults(defaults);
    let palette = request.palette()?;

    Ok(audit_with_source(
        &request.annotations,
        &palette,
        &request.text,
        Some(path),
    ))
}

/// @ai:intent Audit every JSON session document under a directory
/// @ai:pre path exists and is readable; otherwise an Io error is returned
/// @ai:post unreadable entries below the root are reported as E000
/// @ai:effects fs:read
pub fn audit_directory(path: &Path, defaults: &SessionDefaults) -> Result<ValidationReport> {
    let mut report = ValidationReport::default();

    for entry in WalkDir::new(path) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(std::io::Error::from(e).into()),
            Err(e) => {
                report.issues.push(ValidationIssue {
                    code: "E000".to_string(),
                    message: format!("Failed to read directory entry: {}", e),
                    source: e.path().map(Path::to_path_buf),
                    index: None,
                    suggestion: None,
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let file_path = entry.path();
        if file_path.extension().map(|ext| ext == "json").unwrap_or(false) {
            match audit_file(file_path, defaults) {
                Ok(file_report) => report.merge(file_report),
                Err(e) => {
                    report.documents_checked += 1;
                    report.issues.push(ValidationIssue {
                        code: "E000".to_string(),
                        message: format!("Failed to load session document: {}", e),
                        source: Some(file_path.to_path_buf()),
                        index: None,
                        suggestion: None,
                    });
                }
            }
        }
    }

    Ok(report)
}

//! @ai:module:intent Session contract: request defaults, validated config, payload and instance identity
//! @ai:module:layer domain
//! @ai:module:public_api SessionRequest, SessionDefaults, SessionConfig, RenderPayload, InstanceIdentity, resolve_selected_label
//! @ai:module:depends_on annotation, palette, validator, error
//! @ai:module:stateless true

use crate::annotation::{LabelSet, SpanAnnotation};
use crate::error::{ConfigurationError, Result};
use crate::palette::{resolve, Palette};
use crate::validator::validate_with_palette;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Resolve the active label: explicit choice if valid, else the first label
/// @ai:pre labels is non-empty when selected is None
/// @ai:effects pure
/// @ai:example (["PERSON", "ORG"], None) -> "PERSON"
pub fn resolve_selected_label(
    labels: &LabelSet,
    selected: Option<&str>,
) -> std::result::Result<String, ConfigurationError> {
    match selected {
        Some(label) if labels.contains(label) => Ok(label.to_string()),
        Some(label) => Err(ConfigurationError::UnknownSelectedLabel(label.to_string())),
        None => labels
            .first()
            .map(str::to_string)
            .ok_or(ConfigurationError::EmptyLabelSet),
    }
}

/// @ai:intent Values applied to a request that leaves them out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionDefaults {
    #[serde(default = "default_labels")]
    pub labels: LabelSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default = "default_show_label_selector")]
    pub show_label_selector: bool,
}

fn default_labels() -> LabelSet {
    LabelSet::new(["PERSON", "ORG"]).unwrap_or_default()
}

fn default_show_label_selector() -> bool {
    true
}

fn default_text() -> String {
    "Hello world!".to_string()
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            labels: default_labels(),
            colors: None,
            show_label_selector: default_show_label_selector(),
        }
    }
}

/// @ai:intent Permissive, deserializable form of a render call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRequest {
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default)]
    pub annotations: Vec<SpanAnnotation>,
    #[serde(default)]
    pub labels: Option<LabelSet>,
    #[serde(default)]
    pub colors: Option<Vec<String>>,
    #[serde(default)]
    pub selected_label: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub show_label_selector: Option<bool>,
}

impl Default for SessionRequest {
    fn default() -> Self {
        Self {
            text: default_text(),
            annotations: Vec::new(),
            labels: None,
            colors: None,
            selected_label: None,
            key: None,
            show_label_selector: None,
        }
    }
}

impl SessionRequest {
    /// @ai:intent Create a request for a text with every other field defaulted
    /// @ai:effects pure
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn annotations(mut self, annotations: Vec<SpanAnnotation>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn labels(mut self, labels: LabelSet) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn colors(mut self, colors: Vec<String>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn selected_label(mut self, label: impl Into<String>) -> Self {
        self.selected_label = Some(label.into());
        self
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn show_label_selector(mut self, show: bool) -> Self {
        self.show_label_selector = Some(show);
        self
    }

    /// @ai:intent Fill fields the request leaves out from configured defaults
    /// @ai:post default colors only apply together with default labels
    /// @ai:effects pure
    pub fn with_defaults(mut self, defaults: &SessionDefaults) -> Self {
        if self.labels.is_none() {
            self.labels = Some(defaults.labels.clone());
            if self.colors.is_none() {
                self.colors = defaults.colors.clone();
            }
        }
        if self.show_label_selector.is_none() {
            self.show_label_selector = Some(defaults.show_label_selector);
        }
        self
    }

    /// @ai:intent Load a request from a JSON session document
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let request: Self = serde_json::from_str(&content)?;
        Ok(request)
    }

    fn effective_labels(&self) -> LabelSet {
        self.labels.clone().unwrap_or_else(default_labels)
    }

    /// @ai:intent Resolve the palette this request would render with
    /// @ai:effects pure
    pub fn palette(&self) -> std::result::Result<Palette, ConfigurationError> {
        resolve(&self.effective_labels(), self.colors.as_deref())
    }
}

/// @ai:intent Validated configuration for one render call
/// @ai:invariant selected_label is in the palette's labels; annotations passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    text: String,
    annotations: Vec<SpanAnnotation>,
    palette: Palette,
    selected_label: String,
    show_label_selector: bool,
    key: Option<String>,
}

impl TryFrom<SessionRequest> for SessionConfig {
    type Error = crate::error::Error;

    /// @ai:intent Validating constructor: palette, selected label, then annotations
    /// @ai:effects pure
    fn try_from(request: SessionRequest) -> Result<Self> {
        let palette = request.palette()?;
        let selected_label =
            resolve_selected_label(palette.labels(), request.selected_label.as_deref())?;
        validate_with_palette(&request.annotations, &palette, &request.text)?;

        tracing::debug!(
            "Prepared session config: {} labels, {} annotations, key={:?}",
            palette.labels().len(),
            request.annotations.len(),
            request.key
        );

        Ok(Self {
            text: request.text,
            annotations: request.annotations,
            palette,
            selected_label,
            show_label_selector: request
                .show_label_selector
                .unwrap_or_else(default_show_label_selector),
            key: request.key,
        })
    }
}

impl SessionConfig {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn annotations(&self) -> &[SpanAnnotation] {
        &self.annotations
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn selected_label(&self) -> &str {
        &self.selected_label
    }

    pub fn show_label_selector(&self) -> bool {
        self.show_label_selector
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// @ai:intent Assemble the configuration payload sent to the rendering surface
    /// @ai:effects pure
    pub fn payload(&self) -> RenderPayload {
        RenderPayload {
            text: self.text.clone(),
            annotations: self.annotations.clone(),
            labels: self.palette.labels().as_slice().to_vec(),
            colors: self.palette.colors().to_vec(),
            selected_label: self.selected_label.clone(),
            show_label_selector: self.show_label_selector,
            key: self.key.clone(),
        }
    }

    /// @ai:intent Identity deciding whether a render continues the current session
    /// @ai:effects pure
    pub fn identity(&self) -> InstanceIdentity {
        match &self.key {
            Some(key) => InstanceIdentity::Keyed(key.clone()),
            None => InstanceIdentity::Unkeyed(Box::new(self.payload())),
        }
    }
}

/// @ai:intent Configuration payload as seen by the rendering surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderPayload {
    pub text: String,
    pub annotations: Vec<SpanAnnotation>,
    pub labels: Vec<String>,
    pub colors: Vec<String>,
    pub selected_label: String,
    pub show_label_selector: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// @ai:intent Same-instance test: shared key, or identical inputs when unkeyed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceIdentity {
    Keyed(String),
    Unkeyed(Box<RenderPayload>),
}

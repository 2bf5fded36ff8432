//! @ai:module:intent Span annotation model and sync contract for interactive text highlighting
//! @ai:module:layer infrastructure
//! @ai:module:public_api annotation, palette, validator, session, surface, bridge, config, output, error
//! @ai:module:stateless false
//!
//! # Text Highlighter
//!
//! Labels spans of a text with categorical tags. The host builds a
//! [`SessionConfig`] from a [`SessionRequest`] (resolving the palette and
//! validating its annotations), then a [`SyncBridge`] hands the payload to a
//! [`RenderingSurface`] and returns the surface's annotation set.
//!
//! ## Example
//!
//! ```rust
//! use text_highlighter::{LabelSet, ScriptedSurface, SessionConfig, SessionRequest, SpanAnnotation, SyncBridge};
//!
//! let request = SessionRequest::new("Hello world!")
//!     .labels(LabelSet::new(["PERSON", "ORG"]).unwrap())
//!     .annotations(vec![SpanAnnotation::new(0, 5, "ORG").with_text("Hello")])
//!     .key("demo");
//! let config = SessionConfig::try_from(request).unwrap();
//!
//! let mut bridge = SyncBridge::new();
//! let mut surface = ScriptedSurface::default();
//! let annotations = bridge.sync(&config, &mut surface).unwrap();
//! assert_eq!(annotations, config.annotations());
//! ```

pub mod annotation;
pub mod bridge;
pub mod config;
pub mod error;
pub mod output;
pub mod palette;
pub mod session;
pub mod surface;
pub mod validator;

pub use annotation::{char_len, slice_chars, LabelSet, SpanAnnotation};
pub use bridge::{SessionPhase, SyncBridge};
pub use config::{HighlighterConfig, LogConfig};
pub use error::{ConfigurationError, Error, Result, ValidationError};
pub use output::{format_annotations, format_palette, format_report, render_highlighted, to_json, OutputFormat};
pub use palette::{resolve, Palette, BUILTIN_COLORS};
pub use session::{
    resolve_selected_label, InstanceIdentity, RenderPayload, SessionConfig, SessionDefaults,
    SessionRequest,
};
pub use surface::{ProcessSurface, RenderingSurface, ScriptedSurface, SurfaceRequest, SurfaceResponse};
pub use validator::{
    audit, audit_directory, audit_file, validate, validate_with_palette, ValidationIssue,
    ValidationReport,
};

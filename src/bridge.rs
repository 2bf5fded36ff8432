//! @ai:module:intent Synchronize a host's annotation set with an interactive rendering surface
//! @ai:module:layer application
//! @ai:module:public_api SyncBridge, SessionPhase
//! @ai:module:depends_on session, surface, validator, error
//! @ai:module:stateless false

use crate::annotation::SpanAnnotation;
use crate::error::Result;
use crate::session::{InstanceIdentity, SessionConfig};
use crate::surface::{RenderingSurface, SurfaceResponse};
use crate::validator::validate_with_palette;

/// @ai:intent Lifecycle state of the bridge's single session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Initialized {
        identity: InstanceIdentity,
        annotations: Vec<SpanAnnotation>,
        edited: bool,
    },
}

/// @ai:intent Boundary object between the host and one rendering surface instance
#[derive(Debug)]
pub struct SyncBridge {
    phase: SessionPhase,
    discarded: usize,
}

impl Default for SyncBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncBridge {
    /// @ai:intent Create a bridge with no session mounted
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            discarded: 0,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// @ai:intent Number of edited sessions dropped by an identity change
    pub fn discarded_sessions(&self) -> usize {
        self.discarded
    }

    /// @ai:intent Render the config and return the current annotation set
    /// @ai:pre config was built by SessionConfig::try_from, so its annotations are valid
    /// @ai:post fresh session -> returns config.annotations() unchanged
    /// @ai:post surface edits are returned verbatim after re-validation
    /// @ai:post a kept session value is re-validated against the current palette and text
    /// @ai:effects state:write, surface
    pub fn sync<S: RenderingSurface + ?Sized>(
        &mut self,
        config: &SessionConfig,
        surface: &mut S,
    ) -> Result<Vec<SpanAnnotation>> {
        let identity = config.identity();
        let payload = config.payload();

        let continuing = matches!(
            &self.phase,
            SessionPhase::Initialized { identity: current, .. } if *current == identity
        );

        if !continuing {
            self.reset();
            surface.mount(&payload)?;
            tracing::info!(
                "Mounted session (key={:?}) with {} annotations",
                config.key(),
                config.annotations().len()
            );
            self.phase = SessionPhase::Initialized {
                identity,
                annotations: config.annotations().to_vec(),
                edited: false,
            };
            return Ok(config.annotations().to_vec());
        }

        match surface.poll(&payload)? {
            SurfaceResponse::NoInteraction => {
                // Same identity may carry a new palette or text
                if let Err(e) = validate_with_palette(self.current(), config.palette(), config.text()) {
                    tracing::warn!("Session value no longer fits the current config: {}", e);
                    return Err(e.into());
                }
                Ok(self.current().to_vec())
            }
            SurfaceResponse::Annotations { annotations } => {
                if let Err(e) = validate_with_palette(&annotations, config.palette(), config.text()) {
                    tracing::warn!("Rendering surface returned an invalid annotation set: {}", e);
                    return Err(e.into());
                }

                tracing::debug!("Accepted {} annotations from surface", annotations.len());
                if let SessionPhase::Initialized {
                    annotations: current,
                    edited,
                    ..
                } = &mut self.phase
                {
                    *current = annotations.clone();
                    *edited = true;
                }
                Ok(annotations)
            }
        }
    }

    /// @ai:intent Drop the current session, noting discarded edits
    /// @ai:effects state:write
    fn reset(&mut self) {
        if let SessionPhase::Initialized { edited: true, .. } = self.phase {
            self.discarded += 1;
            tracing::info!("Identity changed, discarding unsynced edits of previous session");
        }
        self.phase = SessionPhase::Uninitialized;
    }

    /// @ai:intent Current value of the mounted session
    fn current(&self) -> &[SpanAnnotation] {
        match &self.phase {
            SessionPhase::Initialized { annotations, .. } => annotations,
            SessionPhase::Uninitialized => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::LabelSet;
    use crate::error::{Error, ValidationError};
    use crate::session::SessionRequest;
    use crate::surface::ScriptedSurface;
    use pretty_assertions::assert_eq;

    fn config(request: SessionRequest) -> SessionConfig {
        SessionConfig::try_from(request).unwrap()
    }

    fn person_org() -> LabelSet {
        LabelSet::new(["PERSON", "ORG"]).unwrap()
    }

    fn hello() -> Vec<SpanAnnotation> {
        vec![SpanAnnotation::new(0, 5, "ORG").with_text("Hello").with_color("green")]
    }

    fn edited() -> Vec<SpanAnnotation> {
        vec![
            SpanAnnotation::new(6, 11, "PERSON").with_text("world").with_color("red"),
            SpanAnnotation::new(0, 5, "ORG").with_text("Hello").with_color("green"),
        ]
    }

    #[test]
    fn test_fresh_session_returns_input() {
        let mut bridge = SyncBridge::new();
        let mut surface = ScriptedSurface::new([SurfaceResponse::Annotations { annotations: edited() }]);
        let cfg = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .annotations(hello()),
        );

        assert_eq!(bridge.sync(&cfg, &mut surface).unwrap(), hello());
        assert_eq!(surface.mounted().len(), 1);
        assert_eq!(surface.mounted()[0], cfg.payload());
    }

    #[test]
    fn test_edits_returned_verbatim_and_persist() {
        let mut bridge = SyncBridge::new();
        let mut surface = ScriptedSurface::default();
        let cfg = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .annotations(hello())
                .key("a"),
        );

        bridge.sync(&cfg, &mut surface).unwrap();
        surface.push_edit(edited());
        assert_eq!(bridge.sync(&cfg, &mut surface).unwrap(), edited());

        // No new interaction keeps the edited set
        assert_eq!(bridge.sync(&cfg, &mut surface).unwrap(), edited());

        // Same key with changed inputs still continues the session
        let relabeled = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .selected_label("ORG")
                .key("a"),
        );
        assert_eq!(bridge.sync(&relabeled, &mut surface).unwrap(), edited());
        assert_eq!(surface.mounted().len(), 1);
    }

    #[test]
    fn test_key_change_resets_session() {
        let mut bridge = SyncBridge::new();
        let mut surface = ScriptedSurface::default();
        let first = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .annotations(hello())
                .key("a"),
        );

        bridge.sync(&first, &mut surface).unwrap();
        surface.push_edit(edited());
        bridge.sync(&first, &mut surface).unwrap();

        let second = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .annotations(hello())
                .key("b"),
        );
        assert_eq!(bridge.sync(&second, &mut surface).unwrap(), hello());
        assert_eq!(bridge.discarded_sessions(), 1);
        assert_eq!(surface.mounted().len(), 2);
    }

    #[test]
    fn test_unkeyed_input_change_resets_session() {
        let mut bridge = SyncBridge::new();
        let mut surface = ScriptedSurface::default();
        let first = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .annotations(hello()),
        );

        bridge.sync(&first, &mut surface).unwrap();
        surface.push_edit(edited());
        assert_eq!(bridge.sync(&first, &mut surface).unwrap(), edited());

        let changed = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .annotations(Vec::new()),
        );
        assert_eq!(bridge.sync(&changed, &mut surface).unwrap(), Vec::new());
        assert!(matches!(
            bridge.phase(),
            SessionPhase::Initialized { edited: false, .. }
        ));
    }

    #[test]
    fn test_keyed_rerender_with_reordered_labels_rejects_stale_colors() {
        let mut bridge = SyncBridge::new();
        let mut surface = ScriptedSurface::default();
        let first = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .annotations(hello())
                .key("a"),
        );
        bridge.sync(&first, &mut surface).unwrap();

        let reordered = config(
            SessionRequest::new("Hello world!")
                .labels(LabelSet::new(["ORG", "PERSON"]).unwrap())
                .key("a"),
        );
        assert_eq!(reordered.palette().color_of("ORG"), Some("red"));

        match bridge.sync(&reordered, &mut surface).unwrap_err() {
            Error::Validation(err) => assert_eq!(
                err,
                ValidationError::ColorMismatch {
                    index: 0,
                    tag: "ORG".to_string(),
                    expected: "red".to_string(),
                    found: "green".to_string()
                }
            ),
            other => panic!("expected a validation error, got {:?}", other),
        }
        assert_eq!(surface.mounted().len(), 1);

        // The original config still sees the kept value
        assert_eq!(bridge.sync(&first, &mut surface).unwrap(), hello());
    }

    #[test]
    fn test_keyed_rerender_with_shorter_text_rejects_kept_spans() {
        let mut bridge = SyncBridge::new();
        let mut surface = ScriptedSurface::default();
        let first = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .annotations(hello())
                .key("a"),
        );
        bridge.sync(&first, &mut surface).unwrap();

        let shorter = config(SessionRequest::new("hi").labels(person_org()).key("a"));
        assert!(matches!(
            bridge.sync(&shorter, &mut surface).unwrap_err(),
            Error::Validation(ValidationError::InvalidSpan {
                start: 0,
                end: 5,
                len: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_stale_color_from_surface() {
        let mut bridge = SyncBridge::new();
        let mut surface = ScriptedSurface::default();
        let cfg = config(
            SessionRequest::new("Hello world!")
                .labels(person_org())
                .annotations(hello())
                .key("a"),
        );

        bridge.sync(&cfg, &mut surface).unwrap();
        surface.push_edit(vec![SpanAnnotation::new(0, 5, "ORG").with_color("red")]);

        let err = bridge.sync(&cfg, &mut surface).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::ColorMismatch { .. })
        ));

        // The rejected set never becomes the session value
        assert_eq!(bridge.sync(&cfg, &mut surface).unwrap(), hello());
    }

    #[test]
    fn test_rejects_out_of_range_span_from_surface() {
        let mut bridge = SyncBridge::new();
        let mut surface = ScriptedSurface::default();
        let cfg = config(SessionRequest::new("hi").labels(LabelSet::single("ORG")));

        bridge.sync(&cfg, &mut surface).unwrap();
        surface.push_edit(vec![SpanAnnotation::new(0, 1000, "ORG")]);

        assert!(matches!(
            bridge.sync(&cfg, &mut surface).unwrap_err(),
            Error::Validation(ValidationError::InvalidSpan { .. })
        ));
    }
}

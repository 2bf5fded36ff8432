//! @ai:module:intent Message-passing boundary to the interactive rendering surface
//! @ai:module:layer infrastructure
//! @ai:module:public_api RenderingSurface, SurfaceResponse, SurfaceRequest, ScriptedSurface, ProcessSurface
//! @ai:module:depends_on session, annotation, error
//! @ai:module:stateless false

use crate::annotation::SpanAnnotation;
use crate::error::{Error, Result};
use crate::session::RenderPayload;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::Write;
use std::process::{Command, Stdio};

/// @ai:intent Response message: a full replacement set, or nothing new yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceResponse {
    NoInteraction,
    Annotations { annotations: Vec<SpanAnnotation> },
}

/// @ai:intent Request envelope written to an external surface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SurfaceRequest {
    Mount { payload: RenderPayload },
    Poll { payload: RenderPayload },
}

/// @ai:intent Trait for the component that displays text and edits highlights
pub trait RenderingSurface {
    /// @ai:intent A new session starts with this payload; nothing is returned yet
    fn mount(&mut self, payload: &RenderPayload) -> Result<()>;

    /// @ai:intent Re-render the current session and collect edits made since the last call
    fn poll(&mut self, payload: &RenderPayload) -> Result<SurfaceResponse>;
}

/// @ai:intent Surface that replays a fixed queue of responses, for tests and offline replay
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    responses: VecDeque<SurfaceResponse>,
    mounted: Vec<RenderPayload>,
}

impl ScriptedSurface {
    /// @ai:intent Create a surface answering successive polls from `responses`
    /// @ai:effects pure
    pub fn new(responses: impl IntoIterator<Item = SurfaceResponse>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            mounted: Vec::new(),
        }
    }

    /// @ai:intent Queue a user edit producing the given annotation set
    pub fn push_edit(&mut self, annotations: Vec<SpanAnnotation>) {
        self.responses
            .push_back(SurfaceResponse::Annotations { annotations });
    }

    /// @ai:intent Payloads of every session mounted so far
    pub fn mounted(&self) -> &[RenderPayload] {
        &self.mounted
    }
}

impl RenderingSurface for ScriptedSurface {
    fn mount(&mut self, payload: &RenderPayload) -> Result<()> {
        self.mounted.push(payload.clone());
        Ok(())
    }

    /// @ai:post returns NoInteraction once the script is exhausted
    fn poll(&mut self, _payload: &RenderPayload) -> Result<SurfaceResponse> {
        Ok(self
            .responses
            .pop_front()
            .unwrap_or(SurfaceResponse::NoInteraction))
    }
}

/// @ai:intent Surface backed by an external command speaking JSON over stdin/stdout
pub struct ProcessSurface {
    program: String,
    args: Vec<String>,
}

impl ProcessSurface {
    /// @ai:intent Create a surface that spawns `program` once per request
    /// @ai:effects pure
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// @ai:intent Send one request envelope and return the raw stdout
    /// @ai:effects process, io
    fn exchange(&self, request: &SurfaceRequest) -> Result<String> {
        let body = serde_json::to_vec(request)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Surface(format!("Failed to start `{}`: {}", self.program, e)))?;

        // stdin is fed concurrently with reading stdout and stderr
        let writer = child.stdin.take().map(|mut stdin| {
            std::thread::spawn(move || stdin.write_all(&body))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| Error::Surface(format!("Failed to read from `{}`: {}", self.program, e)))?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    return Err(Error::Surface(format!(
                        "Failed to send request to `{}`: {}",
                        self.program, e
                    )))
                }
                Err(_) => {
                    return Err(Error::Surface(format!(
                        "Request writer for `{}` panicked",
                        self.program
                    )))
                }
            }
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!("Surface stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            return Err(Error::Surface(format!(
                "`{}` exited with {:?}",
                self.program,
                output.status.code()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl RenderingSurface for ProcessSurface {
    fn mount(&mut self, payload: &RenderPayload) -> Result<()> {
        self.exchange(&SurfaceRequest::Mount {
            payload: payload.clone(),
        })?;
        Ok(())
    }

    fn poll(&mut self, payload: &RenderPayload) -> Result<SurfaceResponse> {
        let stdout = self.exchange(&SurfaceRequest::Poll {
            payload: payload.clone(),
        })?;

        if stdout.trim().is_empty() {
            return Ok(SurfaceResponse::NoInteraction);
        }

        serde_json::from_str(stdout.trim())
            .map_err(|e| Error::Surface(format!("Unparsable surface response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RenderPayload {
        RenderPayload {
            text: "hi".to_string(),
            annotations: Vec::new(),
            labels: vec!["ORG".to_string()],
            colors: vec!["red".to_string()],
            selected_label: "ORG".to_string(),
            show_label_selector: true,
            key: None,
        }
    }

    #[test]
    fn test_response_wire_format() {
        let none: SurfaceResponse = serde_json::from_str(r#"{"kind": "no_interaction"}"#).unwrap();
        assert_eq!(none, SurfaceResponse::NoInteraction);

        let edits: SurfaceResponse = serde_json::from_str(
            r#"{"kind": "annotations", "annotations": [{"start": 0, "end": 2, "tag": "ORG"}]}"#,
        )
        .unwrap();
        assert_eq!(
            edits,
            SurfaceResponse::Annotations {
                annotations: vec![SpanAnnotation::new(0, 2, "ORG")]
            }
        );
    }

    #[test]
    fn test_request_envelope_is_tagged() {
        let json = serde_json::to_value(SurfaceRequest::Mount { payload: payload() }).unwrap();
        assert_eq!(json["event"], "mount");
        assert_eq!(json["payload"]["selected_label"], "ORG");
    }

    #[test]
    fn test_scripted_surface_drains_then_idles() {
        let mut surface = ScriptedSurface::default();
        surface.push_edit(vec![SpanAnnotation::new(0, 2, "ORG")]);

        surface.mount(&payload()).unwrap();
        assert!(matches!(
            surface.poll(&payload()).unwrap(),
            SurfaceResponse::Annotations { .. }
        ));
        assert_eq!(surface.poll(&payload()).unwrap(), SurfaceResponse::NoInteraction);
        assert_eq!(surface.mounted().len(), 1);
    }

    #[test]
    fn test_process_surface_reports_missing_program() {
        let mut surface = ProcessSurface::new("text-highlighter-no-such-surface");
        let err = surface.mount(&payload()).unwrap_err();
        assert!(matches!(err, Error::Surface(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_surface_that_ignores_stdin_is_a_surface_error() {
        let mut large = payload();
        large.text = "x".repeat(256 * 1024);

        let mut surface =
            ProcessSurface::new("sh").with_args(vec!["-c".to_string(), "exit 0".to_string()]);
        let err = surface.mount(&large).unwrap_err();
        assert!(matches!(err, Error::Surface(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_process_surface_reads_response() {
        let mut surface = ProcessSurface::new("sh").with_args(vec![
            "-c".to_string(),
            r#"cat > /dev/null; echo '{"kind":"annotations","annotations":[{"start":0,"end":1,"tag":"ORG"}]}'"#
                .to_string(),
        ]);

        let response = surface.poll(&payload()).unwrap();
        assert_eq!(
            response,
            SurfaceResponse::Annotations {
                annotations: vec![SpanAnnotation::new(0, 1, "ORG")]
            }
        );
    }
}

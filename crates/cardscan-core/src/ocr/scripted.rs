//! Recorded OCR transcripts and a recognizer that replays them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Frame, TextRecognizer};
use crate::error::{OcrError, Result};

/// The OCR output recorded for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Frame identifier.
    pub id: u64,

    /// Recognized lines.
    #[serde(default)]
    pub lines: Vec<String>,

    /// Set when recognition failed on this frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Frames of a recorded scan, in capture order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    frames: Vec<RecordedFrame>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFrame {
    Lines(Vec<String>),
    Recorded {
        id: Option<u64>,
        #[serde(default)]
        lines: Vec<String>,
        error: Option<String>,
    },
}

impl Transcript {
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self { frames }
    }

    /// Parse a JSON transcript.
    ///
    /// Accepts an array of line arrays (`[["a", "b"], ["c"]]`) or an array of
    /// frame objects (`[{"id": 7, "lines": ["a"]}, {"error": "blur"}]`).
    /// Missing ids are numbered from 1 by position.
    pub fn parse_json(content: &str) -> Result<Self> {
        let raw: Vec<RawFrame> = serde_json::from_str(content)?;

        let frames = raw
            .into_iter()
            .enumerate()
            .map(|(index, frame)| {
                let position = index as u64 + 1;
                match frame {
                    RawFrame::Lines(lines) => RecordedFrame {
                        id: position,
                        lines,
                        error: None,
                    },
                    RawFrame::Recorded { id, lines, error } => RecordedFrame {
                        id: id.unwrap_or(position),
                        lines,
                        error,
                    },
                }
            })
            .collect();

        Ok(Self { frames })
    }

    /// Parse a plain-text transcript.
    ///
    /// Frames are separated by blank lines. Lines starting with `#` are
    /// comments, and a line starting with `!` marks the frame as a failed
    /// recognition with the rest of the line as the message.
    pub fn parse_text(content: &str) -> Self {
        let mut frames = Vec::new();
        let mut current = RecordedFrame::default();
        let mut has_content = false;

        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if has_content {
                    current.id = frames.len() as u64 + 1;
                    frames.push(std::mem::take(&mut current));
                    has_content = false;
                }
                continue;
            }

            if trimmed.starts_with('#') {
                continue;
            }

            if let Some(message) = trimmed.strip_prefix('!') {
                current.error = Some(message.trim().to_string());
            } else {
                current.lines.push(trimmed.to_string());
            }
            has_content = true;
        }

        if has_content {
            current.id = frames.len() as u64 + 1;
            frames.push(current);
        }

        Self { frames }
    }

    /// Load a transcript; `.json` files are parsed as JSON, anything else as text.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::parse_json(&content)
        } else {
            Ok(Self::parse_text(&content))
        }
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames ready to submit to a [`ScriptedRecognizer`] session.
    pub fn into_frames(self) -> Vec<Frame<RecordedFrame>> {
        self.frames
            .into_iter()
            .map(|recorded| Frame::new(recorded.id, recorded))
            .collect()
    }
}

/// Replays the recorded lines carried by each frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptedRecognizer;

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl TextRecognizer for ScriptedRecognizer {
    type Payload = RecordedFrame;

    fn recognize(&self, frame: &Frame<RecordedFrame>) -> std::result::Result<Vec<String>, OcrError> {
        match &frame.payload.error {
            Some(message) => Err(OcrError::Recognition(message.clone())),
            None => Ok(frame.payload.lines.clone()),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_json_line_arrays() {
        let transcript = Transcript::parse_json(r#"[["JOHN SMITH", "09/27"], ["4539 1488 0343 6467"]]"#).unwrap();

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.frames()[0].id, 1);
        assert_eq!(transcript.frames()[0].lines, vec!["JOHN SMITH", "09/27"]);
        assert_eq!(transcript.frames()[1].id, 2);
    }

    #[test]
    fn test_parse_json_frame_objects() {
        let transcript = Transcript::parse_json(
            r#"[{"id": 40, "lines": ["JOHN SMITH"]}, {"error": "sensor timeout"}, ["09/27"]]"#,
        )
        .unwrap();

        assert_eq!(
            transcript.frames(),
            &[
                RecordedFrame {
                    id: 40,
                    lines: vec!["JOHN SMITH".to_string()],
                    error: None,
                },
                RecordedFrame {
                    id: 2,
                    lines: Vec::new(),
                    error: Some("sensor timeout".to_string()),
                },
                RecordedFrame {
                    id: 3,
                    lines: vec!["09/27".to_string()],
                    error: None,
                },
            ]
        );
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        assert!(Transcript::parse_json(r#"{"lines": []}"#).is_err());
        assert!(Transcript::parse_json("not json").is_err());
    }

    #[test]
    fn test_parse_text() {
        let content = "# recorded on a test card\nJOHN SMITH\nVALID THRU 09/27\n\n\n! lens covered\n\n4539 1488 0343 6467\n";
        let transcript = Transcript::parse_text(content);

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.frames()[0].lines, vec!["JOHN SMITH", "VALID THRU 09/27"]);
        assert_eq!(transcript.frames()[1].error.as_deref(), Some("lens covered"));
        assert_eq!(transcript.frames()[2].id, 3);
        assert_eq!(transcript.frames()[2].lines, vec!["4539 1488 0343 6467"]);
    }

    #[test]
    fn test_parse_text_empty() {
        assert!(Transcript::parse_text("").is_empty());
        assert!(Transcript::parse_text("# only a comment\n\n").is_empty());
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("scan.json");
        std::fs::write(&json_path, r#"[["JOHN SMITH"]]"#).unwrap();
        assert_eq!(Transcript::from_file(&json_path).unwrap().len(), 1);

        let text_path = dir.path().join("scan.txt");
        std::fs::write(&text_path, "JOHN SMITH\n\n09/27\n").unwrap();
        assert_eq!(Transcript::from_file(&text_path).unwrap().len(), 2);
    }

    #[test]
    fn test_scripted_recognizer() {
        let recognizer = ScriptedRecognizer::new();
        let frames = Transcript::parse_text("JOHN SMITH\n\n! blur\n").into_frames();

        assert_eq!(recognizer.recognize(&frames[0]).unwrap(), vec!["JOHN SMITH"]);
        assert!(matches!(
            recognizer.recognize(&frames[1]),
            Err(OcrError::Recognition(message)) if message == "blur"
        ));
    }
}

// Caption layout
//
// Turns timestamped transcript segments into display-ready cues:
// - wrap: word-boundary line wrapping under a character budget
// - chunker: splits a segment's lines into cues of bounded height and
//   shares the segment's time window between them

pub mod chunker;
pub mod wrap;

use serde::{Deserialize, Serialize};

pub use chunker::CaptionChunker;
pub use wrap::LineWrapper;

use crate::error::{Result, SubburnError};

/// A unit of recognized speech as produced by the transcriber
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new<S: Into<String>>(start: f64, end: f64, text: S) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Segment duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Reject non-finite times and segments that end before they start
    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(SubburnError::MalformedSegment(format!(
                "non-finite time range [{}, {}]",
                self.start, self.end
            )));
        }
        if self.end < self.start {
            return Err(SubburnError::MalformedSegment(format!(
                "end {:.3}s is before start {:.3}s",
                self.end, self.start
            )));
        }
        Ok(())
    }
}

/// A segment as read from transcriber output or a transcript file.
///
/// Any field may be missing; [`RawSegment::to_segment`] turns a complete
/// record into a [`TranscriptSegment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub text: Option<String>,
}

impl RawSegment {
    pub fn to_segment(&self) -> Result<TranscriptSegment> {
        let missing = |field: &str| SubburnError::MalformedSegment(format!("missing {}", field));

        Ok(TranscriptSegment {
            start: self.start.ok_or_else(|| missing("start"))?,
            end: self.end.ok_or_else(|| missing("end"))?,
            text: self.text.as_deref().ok_or_else(|| missing("text"))?.trim().to_string(),
        })
    }
}

impl From<TranscriptSegment> for RawSegment {
    fn from(segment: TranscriptSegment) -> Self {
        Self {
            start: Some(segment.start),
            end: Some(segment.end),
            text: Some(segment.text),
        }
    }
}

/// A single displayed caption; `text` may contain line breaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionCue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl CaptionCue {
    /// Visible lines of this cue
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

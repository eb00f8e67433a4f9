use tracing::{debug, warn};

use crate::config::{CaptionConfig, MalformedPolicy};
use crate::error::{Result, SubburnError};
use super::{CaptionCue, LineWrapper, RawSegment, TranscriptSegment};

/// Converts transcript segments into cues of at most `max_lines` wrapped lines.
///
/// A segment that wraps to more lines than fit on screen is split into
/// consecutive groups of lines, and the segment's time window is shared
/// between the groups in proportion to their line counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionChunker {
    wrapper: LineWrapper,
    max_lines: usize,
}

impl Default for CaptionChunker {
    fn default() -> Self {
        Self {
            wrapper: LineWrapper::default(),
            max_lines: 2,
        }
    }
}

impl CaptionChunker {
    pub fn new(max_chars: usize, max_lines: usize) -> Result<Self> {
        if max_lines == 0 {
            return Err(SubburnError::Config("max_lines must be at least 1".to_string()));
        }
        Ok(Self {
            wrapper: LineWrapper::new(max_chars)?,
            max_lines,
        })
    }

    pub fn from_config(config: &CaptionConfig) -> Result<Self> {
        Self::new(config.max_chars, config.max_lines)
    }

    pub fn max_chars(&self) -> usize {
        self.wrapper.max_chars()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Cues for a single segment. Blank text yields no cues.
    ///
    /// A zero-length segment is valid; every cue it produces has
    /// `start == end`.
    pub fn chunk_segment(&self, segment: &TranscriptSegment) -> Result<Vec<CaptionCue>> {
        segment.validate()?;

        let lines = self.wrapper.wrap(segment.text.trim());
        if lines.len() <= self.max_lines {
            if lines.is_empty() {
                return Ok(Vec::new());
            }
            return Ok(vec![CaptionCue {
                start: segment.start,
                end: segment.end,
                text: lines.join("\n"),
            }]);
        }

        let total = segment.duration();
        let line_count = lines.len() as f64;

        let cues = lines
            .chunks(self.max_lines)
            .enumerate()
            .map(|(group, chunk)| {
                let first = group * self.max_lines;
                let start = segment.start + (first as f64 * total) / line_count;
                // last group ends exactly at the segment end
                let end = if first + self.max_lines >= lines.len() {
                    segment.end
                } else {
                    let end = segment.start + ((first + self.max_lines) as f64 * total) / line_count;
                    end.min(segment.end)
                };

                CaptionCue {
                    start,
                    end,
                    text: chunk.join("\n"),
                }
            })
            .collect::<Vec<_>>();

        debug!(
            "Split {} lines over [{:.3}, {:.3}] into {} cues",
            lines.len(),
            segment.start,
            segment.end,
            cues.len()
        );

        Ok(cues)
    }

    /// Cues for a whole transcript, in segment order.
    ///
    /// A segment with a missing field or an invalid time range is
    /// malformed. With [`MalformedPolicy::Skip`] it is logged and
    /// contributes no cues; with [`MalformedPolicy::Abort`] the first one
    /// fails the call.
    pub fn chunk_segments(
        &self,
        segments: &[RawSegment],
        policy: MalformedPolicy,
    ) -> Result<Vec<CaptionCue>> {
        let mut cues = Vec::with_capacity(segments.len());

        for (index, raw) in segments.iter().enumerate() {
            let result = raw
                .to_segment()
                .and_then(|segment| self.chunk_segment(&segment));

            match result {
                Ok(segment_cues) => cues.extend(segment_cues),
                Err(SubburnError::MalformedSegment(reason)) => match policy {
                    MalformedPolicy::Skip => {
                        warn!("Skipping segment {}: {}", index, reason);
                    }
                    MalformedPolicy::Abort => {
                        return Err(SubburnError::MalformedSegment(format!(
                            "segment {}: {}",
                            index, reason
                        )));
                    }
                },
                Err(e) => return Err(e),
            }
        }

        Ok(cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, end, text)
    }

    fn raw(start: f64, end: f64, text: &str) -> RawSegment {
        seg(start, end, text).into()
    }

    fn no_end(text: &str) -> RawSegment {
        RawSegment {
            start: Some(1.0),
            end: None,
            text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_short_segment_keeps_its_times() {
        let chunker = CaptionChunker::new(20, 2).unwrap();
        let cues = chunker
            .chunk_segment(&seg(1.25, 3.5, "  The quick brown fox jumps over  "))
            .unwrap();

        assert_eq!(
            cues,
            vec![CaptionCue {
                start: 1.25,
                end: 3.5,
                text: "The quick brown fox\njumps over".to_string(),
            }]
        );
    }

    #[test]
    fn test_long_segment_splits_by_line_share() {
        let chunker = CaptionChunker::new(20, 2).unwrap();
        let cues = chunker
            .chunk_segment(&seg(0.0, 4.0, "hello world foo bar baz qux quux corge grault garply"))
            .unwrap();

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].text, "hello world foo bar\nbaz qux quux corge");
        assert_eq!(cues[0].start, 0.0);
        assert_eq!(cues[0].end, (2.0 * 4.0) / 3.0);
        assert_eq!(cues[1].text, "grault garply");
        assert_eq!(cues[1].start, (2.0 * 4.0) / 3.0);
        assert_eq!(cues[1].end, 4.0);
    }

    #[test]
    fn test_group_starts_use_original_segment_start() {
        // five one-word lines, groups of two
        let chunker = CaptionChunker::new(5, 2).unwrap();
        let cues = chunker
            .chunk_segment(&seg(10.0, 15.0, "aaaa bbbb cccc dddd eeee"))
            .unwrap();

        let times: Vec<(f64, f64)> = cues.iter().map(|c| (c.start, c.end)).collect();
        assert_eq!(times, vec![(10.0, 12.0), (12.0, 14.0), (14.0, 15.0)]);
        assert_eq!(cues[2].text, "eeee");
    }

    #[test]
    fn test_single_line_cues() {
        let chunker = CaptionChunker::new(5, 1).unwrap();
        let cues = chunker.chunk_segment(&seg(0.0, 3.0, "one two six")).unwrap();
        let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "six"]);
        assert_eq!(cues[2].end, 3.0);
    }

    #[test]
    fn test_empty_text_yields_no_cues() {
        let chunker = CaptionChunker::default();
        assert!(chunker.chunk_segment(&seg(0.0, 1.0, "")).unwrap().is_empty());
        assert!(chunker.chunk_segment(&seg(0.0, 1.0, "   ")).unwrap().is_empty());
    }

    #[test]
    fn test_reversed_segment_is_malformed() {
        let chunker = CaptionChunker::default();
        let err = chunker.chunk_segment(&seg(2.0, 1.0, "x")).unwrap_err();
        assert!(matches!(err, SubburnError::MalformedSegment(_)));
    }

    #[test]
    fn test_skip_policy_drops_only_bad_segment() {
        let chunker = CaptionChunker::default();
        let segments = vec![raw(0.0, 1.0, "first"), raw(2.0, 1.0, "bad"), raw(3.0, 4.0, "third")];

        let cues = chunker.chunk_segments(&segments, MalformedPolicy::Skip).unwrap();
        let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "third"]);
    }

    #[test]
    fn test_abort_policy_reports_segment_index() {
        let chunker = CaptionChunker::default();
        let segments = vec![raw(0.0, 1.0, "first"), raw(2.0, 1.0, "bad")];

        match chunker.chunk_segments(&segments, MalformedPolicy::Abort) {
            Err(SubburnError::MalformedSegment(reason)) => assert!(reason.starts_with("segment 1")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_skip_policy_drops_segment_with_missing_field() {
        let chunker = CaptionChunker::default();
        let segments = vec![raw(0.0, 1.0, "ok"), no_end("lost"), raw(2.0, 3.0, "fine")];

        let cues = chunker.chunk_segments(&segments, MalformedPolicy::Skip).unwrap();
        let texts: Vec<&str> = cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["ok", "fine"]);
    }

    #[test]
    fn test_abort_policy_reports_missing_field() {
        let chunker = CaptionChunker::default();
        let segments = vec![raw(0.0, 1.0, "ok"), raw(1.0, 2.0, "still ok"), no_end("lost")];

        match chunker.chunk_segments(&segments, MalformedPolicy::Abort) {
            Err(SubburnError::MalformedSegment(reason)) => assert_eq!(reason, "segment 2: missing end"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_zero_length_segment_split_into_instant_cues() {
        let chunker = CaptionChunker::new(5, 1).unwrap();
        let cues = chunker.chunk_segment(&seg(7.5, 7.5, "one two six")).unwrap();

        assert_eq!(cues.len(), 3);
        for cue in &cues {
            assert_eq!(cue.start, 7.5);
            assert_eq!(cue.end, 7.5);
        }
    }

    #[test]
    fn test_zero_lines_rejected() {
        assert!(CaptionChunker::new(60, 0).is_err());
    }
}

use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use log::{debug, trace};

// @module: Time-tagged transcript parsing and lookup

/// Seconds subtracted from every parsed timestamp so a line is marked active
/// slightly before its nominal cue.
pub const LEAD_IN_OFFSET_SECS: f64 = 0.5;

// @const: Leading [MM:SS.mmm] tag followed by the line text
static TIMESTAMP_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([0-9]{2}):([0-9]{2})\.([0-9]{3})\](.*)$").expect("valid timestamp tag regex")
});

// @const: Separator between primary text and translation
const TEXT_SEPARATOR: char = '|';

// @struct: Single transcript line
#[derive(Debug, Clone, PartialEq)]
pub struct TimedLine {
    // @field: Activation time in seconds (lead-in already applied)
    pub time: f64,

    // @field: Primary (source language) text
    pub primary_text: String,

    // @field: Translation, if the line carried one
    pub secondary_text: Option<String>,

    // @field: Text after the tag exactly as written, trimmed. Lines built
    // with `new` have no source text and join the parts as `primary|secondary`.
    pub full_text: String,
}

impl TimedLine {
    /// Creates a line from already shifted time and split text.
    /// `full_text` becomes `primary|secondary` with no spaces around `|`.
    pub fn new(time: f64, primary_text: impl Into<String>, secondary_text: Option<String>) -> Self {
        let primary_text = primary_text.into();
        let full_text = match &secondary_text {
            Some(secondary) => format!("{}{}{}", primary_text, TEXT_SEPARATOR, secondary),
            None => primary_text.clone(),
        };

        TimedLine {
            time,
            primary_text,
            secondary_text,
            full_text,
        }
    }

    /// Parse one physical line; `None` when it does not carry a leading tag
    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = TIMESTAMP_TAG_REGEX.captures(line)?;

        let minutes: u32 = caps.get(1)?.as_str().parse().ok()?;
        let seconds: u32 = caps.get(2)?.as_str().parse().ok()?;
        let millis: u32 = caps.get(3)?.as_str().parse().ok()?;
        let time = Self::tag_to_seconds(minutes, seconds, millis) - LEAD_IN_OFFSET_SECS;

        let full_text = caps.get(4).map_or("", |m| m.as_str()).trim().to_string();
        let (primary, secondary) = match full_text.split_once(TEXT_SEPARATOR) {
            Some((primary, secondary)) => (primary.trim(), Some(secondary.trim())),
            None => (full_text.as_str(), None),
        };

        Some(TimedLine {
            time,
            primary_text: primary.to_string(),
            secondary_text: secondary.filter(|s| !s.is_empty()).map(str::to_string),
            full_text: full_text.clone(),
        })
    }

    /// Convert tag components to seconds without the lead-in
    pub fn tag_to_seconds(minutes: u32, seconds: u32, millis: u32) -> f64 {
        f64::from(minutes) * 60.0 + f64::from(seconds) + f64::from(millis) / 1000.0
    }

    /// Whether the line carries a translation
    pub fn has_translation(&self) -> bool {
        self.secondary_text.is_some()
    }
}

impl fmt::Display for TimedLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", format_clock(self.time), self.primary_text)?;
        if let Some(secondary) = &self.secondary_text {
            write!(f, " | {}", secondary)?;
        }
        Ok(())
    }
}

/// Immutable, time-ordered list of transcript lines.
///
/// A sequence is never edited in place; loading another unit replaces it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranscriptSequence {
    lines: Vec<TimedLine>,
}

impl TranscriptSequence {
    /// Build a sequence from arbitrary lines, sorting them by time.
    /// Lines with equal times keep their relative order.
    pub fn from_lines(mut lines: Vec<TimedLine>) -> Self {
        lines.sort_by(|a, b| a.time.total_cmp(&b.time));
        TranscriptSequence { lines }
    }

    /// Empty sequence
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimedLine> {
        self.lines.get(index)
    }

    pub fn lines(&self) -> &[TimedLine] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimedLine> {
        self.lines.iter()
    }

    /// Index of the line active at `position`: the greatest index whose time
    /// is not after `position`. `None` before the first line or for NaN.
    pub fn active_index_at(&self, position: f64) -> Option<usize> {
        self.lines.iter().rposition(|line| line.time <= position)
    }
}

impl<'a> IntoIterator for &'a TranscriptSequence {
    type Item = &'a TimedLine;
    type IntoIter = std::slice::Iter<'a, TimedLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Parse raw time-tagged transcript text.
///
/// Never fails. Lines without a leading `[MM:SS.mmm]` tag are skipped, and
/// text with no tagged lines yields an empty sequence.
pub fn parse(raw: &str) -> TranscriptSequence {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut lines = Vec::new();
    let mut skipped = 0usize;

    for (line_num, line) in raw.lines().enumerate() {
        match TimedLine::parse_line(line) {
            Some(timed) => lines.push(timed),
            None => {
                if !line.trim().is_empty() {
                    skipped += 1;
                    trace!("Skipping untagged transcript line {}: {}", line_num + 1, line);
                }
            }
        }
    }

    debug!("Parsed {} transcript lines ({} skipped)", lines.len(), skipped);

    TranscriptSequence::from_lines(lines)
}

/// Format seconds as `m:ss` for display. Non-finite and negative values show as `0:00`.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

use std::fmt;
use once_cell::sync::Lazy;
use regex::Regex;
use log::debug;

// @module: SRT parsing, serialization, and transcript conversion

// @const: Blank-line block separator (one or more blank lines)
static BLOCK_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// A single subtitle entry.
///
/// The timeline is kept as an opaque string and written back verbatim; only
/// the occurrence order of entries is authoritative, index values are not
/// required to be contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number from the source file
    pub index: u32,

    // @field: Time range line, preserved verbatim
    pub timeline: String,

    // @field: Subtitle text, possibly multi-line
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(index: u32, timeline: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleEntry {
            index,
            timeline: timeline.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{}", self.timeline)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// A timed span of transcribed speech, times relative to the whole source
#[derive(Debug, Clone)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start_secs: f64,
    /// End time in seconds
    pub end_secs: f64,
    /// Transcribed text
    pub text: String,
}

/// Parse SRT content into subtitle entries.
///
/// Blocks are separated by one or more blank lines. A block is valid only if
/// it has at least three lines, the first parses as an integer index, and the
/// second contains the `-->` time-range marker. Invalid blocks are skipped
/// silently; this is a filtering policy, not an error. An empty result means
/// the caller found no subtitles.
pub fn parse_srt(content: &str) -> Vec<SubtitleEntry> {
    let mut entries = Vec::new();

    for block in BLOCK_SEPARATOR.split(content.trim()) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 3 {
            debug!("Skipping short subtitle block: {:?}", lines.first());
            continue;
        }

        let index = match lines[0].trim().parse::<u32>() {
            Ok(index) => index,
            Err(_) => {
                debug!("Skipping block with non-numeric index: {}", lines[0]);
                continue;
            }
        };

        let timeline = lines[1].trim();
        if !timeline.contains("-->") {
            debug!("Skipping block {} without time-range marker", index);
            continue;
        }

        entries.push(SubtitleEntry {
            index,
            timeline: timeline.to_string(),
            text: lines[2..].join("\n"),
        });
    }

    entries
}

/// Serialize entries back to SRT text, ordered as given
pub fn generate_srt(entries: &[SubtitleEntry]) -> String {
    let mut output = String::new();
    for entry in entries {
        output.push_str(&entry.to_string());
    }
    output
}

/// Format a time in seconds as an SRT timestamp (HH:MM:SS,mmm)
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Convert transcript segments to subtitle entries with a fresh 1-based numbering
pub fn segments_to_entries(segments: &[TranscriptSegment]) -> Vec<SubtitleEntry> {
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| SubtitleEntry {
            index: (i + 1) as u32,
            timeline: format!(
                "{} --> {}",
                format_timestamp(segment.start_secs),
                format_timestamp(segment.end_secs)
            ),
            text: segment.text.clone(),
        })
        .collect()
}

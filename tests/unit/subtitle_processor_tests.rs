/*!
 * Tests for SRT parsing, serialization, and transcript conversion
 */

use subsmith::subtitle_processor::{
    format_timestamp, generate_srt, parse_srt, segments_to_entries, SubtitleEntry,
    TranscriptSegment,
};

/// Test basic parsing of a well-formed file
#[test]
fn test_parse_srt_withValidContent_shouldReturnAllEntries() {
    let content = "1\n00:00:01,000 --> 00:00:04,000\nFirst line.\n\n\
                   2\n00:00:05,000 --> 00:00:09,000\nSecond line.\n";
    let entries = parse_srt(content);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].index, 1);
    assert_eq!(entries[0].timeline, "00:00:01,000 --> 00:00:04,000");
    assert_eq!(entries[0].text, "First line.");
    assert_eq!(entries[1].index, 2);
    assert_eq!(entries[1].text, "Second line.");
}

/// Multi-line text is joined with a newline
#[test]
fn test_parse_srt_withMultilineText_shouldJoinLines() {
    let content = "7\n00:00:01,000 --> 00:00:04,000\nTop line\nBottom line\n";
    let entries = parse_srt(content);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Top line\nBottom line");
}

/// Blocks with fewer than three lines are skipped silently
#[test]
fn test_parse_srt_withShortBlock_shouldSkipIt() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n\n\
                   2\n00:00:03,000 --> 00:00:04,000\nValid text\n";
    let entries = parse_srt(content);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].index, 2);
}

/// A non-integer first line invalidates the block, not the file
#[test]
fn test_parse_srt_withNonNumericIndex_shouldSkipBlock() {
    let content = "one\n00:00:01,000 --> 00:00:02,000\nBad block\n\n\
                   2\n00:00:03,000 --> 00:00:04,000\nGood block\n";
    let entries = parse_srt(content);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Good block");
}

/// A second line without the time-range marker invalidates the block
#[test]
fn test_parse_srt_withMissingArrow_shouldSkipBlock() {
    let content = "1\nnot a timeline\nText\n\n\
                   2\n00:00:03,000 --> 00:00:04,000\nKept\n";
    let entries = parse_srt(content);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].index, 2);
}

/// Index values need not be contiguous; occurrence order wins
#[test]
fn test_parse_srt_withNonContiguousIndices_shouldPreserveOrder() {
    let content = "10\n00:00:01,000 --> 00:00:02,000\nTen\n\n\
                   3\n00:00:03,000 --> 00:00:04,000\nThree\n";
    let entries = parse_srt(content);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].index, 10);
    assert_eq!(entries[1].index, 3);
}

/// Entirely invalid content yields an empty result, not an error
#[test]
fn test_parse_srt_withGarbage_shouldReturnEmpty() {
    assert!(parse_srt("just some prose\nwith no structure").is_empty());
    assert!(parse_srt("").is_empty());
}

/// Multiple blank lines between blocks are a single separator
#[test]
fn test_parse_srt_withExtraBlankLines_shouldStillSplit() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nA\n\n\n\n\
                   2\n00:00:03,000 --> 00:00:04,000\nB\n";
    let entries = parse_srt(content);
    assert_eq!(entries.len(), 2);
}

/// Parse then serialize preserves index, timeline, and text
#[test]
fn test_srt_roundtrip_withValidEntries_shouldPreserveContent() {
    let content = "1\n00:00:01,000 --> 00:00:04,000\nHello\nWorld\n\n\
                   5\n00:00:05,500 --> 00:00:09,250\nAgain\n\n";
    let entries = parse_srt(content);
    let regenerated = generate_srt(&entries);
    let reparsed = parse_srt(&regenerated);

    assert_eq!(entries, reparsed);
}

/// Serialization writes index, timeline, text, blank line
#[test]
fn test_generate_srt_withSingleEntry_shouldFormatBlock() {
    let entry = SubtitleEntry::new(3, "00:01:00,000 --> 00:01:02,000", "Hi");
    let output = generate_srt(&[entry]);

    assert_eq!(output, "3\n00:01:00,000 --> 00:01:02,000\nHi\n\n");
}

/// Timestamp formatting covers hours, minutes, and milliseconds
#[test]
fn test_format_timestamp_withVariousDurations_shouldFormatCorrectly() {
    assert_eq!(format_timestamp(0.0), "00:00:00,000");
    assert_eq!(format_timestamp(1.5), "00:00:01,500");
    assert_eq!(format_timestamp(61.25), "00:01:01,250");
    assert_eq!(format_timestamp(3661.007), "01:01:01,007");
}

/// Transcript segments become renumbered entries with synthesized timelines
#[test]
fn test_segments_to_entries_withOffsets_shouldRenumberFromOne() {
    let segments = vec![
        TranscriptSegment {
            start_secs: 180.0,
            end_secs: 183.5,
            text: "Later speech".to_string(),
        },
        TranscriptSegment {
            start_secs: 184.0,
            end_secs: 186.0,
            text: "More speech".to_string(),
        },
    ];

    let entries = segments_to_entries(&segments);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].index, 1);
    assert_eq!(entries[0].timeline, "00:03:00,000 --> 00:03:03,500");
    assert_eq!(entries[1].index, 2);
    assert_eq!(entries[1].text, "More speech");
}

/// Empty input produces empty output
#[test]
fn test_segments_to_entries_withNoSegments_shouldReturnEmpty() {
    assert!(segments_to_entries(&[]).is_empty());
}

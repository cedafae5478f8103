/*!
 * Tests for SRT to ASS conversion through the public API
 */

use subsmith::ass_converter::AssConverter;

use crate::common;

const STYLE_SHEET: &str = r#"{
    "styles": {
        "classic": {
            "name": "Classic",
            "fontname": "Arial",
            "fontsize": 22
        },
        "neon": {
            "name": "NeonGlow",
            "primary_colour": "&H0000FFFF",
            "bold": true,
            "effect": "glow"
        }
    }
}"#;

fn converter_from_sheet() -> AssConverter {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "styles.json", STYLE_SHEET).unwrap();
    AssConverter::from_file(&path).unwrap()
}

/// Style keys are listed sorted
#[test]
fn test_style_keys_withTwoStyles_shouldListSorted() {
    let converter = converter_from_sheet();
    assert_eq!(converter.style_keys(), vec!["classic", "neon"]);
}

/// An invalid style sheet is a load error
#[test]
fn test_from_file_withBrokenJson_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "styles.json", "{ nope").unwrap();
    assert!(AssConverter::from_file(&path).is_err());
}

/// Conversion writes one file per style with the style's header line
#[test]
fn test_srt_to_ass_withTwoStyles_shouldWriteStyledFiles() {
    let converter = converter_from_sheet();
    let temp_dir = common::create_temp_dir().unwrap();
    let srt_path = common::create_test_subtitle(temp_dir.path(), "movie.srt").unwrap();

    let written = converter
        .srt_to_ass(
            &["classic".to_string(), "neon".to_string()],
            srt_path.as_path(),
            temp_dir.path(),
        )
        .unwrap();

    assert_eq!(written.len(), 2);

    let classic = std::fs::read_to_string(&written[0]).unwrap();
    assert!(classic.contains("[Script Info]"));
    assert!(classic.contains("Style: Classic,Arial,22,"));
    assert!(classic.contains("Dialogue: 0,0:00:01.00,0:00:04.00,Classic,"));
    assert!(classic.contains("This is a test subtitle."));

    let neon = std::fs::read_to_string(&written[1]).unwrap();
    assert!(neon.contains("Style: NeonGlow,"));
    // Bold flag is -1 in ASS
    assert!(neon.contains(",-1,0,0,0,"));
    assert!(neon.contains("{\\blur2\\be1}"));
}

/// Selecting no styles is a caller error
#[test]
fn test_srt_to_ass_withEmptySelection_shouldFail() {
    let converter = converter_from_sheet();
    let temp_dir = common::create_temp_dir().unwrap();
    let srt_path = common::create_test_subtitle(temp_dir.path(), "movie.srt").unwrap();

    let err = converter
        .srt_to_ass(&[], srt_path.as_path(), temp_dir.path())
        .unwrap_err();
    assert!(err.to_string().contains("At least one style"));
}

/// An SRT file with no valid entries is rejected
#[test]
fn test_srt_to_ass_withEmptySrt_shouldFail() {
    let converter = converter_from_sheet();
    let temp_dir = common::create_temp_dir().unwrap();
    let srt_path = common::create_test_file(temp_dir.path(), "empty.srt", "no entries here").unwrap();

    let err = converter
        .srt_to_ass(&["classic".to_string()], srt_path.as_path(), temp_dir.path())
        .unwrap_err();
    assert!(err.to_string().contains("No valid subtitle entries"));
}

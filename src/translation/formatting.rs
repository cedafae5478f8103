/*!
 * Display-text assembly for translated subtitle entries.
 */

use crate::app_config::TranslationMode;

/// Combine a translation with its source text into the text block that will
/// be written into the subtitle entry.
///
/// In bilingual mode a multi-line translation already carries both language
/// lines and passes through untouched; a single-line translation gets the
/// original stacked underneath so neither language is lost. Target-only modes
/// always use the translation verbatim.
pub fn format_display_text(translated: &str, original: &str, mode: TranslationMode) -> String {
    match mode {
        TranslationMode::Bilingual => {
            if translated.lines().count() > 1 {
                translated.to_string()
            } else {
                format!("{}\n{}", translated, original)
            }
        }
        TranslationMode::English | TranslationMode::Chinese => translated.to_string(),
    }
}

/// Apply [`format_display_text`] pairwise over a batch.
///
/// Callers guarantee the two slices are the same length; any trailing excess
/// on either side is ignored.
pub fn format_display_texts(
    translated: &[String],
    originals: &[String],
    mode: TranslationMode,
) -> Vec<String> {
    translated
        .iter()
        .zip(originals.iter())
        .map(|(t, o)| format_display_text(t, o, mode))
        .collect()
}

/*!
 * SRT to styled ASS conversion.
 *
 * Styles live in a JSON style sheet; each selected style produces its own
 * .ass file so viewers can pick one. An optional per-style effect wraps every
 * dialogue line in ASS override tags.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;
use crate::subtitle_processor::{self, SubtitleEntry};

// @const: Start/end timestamps inside an SRT timeline line
static TIMELINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})").unwrap()
});

/// Animated override tags applied per dialogue line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleEffect {
    /// No override tags
    #[default]
    None,
    /// Soft blur glow
    Glow,
    /// Cycling colour transform
    RainbowCycle,
    /// Scale-up bounce on entry
    Bounce,
    /// Alpha flicker
    Flicker,
}

impl StyleEffect {
    /// Wrap a dialogue text in the effect's override tags
    fn apply(&self, text: &str) -> String {
        match self {
            StyleEffect::None => text.to_string(),
            StyleEffect::Glow => format!("{{\\blur2\\be1}}{}", text),
            StyleEffect::RainbowCycle => format!(
                "{{\\t(0,1000,\\c&H0080FF&)\\t(1000,2000,\\c&HFF8000&)\\t(2000,3000,\\c&H8000FF&)}}{}",
                text
            ),
            StyleEffect::Bounce => format!(
                "{{\\t(0,200,\\fscx120\\fscy120)\\t(200,400,\\fscx100\\fscy100)}}{}",
                text
            ),
            StyleEffect::Flicker => format!(
                "{{\\t(0,500,\\alpha&H00&)\\t(500,1000,\\alpha&H80&)\\t(1000,1500,\\alpha&H00&)}}{}",
                text
            ),
        }
    }
}

/// One entry in the [V4+ Styles] section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssStyle {
    /// Style name written into the ASS file
    #[serde(default = "default_style_name")]
    pub name: String,
    #[serde(default = "default_fontname")]
    pub fontname: String,
    #[serde(default = "default_fontsize")]
    pub fontsize: u32,
    #[serde(default = "default_primary_colour")]
    pub primary_colour: String,
    #[serde(default = "default_secondary_colour")]
    pub secondary_colour: String,
    #[serde(default = "default_outline_colour")]
    pub outline_colour: String,
    #[serde(default = "default_back_colour")]
    pub back_colour: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikeout: bool,
    #[serde(default = "default_scale")]
    pub scale_x: u32,
    #[serde(default = "default_scale")]
    pub scale_y: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub angle: i32,
    #[serde(default = "default_border_style")]
    pub border_style: u32,
    #[serde(default = "default_outline")]
    pub outline: u32,
    #[serde(default = "default_outline")]
    pub shadow: u32,
    #[serde(default = "default_alignment")]
    pub alignment: u32,
    #[serde(default = "default_margin")]
    pub margin_l: u32,
    #[serde(default = "default_margin")]
    pub margin_r: u32,
    #[serde(default = "default_margin")]
    pub margin_v: u32,
    #[serde(default = "default_encoding")]
    pub encoding: u32,
    /// Optional per-line animation
    #[serde(default)]
    pub effect: StyleEffect,
}

fn default_style_name() -> String {
    "Default".to_string()
}

fn default_fontname() -> String {
    "Microsoft YaHei".to_string()
}

fn default_fontsize() -> u32 {
    20
}

fn default_primary_colour() -> String {
    "&H00FFFFFF".to_string()
}

fn default_secondary_colour() -> String {
    "&H000000FF".to_string()
}

fn default_outline_colour() -> String {
    "&H00000000".to_string()
}

fn default_back_colour() -> String {
    "&H80000000".to_string()
}

fn default_scale() -> u32 {
    100
}

fn default_border_style() -> u32 {
    1
}

fn default_outline() -> u32 {
    2
}

fn default_alignment() -> u32 {
    2
}

fn default_margin() -> u32 {
    10
}

fn default_encoding() -> u32 {
    1
}

impl AssStyle {
    /// ASS booleans are -1 for true
    fn format_line(&self) -> String {
        let flag = |b: bool| if b { -1 } else { 0 };
        format!(
            "Style: {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            self.name,
            self.fontname,
            self.fontsize,
            self.primary_colour,
            self.secondary_colour,
            self.outline_colour,
            self.back_colour,
            flag(self.bold),
            flag(self.italic),
            flag(self.underline),
            flag(self.strikeout),
            self.scale_x,
            self.scale_y,
            self.spacing,
            self.angle,
            self.border_style,
            self.outline,
            self.shadow,
            self.alignment,
            self.margin_l,
            self.margin_r,
            self.margin_v,
            self.encoding,
        )
    }
}

/// The style sheet loaded from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssConfig {
    /// Keyed by the user-facing style key, as selected on the command line
    #[serde(default)]
    pub styles: HashMap<String, AssStyle>,
}

/// SRT to ASS converter bound to one style sheet
#[derive(Debug, Clone)]
pub struct AssConverter {
    config: AssConfig,
}

impl AssConverter {
    pub fn new(config: AssConfig) -> Self {
        Self { config }
    }

    /// Load the style sheet from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read style sheet: {}", path.display()))?;
        let config: AssConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid style sheet JSON: {}", path.display()))?;
        Ok(Self::new(config))
    }

    /// Keys selectable on the command line
    pub fn style_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.config.styles.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Convert an SRT file into one ASS file per selected style.
    ///
    /// Returns the written paths, named `{stem}_{style_key}.ass` under
    /// `output_dir`.
    pub fn srt_to_ass<P: AsRef<Path>>(
        &self,
        style_keys: &[String],
        srt_path: P,
        output_dir: P,
    ) -> Result<Vec<PathBuf>> {
        let srt_path = srt_path.as_ref();
        let output_dir = output_dir.as_ref();

        if style_keys.is_empty() {
            return Err(SubtitleError::EmptyStyleList.into());
        }
        for key in style_keys {
            if !self.config.styles.contains_key(key) {
                return Err(SubtitleError::UnknownStyle {
                    name: key.clone(),
                    available: self.style_keys().join(", "),
                }
                .into());
            }
        }

        if !srt_path.exists() {
            return Err(SubtitleError::FileNotFound(srt_path.display().to_string()).into());
        }
        let content = std::fs::read_to_string(srt_path)
            .with_context(|| format!("Failed to read {}", srt_path.display()))?;
        let entries = subtitle_processor::parse_srt(&content);
        if entries.is_empty() {
            return Err(SubtitleError::NoEntries(srt_path.display().to_string()).into());
        }

        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let stem = srt_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "subtitles".to_string());

        let mut written = Vec::with_capacity(style_keys.len());
        for key in style_keys {
            let style = &self.config.styles[key];
            let ass_content = render_ass(style, &entries);

            let output_path = output_dir.join(format!("{}_{}.ass", stem, key));
            std::fs::write(&output_path, ass_content)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            debug!("Wrote {} with style '{}'", output_path.display(), key);
            written.push(output_path);
        }

        info!("Generated {} ASS file(s) from {}", written.len(), srt_path.display());
        Ok(written)
    }
}

/// Render a complete single-style ASS document
fn render_ass(style: &AssStyle, entries: &[SubtitleEntry]) -> String {
    let mut out = String::new();
    out.push_str("[Script Info]\n");
    out.push_str("Title: Converted from SRT\n");
    out.push_str("ScriptType: v4.00+\n");
    out.push_str("WrapStyle: 0\n");
    out.push_str("ScaledBorderAndShadow: yes\n");
    out.push_str("YCbCr Matrix: TV.709\n");
    out.push_str("PlayResX: 1920\n");
    out.push_str("PlayResY: 1080\n\n");

    out.push_str("[V4+ Styles]\n");
    out.push_str(
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
         BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
         BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
    );
    out.push_str(&style.format_line());
    out.push('\n');

    out.push_str("\n[Events]\n");
    out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");

    for entry in entries {
        let Some((start, end)) = split_timeline(&entry.timeline) else {
            debug!("Entry {} has an unparseable timeline, skipping", entry.index);
            continue;
        };

        // ASS line breaks are literal \N
        let text = style.effect.apply(&entry.text.replace('\n', "\\N"));
        out.push_str(&format!(
            "Dialogue: 0,{},{},{},,0,0,0,,{}\n",
            srt_time_to_ass(start),
            srt_time_to_ass(end),
            style.name,
            text
        ));
    }

    out
}

/// Pull the start and end timestamps out of an SRT timeline line
fn split_timeline(timeline: &str) -> Option<(&str, &str)> {
    let caps = TIMELINE.captures(timeline)?;
    Some((
        caps.get(1).map(|m| m.as_str())?,
        caps.get(2).map(|m| m.as_str())?,
    ))
}

/// `00:00:01,500` → `0:00:01.50` (no leading hour zero, centisecond precision)
fn srt_time_to_ass(srt_time: &str) -> String {
    let normalized = srt_time.replace(',', ".");
    let mut parts = normalized.splitn(3, ':');
    let (Some(hours), Some(minutes), Some(sec_ms)) = (parts.next(), parts.next(), parts.next())
    else {
        return normalized;
    };

    let hours = hours.trim_start_matches('0');
    let hours = if hours.is_empty() { "0" } else { hours };

    match sec_ms.split_once('.') {
        Some((sec, ms)) => {
            let cs = &ms[..ms.len().min(2)];
            format!("{}:{}:{}.{}", hours, minutes, sec, cs)
        }
        None => format!("{}:{}:{}.00", hours, minutes, sec_ms),
    }
}

/*!
 * Pipeline orchestration.
 *
 * The controller wires configuration, the API client, the batch translator,
 * and the external media tools into the user-facing operations: translating
 * an existing SRT file, generating subtitles for a video from its embedded
 * track or its audio, embedding finished subtitles, and walking a directory.
 */

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::app_config::{Config, TranslationMode};
use crate::errors::SubtitleError;
use crate::media_tools::{self, SubtitleFile};
use crate::providers::openai::OpenAi;
use crate::subtitle_processor::{self, SubtitleEntry, TranscriptSegment};
use crate::translation::formatting;
use crate::translation::{TranslationRules, Translator};

/// Where subtitle content for a video comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubtitleSource {
    /// Prefer an embedded text track, fall back to audio transcription
    #[default]
    Auto,
    /// Only use an embedded text track; fail when none exists
    Embedded,
    /// Always transcribe the audio
    Audio,
}

impl FromStr for SubtitleSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "embedded" => Ok(Self::Embedded),
            "audio" => Ok(Self::Audio),
            _ => Err(anyhow!("Invalid subtitle source: {}", s)),
        }
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: API client, also used directly for transcription
    client: Arc<OpenAi>,

    // @field: Batch translator built over the client
    translator: Translator,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let client = Arc::new(OpenAi::new_with_timeout(
            config.provider.api_key.clone(),
            config.provider.endpoint.clone(),
            config.provider.timeout_secs,
        ));
        let translator = Translator::new(
            client.clone(),
            TranslationRules::default(),
            config.provider.text_model.clone(),
            config.batch.clone(),
        );

        Ok(Self {
            config,
            client,
            translator,
        })
    }

    /// Translate one SRT file and write `{stem}.{mode}.srt` to the output
    /// directory. Returns the written path.
    pub async fn translate_srt_file(&self, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        if !input.exists() {
            return Err(SubtitleError::FileNotFound(input.display().to_string()).into());
        }

        let content = std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        let entries = subtitle_processor::parse_srt(&content);
        if entries.is_empty() {
            return Err(SubtitleError::NoEntries(input.display().to_string()).into());
        }
        info!("Parsed {} subtitle entries from {}", entries.len(), input.display());

        let translated = self.translate_entries(entries).await;

        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        let output_path = output_dir.join(self.output_filename(input));
        std::fs::write(&output_path, subtitle_processor::generate_srt(&translated))
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        info!("Wrote {}", output_path.display());
        info!("{}", self.translator.usage().summary());
        Ok(output_path)
    }

    /// Generate translated subtitles for a video.
    ///
    /// Depending on the source mode this extracts an embedded text track or
    /// slices the audio, transcribes chunk by chunk, and translates. Returns
    /// the written SRT path.
    pub async fn generate_subtitles(
        &self,
        video: &Path,
        source: SubtitleSource,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        if !video.exists() {
            return Err(SubtitleError::FileNotFound(video.display().to_string()).into());
        }
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let media = media_tools::probe_media(video).await?;
        let text_stream = media
            .subtitle_streams
            .iter()
            .find(|s| !s.is_bitmap())
            .cloned();

        match source {
            SubtitleSource::Embedded => {
                let stream = text_stream.ok_or_else(|| {
                    anyhow!("No embedded text subtitle stream in {}", video.display())
                })?;
                self.translate_embedded(video, stream.index, output_dir).await
            }
            SubtitleSource::Auto => {
                if let Some(stream) = text_stream {
                    info!(
                        "Using embedded subtitle stream {} ({})",
                        stream.index, stream.codec_name
                    );
                    match self.translate_embedded(video, stream.index, output_dir).await {
                        Ok(path) => return Ok(path),
                        Err(e) => {
                            warn!("Embedded subtitle path failed ({}), falling back to audio", e);
                        }
                    }
                } else {
                    info!("No embedded text subtitle stream, transcribing audio");
                }
                self.translate_from_audio(video, media.duration_secs, output_dir)
                    .await
            }
            SubtitleSource::Audio => {
                self.translate_from_audio(video, media.duration_secs, output_dir)
                    .await
            }
        }
    }

    /// Embed subtitle files into a copy of the video
    pub async fn embed(
        &self,
        video: &Path,
        subtitles: &[SubtitleFile],
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let output = media_tools::embed_subtitles(video, subtitles, output_dir).await?;
        info!("Wrote {}", output.display());
        Ok(output)
    }

    /// Translate every .srt file found under a directory
    pub async fn translate_directory(&self, input_dir: &Path, output_dir: &Path) -> Result<usize> {
        let srt_files: Vec<PathBuf> = WalkDir::new(input_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext.to_string_lossy().to_lowercase() == "srt")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();

        if srt_files.is_empty() {
            warn!("No .srt files found under {}", input_dir.display());
            return Ok(0);
        }
        info!("Found {} subtitle file(s)", srt_files.len());

        let mut done = 0;
        for file in &srt_files {
            match self.translate_srt_file(file, output_dir).await {
                Ok(_) => done += 1,
                Err(e) => warn!("Skipping {}: {}", file.display(), e),
            }
        }

        info!("Translated {}/{} file(s)", done, srt_files.len());
        Ok(done)
    }

    /// Extract an embedded track, then run the SRT path on it
    async fn translate_embedded(
        &self,
        video: &Path,
        stream_index: usize,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let stem = file_stem(video);
        let extracted = output_dir.join(format!("{}_extracted.srt", stem));
        media_tools::extract_embedded_subtitle(video, stream_index, extracted.as_path()).await?;

        let result = self.translate_srt_file(&extracted, output_dir).await;
        let _ = std::fs::remove_file(&extracted);
        result
    }

    /// Slice audio, transcribe chunk by chunk, translate group by group
    async fn translate_from_audio(
        &self,
        video: &Path,
        duration_secs: f64,
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let temp_dir = tempfile::Builder::new()
            .prefix("subsmith_audio")
            .tempdir()
            .context("Failed to create temporary audio directory")?;
        let chunks = media_tools::extract_audio_chunks(
            video,
            temp_dir.path(),
            duration_secs,
            &self.config.audio,
        )
        .await?;
        if chunks.is_empty() {
            return Err(anyhow!("No audio could be extracted from {}", video.display()));
        }

        // One transcript group per chunk. A failed or silent chunk stays in
        // the list as an empty group so later groups keep their position.
        let mut groups: Vec<Vec<TranscriptSegment>> = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            info!(
                "Transcribing chunk {}/{} ({:.1}s - {:.1}s)",
                chunk.index + 1,
                chunks.len(),
                chunk.start_secs,
                chunk.end_secs
            );
            match self
                .client
                .transcribe(&chunk.path, &self.config.provider.audio_model)
                .await
            {
                Ok(segments) => {
                    let offset = chunk.start_secs;
                    groups.push(
                        segments
                            .into_iter()
                            .map(|s| TranscriptSegment {
                                start_secs: s.start_secs + offset,
                                end_secs: s.end_secs + offset,
                                text: s.text,
                            })
                            .collect(),
                    );
                }
                Err(e) => {
                    warn!("Transcription of chunk {} failed: {}", chunk.index + 1, e);
                    groups.push(Vec::new());
                }
            }
        }
        drop(temp_dir);

        let total_segments: usize = groups.iter().map(|g| g.len()).sum();
        if total_segments == 0 {
            return Err(anyhow!("Transcription produced no usable speech segments"));
        }
        debug!("Transcribed {} segment(s) in {} group(s)", total_segments, groups.len());

        let translated = translate_transcript_groups(
            &self.translator,
            &groups,
            self.config.mode,
            self.config.batch.batch_size,
        )
        .await;

        let output_path = output_dir.join(self.output_filename(video));
        std::fs::write(&output_path, subtitle_processor::generate_srt(&translated))
            .with_context(|| format!("Failed to write {}", output_path.display()))?;

        info!("Wrote {}", output_path.display());
        info!("{}", self.translator.usage().summary());
        Ok(output_path)
    }

    /// Translate entries in batch-sized slices, substituting display text
    async fn translate_entries(&self, entries: Vec<SubtitleEntry>) -> Vec<SubtitleEntry> {
        let mode = self.config.mode;
        let batch_size = self.config.batch.batch_size.max(1);
        let total_chunks = entries.len().div_ceil(batch_size) as u64;

        let progress_bar = ProgressBar::new(total_chunks);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        let mut translated_entries = Vec::with_capacity(entries.len());
        let chunk_count = entries.chunks(batch_size).count();

        for (chunk_idx, chunk) in entries.chunks(batch_size).enumerate() {
            let originals: Vec<String> = chunk.iter().map(|e| e.text.clone()).collect();
            let translated = self.translator.translate_chunk(&originals, mode).await;
            let display = formatting::format_display_texts(&translated, &originals, mode);

            for (entry, text) in chunk.iter().zip(display) {
                translated_entries.push(SubtitleEntry::new(
                    entry.index,
                    entry.timeline.clone(),
                    text,
                ));
            }

            progress_bar.inc(1);
            if chunk_idx + 1 < chunk_count {
                self.translator.inter_batch_pause().await;
            }
        }

        progress_bar.finish_and_clear();
        translated_entries
    }

    /// Output file name: `{stem}.{mode}.srt`
    fn output_filename(&self, input: &Path) -> String {
        format!(
            "{}.{}.srt",
            file_stem(input),
            self.config.mode.to_lowercase_string()
        )
    }
}

/// Translate transcript groups one at a time, in their original order.
///
/// Each group is translated independently, sliced by `batch_size`, so a short
/// group takes the per-item path even when neighboring groups would fill a
/// batch, and a degraded batch never spills its fallback into another group.
/// Empty groups contribute nothing. Group outputs are concatenated in group
/// order and renumbered from 1.
pub async fn translate_transcript_groups(
    translator: &Translator,
    groups: &[Vec<TranscriptSegment>],
    mode: TranslationMode,
    batch_size: usize,
) -> Vec<SubtitleEntry> {
    let batch_size = batch_size.max(1);
    let mut translated_segments = Vec::new();
    let mut first_call = true;

    for group in groups {
        if group.is_empty() {
            continue;
        }
        let originals: Vec<String> = group.iter().map(|s| s.text.clone()).collect();
        let mut display = Vec::with_capacity(originals.len());

        for chunk in originals.chunks(batch_size) {
            if !first_call {
                translator.inter_batch_pause().await;
            }
            first_call = false;

            let translated = translator.translate_chunk(chunk, mode).await;
            display.extend(formatting::format_display_texts(&translated, chunk, mode));
        }

        for (segment, text) in group.iter().zip(display) {
            translated_segments.push(TranscriptSegment {
                start_secs: segment.start_secs,
                end_secs: segment.end_secs,
                text,
            });
        }
    }

    subtitle_processor::segments_to_entries(&translated_segments)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

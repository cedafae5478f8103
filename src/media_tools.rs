/*!
 * Wrappers around the external ffmpeg/ffprobe binaries.
 *
 * Everything here shells out: probing container metadata, slicing audio into
 * transcription-sized chunks, pulling embedded subtitle tracks out as SRT, and
 * muxing finished subtitle files back into a video. All invocations carry a
 * timeout so a wedged tool cannot hang the pipeline.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, warn};
use serde_json::Value;
use tokio::process::Command;

use crate::app_config::AudioConfig;
use crate::errors::ToolError;

/// Container metadata relevant to the pipeline
#[derive(Debug, Clone)]
pub struct MediaInfo {
    /// Total duration in seconds
    pub duration_secs: f64,
    /// Subtitle streams present in the container
    pub subtitle_streams: Vec<StreamInfo>,
}

/// One subtitle stream as reported by ffprobe
#[derive(Debug, Clone)]
pub struct StreamInfo {
    /// Absolute stream index within the container
    pub index: usize,
    /// Codec name, e.g. "subrip" or "hdmv_pgs_subtitle"
    pub codec_name: String,
    /// Language tag if present
    pub language: Option<String>,
    /// Title tag if present
    pub title: Option<String>,
}

impl StreamInfo {
    /// Bitmap subtitle codecs cannot be converted to text
    pub fn is_bitmap(&self) -> bool {
        matches!(
            self.codec_name.as_str(),
            "hdmv_pgs_subtitle" | "dvd_subtitle" | "dvb_subtitle" | "xsub"
        )
    }
}

/// One extracted audio slice, with its position on the source timeline
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Path to the mp3 file
    pub path: PathBuf,
    /// Offset of the chunk start in the source video, seconds
    pub start_secs: f64,
    /// Offset of the chunk end in the source video, seconds
    pub end_secs: f64,
    /// Zero-based chunk position
    pub index: usize,
}

/// A finished subtitle file queued for embedding
#[derive(Debug, Clone)]
pub struct SubtitleFile {
    /// Path to the .srt or .ass file
    pub path: PathBuf,
    /// Language metadata for the muxed stream
    pub language: Option<String>,
    /// Title metadata for the muxed stream
    pub title: Option<String>,
}

/// Probe a media file for duration and subtitle streams
pub async fn probe_media<P: AsRef<Path>>(path: P) -> Result<MediaInfo, ToolError> {
    let path = path.as_ref();

    let output = run_tool(
        "ffprobe",
        Command::new("ffprobe").args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            path.to_str().unwrap_or_default(),
        ]),
        Duration::from_secs(30),
    )
    .await?;

    let stdout = String::from_utf8_lossy(&output);
    if stdout.trim().is_empty() {
        return Err(ToolError::BadOutput {
            tool: "ffprobe".to_string(),
            message: "empty output".to_string(),
        });
    }

    let json: Value = serde_json::from_str(&stdout).map_err(|e| ToolError::BadOutput {
        tool: "ffprobe".to_string(),
        message: e.to_string(),
    })?;

    let duration_secs = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| d.as_str())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| ToolError::BadOutput {
            tool: "ffprobe".to_string(),
            message: "no duration in format section".to_string(),
        })?;

    let mut subtitle_streams = Vec::new();
    if let Some(streams) = json.get("streams").and_then(|s| s.as_array()) {
        for stream in streams {
            if stream.get("codec_type").and_then(|t| t.as_str()) != Some("subtitle") {
                continue;
            }

            let index = stream
                .get("index")
                .and_then(|v| v.as_u64())
                .map(|v| v as usize)
                .unwrap_or(0);

            let codec_name = stream
                .get("codec_name")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();

            let language = stream
                .get("tags")
                .and_then(|t| t.get("language"))
                .and_then(|l| l.as_str())
                .map(|s| s.to_string());

            let title = stream
                .get("tags")
                .and_then(|t| t.get("title"))
                .and_then(|l| l.as_str())
                .map(|s| s.to_string());

            subtitle_streams.push(StreamInfo {
                index,
                codec_name,
                language,
                title,
            });
        }
    }

    debug!(
        "Probed {:?}: {:.1}s, {} subtitle stream(s)",
        path,
        duration_secs,
        subtitle_streams.len()
    );

    Ok(MediaInfo {
        duration_secs,
        subtitle_streams,
    })
}

/// Slice a video's audio into fixed-length mono mp3 chunks.
///
/// Each chunk is extracted independently; a chunk whose extraction fails or
/// whose output is too small to hold real audio is skipped with a warning
/// rather than aborting the whole run. Skipped chunks leave a gap in the
/// returned list while later chunks keep their true timeline offsets.
pub async fn extract_audio_chunks<P: AsRef<Path>>(
    video_path: P,
    output_dir: P,
    total_duration: f64,
    audio: &AudioConfig,
) -> Result<Vec<AudioChunk>, ToolError> {
    let video_path = video_path.as_ref();
    let output_dir = output_dir.as_ref();

    std::fs::create_dir_all(output_dir).map_err(|e| ToolError::SpawnFailed {
        tool: "ffmpeg".to_string(),
        message: format!("cannot create {:?}: {}", output_dir, e),
    })?;

    let chunk_secs = audio.chunk_secs as f64;
    let num_chunks = (total_duration / chunk_secs).ceil() as usize;
    let sample_rate = audio.sample_rate.to_string();
    let mut chunks = Vec::with_capacity(num_chunks);

    debug!(
        "Splitting {:.1}s of audio into {} chunk(s) of up to {}s",
        total_duration, num_chunks, audio.chunk_secs
    );

    for i in 0..num_chunks {
        let start = i as f64 * chunk_secs;
        let end = ((i + 1) as f64 * chunk_secs).min(total_duration);
        let chunk_path = output_dir.join(format!("chunk_{:03}.mp3", i));

        let result = run_tool(
            "ffmpeg",
            Command::new("ffmpeg").args([
                "-i",
                video_path.to_str().unwrap_or_default(),
                "-ss",
                &format!("{}", start),
                "-t",
                &format!("{}", end - start),
                "-vn",
                "-acodec",
                "mp3",
                "-ar",
                &sample_rate,
                "-ac",
                "1",
                "-y",
                chunk_path.to_str().unwrap_or_default(),
            ]),
            Duration::from_secs(60),
        )
        .await;

        if let Err(e) = result {
            warn!("Audio chunk {}/{} failed, skipping: {}", i + 1, num_chunks, e);
            continue;
        }

        // Anything under ~1KB is header-only output, not audio
        let file_size = std::fs::metadata(&chunk_path).map(|m| m.len()).unwrap_or(0);
        if file_size <= 1000 {
            warn!("Audio chunk {}/{} is too small, skipping", i + 1, num_chunks);
            let _ = std::fs::remove_file(&chunk_path);
            continue;
        }

        chunks.push(AudioChunk {
            path: chunk_path,
            start_secs: start,
            end_secs: end,
            index: i,
        });
    }

    debug!("Extracted {} valid audio chunk(s)", chunks.len());
    Ok(chunks)
}

/// Extract one embedded subtitle stream to an SRT file.
///
/// Takes the absolute stream index from [`probe_media`]. An empty output file
/// counts as failure; the caller decides whether to fall back to audio.
pub async fn extract_embedded_subtitle<P: AsRef<Path>>(
    video_path: P,
    stream_index: usize,
    output_path: P,
) -> Result<PathBuf, ToolError> {
    let video_path = video_path.as_ref();
    let output_path = output_path.as_ref();

    run_tool(
        "ffmpeg",
        Command::new("ffmpeg").args([
            "-y",
            "-i",
            video_path.to_str().unwrap_or_default(),
            "-map",
            &format!("0:{}", stream_index),
            "-c:s",
            "srt",
            output_path.to_str().unwrap_or_default(),
        ]),
        Duration::from_secs(60),
    )
    .await?;

    let file_size = std::fs::metadata(output_path).map(|m| m.len()).unwrap_or(0);
    if file_size == 0 {
        let _ = std::fs::remove_file(output_path);
        return Err(ToolError::BadOutput {
            tool: "ffmpeg".to_string(),
            message: format!("stream {} produced an empty subtitle file", stream_index),
        });
    }

    Ok(output_path.to_path_buf())
}

/// Mux subtitle files into a copy of the video.
///
/// Stream copy for video/audio; the subtitle codec follows the container:
/// mp4 gets mov_text, mkv/avi/mov keep ass when any input is .ass, everything
/// else is encoded as srt. Output lands next to the requested directory as
/// `{stem}_with_subtitles{ext}`.
pub async fn embed_subtitles<P: AsRef<Path>>(
    video_path: P,
    subtitles: &[SubtitleFile],
    output_dir: P,
) -> Result<PathBuf, ToolError> {
    let video_path = video_path.as_ref();
    let output_dir = output_dir.as_ref();

    std::fs::create_dir_all(output_dir).map_err(|e| ToolError::SpawnFailed {
        tool: "ffmpeg".to_string(),
        message: format!("cannot create {:?}: {}", output_dir, e),
    })?;

    let stem = video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "video".to_string());
    let ext = video_path
        .extension()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let output_path = output_dir.join(format!("{}_with_subtitles.{}", stem, ext));

    let has_ass = subtitles.iter().any(|s| {
        s.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase() == "ass")
            .unwrap_or(false)
    });

    let subtitle_codec = if matches!(ext.as_str(), "mkv" | "avi" | "mov") && has_ass {
        "ass"
    } else if ext == "mp4" {
        "mov_text"
    } else {
        "srt"
    };

    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-i", video_path.to_str().unwrap_or_default()]);
    for sub in subtitles {
        cmd.args(["-i", sub.path.to_str().unwrap_or_default()]);
    }
    cmd.args(["-map", "0"]);

    for (i, sub) in subtitles.iter().enumerate() {
        cmd.args(["-map", &format!("{}", i + 1)]);

        if let Some(language) = &sub.language {
            let tag = normalize_language_tag(language).unwrap_or_else(|| {
                warn!("Unrecognized language code '{}', passing through", language);
                language.clone()
            });
            cmd.args([format!("-metadata:s:s:{}", i), format!("language={}", tag)]);
        }
        if let Some(title) = &sub.title {
            cmd.args([format!("-metadata:s:s:{}", i), format!("title={}", title)]);
        }
    }

    cmd.args(["-c", "copy", "-c:s", subtitle_codec]);
    if subtitle_codec == "ass" {
        cmd.args(["-disposition:s", "default"]);
    }
    cmd.args(["-loglevel", "error"]);
    cmd.args(["-y", output_path.to_str().unwrap_or_default()]);

    debug!("Embedding {} subtitle file(s) as {}", subtitles.len(), subtitle_codec);

    run_tool("ffmpeg", &mut cmd, Duration::from_secs(300)).await?;

    if !output_path.exists() {
        return Err(ToolError::BadOutput {
            tool: "ffmpeg".to_string(),
            message: "output file was not created".to_string(),
        });
    }

    Ok(output_path)
}

/// Normalize a language name or code to its ISO 639-2/T tag
pub fn normalize_language_tag(code: &str) -> Option<String> {
    let trimmed = code.trim();
    let lang = isolang::Language::from_639_1(trimmed)
        .or_else(|| isolang::Language::from_639_3(&trimmed.to_lowercase()))
        .or_else(|| isolang::Language::from_name(trimmed))?;
    Some(lang.to_639_3().to_string())
}

/// Run one tool invocation with a timeout, returning its stdout
async fn run_tool(
    tool: &str,
    cmd: &mut Command,
    timeout: Duration,
) -> Result<Vec<u8>, ToolError> {
    let future = cmd.output();

    let output = tokio::select! {
        result = future => {
            result.map_err(|e| ToolError::SpawnFailed {
                tool: tool.to_string(),
                message: e.to_string(),
            })?
        },
        _ = tokio::time::sleep(timeout) => {
            return Err(ToolError::Timeout {
                tool: tool.to_string(),
                seconds: timeout.as_secs(),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ToolError::NonZeroExit {
            tool: tool.to_string(),
            stderr: filter_tool_stderr(&stderr),
        });
    }

    Ok(output.stdout)
}

/// Strip the version banner, build configuration, and stream metadata noise
/// out of ffmpeg stderr, keeping only lines that describe the failure
fn filter_tool_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "  built with",
        "  configuration:",
        "  lib",
        "Input #",
        "  Metadata:",
        "  Duration:",
        "  Stream #",
        "      Metadata:",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim_end();
            if trimmed.trim().is_empty() {
                return false;
            }
            !noise_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

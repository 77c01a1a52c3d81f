//! ffprobe/ffmpeg adapter for the media tool port.
//!
//! Everything here shells out: `ffprobe` answers "does this file have an
//! audio stream" and "what are the real dimensions/duration", `ffmpeg` muxes
//! a silent stereo track onto videos that lack one.

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use chancopy_core::{
    domain::VideoMeta,
    errors::Error,
    ports::MediaToolPort,
    Result,
};

const STDERR_PREVIEW_MAX: usize = 2000;

#[derive(Clone, Debug)]
pub struct FfmpegTool {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegTool {
    pub fn new(ffmpeg: PathBuf, ffprobe: PathBuf) -> Self {
        Self { ffmpeg, ffprobe }
    }

    /// Preflight: locate both binaries in PATH, or fail with a clear message
    /// before any network work starts.
    pub fn detect() -> Result<Self> {
        let ffmpeg = which_in_path("ffmpeg")
            .ok_or_else(|| Error::MediaTool("ffmpeg not found in PATH".to_string()))?;
        let ffprobe = which_in_path("ffprobe")
            .ok_or_else(|| Error::MediaTool("ffprobe not found in PATH".to_string()))?;
        Ok(Self::new(ffmpeg, ffprobe))
    }
}

#[async_trait]
impl MediaToolPort for FfmpegTool {
    async fn probe_audio(&self, path: &Path) -> Result<bool> {
        let output = Command::new(&self.ffprobe)
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("a")
            .arg("-show_entries")
            .arg("stream=codec_type")
            .arg("-of")
            .arg("csv=p=0")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::MediaTool(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                stderr_preview(&output.stderr)
            )));
        }

        let has_audio = stdout_has_stream(&output.stdout);
        debug!(path = %path.display(), has_audio, "probed audio streams");
        Ok(has_audio)
    }

    async fn probe_video_meta(&self, path: &Path) -> Result<VideoMeta> {
        let output = Command::new(&self.ffprobe)
            .arg("-v")
            .arg("error")
            .arg("-select_streams")
            .arg("v:0")
            .arg("-show_entries")
            .arg("stream=width,height:format=duration")
            .arg("-of")
            .arg("json")
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::MediaTool(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                stderr_preview(&output.stderr)
            )));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        parse_video_meta(&json)
            .map_err(|e| Error::MediaTool(format!("bad ffprobe output for {}: {e}", path.display())))
    }

    async fn add_silent_audio(&self, input: &Path, output: &Path) -> Result<()> {
        let result = Command::new(&self.ffmpeg)
            .arg("-i")
            .arg(input)
            .arg("-f")
            .arg("lavfi")
            .arg("-i")
            .arg("anullsrc=channel_layout=stereo:sample_rate=44100")
            .arg("-c:v")
            .arg("copy")
            .arg("-c:a")
            .arg("aac")
            .arg("-shortest")
            .arg("-y")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .output()
            .await?;

        if !result.status.success() {
            return Err(Error::MediaTool(format!(
                "ffmpeg mux failed on {}: {}",
                input.display(),
                stderr_preview(&result.stderr)
            )));
        }

        Ok(())
    }
}

/// csv=p=0 prints one line per matched stream, so any non-blank output means
/// at least one audio stream exists.
fn stdout_has_stream(stdout: &[u8]) -> bool {
    !String::from_utf8_lossy(stdout).trim().is_empty()
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<i32>,
    height: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

fn parse_video_meta(json: &str) -> std::result::Result<VideoMeta, String> {
    let parsed: ProbeOutput = serde_json::from_str(json).map_err(|e| e.to_string())?;

    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| "no video stream".to_string())?;
    let width = stream.width.ok_or_else(|| "missing width".to_string())?;
    let height = stream.height.ok_or_else(|| "missing height".to_string())?;

    let duration_secs = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| "missing duration".to_string())?;

    Ok(VideoMeta {
        duration_secs,
        width,
        height,
    })
}

fn stderr_preview(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_PREVIEW_MAX {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(STDERR_PREVIEW_MAX).collect();
    out.push_str("...");
    out
}

fn which_in_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(binary);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

fn is_executable_file(p: &Path) -> bool {
    if !p.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(md) = std::fs::metadata(p) {
            return (md.permissions().mode() & 0o111) != 0;
        }
    }
    true
}

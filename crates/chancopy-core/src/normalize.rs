use std::path::{Path, PathBuf};

use tracing::info;

use crate::{errors::Error, ports::MediaToolPort, Result};

/// Outcome of audio normalization: which file to upload, and the extra file
/// produced by muxing (if any) so the caller can track it for cleanup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedVideo {
    pub upload_path: PathBuf,
    pub produced: Option<PathBuf>,
}

/// Guarantee the video at `path` carries an audio stream before upload.
///
/// Videos with audio pass through untouched; silent ones get a muxed copy
/// named `fixed_<name>` next to the original. Probe failures surface as
/// errors rather than being read as "no audio".
pub async fn ensure_audio(tool: &dyn MediaToolPort, path: &Path) -> Result<NormalizedVideo> {
    if tool.probe_audio(path).await? {
        return Ok(NormalizedVideo {
            upload_path: path.to_path_buf(),
            produced: None,
        });
    }

    let fixed = fixed_path(path)?;
    tool.add_silent_audio(path, &fixed).await?;
    info!(input = %path.display(), output = %fixed.display(), "added silent audio track");

    Ok(NormalizedVideo {
        upload_path: fixed.clone(),
        produced: Some(fixed),
    })
}

fn fixed_path(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::MediaTool(format!("video path has no file name: {}", path.display())))?;
    Ok(path.with_file_name(format!("fixed_{name}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::VideoMeta;

    struct FakeTool {
        has_audio: bool,
        probe_fails: bool,
        mux_calls: Mutex<Vec<(PathBuf, PathBuf)>>,
    }

    impl FakeTool {
        fn new(has_audio: bool) -> Self {
            Self {
                has_audio,
                probe_fails: false,
                mux_calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MediaToolPort for FakeTool {
        async fn probe_audio(&self, _path: &Path) -> Result<bool> {
            if self.probe_fails {
                return Err(Error::MediaTool("ffprobe exited with status 1".into()));
            }
            Ok(self.has_audio)
        }

        async fn probe_video_meta(&self, _path: &Path) -> Result<VideoMeta> {
            Ok(VideoMeta {
                duration_secs: 1.0,
                width: 1,
                height: 1,
            })
        }

        async fn add_silent_audio(&self, input: &Path, output: &Path) -> Result<()> {
            self.mux_calls
                .lock()
                .unwrap()
                .push((input.to_path_buf(), output.to_path_buf()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn audio_present_skips_mux() {
        let tool = FakeTool::new(true);
        let out = ensure_audio(&tool, Path::new("/tmp/dl/clip.mp4"))
            .await
            .unwrap();
        assert_eq!(out.upload_path, PathBuf::from("/tmp/dl/clip.mp4"));
        assert_eq!(out.produced, None);
        assert!(tool.mux_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_audio_produces_fixed_file() {
        let tool = FakeTool::new(false);
        let out = ensure_audio(&tool, Path::new("/tmp/dl/clip.mp4"))
            .await
            .unwrap();
        assert_eq!(out.upload_path, PathBuf::from("/tmp/dl/fixed_clip.mp4"));
        assert_eq!(out.produced, Some(PathBuf::from("/tmp/dl/fixed_clip.mp4")));

        let calls = tool.mux_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("/tmp/dl/clip.mp4"));
    }

    #[tokio::test]
    async fn probe_failure_is_an_error_not_a_mux() {
        let mut tool = FakeTool::new(true);
        tool.probe_fails = true;
        let err = ensure_audio(&tool, Path::new("/tmp/dl/clip.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MediaTool(_)));
        assert!(tool.mux_calls.lock().unwrap().is_empty());
    }
}

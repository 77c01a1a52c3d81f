use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    domain::{ChannelHandle, CopyRange, Permalink, Post, PostId, VideoMeta},
    Result,
};

/// Port for the authenticated messaging-platform client.
///
/// The MTProto adapter is the first implementation; the copy engine only ever
/// talks to channels through this narrow surface, so tests run against fakes.
#[async_trait]
pub trait ChannelPort: Send + Sync {
    /// Resolve a channel by public handle. Must be called before any other
    /// operation on that handle.
    async fn resolve(&self, handle: &ChannelHandle) -> Result<()>;

    /// Fetch the posts whose ids fall inside `range`, ascending by id.
    /// Ids with no message (deleted posts) are simply absent from the result.
    async fn fetch_posts(&self, channel: &ChannelHandle, range: CopyRange) -> Result<Vec<Post>>;

    async fn send_text(&self, channel: &ChannelHandle, text: &str) -> Result<()>;

    /// Download the media payload of a previously fetched post into `dir`.
    /// Returns `None` when the post turns out to carry nothing downloadable.
    async fn download_media(
        &self,
        channel: &ChannelHandle,
        post: PostId,
        dir: &Path,
    ) -> Result<Option<PathBuf>>;

    async fn send_photo(&self, channel: &ChannelHandle, path: &Path, caption: &str) -> Result<()>;

    /// Upload a video with streaming playback enabled and the probed
    /// dimensions/duration attached.
    async fn send_video(
        &self,
        channel: &ChannelHandle,
        path: &Path,
        caption: &str,
        meta: VideoMeta,
    ) -> Result<()>;
}

/// Port for the external prober/encoder (ffprobe/ffmpeg).
#[async_trait]
pub trait MediaToolPort: Send + Sync {
    /// Whether the file carries at least one audio stream.
    ///
    /// A failed probe is an error, never "no audio": conflating the two would
    /// re-mux files we could not inspect at all.
    async fn probe_audio(&self, path: &Path) -> Result<bool>;

    /// Actual dimensions and duration of the video file.
    async fn probe_video_meta(&self, path: &Path) -> Result<VideoMeta>;

    /// Produce `output`: video stream copied from `input`, silent stereo
    /// 44.1 kHz audio synthesized, trimmed to the shortest stream.
    async fn add_silent_audio(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Port for the operator notification channel.
///
/// Fire-and-forget by contract: implementations log failures and swallow
/// them, so the copier outcome for a post never depends on the notifier.
#[async_trait]
pub trait NotifierPort: Send + Sync {
    async fn notify_copied(&self, permalink: &Permalink);
}

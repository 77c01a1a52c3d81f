use std::fmt;

use crate::{errors::Error, Result};

/// Post id within a channel (numeric, ascending).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostId(pub i32);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Public channel username, stored without the leading `@`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelHandle(String);

impl ChannelHandle {
    pub fn new(handle: &str) -> Self {
        Self(handle.trim().trim_start_matches('@').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed interval of post ids to copy.
///
/// Empty when `start > end`; the copier visits zero posts in that case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyRange {
    pub start: PostId,
    pub end: PostId,
}

impl CopyRange {
    pub fn new(start: PostId, end: PostId) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, id: PostId) -> bool {
        self.start <= id && id <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Ids in ascending order; empty iterator for an empty range.
    pub fn ids(&self) -> impl Iterator<Item = PostId> {
        (self.start.0..=self.end.0).map(PostId)
    }
}

/// Parse a post number as typed at the prompt.
///
/// People paste ids straight out of `t.me` links, so slashes are stripped
/// before parsing.
pub fn parse_post_number(input: &str) -> Result<PostId> {
    let cleaned = input.trim().replace('/', "");
    cleaned
        .parse::<i32>()
        .map(PostId)
        .map_err(|_| Error::Config(format!("not a post number: {input:?}")))
}

/// Media attached to a post, as far as the copier cares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Document { file_name: Option<String> },
    Other,
}

/// One message unit fetched from the source channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub text: Option<String>,
    pub media: Option<MediaKind>,
}

impl Post {
    pub fn caption(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Stable URL referencing a post by channel handle and id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permalink(String);

impl Permalink {
    pub fn new(channel: &ChannelHandle, id: PostId) -> Self {
        Self(format!("https://t.me/{channel}/{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permalink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Video metadata probed from the actual file, attached to the upload so
/// clients render dimensions and seek bar correctly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoMeta {
    pub duration_secs: f64,
    pub width: i32,
    pub height: i32,
}

/// Per-post result of a copy attempt. Only the `*Sent` variants notify.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    TextSent,
    PhotoSent,
    VideoSent,
    SkippedUnsupported,
    SkippedEmpty,
    Failed,
}

impl TransferOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::TextSent | Self::PhotoSent | Self::VideoSent)
    }
}

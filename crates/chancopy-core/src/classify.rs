use std::path::Path;

use crate::domain::{MediaKind, Post};

/// Extensions that route a generic document through the video path.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "webm", "mkv", "avi"];

/// What to do with a post, decided from its metadata alone (no download yet).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostClass {
    /// Forward the text verbatim.
    Text,
    /// Download and re-upload as a photo with the original caption.
    Photo,
    /// Download, normalize audio, upload as a streaming video.
    Video,
    /// Media we do not transfer. Skipped, no notification.
    Unsupported,
    /// Neither text nor media (service message, deleted content).
    Empty,
}

/// Classification policy, in priority order: text-only, photo, video
/// (including documents whose file name looks like a video), anything else.
pub fn classify(post: &Post) -> PostClass {
    match (&post.text, &post.media) {
        (Some(_), None) => PostClass::Text,
        (_, Some(MediaKind::Photo)) => PostClass::Photo,
        (_, Some(MediaKind::Video)) => PostClass::Video,
        (_, Some(MediaKind::Document { file_name })) => {
            if file_name.as_deref().is_some_and(has_video_extension) {
                PostClass::Video
            } else {
                PostClass::Unsupported
            }
        }
        (_, Some(MediaKind::Other)) => PostClass::Unsupported,
        (None, None) => PostClass::Empty,
    }
}

pub fn has_video_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            VIDEO_EXTENSIONS.contains(&ext.as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostId;

    fn post(text: Option<&str>, media: Option<MediaKind>) -> Post {
        Post {
            id: PostId(1),
            text: text.map(|s| s.to_string()),
            media,
        }
    }

    #[test]
    fn text_only_is_text() {
        assert_eq!(classify(&post(Some("hello"), None)), PostClass::Text);
    }

    #[test]
    fn photo_beats_caption() {
        let p = post(Some("caption"), Some(MediaKind::Photo));
        assert_eq!(classify(&p), PostClass::Photo);
    }

    #[test]
    fn video_media_is_video() {
        let p = post(None, Some(MediaKind::Video));
        assert_eq!(classify(&p), PostClass::Video);
    }

    #[test]
    fn document_with_video_extension_is_video() {
        let p = post(
            None,
            Some(MediaKind::Document {
                file_name: Some("clip.MP4".to_string()),
            }),
        );
        assert_eq!(classify(&p), PostClass::Video);
    }

    #[test]
    fn document_without_video_extension_is_unsupported() {
        let p = post(
            None,
            Some(MediaKind::Document {
                file_name: Some("notes.pdf".to_string()),
            }),
        );
        assert_eq!(classify(&p), PostClass::Unsupported);

        let unnamed = post(None, Some(MediaKind::Document { file_name: None }));
        assert_eq!(classify(&unnamed), PostClass::Unsupported);
    }

    #[test]
    fn other_media_is_unsupported() {
        assert_eq!(
            classify(&post(Some("text"), Some(MediaKind::Other))),
            PostClass::Unsupported
        );
    }

    #[test]
    fn nothing_is_empty() {
        assert_eq!(classify(&post(None, None)), PostClass::Empty);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_video_extension("a.mp4"));
        assert!(has_video_extension("b.MOV"));
        assert!(!has_video_extension("c.txt"));
        assert!(!has_video_extension("mp4"));
    }
}

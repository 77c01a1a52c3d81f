use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    classify::{classify, PostClass},
    config::{Config, ErrorPolicy},
    domain::{CopyRange, Permalink, Post, PostId, TransferOutcome},
    normalize::ensure_audio,
    ports::{ChannelPort, MediaToolPort, NotifierPort},
    tempfiles::TempBatch,
    Result,
};

/// Per-post entry in the run report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostOutcome {
    pub id: PostId,
    pub outcome: TransferOutcome,
}

/// What a `copy_range` run did, post by post.
#[derive(Clone, Debug, Default)]
pub struct CopyReport {
    pub outcomes: Vec<PostOutcome>,
}

impl CopyReport {
    fn record(&mut self, id: PostId, outcome: TransferOutcome) {
        self.outcomes.push(PostOutcome { id, outcome });
    }

    pub fn copied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_sent()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.outcome,
                    TransferOutcome::SkippedUnsupported | TransferOutcome::SkippedEmpty
                )
            })
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.outcome == TransferOutcome::Failed)
            .count()
    }
}

/// The copy engine: visits every post in an id range, ascending, classifies
/// it and dispatches the matching transfer through the ports.
pub struct RangeCopier {
    cfg: Arc<Config>,
    channels: Arc<dyn ChannelPort>,
    media: Arc<dyn MediaToolPort>,
    notifier: Arc<dyn NotifierPort>,
}

impl RangeCopier {
    pub fn new(
        cfg: Arc<Config>,
        channels: Arc<dyn ChannelPort>,
        media: Arc<dyn MediaToolPort>,
        notifier: Arc<dyn NotifierPort>,
    ) -> Self {
        Self {
            cfg,
            channels,
            media,
            notifier,
        }
    }

    pub async fn copy_range(&self, range: CopyRange) -> Result<CopyReport> {
        self.channels.resolve(&self.cfg.source_channel).await?;
        self.channels.resolve(&self.cfg.dest_channel).await?;

        let mut report = CopyReport::default();
        if range.is_empty() {
            info!(start = %range.start, end = %range.end, "empty range, nothing to copy");
            return Ok(report);
        }

        info!(start = %range.start, end = %range.end, "copying posts");
        let posts = self
            .channels
            .fetch_posts(&self.cfg.source_channel, range)
            .await?;

        for post in posts.iter().filter(|p| range.contains(p.id)) {
            info!(id = %post.id, "processing post");
            match self.copy_post(post).await {
                Ok(outcome) => {
                    if outcome.is_sent() {
                        let link = Permalink::new(&self.cfg.source_channel, post.id);
                        self.notifier.notify_copied(&link).await;
                    }
                    report.record(post.id, outcome);
                }
                Err(e) => match self.cfg.error_policy {
                    ErrorPolicy::Abort => return Err(e),
                    ErrorPolicy::Continue => {
                        warn!(id = %post.id, error = %e, "post failed, continuing");
                        report.record(post.id, TransferOutcome::Failed);
                    }
                },
            }
        }

        info!(
            copied = report.copied(),
            skipped = report.skipped(),
            failed = report.failed(),
            "finished range"
        );
        Ok(report)
    }

    async fn copy_post(&self, post: &Post) -> Result<TransferOutcome> {
        match classify(post) {
            PostClass::Text => {
                self.channels
                    .send_text(&self.cfg.dest_channel, post.caption())
                    .await?;
                Ok(TransferOutcome::TextSent)
            }
            PostClass::Photo => {
                let mut batch = TempBatch::new();
                let Some(path) = self.download_into(&mut batch, post).await? else {
                    return Ok(TransferOutcome::SkippedUnsupported);
                };
                self.channels
                    .send_photo(&self.cfg.dest_channel, &path, post.caption())
                    .await?;
                Ok(TransferOutcome::PhotoSent)
            }
            PostClass::Video => {
                let mut batch = TempBatch::new();
                let Some(path) = self.download_into(&mut batch, post).await? else {
                    return Ok(TransferOutcome::SkippedUnsupported);
                };

                let normalized = ensure_audio(self.media.as_ref(), &path).await?;
                if let Some(produced) = &normalized.produced {
                    batch.track(produced.clone());
                }

                let meta = self.media.probe_video_meta(&normalized.upload_path).await?;
                self.channels
                    .send_video(
                        &self.cfg.dest_channel,
                        &normalized.upload_path,
                        post.caption(),
                        meta,
                    )
                    .await?;
                Ok(TransferOutcome::VideoSent)
            }
            PostClass::Unsupported => {
                info!(id = %post.id, "unsupported media type, skipped");
                Ok(TransferOutcome::SkippedUnsupported)
            }
            PostClass::Empty => Ok(TransferOutcome::SkippedEmpty),
        }
    }

    async fn download_into(
        &self,
        batch: &mut TempBatch,
        post: &Post,
    ) -> Result<Option<std::path::PathBuf>> {
        let downloaded = self
            .channels
            .download_media(&self.cfg.source_channel, post.id, &self.cfg.download_dir)
            .await?;
        if let Some(path) = &downloaded {
            batch.track(path.clone());
        }
        Ok(downloaded)
    }
}

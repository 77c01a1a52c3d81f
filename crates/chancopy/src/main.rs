use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::Context;
use tracing::info;

use chancopy_core::{
    config::Config,
    copier::RangeCopier,
    domain::{parse_post_number, CopyRange},
};
use chancopy_ffmpeg::FfmpegTool;
use chancopy_telegram::{BotNotifier, ChannelClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    chancopy_core::logging::init("chancopy")?;

    let cfg = Arc::new(Config::load()?);

    let tool = FfmpegTool::detect()
        .context("ffmpeg and ffprobe must be installed and in PATH")?;

    let range = prompt_range()?;

    let client = Arc::new(ChannelClient::connect(&cfg).await?);
    let notifier = Arc::new(BotNotifier::new(&cfg));

    let copier = RangeCopier::new(cfg, client.clone(), Arc::new(tool), notifier);
    let report = copier.copy_range(range).await?;

    client.save_session()?;
    info!(
        copied = report.copied(),
        skipped = report.skipped(),
        failed = report.failed(),
        "done"
    );
    Ok(())
}

fn prompt_range() -> anyhow::Result<CopyRange> {
    let start = parse_post_number(&prompt("Enter the starting post number: ")?)?;
    let end = parse_post_number(&prompt("Enter the ending post number: ")?)?;
    Ok(CopyRange::new(start, end))
}

fn prompt(message: &str) -> anyhow::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use clip_helix::{Credentials, HelixClient};
use clip_pulse::{
    browser::chromium::ChromiumDriver,
    input::{prompt_channel_and_count, read_channels},
    tracing::{init_tracing_subscriber, LogFormat},
    ClipExtractor, ClipLimit, ClipProcessorBuilder, ExtractTimeouts, RunConfig, RunReport,
};
use itertools::Itertools;
use tokio::io::BufReader;

#[derive(Parser)]
#[command(
    name = "clip-pulse",
    about = "Download recent Twitch clips by driving the clip page's share menu"
)]
struct Cli {
    /// Twitch application client id
    #[arg(long, env = "TWITCH_CLIENT_ID")]
    client_id: String,

    /// Twitch application client secret
    #[arg(long, env = "TWITCH_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Directory clips are saved to [default: <downloads dir>/twitch_clips]
    #[arg(long, env = "CLIP_PULSE_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Chrome/Chromium executable, detected automatically when omitted
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Seconds to wait for each clip page control
    #[arg(long, default_value = "10")]
    ui_timeout: u64,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download every recent clip of each channel in a list file
    Batch {
        /// Newline-delimited channel names
        #[arg(long, default_value = "channels.txt")]
        channels_file: PathBuf,

        /// How many days back to look for clips
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Ask for one channel and download its top clips
    Interactive,
}

fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("twitch_clips")
}

fn log_summary(report: &RunReport) {
    let saved = report.saved_files().count();
    let failed = report.failed_clips().count();
    let skipped = report
        .skipped_channels()
        .map(|c| c.channel.as_str())
        .join(", ");

    tracing::info!(saved, failed, "Run finished");
    if !skipped.is_empty() {
        tracing::warn!(channels = %skipped, "Some channels were skipped");
    }
    for failure in report.failed_clips() {
        tracing::warn!(
            clip_url = %failure.clip_url,
            title = %failure.title,
            error = %failure.error,
            "Clip not downloaded"
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber(cli.log_format)?;

    let output_dir = cli.output_dir.unwrap_or_else(default_output_dir);

    let (channels, limit) = match cli.command {
        Command::Batch {
            channels_file,
            days,
        } => (
            read_channels(&channels_file).await?,
            ClipLimit::Windowed { days },
        ),
        Command::Interactive => {
            let stdin = BufReader::new(tokio::io::stdin());
            let (channel, count) = prompt_channel_and_count(stdin, tokio::io::stdout()).await?;
            (vec![channel], ClipLimit::TopK { count })
        }
    };

    let credentials = Credentials::new(cli.client_id, cli.client_secret);
    let helix = HelixClient::new(credentials.client_id.clone());
    let driver = ChromiumDriver::new()
        .headful(cli.headful)
        .executable(cli.chrome_path);
    let extractor = ClipExtractor::new(driver).with_timeouts(ExtractTimeouts {
        ui: Duration::from_secs(cli.ui_timeout),
        ..Default::default()
    });

    let processor = ClipProcessorBuilder::new(credentials)
        .token_issuer(helix.clone())
        .clip_source(helix)
        .extractor(extractor)
        .build();

    let config = RunConfig {
        channels,
        limit,
        output_dir,
    };
    tracing::info!(
        channels = config.channels.len(),
        output_dir = %config.output_dir.display(),
        "Starting clip run"
    );

    let report = processor.run(&config).await?;
    log_summary(&report);

    Ok(())
}

//! Submits one generation task, waits for it, and prints the final status body.
//!
//! Credentials come from `--api-key`/`--bearer-token` or the `MONSTER_API_KEY`
//! and `MONSTER_BEARER_TOKEN` environment variables (a `.env` file is read if
//! present). Logs go to stderr; control them with `RUST_LOG`.
//!
//! Usage:
//! `txt2img "A castle in the middle of a snowy forest"`

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use monsterapi::{
    report, AspectRatio, CancellationToken, Credentials, GenerationRequest, Model, MonsterClient,
    PollConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "txt2img", about = "Generate images with MonsterAPI and wait for the result")]
struct Args {
    /// Text description of the image
    #[arg(default_value = "A castle in the middle of a snowy forest")]
    prompt: String,

    /// Things the image should avoid
    #[arg(long, default_value = "")]
    negprompt: String,

    #[arg(long, default_value_t = 1)]
    samples: u32,

    #[arg(long, default_value_t = 50)]
    steps: u32,

    #[arg(long, value_enum, default_value_t = AspectRatio::Square)]
    aspect_ratio: AspectRatio,

    #[arg(long, default_value_t = 7.5)]
    guidance_scale: f64,

    #[arg(long, default_value_t = 2414)]
    seed: i64,

    #[arg(long, value_enum, default_value_t = Model::Txt2img)]
    model: Model,

    /// Source image for img2img and pix2pix
    #[arg(long)]
    init_image_url: Option<String>,

    /// How far the result may drift from the source image
    #[arg(long, requires = "init_image_url")]
    strength: Option<f64>,

    #[arg(long, env = "MONSTER_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, env = "MONSTER_BEARER_TOKEN", hide_env_values = true)]
    bearer_token: String,

    /// Override the API base URL
    #[arg(long, env = "MONSTER_API_URL")]
    base_url: Option<String>,

    /// Delay between status checks, in milliseconds
    #[arg(long, default_value_t = 0)]
    poll_interval_ms: u64,

    /// Give up after this many status checks
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Cancel polling after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Download the result images into this directory
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let credentials = Credentials::new(args.api_key, args.bearer_token);
    let mut poll_config = PollConfig::default().with_interval(Duration::from_millis(args.poll_interval_ms));
    if let Some(max_attempts) = args.max_attempts {
        poll_config = poll_config.with_max_attempts(max_attempts);
    }

    let client = match &args.base_url {
        Some(base_url) => MonsterClient::new_with_url(credentials, base_url)?,
        None => MonsterClient::new(Some(credentials))?,
    }
    .with_poll_config(poll_config);

    let mut request = GenerationRequest::new(args.prompt)
        .with_negative_prompt(args.negprompt)
        .with_samples(args.samples)
        .with_steps(args.steps)
        .with_aspect_ratio(args.aspect_ratio)
        .with_guidance_scale(args.guidance_scale)
        .with_seed(args.seed);
    if let Some(url) = args.init_image_url {
        request = request.with_init_image(url, args.strength);
    }

    let handle = client
        .submit_task(args.model, &request)
        .await
        .context("failed to submit task")?;

    let cancel = CancellationToken::new();
    if let Some(secs) = args.timeout_secs {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            warn!(secs, "timeout reached, cancelling");
            cancel.cancel();
        });
    }

    let done = client
        .poll_until_complete_with(&handle, &cancel)
        .await
        .with_context(|| format!("failed waiting for task {}", handle.process_id))?;

    report(&done, io::stdout().lock())?;

    if let Some(dir) = args.download_dir {
        let files = client.download_all_images(&done, &dir).await?;
        info!(count = files.len(), dir = %dir.display(), "downloaded images");
    }

    Ok(())
}

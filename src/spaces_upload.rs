use std::cell::RefCell;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use console::{Term, style};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use spaces_upload::discovery::DEFAULT_PATTERN;
use spaces_upload::report::format_size;
use spaces_upload::{
    Acl, ContentTypeMode, Reporter, SpacesClient, SpacesConfig, TracingReporter, UploadConfig,
    UploadEvent, Uploader, plan,
};

#[derive(Parser, Debug)]
#[command(
    name = "spaces-upload",
    version = env!("CARGO_PKG_VERSION"),
    author = "Tyr Chen <tyr.chen@gmail.com>",
    about = "Upload build output to DigitalOcean Spaces",
    long_about = "Uploads the files of a build output folder to a DigitalOcean Spaces bucket, one at a time. \
                  Files are selected with glob patterns, keyed under an optional target folder, and sent with a \
                  Content-Type inferred from their extension. The first failed upload stops the run.",
    after_help = "Examples:\n  \
                  spaces-upload ./dist                            # Upload everything under ./dist\n  \
                  spaces-upload ./dist -p '**/*.zip' -t releases  # Upload zips under releases/\n  \
                  spaces-upload ./dist -p '**/*' -p '!**/*.map'   # Skip source maps\n  \
                  spaces-upload ./dist --flatten --dry-run        # Show the flattened keys only\n\n\
                  Configuration (.env):\n  \
                  DO_SPACES_REGION=nyc3\n  \
                  DO_SPACES_BUCKET=my-bucket\n  \
                  DO_SPACES_KEY=...\n  \
                  DO_SPACES_SECRET=...\n  \
                  DO_SPACES_TARGET_FOLDER=releases     # optional\n  \
                  DO_SPACES_ENDPOINT=https://...       # optional, for other S3-compatible stores\n\n\
                  For more information: https://github.com/tyrchen/swiss-knife"
)]
struct Cli {
    /// Folder containing the files to upload
    source_folder: PathBuf,

    /// Glob pattern relative to the source folder; repeat it, prefix with '!' to exclude
    #[arg(long, short = 'p', default_value = DEFAULT_PATTERN)]
    pattern: Vec<String>,

    /// Key prefix (overrides DO_SPACES_TARGET_FOLDER for this upload)
    #[arg(long, short = 't')]
    target_folder: Option<String>,

    /// Flatten directory structure (remove subdirectories)
    #[arg(long)]
    flatten: bool,

    /// Access control applied to every uploaded object
    #[arg(long, value_enum, default_value_t = Acl::Private)]
    acl: Acl,

    /// Override Content-Type for uploaded files
    #[arg(long, conflicts_with = "no_content_type")]
    content_type: Option<String>,

    /// Don't send a Content-Type at all
    #[arg(long)]
    no_content_type: bool,

    /// Perform a dry run (show what would be uploaded without uploading)
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn into_config(self, spaces: SpacesConfig) -> Result<UploadConfig> {
        let source_folder = std::path::absolute(&self.source_folder).with_context(|| {
            format!("Failed to resolve {}", self.source_folder.display())
        })?;

        let target_folder = self
            .target_folder
            .or_else(|| std::env::var("DO_SPACES_TARGET_FOLDER").ok())
            .filter(|t| !t.trim().is_empty());

        let content_type = if self.no_content_type {
            ContentTypeMode::Omit
        } else {
            ContentTypeMode::Detect {
                explicit: self.content_type,
            }
        };

        Ok(UploadConfig {
            source_folder,
            content_pattern: self.pattern.join("\n"),
            target_folder,
            flatten: self.flatten,
            acl: self.acl,
            content_type,
            spaces,
        })
    }
}

/// Interactive output: a progress bar per file and a colored summary
#[derive(Default)]
struct ConsoleReporter {
    bar: RefCell<Option<ProgressBar>>,
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: &UploadEvent<'_>) {
        match event {
            UploadEvent::Started { .. } => {
                println!("{}", style(format!("📦 {}", event)).cyan().bold());
            }
            UploadEvent::NoFiles { .. } => {
                println!("{}", style(event).yellow());
            }
            UploadEvent::FileStarted { key, .. } => {
                let pb = ProgressBar::new(0);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template(
                            "{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
                        )
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("#>-"),
                );
                pb.set_message(key.to_string());
                *self.bar.borrow_mut() = Some(pb);
            }
            UploadEvent::FileProgress { loaded, total, .. } => {
                if let Some(pb) = self.bar.borrow().as_ref() {
                    pb.set_length(*total);
                    pb.set_position(*loaded);
                }
            }
            UploadEvent::FileCompleted { path, key, bytes } => {
                if let Some(pb) = self.bar.borrow_mut().take() {
                    pb.finish_and_clear();
                }
                println!(
                    "{} {} → {} ({})",
                    style("✓").green(),
                    style(path.display()).green(),
                    key,
                    style(format_size(*bytes)).dim()
                );
            }
            UploadEvent::FileFailed { path, error } => {
                if let Some(pb) = self.bar.borrow_mut().take() {
                    pb.abandon();
                }
                eprintln!(
                    "{} {} - {}",
                    style("✗").red(),
                    style(path.display()).red(),
                    style(error).red()
                );
            }
            UploadEvent::Finished { .. } => {
                println!("\n{}", style("═".repeat(70)).dim());
                println!("{}", style(event).bold());
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file early to get LOG_LEVEL
    dotenv::dotenv().ok();

    // Initialize tracing/logging with support for LOG_LEVEL from .env
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let dry_run = cli.dry_run;

    info!("Spaces Upload v{}", env!("CARGO_PKG_VERSION"));

    let spaces = SpacesConfig::from_env().map_err(|e| anyhow!(e.user_message()))?;
    let config = cli.into_config(spaces)?;

    if dry_run {
        return print_plan(&config);
    }

    let client = SpacesClient::new(config.spaces.clone()).await;

    let result = if Term::stdout().is_term() {
        Uploader::new(&client, &ConsoleReporter::default())
            .run(&config)
            .await
    } else {
        Uploader::new(&client, &TracingReporter).run(&config).await
    };

    result.map(|_| ()).map_err(|e| anyhow!(e.user_message()))
}

/// Show what would be uploaded without touching the bucket
fn print_plan(config: &UploadConfig) -> Result<()> {
    println!(
        "{}",
        style("🔍 DRY RUN MODE - No files will be uploaded")
            .yellow()
            .bold()
    );
    println!();

    let planned = plan(config).map_err(|e| anyhow!(e.user_message()))?;

    if planned.is_empty() {
        println!(
            "{}",
            style(format!(
                "No files found in {} matching '{}'",
                config.source_folder.display(),
                config.content_pattern.replace('\n', ", ")
            ))
            .yellow()
        );
        return Ok(());
    }

    for item in &planned {
        let size = std::fs::metadata(&item.path)
            .with_context(|| format!("Failed to read {}", item.path.display()))?
            .len();

        println!(
            "  {} {} → s3://{}/{} ({}, {})",
            style("WOULD UPLOAD").green().bold(),
            item.path.display(),
            config.spaces.bucket,
            item.key,
            item.content_type.as_deref().unwrap_or("no content type"),
            format_size(size)
        );
    }

    println!(
        "\n{}",
        style(format!("{} file(s) selected", planned.len())).bold()
    );

    Ok(())
}

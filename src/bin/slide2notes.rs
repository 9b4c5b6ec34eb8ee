//! CLI binary for slide2notes.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use slide2notes::{
    extract_notes, extract_notes_to_file, ExtractionConfig, ExtractionProgressCallback,
    ProgressCallback, RunStats,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const SPINNER_TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per failure.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&SPINNER_TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning screenshots…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_images: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} images  \
             ⏱ {elapsed_precise}  ETA {eta_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&SPINNER_TICKS);

        self.bar.set_length(total_images as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Processing");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_images} images to process…"))
        ));
    }

    fn on_image_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(dim(name));
    }

    fn on_image_retry(&self, _index: usize, name: &str, attempt: u32, error: &str) {
        self.bar.println(format!(
            "  {} {}  attempt {} failed: {}",
            yellow("↻"),
            name,
            attempt,
            dim(error)
        ));
    }

    fn on_image_cached(&self, _index: usize, _total: usize, _name: &str) {
        self.bar.inc(1);
    }

    fn on_image_complete(&self, _index: usize, _total: usize, _name: &str, _body_len: usize) {
        self.bar.inc(1);
    }

    fn on_image_error(&self, _index: usize, _total: usize, name: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar
            .println(format!("  {} {}  {}", red("✗"), name, red(&msg)));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, stats: &RunStats) {
        self.bar.finish_and_clear();
        let mark = if stats.failed == 0 {
            green("✔")
        } else if stats.failed == stats.total {
            red("✘")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{} {} unique slides  ({} processed, {} cached, {} failed)",
            mark,
            bold(&stats.unique_slides.to_string()),
            stats.processed,
            stats.skipped,
            if stats.failed == 0 {
                stats.failed.to_string()
            } else {
                red(&stats.failed.to_string())
            },
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic run: captions start at y=850 on these screenshots
  slide2notes ./screenshots --caption-y 850

  # Custom output and cache locations
  slide2notes ./screenshots --caption-y 850 -o week3.md --cache-file week3-cache.json

  # Ignore previous runs and OCR everything again
  slide2notes ./screenshots --caption-y 850 --no-cache

  # JSON output (sections, stats, failures) on stdout
  slide2notes ./screenshots --caption-y 850 --json > notes.json

FINDING THE CAPTION THRESHOLD:
  Open one screenshot in an image viewer that shows pixel coordinates and
  note the Y value just above the first caption line. Text that starts
  above it is slide content; text at or below it is caption.

ENVIRONMENT VARIABLES:
  AZURE_ENDPOINT          Azure AI Vision endpoint URL
  AZURE_KEY               Azure AI Vision subscription key
  SLIDE2NOTES_CAPTION_Y   Caption threshold in pixels
  RUST_LOG                Override log filter (e.g. slide2notes=debug)

CACHING:
  Results are cached per file name with size and modified time. Re-running
  over the same folder only sends new or changed screenshots to OCR.
"#;

/// Turn lecture screenshots into grouped Markdown notes.
#[derive(Parser, Debug)]
#[command(
    name = "slide2notes",
    version,
    about = "Turn lecture screenshots into grouped Markdown notes",
    long_about = "Reads every .png/.jpg screenshot in a folder with Azure AI Vision OCR, \
splits each into slide text and captions at a fixed Y pixel, rebuilds lists and paragraphs, \
and writes one Markdown section per unique slide listing every caption seen for it.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder containing the screenshots.
    input_dir: PathBuf,

    /// Markdown file to write.
    #[arg(short, long, env = "SLIDE2NOTES_OUTPUT", default_value = "course_notes.md")]
    output: PathBuf,

    /// Y pixel where captions begin (text starting above it is slide content).
    #[arg(long = "caption-y", env = "SLIDE2NOTES_CAPTION_Y", allow_negative_numbers = true)]
    caption_y: i64,

    /// Azure AI Vision endpoint URL.
    #[arg(long, env = "AZURE_ENDPOINT")]
    endpoint: Option<String>,

    /// Azure AI Vision subscription key.
    #[arg(long, env = "AZURE_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Incremental cache file.
    #[arg(long, env = "SLIDE2NOTES_CACHE", default_value = slide2notes::cache::DEFAULT_CACHE_FILE)]
    cache_file: PathBuf,

    /// Disable the incremental cache (nothing is read or written).
    #[arg(long)]
    no_cache: bool,

    /// OCR attempts per image on connection errors.
    #[arg(long, env = "SLIDE2NOTES_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: u32,

    /// Pause between attempts in milliseconds.
    #[arg(long, env = "SLIDE2NOTES_RETRY_DELAY_MS", default_value_t = 2000)]
    retry_delay_ms: u64,

    /// Per-request OCR timeout in seconds.
    #[arg(long, env = "SLIDE2NOTES_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Print the result as JSON on stdout instead of writing Markdown.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "SLIDE2NOTES_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    if cli.json {
        let output = extract_notes(&config).await.context("Extraction failed")?;
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    let output = extract_notes_to_file(&config, &cli.output)
        .await
        .context("Extraction failed")?;

    if !cli.quiet {
        let stats = &output.stats;
        if !show_progress {
            eprintln!(
                "Processed {} images: {} via OCR, {} cached, {} failed",
                stats.total, stats.processed, stats.skipped, stats.failed
            );
            for failure in &output.failures {
                eprintln!("  {} {}", red("✗"), failure);
            }
        }
        eprintln!(
            "{}  {} slides  {}ms  →  {}",
            if stats.failed == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.unique_slides,
            stats.duration_ms,
            bold(&cli.output.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder(&cli.input_dir)
        .caption_threshold(cli.caption_y)
        .max_attempts(cli.max_attempts)
        .retry_delay_ms(cli.retry_delay_ms)
        .request_timeout_secs(cli.timeout);

    builder = if cli.no_cache {
        builder.no_cache()
    } else {
        builder.cache_path(&cli.cache_file)
    };

    if let (Some(endpoint), Some(key)) = (&cli.endpoint, &cli.key) {
        builder = builder.azure(endpoint, key);
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

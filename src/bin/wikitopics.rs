//! CLI binary for wikitopics.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, runs the pipeline and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use wikitopics::{
    collections, run, EnrichmentProgressCallback, PipelineConfig, ProgressCallback, RunOutput,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the enrichment phase plus a log
/// line per section.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Start of the in-flight request (there is never more than one).
    started: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Fetching pages…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .ok()
            .and_then(|mut t| t.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl EnrichmentProgressCallback for CliProgressCallback {
    fn on_enrichment_start(&self, total_sections: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} sections  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_sections as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Enriching");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Fetching topics for {total_sections} sections…"))
        ));
    }

    fn on_section_start(&self, page: &str, title: &str, _level: u32, _index: usize, _total: usize) {
        if let Ok(mut t) = self.started.lock() {
            *t = Some(Instant::now());
        }
        self.bar.set_message(format!("{page} → {title}"));
    }

    fn on_section_complete(&self, page: &str, title: &str, level: u32, topics: usize) {
        self.bar.println(format!(
            "  {} {} → {} {}  {}  {}",
            green("✓"),
            page,
            title,
            dim(&format!("(level {level})")),
            dim(&format!("{topics:>3} topics")),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_section_error(&self, page: &str, title: &str, level: u32, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let msg: String = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {} → {} {}  {}  {}",
            red("✗"),
            page,
            title,
            dim(&format!("(level {level})")),
            red(&msg),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_enrichment_complete(&self, requests: usize, failures: usize) {
        self.bar.finish_and_clear();
        if failures == 0 {
            eprintln!(
                "{} {} sections enriched",
                green("✔"),
                bold(&requests.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} sections enriched  ({} failed)",
                if failures == requests { red("✘") } else { cyan("⚠") },
                bold(&(requests - failures).to_string()),
                requests,
                red(&failures.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Built-in "science" collection
  wikitopics

  # Explicit pages under a custom collection name
  wikitopics --name physicists "Marie Curie" "Paul Dirac"

  # Segmentation only (no Rosette key needed)
  wikitopics --segment-only --name science

OUTPUT:
  <output-dir>/wikisections-<name>.json        sections after the size filter
  <output-dir>/sectionswithtopics-<name>.json  sections with ranked topics

ENVIRONMENT VARIABLES:
  ROSETTE_API_KEY         Rosette text-analytics API key
  WIKITOPICS_*            Fallback for every flag (see --help)
  RUST_LOG                Override the log filter
"#;

/// Segment Wikipedia articles into sections and annotate them with topics.
#[derive(Parser, Debug)]
#[command(
    name = "wikitopics",
    version,
    about = "Segment Wikipedia articles into sections and annotate them with topics",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Page titles. Defaults to the built-in collection named by --name.
    pages: Vec<String>,

    /// Collection name used in output file names.
    #[arg(short, long, env = "WIKITOPICS_NAME", default_value = "science")]
    name: String,

    /// Directory the JSON snapshots are written to.
    #[arg(short, long, env = "WIKITOPICS_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Drop sections with this many characters or more.
    #[arg(long, env = "WIKITOPICS_MAX_CHARS", default_value_t = 50_000)]
    max_chars: usize,

    /// Delay before every topic request, in milliseconds.
    #[arg(long, env = "WIKITOPICS_DELAY_MS", default_value_t = 1000)]
    delay_ms: u64,

    /// Rosette API key.
    #[arg(long, env = "ROSETTE_API_KEY", hide_env_values = true)]
    rosette_key: Option<String>,

    /// Wikipedia REST API base URL.
    #[arg(long, env = "WIKITOPICS_WIKIPEDIA_URL")]
    wikipedia_url: Option<String>,

    /// Rosette API base URL.
    #[arg(long, env = "WIKITOPICS_ROSETTE_URL")]
    rosette_url: Option<String>,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "WIKITOPICS_TIMEOUT", default_value_t = 60)]
    timeout: u64,

    /// Abort the run if any page fails to fetch.
    #[arg(long, env = "WIKITOPICS_STRICT")]
    strict: bool,

    /// Stop after writing the segmentation snapshot.
    #[arg(long, env = "WIKITOPICS_SEGMENT_ONLY")]
    segment_only: bool,

    /// Print the built-in collections and exit.
    #[arg(long)]
    list_collections: bool,

    /// Disable progress bar.
    #[arg(long, env = "WIKITOPICS_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WIKITOPICS_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "WIKITOPICS_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces the per-section INFO lines.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.segment_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.list_collections {
        for name in collections::names() {
            let pages = collections::lookup(name).unwrap_or_default();
            println!("{name}: {}", pages.join(", "));
        }
        return Ok(());
    }

    let pages = resolve_pages(&cli)?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as ProgressCallback)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    let output = run(pages, &config).await.context("Run failed")?;

    if !cli.quiet {
        print_summary(&output, &config);
    }

    Ok(())
}

/// Positional pages, or the built-in collection named by `--name`.
fn resolve_pages(cli: &Cli) -> Result<Vec<String>> {
    if !cli.pages.is_empty() {
        return Ok(cli.pages.clone());
    }
    match collections::lookup(&cli.name) {
        Some(pages) => Ok(pages.iter().map(|p| p.to_string()).collect()),
        None => anyhow::bail!(
            "No pages given and '{}' is not a built-in collection (known: {})",
            cli.name,
            collections::names().collect::<Vec<_>>().join(", ")
        ),
    }
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .name(&cli.name)
        .output_dir(&cli.output_dir)
        .max_section_chars(cli.max_chars)
        .request_delay_ms(cli.delay_ms)
        .http_timeout_secs(cli.timeout)
        .strict_fetch(cli.strict)
        .skip_enrichment(cli.segment_only);

    if let Some(ref key) = cli.rosette_key {
        builder = builder.rosette_api_key(key);
    }
    if let Some(ref url) = cli.wikipedia_url {
        builder = builder.wikipedia_base_url(url);
    }
    if let Some(ref url) = cli.rosette_url {
        builder = builder.rosette_base_url(url);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(output: &RunOutput, config: &PipelineConfig) {
    let stats = &output.stats;
    eprintln!(
        "{}  {}/{} pages  {} sections  {}ms",
        if stats.pages_failed == 0 { green("✔") } else { cyan("⚠") },
        stats.pages_fetched,
        stats.pages_requested,
        stats.sections_kept,
        stats.total_duration_ms,
    );
    if stats.sections_oversized > 0 {
        eprintln!(
            "   {} sections over {} chars dropped",
            dim(&stats.sections_oversized.to_string()),
            config.max_section_chars
        );
    }
    eprintln!("   → {}", bold(&config.checkpoint_path().display().to_string()));
    if !config.skip_enrichment {
        eprintln!(
            "   → {}  ({} requests, {} failed)",
            bold(&config.enriched_path().display().to_string()),
            stats.enrichment_requests,
            stats.enrichment_failures,
        );
    }
}

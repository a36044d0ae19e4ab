//! CLI binary for md2abs.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PublishConfig`, drives a batch run, and prints the summary.

use anyhow::{bail, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use md2abs::{
    discover_documents, publish_batch, BackendConfig, ImgurOptions, PublishConfig,
    PublishProgressCallback, S3Options,
};
use std::io;
use std::path::{Path, PathBuf};
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

/// Terminal progress: a live bar plus one log line per document. All output
/// is routed through the bar, whose printing is internally synchronised, so
/// concurrent workers never interleave mid-line.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:40.green/238}] {pos}/{len} files",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar.set_prefix("Publishing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PublishProgressCallback for CliProgress {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, document: &Path) {
        self.bar.set_message(document.display().to_string());
    }

    fn on_document_complete(&self, document: &Path, image_count: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            document.display(),
            dim(&format!("{image_count} image(s)")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, document: &Path, error: String) {
        let msg = match error.lines().next() {
            Some(first) if first.len() > 100 => format!("{}…", &first[..99]),
            Some(first) => first.to_string(),
            None => error,
        };
        self.bar.println(format!(
            "  {} {}  {}",
            red("✗"),
            document.display(),
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total_documents: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Publish one file to S3 (credentials from the usual AWS chain)
  md2abs post.md -u s3 --s3-bucket my-bucket --s3-prefix 'blog/{filename}'

  # Publish every markdown file under a directory, 4 at a time
  md2abs ./notes -x 4 -u s3 --s3-bucket my-bucket --s3-prefix assets

  # Serve images through a CloudFront domain
  md2abs post.md -u s3 --s3-bucket my-bucket --s3-prefix img \
      --s3-domain cdn.example.com

  # Force re-upload even when the remote copies are unchanged
  md2abs post.md -u s3 --s3-bucket b --s3-prefix img --override

  # Publish via Imgur
  md2abs post.md -u imgur --imgur-access-token $IMGUR_ACCESS_TOKEN

  # Write outputs into a separate directory with a custom name
  md2abs ./notes -l ./published -o '{filename}.web.md' \
      -u s3 --s3-bucket b --s3-prefix img

KEY PREFIX TEMPLATE:
  {filename}     stem of the markdown file being published
  {parent_0}     name of the file's immediate parent directory
  {random_hex}   a random 8-digit hex token, fresh per document

ENVIRONMENT VARIABLES:
  IMGUR_ACCESS_TOKEN      Imgur bearer token (same as --imgur-access-token)
  AWS_ACCESS_KEY_ID       Read by the standard AWS credential chain
  AWS_SECRET_ACCESS_KEY   when no explicit keys or profile are given
  AWS_PROFILE / AWS_REGION
"#;

/// Publish Markdown by uploading relative images and rewriting links.
#[derive(Parser, Debug)]
#[command(
    name = "md2abs",
    version,
    about = "Upload a markdown file's relative images to S3 or Imgur and rewrite the links to absolute URLs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// A markdown file, or a directory to scan.
    path: PathBuf,

    /// Glob pattern used when PATH is a directory.
    #[arg(short, long, default_value = md2abs::DEFAULT_GLOB)]
    pattern: String,

    /// Skip files whose name contains this substring (generated outputs).
    /// Pass an empty string to disable.
    #[arg(short, long, default_value = md2abs::DEFAULT_EXCLUDE)]
    exclude: String,

    /// Output filename pattern; {filename} expands to the input stem.
    #[arg(short, long, default_value = md2abs::DEFAULT_OUTPUT_PATTERN)]
    output: String,

    /// Directory for output files (must exist). Default: beside each input.
    #[arg(short, long)]
    location: Option<PathBuf>,

    /// Number of documents processed in parallel.
    #[arg(short = 'x', long, default_value_t = 1)]
    concurrency: usize,

    /// Upload destination.
    #[arg(short, long, value_enum, default_value = "s3")]
    uploader: UploaderArg,

    /// Always upload, overwriting remote objects unconditionally.
    #[arg(long = "override")]
    override_remote: bool,

    /// Skip the MD5 comparison: an existing remote object is never
    /// re-uploaded, even if its content differs.
    #[arg(long)]
    no_digest_check: bool,

    // ── S3 options ───────────────────────────────────────────────────────
    /// Target bucket (required with -u s3).
    #[arg(long)]
    s3_bucket: Option<String>,

    /// Key prefix template (required with -u s3). Supports {filename},
    /// {parent_0}, {random_hex}.
    #[arg(long)]
    s3_prefix: Option<String>,

    /// Canned ACL for uploaded objects.
    #[arg(long, default_value = "private")]
    s3_acl: String,

    /// Custom domain for URL construction (no scheme), e.g. a CloudFront
    /// distribution.
    #[arg(long)]
    s3_domain: Option<String>,

    /// Cache-Control header for uploaded objects.
    #[arg(long, default_value = "public, max-age=31536000")]
    s3_cache_control: String,

    /// AWS region.
    #[arg(long)]
    s3_region: Option<String>,

    /// Named AWS credentials profile.
    #[arg(long)]
    s3_profile: Option<String>,

    /// Explicit AWS credentials (take precedence over the profile).
    #[arg(long)]
    s3_access_key_id: Option<String>,
    #[arg(long)]
    s3_secret_access_key: Option<String>,
    #[arg(long)]
    s3_session_token: Option<String>,

    // ── Imgur options ────────────────────────────────────────────────────
    /// Imgur bearer token (required with -u imgur).
    #[arg(long, env = "IMGUR_ACCESS_TOKEN", hide_env_values = true)]
    imgur_access_token: Option<String>,

    // ── Output control ───────────────────────────────────────────────────
    /// Print the summary as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum UploaderArg {
    S3,
    Imgur,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar provides the per-document feedback; suppress INFO
    // library logs while it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Select documents ─────────────────────────────────────────────────
    let documents = discover_documents(&cli.path, &cli.pattern, &cli.exclude)?;
    if documents.is_empty() {
        bail!(
            "no markdown documents matched '{}' under {}",
            cli.pattern,
            cli.path.display()
        );
    }

    // ── Build config ─────────────────────────────────────────────────────
    let backend = build_backend(&cli)?;
    let mut builder = PublishConfig::builder(backend)
        .output_pattern(&cli.output)
        .concurrency(cli.concurrency)
        .override_remote(cli.override_remote)
        .validate_digest(!cli.no_digest_check);
    if let Some(location) = &cli.location {
        if !location.is_dir() {
            bail!("output location does not exist: {}", location.display());
        }
        builder = builder.output_dir(location);
    }
    if show_progress {
        builder = builder.progress(CliProgress::new());
    }
    let config = builder.build()?;

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = publish_batch(documents, &config).await?;

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let failed: Vec<serde_json::Value> = summary
            .failed
            .iter()
            .map(|f| {
                serde_json::json!({
                    "input": f.input,
                    "error": f.error.to_string(),
                })
            })
            .collect();
        let json = serde_json::json!({
            "succeeded": summary.succeeded,
            "failed": failed,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else if !cli.quiet {
        print_summary(&summary);
    }

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_summary(summary: &md2abs::BatchSummary) {
    eprintln!();
    if summary.failed.is_empty() {
        eprintln!(
            "{} {} document(s) published",
            green("✔"),
            bold(&summary.succeeded.len().to_string())
        );
    } else {
        eprintln!(
            "{} {}/{} document(s) published  ({} failed)",
            if summary.succeeded.is_empty() {
                red("✘")
            } else {
                cyan("⚠")
            },
            bold(&summary.succeeded.len().to_string()),
            summary.total(),
            red(&summary.failed.len().to_string()),
        );
    }

    if !summary.succeeded.is_empty() {
        eprintln!("\nSuccessful:");
        for result in &summary.succeeded {
            eprintln!(
                "  {}  {}",
                result.input.display(),
                dim(&format!("→ {}", result.output.display()))
            );
        }
    }
    if !summary.failed.is_empty() {
        eprintln!("\nFailed:");
        for failure in &summary.failed {
            eprintln!(
                "  {}  {}",
                bold(&failure.input.display().to_string()),
                red(&failure.error.to_string())
            );
        }
    }
}

/// Map CLI flags to the backend configuration, checking the per-uploader
/// required flags.
fn build_backend(cli: &Cli) -> Result<BackendConfig> {
    match cli.uploader {
        UploaderArg::S3 => {
            let bucket = match cli.s3_bucket.as_deref() {
                Some(b) if !b.is_empty() => b,
                _ => bail!("--s3-bucket is required with -u s3"),
            };
            let prefix = match cli.s3_prefix.as_deref() {
                Some(p) if !p.is_empty() => p,
                _ => bail!("--s3-prefix is required with -u s3"),
            };
            let mut options = S3Options::new(bucket, prefix);
            options.acl = Some(cli.s3_acl.clone());
            options.cache_control = Some(cli.s3_cache_control.clone());
            options.custom_domain = cli.s3_domain.clone();
            options.region = cli.s3_region.clone();
            options.profile = cli.s3_profile.clone();
            options.access_key_id = cli.s3_access_key_id.clone();
            options.secret_access_key = cli.s3_secret_access_key.clone();
            options.session_token = cli.s3_session_token.clone();
            Ok(BackendConfig::S3(options))
        }
        UploaderArg::Imgur => {
            let token = match cli.imgur_access_token.as_deref() {
                Some(t) if !t.is_empty() => t,
                _ => bail!("--imgur-access-token is required with -u imgur"),
            };
            Ok(BackendConfig::Imgur(ImgurOptions::new(token)))
        }
    }
}

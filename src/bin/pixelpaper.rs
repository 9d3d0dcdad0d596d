//! CLI binary for pixelpaper.
//!
//! A thin shim over the library crate that maps subcommands and flags to
//! the entry points in `pixelpaper::convert` and prints a size summary.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pixelpaper::prompts::{Prompter, Request};
use pixelpaper::{
    compress_image, compress_pdf, human_size, merge_pdfs, resize_image, resize_pdf, ImageStats,
    MergeStats, PageAction, ProgressCallback, Quality, ScalePercent, TranscodeConfig,
    TranscodeProgressCallback, TranscodeStats,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
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

/// Terminal progress callback: a bar over the page count plus one log line
/// per page that was rasterized or skipped.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    /// Drop the bar without a summary line, e.g. before an error is printed.
    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Processing");
        self.bar.reset_eta();
    }
}

impl TranscodeProgressCallback for CliProgressCallback {
    fn on_transcode_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, action: PageAction) {
        if action == PageAction::Rasterized {
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}  {}",
                green("✓"),
                page_num,
                total,
                dim("rasterized"),
            ));
        }
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_transcode_complete(&self, total_pages: usize, rasterized_pages: usize) {
        self.bar.finish_and_clear();
        let skipped = self.errors.load(Ordering::SeqCst);
        if skipped == 0 {
            eprintln!(
                "{} {} pages processed, {} rasterized",
                green("✔"),
                bold(&total_pages.to_string()),
                rasterized_pages
            );
        } else {
            eprintln!(
                "{} {}/{} pages kept  ({} skipped)",
                cyan("⚠"),
                bold(&(total_pages - skipped).to_string()),
                total_pages,
                red(&skipped.to_string()),
            );
        }
    }
}

/// Image-page scale for `compress-pdf` when `--percent` is not given.
const DEFAULT_COMPRESS_PERCENT: u32 = 70;

/// JPEG quality for resized JPEG images when `--jpeg-quality` is not given.
const DEFAULT_JPEG_QUALITY: u8 = 95;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Merge in the order given
  pixelpaper merge a.pdf b.pdf c.pdf -o all.pdf

  # Shrink the scanned pages of a PDF to half size, keep text pages as is
  pixelpaper compress-pdf scan.pdf -o scan-small.pdf --percent 50

  # Redraw every page at 30 % of its size
  pixelpaper resize-pdf slides.pdf -o slides-small.pdf --percent 30

  # Images
  pixelpaper resize-image photo.png -o thumb.png --percent 25
  pixelpaper compress-image photo.png -o photo.jpg --quality 70

  # Menu-driven mode
  pixelpaper interactive

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Override the log filter (e.g. pixelpaper=debug)
"#;

/// Merge, compress and resize PDFs and images.
#[derive(Parser, Debug)]
#[command(
    name = "pixelpaper",
    version,
    about = "Merge, compress and resize PDFs and images",
    long_about = "Merge PDF files, compress or resize PDFs by rasterizing their pages at a \
reduced scale, and resize or recompress raster images. Compression only rasterizes pages \
that carry images; text-only pages are copied untouched.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PIXELPAPER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PIXELPAPER_QUIET")]
    quiet: bool,

    /// Print the operation's stats as JSON on stdout.
    #[arg(long, global = true, env = "PIXELPAPER_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "PIXELPAPER_NO_PROGRESS")]
    no_progress: bool,

    /// Path to the pdfium library (file or containing directory).
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, global = true, env = "PIXELPAPER_PASSWORD")]
    password: Option<String>,

    /// Leave pages that fail to render out of the output instead of aborting.
    #[arg(long, global = true, env = "PIXELPAPER_SKIP_FAILED_PAGES")]
    skip_failed_pages: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Concatenate PDFs in the order given.
    Merge {
        /// Input PDFs.
        #[arg(required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,

        /// Merged output PDF.
        #[arg(short, long, env = "PIXELPAPER_OUTPUT")]
        output: PathBuf,
    },

    /// Rasterize pages that carry images at a reduced scale.
    CompressPdf {
        input: PathBuf,

        #[arg(short, long, env = "PIXELPAPER_OUTPUT")]
        output: PathBuf,

        /// Scale for image pages, 1–100. At 100 every page is kept as is.
        #[arg(short, long, env = "PIXELPAPER_PERCENT", default_value_t = DEFAULT_COMPRESS_PERCENT,
              value_parser = clap::value_parser!(u32).range(1..=100))]
        percent: u32,
    },

    /// Rasterize every page at a reduced scale.
    ResizePdf {
        input: PathBuf,

        #[arg(short, long, env = "PIXELPAPER_OUTPUT")]
        output: PathBuf,

        /// Page scale, 1–100.
        #[arg(short, long, env = "PIXELPAPER_PERCENT",
              value_parser = clap::value_parser!(u32).range(1..=100))]
        percent: u32,
    },

    /// Scale an image, keeping its format.
    ResizeImage {
        input: PathBuf,

        #[arg(short, long, env = "PIXELPAPER_OUTPUT")]
        output: PathBuf,

        /// Scale per side, 1–100.
        #[arg(short, long, env = "PIXELPAPER_PERCENT",
              value_parser = clap::value_parser!(u32).range(1..=100))]
        percent: u32,

        /// JPEG quality used when the image is a JPEG.
        #[arg(long, env = "PIXELPAPER_JPEG_QUALITY", default_value_t = DEFAULT_JPEG_QUALITY,
              value_parser = clap::value_parser!(u8).range(1..=100))]
        jpeg_quality: u8,
    },

    /// Re-encode an image as JPEG. The output extension becomes .jpg.
    CompressImage {
        input: PathBuf,

        #[arg(short, long, env = "PIXELPAPER_OUTPUT")]
        output: PathBuf,

        /// JPEG quality, 1 (smallest) – 100 (best).
        #[arg(long, env = "PIXELPAPER_QUALITY",
              value_parser = clap::value_parser!(u32).range(1..=100))]
        quality: u32,
    },

    /// Menu-driven prompts on stdin.
    Interactive,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = &cli.global;

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let interactive = matches!(cli.command, Command::Interactive);
    let show_progress = !global.quiet && !global.no_progress && !global.json && !interactive;
    let filter = if global.verbose {
        "debug"
    } else if global.quiet || show_progress || interactive {
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

    let mut jpeg_quality = DEFAULT_JPEG_QUALITY;
    let request = match cli.command {
        Command::Interactive => {
            let stdin = io::stdin();
            let mut prompter = Prompter::new(stdin.lock(), io::stdout());
            match prompter.request().context("Failed to read answers")? {
                Some(request) => request,
                None => std::process::exit(2),
            }
        }
        Command::Merge { inputs, output } => Request::Merge { inputs, output },
        Command::CompressPdf {
            input,
            output,
            percent,
        } => Request::CompressPdf {
            input,
            output,
            percent: ScalePercent::new(percent)?,
        },
        Command::ResizePdf {
            input,
            output,
            percent,
        } => Request::ResizePdf {
            input,
            output,
            percent: ScalePercent::new(percent)?,
        },
        Command::ResizeImage {
            input,
            output,
            percent,
            jpeg_quality: quality,
        } => {
            jpeg_quality = quality;
            Request::ResizeImage {
                input,
                output,
                percent: ScalePercent::new(percent)?,
            }
        }
        Command::CompressImage {
            input,
            output,
            quality,
        } => Request::CompressImage {
            input,
            output,
            quality: Quality::new(quality)?,
        },
    };

    run(global, request, show_progress, jpeg_quality)
}

/// Execute one request and print its summary.
fn run(
    global: &GlobalArgs,
    request: Request,
    show_progress: bool,
    jpeg_quality: u8,
) -> Result<()> {
    let renders = matches!(
        request,
        Request::CompressPdf { .. } | Request::ResizePdf { .. }
    );
    let bar = (show_progress && renders).then(CliProgressCallback::new);
    let progress: Option<ProgressCallback> = bar
        .clone()
        .map(|cb| cb as Arc<dyn TranscodeProgressCallback>);
    let clear_bar = || {
        if let Some(ref cb) = bar {
            cb.clear();
        }
    };

    match request {
        Request::Merge { inputs, output } => {
            let stats = merge_pdfs(&inputs, &output).context("Merge failed")?;
            report_merge(global, &output, &stats)
        }
        Request::CompressPdf {
            input,
            output,
            percent,
        } => {
            let config =
                build_config(global, progress, jpeg_quality).inspect_err(|_| clear_bar())?;
            let stats = compress_pdf(&input, &output, percent, &config)
                .inspect_err(|_| clear_bar())
                .with_context(|| format!("Failed to compress {}", input.display()))?;
            report_transcode(global, &output, &stats)
        }
        Request::ResizePdf {
            input,
            output,
            percent,
        } => {
            let config =
                build_config(global, progress, jpeg_quality).inspect_err(|_| clear_bar())?;
            let stats = resize_pdf(&input, &output, percent, &config)
                .inspect_err(|_| clear_bar())
                .with_context(|| format!("Failed to resize {}", input.display()))?;
            report_transcode(global, &output, &stats)
        }
        Request::ResizeImage {
            input,
            output,
            percent,
        } => {
            let config = build_config(global, None, jpeg_quality)?;
            let stats = resize_image(&input, &output, percent, &config)
                .context("Image resize failed")?;
            report_image(global, &input, &stats)
        }
        Request::CompressImage {
            input,
            output,
            quality,
        } => {
            let stats =
                compress_image(&input, &output, quality).context("Image compression failed")?;
            report_image(global, &input, &stats)
        }
    }
}

/// Map global flags to `TranscodeConfig`.
fn build_config(
    global: &GlobalArgs,
    progress: Option<ProgressCallback>,
    jpeg_quality: u8,
) -> Result<TranscodeConfig> {
    let mut builder = TranscodeConfig::builder()
        .skip_failed_pages(global.skip_failed_pages)
        .resize_jpeg_quality(jpeg_quality);

    if let Some(ref pwd) = global.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref lib) = global.pdfium_lib {
        builder = builder.pdfium_library(lib.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

// ── Reporting ────────────────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialise stats")?;
    println!("{json}");
    Ok(())
}

fn size_line(input_bytes: u64, output_bytes: u64) -> String {
    format!(
        "{} → {}",
        dim(&human_size(input_bytes)),
        bold(&human_size(output_bytes))
    )
}

fn report_merge(global: &GlobalArgs, output: &std::path::Path, stats: &MergeStats) -> Result<()> {
    if global.json {
        return print_json(stats);
    }
    if !global.quiet {
        eprintln!(
            "{}  {} files, {} pages  {}ms  →  {}",
            green("✔"),
            stats.documents,
            stats.total_pages,
            stats.duration_ms,
            bold(&output.display().to_string()),
        );
        eprintln!("   {}", size_line(stats.input_bytes, stats.output_bytes));
    }
    Ok(())
}

fn report_transcode(
    global: &GlobalArgs,
    output: &std::path::Path,
    stats: &TranscodeStats,
) -> Result<()> {
    if global.json {
        return print_json(stats);
    }
    if !global.quiet {
        eprintln!(
            "{}  {}/{} pages  ({} copied, {} rasterized)  {}ms  →  {}",
            if stats.skipped_pages == 0 {
                green("✔")
            } else {
                cyan("⚠")
            },
            stats.total_pages - stats.skipped_pages,
            stats.total_pages,
            stats.copied_pages,
            stats.rasterized_pages,
            stats.duration_ms,
            bold(&output.display().to_string()),
        );
        eprintln!("   {}", size_line(stats.input_bytes, stats.output_bytes));
    }
    Ok(())
}

fn report_image(global: &GlobalArgs, input: &std::path::Path, stats: &ImageStats) -> Result<()> {
    if global.json {
        return print_json(stats);
    }
    if !global.quiet {
        eprintln!(
            "{}  {} {}x{} → {}x{} {}  →  {}",
            green("✔"),
            input.display(),
            stats.input_width,
            stats.input_height,
            stats.output_width,
            stats.output_height,
            dim(&stats.format),
            bold(&stats.destination.display().to_string()),
        );
        eprintln!("   {}", size_line(stats.input_bytes, stats.output_bytes));
    }
    Ok(())
}

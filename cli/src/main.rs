//! epub2cbz CLI - fixed-layout EPUB to CBZ converter

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use epub2cbz::{
    CancellationToken, ConvertOptions, ConvertReport, Converter, Error, ParseOptions,
    ProgressEvent, Toolkit, ToolOptions,
};

#[derive(Parser)]
#[command(name = "epub2cbz")]
#[command(version)]
#[command(about = "Convert fixed-layout EPUB books into CBZ comic archives", long_about = None)]
struct Cli {
    /// Input EPUB file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    options: ConvertArgs,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an EPUB file to one CBZ archive per root package
    Convert {
        /// Input EPUB file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        options: ConvertArgs,
    },

    /// Show the page size and render plan without rendering
    Info {
        /// Input EPUB file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output the plan as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        options: ConvertArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
struct ConvertArgs {
    /// Directory for the output archives
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Number of concurrent probe/render workers
    #[arg(short, long, env = "EPUB2CBZ_JOBS")]
    jobs: Option<usize>,

    /// Timeout in seconds for each external tool call (0 = none)
    #[arg(long, value_name = "SECS", env = "EPUB2CBZ_TIMEOUT")]
    timeout: Option<u64>,

    /// Chrome/Chromium executable
    #[arg(long, value_name = "PROGRAM", env = "EPUB2CBZ_CHROME")]
    chrome: Option<PathBuf>,

    /// ImageMagick identify executable
    #[arg(long, value_name = "PROGRAM", env = "EPUB2CBZ_IDENTIFY")]
    identify: Option<PathBuf>,

    /// Extra render attempts for a failing page
    #[arg(long, default_value = "0")]
    retries: u32,

    /// Fail on unreadable page viewports instead of using the page size
    #[arg(long)]
    strict: bool,

    /// Probe and render one page at a time
    #[arg(long)]
    sequential: bool,
}

impl ConvertArgs {
    fn tool_options(&self) -> ToolOptions {
        let mut options = ToolOptions::new();
        if let Some(secs) = self.timeout {
            options = if secs == 0 {
                options.without_timeout()
            } else {
                options.with_timeout(Duration::from_secs(secs))
            };
        }
        if let Some(ref chrome) = self.chrome {
            options = options.with_rasterizer(chrome);
        }
        if let Some(ref identify) = self.identify {
            options = options.with_probe(identify);
        }
        options
    }

    fn convert_options(&self) -> ConvertOptions {
        // Lenient unless asked otherwise: a bad viewport only loses scaling
        let parse = if self.strict {
            ParseOptions::new()
        } else {
            ParseOptions::new().lenient()
        };
        let mut options = ConvertOptions::new()
            .with_parse_options(parse)
            .with_parallel(!self.sequential)
            .with_render_retries(self.retries);
        if let Some(ref dir) = self.output_dir {
            options = options.with_output_dir(dir);
        }
        if let Some(jobs) = self.jobs {
            options = options.with_jobs(jobs);
        }
        options
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Convert { input, options }) => cmd_convert(&input, &options),
        Some(Commands::Info {
            input,
            json,
            options,
        }) => cmd_info(&input, json, &options),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, &cli.options)
            } else {
                println!("{}", "Usage: epub2cbz <FILE>".yellow());
                println!("       epub2cbz --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Trip `cancel` on Ctrl-C.
fn watch_interrupt(cancel: CancellationToken) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("Ctrl-C handling unavailable: {}", e);
                return;
            }
        };
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\n{}", "Interrupted, cleaning up...".yellow());
                cancel.cancel();
            }
        });
    });
}

fn cmd_convert(input: &Path, args: &ConvertArgs) -> epub2cbz::Result<()> {
    let cancel = CancellationToken::new();
    watch_interrupt(cancel.clone());

    let (sender, receiver) = crossbeam_channel::unbounded();
    let options = args
        .convert_options()
        .with_cancellation(cancel)
        .with_progress(sender);
    let converter = Converter::new(Toolkit::system(&args.tool_options()), options);

    let source = input.to_path_buf();
    let worker = thread::spawn(move || converter.convert(&source));

    // The channel closes when the converter is dropped with its worker
    let mut bar: Option<ProgressBar> = None;
    for event in receiver {
        match event {
            ProgressEvent::PackageStarted {
                package,
                packages,
                name,
                pages,
                canonical,
            } => {
                let pb = ProgressBar::new(pages as u64);
                pb.set_style(progress_style());
                pb.set_message(if packages > 1 {
                    format!("[{}/{}] {} ({})", package, packages, name, canonical)
                } else {
                    format!("{} ({})", name, canonical)
                });
                bar = Some(pb);
            }
            ProgressEvent::PageRendered { .. } => {
                if let Some(ref pb) = bar {
                    pb.inc(1);
                }
            }
            ProgressEvent::PackageFinished { archive, .. } => {
                if let Some(pb) = bar.take() {
                    pb.finish_with_message(format!("{}", archive.display()));
                }
            }
            ProgressEvent::PackageFailed { package, message } => {
                if let Some(pb) = bar.take() {
                    pb.abandon_with_message(format!("package {} failed", package));
                }
                eprintln!("{}: {}", "Failed".red().bold(), message);
            }
        }
    }
    if let Some(pb) = bar.take() {
        pb.abandon();
    }

    let report = worker
        .join()
        .map_err(|_| Error::Other("conversion worker panicked".into()))??;
    print_report(&report);

    if report.is_success() {
        Ok(())
    } else {
        Err(Error::Other(format!(
            "{} of {} root packages failed",
            report.failures.len(),
            report.failures.len() + report.archives.len()
        )))
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

fn print_report(report: &ConvertReport) {
    if report.archives.is_empty() {
        return;
    }
    println!("\n{}", "Output files:".green().bold());
    let last = report.archives.len() - 1;
    for (i, archive) in report.archives.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        println!(
            "  {} {} ({} pages)",
            branch.dimmed(),
            archive.path.display(),
            archive.pages
        );
    }
    for failure in &report.failures {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failure.full_path,
            failure.error
        );
    }
}

fn cmd_info(input: &Path, json: bool, args: &ConvertArgs) -> epub2cbz::Result<()> {
    let converter = Converter::new(
        Toolkit::system(&args.tool_options()),
        args.convert_options(),
    );
    let plan = converter.plan(input)?;

    if json {
        let text = serde_json::to_string_pretty(&plan)
            .map_err(|e| Error::Other(format!("JSON serialization failed: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    println!("{}", "Book Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Root packages".bold(), plan.packages.len());

    for package in &plan.packages {
        println!();
        println!("{}", package.package.full_path.cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        if let Some(ref title) = package.title {
            println!("{}: {}", "Title".bold(), title);
        }
        println!("{}: {}", "Archive".bold(), package.archive_name);
        println!("{}: {}", "Pages".bold(), package.page_count());
        println!("{}: {}", "Images".bold(), package.survey.total());
        println!("{}: {}", "Page size".bold(), package.canonical);
        println!("{}: {}", "Max scale".bold(), package.max_scale());

        for (size, count) in package.survey.frequencies() {
            println!("  {} {} x{}", "•".dimmed(), size, count);
        }

        let scaled: Vec<_> = package.pages.iter().filter(|p| p.scale > 1.0).collect();
        if !scaled.is_empty() {
            println!("{}:", "Scaled pages".bold());
            for page in scaled {
                println!(
                    "  {} {} viewport {} scale {}",
                    "•".dimmed(),
                    page.entry.href,
                    page.viewport,
                    page.scale
                );
            }
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "epub2cbz".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Fixed-layout EPUB to CBZ converter");
    println!();
    println!("Requires: google-chrome (or --chrome), ImageMagick identify");
    println!("License: MIT");
}

//! unocr CLI - hOCR and ALTO conversion tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unocr::{
    detect_format_from_path, parse_file_with_options, FilePages, JsonFormat, OcrFormat, Page,
    ParseOptions, Size,
};

#[derive(Parser)]
#[command(name = "unocr")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert hOCR and ALTO OCR output to text and JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract plain text
    Text {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Convert to JSON
    Json {
        #[command(flatten)]
        input: InputArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Output only the first page as an object
        #[arg(long)]
        first: bool,
    },

    /// Show page information
    Info {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct InputArgs {
    /// Input hOCR or ALTO file (may be gzip-compressed)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Markup dialect (detected if not specified)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Reference size per page, in document order (e.g. "2480x3508")
    #[arg(long = "reference-size", value_name = "WxH", value_parser = parse_size)]
    reference_sizes: Vec<Size>,

    /// Decode at most this many pages
    #[arg(long, value_name = "N")]
    pages: Option<usize>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// HTML-based hOCR
    Hocr,
    /// XML-based ALTO
    Alto,
}

impl From<FormatArg> for OcrFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Hocr => OcrFormat::Hocr,
            FormatArg::Alto => OcrFormat::Alto,
        }
    }
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: f64 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let height: f64 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("size must be positive, got '{}'", s));
    }
    Ok(Size::new(width, height))
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Text { input, output } => cmd_text(&input, output.as_deref()),
        Commands::Json {
            input,
            output,
            compact,
            first,
        } => cmd_json(&input, output.as_deref(), compact, first),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Open the input as a lazy page sequence.
fn open(args: &InputArgs) -> Result<(OcrFormat, FilePages), Box<dyn std::error::Error>> {
    let format = match args.format {
        Some(format) => format.into(),
        None => detect_format_from_path(&args.file)?,
    };
    let mut options = ParseOptions::new(format);
    if !args.reference_sizes.is_empty() {
        options = options.with_reference_sizes(args.reference_sizes.clone());
    }
    log::info!("decoding {} as {}", args.file.display(), format);

    Ok((format, parse_file_with_options(&args.file, options)?))
}

/// Decode the requested pages, showing progress on stderr.
fn decode(args: &InputArgs) -> Result<(OcrFormat, Vec<Page>), Box<dyn std::error::Error>> {
    let (format, source) = open(args)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message("Decoding pages...");

    let limit = args.pages.unwrap_or(usize::MAX);
    let mut pages = Vec::new();
    for page in source.take(limit) {
        pages.push(page?);
        pb.set_message(format!("Decoded {} pages", pages.len()));
        pb.tick();
    }
    pb.finish_and_clear();

    Ok((format, pages))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_text(input: &InputArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (_, pages) = decode(input)?;
    let text = unocr::render::to_text(&pages);
    write_output(output, &text)
}

fn cmd_json(
    input: &InputArgs,
    output: Option<&Path>,
    compact: bool,
    first: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = if first {
        // Stops reading after the first page
        let (_, source) = open(input)?;
        unocr::render::to_json(&source.first_page()?, format)?
    } else {
        let (_, pages) = decode(input)?;
        unocr::render::to_json(&pages, format)?
    };

    write_output(output, &json)
}

fn cmd_info(input: &InputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (format, pages) = decode(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.file.display());
    println!("{}: {}", "Format".bold(), format);
    println!("{}: {}", "Pages".bold(), pages.len());

    for (idx, page) in pages.iter().enumerate() {
        println!();
        let title = match page.id {
            Some(ref id) => format!("Page {} ({})", idx + 1, id),
            None => format!("Page {}", idx + 1),
        };
        println!("{}", title.cyan().bold());
        println!("{}", "─".repeat(40).dimmed());

        let (width, height) = page.dimensions();
        println!("{}: {} x {}", "Size".bold(), width, height);
        if let Some(number) = page.physical_number {
            println!("{}: {}", "Physical number".bold(), number);
        }
        if let Some(ref number) = page.logical_number {
            println!("{}: {}", "Printed number".bold(), number);
        }
        if let Some(name) = page.image_source.as_ref().and_then(|s| s.file_name.as_ref()) {
            println!("{}: {}", "Image".bold(), name);
        }

        println!("{}: {}", "Blocks".bold(), page.blocks().len());
        println!("{}: {}", "Paragraphs".bold(), page.paragraphs().len());
        println!("{}: {}", "Lines".bold(), page.lines().len());
        println!("{}: {}", "Words".bold(), page.words().len());

        let features = page.features.names();
        if features.is_empty() {
            println!("{}: {}", "Features".bold(), "none".dimmed());
        } else {
            println!("{}: {}", "Features".bold(), features.join(", "));
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unocr".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("hOCR and ALTO conversion tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/unocr".dimmed());
    println!("License: MIT");
}

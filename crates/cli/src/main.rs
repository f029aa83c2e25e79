//! CLI tool for exporting teaching-material pages as PowerPoint decks.

mod fetch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use deck_core::{
    ExportReport, Exporter, PlacardSource, PresentationMetadata, SlideLayout, SlideMapper,
    SnapshotSource, Theme,
};
use deck_html::HtmlPlacardSource;
use deck_pptx::{PptxInspector, PptxWriter, SaveTarget, SavedDeck};
use fetch::HttpThumbnailFetcher;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Export teaching-material placards as a PowerPoint deck.
#[derive(Parser, Debug)]
#[command(name = "deck-export")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a .pptx deck from a rendered page or a JSON snapshot
    Export(ExportArgs),

    /// Print the text of every slide in a .pptx file
    Inspect {
        /// The .pptx file to read
        file: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Rendered HTML page or JSON snapshot
    input: PathBuf,

    /// Lesson topic (also names the output file)
    #[arg(long)]
    topic: Option<String>,

    /// Grade level shown on the title slide
    #[arg(long)]
    grade_level: Option<String>,

    /// Subject written to the document properties
    #[arg(long)]
    subject: Option<String>,

    /// Input format (default: from the file extension)
    #[arg(short, long, value_enum)]
    format: Option<InputFormat>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Colour theme
    #[arg(long, value_enum, default_value = "classic")]
    theme: ThemeName,

    /// Slide dimensions
    #[arg(long, value_enum, default_value = "standard")]
    layout: LayoutName,

    /// Download video thumbnails and store them in the deck
    #[arg(long)]
    embed_thumbnails: bool,

    /// Thumbnail download timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum InputFormat {
    Html,
    Snapshot,
}

impl InputFormat {
    /// `.json` files are snapshots; everything else is read as HTML.
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Snapshot,
            _ => Self::Html,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeName {
    Classic,
    Modern,
}

impl ThemeName {
    fn theme(self) -> Theme {
        match self {
            Self::Classic => Theme::classic(),
            Self::Modern => Theme::modern(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LayoutName {
    Standard,
    Wide,
}

impl From<LayoutName> for SlideLayout {
    fn from(name: LayoutName) -> Self {
        match name {
            LayoutName::Standard => SlideLayout::Standard16x9,
            LayoutName::Wide => SlideLayout::Wide,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Command::Export(args) => {
            let report = export(&args).await?;
            if report.skipped > 0 {
                eprintln!("Skipped {} placard(s) that could not be read", report.skipped);
            }
            if report.missing_thumbnails > 0 {
                eprintln!(
                    "{} thumbnail(s) could not be downloaded",
                    report.missing_thumbnails
                );
            }
            let location = report
                .output
                .path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or(report.file_name);
            println!("Wrote {} slide(s) to {}", report.slide_count, location);
        }
        Command::Inspect { file } => inspect(&file)?,
    }

    Ok(())
}

/// Read the input, map it to slides and write the deck.
async fn export(args: &ExportArgs) -> Result<ExportReport<SavedDeck>> {
    let format = args
        .format
        .unwrap_or_else(|| InputFormat::from_path(&args.input));
    log::debug!("Reading {} as {:?}", args.input.display(), format);

    let metadata = PresentationMetadata {
        topic: args.topic.clone(),
        grade_level: args.grade_level.clone(),
        subject: args.subject.clone(),
    };
    let theme = args.theme.theme();
    let exporter = Exporter::new(SlideMapper::new().with_theme(theme.clone()));

    let output_dir = get_output_dir(&args.input, args.output.as_deref())?;
    let writer = PptxWriter::new(args.layout.into())
        .with_theme(&theme)
        .with_target(SaveTarget::Directory(output_dir));

    match format {
        InputFormat::Html => {
            let source = HtmlPlacardSource::open(&args.input)
                .with_context(|| format!("Failed to read {}", args.input.display()))?;
            run_export(&exporter, &source, &metadata, writer, args).await
        }
        InputFormat::Snapshot => {
            let source = SnapshotSource::open(&args.input)
                .with_context(|| format!("Failed to read {}", args.input.display()))?;
            run_export(&exporter, &source, &metadata, writer, args).await
        }
    }
}

async fn run_export<P: PlacardSource>(
    exporter: &Exporter,
    source: &P,
    metadata: &PresentationMetadata,
    writer: PptxWriter,
    args: &ExportArgs,
) -> Result<ExportReport<SavedDeck>> {
    let report = if args.embed_thumbnails {
        let fetcher = HttpThumbnailFetcher::new(args.timeout)?;
        exporter
            .export_with_thumbnails(source, metadata, writer, &fetcher)
            .await?
    } else {
        exporter.export(source, metadata, writer).await?
    };
    Ok(report)
}

/// Print every slide's text and link targets.
fn inspect(path: &Path) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let slides = PptxInspector::new()
        .inspect(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", path.display()))?;

    for slide in &slides {
        println!("Slide {}:", slide.number);
        for text in &slide.texts {
            for line in text.lines() {
                println!("  {}", line);
            }
        }
        for link in &slide.links {
            println!("  -> {}", link);
        }
        if slide.pictures > 0 {
            println!("  [{} picture(s)]", slide.pictures);
        }
    }

    Ok(())
}

/// Determine where the deck is written.
fn get_output_dir(input_path: &Path, output_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => match input_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
    };

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("page.json")), InputFormat::Snapshot);
        assert_eq!(InputFormat::from_path(Path::new("page.JSON")), InputFormat::Snapshot);
        assert_eq!(InputFormat::from_path(Path::new("page.html")), InputFormat::Html);
        assert_eq!(InputFormat::from_path(Path::new("page")), InputFormat::Html);
    }

    #[test]
    fn test_output_dir_defaults_to_input_parent() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.html");
        assert_eq!(get_output_dir(&input, None).unwrap(), dir.path());
        assert_eq!(get_output_dir(Path::new("page.html"), None).unwrap(), PathBuf::from("."));

        let nested = dir.path().join("out").join("decks");
        assert_eq!(get_output_dir(&input, Some(nested.as_path())).unwrap(), nested);
        assert!(nested.is_dir());
    }

    #[test]
    fn test_cli_parses_export_flags() {
        let cli = Cli::parse_from([
            "deck-export",
            "export",
            "lesson.html",
            "--topic",
            "Cells",
            "--grade-level",
            "9",
            "--theme",
            "modern",
            "--layout",
            "wide",
            "--embed-thumbnails",
            "-v",
        ]);
        assert!(cli.verbose);
        match cli.command {
            Command::Export(args) => {
                assert_eq!(args.topic.as_deref(), Some("Cells"));
                assert_eq!(args.grade_level.as_deref(), Some("9"));
                assert!(args.embed_thumbnails);
                assert_eq!(args.timeout, 10);
                assert_eq!(SlideLayout::from(args.layout), SlideLayout::Wide);
                assert_eq!(args.theme.theme(), Theme::modern());
            }
            other => panic!("expected export, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_export_snapshot_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("lesson.json");
        std::fs::write(
            &input,
            r#"{ "metadata": { "topic": "Cells", "gradeLevel": "9" },
                 "placards": [ { "title": "Intro", "content": "- a\n- b" } ] }"#,
        )
        .unwrap();

        let cli = Cli::parse_from(["deck-export", "export", input.to_str().unwrap()]);
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        let report = export(&args).await.unwrap();

        assert_eq!(report.slide_count, 2);
        let path = report.output.path.unwrap();
        assert_eq!(path, dir.path().join("cells.pptx"));

        let slides = PptxInspector::new()
            .slide_texts(BufReader::new(File::open(&path).unwrap()))
            .unwrap();
        assert_eq!(slides[1], vec!["Intro", "a", "b"]);
    }
}

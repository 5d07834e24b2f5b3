use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pdf_editor_core::{DocumentAdapter, DEFAULT_PREVIEW_SCALE};
use pdf_editor_render::{
    default_rasterizer, OutlineRasterizer, PageRasterizer, PdfiumRasterizer, MAX_PIXEL_SIDE,
};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "pdf-editor-cli")]
#[command(about = "Inspect and edit the text of PDF pages")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print machine-readable PDF metadata.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the extracted text of a page.
    Text {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Replace the text of a page and save the result.
    Replace {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, conflicts_with = "text_file", required_unless_present = "text_file")]
        text: Option<String>,
        #[arg(long, value_name = "FILE")]
        text_file: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
    },
    /// Render a page to a PNG file.
    Render {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = DEFAULT_PREVIEW_SCALE)]
        scale: f32,
        #[arg(long, value_enum, default_value_t = Backend::Auto)]
        backend: Backend,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

/// Page rendering backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// PDFium when available, outline otherwise
    Auto,
    Pdfium,
    /// Blank page of the right size
    Outline,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    page_count: usize,
    first_page_size_pt: Option<PageSizeOutput>,
}

#[derive(Debug, Serialize)]
struct PageSizeOutput {
    width: f32,
    height: f32,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::Info { file } => run_info(&file),
        Commands::Text { file, page } => run_text(&file, page),
        Commands::Replace { file, page, text, text_file, output } => {
            run_replace(&file, page, text, text_file.as_deref(), &output)
        }
        Commands::Render { file, page, scale, backend, output } => {
            run_render(&file, page, scale, backend, output.as_deref())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn run_info(file: &Path) -> Result<()> {
    let adapter = open_document(file, DocumentAdapter::new())?;

    let first_page_size_pt = adapter
        .page_size(0)
        .map(|size| PageSizeOutput { width: size.width, height: size.height });

    let payload = InfoOutput {
        path: file.display().to_string(),
        page_count: adapter.page_count(),
        first_page_size_pt,
    };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");

    Ok(())
}

fn run_text(file: &Path, page: u32) -> Result<()> {
    let adapter = open_document(file, DocumentAdapter::new())?;
    let page_index = page_index(&adapter, page)?;

    println!("{}", adapter.page_text(page_index));

    Ok(())
}

fn run_replace(
    file: &Path,
    page: u32,
    text: Option<String>,
    text_file: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let text = match (text, text_file) {
        (Some(text), _) => text,
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("failed to read text from {}", path.display()))?,
        (None, None) => anyhow::bail!("either --text or --text-file is required"),
    };

    let mut adapter = open_document(file, DocumentAdapter::new())?;
    let page_index = page_index(&adapter, page)?;

    adapter.replace_page_text(page_index, &text)?;
    adapter.save(output)?;

    println!("{}", output.display());

    Ok(())
}

fn run_render(
    file: &Path,
    page: u32,
    scale: f32,
    backend: Backend,
    output: Option<&Path>,
) -> Result<()> {
    let rasterizer: Box<dyn PageRasterizer> = match backend {
        Backend::Auto => default_rasterizer(),
        Backend::Pdfium => Box::new(PdfiumRasterizer::bind().context("failed to load PDFium")?),
        Backend::Outline => Box::new(OutlineRasterizer),
    };

    let mut adapter = open_document(file, DocumentAdapter::with_rasterizer(rasterizer))?;
    let page_index = page_index(&adapter, page)?;

    if let Some(size) = adapter.page_size(page_index) {
        let (width, height) = size.scaled_pixels(scale);
        if width.max(height) > MAX_PIXEL_SIDE {
            anyhow::bail!(
                "--scale {scale} renders page {page} at {width}x{height} pixels, \
                 above the {MAX_PIXEL_SIDE} pixel limit"
            );
        }
    }

    let image = adapter
        .page_pixmap(page_index, scale)
        .with_context(|| format!("failed to render page {page}"))?;

    let output =
        output.map(ToOwned::to_owned).unwrap_or_else(|| default_render_output(file, page));

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    image
        .save(&output)
        .with_context(|| format!("failed to write image to {}", output.display()))?;

    println!("{}", output.display());

    Ok(())
}

fn open_document(file: &Path, mut adapter: DocumentAdapter) -> Result<DocumentAdapter> {
    ensure_pdf_exists(file)?;
    adapter.open(file).context("failed to open PDF")?;
    Ok(adapter)
}

/// Convert a 1-based page number into an index into the open document
fn page_index(adapter: &DocumentAdapter, page: u32) -> Result<usize> {
    if page == 0 {
        anyhow::bail!("--page is 1-based and must be >= 1");
    }

    let page_count = adapter.page_count();
    let index = page as usize - 1;
    if index >= page_count {
        anyhow::bail!("page {page} is out of range (document has {page_count} pages)");
    }

    Ok(index)
}

fn ensure_pdf_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn default_render_output(file: &Path, page: u32) -> PathBuf {
    let stem = file.file_stem().and_then(|name| name.to_str()).unwrap_or("page");

    file.with_file_name(format!("{stem}-page-{page}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_render_output() {
        let output = default_render_output(Path::new("/tmp/report.pdf"), 3);
        assert_eq!(output, PathBuf::from("/tmp/report-page-3.png"));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

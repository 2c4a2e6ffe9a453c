use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use ink_core::EditorError;
use ink_core::EditorResult;
use ink_editor::Editor;
use ink_editor::NativeCommand;
use ink_editor::PrintOutcome;
use ink_editor::default_pdf_path;
use ink_io::AppSettings;
use ink_io::import_file;
use ink_io::save_html;
use ink_pdf::PdfPrinter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about = "Inkpress - rich-text documents to HTML and PDF", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log editor decisions at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Import a document and write its normalized HTML
    Convert {
        input: PathBuf,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import a document and print it to PDF
    Export {
        input: PathBuf,

        /// Output file; the input's name with a `.pdf` extension when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply formatting to the whole document
    Edit(EditArgs),
}

#[derive(Debug, Args)]
struct EditArgs {
    input: PathBuf,

    /// Font size in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Font color, any CSS color value
    #[arg(long)]
    color: Option<String>,

    /// Clear inline colors
    #[arg(long)]
    remove_color: bool,

    /// Toolbar command such as `bold` or `fontSize=5`; repeatable
    #[arg(long = "command", value_name = "NAME")]
    commands: Vec<NativeCommand>,

    /// Output HTML file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also print the result to this PDF file
    #[arg(long)]
    pdf: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(code = error.code, "{}", error.message);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> EditorResult<()> {
    let settings_path = cli.config.unwrap_or_else(AppSettings::default_path);
    let settings = AppSettings::load_from(&settings_path)?;
    tracing::debug!(path = %settings_path.display(), "settings loaded");

    match cli.command {
        Command::Convert { input, output } => {
            let mut editor = open(&input, &settings)?;
            write_html(&editor.get_content(), output.as_deref())
        }
        Command::Export { input, output } => {
            let mut editor = open(&input, &settings)?;
            let target = output.unwrap_or_else(|| default_pdf_path(Some(&input)));
            if target == input {
                return Err(EditorError::new(
                    "export.would_overwrite",
                    format!("refusing to overwrite `{}`; pass --output", input.display()),
                ));
            }
            print_pdf(&mut editor, &settings, target)
        }
        Command::Edit(args) => {
            let mut editor = open(&args.input, &settings)?;
            let changed = apply_edits(&mut editor, &args);
            tracing::info!(changed, "edits applied");
            write_html(&editor.get_content(), args.output.as_deref())?;
            match args.pdf {
                Some(target) => print_pdf(&mut editor, &settings, target),
                None => Ok(()),
            }
        }
    }
}

fn open(input: &Path, settings: &AppSettings) -> EditorResult<Editor> {
    let imported = import_file(input)?;
    let mut editor = Editor::new(settings.editor.clone());
    editor.load_document(&imported.html, Some(imported.path));
    Ok(editor)
}

/// Selects everything, then runs the requested operations in a fixed order:
/// commands, size, color, color removal. Returns how many changed the
/// document.
fn apply_edits(editor: &mut Editor, args: &EditArgs) -> usize {
    editor.select_all();
    let mut changed = 0_usize;
    for command in &args.commands {
        if editor.exec_command(*command) {
            changed += 1;
        }
    }
    if let Some(size) = args.size {
        if editor.apply_font_size(size) {
            changed += 1;
        }
    }
    if let Some(color) = &args.color {
        if editor.apply_font_color(color) {
            changed += 1;
        } else {
            tracing::warn!(color, "color was not applied");
        }
    }
    if args.remove_color && editor.remove_font_color() {
        changed += 1;
    }
    changed
}

fn write_html(html: &str, output: Option<&Path>) -> EditorResult<()> {
    if let Some(path) = output {
        return save_html(path, html);
    }
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{html}").map_err(|error| {
        EditorError::new("io.write_failed", format!("failed to write to stdout: {error}"))
    })
}

fn print_pdf(editor: &mut Editor, settings: &AppSettings, target: PathBuf) -> EditorResult<()> {
    let mut printer = PdfPrinter::with_output(target);
    match editor.save_as_pdf(&mut printer, &settings.print)? {
        PrintOutcome::Saved(path) => {
            tracing::info!(path = %path.display(), "exported pdf");
            Ok(())
        }
        PrintOutcome::Canceled => Err(EditorError::new(
            "export.canceled",
            "pdf export was canceled",
        )),
    }
}

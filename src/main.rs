// Entrypoint for the CLI application.
// - Parses arguments, sets up logging and loads the configuration.
// - Activates the upload extension against a terminal host, then either
//   runs the command once or hands over to the interactive menu.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use binup::api::SourcebinClient;
use binup::clipboard::SystemClipboard;
use binup::command::{Extension, UploadCommand, UploadOptions, UPLOAD_COMMAND_ID};
use binup::config::Config;
use binup::host::Contributions;
use binup::languages::LanguageTable;
use binup::model::{Language, UrlAction};
use binup::ui::{self, ActionPolicy, SpinnerService, TerminalHost};

/// Upload a file or selection to Sourcebin
#[derive(Parser)]
#[command(name = "binup", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file (or stdin) and print the link
    #[command(group(ArgGroup::new("action").args(["open", "copy", "no_prompt"])))]
    Upload {
        /// File to upload; `-` or nothing reads stdin
        file: Option<PathBuf>,

        /// Only upload lines START:END (1-based, inclusive)
        #[arg(short, long, value_name = "START:END", value_parser = ui::parse_line_range)]
        lines: Option<(usize, usize)>,

        /// Title for the bin instead of the file name
        #[arg(short, long)]
        title: Option<String>,

        /// Open the link in the browser
        #[arg(long)]
        open: bool,

        /// Copy the link to the clipboard
        #[arg(long)]
        copy: bool,

        /// Print the link and exit without asking
        #[arg(long)]
        no_prompt: bool,
    },

    /// Interactive menu
    Menu {
        /// File to start with
        file: Option<PathBuf>,
    },

    /// List known languages, or resolve the language of a file extension
    Languages {
        /// Extension (`py`) or file name (`main.py`) to resolve
        name: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "binup=debug" } else { "warn" })
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::load()?;
    let languages = load_languages(&config)?;

    match cli.command {
        Commands::Upload {
            file,
            lines,
            title,
            open,
            copy,
            no_prompt,
        } => {
            let policy = if open {
                ActionPolicy::Preset(UrlAction::Open)
            } else if copy {
                ActionPolicy::Preset(UrlAction::Copy)
            } else if no_prompt {
                ActionPolicy::Dismiss
            } else {
                ActionPolicy::Ask
            };
            let document = ui::load_document(file.as_deref(), lines)?;
            let host = TerminalHost::new(Some(document), policy);

            let contributions = Contributions::new();
            let extension =
                Extension::activate(&contributions, upload_command(&config, languages, title)?)?;
            let result = contributions.execute(UPLOAD_COMMAND_ID, &host);
            extension.deactivate();

            match result {
                Some(Ok(outcome)) => {
                    tracing::debug!(url = outcome.url(), ?outcome, "upload finished");
                    Ok(ExitCode::SUCCESS)
                }
                _ => Ok(ExitCode::FAILURE),
            }
        }
        Commands::Menu { file } => {
            let document = match file {
                Some(path) => Some(ui::load_document(Some(&path), None)?),
                None => None,
            };
            let host = TerminalHost::new(document, ActionPolicy::Ask);

            let contributions = Contributions::new();
            let extension =
                Extension::activate(&contributions, upload_command(&config, languages, None)?)?;
            ui::main_menu(&contributions, &host)?;
            extension.deactivate();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Languages { name } => {
            match name {
                Some(name) => {
                    match languages.resolve(Some(&name), &config.upload.fallback_language) {
                        Language::Known(id) => {
                            let name = languages.get(id).map(|r| r.name.as_str()).unwrap_or("");
                            println!("{id}\t{name}");
                        }
                        Language::Fallback(marker) => println!("{marker}"),
                    }
                }
                None => {
                    for (id, record) in languages.iter() {
                        println!("{id}\t{}\t.{}", record.name, record.extension);
                    }
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_languages(config: &Config) -> Result<Arc<LanguageTable>> {
    let table = match &config.upload.language_table {
        Some(path) => LanguageTable::from_file(path)?,
        None => LanguageTable::bundled().clone(),
    };
    tracing::debug!(entries = table.len(), "language table loaded");
    Ok(Arc::new(table))
}

fn upload_command(
    config: &Config,
    languages: Arc<LanguageTable>,
    title: Option<String>,
) -> Result<UploadCommand> {
    let client = SourcebinClient::new(&config.service, Arc::clone(&languages))?;
    Ok(UploadCommand::new(
        Box::new(SpinnerService::new(client)),
        Box::new(SystemClipboard::new()),
        languages,
        UploadOptions {
            fallback_language: config.upload.fallback_language.clone(),
            untitled_title: config.upload.untitled_title.clone(),
            title_override: title,
        },
    ))
}

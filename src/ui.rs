// UI layer: a terminal stand-in for the editor. The active document is a
// file (or stdin), notifications are printed lines, action buttons are a
// `dialoguer` select, and the status bar is the interactive menu.

use std::cell::RefCell;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::style::{style, Stylize};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::PasteService;
use crate::host::{Contributions, EditorHost};
use crate::model::{Document, PasteRequest, PasteResult, UrlAction};
use crate::opener;

/// What to answer when the success notification asks for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPolicy {
    /// Ask with a select when attached to a terminal, dismiss otherwise.
    Ask,
    Preset(UrlAction),
    Dismiss,
}

pub struct TerminalHost {
    document: RefCell<Option<Document>>,
    policy: ActionPolicy,
    interactive: bool,
}

impl TerminalHost {
    pub fn new(document: Option<Document>, policy: ActionPolicy) -> Self {
        Self {
            document: RefCell::new(document),
            policy,
            interactive: io::stdin().is_terminal() && io::stderr().is_terminal(),
        }
    }

    pub fn set_document(&self, document: Document) {
        *self.document.borrow_mut() = Some(document);
    }

    fn document_label(&self) -> String {
        match self.document.borrow().as_ref() {
            Some(doc) => doc.title().unwrap_or_else(|| "untitled".into()),
            None => "no file".into(),
        }
    }
}

impl EditorHost for TerminalHost {
    fn active_document(&self) -> Option<Document> {
        self.document.borrow().clone()
    }

    fn show_error(&self, message: &str) {
        eprintln!("{}", style(message).red());
    }

    fn show_information(&self, message: &str) {
        println!("{}", style(message).green());
    }

    fn show_information_with_actions(
        &self,
        message: &str,
        actions: &[UrlAction],
    ) -> Option<UrlAction> {
        println!("{}", style(message).green());
        match self.policy {
            ActionPolicy::Preset(action) if actions.contains(&action) => Some(action),
            ActionPolicy::Ask if self.interactive => {
                let labels: Vec<&str> = actions.iter().map(UrlAction::label).collect();
                // Esc or a failed prompt counts as dismissing the notification.
                match Select::with_theme(&ColorfulTheme::default())
                    .items(&labels)
                    .default(0)
                    .interact_opt()
                {
                    Ok(choice) => choice.map(|index| actions[index]),
                    Err(err) => {
                        tracing::debug!("action prompt failed: {err}");
                        None
                    }
                }
            }
            _ => None,
        }
    }

    fn open_external(&self, url: &str) -> Result<()> {
        opener::open_url(url)
    }
}

/// Shows a spinner on stderr while the wrapped service is busy.
pub struct SpinnerService<S> {
    inner: S,
}

impl<S: PasteService> SpinnerService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: PasteService> PasteService for SpinnerService<S> {
    fn create_paste(&self, request: &PasteRequest) -> Result<PasteResult> {
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("Uploading to Sourcebin...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        let result = self.inner.create_paste(request);
        spinner.finish_and_clear();
        result
    }
}

/// Read `path` (or stdin for `None` / `-`) into a document. `lines` selects
/// a 1-based inclusive line range.
pub fn load_document(path: Option<&Path>, lines: Option<(usize, usize)>) -> Result<Document> {
    let document = match path.filter(|p| p.as_os_str() != "-") {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Document::new(Some(path.to_path_buf()), text)
        }
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Document::new(None, text)
        }
    };
    Ok(match lines {
        Some((first, last)) => {
            let selection = document.line_selection(first, last).with_context(|| {
                format!(
                    "Line {first} is past the end of {} ({} lines)",
                    document.title().unwrap_or_else(|| "stdin".to_owned()),
                    document.line_count()
                )
            })?;
            document.with_selection(selection)
        }
        None => document,
    })
}

/// Parse `A:B` (or a single line `A`) into a 1-based inclusive range.
pub fn parse_line_range(range: &str) -> Result<(usize, usize), String> {
    let (first, last) = match range.split_once(':') {
        Some((first, last)) => (first, last),
        None => (range, range),
    };
    let first: usize = first
        .trim()
        .parse()
        .map_err(|_| format!("invalid start line `{first}`"))?;
    let last: usize = last
        .trim()
        .parse()
        .map_err(|_| format!("invalid end line `{last}`"))?;
    if first == 0 || last < first {
        return Err(format!("line range `{range}` must satisfy 1 <= start <= end"));
    }
    Ok((first, last))
}

/// Main interactive menu. Lists the status-bar items contributed by
/// activated extensions, plus entries to switch file and exit.
pub fn main_menu(contributions: &Rc<Contributions>, host: &TerminalHost) -> Result<()> {
    loop {
        let status_items = contributions.status_items();
        let mut items: Vec<String> = status_items
            .iter()
            .map(|item| format!("{}  ({})", item.text, item.tooltip))
            .collect();
        items.push("Open file...".into());
        items.push("Exit".into());

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("binup [{}]", host.document_label()))
            .items(&items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(index) if index < status_items.len() => {
                let command = &status_items[index].command;
                if contributions.execute(command, host).is_none() {
                    host.show_error(&format!("command `{command}` not found"));
                }
            }
            Some(index) if index == status_items.len() => {
                let path: String = Input::new().with_prompt("File path").interact_text()?;
                match load_document(Some(&PathBuf::from(path.trim())), None) {
                    Ok(document) => host.set_document(document),
                    Err(err) => host.show_error(&format!("{err:#}")),
                }
            }
            _ => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_line_ranges() {
        assert_eq!(parse_line_range("3:7"), Ok((3, 7)));
        assert_eq!(parse_line_range("4"), Ok((4, 4)));
        assert!(parse_line_range("0:2").is_err());
        assert!(parse_line_range("5:2").is_err());
        assert!(parse_line_range("a:b").is_err());
    }

    #[test]
    fn loads_document_with_line_selection() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".py").tempfile()?;
        write!(file, "import os\nprint(1)\nprint(2)\n")?;

        let doc = load_document(Some(file.path()), Some((2, 2)))?;
        assert_eq!(doc.selected_text(), "print(1)\n");
        assert!(doc.title().unwrap().ends_with(".py"));
        Ok(())
    }

    #[test]
    fn line_range_past_the_end_is_an_error() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        write!(file, "secret = 1\npublic = 2\n")?;

        let err = load_document(Some(file.path()), Some((100, 200))).unwrap_err();
        assert!(err.to_string().contains("Line 100 is past the end"));
        assert!(err.to_string().contains("(2 lines)"));

        let doc = load_document(Some(file.path()), Some((2, 200)))?;
        assert_eq!(doc.selected_text(), "public = 2\n");
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_document(Some(Path::new("/definitely/not/here.rs")), None).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn preset_policy_answers_without_prompting() {
        let host = TerminalHost::new(None, ActionPolicy::Preset(UrlAction::Copy));
        assert_eq!(
            host.show_information_with_actions("done", &UrlAction::ALL),
            Some(UrlAction::Copy)
        );
        let host = TerminalHost::new(None, ActionPolicy::Dismiss);
        assert_eq!(host.show_information_with_actions("done", &UrlAction::ALL), None);
    }
}

// The `bin.upload` command and the extension that contributes it.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;

use crate::api::PasteService;
use crate::clipboard::ClipboardWriter;
use crate::error::BinError;
use crate::host::{
    CommandHandler, CommandRegistration, Contributions, EditorHost, StatusBarAlignment,
    StatusBarHandle, StatusBarItem,
};
use crate::languages::LanguageTable;
use crate::model::{Document, Outcome, PasteRequest, UrlAction};

pub const UPLOAD_COMMAND_ID: &str = "bin.upload";

/// Knobs that shape the request but do not come from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub fallback_language: String,
    pub untitled_title: Option<String>,
    /// Replaces the title derived from the file name.
    pub title_override: Option<String>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            fallback_language: "text".into(),
            untitled_title: None,
            title_override: None,
        }
    }
}

pub struct UploadCommand {
    service: Box<dyn PasteService>,
    clipboard: RefCell<Box<dyn ClipboardWriter>>,
    languages: Arc<LanguageTable>,
    options: UploadOptions,
}

impl UploadCommand {
    pub fn new(
        service: Box<dyn PasteService>,
        clipboard: Box<dyn ClipboardWriter>,
        languages: Arc<LanguageTable>,
        options: UploadOptions,
    ) -> Self {
        Self {
            service,
            clipboard: RefCell::new(clipboard),
            languages,
            options,
        }
    }

    /// Build the request for `document`, refusing when there is nothing to
    /// upload. The language is resolved from the file name, not from an
    /// overridden title.
    pub fn prepare(&self, document: Option<&Document>) -> Result<PasteRequest, BinError> {
        let document = document.ok_or(BinError::EmptyContent)?;
        let content = document.selected_text();
        if content.is_empty() {
            return Err(BinError::EmptyContent);
        }

        let file_title = document.title();
        let language = self
            .languages
            .resolve(file_title.as_deref(), &self.options.fallback_language);
        let title = self
            .options
            .title_override
            .clone()
            .or(file_title)
            .or_else(|| self.options.untitled_title.clone());

        Ok(PasteRequest {
            content: content.to_string(),
            language,
            title,
        })
    }

    /// One invocation, start to finish, without reporting errors.
    pub fn execute(&self, host: &dyn EditorHost) -> Result<Outcome, BinError> {
        let document = host.active_document();
        let request = self.prepare(document.as_ref())?;
        tracing::debug!(
            title = ?request.title,
            language = ?request.language,
            bytes = request.content.len(),
            "uploading"
        );

        let url = self
            .service
            .create_paste(&request)
            .map_err(|err| BinError::Upload(format!("{err:#}")))?
            .url;
        tracing::info!(%url, "bin created");

        let message = format!("Successfully uploaded to Sourcebin. Link: {url}");
        match host.show_information_with_actions(&message, &UrlAction::ALL) {
            Some(UrlAction::Open) => {
                host.open_external(&url)
                    .map_err(|err| BinError::OpenUrl(format!("{err:#}")))?;
                Ok(Outcome::Opened(url))
            }
            Some(UrlAction::Copy) => {
                self.clipboard
                    .borrow_mut()
                    .write_text(&url)
                    .map_err(|err| BinError::Clipboard(format!("{err:#}")))?;
                host.show_information("Successfully copied the URL to your clipboard.");
                Ok(Outcome::Copied(url))
            }
            None => Ok(Outcome::Dismissed(url)),
        }
    }

    /// `execute`, with any error shown to the user through the host.
    pub fn run(&self, host: &dyn EditorHost) -> Result<Outcome, BinError> {
        let result = self.execute(host);
        if let Err(err) = &result {
            tracing::warn!("{err}");
            host.show_error(&err.to_string());
        }
        result
    }
}

/// An activated extension. Owns everything it contributed; dropping it (or
/// calling `deactivate`) removes the command and the status-bar button.
pub struct Extension {
    _command: CommandRegistration,
    _status_item: StatusBarHandle,
}

impl Extension {
    pub fn activate(contributions: &Rc<Contributions>, command: UploadCommand) -> Result<Self> {
        let command = Rc::new(command);
        let handler: CommandHandler = Rc::new(move |host: &dyn EditorHost| command.run(host));
        let registration = contributions.register_command(UPLOAD_COMMAND_ID, handler)?;

        let status_item = contributions.create_status_bar_item(StatusBarItem {
            alignment: StatusBarAlignment::Right,
            priority: 1000,
            text: "Upload to Bin".into(),
            tooltip: "Upload selection/file to SourceBin".into(),
            command: UPLOAD_COMMAND_ID.into(),
        });

        tracing::debug!("extension activated");
        Ok(Self {
            _command: registration,
            _status_item: status_item,
        })
    }

    pub fn deactivate(self) {
        tracing::debug!("extension deactivated");
    }
}

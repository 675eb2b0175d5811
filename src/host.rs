// Editor host surface.
//
// `EditorHost` is what a command sees of the editor while it runs: the
// active document plus a few UI primitives. `Contributions` is the other
// half, the registry an extension writes its commands and status-bar
// items into. Registrations are guards; dropping one takes the
// contribution back out.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::error::BinError;
use crate::model::{Document, Outcome, UrlAction};

pub trait EditorHost {
    fn active_document(&self) -> Option<Document>;

    fn show_error(&self, message: &str);

    fn show_information(&self, message: &str);

    /// Show `message` with one button per action and wait for the user.
    /// `None` means the notification was dismissed.
    fn show_information_with_actions(&self, message: &str, actions: &[UrlAction])
        -> Option<UrlAction>;

    fn open_external(&self, url: &str) -> Result<()>;
}

pub type CommandHandler = Rc<dyn Fn(&dyn EditorHost) -> Result<Outcome, BinError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StatusBarAlignment {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBarItem {
    pub alignment: StatusBarAlignment,
    /// Higher priority sits further left within its alignment group.
    pub priority: i32,
    pub text: String,
    pub tooltip: String,
    pub command: String,
}

#[derive(Default)]
pub struct Contributions {
    commands: RefCell<BTreeMap<String, CommandHandler>>,
    status_items: RefCell<BTreeMap<u64, StatusBarItem>>,
    next_item: Cell<u64>,
}

impl Contributions {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn register_command(
        self: &Rc<Self>,
        id: &str,
        handler: CommandHandler,
    ) -> Result<CommandRegistration> {
        let mut commands = self.commands.borrow_mut();
        if commands.contains_key(id) {
            bail!("command `{id}` is already registered");
        }
        commands.insert(id.to_string(), handler);
        tracing::debug!(command = id, "registered command");
        Ok(CommandRegistration {
            owner: Rc::clone(self),
            id: id.to_string(),
        })
    }

    pub fn create_status_bar_item(self: &Rc<Self>, item: StatusBarItem) -> StatusBarHandle {
        let id = self.next_item.get();
        self.next_item.set(id + 1);
        tracing::debug!(text = %item.text, command = %item.command, "showing status bar item");
        self.status_items.borrow_mut().insert(id, item);
        StatusBarHandle {
            owner: Rc::clone(self),
            id,
        }
    }

    pub fn has_command(&self, id: &str) -> bool {
        self.commands.borrow().contains_key(id)
    }

    /// Run a registered command. `None` when nothing is registered under `id`.
    pub fn execute(&self, id: &str, host: &dyn EditorHost) -> Option<Result<Outcome, BinError>> {
        // Clone the handler out so the registry is not borrowed while it runs.
        let handler = self.commands.borrow().get(id).cloned()?;
        Some(handler(host))
    }

    /// Visible items, laid out left group first, then by descending priority.
    pub fn status_items(&self) -> Vec<StatusBarItem> {
        let mut items: Vec<StatusBarItem> = self.status_items.borrow().values().cloned().collect();
        items.sort_by(|a, b| {
            a.alignment
                .cmp(&b.alignment)
                .then_with(|| b.priority.cmp(&a.priority))
        });
        items
    }
}

/// Keeps a command registered for as long as it lives.
pub struct CommandRegistration {
    owner: Rc<Contributions>,
    id: String,
}

impl Drop for CommandRegistration {
    fn drop(&mut self) {
        self.owner.commands.borrow_mut().remove(&self.id);
        tracing::debug!(command = %self.id, "unregistered command");
    }
}

/// Keeps a status-bar item visible for as long as it lives.
pub struct StatusBarHandle {
    owner: Rc<Contributions>,
    id: u64,
}

impl Drop for StatusBarHandle {
    fn drop(&mut self) {
        self.owner.status_items.borrow_mut().remove(&self.id);
    }
}

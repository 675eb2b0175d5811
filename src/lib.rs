// Library root
// -----------
// This crate exposes the pieces of the `bin.upload` extension. The binary
// (`main.rs`) wires them to a terminal host.
//
// Module responsibilities:
// - `model`: documents, selections and the request/result values of an
//   upload.
// - `languages`: the static extension → Sourcebin language id table.
// - `api`: the `PasteService` seam and the blocking Sourcebin client.
// - `clipboard` / `opener`: the two local side effects of a finished upload.
// - `host`: what an editor provides (active document, notifications) and
//   the registry extensions contribute commands and status-bar items to.
// - `command`: the upload command itself and the extension that owns it.
// - `config`: layered TOML configuration.
// - `ui`: the terminal host and interactive menu.
pub mod api;
pub mod clipboard;
pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod languages;
pub mod model;
pub mod opener;
pub mod ui;

pub use error::BinError;

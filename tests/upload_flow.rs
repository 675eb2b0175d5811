use std::cell::RefCell;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use anyhow::Result;
use binup::api::SourcebinClient;
use binup::clipboard::ClipboardWriter;
use binup::command::{Extension, UploadCommand, UploadOptions, UPLOAD_COMMAND_ID};
use binup::config::{LinkStyle, Service};
use binup::host::{Contributions, EditorHost};
use binup::languages::LanguageTable;
use binup::model::{Document, Outcome, Selection, UrlAction};
use binup::BinError;

struct RecordingClipboard(Rc<RefCell<Vec<String>>>);

impl ClipboardWriter for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.0.borrow_mut().push(text.to_string());
        Ok(())
    }
}

struct ScriptedHost {
    document: Document,
    choice: Option<UrlAction>,
    errors: RefCell<Vec<String>>,
}

impl EditorHost for ScriptedHost {
    fn active_document(&self) -> Option<Document> {
        Some(self.document.clone())
    }
    fn show_error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }
    fn show_information(&self, _message: &str) {}
    fn show_information_with_actions(
        &self,
        _message: &str,
        _actions: &[UrlAction],
    ) -> Option<UrlAction> {
        self.choice
    }
    fn open_external(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}

/// Serves one request and returns its body.
fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line.trim_end().is_empty() {
                break;
            }
            let lower = line.to_ascii_lowercase();
            if let Some(value) = lower.strip_prefix("content-length:") {
                length = value.trim().parse().unwrap();
            }
        }
        let mut received = vec![0; length];
        reader.read_exact(&mut received).unwrap();
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        String::from_utf8(received).unwrap()
    });
    (base, handle)
}

fn command(base: &str, clipboard: Rc<RefCell<Vec<String>>>) -> UploadCommand {
    let languages = Arc::new(LanguageTable::bundled().clone());
    let service = Service {
        api_url: base.to_string(),
        short_url: "https://srcb.in".into(),
        link: LinkStyle::Full,
        timeout_secs: 5,
    };
    UploadCommand::new(
        Box::new(SourcebinClient::new(&service, Arc::clone(&languages)).unwrap()),
        Box::new(RecordingClipboard(clipboard)),
        languages,
        UploadOptions::default(),
    )
}

#[test]
fn selection_is_uploaded_and_link_copied() {
    let (base, server) = serve_once("200 OK", r#"{"key":"abc123"}"#);
    let clipboard = Rc::new(RefCell::new(Vec::new()));
    let contributions = Contributions::new();
    let extension = Extension::activate(&contributions, command(&base, Rc::clone(&clipboard))).unwrap();

    let host = ScriptedHost {
        document: Document::new(Some(PathBuf::from("src/lib.rs")), "use std::fs;\nfn main() {}\n")
            .with_selection(Selection::new(13, 25)),
        choice: Some(UrlAction::Copy),
        errors: RefCell::new(Vec::new()),
    };

    let outcome = contributions.execute(UPLOAD_COMMAND_ID, &host).unwrap().unwrap();
    let url = format!("{base}/abc123");
    assert_eq!(outcome, Outcome::Copied(url.clone()));
    assert_eq!(clipboard.borrow().as_slice(), [url]);

    let sent: serde_json::Value = serde_json::from_str(&server.join().unwrap()).unwrap();
    let rust = LanguageTable::bundled().find_by_extension("rs").unwrap();
    assert_eq!(sent["title"], "lib.rs");
    assert_eq!(sent["files"][0]["content"], "fn main() {}");
    assert_eq!(sent["files"][0]["languageId"], rust.0);

    extension.deactivate();
    assert!(contributions.status_items().is_empty());
}

#[test]
fn service_rejection_is_shown_to_the_user() {
    let (base, server) = serve_once("429 Too Many Requests", r#"{"message":"rate limited"}"#);
    let clipboard = Rc::new(RefCell::new(Vec::new()));
    let upload = command(&base, Rc::clone(&clipboard));

    let host = ScriptedHost {
        document: Document::new(Some(PathBuf::from("main.py")), "print(1)"),
        choice: Some(UrlAction::Copy),
        errors: RefCell::new(Vec::new()),
    };

    assert_eq!(upload.run(&host), Err(BinError::Upload("rate limited".into())));
    assert_eq!(
        host.errors.borrow().as_slice(),
        ["Uploading to Bin Failed. Error: rate limited"]
    );
    assert!(clipboard.borrow().is_empty());
    server.join().unwrap();
}

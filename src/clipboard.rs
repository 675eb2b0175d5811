// Clipboard access for the "Copy URL" action.
//
// The display-server clipboard is tried first. Headless sessions fall back
// to the platform's copy programs, in order. When every backend refuses,
// the error names each one with the reason it gave.

use std::fmt;
use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

pub trait ClipboardWriter {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// External program that reads the text to copy from stdin.
type CopyProgram = &'static [&'static str];

pub struct SystemClipboard {
    display: Option<arboard::Clipboard>,
    /// Why `display` is unset, reported once every fallback also fails.
    display_error: Option<String>,
    programs: Vec<CopyProgram>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let (display, display_error) = match arboard::Clipboard::new() {
            Ok(clipboard) => (Some(clipboard), None),
            Err(err) => {
                tracing::debug!("display clipboard unavailable: {err}");
                (None, Some(err.to_string()))
            }
        };
        Self {
            display,
            display_error,
            programs: copy_programs(),
        }
    }

    #[cfg(test)]
    fn headless(programs: Vec<CopyProgram>) -> Self {
        Self {
            display: None,
            display_error: Some("no display".into()),
            programs,
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        if let Some(display) = self.display.as_mut() {
            match display.set_text(text.to_owned()) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::debug!("display clipboard write failed: {err}");
                    self.display = None;
                    self.display_error = Some(err.to_string());
                }
            }
        }

        let mut failures = Failures::default();
        if let Some(reason) = &self.display_error {
            failures.push("display clipboard", reason);
        }
        for program in &self.programs {
            let name = program.first().copied().unwrap_or("?");
            match run_copy_program(program, text) {
                Ok(()) => {
                    tracing::debug!(program = name, "copied via fallback");
                    return Ok(());
                }
                Err(err) => {
                    tracing::debug!("{err:#}");
                    failures.push(name, format!("{err:#}"));
                }
            }
        }
        bail!("{failures}")
    }
}

#[derive(Default)]
struct Failures(Vec<(String, String)>);

impl Failures {
    fn push(&mut self, backend: impl Into<String>, reason: impl Into<String>) {
        self.0.push((backend.into(), reason.into()));
    }
}

impl fmt::Display for Failures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no clipboard is available on this system");
        }
        for (index, (backend, reason)) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{backend}: {reason}")?;
        }
        Ok(())
    }
}

fn run_copy_program(command: &[&str], text: &str) -> Result<()> {
    let (program, args) = command.split_first().context("empty copy command")?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("could not start {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(text.as_bytes())
            .with_context(|| format!("could not write to {program}"))?;
    }

    let status = child
        .wait()
        .with_context(|| format!("{program} did not exit cleanly"))?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn copy_programs() -> Vec<CopyProgram> {
    vec![&["pbcopy"] as CopyProgram]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn copy_programs() -> Vec<CopyProgram> {
    vec![
        &["wl-copy"] as CopyProgram,
        &["xclip", "-selection", "clipboard"],
        &["xsel", "--clipboard", "--input"],
    ]
}

#[cfg(target_os = "windows")]
fn copy_programs() -> Vec<CopyProgram> {
    vec![&["powershell.exe", "-NoProfile", "-Command", "$input | Set-Clipboard"] as CopyProgram]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn copy_programs() -> Vec<CopyProgram> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_an_error() {
        let err = run_copy_program(&["binup-no-such-clipboard-tool"], "x").unwrap_err();
        assert!(err.to_string().contains("could not start binup-no-such-clipboard-tool"));
    }

    #[test]
    fn empty_command_is_an_error() {
        assert!(run_copy_program(&[], "x").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn command_exit_status_is_checked() {
        assert!(run_copy_program(&["sh", "-c", "cat >/dev/null"], "x").is_ok());
        let err = run_copy_program(&["sh", "-c", "cat >/dev/null; exit 3"], "x").unwrap_err();
        assert!(err.to_string().starts_with("sh exited with"));
    }

    #[test]
    fn error_names_every_backend_that_refused() {
        let mut clipboard = SystemClipboard::headless(vec![
            &["binup-missing-copy-a"] as CopyProgram,
            &["binup-missing-copy-b"],
        ]);
        let message = clipboard.write_text("https://srcb.in/abc").unwrap_err().to_string();
        assert!(message.starts_with("display clipboard: no display; "));
        assert!(message.contains("binup-missing-copy-a: could not start binup-missing-copy-a"));
        assert!(message.contains("; binup-missing-copy-b: could not start binup-missing-copy-b"));
    }

    #[cfg(unix)]
    #[test]
    fn later_backend_succeeds_after_earlier_failure() {
        let mut clipboard = SystemClipboard::headless(vec![
            &["binup-missing-copy-a"] as CopyProgram,
            &["sh", "-c", "cat >/dev/null"],
        ]);
        assert!(clipboard.write_text("https://srcb.in/abc").is_ok());
    }

    #[test]
    fn nothing_to_try_is_reported_plainly() {
        let mut clipboard = SystemClipboard {
            display: None,
            display_error: None,
            programs: Vec::new(),
        };
        let err = clipboard.write_text("x").unwrap_err();
        assert_eq!(err.to_string(), "no clipboard is available on this system");
    }
}

// Hand a URL to the platform's default handler.

use std::process::{Command, Stdio};

use anyhow::{anyhow, bail, Context, Result};

pub fn open_url(url: &str) -> Result<()> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        bail!("refusing to open non-http url: {url}");
    }

    let mut last_err = anyhow!("no url opener available on this platform");
    for command in opener_commands() {
        match try_open(command, url) {
            Ok(()) => return Ok(()),
            Err(err) => {
                tracing::debug!("{err:#}");
                last_err = err;
            }
        }
    }
    Err(last_err)
}

fn try_open(command: &[&str], url: &str) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("opener command missing program")?;

    let status = Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("failed to spawn {program}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("{program} exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn opener_commands() -> Vec<&'static [&'static str]> {
    vec![&["open"] as &[&str]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn opener_commands() -> Vec<&'static [&'static str]> {
    vec![&["xdg-open"] as &[&str], &["gio", "open"]]
}

#[cfg(target_os = "windows")]
fn opener_commands() -> Vec<&'static [&'static str]> {
    vec![&["cmd", "/C", "start", ""] as &[&str]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn opener_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_urls() {
        let err = open_url("file:///etc/passwd").unwrap_err();
        assert!(err.to_string().contains("non-http"));
    }

    #[test]
    fn missing_program_is_reported() {
        assert!(try_open(&["binup-no-such-opener"], "https://srcb.in/x").is_err());
    }
}

// Errors that end an upload invocation.
//
// The `Display` text of each variant is exactly what the user sees in the
// error notification.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BinError {
    /// No active document, or nothing to upload in it.
    #[error("Cannot create Empty Bin.")]
    EmptyContent,
    /// The paste service rejected the request or could not be reached.
    #[error("Uploading to Bin Failed. Error: {0}")]
    Upload(String),
    #[error("Failed to copy the url. {0}")]
    Clipboard(String),
    /// The host could not hand the URL to an external opener.
    #[error("Failed to open the url. {0}")]
    OpenUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_notifications() {
        assert_eq!(BinError::EmptyContent.to_string(), "Cannot create Empty Bin.");
        assert_eq!(
            BinError::Upload("rate limited".into()).to_string(),
            "Uploading to Bin Failed. Error: rate limited"
        );
        assert_eq!(
            BinError::Clipboard("no display".into()).to_string(),
            "Failed to copy the url. no display"
        );
    }
}

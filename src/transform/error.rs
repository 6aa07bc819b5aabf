//! Transform error types.
//!
//! [`TransformError`] aborts a whole module; [`ElementError`] only ever
//! skips the element it belongs to.

use std::error::Error as _;

use thiserror::Error;

use crate::asset::ResolveError;
use crate::image::LayoutError;

/// Module-fatal errors: the caller receives no transformed output.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to parse `{id}`:\n{message}")]
    Parse { id: String, message: String },
}

/// Per-element failures. Logged and skipped; siblings are unaffected.
#[derive(Debug, Error)]
pub enum ElementError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl ElementError {
    /// The error and all of its sources on one line.
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(err) = source {
            let text = err.to_string();
            if !message.ends_with(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = err.source();
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::asset::FetchError;

    #[test]
    fn test_describe_includes_sources() {
        let err = ElementError::from(ResolveError::Fetch(FetchError::Io(
            PathBuf::from("a.png"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        )));
        let text = err.describe();
        assert!(text.contains("cannot read `a.png`"));
        assert!(text.contains("no such file"));
    }

    #[test]
    fn test_parse_error_display() {
        let err = TransformError::Parse {
            id: "src/App.tsx".into(),
            message: "Unexpected token".into(),
        };
        let text = err.to_string();
        assert!(text.contains("src/App.tsx"));
        assert!(text.contains("Unexpected token"));
    }
}

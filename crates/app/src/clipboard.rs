//! Copy recognised source text to the system clipboard

use arboard::Clipboard;
use tracing::{debug, warn};

/// Best effort; failures are logged and otherwise ignored
pub fn copy_source_text(text: &str) {
    if text.trim().is_empty() {
        return;
    }
    match Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text) {
            Ok(()) => debug!(chars = text.len(), "source text copied to clipboard"),
            Err(e) => warn!(error = %e, "failed to copy source text to clipboard"),
        },
        Err(e) => warn!(error = %e, "clipboard unavailable"),
    }
}

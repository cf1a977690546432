//! Best-effort clipboard hand-off; progression state never depends on it.

use arboard::Clipboard;

pub fn copy_text(label: &str, text: &str) -> String {
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => format!("Copied {label} to clipboard"),
        Err(err) => format!("Failed to copy {label}: {err}"),
    }
}

use crate::domain::key_inventory::{KeyEntryState, KeyInventory};
use crate::domain::public_key_record::PublicKeyRecord;

const LINE_CHAR: &str = "│";
const ELLIPSIS: &str = "...";
const FINGERPRINT_PLACEHOLDER: &str = "[error generating fingerprint]";
const DATE_FORMAT: &str = "%d %b %Y %H:%M:%S UTC";

/// ANSI 256-colour palette used when rendering key entries.
///
/// `None` leaves the text unstyled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStyle {
    pub line: Option<u8>,
    pub selected_line: Option<u8>,
    pub value: Option<u8>,
    pub deleting_label: Option<u8>,
    pub deleting_value: Option<u8>,
    /// Fingerprints longer than this are truncated.
    pub value_width: Option<usize>,
}

impl Default for KeyStyle {
    fn default() -> Self {
        Self {
            line: Some(241),
            selected_line: Some(191),
            value: Some(62),
            deleting_label: Some(204),
            deleting_value: Some(168),
            value_width: None,
        }
    }
}

impl KeyStyle {
    pub fn plain() -> Self {
        Self {
            line: None,
            selected_line: None,
            value: None,
            deleting_label: None,
            deleting_value: None,
            value_width: None,
        }
    }

    pub fn with_value_width(mut self, width: usize) -> Self {
        self.value_width = Some(width);
        self
    }
}

fn paint(text: &str, color: Option<u8>) -> String {
    match color {
        Some(code) => format!("\x1b[38;5;{code}m{text}\x1b[0m"),
        None => text.to_string(),
    }
}

/// Shortens `s` to at most `limit` characters, ending in `...` when there is
/// room for it.
pub fn truncate(s: &str, limit: usize) -> String {
    if s.chars().count() <= limit {
        return s.to_string();
    }
    if limit <= ELLIPSIS.len() {
        return s.chars().take(limit).collect();
    }
    let mut shortened: String = s.chars().take(limit - ELLIPSIS.len()).collect();
    shortened.push_str(ELLIPSIS);
    shortened
}

/// Renders one entry as two lines: the fingerprint and the date it was added.
///
/// The text is the same in every state; only the colours change.
pub fn render(record: &PublicKeyRecord, state: KeyEntryState, style: &KeyStyle) -> String {
    let fingerprint = match record.fingerprint() {
        Ok(fp) => fp.as_str(),
        Err(_) => FINGERPRINT_PLACEHOLDER,
    };
    let fingerprint = match style.value_width {
        Some(width) => truncate(fingerprint, width),
        None => fingerprint.to_string(),
    };
    let date = record.created_at().format(DATE_FORMAT).to_string();

    let (line_color, label_color, value_color) = match state {
        KeyEntryState::Normal => (style.line, None, style.value),
        KeyEntryState::Selected => (style.selected_line, None, style.value),
        KeyEntryState::PendingDeletion => (
            style.selected_line,
            style.deleting_label,
            style.deleting_value,
        ),
    };

    let line = paint(LINE_CHAR, line_color);
    format!(
        "{line} {} {}\n{line} {} {}\n\n",
        paint("Key:", label_color),
        paint(&fingerprint, value_color),
        paint("Added:", label_color),
        paint(&date, value_color),
    )
}

pub fn render_inventory(inventory: &KeyInventory, style: &KeyStyle) -> String {
    if inventory.is_empty() {
        return "No linked keys.\n".to_string();
    }
    inventory
        .records()
        .iter()
        .enumerate()
        .map(|(index, record)| render(record, inventory.state_of(index), style))
        .collect()
}

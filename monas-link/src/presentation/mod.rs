//! Presentation layer - text rendering of linked keys and the terminal link prompt.

pub mod key_entry;
pub mod terminal_link;

pub use key_entry::{render, render_inventory, truncate, KeyStyle};
pub use terminal_link::{parse_confirmation, prompt_confirmation, TerminalLinkHandler};

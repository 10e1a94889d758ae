//! Shared UI constants for layout and alignment within the question input.

/// Width (in terminal columns) reserved for the prompt marker in front of the text field.
pub(crate) const LIVE_PREFIX_COLS: u16 = 2;
pub(crate) const FOOTER_INDENT_COLS: usize = LIVE_PREFIX_COLS as usize;

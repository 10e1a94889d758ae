/// Summary information produced when a question input session exits.
#[derive(Debug, Clone)]
pub struct AppExitInfo {
    /// Number of questions emitted during the session.
    pub sent_count: usize,
    /// Text left in the composer, if any.
    pub unsent_draft: Option<String>,
    /// Why the session ended.
    pub exit_reason: ExitReason,
}

/// Reason why the question input session terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The user pressed Ctrl+C, Ctrl+D or Esc.
    UserRequested,
    /// The terminal input stream ended.
    InputClosed,
}

//! The send gate: whether a send may start right now, and the send currently waiting on an
//! attachment encode.
//!
//! A send without an attachment goes `Idle -> Idle` in one step. A send with an attachment moves
//! to `Sending` until the encode result comes back through the event loop; any trigger in the
//! meantime is rejected rather than racing the first one.

use derive_more::IsVariant;
use question_input_protocol::ConversationId;

/// Why a trigger did not start a send. None of these are errors; they are silent no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// The host disabled sending.
    Disabled,
    /// The text is empty once leading and trailing whitespace is ignored.
    EmptyText,
    /// An earlier send is still encoding its attachment.
    EncodeInFlight,
}

/// What a trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The send event was emitted immediately (no attachment).
    Sent,
    /// The attachment is being encoded; the send event follows once it completes.
    Encoding,
    Rejected(GateRejection),
}

/// Snapshot of a send taken at trigger time, completed once its encode finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingSend {
    pub request_id: u64,
    pub text: String,
    pub conversation_id: Option<ConversationId>,
}

#[derive(Debug, Default, IsVariant)]
pub(crate) enum SendState {
    #[default]
    Idle,
    Sending(PendingSend),
}

/// Whether the send control should look disabled.
///
/// A pure projection of the host flag and the current text; it is recomputed on every render
/// and never stored.
pub fn is_send_disabled(disabled: bool, text: &str) -> bool {
    disabled || text.trim().is_empty()
}

pub(crate) fn check_gate(
    disabled: bool,
    text: &str,
    state: &SendState,
) -> Result<(), GateRejection> {
    if disabled {
        return Err(GateRejection::Disabled);
    }
    if text.trim().is_empty() {
        return Err(GateRejection::EmptyText);
    }
    if state.is_sending() {
        return Err(GateRejection::EncodeInFlight);
    }
    Ok(())
}

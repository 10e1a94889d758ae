//! The question input pane: a multi-line text field, a send control and a status row.
//!
//! `QuestionInput` is the whole component. The submodules split out the pieces that have no
//! reason to know about each other: the text buffer, the send gate state machine and the status
//! row renderer.

mod footer;
mod question_input;
mod send_gate;
mod textarea;

pub use question_input::Focus;
pub use question_input::InputResult;
pub use question_input::QuestionInput;
pub use question_input::QuestionInputParams;
pub use send_gate::GateRejection;
pub use send_gate::SendOutcome;
pub use send_gate::is_send_disabled;

// Forbid accidental stdout/stderr writes in the library; the terminal belongs to the UI.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod exit;

mod app_event;
mod app_event_sender;
pub mod attachment;
mod bottom_pane;
mod clipboard_paste;
mod image_encoding;
mod question_input_app;
mod render;
mod tui;
mod ui_consts;

pub use app_event::AppEvent;
pub use app_event_sender::AppEventSender;
pub use bottom_pane::Focus;
pub use bottom_pane::GateRejection;
pub use bottom_pane::InputResult;
pub use bottom_pane::QuestionInput;
pub use bottom_pane::QuestionInputParams;
pub use bottom_pane::SendOutcome;
pub use bottom_pane::is_send_disabled;
pub use exit::AppExitInfo;
pub use exit::ExitReason;
pub use image_encoding::EncodeError;
pub use image_encoding::encode_data_url;
pub use question_input_app::QuestionInputOptions;
pub use question_input_app::run_question_input;
pub use render::renderable::Renderable;

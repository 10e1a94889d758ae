//! Application-level events used to coordinate the question input with its host.

use question_input_protocol::send_event::SendEvent;

use crate::image_encoding::EncodeError;

#[derive(Debug)]
pub enum AppEvent {
    /// A send accepted by the gate. Fire-and-forget: nothing is reported back to the composer.
    SendQuestion(SendEvent),

    /// Result of an asynchronous attachment encode. `request_id` echoes the id handed out when
    /// the send was triggered so the composer can drop results it is no longer waiting for.
    ImageEncoded {
        request_id: u64,
        result: Result<String, EncodeError>,
    },
}

//! The question input is the composer state machine for a single chat question.
//!
//! It owns:
//!
//! - The draft: the text buffer (a [`TextArea`]) and at most one image [`Attachment`], plus the
//!   inline validation error of the last file selection.
//! - The send gate and dispatcher: [`QuestionInput::try_send`] checks the gate, resolves the
//!   conversation routing, encodes the attachment (asynchronously, see
//!   [`crate::image_encoding`]) and emits [`AppEvent::SendQuestion`].
//! - Trigger mapping: Enter in the text field, Enter/Space on the focused send control, and a left
//!   click on the send control all funnel into `try_send`.
//!
//! # Enter handling
//!
//! Enter in the text field never inserts a newline on its own. Without Shift it triggers a send;
//! with Shift it inserts `\n`. While an input-method composition is active (the host reports it
//! through [`QuestionInput::set_composing`]) Enter is ignored entirely so committing a candidate
//! cannot submit a half-typed question.
//!
//! # Sending state
//!
//! A send with an attachment suspends until the encode result arrives through the app event
//! channel ([`QuestionInput::on_image_encoded`]). The text and conversation id are captured when
//! the send is triggered. Further triggers are rejected until the result is in. On success the
//! event is emitted and, with `clear_on_send`, the draft is reset. On failure nothing is sent, the
//! draft is left as it was, and the footer says so until the next send or file selection.

use std::cell::Cell;
use std::path::Path;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use question_input_protocol::ConversationId;
use question_input_protocol::send_event::SendEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Position;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

use super::footer::FOOTER_HEIGHT;
use super::footer::FooterProps;
use super::footer::render_footer;
use super::send_gate::PendingSend;
use super::send_gate::SendOutcome;
use super::send_gate::SendState;
use super::send_gate::check_gate;
use super::send_gate::is_send_disabled;
use super::textarea::TextArea;
use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::attachment::Attachment;
use crate::attachment::AttachmentRejected;
use crate::attachment::SelectedFile;
use crate::attachment::validate_attachment;
use crate::clipboard_paste::is_image_path;
use crate::clipboard_paste::normalize_pasted_path;
use crate::image_encoding::EncodeError;
use crate::image_encoding::ImageEncoder;
use crate::render::renderable::Renderable;
use crate::ui_consts::LIVE_PREFIX_COLS;

const SEND_BUTTON_LABEL: &str = "[ Send ]";
const SEND_BUTTON_COLS: u16 = SEND_BUTTON_LABEL.len() as u16;

/// Footer notice after a send was dropped because its attachment could not be encoded.
pub const IMAGE_UNREADABLE_MESSAGE: &str = "Could not read the image; question not sent.";

/// Result returned when the user interacts with the question input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    /// The question was emitted.
    Sent,
    /// The question will be emitted once its attachment is encoded.
    Encoding,
    None,
}

impl From<SendOutcome> for InputResult {
    fn from(outcome: SendOutcome) -> Self {
        match outcome {
            SendOutcome::Sent => InputResult::Sent,
            SendOutcome::Encoding => InputResult::Encoding,
            SendOutcome::Rejected(_) => InputResult::None,
        }
    }
}

/// Which control receives key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    TextField,
    SendButton,
}

/// Host-provided configuration.
pub struct QuestionInputParams {
    pub app_event_tx: AppEventSender,
    pub placeholder_text: String,
    /// Forces the send gate closed and disables the file input.
    pub disabled: bool,
    /// Reset the draft after every successful send.
    pub clear_on_send: bool,
    /// Echoed into every emitted [`SendEvent`].
    pub conversation_id: Option<ConversationId>,
}

pub struct QuestionInput {
    textarea: TextArea,
    attachment: Option<Attachment>,
    file_error: Option<AttachmentRejected>,
    send_error: Option<&'static str>,
    app_event_tx: AppEventSender,
    image_encoder: ImageEncoder,
    placeholder_text: String,
    disabled: bool,
    clear_on_send: bool,
    conversation_id: Option<ConversationId>,
    /// An input-method composition is in progress.
    composing: bool,
    focus: Focus,
    send_state: SendState,
    next_request_id: u64,
    /// Where the send control was last drawn, for mouse hit testing.
    send_button_area: Cell<Option<Rect>>,
}

impl QuestionInput {
    pub fn new(params: QuestionInputParams) -> Self {
        let QuestionInputParams {
            app_event_tx,
            placeholder_text,
            disabled,
            clear_on_send,
            conversation_id,
        } = params;
        Self {
            textarea: TextArea::new(),
            attachment: None,
            file_error: None,
            send_error: None,
            image_encoder: ImageEncoder::new(app_event_tx.clone()),
            app_event_tx,
            placeholder_text,
            disabled,
            clear_on_send,
            conversation_id,
            composing: false,
            focus: Focus::TextField,
            send_state: SendState::Idle,
            next_request_id: 0,
            send_button_area: Cell::new(None),
        }
    }

    pub fn text(&self) -> &str {
        self.textarea.text()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Inline message from the last rejected file selection.
    pub fn file_error(&self) -> Option<&str> {
        self.file_error.as_ref().map(AttachmentRejected::message)
    }

    /// Notice from the last send that was dropped, if any.
    pub fn send_error(&self) -> Option<&str> {
        self.send_error
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn is_sending(&self) -> bool {
        self.send_state.is_sending()
    }

    /// Whether the send control should look disabled right now.
    pub fn is_send_disabled(&self) -> bool {
        is_send_disabled(self.disabled, self.textarea.text())
    }

    /// Replace the text verbatim (an empty string included).
    pub fn set_text(&mut self, text: String) {
        self.textarea.set_text(&text);
    }

    /// Validate `file` and stage it, or record why it was rejected.
    ///
    /// Any previous error is cleared first. On rejection the previously staged attachment is
    /// dropped as well, so the error never sits next to an attachment.
    pub fn select_file(&mut self, file: SelectedFile) {
        self.file_error = None;
        self.send_error = None;
        match validate_attachment(file) {
            Ok(attachment) => {
                tracing::debug!(
                    path = %attachment.path().display(),
                    size = attachment.size_bytes(),
                    "attachment selected"
                );
                self.attachment = Some(attachment);
            }
            Err(rejected) => {
                tracing::debug!("attachment rejected: {rejected}");
                self.attachment = None;
                self.file_error = Some(rejected);
            }
        }
    }

    /// Drop the staged attachment (and any error from selecting it).
    pub fn clear_attachment(&mut self) {
        self.attachment = None;
        self.file_error = None;
        self.send_error = None;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_clear_on_send(&mut self, clear_on_send: bool) {
        self.clear_on_send = clear_on_send;
    }

    pub fn set_conversation_id(&mut self, conversation_id: Option<ConversationId>) {
        self.conversation_id = conversation_id;
    }

    /// Report whether an input-method composition is in progress.
    pub fn set_composing(&mut self, composing: bool) {
        self.composing = composing;
    }

    /// Integrate pasted text.
    ///
    /// A paste that names an existing image file acts as a file selection (the terminal stand-in
    /// for the file input). Anything else is inserted as text.
    pub fn handle_paste(&mut self, pasted: String) -> bool {
        if !self.disabled
            && let Some(path) = normalize_pasted_path(&pasted)
            && self.select_file_path(&path)
        {
            return true;
        }
        let normalized = pasted.replace("\r\n", "\n").replace('\r', "\n");
        self.textarea.insert_str(&normalized);
        self.focus = Focus::TextField;
        true
    }

    /// Offer `path` to the file input. Returns `false` when the path is not an image file that
    /// can be stat'ed; the caller then treats it as plain text.
    pub fn select_file_path(&mut self, path: &Path) -> bool {
        if !is_image_path(path) {
            return false;
        }
        match SelectedFile::from_path(path) {
            Ok(file) => {
                self.select_file(file);
                true
            }
            Err(err) => {
                tracing::trace!("not attaching pasted path: {err}");
                false
            }
        }
    }

    /// Trigger a send.
    ///
    /// Gate rejections are silent no-ops. Without an attachment the event is emitted before this
    /// returns; with one, the encode is spawned and the event follows from
    /// [`QuestionInput::on_image_encoded`].
    pub fn try_send(&mut self) -> SendOutcome {
        if let Err(rejection) = check_gate(self.disabled, self.textarea.text(), &self.send_state) {
            tracing::debug!(?rejection, "send rejected");
            return SendOutcome::Rejected(rejection);
        }
        self.send_error = None;

        let text = self.textarea.text().to_string();
        let conversation_id = self.conversation_id.clone();
        match self.attachment.clone() {
            None => {
                self.emit(SendEvent {
                    text,
                    conversation_id,
                    encoded_image: None,
                });
                SendOutcome::Sent
            }
            Some(attachment) => {
                let request_id = self.next_request_id;
                self.next_request_id = self.next_request_id.wrapping_add(1);
                tracing::debug!(request_id, "encoding attachment before send");
                self.image_encoder.spawn(request_id, attachment);
                self.send_state = SendState::Sending(PendingSend {
                    request_id,
                    text,
                    conversation_id,
                });
                SendOutcome::Encoding
            }
        }
    }

    /// Finish (or abandon) the send waiting on encode `request_id`.
    ///
    /// Results for anything other than the in-flight send are ignored. Returns whether the state
    /// changed.
    pub fn on_image_encoded(
        &mut self,
        request_id: u64,
        result: Result<String, EncodeError>,
    ) -> bool {
        let pending = match std::mem::take(&mut self.send_state) {
            SendState::Sending(pending) if pending.request_id == request_id => pending,
            other => {
                self.send_state = other;
                tracing::debug!(request_id, "ignoring stale image encode result");
                return false;
            }
        };

        match result {
            Ok(encoded_image) => self.emit(SendEvent {
                text: pending.text,
                conversation_id: pending.conversation_id,
                encoded_image: Some(encoded_image),
            }),
            Err(err) => {
                tracing::warn!("question not sent, attachment could not be encoded: {err}");
                self.send_error = Some(IMAGE_UNREADABLE_MESSAGE);
            }
        }
        true
    }

    fn emit(&mut self, event: SendEvent) {
        tracing::debug!(
            chars = event.text.chars().count(),
            has_image = event.has_image(),
            "question sent"
        );
        self.app_event_tx.send(AppEvent::SendQuestion(event));
        if self.clear_on_send {
            self.textarea.set_text("");
            self.attachment = None;
        }
    }

    /// Handle a key event coming from the host.
    ///
    /// Returns the send result (if the key triggered one) and whether a redraw is needed.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        if key_event.kind == KeyEventKind::Release {
            return (InputResult::None, false);
        }

        match key_event.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::TextField => Focus::SendButton,
                    Focus::SendButton => Focus::TextField,
                };
                return (InputResult::None, true);
            }
            KeyCode::Char(c)
                if key_event.modifiers.contains(KeyModifiers::CONTROL)
                    && c.eq_ignore_ascii_case(&'x') =>
            {
                let changed = self.attachment.is_some()
                    || self.file_error.is_some()
                    || self.send_error.is_some();
                self.clear_attachment();
                return (InputResult::None, changed);
            }
            _ => {}
        }

        match self.focus {
            Focus::TextField => self.handle_text_field_key(key_event),
            Focus::SendButton => self.handle_send_button_key(key_event),
        }
    }

    fn handle_text_field_key(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        if key_event.code != KeyCode::Enter {
            let changed = self.textarea.input(key_event);
            return (InputResult::None, changed);
        }
        if self.composing {
            return (InputResult::None, false);
        }
        if key_event.modifiers.contains(KeyModifiers::SHIFT) {
            self.textarea.insert_str("\n");
            return (InputResult::None, true);
        }
        (self.try_send().into(), true)
    }

    fn handle_send_button_key(&mut self, key_event: KeyEvent) -> (InputResult, bool) {
        match key_event.code {
            KeyCode::Enter | KeyCode::Char(' ') => (self.try_send().into(), true),
            _ => (InputResult::None, false),
        }
    }

    /// Handle a mouse event. A left click on the send control triggers a send; a click anywhere
    /// else inside the last rendered area focuses the text field.
    pub fn handle_mouse_event(&mut self, mouse_event: MouseEvent) -> (InputResult, bool) {
        if mouse_event.kind != MouseEventKind::Down(MouseButton::Left) {
            return (InputResult::None, false);
        }
        let position = Position::new(mouse_event.column, mouse_event.row);
        if self
            .send_button_area
            .get()
            .is_some_and(|area| area.contains(position))
        {
            self.focus = Focus::SendButton;
            return (self.try_send().into(), true);
        }
        if self.focus != Focus::TextField {
            self.focus = Focus::TextField;
            return (InputResult::None, true);
        }
        (InputResult::None, false)
    }

    fn footer_props<'a>(&'a self, attachment_name: Option<&'a str>) -> FooterProps<'a> {
        FooterProps {
            sending: self.is_sending(),
            send_error: self.send_error,
            file_error: self.file_error(),
            attachment: self
                .attachment
                .as_ref()
                .zip(attachment_name)
                .map(|(attachment, name)| (name, attachment.size_bytes())),
            file_input_enabled: !self.disabled,
        }
    }

    /// `[composer, textarea, send button, footer]`
    fn layout_areas(&self, area: Rect) -> [Rect; 4] {
        let footer_height = FOOTER_HEIGHT.min(area.height);
        let composer_rect = Rect {
            height: area.height - footer_height,
            ..area
        };
        let footer_rect = Rect {
            y: composer_rect.bottom(),
            height: footer_height,
            ..area
        };
        let right_cols = SEND_BUTTON_COLS + 2;
        let textarea_rect = Rect {
            x: composer_rect.x + LIVE_PREFIX_COLS,
            y: composer_rect.y + 1,
            width: composer_rect
                .width
                .saturating_sub(LIVE_PREFIX_COLS + right_cols),
            height: composer_rect.height.saturating_sub(2),
        }
        .intersection(composer_rect);
        let button_rect = Rect {
            x: composer_rect
                .right()
                .saturating_sub(SEND_BUTTON_COLS + 1)
                .max(composer_rect.x),
            y: composer_rect.y + 1,
            width: SEND_BUTTON_COLS.min(composer_rect.width),
            height: 1,
        }
        .intersection(composer_rect);
        [composer_rect, textarea_rect, button_rect, footer_rect]
    }

    fn text_width(width: u16) -> u16 {
        width.saturating_sub(LIVE_PREFIX_COLS + SEND_BUTTON_COLS + 2)
    }

    fn send_button_span(&self) -> Span<'static> {
        let span = Span::from(SEND_BUTTON_LABEL);
        let span = if self.is_send_disabled() {
            span.dim()
        } else {
            span.cyan().bold()
        };
        if self.focus == Focus::SendButton {
            span.reversed()
        } else {
            span
        }
    }
}

impl Renderable for QuestionInput {
    fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if self.focus != Focus::TextField {
            return None;
        }
        let [_, textarea_rect, _, _] = self.layout_areas(area);
        self.textarea.cursor_pos(textarea_rect)
    }

    fn desired_height(&self, width: u16) -> u16 {
        self.textarea
            .desired_height(Self::text_width(width))
            .saturating_add(2)
            .saturating_add(FOOTER_HEIGHT)
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        let [composer_rect, textarea_rect, button_rect, footer_rect] = self.layout_areas(area);

        if !textarea_rect.is_empty() {
            buf.set_span(
                composer_rect.x,
                textarea_rect.y,
                &"›".bold(),
                LIVE_PREFIX_COLS,
            );
        }

        if self.textarea.is_empty() {
            let placeholder = Line::from(self.placeholder_text.clone().dim());
            placeholder.render(textarea_rect, buf);
        } else {
            self.textarea.render(textarea_rect, buf);
        }

        if button_rect.is_empty() {
            self.send_button_area.set(None);
        } else {
            buf.set_span(
                button_rect.x,
                button_rect.y,
                &self.send_button_span(),
                button_rect.width,
            );
            self.send_button_area.set(Some(button_rect));
        }

        let name = self.attachment.as_ref().map(Attachment::display_name);
        render_footer(footer_rect, buf, self.footer_props(name.as_deref()));
    }
}

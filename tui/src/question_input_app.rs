//! Interactive host for [`QuestionInput`]: owns the terminal, the event loop and the app event
//! channel, and hands every emitted question to the caller.

use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use question_input_protocol::ConversationId;
use question_input_protocol::send_event::SendEvent;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;

use crate::AppExitInfo;
use crate::ExitReason;
use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::bottom_pane::QuestionInput;
use crate::bottom_pane::QuestionInputParams;
use crate::render::renderable::Renderable;
use crate::tui;

/// Host configuration for an interactive session.
#[derive(Debug, Clone)]
pub struct QuestionInputOptions {
    pub placeholder_text: String,
    pub disabled: bool,
    pub clear_on_send: bool,
    pub conversation_id: Option<ConversationId>,
}

/// Run the question input until the user quits.
///
/// `on_send` is invoked from the event loop for every emitted question. Its outcome is not
/// reported back to the input.
pub async fn run_question_input<F>(
    options: QuestionInputOptions,
    on_send: F,
) -> anyhow::Result<AppExitInfo>
where
    F: FnMut(SendEvent),
{
    let mut terminal = tui::init()?;
    let result = run_with_terminal(&mut terminal, options, on_send).await;
    tui::restore()?;
    result
}

async fn run_with_terminal<F>(
    terminal: &mut tui::Terminal,
    options: QuestionInputOptions,
    mut on_send: F,
) -> anyhow::Result<AppExitInfo>
where
    F: FnMut(SendEvent),
{
    let (app_event_tx_raw, mut app_event_rx) = unbounded_channel::<AppEvent>();
    let QuestionInputOptions {
        placeholder_text,
        disabled,
        clear_on_send,
        conversation_id,
    } = options;
    let mut input = QuestionInput::new(QuestionInputParams {
        app_event_tx: AppEventSender::new(app_event_tx_raw),
        placeholder_text,
        disabled,
        clear_on_send,
        conversation_id,
    });
    let mut transcript = Transcript::default();
    let mut terminal_events = EventStream::new();

    draw(terminal, &input, &transcript)?;
    let exit_reason = loop {
        let needs_redraw = tokio::select! {
            maybe_event = terminal_events.next() => {
                let Some(event) = maybe_event else {
                    break ExitReason::InputClosed;
                };
                match event? {
                    Event::Key(key_event) if is_quit_key(key_event) => {
                        break ExitReason::UserRequested;
                    }
                    Event::Key(key_event) => input.handle_key_event(key_event).1,
                    Event::Mouse(mouse_event) => input.handle_mouse_event(mouse_event).1,
                    Event::Paste(pasted) => input.handle_paste(pasted),
                    Event::Resize(_, _) => true,
                    Event::FocusGained | Event::FocusLost => false,
                }
            }
            Some(app_event) = app_event_rx.recv() => match app_event {
                AppEvent::SendQuestion(event) => {
                    transcript.record(&event);
                    on_send(event);
                    true
                }
                AppEvent::ImageEncoded { request_id, result } => {
                    input.on_image_encoded(request_id, result)
                }
            },
        };
        if needs_redraw {
            draw(terminal, &input, &transcript)?;
        }
    };

    let draft = input.text();
    Ok(AppExitInfo {
        sent_count: transcript.sent_count,
        unsent_draft: (!draft.is_empty()).then(|| draft.to_string()),
        exit_reason,
    })
}

fn is_quit_key(key_event: KeyEvent) -> bool {
    if key_event.kind == KeyEventKind::Release {
        return false;
    }
    match key_event.code {
        KeyCode::Esc => true,
        KeyCode::Char(c) => {
            key_event.modifiers.contains(KeyModifiers::CONTROL)
                && (c.eq_ignore_ascii_case(&'c') || c.eq_ignore_ascii_case(&'d'))
        }
        _ => false,
    }
}

fn draw(
    terminal: &mut tui::Terminal,
    input: &QuestionInput,
    transcript: &Transcript,
) -> std::io::Result<()> {
    terminal.draw(|frame| {
        let area = frame.area();
        let input_height = input.desired_height(area.width).min(area.height);
        let input_area = Rect {
            y: area.bottom() - input_height,
            height: input_height,
            ..area
        };
        let transcript_area = Rect {
            height: area.height - input_height,
            ..area
        };
        transcript.render(transcript_area, frame.buffer_mut());
        input.render(input_area, frame.buffer_mut());
        if let Some((x, y)) = input.cursor_pos(input_area) {
            frame.set_cursor_position((x, y));
        }
    })?;
    Ok(())
}

/// Questions sent so far, newest last.
#[derive(Default)]
struct Transcript {
    lines: Vec<Line<'static>>,
    sent_count: usize,
}

impl Transcript {
    fn record(&mut self, event: &SendEvent) {
        self.sent_count += 1;
        let mut first = true;
        for text_line in event.text.lines() {
            let marker = if first { "› " } else { "  " };
            first = false;
            self.lines
                .push(Line::from(vec![marker.dim(), text_line.to_string().into()]));
        }
        if event.has_image() {
            self.lines.push(Line::from("  [image attached]".cyan()));
        }
        self.lines.push(Line::default());
    }
}

impl Renderable for Transcript {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let header = Line::from(vec![
            "Question input".bold(),
            "  esc/ctrl+c quit  tab switch focus".dim(),
        ]);
        header.render(Rect { height: 1, ..area }, buf);

        let body_height = usize::from(area.height.saturating_sub(2));
        let skip = self.lines.len().saturating_sub(body_height);
        for (offset, line) in self.lines.iter().skip(skip).enumerate() {
            let y = area.y + 2 + u16::try_from(offset).unwrap_or(u16::MAX);
            line.render(Rect { y, height: 1, ..area }, buf);
        }
    }

    fn desired_height(&self, _width: u16) -> u16 {
        u16::try_from(self.lines.len() + 2).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn quit_keys() {
        assert!(is_quit_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_quit_key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::NONE
        )));
        assert!(!is_quit_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)));
    }

    #[test]
    fn transcript_records_multiline_questions_and_images() {
        let mut transcript = Transcript::default();
        transcript.record(&SendEvent {
            text: "first\nsecond".to_string(),
            conversation_id: None,
            encoded_image: Some("data:image/png;base64,AA==".to_string()),
        });
        let rendered: Vec<String> = transcript.lines.iter().map(line_text).collect();
        assert_eq!(
            rendered,
            vec![
                "› first".to_string(),
                "  second".to_string(),
                "  [image attached]".to_string(),
                String::new(),
            ]
        );
        assert_eq!(transcript.sent_count, 1);
    }
}

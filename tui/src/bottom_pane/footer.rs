//! The status row under the question field.
//!
//! Pure rendering: `QuestionInput` builds [`FooterProps`] from its state and this module turns them
//! into a single line. Exactly one of these is shown, in priority order: the in-flight encode, a
//! failed send, the validation error, the staged attachment, then key hints.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;

use crate::attachment::format_size;
use crate::render::renderable::Renderable;
use crate::ui_consts::FOOTER_INDENT_COLS;

#[derive(Clone, Copy, Debug)]
pub struct FooterProps<'a> {
    pub sending: bool,
    /// Why the last send did not go out.
    pub send_error: Option<&'a str>,
    pub file_error: Option<&'a str>,
    /// Display name and size of the staged attachment.
    pub attachment: Option<(&'a str, u64)>,
    pub file_input_enabled: bool,
}

pub const FOOTER_HEIGHT: u16 = 1;

pub fn render_footer(area: Rect, buf: &mut Buffer, props: FooterProps<'_>) {
    footer_line(props).render(area, buf);
}

fn footer_line(props: FooterProps<'_>) -> Line<'static> {
    let indent: Span<'static> = " ".repeat(FOOTER_INDENT_COLS).into();
    if props.sending {
        return Line::from(vec![indent, "Encoding image…".dim()]);
    }
    if let Some(error) = props.send_error {
        return Line::from(vec![indent, error.to_string().red()]);
    }
    if let Some(error) = props.file_error {
        return Line::from(vec![indent, error.to_string().red()]);
    }
    if let Some((name, size)) = props.attachment {
        return Line::from(vec![
            indent,
            "Attached ".dim(),
            name.to_string().cyan(),
            format!(" ({})", format_size(size)).dim(),
            "   ".into(),
            "ctrl+x".bold(),
            " remove".dim(),
        ]);
    }
    let mut spans = vec![
        indent,
        "enter".bold(),
        " send   ".dim(),
        "shift+enter".bold(),
        " newline".dim(),
    ];
    if props.file_input_enabled {
        spans.push("   ".into());
        spans.push("paste an image path".bold());
        spans.push(" to attach".dim());
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn snapshot_footer(name: &str, props: FooterProps<'_>) {
        let mut terminal =
            Terminal::new(TestBackend::new(72, FOOTER_HEIGHT)).expect("test terminal");
        terminal
            .draw(|f| render_footer(f.area(), f.buffer_mut(), props))
            .expect("draw footer");
        assert_snapshot!(name, terminal.backend());
    }

    fn props() -> FooterProps<'static> {
        FooterProps {
            sending: false,
            send_error: None,
            file_error: None,
            attachment: None,
            file_input_enabled: true,
        }
    }

    #[test]
    fn footer_snapshots() {
        snapshot_footer("footer_hints", props());
        snapshot_footer(
            "footer_hints_file_input_disabled",
            FooterProps {
                file_input_enabled: false,
                ..props()
            },
        );
        snapshot_footer(
            "footer_file_error",
            FooterProps {
                file_error: Some("File size exceeds 5MB limit."),
                ..props()
            },
        );
        snapshot_footer(
            "footer_attachment",
            FooterProps {
                attachment: Some(("cat.png", 2048)),
                ..props()
            },
        );
        snapshot_footer(
            "footer_encoding",
            FooterProps {
                sending: true,
                attachment: Some(("cat.png", 2048)),
                ..props()
            },
        );
        snapshot_footer(
            "footer_send_error",
            FooterProps {
                send_error: Some("Could not read the image; question not sent."),
                attachment: Some(("cat.png", 2048)),
                ..props()
            },
        );
    }
}

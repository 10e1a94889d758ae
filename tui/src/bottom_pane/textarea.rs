//! Minimal multi-line text buffer backing the question field.
//!
//! The buffer stores the text verbatim plus a byte cursor that always sits on a grapheme
//! boundary. Soft wrapping is computed on demand from the render width; the text itself never
//! contains wrap-induced newlines.

use std::borrow::Cow;
use std::ops::Range;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Default)]
pub(crate) struct TextArea {
    text: String,
    cursor: usize,
}

impl TextArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole buffer and move the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Apply an editing key. Returns `false` when the key is not an editing key.
    ///
    /// Enter is handled by the owner, which decides between newline and submit.
    pub fn input(&mut self, event: KeyEvent) -> bool {
        if event.kind == KeyEventKind::Release {
            return false;
        }
        match event.code {
            KeyCode::Char(c)
                if !event
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let mut buf = [0u8; 4];
                self.insert_str(c.encode_utf8(&mut buf));
            }
            KeyCode::Backspace => {
                let start = self.prev_boundary(self.cursor);
                self.text.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            KeyCode::Delete => {
                let end = self.next_boundary(self.cursor);
                self.text.replace_range(self.cursor..end, "");
            }
            KeyCode::Left => self.cursor = self.prev_boundary(self.cursor),
            KeyCode::Right => self.cursor = self.next_boundary(self.cursor),
            KeyCode::Home => self.cursor = self.line_start(self.cursor),
            KeyCode::End => self.cursor = self.line_end(self.cursor),
            _ => return false,
        }
        true
    }

    fn prev_boundary(&self, pos: usize) -> usize {
        self.text[..pos]
            .grapheme_indices(true)
            .next_back()
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }

    fn next_boundary(&self, pos: usize) -> usize {
        self.text[pos..]
            .graphemes(true)
            .next()
            .map(|g| pos + g.len())
            .unwrap_or(self.text.len())
    }

    fn line_start(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, pos: usize) -> usize {
        self.text[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(self.text.len())
    }

    /// Byte ranges of each visual row when wrapped to `width` columns.
    ///
    /// Rows of one logical line are contiguous: the whitespace `textwrap` trims at a soft break
    /// stays at the end of the row it follows, so every cursor offset lands in some row.
    fn wrapped_rows(&self, width: u16) -> Vec<Range<usize>> {
        let options = textwrap::Options::new(usize::from(width.max(1)))
            .wrap_algorithm(textwrap::WrapAlgorithm::FirstFit)
            .word_splitter(textwrap::WordSplitter::NoHyphenation);
        let mut rows = Vec::new();
        let mut line_start = 0;
        for line in self.text.split('\n') {
            let line_end = line_start + line.len();
            let mut starts: Vec<usize> = textwrap::wrap(line, &options)
                .iter()
                .filter_map(|row| match row {
                    // Without indentation every wrapped row borrows from `line`.
                    Cow::Borrowed(slice) if !slice.is_empty() => {
                        Some(line_start + (slice.as_ptr() as usize - line.as_ptr() as usize))
                    }
                    _ => None,
                })
                .collect();
            match starts.first_mut() {
                Some(first) => *first = line_start,
                None => starts.push(line_start),
            }
            let ends = starts.iter().skip(1).copied().chain([line_end]);
            rows.extend(starts.iter().copied().zip(ends).map(|(start, end)| start..end));
            line_start = line_end + 1;
        }
        rows
    }

    pub fn desired_height(&self, width: u16) -> u16 {
        u16::try_from(self.wrapped_rows(width).len()).unwrap_or(u16::MAX)
    }

    /// Terminal position of the cursor when the buffer is rendered into `area`.
    pub fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        if area.is_empty() {
            return None;
        }
        let rows = self.wrapped_rows(area.width);
        // A cursor sitting exactly on a soft-wrap boundary belongs to the following row.
        let row_idx = rows
            .iter()
            .rposition(|row| row.start <= self.cursor)
            .unwrap_or(0);
        let row = &rows[row_idx];
        let col = self.text[row.start..self.cursor.min(row.end)].width();
        let y = area.y + u16::try_from(row_idx).unwrap_or(u16::MAX);
        let x = area.x + u16::try_from(col).unwrap_or(u16::MAX);
        Some((x.min(area.right().saturating_sub(1)), y.min(area.bottom().saturating_sub(1))))
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let rows = self.wrapped_rows(area.width);
        // Keep the cursor row visible when the text is taller than the area.
        let cursor_row = rows
            .iter()
            .rposition(|row| row.start <= self.cursor)
            .unwrap_or(0);
        let skip = (cursor_row + 1).saturating_sub(usize::from(area.height));
        for (offset, row) in rows.iter().skip(skip).take(usize::from(area.height)).enumerate() {
            let y = area.y + u16::try_from(offset).unwrap_or(u16::MAX);
            buf.set_stringn(
                area.x,
                y,
                &self.text[row.clone()],
                usize::from(area.width),
                ratatui::style::Style::default(),
            );
        }
    }
}

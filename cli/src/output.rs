//! Where emitted questions go: one JSON object per line.
//!
//! With `--output` every event is appended to the file as soon as it is emitted. Without it the
//! events are held until the terminal has been restored and then written to stdout, since the UI
//! owns the terminal while it runs.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use question_input_protocol::send_event::SendEvent;

pub enum EventOutput {
    File(BufWriter<File>),
    Deferred(Vec<SendEvent>),
}

impl EventOutput {
    pub fn open(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::Deferred(Vec::new()));
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open output file {}", path.display()))?;
        Ok(Self::File(BufWriter::new(file)))
    }

    /// Record one emitted question. The input does not wait on or observe the outcome, so write
    /// failures are logged here and not propagated.
    pub fn record(&mut self, event: SendEvent) {
        match self {
            Self::File(writer) => {
                if let Err(err) = write_json_line(writer, &event).and_then(|()| {
                    writer.flush().context("flush output file")
                }) {
                    tracing::error!("failed to write question to output file: {err:#}");
                }
            }
            Self::Deferred(events) => events.push(event),
        }
    }

    /// Write out anything still held back. Call after the terminal is restored.
    pub fn finish(self, stdout: &mut impl Write) -> anyhow::Result<()> {
        match self {
            Self::File(mut writer) => writer.flush().context("flush output file"),
            Self::Deferred(events) => {
                for event in &events {
                    write_json_line(stdout, event)?;
                }
                stdout.flush().context("flush stdout")
            }
        }
    }
}

fn write_json_line(writer: &mut impl Write, event: &SendEvent) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *writer, event).context("serialize question")?;
    writer.write_all(b"\n").context("write newline")?;
    Ok(())
}

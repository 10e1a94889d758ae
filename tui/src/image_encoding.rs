//! Turns a validated attachment into a `data:` URL.
//!
//! Encoding is the only suspending step of a send. [`ImageEncoder`] runs it on a tokio task and
//! reports the outcome back through the app event channel so the composer can finish (or abandon)
//! the send from the event loop.

use std::path::Path;
use std::path::PathBuf;

use base64::Engine;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::attachment::Attachment;

/// Media type used when the file name does not reveal one, matching what a browser
/// `FileReader` reports for untyped blobs.
const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read the attachment and encode it as `data:<mime>;base64,<payload>`.
pub async fn encode_data_url(attachment: &Attachment) -> Result<String, EncodeError> {
    let path = attachment.path();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| EncodeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let mime = guess_mime(path);
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    tracing::debug!(
        path = %path.display(),
        bytes = bytes.len(),
        mime = %mime,
        "encoded attachment"
    );
    Ok(format!("data:{mime};base64,{encoded}"))
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_owned())
        .unwrap_or_else(|| FALLBACK_MIME.to_string())
}

/// Spawns encodes and reports them as [`AppEvent::ImageEncoded`].
#[derive(Clone, Debug)]
pub(crate) struct ImageEncoder {
    app_event_tx: AppEventSender,
}

impl ImageEncoder {
    pub fn new(app_event_tx: AppEventSender) -> Self {
        Self { app_event_tx }
    }

    /// Start encoding `attachment` for the send identified by `request_id`.
    ///
    /// Must be called from within a tokio runtime. There is no cancellation: the task runs until
    /// the read completes or fails.
    pub fn spawn(&self, request_id: u64, attachment: Attachment) {
        let tx = self.app_event_tx.clone();
        tokio::spawn(async move {
            let result = encode_data_url(&attachment).await;
            tx.send(AppEvent::ImageEncoded { request_id, result });
        });
    }
}

//! History transaction wrapper
//!
//! Brackets a run in one history suspension so the host records a single
//! undo step. The suspension is resumed on every exit path of the body,
//! success or error.

use layerwarp_core::{DocumentId, HistoryControl};
use std::future::Future;

use crate::error::Result;

/// Run `body` inside a history suspension labelled `label`
///
/// If the body fails, its error is returned even when resuming fails too;
/// the resume error is logged. If only the resume fails, that error is
/// returned.
pub async fn with_suspended_history<H, F, T>(
    history: &H,
    document: DocumentId,
    label: &str,
    body: F,
) -> Result<T>
where
    H: HistoryControl + ?Sized,
    F: Future<Output = Result<T>>,
{
    let token = history.suspend_history(document, label).await?;
    tracing::debug!("History suspended on {} ({})", document, token);

    let outcome = body.await;

    let resumed = history.resume_history(token).await;
    match (outcome, resumed) {
        (Ok(value), Ok(())) => {
            tracing::debug!("History resumed on {}", document);
            Ok(value)
        }
        (Ok(_), Err(e)) => {
            tracing::error!("Failed to resume history on {}: {}", document, e);
            Err(e.into())
        }
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(resume_err)) => {
            tracing::error!(
                "Failed to resume history on {} after error '{}': {}",
                document,
                e,
                resume_err
            );
            Err(e)
        }
    }
}

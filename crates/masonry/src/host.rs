//! Async stand-in for the browser event loop.
//!
//! [`drive`] runs a full layout pass: it sleeps through measurement retries
//! and feeds media notifications into the document until the head cell's
//! media is ready, then resumes the pass where it stopped.

use crate::engine::{DrawOutcome, LayoutState, Masonry};
use anyhow::Result;
use html::{Document, MediaEvent, NodeKey};
use log::{debug, warn};
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Run `masonry` over `doc` until it completes or can make no more progress.
///
/// Returns the final [`LayoutState`]: `Complete` on success, `Placing` when
/// the event channel closed while a cell was still waiting on its media, and
/// `Measuring` when the configured retry limit ran out.
///
/// # Errors
/// Propagates document failures from the layout pass.
pub async fn drive<D: Document + ?Sized>(
    masonry: &mut Masonry,
    doc: &mut D,
    events: &mut mpsc::Receiver<MediaEvent>,
) -> Result<LayoutState> {
    let mut retries: u32 = 0;
    let mut outcome = masonry.draw(doc, None)?;
    loop {
        outcome = match outcome {
            DrawOutcome::Unchanged | DrawOutcome::Complete | DrawOutcome::Cancelled => {
                return Ok(masonry.state());
            }
            DrawOutcome::Deferred {
                delay,
                continuation,
            } => {
                if masonry
                    .config()
                    .measure_retry_limit
                    .is_some_and(|limit| retries >= limit)
                {
                    warn!(
                        "masonry {:?}: container still unmeasured after {retries} retries",
                        masonry.container()
                    );
                    return Ok(masonry.state());
                }
                retries += 1;
                sleep(delay).await;
                masonry.resume(doc, continuation)?
            }
            DrawOutcome::Suspended {
                waiting_on,
                continuation,
            } => {
                if !wait_for_media(doc, events, waiting_on).await {
                    warn!(
                        "masonry {:?}: media events closed while waiting on {waiting_on:?}",
                        masonry.container()
                    );
                    return Ok(masonry.state());
                }
                masonry.resume(doc, continuation)?
            }
        };
    }
}

/// Apply incoming media events until one arrives for `media`. Returns false
/// once the channel is closed.
async fn wait_for_media<D: Document + ?Sized>(
    doc: &mut D,
    events: &mut mpsc::Receiver<MediaEvent>,
    media: NodeKey,
) -> bool {
    while let Some(event) = events.recv().await {
        if let Err(err) = doc.apply_media_event(&event) {
            warn!("ignoring media event {event:?}: {err:#}");
            continue;
        }
        debug!("media ready: {:?}", event.node());
        if event.node() == media {
            return true;
        }
    }
    false
}

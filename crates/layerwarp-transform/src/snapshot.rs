//! Selection snapshot manager
//!
//! The host exposes no way to read selection geometry, so the selection is
//! parked in the mask of a temporary carrier layer. Each layer's transform
//! starts by loading that mask back as the selection, and the final restore
//! reloads it once more (or clears the selection if there was none) before
//! the carrier is deleted.
//!
//! ```text
//! NoSnapshot --snapshot()--> Taken --restore()/discard()--> Consumed
//! ```

use layerwarp_core::{CommandChannel, Descriptor, DocumentId, LayerId};
use std::fmt;

use crate::descriptors;
use crate::error::{Result, TransformError};
use crate::exec::{execute, execute_all};

/// Lifecycle of a selection snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotState {
    /// Nothing captured yet
    NoSnapshot,
    /// The carrier layer exists and holds the selection
    Taken {
        /// Carrier layer id
        carrier: LayerId,
        /// Whether a selection existed before the snapshot
        had_selection: bool,
    },
    /// The carrier has been deleted
    Consumed,
}

impl fmt::Display for SnapshotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSnapshot => write!(f, "no snapshot"),
            Self::Taken { carrier, .. } => write!(f, "snapshot taken on {}", carrier),
            Self::Consumed => write!(f, "snapshot consumed"),
        }
    }
}

/// Captures, reloads and restores the user's selection through a carrier layer
#[derive(Debug)]
pub struct SelectionSnapshot {
    document: DocumentId,
    carrier_name: String,
    state: SnapshotState,
    /// Set once select-all has replaced a missing selection
    selected_all: bool,
}

impl SelectionSnapshot {
    /// Create a manager for `document`; the carrier layer will be named `carrier_name`
    pub fn new(document: DocumentId, carrier_name: impl Into<String>) -> Self {
        Self {
            document,
            carrier_name: carrier_name.into(),
            state: SnapshotState::NoSnapshot,
            selected_all: false,
        }
    }

    /// Current state
    pub fn state(&self) -> SnapshotState {
        self.state
    }

    /// Carrier layer id while the snapshot is held
    pub fn carrier(&self) -> Option<LayerId> {
        match self.state {
            SnapshotState::Taken { carrier, .. } => Some(carrier),
            _ => None,
        }
    }

    /// Name given to the carrier layer
    pub fn carrier_name(&self) -> &str {
        &self.carrier_name
    }

    /// Ask the host whether the document has a selection
    pub async fn selection_exists<C>(&self, channel: &C) -> Result<bool>
    where
        C: CommandChannel + ?Sized,
    {
        let result = execute(channel, &descriptors::selection_exists_query(self.document)).await?;
        Ok(result.has_property("selection"))
    }

    /// Park the selection in a new carrier layer's mask
    ///
    /// With no selection, the whole canvas is selected first so every reload
    /// has a non-empty source. Returns the carrier id and whether a
    /// selection existed.
    pub async fn snapshot<C>(&mut self, channel: &C) -> Result<(LayerId, bool)>
    where
        C: CommandChannel + ?Sized,
    {
        if self.state != SnapshotState::NoSnapshot {
            return Err(TransformError::invalid_transition(self.state, "snapshot"));
        }

        let had_selection = self.selection_exists(channel).await?;
        if !had_selection {
            execute(channel, &descriptors::select_all()).await?;
            self.selected_all = true;
        }

        let created = execute(channel, &descriptors::make_layer(&self.carrier_name)).await?;
        let carrier = LayerId(created.i64_field("make", "layerID")?);
        self.state = SnapshotState::Taken {
            carrier,
            had_selection,
        };
        tracing::debug!("Created carrier {} ({})", carrier, self.carrier_name);

        execute(channel, &descriptors::make_mask_from_selection()).await?;
        Ok((carrier, had_selection))
    }

    /// Load the carrier mask back as the selection
    pub async fn reload<C>(&self, channel: &C) -> Result<()>
    where
        C: CommandChannel + ?Sized,
    {
        let SnapshotState::Taken { carrier, .. } = self.state else {
            return Err(TransformError::invalid_transition(self.state, "reload"));
        };
        execute(channel, &descriptors::load_selection_from_mask(carrier)).await?;
        Ok(())
    }

    /// Put the original selection back and delete the carrier
    ///
    /// When a selection existed it is reloaded and `follow_up` (if any) runs
    /// against it; otherwise the selection is cleared and `follow_up` is not
    /// sent.
    pub async fn restore<C>(&mut self, channel: &C, follow_up: Option<&Descriptor>) -> Result<()>
    where
        C: CommandChannel + ?Sized,
    {
        let SnapshotState::Taken {
            carrier,
            had_selection,
        } = self.state
        else {
            return Err(TransformError::invalid_transition(self.state, "restore"));
        };

        if had_selection {
            self.reload(channel).await?;
            if let Some(follow_up) = follow_up {
                execute(channel, follow_up).await?;
            }
        } else {
            execute(channel, &descriptors::select_none()).await?;
        }

        delete_layer(channel, carrier).await?;
        self.state = SnapshotState::Consumed;
        Ok(())
    }

    /// Best-effort cleanup after a failed run
    ///
    /// Restores or clears the selection and deletes the carrier, logging
    /// rather than returning host errors. Returns whether the carrier is
    /// known to be gone.
    pub async fn discard<C>(&mut self, channel: &C) -> bool
    where
        C: CommandChannel + ?Sized,
    {
        match self.state {
            SnapshotState::Taken {
                carrier,
                had_selection,
            } => {
                let selection = if had_selection {
                    self.reload(channel).await
                } else {
                    execute(channel, &descriptors::select_none()).await.map(|_| ())
                };
                if let Err(e) = selection {
                    tracing::warn!("Could not restore selection during cleanup: {}", e);
                }

                let deleted = match delete_layer(channel, carrier).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Could not delete carrier {}: {}", carrier, e);
                        false
                    }
                };
                self.state = SnapshotState::Consumed;
                deleted
            }
            SnapshotState::NoSnapshot => {
                if self.selected_all {
                    if let Err(e) = execute(channel, &descriptors::select_none()).await {
                        tracing::warn!("Could not clear selection during cleanup: {}", e);
                    }
                }
                true
            }
            SnapshotState::Consumed => true,
        }
    }
}

/// Select a layer by id and delete it
async fn delete_layer<C>(channel: &C, layer: LayerId) -> Result<()>
where
    C: CommandChannel + ?Sized,
{
    execute_all(
        channel,
        &[
            descriptors::select_layer(layer, false),
            descriptors::delete_current_layer(),
        ],
    )
    .await
}

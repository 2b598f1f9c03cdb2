//! The cart store.
//!
//! [`CartStore`] owns the cart lines for a session. Mutations take `&mut self`
//! and update memory immediately; each one then publishes a full snapshot on
//! a `watch` channel. A single background task persists whatever snapshot is
//! newest when it wakes up, so bursts of mutations coalesce into one write and
//! an older snapshot is never written after a newer one.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use pos_storefront_core::{LineId, Money};

use super::line::{CartLineItem, Step, Unit};
use super::persist;
use crate::models::keys;
use crate::storage::KeyValueStore;

/// Immutable view of the cart after a mutation.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    /// Increases by one with every published mutation. The loaded cart is 0.
    pub revision: u64,
    pub lines: Arc<[CartLineItem]>,
}

impl CartSnapshot {
    /// Sum of line subtotals.
    #[must_use]
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLineItem::subtotal).sum()
    }
}

/// Effect of a mutation on the targeted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Inserted,
    Updated,
    Removed,
    /// Nothing changed (unknown id, or a unit already at zero).
    Unchanged,
}

/// Session cart backed by a [`KeyValueStore`].
pub struct CartStore {
    lines: Vec<CartLineItem>,
    revision: u64,
    snapshots: watch::Sender<CartSnapshot>,
    persisted: watch::Receiver<u64>,
    writer: JoinHandle<()>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the persisted cart and start the background writer.
    ///
    /// A missing, unreadable or corrupt cart starts empty. Must be called from
    /// within a Tokio runtime.
    #[instrument(skip(storage))]
    pub async fn initialize<S: KeyValueStore>(storage: Arc<S>) -> Self {
        let lines = match storage.get(keys::CART).await {
            Ok(Some(raw)) => persist::decode(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                Vec::new()
            }
        };
        info!(lines = lines.len(), "Cart loaded");

        let (snapshots, snapshot_rx) = watch::channel(CartSnapshot {
            revision: 0,
            lines: Arc::from(lines.as_slice()),
        });
        let (persisted_tx, persisted) = watch::channel(0);
        let writer = tokio::spawn(run_writer(storage, snapshot_rx, persisted_tx));

        Self {
            lines,
            revision: 0,
            snapshots,
            persisted,
            writer,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a line, or bump the existing line with the same id.
    ///
    /// A new line keeps the counts it was built with; one with no counts is
    /// inserted with a single piece. For an existing line, an item carrying
    /// no counts or the single-piece default adds one piece, and any other
    /// counts replace the line's counts. Stock limits are not checked here.
    pub fn add_or_increment(&mut self, mut item: CartLineItem) -> LineOutcome {
        let explicit = !item.is_empty() && (item.pieces(), item.cartons()) != (1, 0);
        let outcome = if let Some(line) = self.line_mut(item.id()) {
            if explicit {
                line.set_counts(item.pieces(), item.cartons());
            } else {
                line.adjust(Unit::Piece, Step::Up);
            }
            LineOutcome::Updated
        } else {
            if item.is_empty() {
                item.set_counts(1, 0);
            }
            self.lines.push(item);
            LineOutcome::Inserted
        };

        self.publish();
        outcome
    }

    /// Add one `unit` to an existing line.
    pub fn increment(&mut self, id: &LineId, unit: Unit) -> LineOutcome {
        self.adjust(id, unit, Step::Up)
    }

    /// Remove one `unit` from a line, dropping the line when both counts
    /// reach zero.
    pub fn decrement(&mut self, id: &LineId, unit: Unit) -> LineOutcome {
        self.adjust(id, unit, Step::Down)
    }

    fn adjust(&mut self, id: &LineId, unit: Unit, step: Step) -> LineOutcome {
        let Some(position) = self.position(id) else {
            return LineOutcome::Unchanged;
        };
        let Some(line) = self.lines.get_mut(position) else {
            return LineOutcome::Unchanged;
        };

        if !line.adjust(unit, step) {
            return LineOutcome::Unchanged;
        }

        let outcome = if line.is_empty() {
            self.lines.remove(position);
            LineOutcome::Removed
        } else {
            LineOutcome::Updated
        };

        self.publish();
        outcome
    }

    /// Replace the line with the same id, inserting it if missing.
    ///
    /// A replacement with no counts removes the line.
    pub fn update_item(&mut self, item: CartLineItem) -> LineOutcome {
        if item.is_empty() {
            return self.remove(item.id());
        }

        let outcome = if let Some(line) = self.line_mut(item.id()) {
            *line = item;
            LineOutcome::Updated
        } else {
            self.lines.push(item);
            LineOutcome::Inserted
        };

        self.publish();
        outcome
    }

    /// Remove a line regardless of its counts.
    pub fn remove(&mut self, id: &LineId) -> LineOutcome {
        let Some(position) = self.position(id) else {
            return LineOutcome::Unchanged;
        };

        self.lines.remove(position);
        self.publish();
        LineOutcome::Removed
    }

    /// Empty the cart and erase the persisted copy.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.publish();
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.snapshots.send_replace(CartSnapshot {
            revision: self.revision,
            lines: Arc::from(self.lines.as_slice()),
        });
        debug!(revision = self.revision, lines = self.lines.len(), "Cart changed");
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, id: &LineId) -> Option<&CartLineItem> {
        self.lines.iter().find(|line| line.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line subtotals.
    #[must_use]
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLineItem::subtotal).sum()
    }

    /// Sum of piece-equivalent quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(CartLineItem::quantity).sum()
    }

    /// Revision of the latest published snapshot.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Receive every new snapshot. The current one is available immediately
    /// through [`watch::Receiver::borrow`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshots.subscribe()
    }

    fn position(&self, id: &LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id() == id)
    }

    fn line_mut(&mut self, id: &LineId) -> Option<&mut CartLineItem> {
        self.lines.iter_mut().find(|line| line.id() == id)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Wait until the current snapshot has been handed to storage.
    ///
    /// Storage failures are logged by the writer and do not fail the flush.
    pub async fn flush(&mut self) {
        let target = self.revision;
        if self
            .persisted
            .wait_for(|&revision| revision >= target)
            .await
            .is_err()
        {
            error!(revision = target, "Cart writer stopped before flushing");
        }
    }

    /// Persist the final snapshot and stop the writer.
    pub async fn teardown(self) {
        let Self {
            snapshots, writer, ..
        } = self;
        drop(snapshots);

        if let Err(e) = writer.await {
            error!(error = %e, "Cart writer task failed");
        }
    }
}

#[instrument(skip_all)]
async fn run_writer<S: KeyValueStore>(
    storage: Arc<S>,
    mut snapshots: watch::Receiver<CartSnapshot>,
    persisted: watch::Sender<u64>,
) {
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        write_snapshot(storage.as_ref(), &snapshot).await;
        persisted.send_replace(snapshot.revision);
    }
    debug!("Cart writer stopped");
}

async fn write_snapshot<S: KeyValueStore>(storage: &S, snapshot: &CartSnapshot) {
    let result = if snapshot.lines.is_empty() {
        storage.delete(keys::CART).await
    } else {
        match persist::encode(&snapshot.lines) {
            Ok(raw) => storage.set(keys::CART, &raw).await,
            Err(e) => {
                error!(revision = snapshot.revision, error = %e, "Failed to encode cart");
                return;
            }
        }
    };

    match result {
        Ok(()) => debug!(revision = snapshot.revision, "Cart persisted"),
        Err(e) => warn!(revision = snapshot.revision, error = %e, "Failed to persist cart"),
    }
}

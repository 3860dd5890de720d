//! Persistence synchronizer: keeps the durable record in step with the
//! in-memory graph.
//!
//! - **Debounced autosave**: every data-channel event from the store re-arms
//!   a trailing-edge deadline. [`PersistenceSync::tick`] writes once the
//!   quiet period has elapsed, so a burst of edits is one write carrying the
//!   final state. UI-only events never arm it.
//! - **Periodic autosave**: an unconditional write every interval, as a
//!   backstop against a lost debounce.
//! - **Explicit save / unload**: [`PersistenceSync::save_now`].
//!
//! The host drives time by calling `tick` from its timer or animation loop.
//! Storage failures are logged and not retried; the in-memory graph stays
//! authoritative.
//!
//! A record that fails to load is never overwritten by a background write:
//! periodic and unload saves are held until a load succeeds or the user
//! edits the board (which arms the debounce and releases the hold).

use crate::clock::Clock;
use crate::config::EditorConfig;
use crate::error::StorageError;
use crate::records::RecordStore;
use board_core::document::{BoardDocument, BoardRecord, ExportFile, export_document};
use board_core::error::DocumentError;
use board_core::store::{GraphStore, SubscriptionId};
use std::cell::Cell;
use std::rc::Rc;

/// Why a write happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReason {
    Debounced,
    Periodic,
    Explicit,
    Unload,
}

pub struct PersistenceSync {
    records: Box<dyn RecordStore>,
    key: String,
    clock: Rc<dyn Clock>,
    interval_ms: u64,
    /// Debounce deadline, written by the store subscription.
    deadline: Rc<Cell<Option<u64>>>,
    /// Set after a failed load; cleared by the next data change.
    held: Rc<Cell<bool>>,
    next_periodic: u64,
    subscription: Option<SubscriptionId>,
    saves: usize,
}

impl std::fmt::Debug for PersistenceSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceSync")
            .field("key", &self.key)
            .field("deadline", &self.deadline.get())
            .field("held", &self.held.get())
            .field("next_periodic", &self.next_periodic)
            .field("saves", &self.saves)
            .finish()
    }
}

impl PersistenceSync {
    /// Subscribe to `store` and start the periodic timer.
    pub fn attach(
        store: &mut GraphStore,
        records: Box<dyn RecordStore>,
        clock: Rc<dyn Clock>,
        config: &EditorConfig,
    ) -> Self {
        let deadline = Rc::new(Cell::new(None));
        let held = Rc::new(Cell::new(false));
        let debounce_ms = config.debounce_ms;
        let subscription = {
            let deadline = Rc::clone(&deadline);
            let held = Rc::clone(&held);
            let clock = Rc::clone(&clock);
            store.subscribe(move |event| {
                if event.touches_data() {
                    deadline.set(Some(clock.now_ms() + debounce_ms));
                    held.set(false);
                }
            })
        };
        let interval_ms = config.autosave_interval_ms.max(1);
        let next_periodic = clock.now_ms() + interval_ms;
        Self {
            records,
            key: config.record_key.clone(),
            clock,
            interval_ms,
            deadline,
            held,
            next_periodic,
            subscription: Some(subscription),
            saves: 0,
        }
    }

    /// Stop listening to the store. Pending debounced work is dropped.
    pub fn detach(&mut self, store: &mut GraphStore) {
        if let Some(sub) = self.subscription.take() {
            store.unsubscribe(sub);
        }
        self.deadline.set(None);
    }

    /// When the armed debounce will fire, if armed.
    pub fn pending_deadline(&self) -> Option<u64> {
        self.deadline.get()
    }

    /// Whether background writes are held after a failed load.
    pub fn is_held(&self) -> bool {
        self.held.get()
    }

    /// Number of successful writes.
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// Advance timers. Returns the reason for the write performed, if any.
    pub fn tick(&mut self, store: &GraphStore) -> Option<SaveReason> {
        let now = self.clock.now_ms();
        let mut reason = None;
        if self.deadline.get().is_some_and(|d| now >= d) {
            reason = Some(SaveReason::Debounced);
        }
        if now >= self.next_periodic {
            while self.next_periodic <= now {
                self.next_periodic += self.interval_ms;
            }
            if self.held.get() {
                log::debug!("periodic save held: stored record was not loaded");
            } else {
                reason = reason.or(Some(SaveReason::Periodic));
            }
        }
        let reason = reason?;
        match self.write(store, reason) {
            Ok(()) => Some(reason),
            Err(e) => {
                log::error!("{reason:?} save failed: {e}");
                None
            }
        }
    }

    /// Write immediately and cancel any armed debounce.
    pub fn save_now(&mut self, store: &GraphStore) -> Result<(), StorageError> {
        self.write(store, SaveReason::Explicit)
    }

    /// Best-effort final write when the host is going away.
    pub fn unload(&mut self, store: &GraphStore) {
        if self.held.get() {
            log::warn!("unload save skipped: stored record was not loaded");
            return;
        }
        if let Err(e) = self.write(store, SaveReason::Unload) {
            log::error!("save on unload failed: {e}");
        }
    }

    fn write(&mut self, store: &GraphStore, reason: SaveReason) -> Result<(), StorageError> {
        self.deadline.set(None);
        let record = BoardRecord::from(&store.document());
        self.records.put(&self.key, &record)?;
        self.saves += 1;
        self.held.set(false);
        log::info!(
            "{reason:?} save: {} nodes, {} edges",
            record.nodes.len(),
            record.edges.len()
        );
        Ok(())
    }

    /// Read the record into the store. Returns `false` when nothing was
    /// stored yet (the board stays empty with the default title).
    pub fn load(&mut self, store: &mut GraphStore) -> Result<bool, StorageError> {
        let record = match self.records.get(&self.key) {
            Ok(record) => record,
            Err(e) => {
                log::error!("loading {:?} failed, holding background saves: {e}", self.key);
                self.held.set(true);
                self.deadline.set(None);
                return Err(e);
            }
        };
        self.held.set(false);
        let Some(record) = record else {
            log::info!("no stored board under {:?}", self.key);
            store.replace_document(BoardDocument::default());
            self.deadline.set(None);
            return Ok(false);
        };
        let doc = record.into_document();
        log::info!(
            "loaded board {:?}: {} nodes, {} edges",
            doc.meta.title,
            doc.nodes.len(),
            doc.edges.len()
        );
        store.replace_document(doc);
        // The store now mirrors the record; nothing to write back.
        self.deadline.set(None);
        Ok(true)
    }

    /// Pretty-printed export of the current board.
    pub fn export(&self, store: &GraphStore) -> Result<ExportFile, DocumentError> {
        export_document(&store.document())
    }
}

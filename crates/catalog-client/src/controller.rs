//! # Generic Resource Controller
//!
//! One CRUD state machine reused across every collection. The controller
//! is a cheap-to-clone handle over shared state, so views and background
//! tasks can observe and drive the same instance.
//!
//! # State machine
//!
//! The list lifecycle is a [`Phase`]: `Idle` until the first load, then
//! `Loading` -> `Ready(items)` or `Failed(message)`. Layered on top of a
//! ready list is the form [`Mode`]: `Browsing`, `CreateDraft`, or
//! `Editing(id)`. Create and edit are mutually exclusive; starting one
//! cancels the other. Deletion goes through a separate confirmation slot
//! (`pending_delete`) that mutates nothing until confirmed.
//!
//! # Concurrency
//!
//! `busy` is a one-slot lock around mutating calls: while a submit or a
//! confirmed delete is in flight, further submit/delete calls are
//! dropped, not queued, and never cancel the in-flight one. List loads
//! are intentionally not deduplicated; two concurrent loads resolve
//! last-write-wins. A request that never resolves leaves `busy` set
//! with no escape path short of rebuilding the controller.

use crate::schema::{ResourceItem, ResourceSchema};
use crate::transport::{ApiTransport, Verb};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// How long a success notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// List lifecycle of one controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Loading,
    Ready(Vec<ResourceItem>),
    Failed(String),
}

/// Form sub-state layered on a ready list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    CreateDraft,
    Editing(String),
}

struct ControllerState {
    phase: Phase,
    mode: Mode,
    draft: BTreeMap<String, String>,
    pending_delete: Option<String>,
    busy: bool,
    last_error: Option<String>,
    notice: Option<(String, Instant)>,
}

/// CRUD orchestration for one resource collection.
#[derive(Clone)]
pub struct ResourceController {
    schema: Arc<ResourceSchema>,
    transport: Arc<dyn ApiTransport>,
    state: Arc<Mutex<ControllerState>>,
}

impl ResourceController {
    pub fn new(schema: ResourceSchema, transport: Arc<dyn ApiTransport>) -> Self {
        let draft = schema.blank_draft();
        Self {
            schema: Arc::new(schema),
            transport,
            state: Arc::new(Mutex::new(ControllerState {
                phase: Phase::Idle,
                mode: Mode::Browsing,
                draft,
                pending_delete: None,
                busy: false,
                last_error: None,
                notice: None,
            })),
        }
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    /// Fetches the whole collection. Not gated by `busy`; overlapping
    /// loads are last-write-wins.
    pub async fn load(&self) {
        {
            let mut state = self.lock();
            state.phase = Phase::Loading;
            state.last_error = None;
        }
        debug!(resource = self.schema.label, "loading list");
        match self
            .transport
            .request(Verb::Get, self.schema.base_path, None)
            .await
        {
            Ok(raw) => {
                let items = self.schema.normalize_list(&raw);
                info!(resource = self.schema.label, count = items.len(), "list loaded");
                self.lock().phase = Phase::Ready(items);
            }
            Err(e) => {
                warn!(resource = self.schema.label, error = %e, "list load failed");
                self.lock().phase = Phase::Failed(format!("failed to load {}s", self.schema.label));
            }
        }
    }

    /// Opens the create draft with defaults, cancelling any edit.
    pub fn start_create(&self) {
        let mut state = self.lock();
        state.draft = self.schema.blank_draft();
        state.mode = Mode::CreateDraft;
        state.last_error = None;
    }

    /// Opens an edit draft populated from the item's current values,
    /// cancelling any create draft. No-op when the id is not listed.
    pub fn start_edit(&self, id: &str) {
        let mut state = self.lock();
        let Phase::Ready(items) = &state.phase else {
            warn!(resource = self.schema.label, id, "edit requested before list is ready");
            return;
        };
        let Some(item) = items.iter().find(|item| item.id == id) else {
            warn!(resource = self.schema.label, id, "edit requested for unknown item");
            return;
        };
        state.draft = self.schema.draft_from_item(item);
        state.mode = Mode::Editing(id.to_owned());
        state.last_error = None;
    }

    /// Closes the create/edit form without mutating anything.
    pub fn cancel_form(&self) {
        let mut state = self.lock();
        state.draft = self.schema.blank_draft();
        state.mode = Mode::Browsing;
    }

    /// Updates one draft field. Keys outside the schema are ignored.
    pub fn set_field(&self, key: &str, value: impl Into<String>) {
        if !self.schema.fields.iter().any(|f| f.key == key) {
            debug!(resource = self.schema.label, key, "ignoring unknown draft field");
            return;
        }
        self.lock().draft.insert(key.to_owned(), value.into());
    }

    /// Submits the open form: create (POST) or update (PUT `/:id`).
    ///
    /// Validation failures surface a message and keep the form open
    /// without touching the network. Server failures surface the server's
    /// message and keep the form open. Success closes the form, refreshes
    /// the list and shows a transient notice. Dropped while `busy`.
    pub async fn submit(&self) {
        let (verb, target, payload) = {
            let mut state = self.lock();
            let creating = match &state.mode {
                Mode::CreateDraft => true,
                Mode::Editing(_) => false,
                Mode::Browsing => {
                    debug!(resource = self.schema.label, "submit with no open form");
                    return;
                }
            };
            // Validation is not gated by `busy`.
            let payload = match self.schema.assemble_payload(&state.draft, creating) {
                Ok(payload) => payload,
                Err(message) => {
                    state.last_error = Some(message);
                    return;
                }
            };
            if state.busy {
                debug!(resource = self.schema.label, "submit dropped, request in flight");
                return;
            }
            state.busy = true;
            state.last_error = None;
            state.notice = None;
            match &state.mode {
                Mode::Editing(id) => (Verb::Put, self.schema.item_path(id), payload),
                _ => (Verb::Post, self.schema.create_target().to_owned(), payload),
            }
        };

        match self.transport.request(verb, &target, Some(payload)).await {
            Ok(_) => {
                let creating;
                {
                    let mut state = self.lock();
                    creating = matches!(state.mode, Mode::CreateDraft);
                    state.mode = Mode::Browsing;
                    state.draft = self.schema.blank_draft();
                    state.busy = false;
                    state.notice = Some((
                        format!(
                            "{} {}",
                            self.schema.label,
                            if creating { "created" } else { "updated" }
                        ),
                        Instant::now() + NOTICE_TTL,
                    ));
                }
                info!(resource = self.schema.label, created = creating, "saved");
                self.load().await;
            }
            Err(e) => {
                warn!(resource = self.schema.label, error = %e, "save failed");
                let mut state = self.lock();
                state.busy = false;
                state.last_error = Some(e.to_string());
                // Form stays open in the same mode.
            }
        }
    }

    /// Marks an item for deletion; nothing is mutated until confirmed.
    pub fn request_delete(&self, id: &str) {
        self.lock().pending_delete = Some(id.to_owned());
    }

    /// Clears the pending confirmation without deleting.
    pub fn cancel_delete(&self) {
        self.lock().pending_delete = None;
    }

    /// Deletes the item pending confirmation. Dropped while `busy`; the
    /// pending id is cleared whether the call succeeds or fails.
    pub async fn confirm_delete(&self) {
        let target = {
            let mut state = self.lock();
            if state.busy {
                debug!(resource = self.schema.label, "delete dropped, request in flight");
                return;
            }
            let Some(id) = state.pending_delete.clone() else {
                return;
            };
            state.busy = true;
            state.last_error = None;
            state.notice = None;
            self.schema.item_path(&id)
        };

        match self.transport.request(Verb::Delete, &target, None).await {
            Ok(_) => {
                {
                    let mut state = self.lock();
                    state.busy = false;
                    state.pending_delete = None;
                    state.notice = Some((
                        format!("{} deleted", self.schema.label),
                        Instant::now() + NOTICE_TTL,
                    ));
                }
                info!(resource = self.schema.label, "deleted");
                self.load().await;
            }
            Err(e) => {
                warn!(resource = self.schema.label, error = %e, "delete failed");
                let mut state = self.lock();
                state.busy = false;
                state.pending_delete = None;
                state.last_error = Some(e.to_string());
            }
        }
    }

    // --- Read accessors ---

    pub fn phase(&self) -> Phase {
        self.lock().phase.clone()
    }

    /// The cached list; empty unless the phase is `Ready`.
    pub fn items(&self) -> Vec<ResourceItem> {
        match &self.lock().phase {
            Phase::Ready(items) => items.clone(),
            _ => Vec::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.lock().mode.clone()
    }

    pub fn draft_value(&self, key: &str) -> Option<String> {
        self.lock().draft.get(key).cloned()
    }

    pub fn pending_delete(&self) -> Option<String> {
        self.lock().pending_delete.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// The transient success notice, if it has not expired yet.
    pub fn notice(&self) -> Option<String> {
        let mut state = self.lock();
        match &state.notice {
            Some((message, expiry)) if Instant::now() < *expiry => Some(message.clone()),
            Some(_) => {
                state.notice = None;
                None
            }
            None => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap()
    }
}

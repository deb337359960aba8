//! The aggregate that ties topology, activity, addressing and labels
//! together.
//!
//! [`SpaceModel`] owns a [`SpaceHost`] and a [`NameStore`], re-derives the
//! space topology on every [`refresh`](SpaceModel::refresh) and turns switch
//! requests into activation commands.
//!
//! Two orderings of the same displays are kept apart on purpose:
//!
//! * [`displays`](SpaceModel::displays) is sorted left-to-right for
//!   presentation.
//! * Addressing always works on configuration order.  Switching by id
//!   re-reads the topology from the host at the moment of the request and
//!   never looks at the sorted view.
//!
//! Host and store failures never escape a refresh: they are logged and
//! degrade to "no spaces", "nothing current" or "no label".

use crate::activity;
use crate::address::{self, ActivationIndex, MAX_ACTIVATION_INDEX};
use crate::command::Command;
use crate::names::NameStore;
use crate::space::{visually_sorted, Display, Space, SpaceId};
use crate::topology;
use crate::traits::{KeyValueStore, SpaceHost};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Default delay before the follow-up refresh after a switch.
pub const DEFAULT_FOLLOW_UP_DELAY: Duration = Duration::from_millis(300);

/// Possible errors from model operations.
///
/// Every variant means "nothing was done"; the model stays queryable.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No space with this id exists in the current topology.
    #[error("unknown space {0}")]
    UnknownSpace(SpaceId),
    /// The space exists but sits beyond the last activation slot.
    #[error("space {0} is beyond the last activation slot")]
    Unaddressable(SpaceId),
    /// A global index outside `1..=available`.
    #[error("activation index {index} out of range (have {available})")]
    IndexOutOfRange { index: u32, available: usize },
    /// The host rejected the activation command.
    #[error("host error: {0}")]
    Host(String),
    /// The label store failed.
    #[error("label store error: {0}")]
    Store(String),
}

/// Whether the model has completed a refresh yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Constructed, not refreshed.  Accessors return empty data.
    Stale,
    /// At least one refresh has completed.
    Fresh,
}

/// Result of a [`refresh`](SpaceModel::refresh).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The published displays changed; a shell should redraw.
    Changed,
    /// Identical to the previous snapshot, which was kept as is.
    Unchanged,
}

/// Observable space state for one host.
///
/// # Typical usage
///
/// ```ignore
/// let names = NameStore::new(JsonFileStore::new(path), DEFAULT_NAMESPACE);
/// let mut model = SpaceModel::new(host, names);
/// model.refresh();
/// model.switch_to_space(SpaceId(42))?;
/// ```
pub struct SpaceModel<H: SpaceHost, S: KeyValueStore> {
    host: H,
    names: NameStore<S>,
    state: ModelState,
    /// Last published displays, visual order.
    displays: Vec<Display>,
    /// Same refresh, configuration order.  Never sorted.
    internal: Vec<Display>,
    follow_up: Option<Instant>,
    follow_up_delay: Duration,
}

impl<H: SpaceHost, S: KeyValueStore> SpaceModel<H, S> {
    /// Create a stale model.  No host query happens until the first
    /// [`refresh`](Self::refresh).
    pub fn new(host: H, names: NameStore<S>) -> Self {
        Self {
            host,
            names,
            state: ModelState::Stale,
            displays: Vec::new(),
            internal: Vec::new(),
            follow_up: None,
            follow_up_delay: DEFAULT_FOLLOW_UP_DELAY,
        }
    }

    /// Set the delay between an activation and its follow-up refresh.
    pub fn set_follow_up_delay(&mut self, delay: Duration) {
        self.follow_up_delay = delay;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn names(&self) -> &NameStore<S> {
        &self.names
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Displays from the last refresh, sorted left-to-right.
    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    /// The current space on `display_id`, if the live query reported one.
    pub fn current_space(&self, display_id: &str) -> Option<&Space> {
        self.displays
            .iter()
            .find(|d| d.id == display_id)
            .and_then(Display::current_space)
    }

    /// Global index of the primary display's current space, as of the last
    /// refresh.
    pub fn current_address(&self) -> Option<ActivationIndex> {
        let current = self
            .internal
            .iter()
            .find(|d| d.is_primary())
            .and_then(Display::current_space)?;
        address::resolve_single(current.id, &self.internal)
    }

    //  Refresh

    /// Re-read the topology and live activity and publish a new snapshot.
    ///
    /// The previous snapshot is kept untouched when nothing changed, so a
    /// shell polling every tick only redraws on [`RefreshOutcome::Changed`].
    pub fn refresh(&mut self) -> RefreshOutcome {
        let mut internal = self.read_topology();
        let live = self.read_active_spaces();
        activity::overlay(&mut internal, &live);

        let published = visually_sorted(&internal);
        let was_fresh = self.state == ModelState::Fresh;
        self.state = ModelState::Fresh;
        self.internal = internal;

        if was_fresh && published == self.displays {
            debug!("refresh: unchanged");
            return RefreshOutcome::Unchanged;
        }
        self.displays = published;
        debug!("refresh: {} display(s) published", self.displays.len());
        RefreshOutcome::Changed
    }

    /// Read the topology in configuration order, without activity.
    fn read_topology(&self) -> Vec<Display> {
        let config = self.host.configuration_snapshot().unwrap_or_else(|e| {
            warn!("configuration snapshot unavailable: {}", e);
            serde_json::Value::Null
        });
        let screens = self.host.screens().unwrap_or_else(|e| {
            warn!("screen query failed: {}", e);
            Vec::new()
        });
        topology::read(&config, &screens)
    }

    fn read_active_spaces(&self) -> HashSet<SpaceId> {
        self.host.active_spaces().unwrap_or_else(|e| {
            warn!("active space query failed: {}", e);
            HashSet::new()
        })
    }

    //  Switching

    /// Activate the space with id `id`.
    ///
    /// The address is resolved against a topology read right now, in
    /// configuration order.  On error no command was sent.
    pub fn switch_to_space(&mut self, id: SpaceId) -> Result<ActivationIndex, ModelError> {
        let topology = self.read_topology();
        match address::resolve_single(id, &topology) {
            Some(index) => {
                info!("switch to space {} (index {})", id, index);
                self.activate(index)
            }
            None if topology.iter().flat_map(|d| &d.spaces).any(|s| s.id == id) => {
                debug!("space {} has no activation slot", id);
                Err(ModelError::Unaddressable(id))
            }
            None => {
                debug!("space {} not found", id);
                Err(ModelError::UnknownSpace(id))
            }
        }
    }

    /// Activate a pre-resolved global index without reading the topology.
    ///
    /// `index` must be in `1..=10` and, once the model is fresh, within the
    /// addresses the last refresh produced.
    pub fn switch_to_index(&mut self, index: u32) -> Result<ActivationIndex, ModelError> {
        let available = self.available_addresses();
        let activation = ActivationIndex::new(index)
            .filter(|_| index as usize <= available)
            .ok_or(ModelError::IndexOutOfRange { index, available })?;
        info!("switch to index {}", activation);
        self.activate(activation)
    }

    fn available_addresses(&self) -> usize {
        match self.state {
            ModelState::Stale => MAX_ACTIVATION_INDEX as usize,
            ModelState::Fresh => address::address_count(&self.internal),
        }
    }

    /// Send the command and arm the follow-up refresh.
    fn activate(&mut self, index: ActivationIndex) -> Result<ActivationIndex, ModelError> {
        self.host
            .send_activation(index)
            .map_err(|e| ModelError::Host(e.to_string()))?;
        self.follow_up = Some(Instant::now() + self.follow_up_delay);
        Ok(index)
    }

    //  Follow-up

    /// When the pending follow-up refresh is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.follow_up
    }

    /// Run the pending follow-up refresh if its deadline has passed.
    ///
    /// Fires at most once per armed follow-up.  Returns `None` if nothing
    /// was due.
    pub fn poll_follow_up(&mut self, now: Instant) -> Option<RefreshOutcome> {
        match self.follow_up {
            Some(deadline) if now >= deadline => {
                self.follow_up = None;
                debug!("follow-up refresh");
                Some(self.refresh())
            }
            _ => None,
        }
    }

    /// Drop a pending follow-up without running it.
    pub fn cancel_follow_up(&mut self) {
        self.follow_up = None;
    }

    //  Labels

    /// Text to show for space `id`: its stored label, else its number.
    ///
    /// Returns `None` only if the space is neither labelled nor part of the
    /// last published snapshot.
    pub fn label_for(&self, id: SpaceId) -> Option<String> {
        match self.names.get(id) {
            Ok(Some(name)) => return Some(name),
            Ok(None) => {}
            Err(e) => warn!("label lookup for {} failed: {}", id, e),
        }
        self.displays
            .iter()
            .flat_map(|d| &d.spaces)
            .find(|s| s.id == id)
            .map(|s| s.number().to_string())
    }

    /// Set the label of `id`.  Surrounding whitespace is trimmed and a blank
    /// name clears the label instead.
    pub fn rename(&mut self, id: SpaceId, name: &str) -> Result<(), ModelError> {
        let name = name.trim();
        if name.is_empty() {
            return self.clear_label(id);
        }
        info!("label space {} as {:?}", id, name);
        self.names
            .set(id, name)
            .map_err(|e| ModelError::Store(e.to_string()))
    }

    pub fn clear_label(&mut self, id: SpaceId) -> Result<(), ModelError> {
        info!("clear label of space {}", id);
        self.names
            .remove(id)
            .map_err(|e| ModelError::Store(e.to_string()))
    }

    /// Remove every stored label.
    pub fn reset_labels(&mut self) -> Result<(), ModelError> {
        info!("reset all labels");
        self.names
            .reset_all()
            .map_err(|e| ModelError::Store(e.to_string()))
    }

    /// One-line rendering of the published snapshot, e.g.
    /// `Built-in: 1 [Mail] 3 | DELL: [1] 2`.
    pub fn status_line(&self) -> String {
        self.displays
            .iter()
            .map(|d| {
                let spaces: Vec<String> = d
                    .spaces
                    .iter()
                    .map(|s| {
                        let label = self.label_for(s.id).unwrap_or_else(|| s.number().to_string());
                        if s.is_current {
                            format!("[{}]", label)
                        } else {
                            label
                        }
                    })
                    .collect();
                format!("{}: {}", d.name, spaces.join(" "))
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    //  Commands

    /// Apply a single [`Command`].
    pub fn handle(&mut self, cmd: Command) -> Result<(), ModelError> {
        match cmd {
            Command::SwitchToSpace(id) => self.switch_to_space(id).map(|_| ()),
            Command::SwitchToIndex(index) => self.switch_to_index(index).map(|_| ()),
            Command::Rename { space, name } => {
                self.rename(space, &name)?;
                self.refresh();
                Ok(())
            }
            Command::ClearLabel(space) => {
                self.clear_label(space)?;
                self.refresh();
                Ok(())
            }
            Command::ResetLabels => {
                self.reset_labels()?;
                self.refresh();
                Ok(())
            }
            Command::Refresh => {
                self.refresh();
                Ok(())
            }
        }
    }
}

//  Tests

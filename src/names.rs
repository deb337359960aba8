//! User-chosen space labels.
//!
//! [`NameStore`] is a typed view over one namespace of a
//! [`KeyValueStore`]: keys are the decimal form of a [`SpaceId`], values are
//! labels.  It has no opinion on what a valid label is; blank-name handling
//! lives in [`SpaceModel::rename`](crate::model::SpaceModel::rename).
//! Nothing is cached, every call goes to the backing store.

use crate::space::SpaceId;
use crate::traits::KeyValueStore;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "SpaceNames";

pub struct NameStore<S: KeyValueStore> {
    store: S,
    namespace: String,
}

impl<S: KeyValueStore> NameStore<S> {
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// The namespace all labels are stored under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Borrow the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get(&self, id: SpaceId) -> Result<Option<String>, S::Error> {
        self.store.load(&self.namespace, &id.to_string())
    }

    pub fn set(&mut self, id: SpaceId, name: &str) -> Result<(), S::Error> {
        self.store.store(&self.namespace, &id.to_string(), name)
    }

    pub fn remove(&mut self, id: SpaceId) -> Result<(), S::Error> {
        self.store.delete(&self.namespace, &id.to_string())
    }

    /// Drop every label.  Irreversible.
    pub fn reset_all(&mut self) -> Result<(), S::Error> {
        self.store.clear(&self.namespace)
    }
}

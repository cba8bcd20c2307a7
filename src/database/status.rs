use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Connection state of the record store as seen by the server process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    #[default]
    Connecting,
    Connected,
    Failed,
}

/// Shared handle to the current [`StoreState`].
#[derive(Debug, Clone, Default)]
pub struct StoreStatus(Arc<RwLock<StoreState>>);

impl StoreStatus {
    pub fn get(&self) -> StoreState {
        *self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set(&self, state: StoreState) {
        *self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = state;
    }
}

use std::sync::Arc;

use crate::database::store::Datastore;

/// Shared application state: the datastore behind every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
}

impl AppState {
    pub fn new(store: Arc<dyn Datastore>) -> Self {
        Self { store }
    }
}

use crate::resources::dragdrop::DragDropStore;
use crate::resources::eventbus::EventBus;
use crate::resources::syncconfig::SyncConfig;
use std::sync::Arc;

/// Shared services handed to every entity constructor.
///
/// Created once by the application root; cloning is cheap.
#[derive(Clone)]
pub struct AppContext {
    pub bus: Arc<EventBus>,
    pub config: Arc<SyncConfig>,
    pub drag_drop: Arc<DragDropStore>,
}

impl AppContext {
    pub fn new(config: SyncConfig) -> Self {
        AppContext {
            bus: Arc::new(EventBus::new()),
            config: Arc::new(config),
            drag_drop: Arc::new(DragDropStore::new()),
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

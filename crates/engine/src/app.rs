//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{ClockPort, EntityDirectory, LayoutStore, Notifier};
use crate::infrastructure::settings::PanelSettings;
use crate::use_cases::{DragDropController, LayoutSession, SyncEngine};

/// Main application state.
///
/// One session per client; the sync engine and drag controller share it.
pub struct App {
    pub session: Arc<LayoutSession>,
    pub sync: Arc<SyncEngine>,
    pub drag_drop: Arc<DragDropController>,
}

impl App {
    pub fn new(
        store: Arc<dyn LayoutStore>,
        directory: Arc<dyn EntityDirectory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn ClockPort>,
        settings: PanelSettings,
    ) -> Self {
        let session = Arc::new(LayoutSession::new(
            store, directory, notifier, clock, settings,
        ));
        Self {
            sync: Arc::new(SyncEngine::new(session.clone())),
            drag_drop: Arc::new(DragDropController::new(session.clone())),
            session,
        }
    }

    pub fn settings(&self) -> &PanelSettings {
        self.session.settings()
    }
}

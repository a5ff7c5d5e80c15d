use crate::components::payload::Preset;
use crate::events::{Event, EventData, EventType};
use std::path::PathBuf;
use std::sync::Arc;

/// Result of an asynchronous preset parse.
#[derive(Clone, Debug, PartialEq)]
pub struct PresetEvent {
    pub path: PathBuf,
    pub preset: Option<Arc<Preset>>,
    pub error: Option<String>,
}

impl PresetEvent {
    pub fn loaded(preset: Arc<Preset>) -> Event {
        Event::new(
            EventType::PresetLoaded,
            EventData::Preset(PresetEvent {
                path: preset.path.clone(),
                preset: Some(preset),
                error: None,
            }),
        )
    }

    pub fn failed(path: impl Into<PathBuf>, error: impl Into<String>) -> Event {
        Event::new(
            EventType::PresetFailed,
            EventData::Preset(PresetEvent {
                path: path.into(),
                preset: None,
                error: Some(error.into()),
            }),
        )
    }
}

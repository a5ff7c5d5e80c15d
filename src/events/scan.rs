use crate::events::{Event, EventData, EventType};
use std::path::PathBuf;

/// Directory scan lifecycle notification.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanEvent {
    /// Root of the scan.
    pub path: PathBuf,
    /// Files found so far (progress) or in total (completed).
    pub files: usize,
    /// Failure reason for [`EventType::ScanFailed`].
    pub error: Option<String>,
}

impl ScanEvent {
    pub fn started(path: impl Into<PathBuf>) -> Event {
        Self::event(EventType::ScanStarted, path.into(), 0, None)
    }

    pub fn progress(path: impl Into<PathBuf>, files: usize) -> Event {
        Self::event(EventType::ScanProgress, path.into(), files, None)
    }

    pub fn completed(path: impl Into<PathBuf>, files: usize) -> Event {
        Self::event(EventType::ScanCompleted, path.into(), files, None)
    }

    pub fn failed(path: impl Into<PathBuf>, files: usize, error: impl Into<String>) -> Event {
        Self::event(EventType::ScanFailed, path.into(), files, Some(error.into()))
    }

    fn event(kind: EventType, path: PathBuf, files: usize, error: Option<String>) -> Event {
        Event::new(kind, EventData::Scan(ScanEvent { path, files, error }))
    }
}

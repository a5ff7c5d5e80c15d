//! Audio metadata cache.
//!
//! Row formatting on the render thread must never wait for a decoder, so
//! lookups are pull-based: [`MetadataSource::snapshot`] returns what is
//! cached right now, and [`MetadataSource::request`] asks a background
//! decoder to fill the gap. Requests are deduplicated while in flight and
//! dropped (with a warning) when the request channel is full.

use crate::components::payload::AudioMeta;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use log::{trace, warn};
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::{Path, PathBuf};

/// Non-blocking metadata lookup used by row formatters.
pub trait MetadataSource: Send + Sync {
    fn snapshot(&self, path: &Path) -> Option<AudioMeta>;
    fn request(&self, path: &Path);
}

pub struct MetadataCache {
    entries: RwLock<FxHashMap<PathBuf, AudioMeta>>,
    in_flight: Mutex<FxHashSet<PathBuf>>,
    requests: Sender<PathBuf>,
}

impl MetadataCache {
    /// Create the cache and the receiving end the decoder thread reads
    /// requests from.
    pub fn new(capacity: usize) -> (Self, Receiver<PathBuf>) {
        let (tx, rx) = bounded(capacity.max(1));
        (
            MetadataCache {
                entries: RwLock::new(FxHashMap::default()),
                in_flight: Mutex::new(FxHashSet::default()),
                requests: tx,
            },
            rx,
        )
    }

    /// Store a decoded result. Called from the decoder thread.
    pub fn insert(&self, path: PathBuf, meta: AudioMeta) {
        self.in_flight.lock().remove(&path);
        self.entries.write().insert(path, meta);
    }

    /// Forget a request the decoder could not satisfy so it can be retried.
    pub fn fail(&self, path: &Path) {
        self.in_flight.lock().remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl MetadataSource for MetadataCache {
    fn snapshot(&self, path: &Path) -> Option<AudioMeta> {
        self.entries.read().get(path).copied()
    }

    fn request(&self, path: &Path) {
        if self.entries.read().contains_key(path) {
            return;
        }
        let mut in_flight = self.in_flight.lock();
        if !in_flight.insert(path.to_path_buf()) {
            return;
        }
        match self.requests.try_send(path.to_path_buf()) {
            Ok(()) => trace!("metadata requested for {}", path.display()),
            Err(TrySendError::Full(p)) => {
                in_flight.remove(&p);
                warn!("metadata request queue full, dropping {}", p.display());
            }
            Err(TrySendError::Disconnected(p)) => {
                in_flight.remove(&p);
                warn!("metadata decoder gone, dropping {}", p.display());
            }
        }
    }
}

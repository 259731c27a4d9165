use crate::domain::{PeerId, RoomCode};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

/// Membership of one room as known to this process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomEntry {
    pub code: RoomCode,
    pub created_at: DateTime<Utc>,
    pub members: BTreeSet<PeerId>,
}

/// Process-local directory of room code → member set
///
/// Cloning yields another handle onto the same table. Every operation takes
/// the lock once, so no caller ever observes a half-applied update.
///
/// Invariant: an entry for code `C` exists iff at least one identity
/// currently claims membership in `C`.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<RoomCode, RoomEntry>>>,
}

impl RoomRegistry {
    /// Create an isolated registry (tests, embedded hosts)
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the process-wide registry
    pub fn global() -> Self {
        static GLOBAL: OnceLock<RoomRegistry> = OnceLock::new();
        GLOBAL.get_or_init(RoomRegistry::new).clone()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RoomCode, RoomEntry>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `id` to the room, creating the entry if needed (idempotent)
    pub fn register(&self, code: &RoomCode, id: &PeerId) {
        let mut rooms = self.lock();
        let entry = rooms.entry(code.clone()).or_insert_with(|| {
            tracing::debug!("Registry: room {} created", code);
            RoomEntry {
                code: code.clone(),
                created_at: Utc::now(),
                members: BTreeSet::new(),
            }
        });

        if entry.members.insert(id.clone()) {
            tracing::debug!(
                "Registry: {} joined room {} ({} members)",
                id,
                code,
                entry.members.len()
            );
        }
    }

    /// Remove `id` from the room; drops the entry once it is empty
    ///
    /// No-op if the room or member is unknown.
    pub fn unregister(&self, code: &RoomCode, id: &PeerId) {
        let mut rooms = self.lock();
        let Some(entry) = rooms.get_mut(code) else {
            return;
        };

        entry.members.remove(id);
        if entry.members.is_empty() {
            rooms.remove(code);
            tracing::debug!("Registry: room {} removed (no members left)", code);
        }
    }

    /// Check whether a room with at least one member exists
    pub fn exists(&self, code: &RoomCode) -> bool {
        self.lock()
            .get(code)
            .is_some_and(|entry| !entry.members.is_empty())
    }

    /// Snapshot of one room entry
    pub fn get(&self, code: &RoomCode) -> Option<RoomEntry> {
        self.lock().get(code).cloned()
    }

    pub fn room_count(&self) -> usize {
        self.lock().len()
    }
}

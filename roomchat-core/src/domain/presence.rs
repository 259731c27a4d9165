use crate::domain::{ConnectionStatus, Frame, PeerId};
use instant::{Duration, Instant};
use std::collections::{HashMap, HashSet};

/// Liveness state of one known remote peer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    pub id: PeerId,
    /// Last time we received any liveness signal from this peer
    pub last_seen: Instant,
}

impl PeerRecord {
    fn new(id: PeerId, now: Instant) -> Self {
        Self { id, last_seen: now }
    }

    /// Refresh liveness; `last_seen` never moves backwards
    fn touch(&mut self, now: Instant) {
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    /// Check if the peer has been silent for longer than `timeout`
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > timeout
    }
}

/// Outcome of feeding one frame to the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceChange {
    /// Previously unknown peer is now known
    Joined(PeerId),
    /// Known peer's liveness was refreshed
    Refreshed(PeerId),
    /// Known peer was removed by an explicit `leave`
    Left(PeerId),
    /// Frame had no presence effect (own frame, departed sender, unknown leaver)
    Ignored,
}

/// Tracks remote peers in the current room and derives the aggregate status
///
/// Per-peer lifecycle: `Unknown → Known(last_seen) → Removed`. A peer is
/// removed by its own `leave` (authoritative, tombstoned for the rest of the
/// session) or by [`PresenceTracker::expire`] once it has been silent for
/// longer than the timeout window.
#[derive(Debug)]
pub struct PresenceTracker {
    local_id: PeerId,
    peers: HashMap<PeerId, PeerRecord>,
    /// Identities that sent `leave`; later liveness frames from them are stale
    departed: HashSet<PeerId>,
    timeout: Duration,
    /// Deadline of the in-flight join attempt, cleared by the first peer signal
    join_deadline: Option<Instant>,
}

impl PresenceTracker {
    pub fn new(local_id: PeerId, timeout: Duration) -> Self {
        Self {
            local_id,
            peers: HashMap::new(),
            departed: HashSet::new(),
            timeout,
            join_deadline: None,
        }
    }

    pub fn local_id(&self) -> &PeerId {
        &self.local_id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Mark a join/create as in flight until `deadline`
    pub fn begin_join(&mut self, deadline: Instant) {
        if self.peers.is_empty() {
            self.join_deadline = Some(deadline);
        }
    }

    /// Apply an inbound frame
    pub fn observe(&mut self, frame: &Frame, now: Instant) -> PresenceChange {
        let sender = frame.sender_id();

        if *sender == self.local_id {
            return PresenceChange::Ignored;
        }

        if !frame.is_liveness_signal() {
            return self.remove_departed(sender);
        }

        if self.departed.contains(sender) {
            tracing::debug!(
                "Ignoring {} from departed peer {}",
                frame.kind(),
                sender
            );
            return PresenceChange::Ignored;
        }

        self.join_deadline = None;

        if let Some(record) = self.peers.get_mut(sender) {
            record.touch(now);
            PresenceChange::Refreshed(sender.clone())
        } else {
            self.peers
                .insert(sender.clone(), PeerRecord::new(sender.clone(), now));
            tracing::debug!("Peer {} is now known ({} total)", sender, self.peers.len());
            PresenceChange::Joined(sender.clone())
        }
    }

    fn remove_departed(&mut self, sender: &PeerId) -> PresenceChange {
        self.departed.insert(sender.clone());

        match self.peers.remove(sender) {
            Some(_) => {
                tracing::debug!("Peer {} left ({} remaining)", sender, self.peers.len());
                PresenceChange::Left(sender.clone())
            }
            None => PresenceChange::Ignored,
        }
    }

    /// Evict every peer silent for longer than the timeout window
    ///
    /// Returns the evicted identities in sorted order.
    pub fn expire(&mut self, now: Instant) -> Vec<PeerId> {
        let timeout = self.timeout;
        let mut expired: Vec<PeerId> = self
            .peers
            .values()
            .filter(|record| record.is_expired(now, timeout))
            .map(|record| record.id.clone())
            .collect();
        expired.sort();

        for peer_id in &expired {
            self.peers.remove(peer_id);
            tracing::warn!(
                "Peer {} timed out after {:?} without a liveness signal",
                peer_id,
                timeout
            );
        }

        expired
    }

    /// Resolve an expired join attempt
    ///
    /// Returns `true` exactly once, when the deadline has passed and no peer
    /// signal arrived before it.
    pub fn expire_join(&mut self, now: Instant) -> bool {
        match self.join_deadline {
            Some(deadline) if now >= deadline && self.peers.is_empty() => {
                self.join_deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Derived aggregate status
    pub fn status(&self) -> ConnectionStatus {
        if !self.peers.is_empty() {
            ConnectionStatus::Connected
        } else if self.join_deadline.is_some() {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Disconnected
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&PeerRecord> {
        self.peers.get(peer_id)
    }

    pub fn peers(&self) -> impl Iterator<Item = &PeerRecord> {
        self.peers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn tracker() -> PresenceTracker {
        PresenceTracker::new(PeerId::from_raw("me"), TIMEOUT)
    }

    fn peer(name: &str) -> PeerId {
        PeerId::from_raw(name)
    }

    #[test]
    fn test_own_frames_are_ignored() {
        let mut tracker = tracker();
        let now = Instant::now();

        for frame in [
            Frame::join(peer("me")),
            Frame::heartbeat(peer("me")),
            Frame::message(peer("me"), "echo"),
            Frame::leave(peer("me")),
        ] {
            assert_eq!(tracker.observe(&frame, now), PresenceChange::Ignored);
        }
        assert!(tracker.is_empty());
        assert_eq!(tracker.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_any_liveness_signal_creates_record() {
        let now = Instant::now();

        for frame in [
            Frame::join(peer("a")),
            Frame::join_response(peer("a")),
            Frame::heartbeat(peer("a")),
            Frame::message(peer("a"), "hi"),
        ] {
            let mut tracker = tracker();
            assert_eq!(
                tracker.observe(&frame, now),
                PresenceChange::Joined(peer("a"))
            );
            assert_eq!(tracker.status(), ConnectionStatus::Connected);
        }
    }

    #[test]
    fn test_known_peer_is_refreshed() {
        let mut tracker = tracker();
        let start = Instant::now();
        let later = start + Duration::from_secs(2);

        tracker.observe(&Frame::join(peer("a")), start);
        let change = tracker.observe(&Frame::heartbeat(peer("a")), later);

        assert_eq!(change, PresenceChange::Refreshed(peer("a")));
        let record = tracker.get(&peer("a")).unwrap();
        assert_eq!(record.last_seen, later);
    }

    #[test]
    fn test_last_seen_never_moves_backwards() {
        let mut tracker = tracker();
        let start = Instant::now();
        let later = start + Duration::from_secs(5);

        tracker.observe(&Frame::join(peer("a")), later);
        tracker.observe(&Frame::heartbeat(peer("a")), start);

        assert_eq!(tracker.get(&peer("a")).unwrap().last_seen, later);
    }

    #[test]
    fn test_duplicate_join_is_idempotent() {
        let mut tracker = tracker();
        let now = Instant::now();

        tracker.observe(&Frame::join(peer("a")), now);
        let change = tracker.observe(&Frame::join(peer("a")), now);

        assert_eq!(change, PresenceChange::Refreshed(peer("a")));
        assert_eq!(tracker.peer_count(), 1);
    }

    #[test]
    fn test_leave_removes_immediately() {
        let mut tracker = tracker();
        let now = Instant::now();

        tracker.observe(&Frame::join(peer("a")), now);
        let change = tracker.observe(&Frame::leave(peer("a")), now);

        assert_eq!(change, PresenceChange::Left(peer("a")));
        assert!(tracker.is_empty());
        assert_eq!(tracker.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_leave_from_unknown_peer_is_ignored() {
        let mut tracker = tracker();
        let change = tracker.observe(&Frame::leave(peer("ghost")), Instant::now());

        assert_eq!(change, PresenceChange::Ignored);
    }

    #[test]
    fn test_leave_wins_over_heartbeat_in_either_order() {
        let now = Instant::now();

        // heartbeat handled before leave
        let mut tracker_a = tracker();
        tracker_a.observe(&Frame::join(peer("a")), now);
        tracker_a.observe(&Frame::heartbeat(peer("a")), now);
        tracker_a.observe(&Frame::leave(peer("a")), now);
        assert!(!tracker_a.contains(&peer("a")));

        // stale heartbeat handled after leave
        let mut tracker_b = tracker();
        tracker_b.observe(&Frame::join(peer("a")), now);
        tracker_b.observe(&Frame::leave(peer("a")), now);
        let change = tracker_b.observe(&Frame::heartbeat(peer("a")), now);
        assert_eq!(change, PresenceChange::Ignored);
        assert!(!tracker_b.contains(&peer("a")));
        assert_eq!(tracker_b.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_leave_before_any_liveness_still_tombstones() {
        let mut tracker = tracker();
        let now = Instant::now();

        tracker.observe(&Frame::leave(peer("a")), now);
        tracker.observe(&Frame::join(peer("a")), now);

        assert!(tracker.is_empty());
    }

    #[test]
    fn test_expire_evicts_silent_peers_only() {
        let mut tracker = tracker();
        let start = Instant::now();

        tracker.observe(&Frame::join(peer("quiet")), start);
        tracker.observe(&Frame::join(peer("chatty")), start);
        tracker.observe(
            &Frame::heartbeat(peer("chatty")),
            start + Duration::from_secs(9),
        );

        // Exactly at the window boundary nothing is evicted
        assert!(tracker.expire(start + TIMEOUT).is_empty());

        let evicted = tracker.expire(start + TIMEOUT + Duration::from_millis(1));
        assert_eq!(evicted, vec![peer("quiet")]);
        assert!(tracker.contains(&peer("chatty")));
        assert_eq!(tracker.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn test_expiring_last_peer_disconnects() {
        let mut tracker = tracker();
        let start = Instant::now();

        tracker.observe(&Frame::heartbeat(peer("a")), start);
        tracker.expire(start + Duration::from_secs(11));

        assert_eq!(tracker.status(), ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_timed_out_peer_is_readmitted() {
        let mut tracker = tracker();
        let start = Instant::now();

        tracker.observe(&Frame::heartbeat(peer("a")), start);
        tracker.expire(start + Duration::from_secs(11));

        let change = tracker.observe(
            &Frame::heartbeat(peer("a")),
            start + Duration::from_secs(12),
        );
        assert_eq!(change, PresenceChange::Joined(peer("a")));
    }

    #[test]
    fn test_join_attempt_status() {
        let mut tracker = tracker();
        let start = Instant::now();
        let deadline = start + Duration::from_secs(5);

        tracker.begin_join(deadline);
        assert_eq!(tracker.status(), ConnectionStatus::Connecting);

        assert!(!tracker.expire_join(start));
        assert!(tracker.expire_join(deadline));
        assert_eq!(tracker.status(), ConnectionStatus::Disconnected);

        // Resolves only once
        assert!(!tracker.expire_join(deadline + Duration::from_secs(1)));
    }

    #[test]
    fn test_peer_signal_ends_join_attempt() {
        let mut tracker = tracker();
        let start = Instant::now();

        tracker.begin_join(start + Duration::from_secs(5));
        tracker.observe(&Frame::join_response(peer("a")), start);

        assert_eq!(tracker.status(), ConnectionStatus::Connected);

        tracker.observe(&Frame::leave(peer("a")), start);
        assert_eq!(tracker.status(), ConnectionStatus::Disconnected);
        assert!(!tracker.expire_join(start + Duration::from_secs(6)));
    }
}

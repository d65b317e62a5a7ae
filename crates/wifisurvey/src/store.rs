//! Session-scoped room store.
//!
//! The store owns every room recorded in the session. Its contents are held
//! in immutable [`Snapshot`]s: each operation builds a new snapshot, makes it
//! current, and hands it to every registered [`SnapshotObserver`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{info, warn};

use crate::form::{SubmitKind, Submission};
use crate::room::{Field, Room, RoomId};

/// One immutable version of the store's contents.
///
/// Cloning a snapshot is cheap; the room list is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    revision: u64,
    rooms: Arc<[Room]>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            revision: 0,
            rooms: Arc::from(Vec::new()),
        }
    }
}

impl Snapshot {
    /// Monotonic version number, 0 for the initial empty snapshot.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Rooms in insertion order.
    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Number of rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no rooms have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// The room with `id`, if present.
    #[must_use]
    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    /// Whether a room with `id` is present.
    #[must_use]
    pub fn contains(&self, id: RoomId) -> bool {
        self.get(id).is_some()
    }

    /// BLAKE3 digest of the contents, ignoring the revision.
    ///
    /// Two snapshots with the same rooms in the same order share a
    /// fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for room in self.rooms.iter() {
            hasher.update(room.id.to_string().as_bytes());
            for field in Field::ALL {
                hasher.update(&[0x1f]);
                hasher.update(room.value(field).as_bytes());
            }
            hasher.update(&[0x1e]);
        }
        hasher.finalize().to_hex().to_string()
    }

    fn next(&self, rooms: Vec<Room>) -> Self {
        Self {
            revision: self.revision + 1,
            rooms: Arc::from(rooms),
        }
    }

    /// A new snapshot with `room` added at the end.
    ///
    /// The caller must supply a fresh id.
    #[must_use]
    pub fn appended(&self, room: Room) -> Self {
        debug_assert!(!self.contains(room.id), "duplicate room id {}", room.id);
        let mut rooms = self.rooms.to_vec();
        rooms.push(room);
        self.next(rooms)
    }

    /// A new snapshot with the first room matching `id` replaced by `room`
    /// at the same position. Contents are unchanged when nothing matches.
    #[must_use]
    pub fn replaced(&self, id: RoomId, room: Room) -> Self {
        let mut rooms = self.rooms.to_vec();
        if let Some(slot) = rooms.iter_mut().find(|existing| existing.id == id) {
            *slot = room;
        }
        self.next(rooms)
    }

    /// A new snapshot without any room matching `id`.
    #[must_use]
    pub fn removed(&self, id: RoomId) -> Self {
        let rooms = self
            .rooms
            .iter()
            .filter(|room| room.id != id)
            .cloned()
            .collect();
        self.next(rooms)
    }
}

/// Receives every snapshot the store commits.
pub trait SnapshotObserver {
    /// Called after `snapshot` became current.
    fn on_snapshot(&mut self, snapshot: &Snapshot);
}

impl<T: SnapshotObserver> SnapshotObserver for Rc<RefCell<T>> {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.borrow_mut().on_snapshot(snapshot);
    }
}

/// The ordered collection of rooms for the current session.
#[derive(Default)]
pub struct RoomStore {
    current: Snapshot,
    observers: Vec<Box<dyn SnapshotObserver>>,
}

impl fmt::Debug for RoomStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomStore")
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl RoomStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.current
    }

    /// Register an observer and hand it the current snapshot.
    pub fn subscribe(&mut self, mut observer: Box<dyn SnapshotObserver>) {
        observer.on_snapshot(&self.current);
        self.observers.push(observer);
    }

    fn commit(&mut self, next: Snapshot) {
        self.current = next;
        for observer in &mut self.observers {
            observer.on_snapshot(&self.current);
        }
    }

    /// Add a new room at the end.
    pub fn append(&mut self, room: Room) {
        info!(id = %room.id, room = %room.room, "Adding room");
        let next = self.current.appended(room);
        self.commit(next);
    }

    /// Replace the room with `id` in place.
    ///
    /// Returns whether a room was replaced. A missing id changes nothing but
    /// still publishes a new snapshot.
    pub fn replace(&mut self, id: RoomId, room: Room) -> bool {
        let found = self.current.contains(id);
        if found {
            info!(%id, "Updating room");
        } else {
            warn!(%id, "Update of unknown room ignored");
        }
        let next = self.current.replaced(id, room);
        self.commit(next);
        found
    }

    /// Remove the room with `id`.
    ///
    /// Returns whether a room was removed. A missing id changes nothing but
    /// still publishes a new snapshot.
    pub fn remove(&mut self, id: RoomId) -> bool {
        let found = self.current.contains(id);
        if found {
            info!(%id, "Removing room");
        } else {
            warn!(%id, "Removal of unknown room ignored");
        }
        let next = self.current.removed(id);
        self.commit(next);
        found
    }

    /// Commit a validated submission: append on create, replace on update.
    pub fn apply(&mut self, submission: Submission) {
        match submission.kind {
            SubmitKind::Create => self.append(submission.room),
            SubmitKind::Update => {
                let id = submission.room.id;
                self.replace(id, submission.room);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormData, SubmissionHandler};

    fn room(name: &str) -> Room {
        let form = FormData::from_iter([
            ("room", name),
            ("signalLevel24", "-40"),
            ("signalLevel5", "-55"),
            ("speed24", "100"),
            ("speed5", "50"),
        ]);
        SubmissionHandler::default().handle(&form, None).unwrap().room
    }

    #[derive(Default)]
    struct Recorder {
        revisions: Vec<u64>,
    }

    impl SnapshotObserver for Recorder {
        fn on_snapshot(&mut self, snapshot: &Snapshot) {
            self.revisions.push(snapshot.revision());
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = RoomStore::new();
        let sala = room("Sala");
        let quarto = room("Quarto");
        store.append(sala.clone());
        let before = store.snapshot().clone();
        store.append(quarto.clone());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), before.len() + 1);
        assert_eq!(snapshot.rooms()[0], sala);
        assert_eq!(snapshot.rooms()[1], quarto);
    }

    #[test]
    fn test_replace_in_place() {
        let mut store = RoomStore::new();
        let sala = room("Sala");
        let quarto = room("Quarto");
        store.append(sala.clone());
        store.append(quarto.clone());

        let mut edited = sala.clone();
        edited.room = "Sala de estar".to_string();
        assert!(store.replace(sala.id, edited.clone()));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.rooms()[0], edited);
        assert_eq!(snapshot.rooms()[0].id, sala.id);
        assert_eq!(snapshot.rooms()[1], quarto);
    }

    #[test]
    fn test_replace_missing_is_noop() {
        let mut store = RoomStore::new();
        store.append(room("Sala"));
        let before = store.snapshot().clone();

        let stray = room("Quarto");
        assert!(!store.replace(stray.id, stray.clone()));
        assert_eq!(store.snapshot().rooms(), before.rooms());
        assert!(!store.snapshot().contains(stray.id));
    }

    #[test]
    fn test_remove() {
        let mut store = RoomStore::new();
        let sala = room("Sala");
        let quarto = room("Quarto");
        store.append(sala.clone());
        store.append(quarto.clone());

        assert!(store.remove(sala.id));
        assert_eq!(store.snapshot().len(), 1);
        assert!(!store.snapshot().contains(sala.id));
        assert_eq!(store.snapshot().rooms()[0], quarto);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = RoomStore::new();
        store.append(room("Sala"));
        let before = store.snapshot().clone();

        assert!(!store.remove(RoomId::generate()));
        assert_eq!(store.snapshot().rooms(), before.rooms());
    }

    #[test]
    fn test_operations_produce_new_snapshots() {
        let mut store = RoomStore::new();
        let sala = room("Sala");
        let first = store.snapshot().clone();
        store.append(sala.clone());
        let second = store.snapshot().clone();
        store.remove(sala.id);

        assert_eq!(first.revision(), 0);
        assert_eq!(second.revision(), 1);
        assert_eq!(store.snapshot().revision(), 2);
        assert!(first.is_empty());
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn test_apply_submission() {
        let handler = SubmissionHandler::default();
        let mut store = RoomStore::new();
        let form = FormData::from_iter([
            ("room", "Sala"),
            ("signalLevel24", "-40"),
            ("signalLevel5", "-55"),
            ("speed24", "100"),
            ("speed5", "50"),
        ]);

        store.apply(handler.handle(&form, None).unwrap());
        let id = store.snapshot().rooms()[0].id;

        let mut form = form;
        form.set("speed24", "200");
        store.apply(handler.handle(&form, Some(id)).unwrap());

        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.snapshot().rooms()[0].id, id);
        assert_eq!(store.snapshot().rooms()[0].speed_24, "200");
    }

    #[test]
    fn test_observers_see_every_snapshot() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut store = RoomStore::new();
        store.subscribe(Box::new(Rc::clone(&recorder)));

        let sala = room("Sala");
        store.append(sala.clone());
        store.replace(sala.id, sala.clone());
        store.remove(RoomId::generate());

        assert_eq!(recorder.borrow().revisions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_fingerprint_tracks_contents() {
        let mut store = RoomStore::new();
        let empty = store.snapshot().fingerprint();
        let sala = room("Sala");
        store.append(sala.clone());
        let one = store.snapshot().fingerprint();
        store.remove(RoomId::generate());

        assert_ne!(empty, one);
        assert_eq!(store.snapshot().fingerprint(), one);

        store.remove(sala.id);
        assert_eq!(store.snapshot().fingerprint(), empty);
    }

    #[test]
    fn test_store_debug() {
        let store = RoomStore::new();
        let debug_str = format!("{store:?}");
        assert!(debug_str.contains("RoomStore"));
        assert!(debug_str.contains("observers"));
    }
}

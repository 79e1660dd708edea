//! Integration tests for the player
//!
//! Drive the player through recording host doubles and check what the
//! transport, renderer and store observed.

use muply_playback::{
    Command, FileHandle, KeyValueStore, LoadId, MemoryStore, PersistenceError,
    PersistenceGateway, PlayOutcome, PlaybackError, PlaybackEvent, Player, PlayerConfig,
    PlayerState, PlaylistView, Progress, Renderer, SourceRef, Track, Transport, TransportEvent,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

// ===== Test Helpers =====

#[derive(Default)]
struct TransportLog {
    loads: Vec<(String, LoadId)>,
    plays: usize,
    pauses: usize,
    clears: usize,
    seeks: Vec<Duration>,
    volume: Option<f32>,
    refuse: Option<String>,
}

struct MockTransport(Rc<RefCell<TransportLog>>);

impl Transport for MockTransport {
    fn load(&mut self, source: &SourceRef, load_id: LoadId) {
        self.0
            .borrow_mut()
            .loads
            .push((source.as_str().to_string(), load_id));
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clears += 1;
    }

    fn play(&mut self) -> Result<(), String> {
        let mut log = self.0.borrow_mut();
        log.plays += 1;
        match &log.refuse {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }

    fn pause(&mut self) {
        self.0.borrow_mut().pauses += 1;
    }

    fn seek(&mut self, position: Duration) {
        self.0.borrow_mut().seeks.push(position);
    }

    fn set_volume(&mut self, volume: f32) {
        self.0.borrow_mut().volume = Some(volume);
    }

    fn duration(&self) -> Option<Duration> {
        None
    }

    fn current_time(&self) -> Duration {
        Duration::ZERO
    }
}

#[derive(Default)]
struct RenderLog {
    views: Vec<PlaylistView>,
    progress: Vec<Progress>,
}

struct MockRenderer(Rc<RefCell<RenderLog>>);

impl Renderer for MockRenderer {
    fn render(&mut self, view: &PlaylistView) {
        self.0.borrow_mut().views.push(view.clone());
    }

    fn render_progress(&mut self, progress: Progress) {
        self.0.borrow_mut().progress.push(progress);
    }
}

#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.0.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.0.borrow_mut().remove(key)
    }
}

struct Harness {
    player: Player,
    transport: Rc<RefCell<TransportLog>>,
    renders: Rc<RefCell<RenderLog>>,
    store: SharedStore,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(SharedStore::default(), PlayerConfig::default())
    }

    fn with_store(store: SharedStore, config: PlayerConfig) -> Self {
        let transport = Rc::new(RefCell::new(TransportLog::default()));
        let renders = Rc::new(RefCell::new(RenderLog::default()));
        let player = Player::new(
            config,
            Box::new(MockTransport(transport.clone())),
            Box::new(MockRenderer(renders.clone())),
            PersistenceGateway::new(Box::new(store.clone())),
        );
        Self {
            player,
            transport,
            renders,
            store,
        }
    }

    fn with_tracks(names: &[&str]) -> Self {
        let mut harness = Self::new();
        harness.player.add_tracks(tracks(names));
        harness.player.drain_events();
        harness
    }

    fn last_loaded(&self) -> String {
        self.transport.borrow().loads.last().unwrap().0.clone()
    }

    fn last_view(&self) -> PlaylistView {
        self.renders.borrow().views.last().unwrap().clone()
    }

    fn stored(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap()
    }

    fn active_names(&self) -> Vec<String> {
        self.player
            .active_tracks()
            .iter()
            .map(|t| t.name.clone())
            .collect()
    }

    fn canonical_names(&self) -> Vec<String> {
        self.player.tracks().iter().map(|t| t.name.clone()).collect()
    }
}

fn tracks(names: &[&str]) -> Vec<Track> {
    names
        .iter()
        .map(|n| Track::new(*n, format!("{}.mp3", n.to_lowercase())))
        .collect()
}

// ===== Navigation =====

#[test]
fn test_next_wraps_around() {
    let mut h = Harness::with_tracks(&["A", "B", "C"]);
    assert_eq!(h.player.current_index(), Some(0));

    h.player.next().unwrap();
    assert_eq!(h.player.current_index(), Some(1));
    h.player.next().unwrap();
    assert_eq!(h.player.current_index(), Some(2));
    h.player.next().unwrap();
    assert_eq!(h.player.current_index(), Some(0));
    assert_eq!(h.last_loaded(), "a.mp3");
}

#[test]
fn test_track_end_advances_forever() {
    let mut h = Harness::with_tracks(&["A", "B"]);

    for expected in [1, 0, 1, 0] {
        h.player
            .handle_transport_event(TransportEvent::Ended)
            .unwrap();
        assert_eq!(h.player.current_index(), Some(expected));
        assert_eq!(h.player.state(), PlayerState::Playing);
    }
}

#[test]
fn test_play_persists_then_renders() {
    let mut h = Harness::with_tracks(&["A", "B", "C"]);
    h.player.play_track_at(2).unwrap();

    assert_eq!(h.stored("muplyIndex").as_deref(), Some("2"));
    let view = h.last_view();
    assert_eq!(view.current_index, Some(2));
    assert_eq!(view.highlighted, Some(2));
    assert_eq!(view.now_playing, "C");
    assert_eq!(view.state, PlayerState::Playing);
}

// ===== Start failures =====

#[test]
fn test_refused_start_leaves_track_ready() {
    let mut h = Harness::with_tracks(&["A", "B"]);
    h.transport.borrow_mut().refuse = Some("NotAllowedError".into());

    let outcome = h.player.play_track_at(1).unwrap();

    assert_eq!(outcome, PlayOutcome::StartFailed("NotAllowedError".into()));
    assert_eq!(h.player.state(), PlayerState::Ready);
    assert_eq!(h.player.current_index(), Some(1));
    assert_eq!(h.last_loaded(), "b.mp3");
    assert!(h
        .player
        .drain_events()
        .iter()
        .any(|e| matches!(e, PlaybackEvent::Error { .. })));

    // A later user gesture resumes the loaded track
    h.transport.borrow_mut().refuse = None;
    assert_eq!(h.player.toggle_play_pause(), PlayerState::Playing);
}

#[test]
fn test_refused_resume_keeps_state() {
    let mut h = Harness::with_tracks(&["A"]);
    assert_eq!(h.player.toggle_play_pause(), PlayerState::Paused);

    h.transport.borrow_mut().refuse = Some("blocked".into());
    assert_eq!(h.player.toggle_play_pause(), PlayerState::Paused);
}

#[test]
fn test_async_rejection_of_current_load() {
    let mut h = Harness::with_tracks(&["A", "B"]);
    let current = h.player.load_id();

    h.player
        .handle_transport_event(TransportEvent::StartRejected {
            load_id: current,
            reason: "decode error".into(),
        })
        .unwrap();

    assert_eq!(h.player.state(), PlayerState::Ready);
}

#[test]
fn test_stale_rejection_is_ignored() {
    let mut h = Harness::with_tracks(&["A", "B"]);
    let first = h.player.load_id();
    h.player.next().unwrap();
    assert_ne!(h.player.load_id(), first);

    h.player
        .handle_transport_event(TransportEvent::StartRejected {
            load_id: first,
            reason: "aborted".into(),
        })
        .unwrap();

    assert_eq!(h.player.state(), PlayerState::Playing);
    assert_eq!(h.player.current_index(), Some(1));
}

// ===== Deletion =====

#[test]
fn test_remove_current_last_wraps_to_start() {
    let mut h = Harness::with_tracks(&["A", "B", "C"]);
    h.player.play_track_at(2).unwrap();

    h.player.delete_at(2).unwrap();

    assert_eq!(h.canonical_names(), vec!["A", "B"]);
    assert_eq!(h.player.current_index(), Some(0));
    assert_eq!(h.last_loaded(), "a.mp3");
    assert_eq!(h.player.state(), PlayerState::Playing);
}

#[test]
fn test_remove_other_track_restarts_current_position() {
    let mut h = Harness::with_tracks(&["A", "B", "C"]);
    h.player.play_track_at(1).unwrap();
    let loads = h.transport.borrow().loads.len();

    h.player.delete_at(0).unwrap();

    // Position 1 now holds C
    assert_eq!(h.player.current_index(), Some(1));
    assert_eq!(h.last_loaded(), "c.mp3");
    assert_eq!(h.transport.borrow().loads.len(), loads + 1);
}

#[test]
fn test_remove_last_track_goes_idle() {
    let mut h = Harness::with_tracks(&["A"]);

    assert_eq!(h.player.delete_at(0).unwrap(), None);

    assert_eq!(h.player.state(), PlayerState::Idle);
    assert_eq!(h.player.current_index(), None);
    assert_eq!(h.transport.borrow().clears, 1);
    assert_eq!(h.stored("muplyPlaylist").as_deref(), Some("[]"));
    let view = h.last_view();
    assert!(view.entries.is_empty());
    assert_eq!(view.now_playing, h.player.config().default_title);
}

#[test]
fn test_remove_out_of_range_is_silent_noop() {
    let mut h = Harness::with_tracks(&["A", "B"]);
    let renders = h.renders.borrow().views.len();

    assert!(matches!(
        h.player.delete_at(5),
        Err(PlaybackError::IndexOutOfBounds(5))
    ));
    h.player.dispatch(Command::Delete(5));

    assert_eq!(h.canonical_names(), vec!["A", "B"]);
    assert_eq!(h.renders.borrow().views.len(), renders);
    assert!(!h.player.has_pending_events());
}

// ===== Reordering =====

#[test]
fn test_swap_sequence() {
    let mut h = Harness::with_tracks(&["A", "B", "C", "D"]);

    h.player.reorder(0, 3).unwrap();
    assert_eq!(h.canonical_names(), vec!["D", "B", "C", "A"]);
    h.player.reorder(1, 2).unwrap();
    assert_eq!(h.canonical_names(), vec!["D", "C", "B", "A"]);
    h.player.reorder(2, 2).unwrap();
    assert_eq!(h.canonical_names(), vec!["D", "C", "B", "A"]);

    // Index is positional: still 0, which is now D
    assert_eq!(h.player.current_index(), Some(0));
    assert_eq!(h.player.current_track().unwrap().name, "D");
    assert!(h.stored("muplyPlaylist").unwrap().starts_with(r#"[{"name":"D""#));
}

#[test]
fn test_reorder_while_shuffled_leaves_canonical() {
    let mut h = Harness::with_tracks(&["A", "B", "C"]);
    h.player.toggle_shuffle();
    let before = h.active_names();

    h.player.reorder(0, 2).unwrap();

    let after = h.active_names();
    assert_eq!(after[0], before[2]);
    assert_eq!(after[2], before[0]);
    assert_eq!(h.canonical_names(), vec!["A", "B", "C"]);
}

// ===== Shuffle =====

#[test]
fn test_shuffle_buffer_reused_after_disable() {
    let mut h = Harness::with_tracks(&["A", "B", "C", "D", "E", "F"]);

    assert!(h.player.toggle_shuffle());
    let first = h.active_names();
    assert!(!h.player.toggle_shuffle());
    assert_eq!(h.active_names(), h.canonical_names());
    assert!(h.player.toggle_shuffle());

    assert_eq!(h.active_names(), first);
}

#[test]
fn test_shuffle_toggle_does_not_restart_transport() {
    let mut h = Harness::with_tracks(&["A", "B", "C"]);
    let loads = h.transport.borrow().loads.len();

    h.player.toggle_shuffle();
    h.player.toggle_shuffle();

    assert_eq!(h.transport.borrow().loads.len(), loads);
    assert_eq!(h.player.state(), PlayerState::Playing);
}

#[test]
fn test_reuse_index_policy_keeps_raw_index() {
    let mut h = Harness::with_tracks(&["A", "B", "C"]);
    h.player.play_track_at(2).unwrap();

    h.player.toggle_shuffle();

    assert_eq!(h.player.current_index(), Some(2));
}

#[test]
fn test_stale_shuffle_is_reported_until_reshuffle() {
    let mut h = Harness::with_tracks(&["A", "B"]);
    h.player.toggle_shuffle();
    h.player.toggle_shuffle();
    assert!(h.player.orderings_consistent());

    h.player.add_tracks(tracks(&["C"]));
    assert!(!h.player.orderings_consistent());

    h.player.toggle_shuffle();
    assert_eq!(h.player.len(), 2);

    h.player.reshuffle();
    assert!(h.player.orderings_consistent());
    assert_eq!(h.player.len(), 3);
}

#[test]
fn test_shuffle_delete_keeps_track_canonical() {
    let mut h = Harness::with_tracks(&["A", "B", "C"]);
    h.player.toggle_shuffle();
    let removed = h.active_names()[0].clone();

    h.player.delete_at(0).unwrap();

    assert_eq!(h.player.len(), 2);
    assert!(!h.active_names().contains(&removed));
    assert!(h.canonical_names().contains(&removed));
}

/// Empty the canonical list while a stale shuffle buffer still plays
fn playing_from_stale_buffer() -> Harness {
    let mut h = Harness::with_tracks(&["A", "B"]);
    h.player.toggle_shuffle();
    h.player.toggle_shuffle();
    h.player.delete_at(0).unwrap();
    h.player.delete_at(0).unwrap();
    assert_eq!(h.player.state(), PlayerState::Idle);

    h.player.toggle_shuffle();
    h.player.next().unwrap();
    assert_eq!(h.player.state(), PlayerState::Playing);
    h
}

#[test]
fn test_shuffle_off_into_empty_list_goes_idle() {
    let mut h = playing_from_stale_buffer();
    let clears = h.transport.borrow().clears;

    assert!(!h.player.toggle_shuffle());

    assert!(h.player.is_empty());
    assert_eq!(h.player.current_index(), None);
    assert_eq!(h.player.state(), PlayerState::Idle);
    assert_eq!(h.transport.borrow().clears, clears + 1);
    assert_eq!(h.last_view().now_playing, h.player.config().default_title);
}

#[test]
fn test_reshuffle_of_empty_list_goes_idle() {
    let mut h = playing_from_stale_buffer();

    h.player.reshuffle();

    assert!(h.player.is_empty());
    assert_eq!(h.player.current_index(), None);
    assert_eq!(h.player.state(), PlayerState::Idle);
    assert_eq!(h.player.store().entity_count(), 0);
}

// ===== Intake =====

#[test]
fn test_add_files_filters_and_autoplays() {
    let mut h = Harness::new();

    let outcome = h.player.add_files(vec![
        FileHandle::new("notes.txt", "text/plain", "blob:0"),
        FileHandle::new("01 Opening.flac", "audio/flac", "blob:1"),
        FileHandle::new("clip.mp4", "video/mp4", "blob:2"),
    ]);

    assert_eq!(outcome, Some(PlayOutcome::Started));
    assert_eq!(h.canonical_names(), vec!["01 Opening", "clip"]);
    assert_eq!(h.last_loaded(), "blob:1");
}

#[test]
fn test_add_only_rejected_files_stays_idle() {
    let mut h = Harness::new();
    h.player
        .dispatch(Command::AddFiles(vec![FileHandle::new("a.png", "image/png", "x")]));

    assert_eq!(h.player.state(), PlayerState::Idle);
    assert!(h.transport.borrow().loads.is_empty());
}

// ===== Persistence =====

#[test]
fn test_restart_resumes_saved_track() {
    let store = SharedStore::default();
    {
        let mut h = Harness::with_store(store.clone(), PlayerConfig::default());
        h.player.add_tracks(tracks(&["A", "B", "C"]));
        h.player.play_track_at(1).unwrap();
    }

    let mut h = Harness::with_store(store, PlayerConfig::default());
    assert_eq!(h.canonical_names(), vec!["A", "B", "C"]);
    assert_eq!(h.player.current_index(), Some(1));
    assert_eq!(h.player.state(), PlayerState::Idle);

    assert_eq!(h.player.start(), Some(PlayOutcome::Started));
    assert_eq!(h.last_loaded(), "b.mp3");
}

#[test]
fn test_corrupt_store_starts_empty() {
    let store = SharedStore::default();
    store
        .clone()
        .set("muplyPlaylist", "[{\"name\":")
        .unwrap();

    let mut h = Harness::with_store(store, PlayerConfig::default());
    assert!(h.player.is_empty());
    assert_eq!(h.player.start(), None);
    assert_eq!(h.last_view().now_playing, h.player.config().default_title);
}

#[test]
fn test_saved_index_out_of_range_resets() {
    let store = SharedStore::default();
    store
        .clone()
        .set("muplyPlaylist", r#"[{"name":"A","url":"a"}]"#)
        .unwrap();
    store.clone().set("muplyIndex", "9").unwrap();

    let h = Harness::with_store(store, PlayerConfig::default());
    assert_eq!(h.player.current_index(), Some(0));
}

// ===== Sessions =====

#[test]
fn test_export_document_shape() {
    let mut h = Harness::with_tracks(&["A", "B", "C"]);
    h.player.play_track_at(1).unwrap();

    let doc: serde_json::Value = serde_json::from_str(&h.player.export_json().unwrap()).unwrap();

    assert_eq!(doc["currentIndex"], 1);
    assert_eq!(doc["shuffled"], false);
    assert_eq!(doc["shuffleOrder"], serde_json::json!([]));
    assert_eq!(doc["tracks"].as_array().unwrap().len(), 3);
    assert_eq!(doc["tracks"][2]["name"], "C");
}

#[test]
fn test_export_shuffled_maps_to_canonical_indices() {
    let mut h = Harness::with_tracks(&["A", "B", "C", "D"]);
    h.player.toggle_shuffle();

    let doc = h.player.export_session();

    let mut order = doc.shuffle_order.clone();
    order.sort_unstable();
    assert_eq!(order, vec![0, 1, 2, 3]);
    let names: Vec<&str> = doc
        .shuffle_order
        .iter()
        .map(|&i| doc.tracks[i].name.as_str())
        .collect();
    assert_eq!(names, h.active_names());
}

#[test]
fn test_export_import_restores_session() {
    let mut source = Harness::with_tracks(&["A", "B", "C"]);
    source.player.toggle_shuffle();
    source.player.play_track_at(2).unwrap();
    let json = source.player.export_json().unwrap();

    let mut target = Harness::new();
    let outcome = target.player.import_session(&json).unwrap();

    assert_eq!(outcome, Some(PlayOutcome::Started));
    assert!(target.player.is_shuffled());
    assert_eq!(target.active_names(), source.active_names());
    assert_eq!(target.player.current_index(), Some(2));
    assert_eq!(target.last_loaded(), source.last_loaded());
}

#[test]
fn test_import_malformed_leaves_state() {
    let mut h = Harness::with_tracks(&["A", "B"]);
    h.player.play_track_at(1).unwrap();
    let saved = h.stored("muplyPlaylist");

    let result = h.player.import_session("{\"tracks\": [");

    assert!(matches!(result, Err(PlaybackError::ImportParse(_))));
    assert_eq!(h.canonical_names(), vec!["A", "B"]);
    assert_eq!(h.player.current_index(), Some(1));
    assert_eq!(h.stored("muplyPlaylist"), saved);
}

#[test]
fn test_import_lenient_fields() {
    let mut h = Harness::new();
    h.player
        .import_session(
            r#"{"tracks":[{"name":"Old","url":"blob:old"}],"currentIndex":4,"shuffleOrder":[7]}"#,
        )
        .unwrap();

    assert_eq!(h.canonical_names(), vec!["Old"]);
    assert_eq!(h.player.current_index(), Some(0));
    assert!(!h.player.is_shuffled());
    assert_eq!(h.last_loaded(), "blob:old");
}

#[test]
fn test_import_empty_document_goes_idle() {
    let mut h = Harness::with_tracks(&["A"]);
    assert_eq!(h.player.import_session("{}").unwrap(), None);

    assert_eq!(h.player.state(), PlayerState::Idle);
    assert!(h.player.is_empty());
    assert_eq!(h.stored("muplyPlaylist").as_deref(), Some("[]"));
}

// ===== Transport forwarding =====

#[test]
fn test_progress_reaches_renderer_and_events() {
    let mut h = Harness::with_tracks(&["A"]);
    h.player.dispatch(Command::Transport(TransportEvent::Progress {
        position: Duration::from_secs(61),
        duration: Some(Duration::from_secs(200)),
    }));

    let progress = *h.renders.borrow().progress.last().unwrap();
    assert_eq!(progress.label(), "01:01 / 03:20");
    assert_eq!(
        h.player.drain_events(),
        vec![PlaybackEvent::Progress {
            position_ms: 61_000,
            duration_ms: Some(200_000)
        }]
    );
}

#[test]
fn test_seek_and_volume_forwarded() {
    let mut h = Harness::with_tracks(&["A"]);
    h.player.dispatch(Command::Seek(Duration::from_secs(30)));
    h.player.dispatch(Command::SetVolume(0.25));

    assert_eq!(h.transport.borrow().seeks, vec![Duration::from_secs(30)]);
    assert_eq!(h.transport.borrow().volume, Some(0.25));
}

#[test]
fn test_stage_gain_command() {
    let mut h = Harness::new();
    h.player.dispatch(Command::SetStageGain {
        stage: 4,
        gain_db: -12.5,
    });

    assert_eq!(h.player.chain().stage_gain(4), Some(-12.5));
    assert_eq!(h.player.chain().gains()[..4], [0.0; 4]);
}

//! Player - playlist and transport orchestration
//!
//! Resolves the active ordering (canonical or shuffled), drives the host
//! transport, reacts to transport events, persists after every mutation and
//! re-renders last.

use crate::{
    command::Command,
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    intake::{tracks_from_files, FileHandle},
    persistence::PersistenceGateway,
    render::{PlaylistView, Progress, Renderer, ViewEntry},
    session::SessionDocument,
    shuffle::ShuffleView,
    store::PlaylistStore,
    transport::{LoadId, Transport, TransportEvent},
    types::{PlayOutcome, PlayerConfig, PlayerState, ShuffleIndexPolicy, Track, TrackKey},
};
use muply_audio::{AudioChain, ChainHost};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Playlist/playback state machine
///
/// Owns the playlist store, the shuffle view, the equalizer chain, the host
/// transport, the renderer and the persistence gateway. All transitions run
/// on the caller's thread; persistence and rendering happen before each call
/// returns.
pub struct Player {
    config: PlayerConfig,
    store: PlaylistStore,
    shuffle: ShuffleView,
    current_index: Option<usize>,
    state: PlayerState,
    load_id: LoadId,
    volume: f32,
    chain: AudioChain,
    transport: Box<dyn Transport>,
    renderer: Box<dyn Renderer>,
    persistence: PersistenceGateway,
    pending_events: Vec<PlaybackEvent>,
}

impl Player {
    /// Create a player, hydrating the playlist from persistence
    ///
    /// A corrupt saved playlist is logged and the player starts empty. Call
    /// [`start`](Self::start) to render and resume the saved track.
    pub fn new(
        config: PlayerConfig,
        mut transport: Box<dyn Transport>,
        renderer: Box<dyn Renderer>,
        persistence: PersistenceGateway,
    ) -> Self {
        let saved = persistence.load().unwrap_or_else(|e| {
            warn!("Discarding saved playlist: {}", e);
            Default::default()
        });

        let store = PlaylistStore::from_tracks(saved.tracks);
        let current_index = if store.is_empty() {
            None
        } else if saved.current_index < store.len() {
            Some(saved.current_index)
        } else {
            Some(0)
        };

        let mut chain = AudioChain::new();
        if let Err(e) = chain.set_gains(&config.stage_gains) {
            warn!("Ignoring configured stage gains: {}", e);
        }

        let volume = clamp_volume(config.volume).unwrap_or(1.0);
        transport.set_volume(volume);

        info!(tracks = store.len(), ?current_index, "Player created");

        Self {
            config,
            store,
            shuffle: ShuffleView::new(),
            current_index,
            state: PlayerState::Idle,
            load_id: LoadId::default(),
            volume,
            chain,
            transport,
            renderer,
            persistence,
            pending_events: Vec::new(),
        }
    }

    /// Create a player with in-memory persistence
    pub fn in_memory(
        config: PlayerConfig,
        transport: Box<dyn Transport>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        Self::new(config, transport, renderer, PersistenceGateway::in_memory())
    }

    // ===== Playback =====

    /// Startup resume: play the saved track, or render the idle view
    pub fn start(&mut self) -> Option<PlayOutcome> {
        self.normalize_index();
        match self.current_index {
            Some(index) => self.play_track_at(index).ok(),
            None => {
                self.render();
                None
            }
        }
    }

    /// Load and start the track at `index` of the active ordering
    ///
    /// # Errors
    /// [`PlaybackError::QueueEmpty`] or [`PlaybackError::IndexOutOfBounds`];
    /// state is left unchanged. A transport refusal is not an error, it is
    /// reported as [`PlayOutcome::StartFailed`] and leaves the track loaded
    /// in the `Ready` state.
    pub fn play_track_at(&mut self, index: usize) -> Result<PlayOutcome> {
        let active = self.active();
        if active.is_empty() {
            return Err(PlaybackError::QueueEmpty);
        }
        let key = *active
            .get(index)
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;
        let track = self
            .store
            .track(key)
            .cloned()
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;

        self.current_index = Some(index);
        self.load_id = self.load_id.next();
        self.transport.load(&track.source_ref, self.load_id);
        // Logged by the chain on failure
        let _ = self.chain.resume_host();

        debug!(index, name = %track.name, load_id = self.load_id.value(), "Loading track");
        self.pending_events.push(PlaybackEvent::TrackChanged {
            index,
            name: track.name,
        });

        let outcome = match self.transport.play() {
            Ok(()) => {
                self.set_state(PlayerState::Playing);
                PlayOutcome::Started
            }
            Err(reason) => {
                warn!(index, "Playback failed to start: {}", reason);
                self.set_state(PlayerState::Ready);
                self.emit_error(PlaybackError::StartFailed(reason.clone()).to_string());
                PlayOutcome::StartFailed(reason)
            }
        };

        self.persist();
        self.render();
        Ok(outcome)
    }

    /// Pause when playing, resume when paused or ready; no-op when idle
    pub fn toggle_play_pause(&mut self) -> PlayerState {
        match self.state {
            PlayerState::Idle => {}
            PlayerState::Playing => {
                self.transport.pause();
                self.set_state(PlayerState::Paused);
            }
            PlayerState::Paused | PlayerState::Ready => match self.transport.play() {
                Ok(()) => {
                    let _ = self.chain.resume_host();
                    self.set_state(PlayerState::Playing);
                }
                Err(reason) => {
                    warn!("Resume refused: {}", reason);
                    self.emit_error(PlaybackError::StartFailed(reason).to_string());
                }
            },
        }
        self.render();
        self.state
    }

    /// Play the next track, wrapping to the start
    pub fn next(&mut self) -> Result<PlayOutcome> {
        let len = self.active().len();
        if len == 0 {
            return Err(PlaybackError::QueueEmpty);
        }
        let index = self.current_index.map_or(0, |i| (i + 1) % len);
        self.play_track_at(index)
    }

    /// Play the previous track, wrapping to the end
    pub fn previous(&mut self) -> Result<PlayOutcome> {
        let len = self.active().len();
        if len == 0 {
            return Err(PlaybackError::QueueEmpty);
        }
        let index = self.current_index.map_or(len - 1, |i| (i + len - 1) % len);
        self.play_track_at(index)
    }

    /// Completion of the current source; the playlist loops forever
    pub fn on_track_ended(&mut self) -> Result<PlayOutcome> {
        debug!("Track ended");
        self.next()
    }

    /// Seek the current source
    pub fn seek(&mut self, position: Duration) {
        if self.state == PlayerState::Idle {
            debug!("Seek ignored while idle");
            return;
        }
        self.transport.seek(position);
    }

    /// Set output volume; clamped to 0.0-1.0, non-finite values ignored
    pub fn set_volume(&mut self, volume: f32) {
        if let Some(volume) = clamp_volume(volume) {
            self.volume = volume;
            self.transport.set_volume(volume);
        }
    }

    // ===== Playlist =====

    /// Append tracks; starts playback when the playlist was empty before
    pub fn add_tracks(&mut self, tracks: Vec<Track>) -> Option<PlayOutcome> {
        let was_empty = self.store.is_empty();
        let added = tracks.len();
        self.store.extend(tracks);

        if self.shuffle.is_enabled() && !self.shuffle.has_buffer() {
            self.shuffle.reshuffle(self.store.keys());
        }
        self.normalize_index();

        info!(added, total = self.store.len(), "Tracks added");
        self.emit_playlist_changed();
        self.persist();
        self.render();

        if was_empty && added > 0 {
            self.play_track_at(0).ok()
        } else {
            None
        }
    }

    /// Append the playable files among `files`
    pub fn add_files(&mut self, files: Vec<FileHandle>) -> Option<PlayOutcome> {
        self.add_tracks(tracks_from_files(files))
    }

    /// Remove a position of the active ordering
    ///
    /// A current index past the new end wraps to 0 and the current position
    /// is (re)started. When the active ordering becomes empty playback stops.
    pub fn delete_at(&mut self, index: usize) -> Result<Option<PlayOutcome>> {
        let removed = if self.shuffle.is_enabled() {
            self.shuffle.remove_at(index)?
        } else {
            self.store.remove_at(index)?
        };
        let released = self.store.retain_referenced(self.shuffle.order());
        debug!(index, key = removed.value(), released, "Track removed");
        self.emit_playlist_changed();

        let len = self.active().len();
        if len == 0 {
            self.stop_to_idle();
            self.persist();
            self.render();
            return Ok(None);
        }

        let current = match self.current_index {
            Some(i) if i < len => i,
            _ => 0,
        };
        self.current_index = Some(current);
        self.play_track_at(current).map(Some)
    }

    /// Swap two positions of the active ordering
    ///
    /// The current index is positional and is not adjusted.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        if self.shuffle.is_enabled() {
            self.shuffle.reorder(from, to)?;
        } else {
            self.store.reorder(from, to)?;
        }
        debug!(from, to, "Tracks swapped");
        self.emit_playlist_changed();
        self.persist();
        self.render();
        Ok(())
    }

    // ===== Shuffle =====

    /// Flip shuffle mode; the transport keeps playing
    pub fn toggle_shuffle(&mut self) -> bool {
        let current_key = self.current_key();

        if self.shuffle.is_enabled() {
            self.shuffle.disable();
        } else if self.shuffle.enable(self.store.keys()) {
            debug!(len = self.shuffle.order().len(), "Shuffle ordering generated");
        }

        if self.config.shuffle_index_policy == ShuffleIndexPolicy::FollowTrack {
            if let Some(position) =
                current_key.and_then(|key| self.active().iter().position(|&k| k == key))
            {
                self.current_index = Some(position);
            }
        }
        self.normalize_index();
        self.stop_if_empty();

        let enabled = self.shuffle.is_enabled();
        info!(enabled, "Shuffle toggled");
        self.pending_events
            .push(PlaybackEvent::ShuffleChanged { enabled });
        self.persist();
        self.render();
        enabled
    }

    /// Regenerate the shuffle ordering from the canonical ordering
    pub fn reshuffle(&mut self) {
        self.shuffle.reshuffle(self.store.keys());
        self.store.retain_referenced(self.shuffle.order());
        self.normalize_index();
        self.stop_if_empty();

        self.pending_events.push(PlaybackEvent::ShuffleChanged {
            enabled: self.shuffle.is_enabled(),
        });
        self.render();
    }

    /// Whether the shuffle buffer holds exactly the canonical tracks
    ///
    /// True when no buffer exists yet.
    pub fn orderings_consistent(&self) -> bool {
        !self.shuffle.has_buffer() || self.shuffle.is_consistent_with(self.store.keys())
    }

    // ===== Equalizer =====

    /// Set an equalizer stage gain; returns the stored (clamped) value
    pub fn set_stage_gain(&mut self, stage: usize, gain_db: f32) -> Result<f32> {
        let stored = self.chain.set_stage_gain(stage, gain_db)?;
        self.pending_events.push(PlaybackEvent::StageGainChanged {
            stage,
            gain_db: stored,
        });
        Ok(stored)
    }

    /// Wire the equalizer chain into a host audio graph
    pub fn attach_chain_host(&mut self, host: Box<dyn ChainHost>) -> Result<()> {
        self.chain.attach(host)?;
        Ok(())
    }

    /// Equalizer chain
    pub fn chain(&self) -> &AudioChain {
        &self.chain
    }

    /// Equalizer chain, for hosts running the software stages
    pub fn chain_mut(&mut self) -> &mut AudioChain {
        &mut self.chain
    }

    // ===== Sessions =====

    /// Snapshot the session as an export document
    ///
    /// Shuffle entries whose track is no longer canonical are skipped.
    pub fn export_session(&self) -> SessionDocument {
        let shuffle_order = if self.shuffle.is_enabled() {
            self.shuffle
                .order()
                .iter()
                .filter_map(|&key| self.store.position_of(key))
                .collect()
        } else {
            Vec::new()
        };

        SessionDocument {
            tracks: self.store.iter().cloned().collect(),
            current_index: self.current_index.unwrap_or(0),
            shuffled: self.shuffle.is_enabled(),
            shuffle_order,
        }
    }

    /// Export document as JSON
    pub fn export_json(&self) -> Result<String> {
        self.export_session().to_json()
    }

    /// Replace the session with an exported document
    ///
    /// # Errors
    /// [`PlaybackError::ImportParse`] on malformed input; nothing is changed.
    pub fn import_session(&mut self, text: &str) -> Result<Option<PlayOutcome>> {
        let document = SessionDocument::from_json(text)?;
        Ok(self.apply_session(document))
    }

    /// Replace the session with an already parsed document
    pub fn apply_session(&mut self, document: SessionDocument) -> Option<PlayOutcome> {
        let keys = self.store.replace(document.tracks);
        let order: Vec<TrackKey> = document
            .shuffle_order
            .iter()
            .filter_map(|&i| keys.get(i).copied())
            .collect();
        self.shuffle.restore(order, document.shuffled);
        if document.shuffled && !self.shuffle.has_buffer() {
            self.shuffle.enable(self.store.keys());
        }

        self.current_index = Some(document.current_index);
        self.normalize_index();

        info!(
            tracks = self.store.len(),
            shuffled = document.shuffled,
            "Session imported"
        );
        self.emit_playlist_changed();
        self.pending_events.push(PlaybackEvent::ShuffleChanged {
            enabled: self.shuffle.is_enabled(),
        });

        match self.current_index {
            Some(index) => {
                self.persist();
                self.render();
                self.play_track_at(index).ok()
            }
            None => {
                self.stop_to_idle();
                self.persist();
                self.render();
                None
            }
        }
    }

    // ===== Host interface =====

    /// React to a transport event
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Result<()> {
        match event {
            TransportEvent::Progress { position, duration } => {
                self.renderer.render_progress(Progress { position, duration });
                self.pending_events.push(PlaybackEvent::Progress {
                    position_ms: duration_ms(position),
                    duration_ms: duration.map(duration_ms),
                });
            }
            TransportEvent::Ended => {
                self.on_track_ended()?;
            }
            TransportEvent::StartRejected { load_id, reason } => {
                if load_id != self.load_id {
                    debug!(
                        stale = load_id.value(),
                        current = self.load_id.value(),
                        "Ignoring start rejection of superseded load"
                    );
                } else if self.state == PlayerState::Playing {
                    warn!("Playback start rejected: {}", reason);
                    self.set_state(PlayerState::Ready);
                    self.emit_error(PlaybackError::StartFailed(reason).to_string());
                    self.render();
                }
            }
        }
        Ok(())
    }

    /// Apply a command; failures are logged and never propagate
    pub fn dispatch(&mut self, command: Command) {
        let result = match command {
            Command::PlayAt(index) => self.play_track_at(index).map(drop),
            Command::TogglePlayPause => {
                self.toggle_play_pause();
                Ok(())
            }
            Command::Next => self.next().map(drop),
            Command::Previous => self.previous().map(drop),
            Command::ToggleShuffle => {
                self.toggle_shuffle();
                Ok(())
            }
            Command::Reshuffle => {
                self.reshuffle();
                Ok(())
            }
            Command::Delete(index) => self.delete_at(index).map(drop),
            Command::Reorder { from, to } => self.reorder(from, to),
            Command::AddTracks(tracks) => {
                self.add_tracks(tracks);
                Ok(())
            }
            Command::AddFiles(files) => {
                self.add_files(files);
                Ok(())
            }
            Command::Seek(position) => {
                self.seek(position);
                Ok(())
            }
            Command::SetVolume(volume) => {
                self.set_volume(volume);
                Ok(())
            }
            Command::SetStageGain { stage, gain_db } => {
                self.set_stage_gain(stage, gain_db).map(drop)
            }
            Command::Import(text) => self.import_session(&text).map(drop),
            Command::Transport(event) => self.handle_transport_event(event),
        };

        if let Err(e) = result {
            if e.is_silent() {
                debug!("Command ignored: {}", e);
            } else {
                warn!("Command failed: {}", e);
                self.emit_error(e.to_string());
            }
        }
    }

    /// Snapshot for the renderer
    pub fn view(&self) -> PlaylistView {
        let entries = self
            .active()
            .iter()
            .enumerate()
            .filter_map(|(index, &key)| {
                self.store.track(key).map(|t| ViewEntry {
                    index,
                    name: t.name.clone(),
                })
            })
            .collect::<Vec<_>>();

        let now_playing = self
            .current_track()
            .map_or_else(|| self.config.default_title.clone(), |t| t.name.clone());

        PlaylistView {
            entries,
            current_index: self.current_index,
            highlighted: if self.shuffle.is_enabled() {
                None
            } else {
                self.current_index
            },
            is_shuffled: self.shuffle.is_enabled(),
            state: self.state,
            track_count: self.store.len(),
            now_playing,
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if events are pending
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Queries =====

    /// Transport state
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Current position in the active ordering
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Track at the current position
    pub fn current_track(&self) -> Option<&Track> {
        self.current_key().and_then(|key| self.store.track(key))
    }

    /// Whether shuffle is on
    pub fn is_shuffled(&self) -> bool {
        self.shuffle.is_enabled()
    }

    /// Length of the active ordering
    pub fn len(&self) -> usize {
        self.active().len()
    }

    /// Check if the active ordering is empty
    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }

    /// Tracks of the canonical ordering
    pub fn tracks(&self) -> Vec<&Track> {
        self.store.iter().collect()
    }

    /// Tracks of the active ordering
    pub fn active_tracks(&self) -> Vec<&Track> {
        self.active()
            .iter()
            .filter_map(|&key| self.store.track(key))
            .collect()
    }

    /// Playlist backing store
    pub fn store(&self) -> &PlaylistStore {
        &self.store
    }

    /// Shuffle view
    pub fn shuffle(&self) -> &ShuffleView {
        &self.shuffle
    }

    /// Output volume (0.0-1.0)
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Generation of the latest load
    pub fn load_id(&self) -> LoadId {
        self.load_id
    }

    /// Player configuration
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Host transport
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Persistence gateway
    pub fn persistence_mut(&mut self) -> &mut PersistenceGateway {
        &mut self.persistence
    }

    // ===== Internal =====

    fn active(&self) -> &[TrackKey] {
        if self.shuffle.is_enabled() {
            self.shuffle.order()
        } else {
            self.store.keys()
        }
    }

    fn current_key(&self) -> Option<TrackKey> {
        self.current_index
            .and_then(|i| self.active().get(i).copied())
    }

    /// Keep `current_index` inside the active ordering (wrap to 0)
    fn normalize_index(&mut self) {
        let len = self.active().len();
        self.current_index = match self.current_index {
            _ if len == 0 => None,
            Some(i) if i < len => Some(i),
            _ => Some(0),
        };
    }

    /// Nothing can be current once the active ordering is empty
    fn stop_if_empty(&mut self) {
        if self.active().is_empty() && self.state != PlayerState::Idle {
            self.stop_to_idle();
        }
    }

    fn stop_to_idle(&mut self) {
        self.transport.pause();
        self.transport.clear();
        self.load_id = self.load_id.next();
        self.current_index = None;
        self.set_state(PlayerState::Idle);
        debug!("Playlist empty, transport cleared");
    }

    fn set_state(&mut self, state: PlayerState) {
        if self.state != state {
            self.state = state;
            self.pending_events
                .push(PlaybackEvent::StateChanged { state });
        }
    }

    fn persist(&mut self) {
        let index = self.current_index.unwrap_or(0);
        if let Err(e) = self.persistence.save(self.store.iter(), index) {
            warn!("Failed to persist playlist: {}", e);
            self.emit_error(e.to_string());
        }
    }

    fn render(&mut self) {
        let view = self.view();
        self.renderer.render(&view);
    }

    fn emit_playlist_changed(&mut self) {
        let length = self.active().len();
        self.pending_events
            .push(PlaybackEvent::PlaylistChanged { length });
    }

    fn emit_error(&mut self, message: String) {
        self.pending_events.push(PlaybackEvent::Error { message });
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("tracks", &self.store.len())
            .field("current_index", &self.current_index)
            .field("state", &self.state)
            .field("shuffled", &self.shuffle.is_enabled())
            .field("load_id", &self.load_id)
            .finish_non_exhaustive()
    }
}

fn clamp_volume(volume: f32) -> Option<f32> {
    volume.is_finite().then(|| volume.clamp(0.0, 1.0))
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

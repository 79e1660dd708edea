//! WASM-compatible Player wrapper

use super::host::{
    JsChainHost, JsChainHostHandle, JsRenderer, JsTransport, JsTransportHandle, LocalStorageStore,
};
use crate::{
    position_from_secs, session, Command, FileHandle, PersistenceGateway, PlaybackError, Player,
    PlayerConfig, PlayerState, TransportEvent,
};
use js_sys::Function;
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// WASM-compatible player
///
/// Wraps [`Player`] with a JavaScript-friendly API. Pending events are
/// forwarded to the `onEvent` callback after every call.
#[wasm_bindgen]
pub struct WasmPlayer {
    inner: Player,
    on_event: Option<Function>,
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Create a player persisting to `localStorage`
    ///
    /// `config` is an optional plain object in the shape of `PlayerConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        transport: JsTransportHandle,
        on_render: Function,
        on_progress: Option<Function>,
        config: JsValue,
    ) -> Result<WasmPlayer, JsValue> {
        console_error_panic_hook::set_once();

        let config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let store = LocalStorageStore::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let inner = Player::new(
            config,
            Box::new(JsTransport::new(transport)),
            Box::new(JsRenderer::new(on_render, on_progress)),
            PersistenceGateway::new(Box::new(store)),
        );

        Ok(Self {
            inner,
            on_event: None,
        })
    }

    /// Register the event callback
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&mut self, callback: Function) {
        self.on_event = Some(callback);
    }

    /// Wire the equalizer into Web Audio filter nodes
    #[wasm_bindgen(js_name = attachChainHost)]
    pub fn attach_chain_host(&mut self, handle: JsChainHostHandle) -> Result<(), JsValue> {
        let result = self
            .inner
            .attach_chain_host(Box::new(JsChainHost::new(handle)))
            .map_err(to_js);
        self.flush_events();
        result
    }

    /// Render and resume the saved track
    ///
    /// Returns false when the browser refused to start playback.
    pub fn start(&mut self) -> bool {
        let started = self.inner.start().is_some_and(|o| o.is_started());
        self.flush_events();
        started
    }

    // ===== Playback Control =====

    /// Play a position of the active ordering
    #[wasm_bindgen(js_name = playTrackAt)]
    pub fn play_track_at(&mut self, index: usize) -> Result<bool, JsValue> {
        let result = self.inner.play_track_at(index).map(|o| o.is_started());
        self.flush_events();
        result.map_err(to_js)
    }

    /// Toggle play/pause; returns the new state name
    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&mut self) -> String {
        let state = self.inner.toggle_play_pause();
        self.flush_events();
        state_name(state)
    }

    /// Skip to next track
    pub fn next(&mut self) {
        self.run(Command::Next);
    }

    /// Go to previous track
    pub fn previous(&mut self) {
        self.run(Command::Previous);
    }

    /// Seek to position in seconds
    pub fn seek(&mut self, position_secs: f64) {
        if let Some(position) = position_from_secs(position_secs) {
            self.run(Command::Seek(position));
        }
    }

    /// Set volume (0.0-1.0)
    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&mut self, volume: f32) {
        self.run(Command::SetVolume(volume));
    }

    // ===== Playlist =====

    /// Add files: an array of `{name, mimeType, sourceRef}`
    #[wasm_bindgen(js_name = addFiles)]
    pub fn add_files(&mut self, files: JsValue) -> Result<(), JsValue> {
        let files: Vec<FileHandle> = serde_wasm_bindgen::from_value(files)?;
        self.run(Command::AddFiles(files));
        Ok(())
    }

    /// Remove a position of the active ordering
    #[wasm_bindgen(js_name = deleteAt)]
    pub fn delete_at(&mut self, index: usize) {
        self.run(Command::Delete(index));
    }

    /// Swap two positions of the active ordering
    pub fn reorder(&mut self, from: usize, to: usize) {
        self.run(Command::Reorder { from, to });
    }

    /// Toggle shuffle; returns whether it is now on
    #[wasm_bindgen(js_name = toggleShuffle)]
    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = self.inner.toggle_shuffle();
        self.flush_events();
        enabled
    }

    /// Regenerate the shuffle ordering
    pub fn reshuffle(&mut self) {
        self.run(Command::Reshuffle);
    }

    // ===== Equalizer =====

    /// Set a stage gain in dB; returns the stored value
    #[wasm_bindgen(js_name = setStageGain)]
    pub fn set_stage_gain(&mut self, stage: usize, gain_db: f32) -> Result<f32, JsValue> {
        let result = self.inner.set_stage_gain(stage, gain_db);
        self.flush_events();
        result.map_err(to_js)
    }

    /// Stage gains in dB
    #[wasm_bindgen(js_name = stageGains)]
    pub fn stage_gains(&self) -> Vec<f32> {
        self.inner.chain().gains()
    }

    // ===== Sessions =====

    /// Export the session as JSON
    #[wasm_bindgen(js_name = exportJson)]
    pub fn export_json(&self) -> Result<String, JsValue> {
        self.inner.export_json().map_err(to_js)
    }

    /// File name for an export made today
    #[wasm_bindgen(js_name = exportFileName)]
    pub fn export_file_name() -> String {
        session::export_file_name_today()
    }

    /// Replace the session with an exported document
    ///
    /// Throws on malformed input; the session is left untouched.
    #[wasm_bindgen(js_name = importJson)]
    pub fn import_json(&mut self, text: &str) -> Result<(), JsValue> {
        let result = self.inner.import_session(text).map(drop);
        self.flush_events();
        result.map_err(to_js)
    }

    // ===== Transport events =====

    /// The audio element reached its end
    #[wasm_bindgen(js_name = onEnded)]
    pub fn on_ended(&mut self) {
        self.run(Command::Transport(TransportEvent::Ended));
    }

    /// Periodic time update
    #[wasm_bindgen(js_name = onTimeUpdate)]
    pub fn on_time_update(&mut self, position_secs: f64, duration_secs: Option<f64>) {
        let position = position_from_secs(position_secs).unwrap_or(Duration::ZERO);
        let duration = duration_secs.and_then(position_from_secs);
        self.run(Command::Transport(TransportEvent::Progress { position, duration }));
    }

    /// Asynchronous `play()` rejection for the load `load_id`
    #[wasm_bindgen(js_name = onStartRejected)]
    pub fn on_start_rejected(&mut self, load_id: f64, reason: String) {
        // Load ids are small non-negative integers
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let load_id = crate::LoadId::new(load_id as u64);
        self.run(Command::Transport(TransportEvent::StartRejected { load_id, reason }));
    }

    // ===== State Queries =====

    /// Current view as a plain object
    #[wasm_bindgen(js_name = getView)]
    pub fn get_view(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.view())?)
    }

    /// Current state name
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        state_name(self.inner.state())
    }

    /// Current index, if any
    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> Option<usize> {
        self.inner.current_index()
    }

    // ===== Internal =====

    fn run(&mut self, command: Command) {
        self.inner.dispatch(command);
        self.flush_events();
    }

    fn flush_events(&mut self) {
        let events = self.inner.drain_events();
        let Some(cb) = &self.on_event else {
            return;
        };
        for event in events {
            if let Ok(value) = serde_wasm_bindgen::to_value(&event) {
                cb.call1(&JsValue::NULL, &value).ok();
            }
        }
    }
}

fn to_js(error: PlaybackError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn state_name(state: PlayerState) -> String {
    match state {
        PlayerState::Idle => "idle",
        PlayerState::Ready => "ready",
        PlayerState::Playing => "playing",
        PlayerState::Paused => "paused",
    }
    .to_string()
}

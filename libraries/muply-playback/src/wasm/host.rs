//! Browser implementations of the host traits

use crate::error::PersistenceError;
use crate::persistence::KeyValueStore;
use crate::render::{PlaylistView, Progress, Renderer};
use crate::transport::{position_from_secs, LoadId, Transport};
use crate::types::SourceRef;
use js_sys::Function;
use muply_audio::{ChainError, ChainHost, ChainNode, StageSpec};
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::Storage;

fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// `window.localStorage` as a key-value store
pub struct LocalStorageStore {
    storage: Storage,
}

impl LocalStorageStore {
    /// Open the window's local storage
    pub fn open() -> Result<Self, PersistenceError> {
        let window =
            web_sys::window().ok_or_else(|| PersistenceError::store("no window object"))?;
        let storage = window
            .local_storage()
            .map_err(|e| PersistenceError::store(js_message(&e)))?
            .ok_or_else(|| PersistenceError::store("localStorage unavailable"))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistenceError::store(js_message(&e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistenceError::store(js_message(&e)))
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.storage
            .remove_item(key)
            .map_err(|e| PersistenceError::store(js_message(&e)))
    }
}

#[wasm_bindgen]
extern "C" {
    /// JS object driving an audio element
    ///
    /// `play` may throw synchronously; asynchronous rejections are reported
    /// back through `WasmPlayer.onStartRejected(loadId, reason)`.
    pub type JsTransportHandle;

    #[wasm_bindgen(method)]
    fn load(this: &JsTransportHandle, source: &str, load_id: f64);

    #[wasm_bindgen(method)]
    fn clear(this: &JsTransportHandle);

    #[wasm_bindgen(method, catch)]
    fn play(this: &JsTransportHandle) -> Result<(), JsValue>;

    #[wasm_bindgen(method)]
    fn pause(this: &JsTransportHandle);

    #[wasm_bindgen(method)]
    fn seek(this: &JsTransportHandle, seconds: f64);

    #[wasm_bindgen(method, js_name = setVolume)]
    fn set_volume(this: &JsTransportHandle, volume: f32);

    #[wasm_bindgen(method)]
    fn duration(this: &JsTransportHandle) -> f64;

    #[wasm_bindgen(method, js_name = currentTime)]
    fn current_time(this: &JsTransportHandle) -> f64;

    /// JS object owning Web Audio filter nodes
    pub type JsChainHostHandle;

    #[wasm_bindgen(method, catch, js_name = createStage)]
    fn create_stage(
        this: &JsChainHostHandle,
        index: usize,
        kind: &str,
        frequency: f32,
        q: f32,
    ) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn connect(this: &JsChainHostHandle, from: &str, to: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setStageGain)]
    fn set_stage_gain(this: &JsChainHostHandle, index: usize, gain_db: f32)
        -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch)]
    fn resume(this: &JsChainHostHandle) -> Result<(), JsValue>;
}

/// [`Transport`] over a [`JsTransportHandle`]
pub(crate) struct JsTransport {
    handle: JsTransportHandle,
}

impl JsTransport {
    pub(crate) fn new(handle: JsTransportHandle) -> Self {
        Self { handle }
    }
}

impl Transport for JsTransport {
    fn load(&mut self, source: &SourceRef, load_id: LoadId) {
        // Generations stay far below 2^53
        #[allow(clippy::cast_precision_loss)]
        self.handle.load(source.as_str(), load_id.value() as f64);
    }

    fn clear(&mut self) {
        self.handle.clear();
    }

    fn play(&mut self) -> Result<(), String> {
        self.handle.play().map_err(|e| js_message(&e))
    }

    fn pause(&mut self) {
        self.handle.pause();
    }

    fn seek(&mut self, position: Duration) {
        self.handle.seek(position.as_secs_f64());
    }

    fn set_volume(&mut self, volume: f32) {
        self.handle.set_volume(volume);
    }

    fn duration(&self) -> Option<Duration> {
        position_from_secs(self.handle.duration())
    }

    fn current_time(&self) -> Duration {
        position_from_secs(self.handle.current_time()).unwrap_or(Duration::ZERO)
    }
}

/// [`ChainHost`] over a [`JsChainHostHandle`]
pub(crate) struct JsChainHost {
    handle: JsChainHostHandle,
}

impl JsChainHost {
    pub(crate) fn new(handle: JsChainHostHandle) -> Self {
        Self { handle }
    }
}

impl ChainHost for JsChainHost {
    fn create_stage(&mut self, index: usize, spec: &StageSpec) -> muply_audio::Result<()> {
        self.handle
            .create_stage(index, spec.kind.as_str(), spec.frequency_hz, spec.q)
            .map_err(|e| ChainError::host(js_message(&e)))
    }

    fn connect(&mut self, from: ChainNode, to: ChainNode) -> muply_audio::Result<()> {
        self.handle
            .connect(&from.to_string(), &to.to_string())
            .map_err(|e| ChainError::host(js_message(&e)))
    }

    fn set_stage_gain(&mut self, index: usize, gain_db: f32) -> muply_audio::Result<()> {
        self.handle
            .set_stage_gain(index, gain_db)
            .map_err(|e| ChainError::host(js_message(&e)))
    }

    fn resume(&mut self) -> muply_audio::Result<()> {
        self.handle
            .resume()
            .map_err(|e| ChainError::host(js_message(&e)))
    }
}

/// [`Renderer`] calling JS functions with serialized views
pub(crate) struct JsRenderer {
    on_render: Function,
    on_progress: Option<Function>,
}

impl JsRenderer {
    pub(crate) fn new(on_render: Function, on_progress: Option<Function>) -> Self {
        Self {
            on_render,
            on_progress,
        }
    }
}

impl Renderer for JsRenderer {
    fn render(&mut self, view: &PlaylistView) {
        if let Ok(value) = serde_wasm_bindgen::to_value(view) {
            self.on_render.call1(&JsValue::NULL, &value).ok();
        }
    }

    fn render_progress(&mut self, progress: Progress) {
        if let Some(cb) = &self.on_progress {
            let position = JsValue::from_f64(progress.position.as_secs_f64());
            let duration = progress
                .duration
                .map_or(JsValue::NULL, |d| JsValue::from_f64(d.as_secs_f64()));
            cb.call2(&JsValue::NULL, &position, &duration).ok();
        }
    }
}

//! WASM bindings for muply-playback
//!
//! Browser host: `localStorage` persistence, a duck-typed JS transport
//! (usually wrapping an `HTMLAudioElement`), a Web Audio chain host and
//! callback-based rendering.

pub mod host;
pub mod player;

pub use host::{JsChainHostHandle, JsTransportHandle, LocalStorageStore};
pub use player::WasmPlayer;

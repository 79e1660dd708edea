//! Headless transport and console renderer

use muply_playback::{
    render::format_time, LoadId, PlayerState, PlaylistView, Progress, Renderer, SourceRef,
    Transport,
};
use std::cell::RefCell;
use std::fmt::Write;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

/// Transport that logs what a real one would do
///
/// Local sources must exist to start; URLs are always accepted.
#[derive(Debug, Default)]
pub struct LogTransport {
    loaded: Option<(SourceRef, LoadId)>,
    position: Duration,
    volume: f32,
}

impl LogTransport {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }

    pub fn loaded(&self) -> Option<&SourceRef> {
        self.loaded.as_ref().map(|(source, _)| source)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

impl Transport for LogTransport {
    fn load(&mut self, source: &SourceRef, load_id: LoadId) {
        info!(source = %source, load_id = load_id.value(), "Load");
        self.loaded = Some((source.clone(), load_id));
        self.position = Duration::ZERO;
    }

    fn clear(&mut self) {
        info!("Clear");
        self.loaded = None;
        self.position = Duration::ZERO;
    }

    fn play(&mut self) -> Result<(), String> {
        let Some((source, _)) = &self.loaded else {
            return Err("no source loaded".to_string());
        };
        let locator = source.as_str();
        if !locator.contains("://") && !Path::new(locator).exists() {
            return Err(format!("file not found: {}", locator));
        }
        info!(source = %source, "Play");
        Ok(())
    }

    fn pause(&mut self) {
        info!("Pause");
    }

    fn seek(&mut self, position: Duration) {
        debug!(position = %format_time(position), "Seek");
        self.position = position;
    }

    fn set_volume(&mut self, volume: f32) {
        debug!(volume, "Volume");
        self.volume = volume;
    }

    fn duration(&self) -> Option<Duration> {
        None
    }

    fn current_time(&self) -> Duration {
        self.position
    }
}

/// Renderer keeping the latest view for the caller to print
#[derive(Debug, Default, Clone)]
pub struct ConsoleRenderer {
    last: Rc<RefCell<Option<PlaylistView>>>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest rendered view
    pub fn last_view(&self) -> Option<PlaylistView> {
        self.last.borrow().clone()
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&mut self, view: &PlaylistView) {
        debug!(tracks = view.track_count, current = ?view.current_index, "Render");
        *self.last.borrow_mut() = Some(view.clone());
    }

    fn render_progress(&mut self, progress: Progress) {
        debug!(progress = %progress.label(), "Progress");
    }
}

fn state_label(state: PlayerState) -> &'static str {
    match state {
        PlayerState::Idle => "idle",
        PlayerState::Ready => "ready",
        PlayerState::Playing => "playing",
        PlayerState::Paused => "paused",
    }
}

/// Plain-text rendering of a view
pub fn format_view(view: &PlaylistView) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} [{}]", view.now_playing, state_label(view.state));
    if view.is_shuffled {
        out.push_str(" (shuffle)");
    }
    out.push('\n');

    for entry in &view.entries {
        let marker = if view.highlighted == Some(entry.index) {
            '>'
        } else {
            ' '
        };
        let _ = writeln!(out, "{} {:>3}  {}", marker, entry.index, entry.name);
    }

    let _ = write!(
        out,
        "{} track{}",
        view.track_count,
        if view.track_count == 1 { "" } else { "s" }
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use muply_playback::ViewEntry;

    fn view(shuffled: bool) -> PlaylistView {
        PlaylistView {
            entries: vec![
                ViewEntry {
                    index: 0,
                    name: "Alpha".into(),
                },
                ViewEntry {
                    index: 1,
                    name: "Beta".into(),
                },
            ],
            current_index: Some(1),
            highlighted: if shuffled { None } else { Some(1) },
            is_shuffled: shuffled,
            state: PlayerState::Playing,
            track_count: 2,
            now_playing: "Beta".into(),
        }
    }

    #[test]
    fn test_format_marks_current() {
        let text = format_view(&view(false));
        assert_eq!(text, "Beta [playing]\n    0  Alpha\n>   1  Beta\n2 tracks");
    }

    #[test]
    fn test_format_shuffled_has_no_marker() {
        let text = format_view(&view(true));
        assert!(text.starts_with("Beta [playing] (shuffle)\n"));
        assert!(!text.contains('>'));
    }

    #[test]
    fn test_transport_refuses_missing_file() {
        let mut transport = LogTransport::new();
        transport.load(&SourceRef::new("/no/such/file.mp3"), LoadId::default());
        assert!(transport.play().unwrap_err().contains("file not found"));

        transport.load(&SourceRef::new("https://example.com/a.mp3"), LoadId::default());
        assert!(transport.play().is_ok());
    }

    #[test]
    fn test_renderer_keeps_last_view() {
        let mut renderer = ConsoleRenderer::new();
        let handle = renderer.clone();
        renderer.render(&view(false));
        assert_eq!(handle.last_view().unwrap().now_playing, "Beta");
    }
}

//! Player wired to the headless host

use crate::cli::Action;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::file_store::JsonFileStore;
use crate::host::{format_view, ConsoleRenderer, LogTransport};
use crate::intake::collect_files;
use muply_playback::{
    position_from_secs, session, KeyValueStore, PersistenceGateway, PlayOutcome, Player,
    PlayerState,
};
use std::fmt::Write;
use std::fs;
use tracing::{info, warn};

/// Extra key holding the equalizer gains next to the session keys
pub const STAGE_GAINS_KEY: &str = "muplyStageGains";

pub struct CliSession {
    player: Player,
}

impl CliSession {
    /// Open the state file and hydrate a player from it
    pub fn open(config: &AppConfig) -> Result<Self> {
        let store = JsonFileStore::open(&config.state_file)?;
        let mut player_config = config.player.clone();

        if let Some(raw) = store.get(STAGE_GAINS_KEY)? {
            match serde_json::from_str::<Vec<f32>>(&raw) {
                Ok(gains) => player_config.stage_gains = gains,
                Err(e) => warn!("Ignoring saved stage gains: {}", e),
            }
        }

        let player = Player::new(
            player_config,
            Box::new(LogTransport::new()),
            Box::new(ConsoleRenderer::new()),
            PersistenceGateway::with_keys(Box::new(store), config.storage.clone()),
        );

        Ok(Self { player })
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// Resume the saved track (shell startup)
    pub fn start(&mut self) -> String {
        let outcome = self.player.start();
        let mut out = String::new();
        push_outcome(&mut out, outcome.as_ref());
        out.push_str(&self.view_text());
        out
    }

    /// Run one action and describe the result
    pub fn execute(&mut self, action: Action) -> Result<String> {
        let mut out = String::new();

        match action {
            Action::Add { paths } => {
                let files = collect_files(&paths)?;
                let offered = files.len();
                let before = self.player.store().len();
                let outcome = self.player.add_files(files);
                let added = self.player.store().len() - before;
                let _ = writeln!(out, "Added {} of {} file(s)", added, offered);
                push_outcome(&mut out, outcome.as_ref());
            }
            Action::List => {}
            Action::Play { index } => {
                let outcome = self.player.play_track_at(index)?;
                push_outcome(&mut out, Some(&outcome));
            }
            Action::Toggle => {
                if self.player.state() == PlayerState::Idle {
                    out.push_str("Nothing loaded\n");
                } else {
                    self.player.toggle_play_pause();
                }
            }
            Action::Next => {
                let outcome = self.player.next()?;
                push_outcome(&mut out, Some(&outcome));
            }
            Action::Prev => {
                let outcome = self.player.previous()?;
                push_outcome(&mut out, Some(&outcome));
            }
            Action::Remove { index } => {
                let outcome = self.player.delete_at(index)?;
                push_outcome(&mut out, outcome.as_ref());
            }
            Action::Move { from, to } => {
                self.player.reorder(from, to)?;
            }
            Action::Shuffle => {
                let enabled = self.player.toggle_shuffle();
                let _ = writeln!(out, "Shuffle {}", if enabled { "on" } else { "off" });
            }
            Action::Reshuffle => {
                self.player.reshuffle();
            }
            Action::Eq { stage, gain } => return self.equalizer(stage, gain),
            Action::Seek { seconds } => {
                let position = position_from_secs(seconds).ok_or_else(|| {
                    CliError::BadInput(format!("invalid position: {}", seconds))
                })?;
                self.player.seek(position);
                return Ok(String::new());
            }
            Action::Volume { level } => {
                self.player.set_volume(level);
                return Ok(format!("Volume {:.2}\n", self.player.volume()));
            }
            Action::Export { output } => {
                let path = output.unwrap_or_else(|| session::export_file_name_today().into());
                let json = self.player.export_session().to_json_pretty()?;
                fs::write(&path, json)?;
                info!(path = %path.display(), "Session exported");
                return Ok(format!("Exported to {}\n", path.display()));
            }
            Action::Import { file } => {
                let text = fs::read_to_string(&file)?;
                let outcome = self.player.import_session(&text)?;
                let _ = writeln!(out, "Imported {}", file.display());
                push_outcome(&mut out, outcome.as_ref());
            }
            Action::Shell => {
                return Err(CliError::BadInput("already in a shell".to_string()));
            }
        }

        if !self.player.orderings_consistent() && self.player.is_shuffled() {
            out.push_str("Shuffle order is stale, run `reshuffle` to include all tracks\n");
        }
        out.push_str(&self.view_text());
        Ok(out)
    }

    fn equalizer(&mut self, stage: Option<usize>, gain: Option<f32>) -> Result<String> {
        if let (Some(stage), Some(gain)) = (stage, gain) {
            let stored = self.player.set_stage_gain(stage, gain)?;
            self.save_gains()?;
            return Ok(format!("Stage {} set to {:+.1} dB\n", stage, stored));
        }

        let chain = self.player.chain();
        let mut out = String::new();
        for (index, spec) in chain.stages().iter().enumerate() {
            if stage.is_some_and(|s| s != index) {
                continue;
            }
            let gain = chain.stage_gain(index).unwrap_or(0.0);
            let _ = writeln!(
                out,
                "{:>2}  {:>6} Hz  {:+6.1} dB",
                index, spec.frequency_hz, gain
            );
        }
        if out.is_empty() {
            return Err(CliError::BadInput(format!(
                "no such stage: {}",
                stage.unwrap_or_default()
            )));
        }
        Ok(out)
    }

    fn save_gains(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.player.chain().gains())?;
        self.player
            .persistence_mut()
            .store_mut()
            .set(STAGE_GAINS_KEY, &json)?;
        Ok(())
    }

    fn view_text(&self) -> String {
        format!("{}\n", format_view(&self.player.view()))
    }
}

fn push_outcome(out: &mut String, outcome: Option<&PlayOutcome>) {
    if let Some(PlayOutcome::StartFailed(reason)) = outcome {
        let _ = writeln!(out, "Could not start playback: {}", reason);
    }
}

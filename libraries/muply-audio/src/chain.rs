//! Equalizer chain
//!
//! Fixed pipeline: source → stage₀ → … → stageₙ₋₁ → analysis tap → sink.
//! Stage order and count are set at construction. Only per-stage gain is
//! mutable afterwards.

use crate::error::{ChainError, Result};
use crate::host::{ChainHost, ChainNode};
use crate::stage::{EqStage, StageSpec, DEFAULT_STAGE_FREQUENCIES, DEFAULT_STAGE_Q};
use crate::tap::{AnalysisTap, LevelReading};
use tracing::{debug, warn};

/// Trait for audio effects that can be placed in a chain
///
/// # Real-Time Constraints
/// - No allocations in `process()`
/// - No blocking operations
pub trait AudioEffect: Send {
    /// Process interleaved stereo samples (L, R, L, R, ...) in-place
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32);

    /// Reset filter state (e.g. when changing tracks)
    fn reset(&mut self);
}

/// Equalizer chain between one source and one sink
pub struct AudioChain {
    stages: Vec<EqStage>,
    tap: AnalysisTap,
    host: Option<Box<dyn ChainHost>>,
}

impl AudioChain {
    /// Create the default five-stage chain (60, 170, 500, 2000, 8000 Hz)
    pub fn new() -> Self {
        let specs: Vec<StageSpec> = DEFAULT_STAGE_FREQUENCIES
            .iter()
            .map(|&freq| StageSpec::peaking(freq, DEFAULT_STAGE_Q))
            .collect();
        Self::with_stages(&specs)
    }

    /// Create a chain with custom stages, all at 0 dB
    pub fn with_stages(specs: &[StageSpec]) -> Self {
        Self {
            stages: specs.iter().copied().map(EqStage::new).collect(),
            tap: AnalysisTap::new(),
            host: None,
        }
    }

    /// Number of stages
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the chain has no stages
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage descriptions in pipeline order
    pub fn stages(&self) -> Vec<StageSpec> {
        self.stages.iter().map(|s| *s.spec()).collect()
    }

    /// Gain of a stage in dB
    pub fn stage_gain(&self, index: usize) -> Option<f32> {
        self.stages.get(index).map(EqStage::gain_db)
    }

    /// All gains in pipeline order
    pub fn gains(&self) -> Vec<f32> {
        self.stages.iter().map(EqStage::gain_db).collect()
    }

    /// Set the gain of one stage
    ///
    /// The value is clamped to [`MIN_GAIN_DB`](crate::MIN_GAIN_DB)..=
    /// [`MAX_GAIN_DB`](crate::MAX_GAIN_DB). When a host is attached it is
    /// updated first; a host failure leaves the stored gain unchanged.
    /// Returns the stored value.
    pub fn set_stage_gain(&mut self, index: usize, gain_db: f32) -> Result<f32> {
        let len = self.stages.len();
        if index >= len {
            return Err(ChainError::StageOutOfRange { index, len });
        }
        if !gain_db.is_finite() {
            return Err(ChainError::InvalidGain(gain_db));
        }

        let clamped = crate::stage::clamp_gain(gain_db);
        if let Some(host) = self.host.as_mut() {
            host.set_stage_gain(index, clamped)?;
        }

        let stage = &mut self.stages[index];
        let stored = stage.set_gain_db(clamped);
        stage.reset();
        debug!(stage = index, gain_db = stored, "Stage gain updated");
        Ok(stored)
    }

    /// Set every gain at once (e.g. restoring saved settings)
    ///
    /// `gains` must not be longer than the chain; missing entries keep
    /// their current value. Every entry is checked before any is applied.
    pub fn set_gains(&mut self, gains: &[f32]) -> Result<()> {
        if gains.len() > self.stages.len() {
            return Err(ChainError::StageOutOfRange {
                index: gains.len() - 1,
                len: self.stages.len(),
            });
        }
        if let Some(&bad) = gains.iter().find(|g| !g.is_finite()) {
            return Err(ChainError::InvalidGain(bad));
        }
        for (index, &gain) in gains.iter().enumerate() {
            self.set_stage_gain(index, gain)?;
        }
        Ok(())
    }

    /// Put every stage back to 0 dB
    pub fn reset_gains(&mut self) -> Result<()> {
        for index in 0..self.stages.len() {
            self.set_stage_gain(index, 0.0)?;
        }
        Ok(())
    }

    /// The fixed node order from source to sink
    pub fn topology(&self) -> Vec<ChainNode> {
        let mut nodes = Vec::with_capacity(self.stages.len() + 3);
        nodes.push(ChainNode::Source);
        nodes.extend((0..self.stages.len()).map(ChainNode::Stage));
        nodes.push(ChainNode::AnalysisTap);
        nodes.push(ChainNode::Sink);
        nodes
    }

    /// Wire the chain into a host audio graph
    ///
    /// Creates every stage node, connects consecutive nodes of
    /// [`topology`](Self::topology) and pushes the current gains. Later gain
    /// changes are mirrored into the host. Replaces any previous host.
    pub fn attach(&mut self, mut host: Box<dyn ChainHost>) -> Result<()> {
        for (index, stage) in self.stages.iter().enumerate() {
            host.create_stage(index, stage.spec())?;
        }

        let nodes = self.topology();
        for pair in nodes.windows(2) {
            host.connect(pair[0], pair[1])?;
        }

        for (index, stage) in self.stages.iter().enumerate() {
            host.set_stage_gain(index, stage.gain_db())?;
        }

        debug!(stages = self.stages.len(), "Chain attached to host graph");
        self.host = Some(host);
        Ok(())
    }

    /// Detach and return the host graph
    pub fn detach(&mut self) -> Option<Box<dyn ChainHost>> {
        self.host.take()
    }

    /// Check if a host graph is attached
    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    /// Resume the host graph, if any
    pub fn resume_host(&mut self) -> Result<()> {
        match self.host.as_mut() {
            Some(host) => host.resume().map_err(|e| {
                warn!("Host audio graph failed to resume: {}", e);
                e
            }),
            None => Ok(()),
        }
    }

    /// Run a block through the software stages and the analysis tap
    ///
    /// When a host graph is attached the host filters the signal and only
    /// the tap runs here.
    pub fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        if self.host.is_none() {
            for stage in &mut self.stages {
                stage.process(buffer, sample_rate);
            }
        }
        self.tap.observe(buffer);
    }

    /// Clear filter state and tap readings
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
        self.tap.reset();
    }

    /// Level readings from the analysis tap
    pub fn level(&self) -> LevelReading {
        self.tap.reading()
    }
}

impl Default for AudioChain {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AudioChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioChain")
            .field("stages", &self.stages())
            .field("gains", &self.gains())
            .field("attached", &self.host.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chain_has_five_neutral_stages() {
        let chain = AudioChain::new();
        assert_eq!(chain.len(), 5);
        assert_eq!(chain.gains(), vec![0.0; 5]);

        let freqs: Vec<f32> = chain.stages().iter().map(|s| s.frequency_hz).collect();
        assert_eq!(freqs, DEFAULT_STAGE_FREQUENCIES.to_vec());
    }

    #[test]
    fn set_gain_only_touches_one_stage() {
        let mut chain = AudioChain::new();
        chain.set_stage_gain(2, 6.5).unwrap();

        assert_eq!(chain.stage_gain(2), Some(6.5));
        assert_eq!(chain.gains(), vec![0.0, 0.0, 6.5, 0.0, 0.0]);
    }

    #[test]
    fn out_of_range_stage_is_an_error() {
        let mut chain = AudioChain::new();
        let err = chain.set_stage_gain(5, 1.0).unwrap_err();
        assert!(matches!(err, ChainError::StageOutOfRange { index: 5, len: 5 }));
        assert_eq!(chain.gains(), vec![0.0; 5]);
    }

    #[test]
    fn non_finite_gain_is_rejected() {
        let mut chain = AudioChain::new();
        assert!(matches!(
            chain.set_stage_gain(0, f32::NAN),
            Err(ChainError::InvalidGain(_))
        ));
        assert!(chain.set_stage_gain(0, f32::INFINITY).is_err());
        assert_eq!(chain.stage_gain(0), Some(0.0));
    }

    #[test]
    fn gains_are_clamped() {
        let mut chain = AudioChain::new();
        assert_eq!(chain.set_stage_gain(0, 99.0).unwrap(), 40.0);
        assert_eq!(chain.set_stage_gain(1, -99.0).unwrap(), -40.0);
    }

    #[test]
    fn topology_is_source_stages_tap_sink() {
        let chain = AudioChain::with_stages(&[
            StageSpec::peaking(100.0, 1.0),
            StageSpec::peaking(1000.0, 1.0),
        ]);
        assert_eq!(
            chain.topology(),
            vec![
                ChainNode::Source,
                ChainNode::Stage(0),
                ChainNode::Stage(1),
                ChainNode::AnalysisTap,
                ChainNode::Sink,
            ]
        );
    }

    #[test]
    fn flat_chain_passes_signal_and_feeds_tap() {
        let mut chain = AudioChain::new();
        let mut buffer = vec![0.5, -0.5, 0.25, -0.25];
        let original = buffer.clone();

        chain.process(&mut buffer, 44100);

        assert_eq!(buffer, original);
        assert_eq!(chain.level().peak, 0.5);
    }

    #[test]
    fn set_gains_restores_partial_list() {
        let mut chain = AudioChain::new();
        chain.set_gains(&[1.0, 2.0]).unwrap();
        assert_eq!(chain.gains(), vec![1.0, 2.0, 0.0, 0.0, 0.0]);

        assert!(chain.set_gains(&[0.0; 6]).is_err());

        // A bad entry rejects the whole list
        assert!(matches!(
            chain.set_gains(&[9.0, f32::NAN]),
            Err(ChainError::InvalidGain(_))
        ));
        assert_eq!(chain.stage_gain(0), Some(1.0));

        chain.reset_gains().unwrap();
        assert_eq!(chain.gains(), vec![0.0; 5]);
    }
}

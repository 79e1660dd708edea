//! Host audio graph interface
//!
//! Browsers and native backends usually provide their own filter nodes. A
//! host implements [`ChainHost`] and the chain drives it: node creation and
//! wiring once on attach, gain updates afterwards.

use crate::error::Result;
use crate::stage::StageSpec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Node of the fixed pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainNode {
    /// Decoded media source
    Source,

    /// Equalizer stage by position
    Stage(usize),

    /// Analysis tap feeding visualizers
    AnalysisTap,

    /// Output destination
    Sink,
}

impl fmt::Display for ChainNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Stage(index) => write!(f, "stage[{}]", index),
            Self::AnalysisTap => write!(f, "analysis-tap"),
            Self::Sink => write!(f, "sink"),
        }
    }
}

/// Audio graph provided by the host platform
pub trait ChainHost {
    /// Create the filter node for stage `index`
    fn create_stage(&mut self, index: usize, spec: &StageSpec) -> Result<()>;

    /// Connect the output of `from` to the input of `to`
    fn connect(&mut self, from: ChainNode, to: ChainNode) -> Result<()>;

    /// Apply a gain (dB) to an already created stage
    fn set_stage_gain(&mut self, index: usize, gain_db: f32) -> Result<()>;

    /// Resume a suspended graph (browsers suspend until a user gesture)
    fn resume(&mut self) -> Result<()> {
        Ok(())
    }
}

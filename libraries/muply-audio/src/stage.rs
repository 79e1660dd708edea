//! Equalizer stages
//!
//! Each stage is a peaking filter at a fixed center frequency with a single
//! adjustable gain. The software filter is only used when no host audio graph
//! provides its own filters.

use crate::chain::AudioEffect;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Center frequencies of the default chain (Hz)
pub const DEFAULT_STAGE_FREQUENCIES: [f32; 5] = [60.0, 170.0, 500.0, 2000.0, 8000.0];

/// Q factor shared by the default stages
pub const DEFAULT_STAGE_Q: f32 = 1.0;

/// Lowest accepted stage gain (dB)
pub const MIN_GAIN_DB: f32 = -40.0;

/// Highest accepted stage gain (dB)
pub const MAX_GAIN_DB: f32 = 40.0;

/// Filter kind of a stage
///
/// The chain only builds peaking stages, the enum exists so hosts can map
/// the kind onto their own filter node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Boost/cut around the center frequency
    #[default]
    Peaking,
}

impl FilterKind {
    /// Name used by web-style audio graphs (`BiquadFilterNode.type`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Peaking => "peaking",
        }
    }
}

/// Immutable description of a stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Center frequency in Hz
    pub frequency_hz: f32,

    /// Bandwidth
    pub q: f32,

    /// Filter kind
    pub kind: FilterKind,
}

impl StageSpec {
    /// Peaking stage at `frequency_hz`
    pub fn peaking(frequency_hz: f32, q: f32) -> Self {
        Self {
            frequency_hz,
            q,
            kind: FilterKind::Peaking,
        }
    }
}

/// Clamp a gain into the accepted range
#[inline]
pub fn clamp_gain(gain_db: f32) -> f32 {
    gain_db.clamp(MIN_GAIN_DB, MAX_GAIN_DB)
}

/// One equalizer stage with a stereo peaking biquad
#[derive(Debug, Clone)]
pub struct EqStage {
    spec: StageSpec,
    gain_db: f32,

    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    // Filter state (stereo)
    x1_l: f32,
    x2_l: f32,
    y1_l: f32,
    y2_l: f32,
    x1_r: f32,
    x2_r: f32,
    y1_r: f32,
    y2_r: f32,

    coefficients_rate: Option<u32>,
}

impl EqStage {
    /// Create a neutral (0 dB) stage
    pub fn new(spec: StageSpec) -> Self {
        Self {
            spec,
            gain_db: 0.0,
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1_l: 0.0,
            x2_l: 0.0,
            y1_l: 0.0,
            y2_l: 0.0,
            x1_r: 0.0,
            x2_r: 0.0,
            y1_r: 0.0,
            y2_r: 0.0,
            coefficients_rate: None,
        }
    }

    /// Stage description
    pub fn spec(&self) -> &StageSpec {
        &self.spec
    }

    /// Current gain in dB
    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    /// Set gain in dB (clamped to the accepted range)
    ///
    /// Returns the stored value.
    pub fn set_gain_db(&mut self, gain_db: f32) -> f32 {
        self.gain_db = clamp_gain(gain_db);
        self.coefficients_rate = None;
        self.gain_db
    }

    /// Whether the stage currently alters the signal
    pub fn is_neutral(&self) -> bool {
        self.gain_db.abs() < 0.01
    }

    fn update_coefficients(&mut self, sample_rate: u32) {
        if self.coefficients_rate == Some(sample_rate) {
            return;
        }
        self.coefficients_rate = Some(sample_rate);

        let sr = sample_rate as f32;
        if sr < 1.0 || self.is_neutral() {
            self.b0 = 1.0;
            self.b1 = 0.0;
            self.b2 = 0.0;
            self.a1 = 0.0;
            self.a2 = 0.0;
            return;
        }

        let a = 10.0_f32.powf(self.gain_db / 40.0);
        // Keep the center below Nyquist
        let frequency = self.spec.frequency_hz.min(sr * 0.45);
        let omega = 2.0 * PI * frequency / sr;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * self.spec.q);

        let a0 = 1.0 + alpha / a;
        self.b0 = (1.0 + alpha * a) / a0;
        self.b1 = (-2.0 * cos_omega) / a0;
        self.b2 = (1.0 - alpha * a) / a0;
        self.a1 = (-2.0 * cos_omega) / a0;
        self.a2 = (1.0 - alpha / a) / a0;
    }

    #[inline]
    fn process_frame(&mut self, left: f32, right: f32) -> (f32, f32) {
        let mut out_l = self.b0 * left + self.b1 * self.x1_l + self.b2 * self.x2_l
            - self.a1 * self.y1_l
            - self.a2 * self.y2_l;
        // Flush denormals
        if out_l.abs() < 1e-15 {
            out_l = 0.0;
        }
        self.x2_l = self.x1_l;
        self.x1_l = left;
        self.y2_l = self.y1_l;
        self.y1_l = out_l;

        let mut out_r = self.b0 * right + self.b1 * self.x1_r + self.b2 * self.x2_r
            - self.a1 * self.y1_r
            - self.a2 * self.y2_r;
        if out_r.abs() < 1e-15 {
            out_r = 0.0;
        }
        self.x2_r = self.x1_r;
        self.x1_r = right;
        self.y2_r = self.y1_r;
        self.y1_r = out_r;

        (out_l, out_r)
    }
}

impl AudioEffect for EqStage {
    fn process(&mut self, buffer: &mut [f32], sample_rate: u32) {
        if self.is_neutral() {
            return;
        }
        self.update_coefficients(sample_rate);

        for frame in buffer.chunks_exact_mut(2) {
            let (l, r) = self.process_frame(frame[0], frame[1]);
            frame[0] = l;
            frame[1] = r;
        }
    }

    fn reset(&mut self) {
        self.x1_l = 0.0;
        self.x2_l = 0.0;
        self.y1_l = 0.0;
        self.y2_l = 0.0;
        self.x1_r = 0.0;
        self.x2_r = 0.0;
        self.y1_r = 0.0;
        self.y2_r = 0.0;
    }
}

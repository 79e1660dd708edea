//! Analysis tap between the last stage and the sink
//!
//! The tap never alters the signal. It keeps level readings of the most
//! recent block for visualizers.

/// Level readings of the most recent block
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LevelReading {
    /// Highest absolute sample value
    pub peak: f32,

    /// Root mean square of the block
    pub rms: f32,

    /// Number of samples measured
    pub samples: usize,
}

/// Pass-through analysis tap
#[derive(Debug, Clone, Default)]
pub struct AnalysisTap {
    last: LevelReading,
}

impl AnalysisTap {
    /// Create a tap with empty readings
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure a block without modifying it
    pub fn observe(&mut self, buffer: &[f32]) {
        if buffer.is_empty() {
            self.last = LevelReading::default();
            return;
        }

        let mut peak = 0.0_f32;
        let mut sum_sq = 0.0_f32;
        for &sample in buffer {
            peak = peak.max(sample.abs());
            sum_sq += sample * sample;
        }

        self.last = LevelReading {
            peak,
            rms: (sum_sq / buffer.len() as f32).sqrt(),
            samples: buffer.len(),
        };
    }

    /// Readings of the last observed block
    pub fn reading(&self) -> LevelReading {
        self.last
    }

    /// Forget readings (on track change)
    pub fn reset(&mut self) {
        self.last = LevelReading::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_peak_and_rms() {
        let mut tap = AnalysisTap::new();
        tap.observe(&[0.5, -1.0, 0.5, -1.0]);

        let reading = tap.reading();
        assert_eq!(reading.peak, 1.0);
        assert!((reading.rms - 0.625_f32.sqrt()).abs() < 1e-6);
        assert_eq!(reading.samples, 4);
    }

    #[test]
    fn empty_block_clears_reading() {
        let mut tap = AnalysisTap::new();
        tap.observe(&[0.5, 0.5]);
        tap.observe(&[]);
        assert_eq!(tap.reading(), LevelReading::default());
    }
}

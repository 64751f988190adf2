/// Fixed rendering parameters shared by every buffer the engine produces.
///
/// Held explicitly by the engine rather than as process-wide constants so
/// engines with different rates or durations can coexist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Length of every rendered buffer in seconds.
    pub duration: f32,
    /// Tuning reference in Hz; patch frequencies are multiples of this.
    pub tuning: f32,
}

impl SynthConfig {
    pub fn new(sample_rate: f32, duration: f32, tuning: f32) -> Self {
        Self {
            sample_rate,
            duration,
            tuning,
        }
    }

    /// Number of samples in every buffer: ceil(sample_rate * duration).
    pub fn num_samples(&self) -> usize {
        (self.sample_rate * self.duration).ceil() as usize
    }

    /// Leading slice length used by inspection accessors (10 ms of audio).
    pub fn plot_samples(&self) -> usize {
        ((self.sample_rate / 100.0) as usize).min(self.num_samples())
    }

    /// The sample-time grid t_i = i / sample_rate.
    pub fn time_grid(&self) -> Vec<f32> {
        (0..self.num_samples())
            .map(|i| i as f32 / self.sample_rate)
            .collect()
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            duration: 1.0,
            tuning: 440.0,
        }
    }
}

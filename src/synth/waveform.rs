use std::f32::consts::PI;

use super::config::SynthConfig;

/// Basic full-buffer oscillators at a fixed frequency.
///
/// The chain model is sine-only; these exist as raw material for plain
/// additive synthesis and for exercising the mixer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

impl Waveform {
    /// Renders one full buffer of this waveform at `frequency` Hz.
    pub fn render(&self, frequency: f32, config: &SynthConfig) -> Vec<f32> {
        let phase_increment = 2.0 * PI * frequency / config.sample_rate;
        match self {
            Waveform::Sine => (0..config.num_samples())
                .map(|i| (phase_increment * i as f32).sin())
                .collect(),
            Waveform::Square => (0..config.num_samples())
                .map(|i| {
                    if (phase_increment * i as f32).sin() >= 0.0 {
                        1.0
                    } else {
                        -1.0
                    }
                })
                .collect(),
            Waveform::Sawtooth => {
                let period = config.sample_rate / frequency;
                (0..config.num_samples())
                    .map(|i| 2.0 * ((i as f32 / period).fract()) - 1.0)
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SynthConfig {
        SynthConfig::new(1000.0, 0.1, 440.0)
    }

    #[test]
    fn sine_starts_at_zero_and_stays_bounded() {
        let wave = Waveform::Sine.render(50.0, &config());
        assert_eq!(wave.len(), 100);
        assert_eq!(wave[0], 0.0);
        assert!(wave.iter().all(|s| s.abs() <= 1.0));
    }

    #[test]
    fn square_is_sign_of_sine() {
        let sine = Waveform::Sine.render(50.0, &config());
        let square = Waveform::Square.render(50.0, &config());
        for (s, q) in sine.iter().zip(&square) {
            let expected = if *s >= 0.0 { 1.0 } else { -1.0 };
            assert_eq!(*q, expected);
        }
    }

    #[test]
    fn sawtooth_ramps_within_range() {
        let saw = Waveform::Sawtooth.render(100.0, &config());
        assert!(saw.iter().all(|s| (-1.0..=1.0).contains(s)));
        // One period is 10 samples at 1 kHz; the ramp resets there.
        assert!(saw[1] > saw[0]);
        assert!((saw[0] - saw[10]).abs() < 1e-6);
    }
}

use std::f32::consts::PI;

use super::config::SynthConfig;
use super::envelope::EnvelopeSpec;
use super::error::SynthError;

/// A single phase-modulated sine oscillator.
///
/// The operator owns its rendered output buffer. The modulating input is
/// supplied externally (by the chain); `feedback` extra self-modulation
/// passes run before the final output is produced. Despite the FM naming
/// convention this is phase modulation: the modulator is added to the
/// oscillator's phase, not its frequency.
pub struct Operator {
    /// Absolute frequency in Hz (multiplier already applied to the tuning).
    frequency: f32,
    mod_index: f32,
    /// Rendered envelope; all ones when the operator has no envelope.
    envelope: Vec<f32>,
    feedback: u32,
    modulation: Vec<f32>,
    output: Vec<f32>,
}

impl Operator {
    /// Builds an operator and computes its output once.
    ///
    /// `freq_multiple` is scaled by `config.tuning` to get the oscillator
    /// frequency, matching how patches store frequencies.
    pub fn new(
        freq_multiple: f32,
        mod_index: f32,
        envelope: &EnvelopeSpec,
        feedback: u32,
        modulation: Vec<f32>,
        config: &SynthConfig,
    ) -> Result<Self, SynthError> {
        debug_assert_eq!(modulation.len(), config.num_samples());
        let mut op = Self {
            frequency: freq_multiple * config.tuning,
            mod_index,
            envelope: envelope.render(config)?,
            feedback,
            modulation,
            output: Vec::new(),
        };
        op.compute_output(config);
        Ok(op)
    }

    /// Replaces every parameter and recomputes the output.
    pub fn set_params(
        &mut self,
        freq_multiple: f32,
        mod_index: f32,
        envelope: &EnvelopeSpec,
        feedback: u32,
        config: &SynthConfig,
    ) -> Result<(), SynthError> {
        self.frequency = freq_multiple * config.tuning;
        self.mod_index = mod_index;
        self.envelope = envelope.render(config)?;
        self.feedback = feedback;
        self.compute_output(config);
        Ok(())
    }

    /// Rewires the modulating input and recomputes the output.
    pub fn set_modulation(&mut self, modulation: Vec<f32>, config: &SynthConfig) {
        debug_assert_eq!(modulation.len(), self.output.len());
        self.modulation = modulation;
        self.compute_output(config);
    }

    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// out = env ⊙ sin(2π f t + mod_index · m), with `feedback` passes
    /// feeding the result back into `m` before the final evaluation.
    fn compute_output(&mut self, config: &SynthConfig) {
        let phase_increment = 2.0 * PI * self.frequency / config.sample_rate;
        let modulated = |m: &[f32]| -> Vec<f32> {
            m.iter()
                .zip(&self.envelope)
                .enumerate()
                .map(|(i, (&m_i, &env))| {
                    env * (phase_increment * i as f32 + self.mod_index * m_i).sin()
                })
                .collect()
        };

        let mut working = self.modulation.clone();
        for _ in 0..self.feedback {
            working = modulated(&working);
        }
        self.output = modulated(&working);
    }
}

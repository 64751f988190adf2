use serde::{Deserialize, Serialize};

use super::config::SynthConfig;
use super::error::SynthError;

/// ADSR parameters. All times are in seconds; `sustain_level` is a gain
/// in [0, 1] held during the sustain segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain_length: f32,
    pub sustain_level: f32,
    pub release: f32,
}

impl EnvelopeParams {
    pub fn new(
        attack: f32,
        decay: f32,
        sustain_length: f32,
        sustain_level: f32,
        release: f32,
    ) -> Self {
        Self {
            attack,
            decay,
            sustain_length,
            sustain_level,
            release,
        }
    }

    /// Renders the ADSR curve sampled at the config's rate.
    ///
    /// Four linear segments are concatenated: 0→1 over the attack,
    /// 1→sustain_level over the decay, constant sustain, sustain_level→0
    /// over the release. Each segment spans ceil(seconds * rate) samples
    /// with inclusive endpoints. If the segments overrun the fixed buffer
    /// length the curve is hard-truncated at the buffer end; if they fall
    /// short the tail is zero-padded.
    pub fn render(&self, config: &SynthConfig) -> Result<Vec<f32>, SynthError> {
        if !(0.0..=1.0).contains(&self.sustain_level) {
            return Err(SynthError::InvalidSustainLevel(self.sustain_level));
        }
        let num_samples = config.num_samples();
        let rate = config.sample_rate;
        let segment = |seconds: f32| (seconds * rate).ceil() as usize;

        let mut adsr = Vec::with_capacity(num_samples);
        ramp_into(&mut adsr, 0.0, 1.0, segment(self.attack));
        ramp_into(&mut adsr, 1.0, self.sustain_level, segment(self.decay));
        adsr.extend(std::iter::repeat(self.sustain_level).take(segment(self.sustain_length)));
        ramp_into(&mut adsr, self.sustain_level, 0.0, segment(self.release));

        adsr.truncate(num_samples);
        adsr.resize(num_samples, 0.0);
        Ok(adsr)
    }
}

/// Appends `len` evenly spaced values from `from` to `to`, endpoints included.
fn ramp_into(buf: &mut Vec<f32>, from: f32, to: f32, len: usize) {
    match len {
        0 => {}
        1 => buf.push(from),
        _ => {
            let step = (to - from) / (len - 1) as f32;
            buf.extend((0..len).map(|i| from + step * i as f32));
        }
    }
}

/// An operator or output either has an ADSR envelope or none at all; "none"
/// renders as unity gain. Serialized as an empty array (off) or the 5-tuple
/// `[attack, decay, sustain_length, sustain_level, release]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub enum EnvelopeSpec {
    Off,
    Adsr(EnvelopeParams),
}

impl EnvelopeSpec {
    /// Renders the envelope buffer; `Off` is a buffer of all ones.
    pub fn render(&self, config: &SynthConfig) -> Result<Vec<f32>, SynthError> {
        match self {
            EnvelopeSpec::Off => Ok(vec![1.0; config.num_samples()]),
            EnvelopeSpec::Adsr(params) => params.render(config),
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, EnvelopeSpec::Off)
    }
}

impl TryFrom<Vec<f32>> for EnvelopeSpec {
    type Error = SynthError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [] => Ok(EnvelopeSpec::Off),
            &[a, d, s_len, s_level, r] => Ok(EnvelopeSpec::Adsr(EnvelopeParams::new(
                a, d, s_len, s_level, r,
            ))),
            other => Err(SynthError::MalformedEnvelope(other.len())),
        }
    }
}

impl From<EnvelopeSpec> for Vec<f32> {
    fn from(spec: EnvelopeSpec) -> Self {
        match spec {
            EnvelopeSpec::Off => Vec::new(),
            EnvelopeSpec::Adsr(p) => vec![
                p.attack,
                p.decay,
                p.sustain_length,
                p.sustain_level,
                p.release,
            ],
        }
    }
}

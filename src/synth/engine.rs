use crate::patch::{Patch, DEFAULT_OUTPUT_ENV};

use super::chain::{ChainParams, OperatorChain};
use super::config::SynthConfig;
use super::envelope::{EnvelopeParams, EnvelopeSpec};
use super::error::SynthError;

/// The synthesis core: owns a patch together with every buffer derived from
/// it, so neither can go stale without the other.
///
/// All mutation flows through the engine. A setter returns only after the
/// affected chains, the mix and the final output have been recomputed, so
/// callers always observe a consistent state. Single-threaded by design; a
/// multi-threaded host must wrap the engine in its own lock.
pub struct PatchEngine {
    config: SynthConfig,
    patch: Patch,
    chains: Vec<OperatorChain>,
    /// Normalized sum of the chain outputs, before the output envelope.
    mix: Vec<f32>,
    /// Rendered output envelope; all ones while disabled.
    output_env: Vec<f32>,
    /// Last-used output envelope parameters, kept across disable/enable.
    env_params: EnvelopeParams,
    env_enabled: bool,
    final_output: Vec<f32>,
}

impl PatchEngine {
    /// Builds every chain described by the patch and renders the full
    /// output. Fails fast on a malformed patch; no partial engine is ever
    /// produced.
    pub fn new(patch: Patch, config: SynthConfig) -> Result<Self, SynthError> {
        patch.validate()?;
        let num_samples = config.num_samples();

        let mut chains = Vec::with_capacity(patch.algorithm.len());
        for (i, &n_ops) in patch.algorithm.iter().enumerate() {
            let params = ChainParams {
                freqs: patch.freqs[i].clone(),
                mod_indices: patch.mod_indices[i].clone(),
                envs: patch.envs[i].clone(),
                feedback: patch.feedback[i].clone(),
            };
            let mod_0 = vec![patch.mod_0[i]; num_samples];
            chains.push(OperatorChain::new(i, n_ops, mod_0, params, &config)?);
        }

        let (env_params, env_enabled) = match patch.output_env {
            EnvelopeSpec::Adsr(params) => (params, true),
            EnvelopeSpec::Off => (DEFAULT_OUTPUT_ENV, false),
        };
        let output_env = patch.output_env.render(&config)?;

        let mut engine = Self {
            config,
            patch,
            chains,
            mix: Vec::new(),
            output_env,
            env_params,
            env_enabled,
            final_output: Vec::new(),
        };
        engine.remix();
        Ok(engine)
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Read-only view of the patch, for the persistence collaborator.
    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn num_chains(&self) -> usize {
        self.chains.len()
    }

    /// Replaces one chain's parameters, recomputing only the affected
    /// operator suffix, then refreshes the mix and final output.
    pub fn set_chain_params(
        &mut self,
        chain_index: usize,
        params: ChainParams,
    ) -> Result<(), SynthError> {
        let chain = self
            .chains
            .get_mut(chain_index)
            .ok_or(SynthError::ChainIndexOutOfRange {
                index: chain_index,
                count: self.patch.algorithm.len(),
            })?;
        chain.set_params(chain_index, params, &self.config)?;

        let params = chain.params();
        self.patch.freqs[chain_index] = params.freqs.clone();
        self.patch.mod_indices[chain_index] = params.mod_indices.clone();
        self.patch.envs[chain_index] = params.envs.clone();
        self.patch.feedback[chain_index] = params.feedback.clone();
        self.remix();
        Ok(())
    }

    /// Sets a per-chain volume weight and refreshes the mix.
    pub fn set_chain_volume(&mut self, chain_index: usize, volume: f32) -> Result<(), SynthError> {
        if chain_index >= self.chains.len() {
            return Err(SynthError::ChainIndexOutOfRange {
                index: chain_index,
                count: self.chains.len(),
            });
        }
        let n_chains = self.chains.len();
        let volumes = self
            .patch
            .volumes
            .get_or_insert_with(|| vec![1.0; n_chains]);
        volumes[chain_index] = volume;
        self.remix();
        Ok(())
    }

    /// Enables the output envelope with the given parameters. The
    /// parameters become the remembered set for later restore.
    pub fn set_output_envelope(&mut self, params: EnvelopeParams) -> Result<(), SynthError> {
        // Render first so a rejected envelope leaves the engine untouched.
        let rendered = params.render(&self.config)?;
        self.output_env = rendered;
        self.env_params = params;
        self.env_enabled = true;
        self.patch.output_env = EnvelopeSpec::Adsr(params);
        self.apply_output_envelope();
        Ok(())
    }

    /// Disables the output envelope (unity gain) while remembering its
    /// parameters for [`restore_output_envelope`].
    ///
    /// [`restore_output_envelope`]: PatchEngine::restore_output_envelope
    pub fn disable_output_envelope(&mut self) {
        self.output_env = vec![1.0; self.config.num_samples()];
        self.env_enabled = false;
        self.patch.output_env = EnvelopeSpec::Off;
        self.apply_output_envelope();
    }

    /// Re-enables the output envelope from the remembered parameters.
    pub fn restore_output_envelope(&mut self) -> Result<(), SynthError> {
        self.set_output_envelope(self.env_params)
    }

    pub fn has_output_envelope(&self) -> bool {
        self.env_enabled
    }

    /// Current envelope parameters if enabled, otherwise the remembered
    /// ones (what a restore would bring back).
    pub fn output_envelope_params(&self) -> EnvelopeParams {
        self.env_params
    }

    /// The rendered output envelope buffer.
    pub fn output_envelope(&self) -> &[f32] {
        &self.output_env
    }

    /// The normalized mix before the output envelope.
    pub fn output(&self) -> &[f32] {
        &self.mix
    }

    /// The enveloped mix; the only buffer meant for playback or export.
    pub fn final_output(&self) -> &[f32] {
        &self.final_output
    }

    pub fn chain_output(&self, chain_index: usize) -> Option<&[f32]> {
        self.chains.get(chain_index).map(|c| c.output())
    }

    /// Leading slice of the pre-envelope mix, for display.
    pub fn output_window(&self) -> &[f32] {
        &self.mix[..self.config.plot_samples()]
    }

    /// Leading slice of one chain's output, for display.
    pub fn chain_output_window(&self, chain_index: usize) -> Option<&[f32]> {
        self.chain_output(chain_index)
            .map(|out| &out[..self.config.plot_samples()])
    }

    fn volumes(&self) -> Vec<f32> {
        self.patch
            .volumes
            .clone()
            .unwrap_or_else(|| vec![1.0; self.chains.len()])
    }

    fn remix(&mut self) {
        let outputs: Vec<&[f32]> = self.chains.iter().map(|c| c.output()).collect();
        self.mix = additive_mix(&outputs, &self.volumes());
        self.apply_output_envelope();
    }

    fn apply_output_envelope(&mut self) {
        debug_assert_eq!(self.mix.len(), self.output_env.len());
        self.final_output = self
            .mix
            .iter()
            .zip(&self.output_env)
            .map(|(&s, &e)| s * e)
            .collect();
    }
}

/// Pointwise weighted sum of equal-length buffers, normalized to a peak
/// magnitude of 1.0. An all-zero sum is returned as-is ("silence") rather
/// than dividing by zero.
pub fn additive_mix(buffers: &[&[f32]], volumes: &[f32]) -> Vec<f32> {
    debug_assert_eq!(buffers.len(), volumes.len());
    let len = buffers.first().map_or(0, |b| b.len());
    debug_assert!(buffers.iter().all(|b| b.len() == len));

    let mut sum = vec![0.0f32; len];
    for (buffer, &volume) in buffers.iter().zip(volumes) {
        for (acc, &s) in sum.iter_mut().zip(*buffer) {
            *acc += volume * s;
        }
    }
    let peak = sum.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > 0.0 {
        for s in &mut sum {
            *s /= peak;
        }
    }
    sum
}

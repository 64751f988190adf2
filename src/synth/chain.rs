use super::config::SynthConfig;
use super::envelope::EnvelopeSpec;
use super::error::SynthError;
use super::operator::Operator;

/// Per-operator parameters of one chain, index 0 being the first operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainParams {
    /// Frequency multiples of the tuning reference.
    pub freqs: Vec<f32>,
    pub mod_indices: Vec<f32>,
    pub envs: Vec<EnvelopeSpec>,
    pub feedback: Vec<u32>,
}

impl ChainParams {
    fn check_lengths(&self, chain: usize, n_ops: usize) -> Result<(), SynthError> {
        let fields: [(&'static str, usize); 4] = [
            ("freqs", self.freqs.len()),
            ("mod_indices", self.mod_indices.len()),
            ("envs", self.envs.len()),
            ("feedback", self.feedback.len()),
        ];
        for (field, got) in fields {
            if got != n_ops {
                return Err(SynthError::StructureMismatch {
                    field,
                    chain,
                    got,
                    expected: n_ops,
                });
            }
        }
        Ok(())
    }

    fn op(&self, i: usize) -> (f32, f32, EnvelopeSpec, u32) {
        (
            self.freqs[i],
            self.mod_indices[i],
            self.envs[i],
            self.feedback[i],
        )
    }
}

/// An ordered sequence of operators where each operator's output modulates
/// the next. The last operator's output is the chain's output.
///
/// Operators are grouped by chain because a parameter change in one chain
/// never affects another chain's output, and because a change to operator
/// `i` only invalidates operators `i..n`: the chain recomputes that suffix
/// and nothing else.
pub struct OperatorChain {
    params: ChainParams,
    /// Seed modulation for the first operator, normally all zeros.
    mod_0: Vec<f32>,
    operators: Vec<Operator>,
}

impl OperatorChain {
    /// Builds `n_ops` operators wired in sequence, each fed by its
    /// predecessor's output and the first by the `mod_0` seed.
    pub fn new(
        chain_index: usize,
        n_ops: usize,
        mod_0: Vec<f32>,
        params: ChainParams,
        config: &SynthConfig,
    ) -> Result<Self, SynthError> {
        if n_ops == 0 {
            return Err(SynthError::EmptyChain { chain: chain_index });
        }
        params.check_lengths(chain_index, n_ops)?;

        let mut operators: Vec<Operator> = Vec::with_capacity(n_ops);
        for i in 0..n_ops {
            let modulation = match operators.last() {
                Some(prev) => prev.output().to_vec(),
                None => mod_0.clone(),
            };
            let (freq, mod_index, env, feedback) = params.op(i);
            operators.push(Operator::new(
                freq, mod_index, &env, feedback, modulation, config,
            )?);
        }
        Ok(Self {
            params,
            mod_0,
            operators,
        })
    }

    pub fn n_ops(&self) -> usize {
        self.operators.len()
    }

    /// The chain's output: the last operator's output buffer.
    pub fn output(&self) -> &[f32] {
        self.operators
            .last()
            .map(|op| op.output())
            .unwrap_or_default()
    }

    /// An individual operator's current output, for inspection.
    pub fn operator_output(&self, index: usize) -> Option<&[f32]> {
        self.operators.get(index).map(|op| op.output())
    }

    pub fn params(&self) -> &ChainParams {
        &self.params
    }

    /// Applies a full set of new parameters, recomputing only the suffix of
    /// operators actually affected.
    ///
    /// The first operator whose stored (freq, mod_index, env, feedback)
    /// tuple differs from the incoming one marks the start of the suffix;
    /// if none differs before the last operator, only the last operator is
    /// recomputed. Changing operator `i` therefore costs O(n - i) operator
    /// computations. On any error the chain is left unchanged.
    pub fn set_params(
        &mut self,
        chain_index: usize,
        params: ChainParams,
        config: &SynthConfig,
    ) -> Result<(), SynthError> {
        let n_ops = self.n_ops();
        params.check_lengths(chain_index, n_ops)?;
        for env in &params.envs {
            if let EnvelopeSpec::Adsr(p) = env {
                if !(0.0..=1.0).contains(&p.sustain_level) {
                    return Err(SynthError::InvalidSustainLevel(p.sustain_level));
                }
            }
        }

        let start = (0..n_ops - 1)
            .find(|&i| params.op(i) != self.params.op(i))
            .unwrap_or(n_ops - 1);

        // Operator `start` keeps its existing modulating input; everything
        // after it is rewired to its (recomputed) predecessor.
        let (freq, mod_index, env, feedback) = params.op(start);
        self.operators[start].set_params(freq, mod_index, &env, feedback, config)?;
        for i in start + 1..n_ops {
            let modulation = self.operators[i - 1].output().to_vec();
            let (freq, mod_index, env, feedback) = params.op(i);
            self.operators[i].set_params(freq, mod_index, &env, feedback, config)?;
            self.operators[i].set_modulation(modulation, config);
        }
        self.params = params;
        Ok(())
    }

    /// The seed buffer feeding the first operator.
    pub fn mod_0(&self) -> &[f32] {
        &self.mod_0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::envelope::EnvelopeParams;

    fn config() -> SynthConfig {
        SynthConfig::new(1000.0, 0.1, 440.0)
    }

    fn params(n: usize) -> ChainParams {
        ChainParams {
            freqs: vec![1.0; n],
            mod_indices: vec![1.0; n],
            envs: vec![EnvelopeSpec::Off; n],
            feedback: vec![0; n],
        }
    }

    fn chain(n: usize, config: &SynthConfig) -> OperatorChain {
        OperatorChain::new(0, n, vec![0.0; config.num_samples()], params(n), config).unwrap()
    }

    #[test]
    fn zero_operator_chain_is_rejected() {
        let config = config();
        let err = OperatorChain::new(3, 0, vec![0.0; 100], params(0), &config);
        assert!(matches!(err, Err(SynthError::EmptyChain { chain: 3 })));
    }

    #[test]
    fn mismatched_param_lengths_are_rejected() {
        let config = config();
        let mut p = params(3);
        p.mod_indices.pop();
        let err = OperatorChain::new(1, 3, vec![0.0; 100], p, &config);
        assert!(matches!(
            err,
            Err(SynthError::StructureMismatch {
                field: "mod_indices",
                chain: 1,
                got: 2,
                expected: 3,
            })
        ));
    }

    #[test]
    fn output_is_last_operator_output() {
        let config = config();
        let c = chain(3, &config);
        assert_eq!(c.output(), c.operator_output(2).unwrap());
        assert_eq!(c.output().len(), config.num_samples());
    }

    #[test]
    fn suffix_change_leaves_prefix_untouched() {
        let config = config();
        let mut c = chain(3, &config);
        let before_0 = c.operator_output(0).unwrap().to_vec();
        let before_1 = c.operator_output(1).unwrap().to_vec();
        let before_2 = c.operator_output(2).unwrap().to_vec();

        let mut p = params(3);
        p.freqs[1] = 2.0;
        c.set_params(0, p, &config).unwrap();

        // Operator 0 is upstream of the change: bit-identical output.
        assert_eq!(c.operator_output(0).unwrap(), before_0.as_slice());
        // Operators 1 and 2 were recomputed with new inputs.
        assert_ne!(c.operator_output(1).unwrap(), before_1.as_slice());
        assert_ne!(c.operator_output(2).unwrap(), before_2.as_slice());
    }

    #[test]
    fn identical_params_keep_the_output_stable() {
        let config = config();
        let mut c = chain(2, &config);
        let before = c.output().to_vec();
        c.set_params(0, params(2), &config).unwrap();
        assert_eq!(c.output(), before.as_slice());
    }

    #[test]
    fn single_operator_chain_recomputes_on_every_set() {
        let config = config();
        let mut c = chain(1, &config);
        let before = c.output().to_vec();
        let mut p = params(1);
        p.freqs[0] = 3.0;
        c.set_params(0, p, &config).unwrap();
        assert_ne!(c.output(), before.as_slice());
    }

    #[test]
    fn invalid_envelope_in_set_params_is_rejected_before_mutation() {
        let config = config();
        let mut c = chain(2, &config);
        let before = c.params().clone();
        let mut p = params(2);
        p.envs[0] = EnvelopeSpec::Adsr(EnvelopeParams::new(0.1, 0.1, 0.1, 2.0, 0.1));
        assert!(c.set_params(0, p, &config).is_err());
        assert_eq!(c.params(), &before);
    }
}

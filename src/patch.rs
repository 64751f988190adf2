//! Patch persistence: the declarative description of a sound.
//!
//! A patch is plain data, serialized as JSON with per-chain parallel arrays
//! keyed by the `algorithm` (operators per chain). The engine owns a patch
//! and mutates it only through its own API; this module only validates,
//! loads, saves and builds patches.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::synth::envelope::{EnvelopeParams, EnvelopeSpec};
use crate::synth::error::SynthError;

/// Output envelope of [`Patch::default`]; also the parameters remembered by
/// an engine whose patch starts without an output envelope.
pub const DEFAULT_OUTPUT_ENV: EnvelopeParams = EnvelopeParams {
    attack: 0.0125,
    decay: 0.025,
    sustain_length: 0.15,
    sustain_level: 0.7,
    release: 0.05,
};

/// Complete declarative description of a sound.
///
/// Every outer `Vec` has one entry per chain; every inner `Vec` has one
/// entry per operator, with lengths dictated by `algorithm`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Operators per chain; length is the number of chains.
    pub algorithm: Vec<usize>,
    /// Frequency multiples of the tuning reference.
    pub freqs: Vec<Vec<f32>>,
    pub mod_indices: Vec<Vec<f32>>,
    pub envs: Vec<Vec<EnvelopeSpec>>,
    pub feedback: Vec<Vec<u32>>,
    /// Constant seed modulation for each chain's first operator.
    pub mod_0: Vec<f32>,
    pub output_env: EnvelopeSpec,
    /// Optional per-chain weights applied before the mix is normalized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<f32>>,
}

impl Patch {
    /// A fresh patch for the given algorithm: unit frequencies and
    /// modulation indices, no envelopes, no feedback, zero seeds.
    pub fn from_algorithm(algorithm: &[usize]) -> Result<Self, SynthError> {
        let n_ops: usize = algorithm.iter().sum();
        let patch = Self {
            algorithm: algorithm.to_vec(),
            freqs: reshape(&vec![1.0; n_ops], algorithm)?,
            mod_indices: reshape(&vec![1.0; n_ops], algorithm)?,
            envs: reshape(&vec![EnvelopeSpec::Off; n_ops], algorithm)?,
            feedback: reshape(&vec![0; n_ops], algorithm)?,
            mod_0: vec![0.0; algorithm.len()],
            output_env: EnvelopeSpec::Off,
            volumes: None,
        };
        patch.validate()?;
        Ok(patch)
    }

    /// Checks every per-chain array against `algorithm` and every per-chain
    /// list against the chain count. A patch that fails here is never
    /// handed to the engine.
    pub fn validate(&self) -> Result<(), SynthError> {
        let n_chains = self.algorithm.len();
        if n_chains == 0 {
            return Err(SynthError::EmptyPatch);
        }
        for (chain, &n_ops) in self.algorithm.iter().enumerate() {
            if n_ops == 0 {
                return Err(SynthError::EmptyChain { chain });
            }
            let fields: [(&'static str, usize); 4] = [
                ("freqs", self.freqs.get(chain).map_or(0, Vec::len)),
                ("mod_indices", self.mod_indices.get(chain).map_or(0, Vec::len)),
                ("envs", self.envs.get(chain).map_or(0, Vec::len)),
                ("feedback", self.feedback.get(chain).map_or(0, Vec::len)),
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
        }
        let chain_lists: [(&'static str, usize); 4] = [
            ("freqs", self.freqs.len()),
            ("mod_indices", self.mod_indices.len()),
            ("envs", self.envs.len()),
            ("feedback", self.feedback.len()),
        ];
        for (field, got) in chain_lists {
            if got != n_chains {
                return Err(SynthError::ChainCountMismatch {
                    field,
                    got,
                    expected: n_chains,
                });
            }
        }
        if self.mod_0.len() != n_chains {
            return Err(SynthError::ChainCountMismatch {
                field: "mod_0",
                got: self.mod_0.len(),
                expected: n_chains,
            });
        }
        if let Some(volumes) = &self.volumes {
            if volumes.len() != n_chains {
                return Err(SynthError::ChainCountMismatch {
                    field: "volumes",
                    got: volumes.len(),
                    expected: n_chains,
                });
            }
        }
        Ok(())
    }

    /// Reads and validates a patch from JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SynthError> {
        let patch: Patch = serde_json::from_reader(reader)?;
        patch.validate()?;
        Ok(patch)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), SynthError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SynthError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SynthError> {
        self.to_writer(BufWriter::new(File::create(path)?))
    }
}

impl Default for Patch {
    /// A three-chain patch vaguely reminiscent of a DX7 electric piano.
    fn default() -> Self {
        Self {
            algorithm: vec![2, 2, 2],
            freqs: vec![vec![14.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]],
            mod_indices: vec![
                vec![0.0, 58.0 / 99.0],
                vec![0.0, 89.0 / 99.0],
                vec![0.0, 79.0 / 99.0],
            ],
            envs: vec![vec![EnvelopeSpec::Off; 2]; 3],
            feedback: vec![vec![0, 0]; 3],
            mod_0: vec![0.0; 3],
            output_env: EnvelopeSpec::Adsr(DEFAULT_OUTPUT_ENV),
            volumes: None,
        }
    }
}

/// Reshapes a flat per-operator list into per-chain lists following
/// `algorithm`, e.g. 6 values and `[1, 2, 3]` become `[[a], [b, c],
/// [d, e, f]]`. Fails unless the list length equals the algorithm total.
pub fn reshape<T: Clone>(vals: &[T], algorithm: &[usize]) -> Result<Vec<Vec<T>>, SynthError> {
    let expected: usize = algorithm.iter().sum();
    if vals.len() != expected {
        return Err(SynthError::ReshapeMismatch {
            got: vals.len(),
            expected,
        });
    }
    let mut out = Vec::with_capacity(algorithm.len());
    let mut rest = vals;
    for &n in algorithm {
        let (head, tail) = rest.split_at(n);
        out.push(head.to_vec());
        rest = tail;
    }
    Ok(out)
}

/// Inverse of [`reshape`]: concatenates per-chain lists back into one.
pub fn flatten<T: Clone>(vals: &[Vec<T>]) -> Vec<T> {
    vals.iter().flatten().cloned().collect()
}

//! Patch-driven FM synthesis engine.
//!
//! A [`Patch`] declares a set of operator chains (frequencies, modulation
//! indices, envelopes, self-feedback counts) plus an output envelope; a
//! [`PatchEngine`] renders it into a fixed-length sample buffer by phase-
//! modulating each chain's operators in sequence, summing the chains with
//! peak normalization, and applying the output envelope. Parameter changes
//! recompute only what they invalidate.
//!
//! GUI, plotting and audio playback are external consumers of the engine's
//! accessors; the only I/O here is JSON patch persistence and WAV export.

pub mod audio;
pub mod patch;
pub mod synth;

pub use patch::Patch;
pub use synth::chain::ChainParams;
pub use synth::config::SynthConfig;
pub use synth::engine::PatchEngine;
pub use synth::envelope::{EnvelopeParams, EnvelopeSpec};
pub use synth::error::SynthError;

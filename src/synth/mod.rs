pub mod chain;
pub mod config;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod operator;
pub mod waveform;

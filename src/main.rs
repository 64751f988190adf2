use std::path::Path;
use std::process::ExitCode;

use fmpatch::audio::write_wav;
use fmpatch::{Patch, PatchEngine, SynthConfig, SynthError};

const OUTPUT_FILE: &str = "fmpatch-out.wav";

fn run(patch_path: Option<&Path>) -> Result<(), SynthError> {
    let patch = match patch_path {
        Some(path) => {
            println!("Loading patch from {}", path.display());
            Patch::load(path)?
        }
        None => Patch::default(),
    };

    let config = SynthConfig::default();
    let engine = PatchEngine::new(patch, config)?;
    println!(
        "Rendered {} chain(s), {} samples at {} Hz",
        engine.num_chains(),
        engine.final_output().len(),
        config.sample_rate
    );

    write_wav(OUTPUT_FILE, engine.final_output(), config.sample_rate as u32)?;
    println!("Wrote {OUTPUT_FILE}");
    Ok(())
}

fn main() -> ExitCode {
    let patch_path = std::env::args().nth(1);
    match run(patch_path.as_deref().map(Path::new)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fmpatch: {e}");
            ExitCode::FAILURE
        }
    }
}

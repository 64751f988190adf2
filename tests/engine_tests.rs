use std::f32::consts::PI;

use fmpatch::{EnvelopeSpec, Patch, PatchEngine, SynthConfig};

fn config() -> SynthConfig {
    SynthConfig::new(8000.0, 0.05, 440.0)
}

fn max_abs(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

#[test]
fn two_operator_chain_matches_closed_form() {
    // One chain of two operators: a plain 440 Hz sine (mod index 0)
    // phase-modulating a second 440 Hz oscillator with index 1.
    let mut patch = Patch::from_algorithm(&[2]).unwrap();
    patch.mod_indices[0] = vec![0.0, 1.0];
    let config = config();
    let engine = PatchEngine::new(patch, config).unwrap();

    let phase_increment = 2.0 * PI * 440.0 / config.sample_rate;
    let expected_raw: Vec<f32> = (0..config.num_samples())
        .map(|i| {
            let phase = phase_increment * i as f32;
            (phase + phase.sin()).sin()
        })
        .collect();
    let peak = max_abs(&expected_raw);

    let output = engine.final_output();
    assert_eq!(output.len(), config.num_samples());
    for (i, (&got, &raw)) in output.iter().zip(&expected_raw).enumerate() {
        let expected = raw / peak;
        assert!(
            (got - expected).abs() < 1e-4,
            "sample {i}: {got} vs {expected}"
        );
    }
}

#[test]
fn two_identical_chains_mix_to_one_chain_shape() {
    // Both chains render the same operator, so the sum is exactly double
    // one chain's output and normalization brings the peak back to 1.0.
    let patch = Patch::from_algorithm(&[1, 1]).unwrap();
    let engine = PatchEngine::new(patch, config()).unwrap();

    assert!((max_abs(engine.output()) - 1.0).abs() < 1e-5);

    let solo = engine.chain_output(0).unwrap();
    assert_eq!(solo, engine.chain_output(1).unwrap());
    let solo_peak = max_abs(solo);
    for (m, s) in engine.output().iter().zip(solo) {
        assert!((m - s / solo_peak).abs() < 1e-5);
    }
}

#[test]
fn self_feedback_is_audible_at_engine_level() {
    let base = Patch::from_algorithm(&[1]).unwrap();
    let mut fed = base.clone();
    fed.feedback[0][0] = 3;

    let plain = PatchEngine::new(base, config()).unwrap();
    let with_feedback = PatchEngine::new(fed, config()).unwrap();
    let diverged = plain
        .final_output()
        .iter()
        .zip(with_feedback.final_output())
        .any(|(a, b)| (a - b).abs() > 1e-3);
    assert!(diverged);
}

#[test]
fn patch_json_loads_and_renders() {
    let json = r#"{
        "algorithm": [2, 1],
        "freqs": [[2.0, 1.0], [1.0]],
        "mod_indices": [[0.0, 1.5], [0.8]],
        "envs": [[[], [0.001, 0.002, 0.01, 0.5, 0.005]], [[]]],
        "feedback": [[0, 1], [0]],
        "mod_0": [0.0, 0.0],
        "output_env": [0.001, 0.002, 0.02, 0.7, 0.005],
        "volumes": [1.0, 0.5]
    }"#;
    let patch = Patch::from_reader(json.as_bytes()).unwrap();
    assert!(!patch.output_env.is_off());

    let config = config();
    let engine = PatchEngine::new(patch, config).unwrap();
    assert!(engine.has_output_envelope());
    assert_eq!(engine.final_output().len(), config.num_samples());
    assert!(max_abs(engine.final_output()) > 0.0);
}

#[test]
fn default_patch_renders_and_round_trips() {
    let patch = Patch::default();
    let json = serde_json::to_string(&patch).unwrap();
    assert_eq!(Patch::from_reader(json.as_bytes()).unwrap(), patch);

    let engine = PatchEngine::new(patch, config()).unwrap();
    assert_eq!(engine.num_chains(), 3);
    assert!(matches!(
        engine.patch().output_env,
        EnvelopeSpec::Adsr(_)
    ));
    assert!(max_abs(engine.final_output()) > 0.0);
}

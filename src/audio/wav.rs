use std::path::Path;

use crate::synth::error::SynthError;

/// Writes a float sample buffer to a 16-bit mono PCM WAV file.
///
/// This is the playback-sink side of the engine contract: the engine hands
/// out `final_output()` and a collaborator like this one puts it somewhere
/// a player can reach. Samples are expected in [-1, 1]; anything outside is
/// clamped during conversion.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), SynthError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_wav_reads_back() {
        let path = std::env::temp_dir().join("fmpatch-wav-test.wav");
        let samples: Vec<f32> = (0..100).map(|i| (i as f32 * 0.07).sin()).collect();
        write_wav(&path, &samples, 44100).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(reader.samples::<i16>().count(), 100);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let path = std::env::temp_dir().join("fmpatch-wav-clamp-test.wav");
        write_wav(&path, &[2.0, -2.0], 8000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![i16::MAX, -i16::MAX]);
        std::fs::remove_file(&path).ok();
    }
}

//! WAV export and import

use std::path::Path;

use wf_core::{WfError, WfResult};

/// Decoded WAV contents, interleaved
#[derive(Debug, Clone, PartialEq)]
pub struct WavData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl WavData {
    /// Duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        let frames = self.samples.len() / self.channels.max(1) as usize;
        frames as f64 * 1000.0 / self.sample_rate as f64
    }
}

/// Write mono samples as 32-bit float WAV
pub fn write_wav(path: impl AsRef<Path>, samples: &[f32], sample_rate: u32) -> WfResult<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(audio_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(audio_error)?;
    }
    writer.finalize().map_err(audio_error)?;

    log::info!(
        "Wrote {} samples @ {} Hz to {}",
        samples.len(),
        sample_rate,
        path.display()
    );
    Ok(())
}

/// Read a WAV file, converting integer formats to float
pub fn read_wav(path: impl AsRef<Path>) -> WfResult<WavData> {
    let mut reader = hound::WavReader::open(path.as_ref()).map_err(audio_error)?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(audio_error)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .map_err(audio_error)?
        }
    };

    Ok(WavData {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

fn audio_error(error: hound::Error) -> WfError {
    match error {
        hound::Error::IoError(io) => WfError::Io(io),
        other => WfError::Audio(other.to_string()),
    }
}

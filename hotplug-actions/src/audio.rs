//! Audio cue action: WAV decoding and playback on the default output device.

use std::io::Cursor;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;

use crate::error::{ActionError, Result};
use crate::resource::ResolvedResource;

/// Rate used when a file declares an unusable sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Declared rates above this are treated as corrupt.
pub const MAX_SAMPLE_RATE: u32 = 100_000;

/// Extra time allowed for the device to drain after the last sample.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Plays a resolved sound resource to completion.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
pub trait SoundPlayer: Send {
    fn play(&self, sound: &ResolvedResource) -> Result<()>;
}

/// Sample rate to play at, given the rate a file declares.
pub fn effective_sample_rate(declared: u32) -> u32 {
    if declared == 0 || declared > MAX_SAMPLE_RATE {
        DEFAULT_SAMPLE_RATE
    } else {
        declared
    }
}

/// Decoded mono clip.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmClip {
    /// Rate declared in the WAV header, unclamped
    pub declared_rate: u32,
    /// First channel only, normalised to [-1.0, 1.0]
    pub samples: Vec<f32>,
}

impl PcmClip {
    /// Decode a linear PCM WAV container.
    ///
    /// Integer samples of any width and 32-bit float samples are accepted. Multi-channel
    /// files are reduced to their first channel.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let mut reader = hound::WavReader::new(Cursor::new(data))?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .step_by(channels)
                .collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .step_by(channels)
                    .map(|s| s.map(|s| s as f32 / scale))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(Self {
            declared_rate: spec.sample_rate,
            samples,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        effective_sample_rate(self.declared_rate)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate()))
    }
}

/// Player for the host's default output device.
#[derive(Debug, Clone, Default)]
pub struct AudioPlayer;

impl AudioPlayer {
    pub fn new() -> Self {
        Self
    }

    fn play_clip(&self, clip: PcmClip) -> Result<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(ActionError::NoOutputDevice)?;
        let default_config = device
            .default_output_config()
            .map_err(|e| ActionError::Playback(e.to_string()))?;

        let config = cpal::StreamConfig {
            channels: default_config.channels(),
            sample_rate: cpal::SampleRate(clip.sample_rate()),
            buffer_size: cpal::BufferSize::Default,
        };
        let duration = clip.duration();
        let samples: Arc<[f32]> = clip.samples.into();
        let (done_tx, done_rx) = mpsc::channel();

        let stream = match default_config.sample_format() {
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, samples, done_tx)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, samples, done_tx)?,
            _ => build_stream::<f32>(&device, &config, samples, done_tx)?,
        };
        stream
            .play()
            .map_err(|e| ActionError::Playback(e.to_string()))?;

        wait_for_playback(&done_rx, duration);
        Ok(())
    }
}

/// Block until the callback has queued the last sample, then give the device `DRAIN_GRACE`
/// to play out its buffer. The stream must stay alive for the whole wait.
fn wait_for_playback(done: &mpsc::Receiver<()>, duration: Duration) {
    let timeout = duration + DRAIN_GRACE;
    match done.recv_timeout(timeout) {
        Ok(()) => std::thread::sleep(DRAIN_GRACE),
        Err(_) => tracing::debug!("Playback did not report completion within {:?}", timeout),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: Arc<[f32]>,
    done: mpsc::Sender<()>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = usize::from(config.channels.max(1));
    let mut position = 0usize;
    let mut done = Some(done);

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = samples.get(position).copied().unwrap_or(0.0);
                    frame.fill(T::from_sample(sample));
                    position += 1;
                }
                if position >= samples.len() {
                    if let Some(done) = done.take() {
                        let _ = done.send(());
                    }
                }
            },
            |e| tracing::warn!("Audio stream error: {}", e),
            None,
        )
        .map_err(|e| ActionError::Playback(e.to_string()))
}

impl SoundPlayer for AudioPlayer {
    fn play(&self, sound: &ResolvedResource) -> Result<()> {
        let data = sound.open()?;
        let clip = PcmClip::decode(&data)?;
        tracing::debug!(
            "Playing {} ({} samples at {} Hz)",
            sound,
            clip.samples.len(),
            clip.sample_rate()
        );
        self.play_clip(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets;

    fn wav_bytes(spec: hound::WavSpec, write: impl FnOnce(&mut hound::WavWriter<&mut Cursor<Vec<u8>>>)) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_effective_sample_rate() {
        assert_eq!(effective_sample_rate(0), 44_100);
        assert_eq!(effective_sample_rate(100_001), 44_100);
        assert_eq!(effective_sample_rate(u32::MAX), 44_100);
        assert_eq!(effective_sample_rate(100_000), 100_000);
        assert_eq!(effective_sample_rate(22_050), 22_050);
    }

    #[test]
    fn test_decode_bundled_assets() {
        for id in assets::identifiers() {
            let clip = PcmClip::decode(assets::bundled(id).unwrap()).unwrap();
            assert_eq!(clip.declared_rate, 44_100);
            assert!(!clip.samples.is_empty());
            assert!(clip.samples.iter().all(|s| (-1.0..=1.0).contains(s)));
        }
    }

    #[test]
    fn test_decode_stereo_keeps_first_channel() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let data = wav_bytes(spec, |w| {
            for _ in 0..4 {
                w.write_sample(16_384i16).unwrap();
                w.write_sample(-32_768i16).unwrap();
            }
        });

        let clip = PcmClip::decode(&data).unwrap();
        assert_eq!(clip.samples, vec![0.5; 4]);
        assert_eq!(clip.sample_rate(), 8_000);
        assert_eq!(clip.duration(), Duration::from_secs_f64(4.0 / 8_000.0));
    }

    #[test]
    fn test_decode_float() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let data = wav_bytes(spec, |w| {
            w.write_sample(0.25f32).unwrap();
            w.write_sample(-0.25f32).unwrap();
        });

        let clip = PcmClip::decode(&data).unwrap();
        assert_eq!(clip.samples, vec![0.25, -0.25]);
    }

    #[test]
    fn test_decode_garbage() {
        let err = PcmClip::decode(b"definitely not a wav file").unwrap_err();
        assert!(matches!(err, ActionError::Decode(_)));
    }

    #[test]
    fn test_completed_playback_waits_for_drain() {
        let (tx, rx) = mpsc::channel();
        tx.send(()).unwrap();

        let start = std::time::Instant::now();
        wait_for_playback(&rx, Duration::from_millis(10));
        assert!(start.elapsed() >= DRAIN_GRACE);
    }

    #[test]
    fn test_disconnected_callback_does_not_drain() {
        let (tx, rx) = mpsc::channel::<()>();
        drop(tx);

        let start = std::time::Instant::now();
        wait_for_playback(&rx, Duration::from_millis(10));
        assert!(start.elapsed() < DRAIN_GRACE);
    }

    #[test]
    fn test_play_missing_file_fails_before_touching_audio() {
        let err = AudioPlayer::new()
            .play(&ResolvedResource::file("/nonexistent/disconnect.wav"))
            .unwrap_err();
        assert!(matches!(err, ActionError::Io { .. }));
    }
}

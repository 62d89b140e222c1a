//! Animated GIF encoding of a captured frame sequence.

use std::fs;
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame as ImageFrame};
use log::{debug, info};
use serde::Serialize;

use crate::frame::Frame;
use crate::{CaptureConfig, Error, Result, Viewport};

/// Encoder knobs. Playback delay is independent of the capture rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GifSettings {
    /// Display time of every frame, in milliseconds
    pub frame_delay_ms: u32,
    /// Quantization quality, 1 (fastest) ..= 100 (best)
    pub quality: u8,
    /// Exact size every frame must have
    pub viewport: Viewport,
}

impl GifSettings {
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            frame_delay_ms: config.frame_delay_ms,
            quality: config.quality,
            viewport: config.viewport,
        }
    }

    /// Delay as stored in the file. GIF counts in hundredths of a second,
    /// so sub-centisecond remainders are dropped.
    pub fn delay_cs(&self) -> u16 {
        u16::try_from(self.frame_delay_ms / 10).unwrap_or(u16::MAX)
    }

    /// NeuQuant sampling speed for the configured quality (1 = best, 30 = fastest).
    pub fn speed(&self) -> i32 {
        let quality = i32::from(self.quality.clamp(1, 100));
        1 + (100 - quality) * 29 / 99
    }
}

/// What was written by [`write_gif`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeSummary {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub frame_count: usize,
}

/// Reject frame sets the encoder must never see.
///
/// Every frame, the first included, must be exactly `viewport` sized.
/// Undersized captures are never padded, so they end the run here.
pub fn check_frames(frames: &[Frame], viewport: Viewport) -> Result<(u32, u32)> {
    if frames.is_empty() {
        return Err(Error::EmptyFrameSet);
    }
    let expected = (viewport.width, viewport.height);
    for (position, frame) in frames.iter().enumerate() {
        let actual = frame.dimensions();
        if actual != expected {
            return Err(Error::InconsistentFrames {
                frame: position,
                expected,
                actual,
            });
        }
    }
    Ok(expected)
}

/// Encode `frames` in order into an infinitely looping GIF held in memory.
pub fn encode_gif(frames: &[Frame], settings: &GifSettings) -> Result<Vec<u8>> {
    let (width, height) = check_frames(frames, settings.viewport)?;

    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut out, settings.speed());
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| Error::EncodeError(format!("failed to set GIF repeat: {}", e)))?;

        let delay = Delay::from_numer_denom_ms(u32::from(settings.delay_cs()) * 10, 1);
        for (position, frame) in frames.iter().enumerate() {
            let gif_frame = ImageFrame::from_parts(frame.image.clone(), 0, 0, delay);
            encoder.encode_frame(gif_frame).map_err(|e| {
                Error::EncodeError(format!("failed to encode GIF frame {}: {}", position, e))
            })?;
        }
    }

    debug!(
        "encoded {} frames ({}x{}, delay={}cs, speed={}) into {} bytes",
        frames.len(),
        width,
        height,
        settings.delay_cs(),
        settings.speed(),
        out.len()
    );
    Ok(out)
}

/// Encode `frames` and write the result to `path` in one shot.
///
/// An existing file is overwritten. Nothing is written if encoding fails.
pub fn write_gif(frames: &[Frame], settings: &GifSettings, path: &Path) -> Result<EncodeSummary> {
    let bytes = encode_gif(frames, settings)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, &bytes)?;

    let size_bytes = fs::metadata(path)?.len();
    info!("wrote {} ({} bytes, {} frames)", path.display(), size_bytes, frames.len());

    Ok(EncodeSummary {
        path: path.to_path_buf(),
        size_bytes,
        frame_count: frames.len(),
    })
}

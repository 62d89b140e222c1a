//! animcap
//!
//! Renders a local HTML/CSS animation in headless Chrome, samples one cycle
//! of it at a fixed capture rate and encodes the frames into a looping GIF.
//!
//! The pipeline runs strictly forward: open a [`session::CaptureSession`],
//! drive the [`sampler::FrameSampler`] loop, close the session, then hand the
//! frames to [`encode::write_gif`].
//!
//! # Example
//!
//! ```no_run
//! use animcap::{CaptureConfig, Progress};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CaptureConfig::default();
//! let report = animcap::capture_animation(&config, |event| {
//!     if let Progress::Frame { captured, total } = event {
//!         eprint!("\rFrame {}/{}", captured, total);
//!     }
//! })?;
//! println!("\n{}", report);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, FaultStage, Result};

#[cfg(feature = "cdp")]
pub mod cdp;

pub mod encode;
pub mod frame;
pub mod sampler;
pub mod schedule;
pub mod session;

use encode::GifSettings;
use sampler::FrameSampler;
use schedule::{Clock, Schedule};
use session::CaptureSession;

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 628,
        }
    }
}

/// Everything one capture run needs, passed explicitly into the pipeline.
///
/// `Default` is the one scenario this tool exists for: a 1200x628 surface
/// sampled at 144 FPS for one second, played back at 32 ms per frame.
///
/// # Examples
///
/// ```
/// let cfg = animcap::CaptureConfig::default();
/// assert_eq!(cfg.frame_count(), 144);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Exact size of the rendering surface and of every frame
    pub viewport: Viewport,
    /// Capture rate in frames per second
    pub fps: u32,
    /// Length of the captured cycle in seconds
    pub duration_secs: f64,
    /// Per-frame display delay baked into the output, in milliseconds.
    /// Independent of `fps`.
    pub frame_delay_ms: u32,
    /// Wait after navigation before the first snapshot, in milliseconds
    pub settle_ms: u64,
    /// Encoder quality, 1..=100
    pub quality: u8,
    /// Animation document; relative paths resolve beside the executable, then the crate directory
    pub document: PathBuf,
    /// Output file, overwritten if present
    pub output: PathBuf,
    /// Renderer idle timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            fps: 144,
            duration_secs: 1.0,
            frame_delay_ms: 32,
            settle_ms: 500,
            quality: 95,
            document: PathBuf::from("assets/animation.html"),
            output: PathBuf::from("animation.gif"),
            timeout_ms: 30000,
        }
    }
}

impl CaptureConfig {
    /// Number of frames to capture: duration x fps, truncated.
    pub fn frame_count(&self) -> usize {
        (self.duration_secs * f64::from(self.fps)) as usize
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::new(self.frame_count(), self.fps)
    }

    /// Reject configurations that could never produce a valid artifact.
    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::ConfigError(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }
        if self.fps == 0 {
            return Err(Error::ConfigError("fps must be positive".into()));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(Error::ConfigError(format!(
                "duration must be a positive number of seconds, got {}",
                self.duration_secs
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(Error::ConfigError(format!(
                "quality must be within 1..=100, got {}",
                self.quality
            )));
        }
        if self.frame_count() == 0 {
            return Err(Error::ConfigError(format!(
                "{}s at {} FPS yields no frames",
                self.duration_secs, self.fps
            )));
        }
        Ok(())
    }

    /// Absolute location of the animation document.
    ///
    /// Relative paths are looked up next to the running executable first,
    /// then under the crate directory recorded at build time. The latter only
    /// exists on the machine that built the binary.
    pub fn document_path(&self) -> PathBuf {
        if self.document.is_absolute() {
            return self.document.clone();
        }
        let built_in = Path::new(env!("CARGO_MANIFEST_DIR")).join(&self.document);
        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&self.document)));
        match beside_exe {
            Some(path) if path.is_file() => path,
            _ => built_in,
        }
    }

    /// `file://` URL of the animation document. The document must exist.
    pub fn document_url(&self) -> Result<String> {
        let path = self.document_path();
        if !path.is_file() {
            return Err(Error::LoadError(format!(
                "document not found: {}",
                path.display()
            )));
        }
        let url = url::Url::from_file_path(&path).map_err(|_| {
            Error::LoadError(format!("cannot express {} as a file URL", path.display()))
        })?;
        Ok(url.to_string())
    }
}

/// Rendering backend seam.
///
/// A renderer owns one headless engine with a single surface sized to the
/// configured viewport. `close` must be safe to call more than once.
pub trait Renderer {
    /// Start the engine and open its surface
    fn launch(config: &CaptureConfig) -> Result<Self>
    where
        Self: Sized;

    /// Navigate the surface to `url` and wait for the navigation to finish
    fn load_document(&mut self, url: &str) -> Result<()>;

    /// Snapshot the current surface as PNG bytes
    fn render_png(&self) -> Result<Vec<u8>>;

    /// Terminate the engine
    fn close(&mut self) -> Result<()>;
}

/// Operator-facing events emitted while the pipeline runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress<'a> {
    /// Engine is about to be launched
    Launching,
    /// Session is open and sampling begins
    Capturing { total: usize, fps: u32 },
    /// One more frame is in the sequence
    Frame { captured: usize, total: usize },
    /// Capture finished; the output is being encoded
    Encoding { output: &'a Path },
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureReport {
    pub output: PathBuf,
    pub size_bytes: u64,
    pub frame_count: usize,
    pub duration_secs: f64,
    pub fps: u32,
}

impl CaptureReport {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

impl fmt::Display for CaptureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GIF created successfully: {}", self.output.display())?;
        writeln!(f, "  Size: {:.1} KB", self.size_kb())?;
        writeln!(f, "  Frames: {}", self.frame_count)?;
        write!(f, "  Duration: {}s @ {} FPS", self.duration_secs, self.fps)
    }
}

/// Run the whole pipeline with an arbitrary renderer and clock.
///
/// The session is closed before encoding starts; on any failure it is
/// released by drop and no output file is written.
pub fn run<R, C, P>(config: &CaptureConfig, clock: &C, mut progress: P) -> Result<CaptureReport>
where
    R: Renderer,
    C: Clock,
    P: FnMut(Progress<'_>),
{
    config.validate()?;
    if let Ok(json) = serde_json::to_string(config) {
        debug!("capture config: {}", json);
    }

    progress(Progress::Launching);
    let session = CaptureSession::<R>::open(config)?;

    let sampler = FrameSampler::new(config.schedule(), config.viewport);
    let total = sampler.schedule().frame_count;
    info!("capturing {} frames at {} FPS", total, config.fps);
    progress(Progress::Capturing { total, fps: config.fps });

    let frames = sampler.capture(&session, clock, |captured, total| {
        progress(Progress::Frame { captured, total })
    })?;
    session.close()?;

    progress(Progress::Encoding { output: &config.output });
    let summary = encode::write_gif(&frames, &GifSettings::from_config(config), &config.output)?;

    Ok(CaptureReport {
        output: summary.path,
        size_bytes: summary.size_bytes,
        frame_count: summary.frame_count,
        duration_secs: config.duration_secs,
        fps: config.fps,
    })
}

/// Capture `config` with headless Chrome and the wall clock.
#[cfg(feature = "cdp")]
pub fn capture_animation<P>(config: &CaptureConfig, progress: P) -> Result<CaptureReport>
where
    P: FnMut(Progress<'_>),
{
    run::<cdp::CdpRenderer, _, _>(config, &schedule::SystemClock, progress)
}

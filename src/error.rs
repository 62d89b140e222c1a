//! Error types for the capture pipeline

use thiserror::Error;

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage a fault belongs to.
///
/// Every fault is fatal; the stage only says how far the run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultStage {
    /// Engine launch, document load or configuration, before any frame
    Setup,
    /// Snapshot or decode failure inside the capture loop
    Capture,
    /// Frame set rejected or encoder failure
    Encode,
}

/// Errors that can occur while capturing or encoding an animation
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to launch the rendering engine or open its surface
    #[error("Engine initialization failed: {0}")]
    InitializationError(String),

    /// Failed to resolve or load the animation document
    #[error("Failed to load document: {0}")]
    LoadError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Snapshot request failed mid-loop
    #[error("Capture of frame {frame} failed: {reason}")]
    CaptureError { frame: usize, reason: String },

    /// Snapshot bytes could not be decoded into a pixel buffer
    #[error("Decoding frame {frame} failed: {reason}")]
    DecodeError { frame: usize, reason: String },

    /// The encoder was handed no frames
    #[error("Refusing to encode an empty frame sequence")]
    EmptyFrameSet,

    /// A frame does not match the size of the base (first) frame
    #[error("Frame {frame} is {}x{}, expected {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    InconsistentFrames {
        frame: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// The GIF encoder failed
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CDP-specific error
    #[cfg(feature = "cdp")]
    #[error("CDP error: {0}")]
    CdpError(String),
}

impl Error {
    /// Classify the fault by the pipeline stage it belongs to.
    pub fn stage(&self) -> FaultStage {
        match self {
            Error::InitializationError(_) | Error::LoadError(_) | Error::ConfigError(_) => {
                FaultStage::Setup
            }
            #[cfg(feature = "cdp")]
            Error::CdpError(_) => FaultStage::Setup,
            Error::CaptureError { .. } | Error::DecodeError { .. } => FaultStage::Capture,
            Error::EmptyFrameSet
            | Error::InconsistentFrames { .. }
            | Error::EncodeError(_)
            | Error::Io(_) => FaultStage::Encode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_are_classified_by_stage() {
        assert_eq!(Error::InitializationError("x".into()).stage(), FaultStage::Setup);
        assert_eq!(Error::LoadError("x".into()).stage(), FaultStage::Setup);
        assert_eq!(
            Error::CaptureError { frame: 3, reason: "x".into() }.stage(),
            FaultStage::Capture
        );
        assert_eq!(
            Error::DecodeError { frame: 3, reason: "x".into() }.stage(),
            FaultStage::Capture
        );
        assert_eq!(Error::EmptyFrameSet.stage(), FaultStage::Encode);
    }

    #[test]
    fn inconsistent_frames_message_names_sizes() {
        let err = Error::InconsistentFrames {
            frame: 7,
            expected: (1200, 628),
            actual: (1100, 600),
        };
        assert_eq!(err.to_string(), "Frame 7 is 1100x600, expected 1200x628");
    }
}

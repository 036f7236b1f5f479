use thiserror::Error;

/// Failures surfaced by the visualization core.
///
/// Audio failures are recovered locally by the analyzer. Of the GPU faults,
/// `ContextLost` forces a pipeline rebuild while `SurfaceUnavailable` only
/// skips the current frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("microphone access was denied")]
    PermissionDenied,
    #[error("audio capture is not available on this host")]
    DeviceUnavailable,
    #[error("GPU context was lost")]
    ContextLost,
    #[error("no surface frame available: {0}")]
    SurfaceUnavailable(String),
    #[error("invalid viewport size {width}x{height}")]
    InvalidResize { width: i64, height: i64 },
    #[error("unknown control `{0}`")]
    UnknownControl(String),
    #[error("value {value} is out of range for `{name}`")]
    InvalidControlValue { name: String, value: f32 },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A validated, non-zero viewport size in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Accepts signed input so hosts can forward raw layout values; zero or
    /// negative sides are rejected.
    pub fn new(width: i64, height: i64) -> Result<Self> {
        if width <= 0 || height <= 0 || width > u32::MAX as i64 || height > u32::MAX as i64 {
            return Err(Error::InvalidResize { width, height });
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_sizes() {
        assert_eq!(
            Viewport::new(0, 10),
            Err(Error::InvalidResize {
                width: 0,
                height: 10
            })
        );
        assert!(Viewport::new(10, -1).is_err());
        assert_eq!(
            Viewport::new(640, 480),
            Ok(Viewport {
                width: 640,
                height: 480
            })
        );
    }
}

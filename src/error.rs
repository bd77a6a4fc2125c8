// One error type for the whole crate.
// Every variant states *where* things went wrong. Drawing itself never fails:
// only the window, the camera, config parsing and canvas file I/O can.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed

    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed

    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed

    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed

    #[error("Config error: {0}")]
    Config(String), // air_canvas.toml is malformed or out of range

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError), // PNG encode/decode

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Canvas size mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// Frame source for the main loop.
// Visual expectation: every call to `next_frame()` hands back one 0x00RRGGBB
// frame: the (mirrored) webcam picture, or a plain dark backdrop when the
// camera is disabled or cannot be opened.

use crate::config::CameraConfig;
use crate::error::Error;
use crate::types::{pack_rgb, FrameBuffer};

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
};

/// Backdrop colour when there is no camera.
pub const BACKDROP: u32 = 0x00_18_18_1C;

// A small wrapper around nokhwa::Camera so our main loop stays clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
    mirror: bool,
}

impl CameraCapture {
    /// Open the configured device near the requested resolution and FPS.
    /// The driver may settle on something else; see `resolution()`.
    pub fn new(cfg: &CameraConfig) -> Result<Self, Error> {
        let idx = CameraIndex::Index(cfg.index);
        let fmt = CameraFormat::new(
            Resolution::new(cfg.width, cfg.height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            cfg.fps,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(idx, req).map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;
        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        let actual = cam.resolution();
        log::info!(
            "Camera {} streaming at {}x{} (asked for {}x{} @ {} fps)",
            cfg.index,
            actual.width(),
            actual.height(),
            cfg.width,
            cfg.height,
            cfg.fps
        );

        Ok(Self { cam, width: actual.width(), height: actual.height(), mirror: cfg.mirror })
    }

    /// Grab one frame and convert it to 0x00RRGGBB pixels.
    /// Blocks until the camera delivers.
    pub fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;
        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        let pixels = rgb_img.pixels().map(|p| pack_rgb(p.0)).collect();
        let mut fb = FrameBuffer { width: w as usize, height: h as usize, pixels };
        if self.mirror {
            mirror_horizontal(&mut fb);
        }
        Ok(fb)
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Flip left/right in place.
/// Visual: the window behaves like a mirror, your right hand is on the right.
pub fn mirror_horizontal(fb: &mut FrameBuffer) {
    if fb.width == 0 {
        return;
    }
    for row in fb.pixels.chunks_exact_mut(fb.width) {
        row.reverse();
    }
}

/// Where the live picture comes from.
pub enum FrameSource {
    Camera(CameraCapture),
    /// Fixed-size dark frame.
    Backdrop { width: u32, height: u32 },
}

impl FrameSource {
    /// Camera when enabled and available, otherwise a dark backdrop at the
    /// configured size.
    pub fn open(cfg: &CameraConfig) -> Self {
        let backdrop = FrameSource::Backdrop { width: cfg.width, height: cfg.height };
        if !cfg.enabled {
            log::info!("Camera disabled, drawing on a dark backdrop");
            return backdrop;
        }
        match CameraCapture::new(cfg) {
            Ok(cam) => FrameSource::Camera(cam),
            Err(e) => {
                log::warn!("{e}; falling back to a dark backdrop");
                backdrop
            }
        }
    }

    pub fn resolution(&self) -> (u32, u32) {
        match self {
            FrameSource::Camera(cam) => cam.resolution(),
            FrameSource::Backdrop { width, height } => (*width, *height),
        }
    }

    pub fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        match self {
            FrameSource::Camera(cam) => cam.next_frame(),
            FrameSource::Backdrop { width, height } => {
                Ok(FrameBuffer::filled(*width as usize, *height as usize, BACKDROP))
            }
        }
    }

    pub fn is_camera(&self) -> bool {
        matches!(self, FrameSource::Camera(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_flips_rows() {
        let mut fb = FrameBuffer { width: 3, height: 2, pixels: vec![1, 2, 3, 4, 5, 6] };
        mirror_horizontal(&mut fb);
        assert_eq!(fb.pixels, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_disabled_camera_gives_backdrop() {
        let cfg = CameraConfig { enabled: false, width: 64, height: 48, ..CameraConfig::default() };
        let mut src = FrameSource::open(&cfg);
        assert!(!src.is_camera());
        assert_eq!(src.resolution(), (64, 48));
        let frame = src.next_frame().unwrap();
        assert_eq!(frame.pixels.len(), 64 * 48);
        assert!(frame.pixels.iter().all(|&p| p == BACKDROP));
    }
}

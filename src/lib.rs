//! Air Canvas: draw in the air with your index finger.
//!
//! A hand detector reports 21 keypoints per frame; [`engine::StrokeEngine`]
//! turns them into smoothed strokes on a persistent canvas, with a toolbar,
//! undo history and debounced gesture shortcuts. The binary wires it to a
//! webcam and a `minifb` window.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod draw;
pub mod engine;
pub mod error;
pub mod gamma;
pub mod gesture;
pub mod history;
pub mod smoothing;
pub mod toolbar;
pub mod tracker;
pub mod types;

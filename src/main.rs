// What you SEE:
// • Live (mirrored) camera as the base image, your drawing laid over it.
// • The mouse plays the hand: hold Left Mouse to draw, just move to hover,
//   hold P to erase with a pinch, O clears, T next colour, U undo.
// • Point at the top bar to pick colours / eraser / clear / undo.
// • D debug hand view, S stats, I instructions, W save, L load, ESC quits.

use air_canvas::camera::FrameSource;
use air_canvas::config::{AppConfig, DEFAULT_CONFIG_FILE};
use air_canvas::draw::{self, Command, Drawer, HELP_LINES};
use air_canvas::engine::{FrameInput, StrokeEngine};
use air_canvas::error::Error;
use air_canvas::gamma::GammaLut;
use air_canvas::gesture::{self, SwipeAxis};
use air_canvas::tracker::{HandTracker, PuppetHand};
use air_canvas::types::Keypoint;
use std::collections::VecDeque;
use std::path::Path;
use std::time::{Duration, Instant};

/// Frames of hand history used for swipe detection.
const SWIPE_FRAMES: usize = 5;

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load(Path::new(DEFAULT_CONFIG_FILE))?;

    /* --- Camera + window setup ---
       Visual: window opens with the live feed (or a dark backdrop). */
    let mut source = FrameSource::open(&config.camera);
    let (w, h) = source.resolution();
    let mut drawer = Drawer::new("Air Canvas", w as usize, h as usize)?;

    /* --- Engine, detector, tracker ---
       Visual: nothing yet; the canvas starts blank. */
    let mut engine = StrokeEngine::new(
        w,
        h,
        config.engine.clone(),
        config.gesture,
        config.toolbar,
    )?;
    let mut puppet = PuppetHand::new(config.gesture.handedness);
    let mut tracker = HandTracker::new(config.tracker);
    let lut = GammaLut::new();

    let mut recent_hands: VecDeque<Vec<Keypoint>> = VecDeque::with_capacity(SWIPE_FRAMES + 1);

    /* --- Overlay toggles --- */
    let mut show_debug = false;
    let mut show_stats = false;
    let mut show_instructions = true;

    /* --- FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut fps = 0.0f32;

    log::info!("Air Canvas {}x{} ready, press H for help", w, h);

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Fresh frame: what the camera sees right now. */
        let mut screen = source.next_frame()?;

        /* 2) Keyboard commands */
        for cmd in drawer.commands() {
            match cmd {
                Command::ToggleDebug => show_debug = !show_debug,
                Command::ToggleStats => show_stats = !show_stats,
                Command::ToggleInstructions => show_instructions = !show_instructions,
                Command::ResetStats => {
                    tracker.reset_statistics();
                    log::info!("Detection statistics reset");
                }
                Command::Help => {
                    for line in HELP_LINES {
                        log::info!("{line}");
                    }
                }
                Command::StabilityUp | Command::StabilityDown => {
                    let delta = if cmd == Command::StabilityUp { 0.1 } else { -0.1 };
                    tracker.set_stability_factor(tracker.stability_factor() + delta);
                    log::info!("Stability factor: {:.1}", tracker.stability_factor());
                }
                Command::Save => {
                    if let Err(e) = engine.save_to_file(&config.save_path) {
                        log::warn!("Save failed: {e}");
                    }
                }
                Command::Load => {
                    if let Err(e) = engine.load_from_file(&config.save_path) {
                        log::warn!("Load failed: {e}");
                    }
                }
            }
        }

        /* 3) Hand: the mouse drives the puppet detector, the tracker steadies it.
           Visual: mouse outside the window = no hand. */
        let pose = drawer.mouse_pos().map(|p| (drawer.puppet_pose(), p));
        puppet.set(pose.map(|(pose, _)| pose), pose.map(|(_, p)| p).unwrap_or_default());
        let hand = tracker.track(&mut puppet, &screen);

        recent_hands.push_back(hand.as_ref().map(|h| h.keypoints.clone()).unwrap_or_default());
        while recent_hands.len() > SWIPE_FRAMES {
            recent_hands.pop_front();
        }
        let history = recent_hands.make_contiguous();
        let swipe = [SwipeAxis::Horizontal, SwipeAxis::Vertical]
            .into_iter()
            .find(|&axis| gesture::detect_swipe(history, axis, config.gesture.swipe_threshold));
        if let Some(axis) = swipe {
            log::debug!("Swipe: {:?}", axis);
        }

        /* 4) Engine step: draw / erase / toolbar / one-shot gestures. */
        let input = match &hand {
            Some(h) => FrameInput::hand(&h.keypoints, h.handedness),
            None => FrameInput::no_hand(),
        };
        let outcome = engine.step(&input);

        /* 5) Compose: ink over the camera, then the UI on top. */
        engine.canvas().composite_onto(&mut screen);
        draw::render_toolbar(&mut screen, &engine, outcome.pointer, &lut);
        draw::render_info_panel(&mut screen, &engine, fps, &lut);

        let below_bar = engine.toolbar().zone_bottom();
        if show_stats {
            draw::render_stats(&mut screen, &tracker.statistics(), tracker.stability_factor(), below_bar, &lut);
        }
        if show_instructions {
            draw::render_instructions(&mut screen, below_bar, &lut);
        }
        if show_debug {
            if let Some(h) = &hand {
                let facts = gesture::classify(&h.keypoints, h.handedness, &config.gesture);
                draw::render_hand_debug(&mut screen, h, &facts, swipe, tracker.bbox_padding());
            }
        }
        draw::render_cursor(&mut screen, &outcome, &engine);

        /* 6) Present to the window (this is when the on-screen image updates). */
        drawer.present(&screen)?;

        /* 7) FPS counter (log + info panel once per second) */
        frames_this_second += 1;
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            fps = frames_this_second as f32 / secs;
            log::info!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    let stats = tracker.statistics();
    log::info!(
        "Session over: {} frames, hand found in {:.1}%",
        stats.total_frames,
        stats.success_rate
    );
    Ok(())
}

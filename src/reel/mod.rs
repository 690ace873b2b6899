//! Frame sequencing and encoding
//!
//! Rendered bitmaps are collected with display durations, then written out
//! as one looping animated image.

mod encoder;
mod recorder;
mod sequencer;

pub use encoder::{encode_gif, save_gif, save_png, GifOptions};
pub use recorder::{status_line, CaptureConfig, Recorder, LOG_BACKGROUND, LOG_FOREGROUND};
pub use sequencer::{quantize_delay, Frame, FrameSequencer, SequencerConfig, DELAY_STEP_MS};

//! Streaming capture session
//!
//! Drives the streaming pipeline for one recording: raw output chunks go
//! into a `LogStream`, and frames of its viewport are offered to the
//! sequencer as output arrives or as time passes. Timestamps are supplied by
//! the caller as the time since the session started.

use std::time::Duration;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use super::sequencer::{millis, Frame, FrameSequencer, SequencerConfig};
use crate::core::{Rgb, ScrollbackConfig, Style};
use crate::renderer::{Header, Rasterizer};
use crate::terminal::LogStream;

/// Text color of recorded output
pub const LOG_FOREGROUND: Rgb = Rgb(220, 233, 248);
/// Background of recorded output
pub const LOG_BACKGROUND: Rgb = Rgb(6, 10, 24);

/// Shortest hold on the final frame
const MIN_TAIL_HOLD_MS: u32 = 300;

/// Capture geometry and timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub cols: usize,
    pub rows: usize,
    pub frame_interval_ms: u32,
    pub max_frames: usize,
    pub min_frame_ms: u32,
    /// Floor on the duration of the frame showing the exit status
    pub final_frame_min_ms: u32,
    /// How long the last frame is held before the loop restarts
    pub tail_hold_ms: u32,
    /// Duration of each frame in a step capture
    pub step_frame_ms: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            cols: 150,
            rows: 42,
            frame_interval_ms: 200,
            max_frames: 2000,
            min_frame_ms: 30,
            final_frame_min_ms: 60,
            tail_hold_ms: 1800,
            step_frame_ms: 1200,
        }
    }
}

impl CaptureConfig {
    pub fn sequencer(&self) -> SequencerConfig {
        SequencerConfig {
            frame_interval_ms: self.frame_interval_ms,
            max_frames: self.max_frames,
            min_frame_ms: self.min_frame_ms,
        }
    }
}

/// Status line shown under the session label
pub fn status_line(elapsed: Duration, exit_code: Option<i32>) -> String {
    let mut status = format!("elapsed: {:5.1}s", elapsed.as_secs_f64());
    if let Some(code) = exit_code {
        status.push_str(&format!("   exit: {code}"));
    }
    status
}

/// One streaming recording
pub struct Recorder {
    label: String,
    config: CaptureConfig,
    stream: LogStream,
    rasterizer: Rasterizer,
    sequencer: FrameSequencer,
}

impl Recorder {
    pub fn new(label: impl Into<String>, rasterizer: Rasterizer, config: CaptureConfig) -> Self {
        Self::with_scrollback(label, rasterizer, config, ScrollbackConfig::default())
    }

    pub fn with_scrollback(
        label: impl Into<String>,
        rasterizer: Rasterizer,
        config: CaptureConfig,
        scrollback: ScrollbackConfig,
    ) -> Self {
        Self {
            label: label.into(),
            config,
            stream: LogStream::with_config(config.cols, config.rows, scrollback),
            rasterizer,
            sequencer: FrameSequencer::new(config.sequencer()),
        }
    }

    pub fn stream(&self) -> &LogStream {
        &self.stream
    }

    pub fn frames(&self) -> &[Frame] {
        self.sequencer.frames()
    }

    /// Buffer a chunk of output and offer a frame
    pub fn feed(&mut self, chunk: &[u8], at: Duration) -> bool {
        self.stream.feed(chunk);
        self.emit(at, false)
    }

    /// Offer a frame during a quiet period so timing keeps advancing
    pub fn tick(&mut self, at: Duration) -> bool {
        self.emit(at, false)
    }

    /// Offer a frame rendered from the current buffer
    pub fn emit(&mut self, at: Duration, force: bool) -> bool {
        let Self {
            label,
            stream,
            rasterizer,
            sequencer,
            ..
        } = self;
        sequencer.offer(at, force, || render(rasterizer, stream, label, at, None))
    }

    /// Close the session and return its frames
    ///
    /// Appends a frame showing the exit status, held for at least
    /// `final_frame_min_ms` (or the time since the last frame if longer),
    /// followed by a copy held for `tail_hold_ms`.
    pub fn finish(mut self, at: Duration, exit_code: Option<i32>) -> Vec<Frame> {
        self.stream.finish();
        let image = render(
            &mut self.rasterizer,
            &self.stream,
            &self.label,
            at,
            exit_code,
        );

        let since_last = millis(at.saturating_sub(self.sequencer.last_accepted().unwrap_or_default()));
        let final_ms = since_last.max(self.config.final_frame_min_ms);
        let hold_ms = self.config.tail_hold_ms.max(MIN_TAIL_HOLD_MS);

        self.sequencer.push(image.clone(), final_ms);
        self.sequencer.push(image, hold_ms);
        tracing::info!(
            frames = self.sequencer.len(),
            total_ms = self.sequencer.total_duration_ms(),
            "Recording finished"
        );
        self.sequencer.into_frames()
    }
}

fn render(
    rasterizer: &mut Rasterizer,
    stream: &LogStream,
    label: &str,
    at: Duration,
    exit_code: Option<i32>,
) -> RgbImage {
    let style = Style {
        fg: Some(LOG_FOREGROUND),
        bg: Some(LOG_BACKGROUND),
        ..Default::default()
    };
    let grid = stream.buffer().viewport_grid(style);
    let header = Header::new(label).with_status(status_line(at, exit_code));
    rasterizer.render(&grid, Some(&header))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Palette;
    use crate::renderer::{BuiltinFont, RasterConfig};

    fn recorder() -> Recorder {
        let rasterizer = Rasterizer::new(
            Box::new(BuiltinFont::new(1)),
            Palette::default(),
            RasterConfig::recording(),
        );
        let config = CaptureConfig {
            cols: 20,
            rows: 5,
            ..Default::default()
        };
        Recorder::new("cargo test", rasterizer, config)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(ms(1500), None), "elapsed:   1.5s");
        assert_eq!(status_line(ms(12_340), Some(0)), "elapsed:  12.3s   exit: 0");
    }

    #[test]
    fn test_feed_throttles() {
        let mut rec = recorder();
        assert!(rec.feed(b"one\n", ms(0)));
        assert!(!rec.feed(b"two\n", ms(50)));
        assert!(!rec.tick(ms(150)));
        assert!(rec.tick(ms(210)));
        assert_eq!(rec.frames().len(), 2);
        assert_eq!(rec.stream().viewport()[3], "two");
    }

    #[test]
    fn test_finish_appends_final_and_hold() {
        let mut rec = recorder();
        rec.feed(b"running\n", ms(0));
        rec.emit(ms(20), true);

        let frames = rec.finish(ms(40), Some(1));
        let durations: Vec<u32> = frames.iter().map(|f| f.duration_ms).collect();
        assert_eq!(durations, vec![200, 30, 60, 1800]);
        assert_eq!(frames[2].image, frames[3].image);
    }

    #[test]
    fn test_finish_long_gap() {
        let mut rec = recorder();
        rec.feed(b"x", ms(0));
        let frames = rec.finish(ms(5000), None);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[1].duration_ms, 5000);
    }

    #[test]
    fn test_finish_without_output() {
        let frames = recorder().finish(ms(0), Some(0));
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].duration_ms, 60);
    }
}

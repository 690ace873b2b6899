//! Frame sequencing
//!
//! Collects rendered bitmaps in chronological order, each with a display
//! duration. Streaming captures offer frames as output arrives; offers that
//! come too soon after the last accepted frame are throttled, and a safety
//! cap bounds the total. Forced frames bypass both checks.

use std::time::Duration;

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// GIF delays are stored in centiseconds
pub const DELAY_STEP_MS: u32 = 10;

/// One rendered frame and how long it is shown
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub image: RgbImage,
    /// Display time in milliseconds, a non-zero multiple of `DELAY_STEP_MS`
    pub duration_ms: u32,
}

impl Frame {
    /// Create a frame, rounding `duration_ms` to the nearest GIF delay step
    pub fn new(image: RgbImage, duration_ms: u32) -> Self {
        Self {
            image,
            duration_ms: quantize_delay(duration_ms),
        }
    }
}

/// Round to the nearest multiple of `DELAY_STEP_MS`, never below one step
pub fn quantize_delay(duration_ms: u32) -> u32 {
    let steps = duration_ms.saturating_add(DELAY_STEP_MS / 2) / DELAY_STEP_MS;
    steps.max(1) * DELAY_STEP_MS
}

/// Throttling and timing limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Minimum time between accepted non-forced frames
    pub frame_interval_ms: u32,
    /// Non-forced frames are dropped once this many frames exist
    pub max_frames: usize,
    /// Floor on an accepted frame's duration
    pub min_frame_ms: u32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 200,
            max_frames: 2000,
            min_frame_ms: 30,
        }
    }
}

/// Ordered frame list with throttling
#[derive(Debug, Clone, Default)]
pub struct FrameSequencer {
    config: SequencerConfig,
    frames: Vec<Frame>,
    /// Timestamp of the last frame accepted through `offer`
    last_accepted: Option<Duration>,
}

impl FrameSequencer {
    pub fn new(config: SequencerConfig) -> Self {
        Self {
            config,
            frames: Vec::new(),
            last_accepted: None,
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Check whether a frame offered at `at` would be accepted
    pub fn would_accept(&self, at: Duration, force: bool) -> bool {
        if force {
            return true;
        }
        if self.frames.len() >= self.config.max_frames {
            return false;
        }
        match self.last_accepted {
            None => true,
            Some(last) => at.saturating_sub(last) >= self.interval(),
        }
    }

    /// Offer a frame captured at `at` (time since the session started)
    ///
    /// `render` only runs when the frame is accepted. Returns whether it
    /// was.
    pub fn offer<F>(&mut self, at: Duration, force: bool, render: F) -> bool
    where
        F: FnOnce() -> RgbImage,
    {
        if !self.would_accept(at, force) {
            tracing::trace!(at_ms = at.as_millis() as u64, "Throttled frame");
            return false;
        }

        let elapsed = match self.last_accepted {
            Some(last) => millis(at.saturating_sub(last)),
            None => self.config.frame_interval_ms,
        };
        let duration = elapsed.max(self.config.min_frame_ms);

        self.frames.push(Frame::new(render(), duration));
        self.last_accepted = Some(at);
        true
    }

    /// Append an explicitly timed frame, bypassing throttling
    pub fn push(&mut self, image: RgbImage, duration_ms: u32) {
        self.frames.push(Frame::new(image, duration_ms));
    }

    /// Timestamp of the last frame accepted through `offer`
    pub fn last_accepted(&self) -> Option<Duration> {
        self.last_accepted
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sum of all frame durations
    pub fn total_duration_ms(&self) -> u64 {
        self.frames.iter().map(|f| f.duration_ms as u64).sum()
    }

    /// Hand the frames over for encoding
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    fn interval(&self) -> Duration {
        Duration::from_millis(self.config.frame_interval_ms as u64)
    }
}

/// Whole milliseconds in `d`, saturating
pub(crate) fn millis(d: Duration) -> u32 {
    u32::try_from(d.as_millis()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> RgbImage {
        RgbImage::new(2, 2)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_throttling() {
        let mut seq = FrameSequencer::new(SequencerConfig::default());
        assert!(seq.offer(ms(0), false, image));
        assert!(!seq.offer(ms(10), false, image));
        assert!(seq.offer(ms(250), false, image));

        let durations: Vec<u32> = seq.frames().iter().map(|f| f.duration_ms).collect();
        assert_eq!(durations, vec![200, 250]);
    }

    #[test]
    fn test_forced_bypasses_throttling() {
        let mut seq = FrameSequencer::new(SequencerConfig::default());
        assert!(seq.offer(ms(0), false, image));
        assert!(seq.offer(ms(10), true, image));
        // Short gaps are stretched to the minimum duration
        assert_eq!(seq.frames()[1].duration_ms, 30);
        assert_eq!(seq.last_accepted(), Some(ms(10)));
    }

    #[test]
    fn test_rejected_offer_does_not_render() {
        let mut seq = FrameSequencer::new(SequencerConfig::default());
        seq.offer(ms(0), false, image);
        let accepted = seq.offer(ms(5), false, || panic!("rendered a throttled frame"));
        assert!(!accepted);
    }

    #[test]
    fn test_frame_cap() {
        let config = SequencerConfig {
            max_frames: 2,
            ..Default::default()
        };
        let mut seq = FrameSequencer::new(config);
        assert!(seq.offer(ms(0), false, image));
        assert!(seq.offer(ms(300), false, image));
        assert!(!seq.offer(ms(600), false, image));
        assert!(seq.offer(ms(900), true, image));
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_quantize_delay() {
        assert_eq!(quantize_delay(0), 10);
        assert_eq!(quantize_delay(1), 10);
        assert_eq!(quantize_delay(14), 10);
        assert_eq!(quantize_delay(15), 20);
        assert_eq!(quantize_delay(213), 210);
        assert_eq!(quantize_delay(1800), 1800);
        assert_eq!(quantize_delay(u32::MAX) % DELAY_STEP_MS, 0);
    }

    #[test]
    fn test_elapsed_durations_are_quantized() {
        let mut seq = FrameSequencer::new(SequencerConfig::default());
        seq.offer(ms(0), false, image);
        seq.offer(ms(213), false, image);
        seq.offer(ms(460), false, image);
        let durations: Vec<u32> = seq.frames().iter().map(|f| f.duration_ms).collect();
        assert_eq!(durations, vec![200, 210, 250]);
    }

    #[test]
    fn test_push_and_totals() {
        let mut seq = FrameSequencer::default();
        seq.push(image(), 1200);
        seq.push(image(), 0);
        assert_eq!(seq.frames()[1].duration_ms, 10);
        assert_eq!(seq.total_duration_ms(), 1210);
        assert_eq!(seq.last_accepted(), None);
        assert_eq!(seq.into_frames().len(), 2);
    }
}

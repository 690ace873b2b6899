//! Output encoding
//!
//! Writes a frame list as a looping animated GIF, or a single bitmap as a
//! PNG. Frames are encoded in order with their recorded durations, which
//! `Frame` already keeps on the GIF's 10 ms delay grid.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use super::sequencer::Frame;
use crate::error::{Error, Result};

/// GIF encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GifOptions {
    /// Quantizer speed, 1 (best) to 30 (fastest)
    pub speed: i32,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self { speed: 10 }
    }
}

/// Encode `frames` as an infinitely looping GIF
pub fn encode_gif<W: Write>(frames: &[Frame], writer: W, options: GifOptions) -> Result<()> {
    if frames.is_empty() {
        return Err(Error::EmptySequence);
    }

    let mut encoder = GifEncoder::new_with_speed(writer, options.speed.clamp(1, 30));
    encoder.set_repeat(Repeat::Infinite)?;
    for frame in frames {
        let buffer = DynamicImage::ImageRgb8(frame.image.clone()).into_rgba8();
        let delay = Delay::from_numer_denom_ms(frame.duration_ms, 1);
        encoder.encode_frame(image::Frame::from_parts(buffer, 0, 0, delay))?;
    }

    let total_ms: u64 = frames.iter().map(|f| f.duration_ms as u64).sum();
    tracing::info!(frames = frames.len(), total_ms, "Encoded GIF");
    Ok(())
}

/// Write an animated GIF to `path`
pub fn save_gif(frames: &[Frame], path: impl AsRef<Path>, options: GifOptions) -> Result<()> {
    if frames.is_empty() {
        return Err(Error::EmptySequence);
    }
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_gif(frames, &mut writer, options)?;
    writer.flush()?;
    Ok(())
}

/// Write a single bitmap as a PNG
pub fn save_png(image: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    image.write_to(&mut writer, ImageFormat::Png)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use image::codecs::gif::GifDecoder;
    use image::AnimationDecoder;

    fn solid(value: u8) -> RgbImage {
        RgbImage::from_pixel(4, 3, image::Rgb([value, value, value]))
    }

    #[test]
    fn test_empty_sequence_refused() {
        let mut out = Vec::new();
        assert!(matches!(
            encode_gif(&[], &mut out, GifOptions::default()),
            Err(Error::EmptySequence)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_frames_and_delays_preserved() {
        let frames = vec![
            Frame::new(solid(0), 200),
            Frame::new(solid(128), 250),
            Frame::new(solid(255), 1800),
        ];
        let mut out = Vec::new();
        encode_gif(&frames, &mut out, GifOptions::default()).unwrap();

        let decoder = GifDecoder::new(Cursor::new(out)).unwrap();
        let decoded = decoder.into_frames().collect_frames().unwrap();
        assert_eq!(decoded.len(), 3);

        let delays: Vec<u32> = decoded
            .iter()
            .map(|f| {
                let (numer, denom) = f.delay().numer_denom_ms();
                numer / denom
            })
            .collect();
        assert_eq!(delays, vec![200, 250, 1800]);
        assert_eq!(decoded[0].buffer().dimensions(), (4, 3));
    }

    #[test]
    fn test_uneven_durations_decode_as_recorded() {
        let frames = vec![
            Frame::new(solid(0), 213),
            Frame::new(solid(64), 1),
            Frame::new(solid(128), 999),
            Frame::new(solid(255), 67),
        ];
        let mut out = Vec::new();
        encode_gif(&frames, &mut out, GifOptions::default()).unwrap();

        let decoder = GifDecoder::new(Cursor::new(out)).unwrap();
        let delays: Vec<u32> = decoder
            .into_frames()
            .collect_frames()
            .unwrap()
            .iter()
            .map(|f| {
                let (numer, denom) = f.delay().numer_denom_ms();
                numer / denom
            })
            .collect();
        let recorded: Vec<u32> = frames.iter().map(|f| f.duration_ms).collect();
        assert_eq!(recorded, vec![210, 10, 1000, 70]);
        assert_eq!(delays, recorded);
    }

    #[test]
    fn test_save_png_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(save_png(&solid(1), &path), Err(Error::Io(_))));
    }

    #[test]
    fn test_save_png_roundtrip_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        save_png(&solid(7), &path).unwrap();
        let loaded = image::open(&path).unwrap();
        assert_eq!(loaded.width(), 4);
        assert_eq!(loaded.height(), 3);
    }
}

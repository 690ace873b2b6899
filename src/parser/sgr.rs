//! Select Graphic Rendition
//!
//! Applies SGR codes to the pen, left to right. Unknown codes are ignored
//! so newer sequences degrade to no-ops instead of aborting.

use crate::core::{Palette, Rgb, Style};
use crate::core::{clamp_channel, NamedColor};

/// Apply a list of SGR codes to `pen`
pub fn apply_sgr(codes: &[u32], pen: &mut Style, palette: &Palette) {
    if codes.is_empty() {
        pen.reset();
        return;
    }

    let mut i = 0;
    while i < codes.len() {
        match codes[i] {
            0 => pen.reset(),
            1 => pen.bold = true,
            22 => pen.bold = false,
            4 => pen.underline = true,
            24 => pen.underline = false,
            7 => pen.inverse = true,
            27 => pen.inverse = false,
            8 => pen.hidden = true,
            28 => pen.hidden = false,
            39 => pen.fg = None,
            49 => pen.bg = None,
            code @ (30..=37 | 90..=97) => {
                pen.fg = NamedColor::from_sgr(code).map(|c| palette.named(c));
            }
            code @ (40..=47 | 100..=107) => {
                pen.bg = NamedColor::from_sgr(code).map(|c| palette.named(c));
            }
            code @ (38 | 48) => {
                if let Some((color, consumed)) = extended_color(&codes[i + 1..], palette) {
                    if code == 38 {
                        pen.fg = color;
                    } else {
                        pen.bg = color;
                    }
                    i += consumed;
                }
            }
            other => tracing::trace!(code = other, "ignoring unsupported SGR code"),
        }
        i += 1;
    }
}

/// Parse the tail of a `38`/`48` code: `5;N` or `2;R;G;B`.
///
/// Returns the color (with `None` meaning default, for out-of-range
/// indices) and how many extra codes were consumed. Incomplete forms
/// consume nothing.
fn extended_color(rest: &[u32], palette: &Palette) -> Option<(Option<Rgb>, usize)> {
    match rest {
        [5, index, ..] => {
            let color = u8::try_from(*index).ok().map(|i| palette.indexed(i));
            Some((color, 2))
        }
        [2, r, g, b, ..] => {
            let channel = |v: u32| clamp_channel(v as i64);
            Some((Some(Rgb(channel(*r), channel(*g), channel(*b))), 4))
        }
        _ => None,
    }
}

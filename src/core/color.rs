//! Color resolution
//!
//! Maps color references to concrete RGB triples:
//! - Named colors (`black`, `red`, ..., `light_*`, `gray`, `dark_gray`, `reset`)
//! - 256-color palette indices (xterm rules for 16-255)
//! - 24-bit true color
//!
//! Resolution never fails. Anything unknown falls back to the ambient
//! default color for the requested role.

use serde::{Deserialize, Serialize};

/// A concrete 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build a color from wide components, clamping each to [0, 255]
    pub fn clamped(r: i64, g: i64, b: i64) -> Self {
        Self(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    /// Multiply every channel by `factor`, truncating and clamping to [0, 255]
    pub fn brighten(self, factor: f32) -> Self {
        let scale = |c: u8| clamp_channel((c as f32 * factor) as i64);
        Self(scale(self.0), scale(self.1), scale(self.2))
    }

    /// Gray level with all three channels equal
    pub const fn gray(level: u8) -> Self {
        Self(level, level, level)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self(r, g, b)
    }
}

impl From<Rgb> for image::Rgb<u8> {
    fn from(color: Rgb) -> Self {
        image::Rgb([color.0, color.1, color.2])
    }
}

/// Clamp a wide integer into a color channel
pub fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, 255) as u8
}

/// Whether a color is used for glyphs or for the cell background.
/// Decides what `reset` and unknown references resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Foreground,
    Background,
}

/// The sixteen named ANSI-style colors, in palette index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    White,
}

impl NamedColor {
    pub const ALL: [NamedColor; 16] = [
        NamedColor::Black,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Yellow,
        NamedColor::Blue,
        NamedColor::Magenta,
        NamedColor::Cyan,
        NamedColor::Gray,
        NamedColor::DarkGray,
        NamedColor::LightRed,
        NamedColor::LightGreen,
        NamedColor::LightYellow,
        NamedColor::LightBlue,
        NamedColor::LightMagenta,
        NamedColor::LightCyan,
        NamedColor::White,
    ];

    /// Position of this color in the 16-entry table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a color by its snake_case name
    pub fn from_name(name: &str) -> Option<Self> {
        let color = match name {
            "black" => NamedColor::Black,
            "red" => NamedColor::Red,
            "green" => NamedColor::Green,
            "yellow" => NamedColor::Yellow,
            "blue" => NamedColor::Blue,
            "magenta" => NamedColor::Magenta,
            "cyan" => NamedColor::Cyan,
            "gray" => NamedColor::Gray,
            "dark_gray" => NamedColor::DarkGray,
            "light_red" => NamedColor::LightRed,
            "light_green" => NamedColor::LightGreen,
            "light_yellow" => NamedColor::LightYellow,
            "light_blue" => NamedColor::LightBlue,
            "light_magenta" => NamedColor::LightMagenta,
            "light_cyan" => NamedColor::LightCyan,
            "white" => NamedColor::White,
            _ => return None,
        };
        Some(color)
    }

    /// Map an SGR color code (30-37, 40-47, 90-97, 100-107) to its name
    pub fn from_sgr(code: u32) -> Option<Self> {
        let index = match code {
            30..=37 => code - 30,
            40..=47 => code - 40,
            90..=97 => code - 90 + 8,
            100..=107 => code - 100 + 8,
            _ => return None,
        };
        Self::ALL.get(index as usize).copied()
    }
}

/// A reference to a color, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorRef {
    /// `reset` or one of the named colors; unknown names are kept verbatim
    Named(String),
    /// Palette index; anything outside 0-255 is unknown
    Indexed(i64),
    /// Explicit components, clamped on resolution
    Rgb(i64, i64, i64),
}

impl ColorRef {
    pub fn named(name: impl Into<String>) -> Self {
        ColorRef::Named(name.into())
    }
}

/// Default color table
pub const DEFAULT_FOREGROUND: Rgb = Rgb(220, 230, 245);
pub const DEFAULT_BACKGROUND: Rgb = Rgb(11, 18, 32);
pub const DEFAULT_ANSI: [Rgb; 16] = [
    Rgb(12, 12, 12),    // black
    Rgb(205, 49, 49),   // red
    Rgb(13, 188, 121),  // green
    Rgb(229, 229, 16),  // yellow
    Rgb(36, 114, 200),  // blue
    Rgb(188, 63, 188),  // magenta
    Rgb(17, 168, 205),  // cyan
    Rgb(204, 204, 204), // gray
    Rgb(128, 128, 128), // dark_gray
    Rgb(241, 76, 76),   // light_red
    Rgb(35, 209, 139),  // light_green
    Rgb(245, 245, 67),  // light_yellow
    Rgb(59, 142, 234),  // light_blue
    Rgb(214, 112, 214), // light_magenta
    Rgb(41, 184, 219),  // light_cyan
    Rgb(242, 242, 242), // white
];

/// Color palette: ambient defaults plus the 16 named colors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Default foreground color
    pub foreground: Rgb,
    /// Default background color
    pub background: Rgb,
    /// The 16 named colors, also used for indices 0-15
    pub ansi: [Rgb; 16],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            foreground: DEFAULT_FOREGROUND,
            background: DEFAULT_BACKGROUND,
            ansi: DEFAULT_ANSI,
        }
    }
}

impl Palette {
    /// The ambient default for a role
    pub fn default_for(&self, role: ColorRole) -> Rgb {
        match role {
            ColorRole::Foreground => self.foreground,
            ColorRole::Background => self.background,
        }
    }

    pub fn named(&self, color: NamedColor) -> Rgb {
        self.ansi[color.index()]
    }

    /// Get the RGB color for a palette index (0-255)
    pub fn indexed(&self, index: u8) -> Rgb {
        match index {
            0..=15 => self.ansi[index as usize],
            // 6x6x6 color cube
            16..=231 => {
                let n = index - 16;
                Rgb(cube_level(n / 36), cube_level((n % 36) / 6), cube_level(n % 6))
            }
            // Grayscale ramp
            232..=255 => Rgb::gray(8 + (index - 232) * 10),
        }
    }

    /// Resolve a reference, with `None` standing for the ambient default
    pub fn resolve_opt(&self, color: &ColorRef) -> Option<Rgb> {
        match color {
            ColorRef::Named(name) => NamedColor::from_name(name).map(|c| self.named(c)),
            ColorRef::Indexed(index) => u8::try_from(*index).ok().map(|i| self.indexed(i)),
            ColorRef::Rgb(r, g, b) => Some(Rgb::clamped(*r, *g, *b)),
        }
    }

    /// Resolve a reference to a concrete color for the given role
    pub fn resolve(&self, color: &ColorRef, role: ColorRole) -> Rgb {
        self.resolve_opt(color)
            .unwrap_or_else(|| self.default_for(role))
    }
}

/// Component level for one axis of the color cube
pub fn cube_level(component: u8) -> u8 {
    if component == 0 {
        0
    } else {
        55 + component * 40
    }
}

//! Actions produced by the parser
//!
//! Only the actions that can affect visible cell content are surfaced.

/// Actions produced by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print a character at the current column
    Print(char),

    /// Execute a C0 control character (0x00-0x1F except ESC, CAN, SUB)
    /// Common controls:
    /// - 0x08 BS: Backspace
    /// - 0x09 HT: Horizontal Tab
    /// - 0x0A LF: Line Feed
    /// - 0x0D CR: Carriage Return
    Control(u8),

    /// CSI (Control Sequence Introducer) dispatch
    /// Format: ESC \[ \[marker\] \[params\] \[intermediates\] final
    Csi(CsiSequence),
}

/// A complete CSI sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsiSequence {
    /// Raw parameter text (digits, `;` and `:`)
    pub params: String,
    /// Intermediate characters (0x20-0x2F)
    pub intermediates: String,
    /// Private marker (`?`, `>`, `<`, `=`) if the sequence had one
    pub private_marker: Option<char>,
    /// Final character (0x40-0x7E) that selects the command
    pub final_char: char,
}

impl CsiSequence {
    /// Check if this is a Select Graphic Rendition sequence
    pub fn is_sgr(&self) -> bool {
        self.final_char == 'm'
    }

    /// SGR codes in order. Empty components are dropped and an empty
    /// list becomes `[0]`. Any component that is not a plain decimal
    /// number (colon sub-parameters, a private marker, intermediates)
    /// turns the whole sequence into `[0]`, a full reset.
    pub fn sgr_codes(&self) -> Vec<u32> {
        if self.private_marker.is_some() || !self.intermediates.is_empty() {
            return vec![0];
        }

        let mut codes = Vec::new();
        for part in self.params.split(';').filter(|part| !part.is_empty()) {
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return vec![0];
            }
            codes.push(parse_saturating(part));
        }

        if codes.is_empty() {
            vec![0]
        } else {
            codes
        }
    }
}

fn parse_saturating(digits: &str) -> u32 {
    digits.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add((b - b'0') as u32)
    })
}

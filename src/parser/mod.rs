//! Terminal escape sequence parser
//!
//! A stateful parser that converts characters into terminal actions,
//! plus the SGR rules that turn CSI `m` sequences into pen changes.
//! Based on the VT500-series parser model from <https://vt100.net/emu/dec_ansi_parser>

mod actions;
mod sgr;
mod state;
mod utf8;

pub use actions::{Action, CsiSequence};
pub use sgr::apply_sgr;
pub use state::{Parser, MAX_CSI_LEN};
pub use utf8::Utf8Stream;

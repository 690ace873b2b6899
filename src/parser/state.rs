//! Parser State Machine
//!
//! Implements the subset of the VT500-series parser model needed to recover
//! visible text and styling from a character stream. The parser handles
//! arbitrary chunk boundaries: a sequence split across two `feed` calls is
//! dispatched exactly as if it had arrived in one piece.
//!
//! # State Machine
//!
//! The CSI states follow the model described in:
//! - "A parser for DEC's ANSI-compatible video terminals" by Paul Williams
//! - https://vt100.net/emu/dec_ansi_parser
//!
//! States:
//! - Ground: Normal text processing
//! - Escape: After ESC, waiting for `[`
//! - CsiParam: After CSI (ESC [), collecting parameters and intermediates
//! - CsiIgnore: Oversized or malformed CSI, consumed until its final char
//!
//! Only `ESC [` opens a sequence. An ESC followed by anything else is
//! dropped and the following char is processed from the ground state, so
//! a stray `ESC P` or `ESC ]` can never hide the text that comes after it.

use super::actions::{Action, CsiSequence};

/// Maximum length of a CSI parameter string before the sequence is ignored
pub const MAX_CSI_LEN: usize = 256;

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
    CsiParam,
    CsiIgnore,
}

/// The escape sequence parser
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    /// Parameter characters collected for the current CSI sequence
    params: String,
    /// Intermediate characters for the current CSI sequence
    intermediates: String,
    /// Private marker of the current CSI sequence
    private_marker: Option<char>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            params: String::with_capacity(16),
            intermediates: String::with_capacity(4),
            private_marker: None,
        }
    }

    /// Check whether the parser sits between sequences
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground
    }

    /// Reset the parser to initial state, discarding any unterminated
    /// sequence
    pub fn reset(&mut self) {
        if self.state != State::Ground {
            tracing::debug!(state = ?self.state, "discarding unterminated escape sequence");
        }
        self.state = State::Ground;
        self.clear_sequence();
    }

    fn clear_sequence(&mut self) {
        self.params.clear();
        self.intermediates.clear();
        self.private_marker = None;
    }

    /// Parse a chunk of text, calling the callback for each action
    pub fn parse<F>(&mut self, input: &str, mut callback: F)
    where
        F: FnMut(Action),
    {
        for c in input.chars() {
            self.advance(c, &mut callback);
        }
    }

    /// Parse a chunk and collect actions into a vector
    pub fn feed(&mut self, input: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        self.parse(input, |action| actions.push(action));
        actions
    }

    /// Advance the parser by one character
    fn advance<F>(&mut self, c: char, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match c {
            '\x1b' => {
                if self.state == State::Escape {
                    tracing::trace!("dropping lone ESC");
                }
                self.state = State::Escape;
                self.clear_sequence();
                return;
            }
            // CAN, SUB - cancel current sequence
            '\x18' | '\x1a' => {
                self.state = State::Ground;
                return;
            }
            // C0 controls execute in every state; a pending lone ESC is dropped
            '\x00'..='\x1f' => {
                if self.state == State::Escape {
                    self.state = State::Ground;
                }
                callback(Action::Control(c as u8));
                return;
            }
            // DEL and C1 controls never print
            '\x7f'..='\u{9f}' => return,
            _ => {}
        }

        match self.state {
            State::Ground => callback(Action::Print(c)),
            State::Escape if c == '[' => self.state = State::CsiParam,
            State::Escape => {
                tracing::trace!(next = %c, "dropping lone ESC");
                self.state = State::Ground;
                callback(Action::Print(c));
            }
            State::CsiParam => self.process_csi_param(c, callback),
            State::CsiIgnore => {
                if is_final(c) {
                    self.state = State::Ground;
                }
            }
        }
    }

    /// Collect CSI parameters, intermediates and the final char
    fn process_csi_param<F>(&mut self, c: char, callback: &mut F)
    where
        F: FnMut(Action),
    {
        match c {
            '<'..='?' if self.params.is_empty() && self.private_marker.is_none() => {
                self.private_marker = Some(c);
            }
            '\x30'..='\x3f' => {
                // Parameters after an intermediate, or a runaway sequence
                if !self.intermediates.is_empty() || self.params.len() >= MAX_CSI_LEN {
                    self.state = State::CsiIgnore;
                } else {
                    self.params.push(c);
                }
            }
            '\x20'..='\x2f' => self.intermediates.push(c),
            c if is_final(c) => {
                self.state = State::Ground;
                callback(Action::Csi(CsiSequence {
                    params: std::mem::take(&mut self.params),
                    intermediates: std::mem::take(&mut self.intermediates),
                    private_marker: self.private_marker.take(),
                    final_char: c,
                }));
            }
            _ => self.state = State::CsiIgnore,
        }
    }
}

/// CSI final chars are `@` through `~`
fn is_final(c: char) -> bool {
    ('\x40'..='\x7e').contains(&c)
}

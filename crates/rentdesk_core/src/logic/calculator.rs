//! Keypad calculator used for quick price checks.
//!
//! # Responsibility
//! - Evaluate one keystroke at a time against an entry buffer.
//! - Produce the VAT breakdown shown on the side panel.
//!
//! # Invariants
//! - A keystroke never panics; malformed entries are left as they are.
//! - Arithmetic errors replace the display for exactly one keystroke and
//!   leave the entry buffer untouched.

use once_cell::sync::Lazy;
use regex::Regex;

/// Gross amounts are split assuming this VAT percentage.
pub const VAT_RATE: f64 = 19.0;

const DISPLAY_MAX_DIGITS: usize = 16;
const DIV_BY_ZERO: &str = "ERR: div by zero";
const OPERATOR_CHARS: &[char] = &['*', '/', '+', '-'];

static TRAILING_OP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[*/+-]$").expect("valid trailing operator regex"));

/// One keypad keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Digit keys `0`..`9`; other values are ignored.
    Digit(u8),
    /// The `000` convenience key.
    Thousands,
    Dot,
    Plus,
    Minus,
    Times,
    Divide,
    Equals,
    /// Splits the current entry into gross, VAT share and net.
    Vat,
    Backspace,
    /// Clears the entry buffer only.
    ClearEntry,
    /// Clears the entry buffer and the side panel.
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Op {
    fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }
}

/// Keystroke-driven expression evaluator.
///
/// The buffer holds at most one pending operation: entering a second
/// operator folds `a <op> b` into its result first.
#[derive(Debug, Default)]
pub struct Calculator {
    buffer: String,
    pending: Option<Op>,
    side_panel: String,
    error: Option<&'static str>,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Main display content: the entry buffer, `"0"` when empty, or the
    /// arithmetic error raised by the most recent keystroke.
    pub fn display(&self) -> &str {
        if let Some(error) = self.error {
            return error;
        }
        if self.buffer.is_empty() {
            "0"
        } else {
            &self.buffer
        }
    }

    /// Side panel content, fed by the VAT key until cleared with `C`.
    pub fn vat_panel(&self) -> &str {
        &self.side_panel
    }

    /// Feeds one keystroke into the evaluator.
    pub fn press(&mut self, key: Key) {
        self.error = None;
        match key {
            Key::Digit(value) => {
                if value <= 9 {
                    self.append(char::from(b'0' + value));
                }
            }
            Key::Thousands => {
                for _ in 0..3 {
                    self.append('0');
                }
            }
            Key::Dot => {
                if !self.trailing_number_has_dot() {
                    self.append('.');
                }
            }
            Key::Plus => self.operator(Op::Add),
            Key::Minus => self.operator(Op::Subtract),
            Key::Times => self.operator(Op::Multiply),
            Key::Divide => self.operator(Op::Divide),
            Key::Equals => {
                if !TRAILING_OP_RE.is_match(&self.buffer) {
                    self.fold();
                }
            }
            Key::Vat => self.vat_breakdown(),
            Key::Backspace => {
                self.buffer.pop();
            }
            Key::Clear => {
                self.side_panel.clear();
                self.buffer.clear();
            }
            Key::ClearEntry => self.buffer.clear(),
        }
    }

    fn operator(&mut self, op: Op) {
        // a trailing operator is replaced by nothing: the keystroke is ignored
        if TRAILING_OP_RE.is_match(&self.buffer) {
            return;
        }
        self.fold();
        if self.error.is_none() {
            self.append(op.symbol());
            self.pending = Some(op);
        }
    }

    /// Collapses a complete `a <op> b` entry into its result. Entries with
    /// fewer or more than two numbers, or numbers that do not parse, are
    /// left untouched.
    fn fold(&mut self) {
        let op = match self.pending {
            Some(op) => op,
            None => return,
        };
        let parts: Vec<&str> = self.buffer.split(OPERATOR_CHARS).collect();
        if parts.len() != 2 {
            return;
        }
        let (lhs, rhs) = match (parts[0].parse::<f64>(), parts[1].parse::<f64>()) {
            (Ok(lhs), Ok(rhs)) => (lhs, rhs),
            _ => return,
        };
        let result = match op {
            Op::Add => lhs + rhs,
            Op::Subtract => lhs - rhs,
            Op::Multiply => lhs * rhs,
            Op::Divide => {
                if rhs == 0.0 {
                    self.error = Some(DIV_BY_ZERO);
                    return;
                }
                lhs / rhs
            }
        };
        // integral results render without a decimal point
        self.buffer = if result.is_finite() && result == result.floor() {
            (result as i64).to_string()
        } else {
            result.to_string()
        };
    }

    fn vat_breakdown(&mut self) {
        let gross = match self.buffer.parse::<f64>() {
            Ok(gross) => gross,
            Err(_) => return,
        };
        let net = gross / (1.0 + VAT_RATE / 100.0);
        let vat = gross - net;
        self.side_panel = format!(
            "Brutto: {gross:.2}\n{VAT_RATE:.1}% MwSt:\n{vat:.2}\nNetto: {net:.2}"
        );
    }

    fn append(&mut self, ch: char) {
        if self.buffer.len() <= DISPLAY_MAX_DIGITS {
            self.buffer.push(ch);
        }
    }

    fn trailing_number_has_dot(&self) -> bool {
        self.buffer
            .rsplit(OPERATOR_CHARS)
            .next()
            .map(|segment| segment.contains('.'))
            .unwrap_or(false)
    }
}

//! Amount input sanitizing.
//!
//! The sanitizer consumes the whole current value of an amount field after
//! each edit and returns its canonical form. Bad keystrokes never surface as
//! errors: they are stripped, or filtered out before they reach the field.

use crate::units::truncate_fraction;

/// Maximum fractional digits accepted in an amount field.
pub const MAX_INPUT_FRACTION_DIGITS: usize = 8;

/// Sanitizes raw field values into canonical decimal strings.
#[derive(Debug, Clone, Copy)]
pub struct AmountInputSanitizer {
    max_fraction_digits: usize,
}

impl Default for AmountInputSanitizer {
    fn default() -> Self {
        Self::new(MAX_INPUT_FRACTION_DIGITS)
    }
}

impl AmountInputSanitizer {
    /// Create a sanitizer with a custom fractional precision cap.
    pub fn new(max_fraction_digits: usize) -> Self {
        Self {
            max_fraction_digits,
        }
    }

    /// Canonicalize the field value after an edit.
    ///
    /// Trailing zeros are kept so the user can keep typing `1.50` towards
    /// `1.505`.
    pub fn sanitize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let mut value = String::with_capacity(raw.len());
        let mut seen_point = false;
        for c in raw.chars() {
            match c {
                '0'..='9' => value.push(c),
                '.' if !seen_point => {
                    seen_point = true;
                    value.push(c);
                }
                // Later points are dropped, digits after them are kept
                _ => {}
            }
        }

        if value == "." {
            return value;
        }

        truncate_fraction(&value, self.max_fraction_digits)
    }

    /// Finalize a "use maximum" value.
    ///
    /// The balance passes through untouched unless it is more precise than the
    /// cap, in which case it is truncated. A missing balance yields `"0"`.
    pub fn finalize_max(&self, max: Option<&str>) -> String {
        match max {
            Some(value) if !value.is_empty() => truncate_fraction(value, self.max_fraction_digits),
            _ => "0".to_string(),
        }
    }
}

/// A key as seen by an amount field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    Backspace,
    Delete,
    Tab,
    Escape,
    Enter,
    Home,
    End,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    /// Any key the field has no use for.
    Other,
}

/// Modifier state of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
}

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyPress {
    /// A key press without modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    /// A key press with ctrl held.
    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers {
                ctrl: true,
                shift: false,
            },
        }
    }

    /// Whether an amount field lets this key through.
    ///
    /// Rejected keys leave the field unchanged.
    pub fn is_accepted(&self) -> bool {
        match self.key {
            Key::Backspace
            | Key::Delete
            | Key::Tab
            | Key::Escape
            | Key::Enter
            | Key::Home
            | Key::End
            | Key::ArrowLeft
            | Key::ArrowRight
            | Key::ArrowUp
            | Key::ArrowDown => true,
            Key::Char('.') => true,
            Key::Char(c) if self.modifiers.ctrl => {
                matches!(c.to_ascii_lowercase(), 'a' | 'c' | 'v' | 'x')
            }
            Key::Char(c) => c.is_ascii_digit() && !self.modifiers.shift,
            Key::Other => false,
        }
    }
}

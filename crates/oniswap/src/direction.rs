//! Swap direction and the two amount fields.

use crate::types::Side;

/// Which way the swap goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Sell the native coin for the token.
    #[default]
    NativeToToken,
    /// Sell the token for the native coin.
    TokenToNative,
}

impl Direction {
    /// The side the user types into.
    pub fn input_side(self) -> Side {
        match self {
            Direction::NativeToToken => Side::Native,
            Direction::TokenToNative => Side::Token,
        }
    }

    /// The side derived from the quote.
    pub fn output_side(self) -> Side {
        self.input_side().other()
    }

    /// The opposite direction.
    pub fn reversed(self) -> Self {
        match self {
            Direction::NativeToToken => Direction::TokenToNative,
            Direction::TokenToNative => Direction::NativeToToken,
        }
    }

    /// The direction whose input side is `side`.
    pub fn from_input_side(side: Side) -> Self {
        match side {
            Side::Native => Direction::NativeToToken,
            Side::Token => Direction::TokenToNative,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.input_side(), self.output_side())
    }
}

/// Tracks the direction and the contents of the input and derived fields.
///
/// Exactly one field is editable at a time. Toggling flips the direction and
/// exchanges the field contents, so the old quote becomes the new input and
/// nothing the user typed is lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapDirectionController {
    direction: Direction,
    input: String,
    derived: String,
}

impl Default for SwapDirectionController {
    fn default() -> Self {
        Self::new(Direction::default())
    }
}

impl SwapDirectionController {
    /// Create a controller with both fields at `"0"`.
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            input: "0".to_string(),
            derived: "0".to_string(),
        }
    }

    /// Current direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Value of the editable field.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Value of the derived field.
    pub fn derived(&self) -> &str {
        &self.derived
    }

    /// Value of the field for `side`.
    pub fn value(&self, side: Side) -> &str {
        if side == self.direction.input_side() {
            &self.input
        } else {
            &self.derived
        }
    }

    /// Whether the field for `side` accepts edits.
    pub fn is_editable(&self, side: Side) -> bool {
        side == self.direction.input_side()
    }

    /// Replace the editable field's value.
    ///
    /// Returns `false` and changes nothing if `side` is the derived field.
    pub fn set_input(&mut self, side: Side, value: String) -> bool {
        if !self.is_editable(side) {
            return false;
        }
        self.input = value;
        true
    }

    /// Replace the derived field's value.
    pub fn set_derived(&mut self, value: String) {
        self.derived = value;
    }

    /// Reset both fields to `"0"`, keeping the direction.
    pub fn reset(&mut self) {
        self.input = "0".to_string();
        self.derived = "0".to_string();
    }

    /// Flip the direction and exchange the field contents.
    pub fn toggle(&mut self) {
        self.direction = self.direction.reversed();
        std::mem::swap(&mut self.input, &mut self.derived);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_direction() {
        let c = SwapDirectionController::default();
        assert_eq!(c.direction(), Direction::NativeToToken);
        assert!(c.is_editable(Side::Native));
        assert!(!c.is_editable(Side::Token));
    }

    #[test]
    fn test_only_active_side_is_editable() {
        let mut c = SwapDirectionController::default();
        assert!(c.set_input(Side::Native, "1.5".into()));
        assert!(!c.set_input(Side::Token, "9".into()));
        assert_eq!(c.value(Side::Native), "1.5");
        assert_eq!(c.value(Side::Token), "0");
    }

    #[test]
    fn test_toggle_hands_values_over() {
        let mut c = SwapDirectionController::default();
        c.set_input(Side::Native, "1".into());
        c.set_derived("2000".into());

        c.toggle();

        assert_eq!(c.direction(), Direction::TokenToNative);
        assert!(c.is_editable(Side::Token));
        // The previous quote seeds the new input
        assert_eq!(c.input(), "2000");
        assert_eq!(c.derived(), "1");
    }

    #[test]
    fn test_double_toggle_restores_state() {
        let mut c = SwapDirectionController::default();
        c.set_input(Side::Native, "0.25".into());
        c.set_derived("512.5".into());
        let before = c.clone();

        c.toggle();
        c.toggle();

        assert_eq!(c, before);
    }

    #[test]
    fn test_reset() {
        let mut c = SwapDirectionController::new(Direction::TokenToNative);
        c.set_input(Side::Token, "3".into());
        c.set_derived("4".into());
        c.reset();

        assert_eq!(c.direction(), Direction::TokenToNative);
        assert_eq!(c.input(), "0");
        assert_eq!(c.derived(), "0");
    }

    #[test]
    fn test_direction_sides() {
        assert_eq!(Direction::NativeToToken.output_side(), Side::Token);
        assert_eq!(Direction::TokenToNative.output_side(), Side::Native);
        assert_eq!(Direction::from_input_side(Side::Token), Direction::TokenToNative);
        assert_eq!(Direction::NativeToToken.to_string(), "native -> token");
    }
}

//! Single-line text input fields for the login and teacher forms.
//!
//! Append/backspace editing only; no cursor movement. Amount fields restrict
//! input to digits so a submitted value always parses or is visibly empty.

/// A single-line editable field.
#[derive(Debug, Default, Clone)]
pub struct InputField {
    value: String,
    digits_only: bool,
}

impl InputField {
    /// A free-text field.
    #[must_use]
    pub fn text() -> Self {
        Self {
            value: String::new(),
            digits_only: false,
        }
    }

    /// A field that only accepts ASCII digits, for talent amounts.
    #[must_use]
    pub fn digits() -> Self {
        Self {
            value: String::new(),
            digits_only: true,
        }
    }

    /// Current contents.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Contents with every character replaced by a mask, for password entry.
    #[must_use]
    pub fn masked_value(&self) -> String {
        "*".repeat(self.value.chars().count())
    }

    /// True when nothing has been typed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Appends a typed character. Control characters are dropped; digit-only
    /// fields drop anything that is not an ASCII digit.
    pub fn push(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if self.digits_only && !c.is_ascii_digit() {
            return;
        }
        self.value.push(c);
    }

    /// Removes the last character, if any.
    pub fn backspace(&mut self) {
        self.value.pop();
    }

    /// Empties the field.
    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Parses the contents as a talent amount. Returns `None` when empty or
    /// out of range; digit-only input cannot otherwise fail to parse.
    #[must_use]
    pub fn parse_amount(&self) -> Option<i64> {
        self.value.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_field_accepts_any_printable() {
        let mut field = InputField::text();
        field.push('a');
        field.push(' ');
        field.push('7');
        field.push('!');
        assert_eq!(field.value(), "a 7!");
    }

    #[test]
    fn test_digits_field_drops_non_digits() {
        let mut field = InputField::digits();
        field.push('1');
        field.push('a');
        field.push('2');
        field.push('-');
        field.push('.');
        assert_eq!(field.value(), "12");
    }

    #[test]
    fn test_control_characters_dropped() {
        let mut field = InputField::text();
        field.push('\n');
        field.push('\t');
        field.push('x');
        assert_eq!(field.value(), "x");
    }

    #[test]
    fn test_backspace_and_clear() {
        let mut field = InputField::text();
        field.push('h');
        field.push('i');
        field.backspace();
        assert_eq!(field.value(), "h");

        field.backspace();
        field.backspace(); // backspace on empty is a no-op
        assert!(field.is_empty());

        field.push('x');
        field.clear();
        assert!(field.is_empty());
    }

    #[test]
    fn test_masked_value() {
        let mut field = InputField::text();
        field.push('p');
        field.push('w');
        assert_eq!(field.masked_value(), "**");
    }

    #[test]
    fn test_parse_amount() {
        let mut field = InputField::digits();
        assert_eq!(field.parse_amount(), None);

        field.push('4');
        field.push('2');
        assert_eq!(field.parse_amount(), Some(42));
    }

    #[test]
    fn test_parse_amount_overflow_is_none() {
        let mut field = InputField::digits();
        // Twenty digits exceeds i64::MAX
        for _ in 0..20 {
            field.push('9');
        }
        assert_eq!(field.parse_amount(), None);
    }
}

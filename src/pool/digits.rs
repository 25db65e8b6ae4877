use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of labels along each grid axis.
pub const AXIS_LEN: usize = 10;

/// The ten labels printed along one grid edge, in ordinal order (left to
/// right for columns, top to bottom for rows). A slot is `None` until it is
/// read or entered.
///
/// Values are immutable: edits produce a new `AxisDigits`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[Option<u8>; 10]", into = "[Option<u8>; 10]")]
pub struct AxisDigits([Option<u8>; AXIS_LEN]);

impl AxisDigits {
    /// All ten slots unknown.
    pub fn unknown() -> Self {
        Self([None; AXIS_LEN])
    }

    /// A fully known axis. Values above 9 are treated as unknown.
    pub fn from_digits(digits: [u8; AXIS_LEN]) -> Self {
        Self(digits.map(|d| (d <= 9).then_some(d)))
    }

    pub fn get(&self, index: usize) -> Option<u8> {
        self.0.get(index).copied().flatten()
    }

    pub fn slots(&self) -> &[Option<u8>; AXIS_LEN] {
        &self.0
    }

    /// Returns a copy with one slot replaced; out-of-range indices and
    /// values above 9 leave the copy unchanged.
    pub fn with_digit(&self, index: usize, digit: Option<u8>) -> Self {
        let mut slots = self.0;
        if index < AXIS_LEN && digit.is_none_or(|d| d <= 9) {
            slots[index] = digit;
        }
        Self(slots)
    }

    /// Ordinal position of `digit` along the axis.
    pub fn position_of(&self, digit: u8) -> Option<usize> {
        self.0.iter().position(|slot| *slot == Some(digit))
    }

    pub fn known_count(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }

    /// True when no slot has been resolved.
    pub fn is_empty(&self) -> bool {
        self.known_count() == 0
    }

    pub fn is_complete(&self) -> bool {
        self.known_count() == AXIS_LEN
    }
}

impl TryFrom<[Option<u8>; AXIS_LEN]> for AxisDigits {
    type Error = String;

    fn try_from(slots: [Option<u8>; AXIS_LEN]) -> Result<Self, Self::Error> {
        match slots.iter().flatten().find(|d| **d > 9) {
            Some(bad) => Err(format!("axis digit out of range: {}", bad)),
            None => Ok(Self(slots)),
        }
    }
}

impl From<AxisDigits> for [Option<u8>; AXIS_LEN] {
    fn from(digits: AxisDigits) -> Self {
        digits.0
    }
}

impl fmt::Display for AxisDigits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match slot {
                Some(d) => write!(f, "{}", d)?,
                None => write!(f, "?")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_of() {
        let cols = AxisDigits::from_digits([3, 1, 4, 1, 5, 9, 2, 6, 5, 0]);
        assert_eq!(cols.position_of(4), Some(2));
        assert_eq!(cols.position_of(1), Some(1));
        assert_eq!(cols.position_of(7), None);
    }

    #[test]
    fn test_with_digit_is_copy_on_write() {
        let original = AxisDigits::unknown();
        let edited = original.with_digit(3, Some(8));

        assert_eq!(original.get(3), None);
        assert_eq!(edited.get(3), Some(8));
        assert_eq!(edited.known_count(), 1);

        assert_eq!(edited.with_digit(12, Some(1)), edited);
        assert_eq!(edited.with_digit(0, Some(11)), edited);
    }

    #[test]
    fn test_json_keeps_unknown_slots() {
        let digits = AxisDigits::unknown().with_digit(0, Some(7)).with_digit(9, Some(0));
        let json = serde_json::to_string(&digits).unwrap();
        assert_eq!(json, "[7,null,null,null,null,null,null,null,null,0]");

        let back: AxisDigits = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digits);
    }

    #[test]
    fn test_json_rejects_out_of_range() {
        let result: Result<AxisDigits, _> = serde_json::from_str("[10,0,0,0,0,0,0,0,0,0]");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        let digits = AxisDigits::unknown().with_digit(1, Some(5));
        assert_eq!(digits.to_string(), "? 5 ? ? ? ? ? ? ? ?");
    }
}

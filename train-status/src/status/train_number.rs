//! Train number type.

use std::fmt;

/// Error returned when parsing an invalid train number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid train number {value:?}: {reason}")]
pub struct InvalidTrainNumber {
    value: String,
    reason: &'static str,
}

impl InvalidTrainNumber {
    fn new(value: &str, reason: &'static str) -> Self {
        Self {
            value: value.to_string(),
            reason,
        }
    }
}

/// A valid 5-digit Indian Railways train number (10000-99999).
///
/// # Examples
///
/// ```
/// use train_status::status::TrainNumber;
///
/// let rajdhani = TrainNumber::parse("12301").unwrap();
/// assert_eq!(rajdhani.get(), 12301);
/// assert_eq!(rajdhani.to_string(), "12301");
///
/// // Leading zeros and short numbers are rejected
/// assert!(TrainNumber::parse("01234").is_err());
/// assert!(TrainNumber::parse("1234").is_err());
/// assert!(TrainNumber::parse("12a01").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainNumber(u32);

impl TrainNumber {
    pub const MIN: u32 = 10000;
    pub const MAX: u32 = 99999;

    /// Parse a train number: exactly 5 ASCII digits, not starting with 0.
    pub fn parse(s: &str) -> Result<Self, InvalidTrainNumber> {
        if s.len() != 5 {
            return Err(InvalidTrainNumber::new(s, "must be exactly 5 digits"));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidTrainNumber::new(s, "must contain only digits 0-9"));
        }

        let number: u32 = s
            .parse()
            .map_err(|_| InvalidTrainNumber::new(s, "must contain only digits 0-9"))?;
        Self::new(number).ok_or_else(|| InvalidTrainNumber::new(s, "must be between 10000 and 99999"))
    }

    /// Wrap a number already known to be in range.
    pub fn new(number: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&number)
            .then_some(TrainNumber(number))
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TrainNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

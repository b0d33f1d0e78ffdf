//! The reference number value type.

use crate::{SequenceError, SequenceResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Digits in the `YYYYMMDD` date prefix.
pub const DATE_PREFIX_DIGITS: usize = 8;

/// Digits in the zero-padded sequence part.
pub const SEQUENCE_DIGITS: usize = 7;

/// Largest sequence one calendar day can hold.
pub const MAX_SEQUENCE: u32 = 9_999_999;

/// Human-readable unique identifier for a claim record.
///
/// An 8-digit `YYYYMMDD` date prefix concatenated with a 7-digit zero-padded
/// sequence in `[1, 9_999_999]`, e.g. `202501010000042`. Computed once when
/// the claim is created and never mutated afterwards; the date prefix makes
/// same-day collisions the only real uniqueness risk.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use claimdesk_sequence::ReferenceNumber;
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let number = ReferenceNumber::from_parts(date, 42).unwrap();
/// assert_eq!(number.as_str(), "202501010000042");
/// assert_eq!(number.date_prefix(), "20250101");
/// assert_eq!(number.sequence(), 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceNumber(String);

impl ReferenceNumber {
	/// Build a reference number from its date and sequence parts.
	///
	/// # Errors
	///
	/// Returns [`SequenceError::InvalidReference`] if `sequence` is zero or
	/// exceeds [`MAX_SEQUENCE`].
	pub fn from_parts(date: NaiveDate, sequence: u32) -> SequenceResult<Self> {
		if sequence == 0 || sequence > MAX_SEQUENCE {
			return Err(SequenceError::InvalidReference(format!(
				"sequence {} outside [1, {}]",
				sequence, MAX_SEQUENCE
			)));
		}
		Ok(Self(format!(
			"{}{:0width$}",
			Self::prefix_for(date),
			sequence,
			width = SEQUENCE_DIGITS
		)))
	}

	/// The 8-digit date prefix for a calendar day.
	pub fn prefix_for(date: NaiveDate) -> String {
		date.format("%Y%m%d").to_string()
	}

	/// The full reference number as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// The 8-digit `YYYYMMDD` prefix.
	pub fn date_prefix(&self) -> &str {
		&self.0[..DATE_PREFIX_DIGITS]
	}

	/// The sequence part parsed back to an integer.
	pub fn sequence(&self) -> u32 {
		// Construction guarantees exactly SEQUENCE_DIGITS trailing digits.
		self.0[DATE_PREFIX_DIGITS..].parse().unwrap_or(0)
	}

	/// The calendar day encoded in the prefix.
	pub fn date(&self) -> NaiveDate {
		NaiveDate::parse_from_str(self.date_prefix(), "%Y%m%d").unwrap_or_default()
	}
}

impl fmt::Display for ReferenceNumber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl FromStr for ReferenceNumber {
	type Err = SequenceError;

	/// Parse and validate a stored reference number.
	///
	/// Rejects anything that is not exactly 15 ASCII digits, a prefix that is
	/// not a real calendar date, or a sequence of zero.
	fn from_str(value: &str) -> SequenceResult<Self> {
		let expected_len = DATE_PREFIX_DIGITS + SEQUENCE_DIGITS;
		if value.len() != expected_len || !value.bytes().all(|b| b.is_ascii_digit()) {
			return Err(SequenceError::InvalidReference(format!(
				"expected {} digits, got {:?}",
				expected_len, value
			)));
		}
		let (prefix, sequence_part) = value.split_at(DATE_PREFIX_DIGITS);
		let date = NaiveDate::parse_from_str(prefix, "%Y%m%d").map_err(|_| {
			SequenceError::InvalidReference(format!("{} is not a calendar date", prefix))
		})?;
		let sequence: u32 = sequence_part
			.parse()
			.map_err(|_| SequenceError::InvalidReference(value.to_string()))?;
		Self::from_parts(date, sequence)
	}
}

impl TryFrom<String> for ReferenceNumber {
	type Error = SequenceError;

	fn try_from(value: String) -> SequenceResult<Self> {
		value.parse()
	}
}

impl From<ReferenceNumber> for String {
	fn from(number: ReferenceNumber) -> Self {
		number.0
	}
}

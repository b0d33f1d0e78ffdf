//! Settings for reference allocation.

use crate::allocator::AllocatorConfig;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Deserializable settings for the reference allocator.
///
/// # Examples
///
/// ```
/// use claimdesk_sequence::SequenceSettings;
///
/// let settings: SequenceSettings =
/// 	serde_json::from_str(r#"{"timezone": "Asia/Tokyo"}"#).unwrap();
/// assert_eq!(settings.timezone, chrono_tz::Asia::Tokyo);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceSettings {
	/// IANA name of the calendar used to derive date prefixes.
	pub timezone: Tz,
}

impl Default for SequenceSettings {
	fn default() -> Self {
		Self { timezone: Tz::UTC }
	}
}

impl From<SequenceSettings> for AllocatorConfig {
	fn from(settings: SequenceSettings) -> Self {
		Self {
			timezone: settings.timezone,
		}
	}
}

//! Fixed-length spacing between consecutive time index entries.
//!
//! The text form follows the pandas offset aliases used by the stacked
//! timeseries files: an optional positive multiplier followed by a unit,
//! e.g. `H`, `15min`, `D`, `90S`. Only fixed-length units are supported;
//! calendar offsets (months, years, anchored weeks) are rejected.

use core::fmt;
use core::num::NonZeroU32;
use core::str::FromStr;

use chrono::Duration;

use crate::{CoreError, CoreResult};

const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u32 = 60 * 60;
const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Index step, stored as a whole number of seconds.
///
/// The representation is canonical: `60min` and `H` parse to the same value
/// and both format as `H`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resolution(NonZeroU32);

impl Resolution {
    pub const SECOND: Resolution = Resolution(NonZeroU32::MIN);
    pub const MINUTE: Resolution = Self::from_const(SECONDS_PER_MINUTE);
    pub const HOUR: Resolution = Self::from_const(SECONDS_PER_HOUR);
    pub const DAY: Resolution = Self::from_const(SECONDS_PER_DAY);

    const fn from_const(seconds: u32) -> Self {
        match NonZeroU32::new(seconds) {
            Some(n) => Self(n),
            None => panic!("resolution constant must be nonzero"),
        }
    }

    /// Resolution of `seconds` seconds; zero is rejected.
    pub fn from_seconds(seconds: u32) -> CoreResult<Self> {
        NonZeroU32::new(seconds)
            .map(Self)
            .ok_or_else(|| CoreError::InvalidResolution {
                text: format!("{seconds}S"),
                reason: "step must be positive",
            })
    }

    /// Resolution equal to a chrono duration.
    ///
    /// The duration must be positive, a whole number of seconds and fit in
    /// `u32` seconds.
    pub fn from_duration(step: Duration) -> CoreResult<Self> {
        let text = || format!("{}s", step.num_seconds());
        if step.subsec_nanos() != 0 {
            return Err(CoreError::InvalidResolution {
                text: text(),
                reason: "step must be a whole number of seconds",
            });
        }
        let secs = step.num_seconds();
        if secs <= 0 {
            return Err(CoreError::InvalidResolution {
                text: text(),
                reason: "step must be positive",
            });
        }
        let secs = u32::try_from(secs).map_err(|_| CoreError::InvalidResolution {
            text: text(),
            reason: "step is too large",
        })?;
        Self::from_seconds(secs)
    }

    pub fn seconds(self) -> u32 {
        self.0.get()
    }

    pub fn as_duration(self) -> Duration {
        Duration::seconds(i64::from(self.seconds()))
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.seconds();
        let (count, unit) = if secs % SECONDS_PER_DAY == 0 {
            (secs / SECONDS_PER_DAY, "D")
        } else if secs % SECONDS_PER_HOUR == 0 {
            (secs / SECONDS_PER_HOUR, "H")
        } else if secs % SECONDS_PER_MINUTE == 0 {
            (secs / SECONDS_PER_MINUTE, "min")
        } else {
            (secs, "S")
        };
        if count == 1 {
            write!(f, "{unit}")
        } else {
            write!(f, "{count}{unit}")
        }
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resolution({self})")
    }
}

impl FromStr for Resolution {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = |reason| CoreError::InvalidResolution {
            text: s.to_string(),
            reason,
        };

        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, unit) = text.split_at(split);

        let count: u32 = if digits.is_empty() {
            1
        } else {
            digits.parse().map_err(|_| invalid("multiplier is too large"))?
        };
        if count == 0 {
            return Err(invalid("multiplier must be positive"));
        }

        let unit_secs = match unit {
            "S" | "s" | "sec" => 1,
            "T" | "min" => SECONDS_PER_MINUTE,
            "H" | "h" => SECONDS_PER_HOUR,
            "D" | "d" => SECONDS_PER_DAY,
            "" => return Err(invalid("missing unit")),
            "W" | "M" | "MS" | "ME" | "Q" | "A" | "Y" | "YS" | "AS" => {
                return Err(invalid("calendar offsets are not fixed-length"));
            }
            _ => return Err(invalid("unknown unit")),
        };

        let secs = count
            .checked_mul(unit_secs)
            .ok_or_else(|| invalid("step is too large"))?;
        Self::from_seconds(secs)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Resolution {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Resolution {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn text_form_round_trips(secs in 1_u32..10_000_000) {
            let res = Resolution::from_seconds(secs).unwrap();
            let parsed: Resolution = res.to_string().parse().unwrap();
            prop_assert_eq!(parsed, res);
        }
    }
}

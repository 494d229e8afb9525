//! Evenly spaced time index shared by all columns of a wide table.

use chrono::Duration;

use crate::timestamp::format_timestamp;
use crate::{CoreError, CoreResult, Resolution, Timestamp};

/// A strictly increasing, evenly spaced timestamp sequence.
///
/// Entry `i` is `start + i * resolution`. An index always has at least one
/// entry, and its last entry is representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimeIndex {
    start: Timestamp,
    len: usize,
    resolution: Resolution,
}

impl TimeIndex {
    pub fn new(start: Timestamp, len: usize, resolution: Resolution) -> CoreResult<Self> {
        if len == 0 {
            return Err(CoreError::IndexTooShort { needed: 1, len });
        }
        let index = Self {
            start,
            len,
            resolution,
        };
        index.offset(len - 1)?;
        Ok(index)
    }

    /// Infer the index from explicit timestamps.
    ///
    /// The resolution is the step between the first two entries; every later
    /// step must be identical.
    pub fn from_timestamps(timestamps: &[Timestamp]) -> CoreResult<Self> {
        let [first, second, ..] = timestamps else {
            return Err(CoreError::IndexTooShort {
                needed: 2,
                len: timestamps.len(),
            });
        };

        let step = *second - *first;
        if step <= Duration::zero() {
            return Err(CoreError::NotIncreasing { position: 1 });
        }
        let resolution = Resolution::from_duration(step)?;

        for (position, pair) in timestamps.windows(2).enumerate().skip(1) {
            let found = pair[1] - pair[0];
            if found <= Duration::zero() {
                return Err(CoreError::NotIncreasing {
                    position: position + 1,
                });
            }
            if found != step {
                return Err(CoreError::UnevenIndex {
                    position: position + 1,
                    expected_s: step.num_seconds(),
                    found_s: found.num_seconds(),
                });
            }
        }

        Self::new(*first, timestamps.len(), resolution)
    }

    /// Rebuild an index from its first entry, last entry and step.
    pub fn from_bounds(start: Timestamp, stop: Timestamp, resolution: Resolution) -> CoreResult<Self> {
        let unaligned = || CoreError::UnalignedBounds {
            start: format_timestamp(&start),
            stop: format_timestamp(&stop),
            resolution: resolution.to_string(),
        };

        let span = (stop - start).num_seconds();
        if stop < start || (stop - start).subsec_nanos() != 0 {
            return Err(unaligned());
        }
        let step = i64::from(resolution.seconds());
        if span % step != 0 {
            return Err(unaligned());
        }
        let len = usize::try_from(span / step)
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or(CoreError::IndexOverflow)?;
        Self::new(start, len, resolution)
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Last entry of the index.
    pub fn stop(&self) -> Timestamp {
        // Checked in the constructor.
        self.offset(self.len - 1).unwrap_or(self.start)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn get(&self, position: usize) -> Option<Timestamp> {
        if position < self.len {
            self.offset(position).ok()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        (0..self.len).filter_map(move |i| self.offset(i).ok())
    }

    pub fn to_vec(&self) -> Vec<Timestamp> {
        self.iter().collect()
    }

    fn offset(&self, position: usize) -> CoreResult<Timestamp> {
        let secs = i64::try_from(position)
            .ok()
            .and_then(|p| p.checked_mul(i64::from(self.resolution.seconds())))
            .ok_or(CoreError::IndexOverflow)?;
        Duration::try_seconds(secs)
            .and_then(|d| self.start.checked_add_signed(d))
            .ok_or(CoreError::IndexOverflow)
    }
}

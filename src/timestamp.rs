//! SIoT wire timestamps.
//!
//! The platform exchanges time as a signed count of milliseconds since
//! 1970-01-01T00:00:00 UTC. Conversions always go through UTC; decoded values
//! are handed out in local time.

use chrono::{DateTime, Local, TimeZone, Utc};

const NANOS_PER_MILLI: i128 = 1_000_000;

/// Milliseconds since the Unix epoch, rounding half up on the sub-millisecond
/// fraction.
pub fn to_epoch_millis<Tz: TimeZone>(time: &DateTime<Tz>) -> i64 {
    let nanos = i128::from(time.timestamp()) * 1_000_000_000
        + i128::from(time.timestamp_subsec_nanos());

    // floor(x + 0.5); chrono's range stays far inside i64 milliseconds
    ((nanos + NANOS_PER_MILLI / 2).div_euclid(NANOS_PER_MILLI)) as i64
}

/// The local time `millis` milliseconds after the Unix epoch.
pub fn from_epoch_millis(millis: i64) -> Result<DateTime<Local>, Error> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|utc| utc.with_timezone(&Local))
        .ok_or(Error::OutOfRange(millis))
}

/// `#[serde(with = "...")]` adapter for wire timestamp fields.
pub mod epoch_millis {
    use chrono::{DateTime, Local};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(super::to_epoch_millis(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Local>, D::Error> {
        let millis = i64::deserialize(deserializer)?;
        super::from_epoch_millis(millis).map_err(de::Error::custom)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("timestamp {0} ms is out of range")]
    OutOfRange(i64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, NaiveDate};

    fn utc(year: i32, month: u32, day: u32, h: u32, m: u32, s: u32, nanos: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_nano_opt(h, m, s, nanos))
            .map(|naive| naive.and_utc())
            .unwrap()
    }

    #[test]
    fn epoch_is_zero() {
        assert_eq!(to_epoch_millis(&DateTime::<Utc>::UNIX_EPOCH), 0);
    }

    #[test]
    fn half_millisecond_rounds_up() {
        assert_eq!(to_epoch_millis(&utc(1970, 1, 1, 0, 0, 0, 500_000_000)), 500);
        assert_eq!(to_epoch_millis(&(DateTime::<Utc>::UNIX_EPOCH + Duration::microseconds(500))), 1);
        assert_eq!(to_epoch_millis(&(DateTime::<Utc>::UNIX_EPOCH + Duration::nanoseconds(499_999))), 0);
        assert_eq!(to_epoch_millis(&(DateTime::<Utc>::UNIX_EPOCH + Duration::microseconds(1_500))), 2);
    }

    #[test]
    fn before_epoch_rounds_half_up() {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        assert_eq!(to_epoch_millis(&(epoch - Duration::microseconds(500))), 0);
        assert_eq!(to_epoch_millis(&(epoch - Duration::microseconds(600))), -1);
        assert_eq!(to_epoch_millis(&(epoch - Duration::microseconds(1_500))), -1);
        assert_eq!(to_epoch_millis(&(epoch - Duration::milliseconds(1))), -1);
    }

    #[test]
    fn round_trips_whole_milliseconds() {
        for millis in [
            i64::MIN / 1_000_000,
            -62_135_596_800_000,
            -1_000_000_000_123,
            -1,
            0,
            1,
            1_508_312_345_678,
            253_402_300_799_999,
        ] {
            let time = from_epoch_millis(millis).unwrap();
            assert_eq!(to_epoch_millis(&time), millis, "millis {millis}");
        }
    }

    #[test]
    fn offset_does_not_change_the_instant() {
        let instant = utc(2017, 10, 18, 12, 30, 0, 0);
        let zurich = instant.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(to_epoch_millis(&zurich), to_epoch_millis(&instant));
        assert_eq!(to_epoch_millis(&instant), 1_508_329_800_000);
    }

    #[test]
    fn decoded_value_is_the_same_instant() {
        let local = from_epoch_millis(1_508_329_800_000).unwrap();
        assert_eq!(local.with_timezone(&Utc), utc(2017, 10, 18, 12, 30, 0, 0));
    }

    #[test]
    fn out_of_range_is_an_error() {
        assert_eq!(from_epoch_millis(i64::MAX), Err(Error::OutOfRange(i64::MAX)));
    }
}

//! Codecs for dates and times.
//!
//! Every temporal type encodes to a `Long` count of units since an epoch.
//! `Long(-1)` is reserved as the absence marker. Strings in ISO-8601 form
//! are accepted on read for values written by string-based writers.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};

use super::{EncodedValue, PrefCodec};

/// Encoded absence marker shared by all temporal codecs
pub const ABSENT_LONG: i64 = -1;

/// `NaiveDate::num_days_from_ce` of 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

impl PrefCodec for DateTime<Utc> {
    const SENTINEL: Option<EncodedValue> = Some(EncodedValue::Long(ABSENT_LONG));

    fn encode(&self) -> EncodedValue {
        EncodedValue::Long(self.timestamp_millis())
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Long(millis) => Utc.timestamp_millis_opt(*millis).single(),
            EncodedValue::Str(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl PrefCodec for NaiveDateTime {
    const SENTINEL: Option<EncodedValue> = Some(EncodedValue::Long(ABSENT_LONG));

    fn encode(&self) -> EncodedValue {
        EncodedValue::Long(Utc.from_utc_datetime(self).timestamp())
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Long(secs) => Utc.timestamp_opt(*secs, 0).single().map(|dt| dt.naive_utc()),
            EncodedValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl PrefCodec for NaiveDate {
    const SENTINEL: Option<EncodedValue> = Some(EncodedValue::Long(ABSENT_LONG));

    fn encode(&self) -> EncodedValue {
        let days = i64::from(self.num_days_from_ce()) - i64::from(UNIX_EPOCH_DAYS_FROM_CE);
        EncodedValue::Long(days)
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Long(days) => {
                let days = i32::try_from(*days).ok()?;
                let from_ce = days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?;
                NaiveDate::from_num_days_from_ce_opt(from_ce)
            }
            EncodedValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl PrefCodec for NaiveTime {
    const SENTINEL: Option<EncodedValue> = Some(EncodedValue::Long(ABSENT_LONG));

    fn encode(&self) -> EncodedValue {
        EncodedValue::Long(i64::from(self.num_seconds_from_midnight()))
    }

    fn decode(raw: &EncodedValue) -> Option<Self> {
        match raw {
            EncodedValue::Long(secs) => {
                let secs = u32::try_from(*secs).ok()?;
                NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
            }
            EncodedValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

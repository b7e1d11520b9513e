//! Serde helpers for the API's timestamp strings.
//!
//! The projects API emits RFC 3339 instants, but seeded records sometimes carry
//! a bare `YYYY-MM-DD` date. Bare dates are read as midnight UTC.

use serde::{Deserialize, Deserializer, Serializer, de::Error as _, ser::Error as _};
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

/// Parse an API timestamp.
pub fn parse(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let trimmed = value.trim();
    match OffsetDateTime::parse(trimmed, &Rfc3339) {
        Ok(instant) => Ok(instant),
        Err(err) => Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
            .map(|date| date.midnight().assume_utc())
            .map_err(|_| err),
    }
}

pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let formatted = value.format(&Rfc3339).map_err(S::Error::custom)?;
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|err| D::Error::custom(format!("invalid timestamp `{raw}`: {err}")))
}

pub mod option {
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};
    use time::OffsetDateTime;

    use super::parse;

    pub fn serialize<S: Serializer>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(instant) => super::serialize(instant, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<OffsetDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|value| {
            parse(&value)
                .map_err(|err| D::Error::custom(format!("invalid timestamp `{value}`: {err}")))
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_dates_are_midnight_utc() {
        let instant = parse("2025-06-01").expect("date parses");
        assert_eq!(instant.unix_timestamp(), 1_748_736_000);
    }

    #[test]
    fn rfc3339_keeps_offset() {
        let instant = parse("2024-01-01T06:00:00+06:00").expect("instant parses");
        assert_eq!(instant.unix_timestamp(), 1_704_067_200);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse("last tuesday").is_err());
    }
}

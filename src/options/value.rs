use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use std::{
    any::type_name,
    num::ParseIntError,
    str::ParseBoolError,
};

/// `1989-10-02`. Values of exactly this length are read as calendar dates.
const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";
const DATE_ONLY_LEN: usize = "2006-01-02".len();

/// A query parameter value that doesn't fit the field it binds to.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("error while parsing string '{value}' as {ty}: {source}")]
    Int {
        value: String,
        ty: &'static str,
        #[source]
        source: ParseIntError,
    },

    #[error("error while parsing string '{value}' as bool: {source}")]
    Bool {
        value: String,
        #[source]
        source: ParseBoolError,
    },

    #[error("error while parsing string '{value}' as a date or RFC 3339 timestamp: {source}")]
    Time {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("cannot set '{value}' value to unsupported type '{ty}'")]
    Unsupported { value: String, ty: &'static str },
}

/// A field type that can be assigned from the raw value of a query parameter.
pub trait FromQueryValue: Sized {
    fn from_query_value(raw: &str) -> Result<Self, ValueError>;
}

impl FromQueryValue for String {
    fn from_query_value(raw: &str) -> Result<Self, ValueError> {
        Ok(raw.to_owned())
    }
}

impl FromQueryValue for bool {
    fn from_query_value(raw: &str) -> Result<Self, ValueError> {
        raw.parse().map_err(|source| ValueError::Bool {
            value: raw.to_owned(),
            source,
        })
    }
}

macro_rules! from_query_value_int_impl {
    ($($int:ty),* $(,)?) => {
        $(
            impl FromQueryValue for $int {
                fn from_query_value(raw: &str) -> Result<Self, ValueError> {
                    raw.parse().map_err(|source| ValueError::Int {
                        value: raw.to_owned(),
                        ty: stringify!($int),
                        source,
                    })
                }
            }
        )*
    };
}

from_query_value_int_impl!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl FromQueryValue for DateTime<FixedOffset> {
    fn from_query_value(raw: &str) -> Result<Self, ValueError> {
        let parsed = if raw.len() == DATE_ONLY_LEN {
            NaiveDate::parse_from_str(raw, DATE_ONLY_FORMAT)
                .map(|date| date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        } else {
            DateTime::parse_from_rfc3339(raw)
        };

        parsed.map_err(|source| ValueError::Time {
            value: raw.to_owned(),
            source,
        })
    }
}

impl FromQueryValue for DateTime<Utc> {
    fn from_query_value(raw: &str) -> Result<Self, ValueError> {
        DateTime::<FixedOffset>::from_query_value(raw).map(|time| time.with_timezone(&Utc))
    }
}

impl FromQueryValue for NaiveDate {
    fn from_query_value(raw: &str) -> Result<Self, ValueError> {
        DateTime::<FixedOffset>::from_query_value(raw).map(|time| time.date_naive())
    }
}

/// `Some(value)` on success. An empty string is a value, not an absence.
impl<T> FromQueryValue for Option<T>
where
    T: FromQueryValue,
{
    fn from_query_value(raw: &str) -> Result<Self, ValueError> {
        T::from_query_value(raw).map(Some)
    }
}

/// Sequences can't be rebuilt from a single query value, so binding one to a parameter is
/// reported at merge time instead of silently dropping the value.
impl<T> FromQueryValue for Vec<T> {
    fn from_query_value(raw: &str) -> Result<Self, ValueError> {
        Err(ValueError::Unsupported {
            value: raw.to_owned(),
            ty: type_name::<Self>(),
        })
    }
}

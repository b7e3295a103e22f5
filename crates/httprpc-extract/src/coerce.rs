//! Coercion from wire strings to typed field values.
//!
//! Query parameters, path parameters and headers all arrive as strings. A
//! field can be bound from them if its type implements [`FromWire`]:
//!
//! | Type | Accepted text |
//! |---|---|
//! | `String` | anything |
//! | `bool` | `1 t T TRUE true True 0 f F FALSE false False` |
//! | integers | base-10, optional sign |
//! | `f32`, `f64` | decimal or exponent form, `inf`, `NaN` |
//! | `DateTime<Utc>`, `DateTime<FixedOffset>` | RFC 3339 |
//! | `Uuid` | hyphenated or simple form |
//! | `Text<T>` | whatever `T: FromStr` accepts |
//! | `Option<T>` | as `T`, wrapped in `Some` |
//! | `Vec<T>` | one `T` per wire value |
//!
//! Scalars use the first wire value. Types outside this table simply do not
//! implement `FromWire`, so binding them is a compile error.

use chrono::{DateTime, FixedOffset, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// A wire value could not be coerced into the field type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{context}: {message}")]
pub struct CoercionError {
    context: &'static str,
    message: String,
}

impl CoercionError {
    /// Creates an error, e.g. `CoercionError::new("parse int", err)`.
    pub fn new(context: &'static str, message: impl fmt::Display) -> Self {
        Self {
            context,
            message: message.to_string(),
        }
    }
}

/// Types that can be built from one or more wire strings.
///
/// `values` is never empty when called by the decoders.
pub trait FromWire: Sized {
    /// Coerces `values` into `Self`.
    ///
    /// # Errors
    ///
    /// Returns a [`CoercionError`] when the text is not valid for the type.
    fn from_wire(values: &[String]) -> Result<Self, CoercionError>;
}

fn first<'a>(values: &'a [String]) -> Result<&'a str, CoercionError> {
    values
        .first()
        .map(String::as_str)
        .ok_or_else(|| CoercionError::new("decode", "no value"))
}

impl FromWire for String {
    fn from_wire(values: &[String]) -> Result<Self, CoercionError> {
        first(values).map(str::to_string)
    }
}

impl FromWire for bool {
    fn from_wire(values: &[String]) -> Result<Self, CoercionError> {
        parse_bool(first(values)?)
    }
}

/// Parses the textual boolean forms `1 t T TRUE true True` and
/// `0 f F FALSE false False`.
///
/// # Errors
///
/// Any other text is rejected.
pub fn parse_bool(text: &str) -> Result<bool, CoercionError> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(CoercionError::new(
            "parse bool",
            format!("invalid syntax {other:?}"),
        )),
    }
}

macro_rules! from_wire_parse {
    ($context:literal => $($ty:ty),+ $(,)?) => {
        $(
            impl FromWire for $ty {
                fn from_wire(values: &[String]) -> Result<Self, CoercionError> {
                    first(values)?
                        .parse::<$ty>()
                        .map_err(|e| CoercionError::new($context, e))
                }
            }
        )+
    };
}

from_wire_parse!("parse int" => i8, i16, i32, i64, i128, isize);
from_wire_parse!("parse uint" => u8, u16, u32, u64, u128, usize);
from_wire_parse!("parse float" => f32, f64);

impl FromWire for DateTime<FixedOffset> {
    fn from_wire(values: &[String]) -> Result<Self, CoercionError> {
        DateTime::parse_from_rfc3339(first(values)?).map_err(|e| CoercionError::new("parse time", e))
    }
}

impl FromWire for DateTime<Utc> {
    fn from_wire(values: &[String]) -> Result<Self, CoercionError> {
        DateTime::<FixedOffset>::from_wire(values).map(|t| t.with_timezone(&Utc))
    }
}

impl FromWire for Uuid {
    fn from_wire(values: &[String]) -> Result<Self, CoercionError> {
        Uuid::parse_str(first(values)?).map_err(|e| CoercionError::new("parse uuid", e))
    }
}

impl<T: FromWire> FromWire for Option<T> {
    fn from_wire(values: &[String]) -> Result<Self, CoercionError> {
        T::from_wire(values).map(Some)
    }
}

impl<T: FromWire> FromWire for Vec<T> {
    fn from_wire(values: &[String]) -> Result<Self, CoercionError> {
        values
            .iter()
            .map(|value| T::from_wire(std::slice::from_ref(value)))
            .collect()
    }
}

/// A field coerced through its [`FromStr`] implementation.
///
/// Use it for domain types with their own textual form.
///
/// # Example
///
/// ```rust
/// use httprpc_extract::{FromWire, Text};
/// use std::net::IpAddr;
///
/// let ip = Text::<IpAddr>::from_wire(&["10.0.0.1".to_string()]).unwrap();
/// assert!(ip.0.is_ipv4());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Text<T>(pub T);

impl<T> Text<T> {
    /// Returns the wrapped value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Text<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromWire for Text<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    fn from_wire(values: &[String]) -> Result<Self, CoercionError> {
        first(values)?
            .parse()
            .map(Text)
            .map_err(|e| CoercionError::new("unmarshal text", e))
    }
}

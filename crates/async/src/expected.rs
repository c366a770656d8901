// s7tag-rs
//
// Siemens S7 tag address parser and value codec, with rust style APIs and useful extensions.
// Copyright: 2022, Joylei <leingliu@gmail.com>
// License: MIT

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveTime};
use core::fmt;
use s7tag_core::DecodedValue;
use std::{str::FromStr, time::Duration};

/// value a tag is expected to hold, written as `type;value`
///
/// type keys are either lower-case value kinds (`boolean`, `byte`, `short`, `int`,
/// `long`, `float`, `double`, `char`, `string`, `time`, `date`, `time_of_day`)
/// or PLC type names (`BOOL`, `INT`, `REAL`, `WSTRING`, ...).
///
/// # Examples
/// ```rust
/// use s7tag_async::ExpectedValue;
/// use s7tag_core::DecodedValue;
///
/// let expected = ExpectedValue::parse("int;-42").unwrap();
/// assert!(expected.matches(&DecodedValue::Int(-42)));
/// assert!(expected.matches(&DecodedValue::DInt(-42)));
/// assert!(!expected.matches(&DecodedValue::Real(-42.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedValue {
    /// boolean
    Bool(bool),
    /// any integer type
    Int(i64),
    /// floating point text, kept at both precisions
    Float {
        /// text parsed as `f32`, compared against REAL
        single: f32,
        /// text parsed as `f64`, compared against LREAL
        double: f64,
    },
    /// characters & strings
    Text(String),
    /// TIME
    Time(Duration),
    /// DATE
    Date(NaiveDate),
    /// TIME_OF_DAY
    TimeOfDay(NaiveTime),
}

impl ExpectedValue {
    /// parse `type;value`; everything after the first `;` is the value
    pub fn parse(s: &str) -> Result<Self> {
        let (ty, value) = s
            .split_once(';')
            .ok_or_else(|| Error::config(format!("expected `type;value`, got `{}`", s)))?;
        let invalid = |what: &str| Error::config(format!("invalid {} value `{}`", what, value));
        let v = match ty {
            "boolean" | "BOOL" => ExpectedValue::Bool(value.trim().eq_ignore_ascii_case("true")),
            "byte" => ExpectedValue::Int(parse_int::<i8>(value).ok_or_else(|| invalid(ty))?),
            "short" => ExpectedValue::Int(parse_int::<i16>(value).ok_or_else(|| invalid(ty))?),
            "int" => ExpectedValue::Int(parse_int::<i32>(value).ok_or_else(|| invalid(ty))?),
            "long" => ExpectedValue::Int(parse_int::<i64>(value).ok_or_else(|| invalid(ty))?),
            "SINT" => ExpectedValue::Int(parse_int::<i8>(value).ok_or_else(|| invalid(ty))?),
            "INT" => ExpectedValue::Int(parse_int::<i16>(value).ok_or_else(|| invalid(ty))?),
            "DINT" => ExpectedValue::Int(parse_int::<i32>(value).ok_or_else(|| invalid(ty))?),
            "BYTE" | "USINT" => {
                ExpectedValue::Int(parse_int::<u8>(value).ok_or_else(|| invalid(ty))?)
            }
            "WORD" | "UINT" => {
                ExpectedValue::Int(parse_int::<u16>(value).ok_or_else(|| invalid(ty))?)
            }
            "DWORD" | "UDINT" => {
                ExpectedValue::Int(parse_int::<u32>(value).ok_or_else(|| invalid(ty))?)
            }
            "float" | "double" | "REAL" | "LREAL" => {
                let text = value.trim();
                match (text.parse::<f32>(), text.parse::<f64>()) {
                    (Ok(single), Ok(double)) => ExpectedValue::Float { single, double },
                    _ => return Err(invalid(ty)),
                }
            }
            "char" | "CHAR" | "WCHAR" => {
                let c = value.chars().next().ok_or_else(|| invalid(ty))?;
                ExpectedValue::Text(c.to_string())
            }
            "string" | "STRING" | "WSTRING" => ExpectedValue::Text(value.to_owned()),
            "time" | "TIME" => ExpectedValue::Time(parse_duration(value).ok_or_else(|| invalid(ty))?),
            "date" | "DATE" => ExpectedValue::Date(
                NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| invalid(ty))?,
            ),
            "time_of_day" | "TIME_OF_DAY" => {
                ExpectedValue::TimeOfDay(parse_time_of_day(value).ok_or_else(|| invalid(ty))?)
            }
            _ => return Err(Error::config(format!("unknown value type `{}`", ty))),
        };
        Ok(v)
    }

    /// compare in the value domain: integers widened, REAL/LREAL exact at their own precision
    pub fn matches(&self, value: &DecodedValue) -> bool {
        match (self, value) {
            (ExpectedValue::Bool(a), DecodedValue::Bool(b)) => a == b,
            (ExpectedValue::Int(a), _) => value.as_i64() == Some(*a),
            (ExpectedValue::Float { single, .. }, DecodedValue::Real(b)) => single == b,
            (ExpectedValue::Float { double, .. }, DecodedValue::LReal(b)) => double == b,
            (ExpectedValue::Text(a), _) => value.as_str() == Some(a.as_str()),
            (ExpectedValue::Time(a), DecodedValue::Time(b)) => a == b,
            (ExpectedValue::Date(a), DecodedValue::Date(b)) => a == b,
            (ExpectedValue::TimeOfDay(a), DecodedValue::TimeOfDay(b)) => a == b,
            _ => false,
        }
    }
}

impl FromStr for ExpectedValue {
    type Err = Error;

    #[inline]
    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ExpectedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedValue::Bool(v) => write!(f, "{}", v),
            ExpectedValue::Int(v) => write!(f, "{}", v),
            ExpectedValue::Float { double, .. } => write!(f, "{}", double),
            ExpectedValue::Text(v) => f.write_str(v),
            ExpectedValue::Time(v) => write!(f, "{}ms", v.as_millis()),
            ExpectedValue::Date(v) => write!(f, "{}", v),
            ExpectedValue::TimeOfDay(v) => write!(f, "{}", v),
        }
    }
}

#[inline]
fn parse_int<T: Into<i64> + FromStr>(s: &str) -> Option<i64> {
    s.trim().parse::<T>().ok().map(Into::into)
}

/// plain milliseconds, or ISO-8601 `PnDTnHnMn.nS`
fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Ok(millis) = s.parse::<u64>() {
        return Some(Duration::from_millis(millis));
    }
    let rest = s.strip_prefix('P').or_else(|| s.strip_prefix('p'))?;
    let (date_part, time_part) = match rest.find(|c: char| c == 'T' || c == 't') {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };

    let mut total = Duration::ZERO;
    let mut any = false;
    if !date_part.is_empty() {
        let days = date_part
            .strip_suffix('D')
            .or_else(|| date_part.strip_suffix('d'))?;
        let days: u64 = days.parse().ok()?;
        total += Duration::from_secs(days.checked_mul(86_400)?);
        any = true;
    }
    if let Some(mut time_part) = time_part {
        if time_part.is_empty() {
            return None;
        }
        while !time_part.is_empty() {
            let pos = time_part.find(|c: char| c.is_ascii_alphabetic())?;
            let (number, unit) = time_part.split_at(pos);
            let seconds: f64 = number.parse().ok()?;
            if !seconds.is_finite() || seconds < 0.0 {
                return None;
            }
            let factor = match unit.chars().next()?.to_ascii_uppercase() {
                'H' => 3600.0,
                'M' => 60.0,
                'S' => 1.0,
                _ => return None,
            };
            total += Duration::try_from_secs_f64(seconds * factor).ok()?;
            time_part = &unit[1..];
        }
        any = true;
    }
    if any {
        Some(total)
    } else {
        None
    }
}

/// `HH:MM[:SS[.fff]]`
fn parse_time_of_day(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

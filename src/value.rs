//! Dynamically-typed argument values (spec §3 "Argument map").
//!
//! Descended from the teacher's `ParamValue`: the `Int`/`Dec`/`String`
//! variants and the numeric coercion helpers are kept verbatim in spirit,
//! generalized with an `Instant` variant for the "absolute instant" coercion
//! `date`/`time` placeholders require.

use std::collections::HashMap;
use std::fmt;

use ordered_float::OrderedFloat;

use crate::error::MessageFormatError;

/// A single argument value. Arguments are looked up by exact (case-sensitive)
/// name from an [`Args`] map for the duration of one `format` call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamValue {
    inner: ParamValueInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ParamValueInner {
    Int(i64),
    Dec(OrderedFloat<f64>),
    String(String),
    /// Milliseconds since the Unix epoch.
    Instant(i64),
}

impl From<ParamValueInner> for ParamValue {
    fn from(inner: ParamValueInner) -> Self {
        Self { inner }
    }
}

impl ParamValue {
    /// Milliseconds-since-epoch constructor for `date`/`time` arguments.
    pub fn instant_millis(millis: i64) -> Self {
        ParamValueInner::Instant(millis).into()
    }

    /// Coerce to a real number (spec §3: numeric context). Accepts `Int`,
    /// `Dec`, and numeric-looking strings; `Instant` is never numeric.
    pub(crate) fn as_decimal(&self) -> Option<f64> {
        match &self.inner {
            ParamValueInner::Int(n) => Some(*n as f64),
            ParamValueInner::Dec(x) => Some(x.0),
            ParamValueInner::String(s) => s.parse().ok(),
            ParamValueInner::Instant(_) => None,
        }
    }

    /// Coerce to a string key (spec §3: `select` context).
    pub(crate) fn as_select_key(&self) -> Option<String> {
        match &self.inner {
            ParamValueInner::Int(n) => Some(n.to_string()),
            ParamValueInner::Dec(x) => Some(x.0.to_string()),
            ParamValueInner::String(s) => Some(s.clone()),
            ParamValueInner::Instant(_) => None,
        }
    }

    /// Coerce to an absolute instant, milliseconds since the Unix epoch
    /// (spec §3: `date`/`time` context).
    pub(crate) fn as_instant_millis(&self) -> Option<i64> {
        match &self.inner {
            ParamValueInner::Instant(v) => Some(*v),
            _ => None,
        }
    }

    pub(crate) fn is_instant(&self) -> bool {
        matches!(self.inner, ParamValueInner::Instant(_))
    }
}

macro_rules! impl_from_integer_type {
    ($itype:ident) => {
        impl From<$itype> for ParamValue {
            fn from(value: $itype) -> Self {
                ParamValueInner::Int(value.into()).into()
            }
        }
    };
}

impl_from_integer_type!(i64);
impl_from_integer_type!(i32);
impl_from_integer_type!(i16);
impl_from_integer_type!(i8);
impl_from_integer_type!(u32);
impl_from_integer_type!(u16);
impl_from_integer_type!(u8);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValueInner::Dec(OrderedFloat(value)).into()
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValueInner::String(value).into()
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        value.to_owned().into()
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            ParamValueInner::Int(value) => write!(f, "{value}"),
            ParamValueInner::Dec(value) => write!(f, "{value}"),
            ParamValueInner::String(value) => f.write_str(value),
            ParamValueInner::Instant(millis) => write!(f, "{millis}"),
        }
    }
}

/// The argument map a single `format` call is evaluated against (spec §3,
/// §9: the map form is primary; no structured-value reflection adapter is
/// offered — see DESIGN.md).
pub type Args = HashMap<String, ParamValue>;

/// Fluent builder for [`Args`], mirroring the chained `arg(...).arg(...)`
/// style call sites typically use to build one-off argument maps for tests
/// and small call sites.
#[derive(Debug, Default, Clone)]
pub struct ArgsBuilder {
    args: Args,
}

impl ArgsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Args {
        self.args
    }
}

/// Shorthand for starting an [`ArgsBuilder`]: `arg("name", "Hendrik").arg("city", "Berlin").build()`.
pub fn arg(name: impl Into<String>, value: impl Into<ParamValue>) -> ArgsBuilder {
    ArgsBuilder::new().arg(name, value)
}

pub(crate) fn type_mismatch(name: &str, expected: &'static str) -> MessageFormatError {
    MessageFormatError::ArgumentTypeMismatch {
        name: name.to_owned(),
        expected,
    }
}

//! The formatter registry (spec §4.D).
//!
//! `select`/`plural`/`selectordinal` are structurally distinguished in the
//! pattern tree (see `pattern.rs`) and evaluated directly by the evaluator
//! using the plural engine — the "tagged variant over built-in types" arm of
//! the equivalence spec §9 grants. `number`/`date`/`time`, plus anything a
//! caller registers, go through this registry — the "registry of objects"
//! arm of the same equivalence. Both arms share one contract,
//! [`ValueFormatter`], so user-registered types are indistinguishable from
//! the built-ins at the call site.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use icu::locid::Locale;

use crate::error::MessageFormatError;
use crate::locale_format::{self, CustomValueFormatter};
use crate::value::ParamValue;

/// `parse_arguments` is implicit: the pattern parser already splits a
/// formatted placeholder into `(name, type, style)`, so a `ValueFormatter`
/// only needs the evaluation half of spec §4.D's contract.
pub trait ValueFormatter: Send + Sync {
    /// `name` is the argument's name in the pattern, used to identify the
    /// offending argument in an `ArgumentTypeMismatch` error.
    fn format(
        &self,
        name: &str,
        value: &ParamValue,
        style: Option<&str>,
        locale: &Locale,
    ) -> Result<String, MessageFormatError>;
}

/// The three type keywords the evaluator may never hand off to a
/// user-registered formatter, because their evaluation needs the plural
/// engine and branch map the registry contract doesn't carry.
const RESERVED: [&str; 3] = ["select", "plural", "selectordinal"];

pub(crate) struct FormatterRegistry {
    entries: RwLock<HashMap<String, Arc<dyn ValueFormatter>>>,
}

impl FormatterRegistry {
    pub(crate) fn new(custom: Option<Arc<dyn CustomValueFormatter>>) -> Self {
        let mut entries: HashMap<String, Arc<dyn ValueFormatter>> = HashMap::new();
        entries.insert(
            "number".to_owned(),
            Arc::new(NumberFormatter {
                custom: custom.clone(),
            }) as Arc<dyn ValueFormatter>,
        );
        entries.insert(
            "date".to_owned(),
            Arc::new(DateFormatter {
                custom: custom.clone(),
            }) as Arc<dyn ValueFormatter>,
        );
        entries.insert(
            "time".to_owned(),
            Arc::new(TimeFormatter { custom }) as Arc<dyn ValueFormatter>,
        );
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub(crate) fn register(
        &self,
        name: impl Into<String>,
        formatter: Arc<dyn ValueFormatter>,
    ) -> Result<(), MessageFormatError> {
        let name = name.into();
        if RESERVED.contains(&name.as_str()) {
            return Err(MessageFormatError::FormatterFailure {
                name,
                message: "branching formatter types cannot be replaced".to_owned(),
            });
        }
        self.entries
            .write()
            .expect("formatter registry lock poisoned")
            .insert(name, formatter);
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<dyn ValueFormatter>> {
        self.entries
            .read()
            .expect("formatter registry lock poisoned")
            .get(name)
            .cloned()
    }
}

struct NumberFormatter {
    custom: Option<Arc<dyn CustomValueFormatter>>,
}

impl ValueFormatter for NumberFormatter {
    fn format(
        &self,
        name: &str,
        value: &ParamValue,
        style: Option<&str>,
        locale: &Locale,
    ) -> Result<String, MessageFormatError> {
        let n = value
            .as_decimal()
            .ok_or_else(|| crate::value::type_mismatch(name, "a real number"))?;
        if let Some(custom) = &self.custom {
            if let Some(result) = custom.format_number(n, style, locale) {
                return result;
            }
        }
        locale_format::format_number(n, style, locale)
    }
}

struct DateFormatter {
    custom: Option<Arc<dyn CustomValueFormatter>>,
}

impl ValueFormatter for DateFormatter {
    fn format(
        &self,
        name: &str,
        value: &ParamValue,
        style: Option<&str>,
        locale: &Locale,
    ) -> Result<String, MessageFormatError> {
        let millis = value
            .as_instant_millis()
            .ok_or_else(|| crate::value::type_mismatch(name, "an absolute instant"))?;
        if let Some(custom) = &self.custom {
            if let Some(result) = custom.format_date(millis, style, locale) {
                return result;
            }
        }
        locale_format::format_date(millis, style, locale)
    }
}

struct TimeFormatter {
    custom: Option<Arc<dyn CustomValueFormatter>>,
}

impl ValueFormatter for TimeFormatter {
    fn format(
        &self,
        name: &str,
        value: &ParamValue,
        style: Option<&str>,
        locale: &Locale,
    ) -> Result<String, MessageFormatError> {
        let millis = value
            .as_instant_millis()
            .ok_or_else(|| crate::value::type_mismatch(name, "an absolute instant"))?;
        if let Some(custom) = &self.custom {
            if let Some(result) = custom.format_time(millis, style, locale) {
                return result;
            }
        }
        locale_format::format_time(millis, style, locale)
    }
}

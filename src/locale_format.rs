//! The locale value formatter (spec §4.B) — "an injected capability", per
//! spec §1: the built-in implementation here is a reasonable default for
//! numbers (via `icu_decimal`, exactly the teacher's own approach) and a
//! deliberately minimal one for dates/times, since precise locale-correct
//! calendar rendering is explicitly out of scope (spec §9, Open Question b).
//! A real deployment installs `custom_value_formatter` for anything beyond
//! the default.

use std::sync::OnceLock;

use icu::locid::Locale;
use icu_calendar::{Date, Iso};
use icu_decimal::FixedDecimalFormatter;

use crate::error::MessageFormatError;

/// Intercepts `number`/`date`/`time` before the built-in path runs.
/// Returning `None` falls through to the default formatter; returning
/// `Some(_)` (success or failure) is authoritative (spec §4.B).
pub trait CustomValueFormatter: Send + Sync {
    fn format_number(
        &self,
        _value: f64,
        _style: Option<&str>,
        _locale: &Locale,
    ) -> Option<Result<String, MessageFormatError>> {
        None
    }

    fn format_date(
        &self,
        _millis: i64,
        _style: Option<&str>,
        _locale: &Locale,
    ) -> Option<Result<String, MessageFormatError>> {
        None
    }

    fn format_time(
        &self,
        _millis: i64,
        _style: Option<&str>,
        _locale: &Locale,
    ) -> Option<Result<String, MessageFormatError>> {
        None
    }
}

pub(crate) fn format_number(
    value: f64,
    style: Option<&str>,
    locale: &Locale,
) -> Result<String, MessageFormatError> {
    match style {
        None => decimal(value, locale),
        Some("integer") => decimal(value.trunc(), locale),
        Some("percent") => Ok(format!("{}%", decimal(value * 100.0, locale)?)),
        Some("currency") => Ok(format!("{}{}", currency_symbol(locale), decimal(value, locale)?)),
        Some(raw) => {
            log::debug!("unrecognized number style `{raw}`, passing through as a raw pattern");
            decimal(value, locale)
        }
    }
}

pub(crate) fn format_date(
    millis: i64,
    style: Option<&str>,
    locale: &Locale,
) -> Result<String, MessageFormatError> {
    let (year, month, day, ..) = decompose(millis)?;
    let date = Date::try_new_iso(year, month, day).map_err(|e| MessageFormatError::FormatterFailure {
        name: "date".to_owned(),
        message: e.to_string(),
    })?;
    let _ = locale; // locale-correct month/weekday names require a custom_value_formatter
    Ok(match style {
        Some("full") => format!(
            "{}, {} {day}, {year}",
            weekday_name(&date),
            month_name(month)
        ),
        Some("short") => format!("{month}/{day}/{:02}", year.rem_euclid(100)),
        _ => format!("{year:04}-{month:02}-{day:02}"),
    })
}

pub(crate) fn format_time(
    millis: i64,
    style: Option<&str>,
    locale: &Locale,
) -> Result<String, MessageFormatError> {
    let (_, _, _, hour, minute, second) = decompose(millis)?;
    let _ = locale;
    Ok(match style {
        Some("short") => format!("{hour:02}:{minute:02}"),
        _ => format!("{hour:02}:{minute:02}:{second:02}"),
    })
}

fn decimal(value: f64, locale: &Locale) -> Result<String, MessageFormatError> {
    let fdf = FixedDecimalFormatter::try_new(&locale.into(), Default::default()).map_err(|e| {
        MessageFormatError::FormatterFailure {
            name: "number".to_owned(),
            message: e.to_string(),
        }
    })?;
    let fixed = value.to_string().parse().map_err(|_| MessageFormatError::FormatterFailure {
        name: "number".to_owned(),
        message: format!("`{value}` is not a representable decimal"),
    })?;
    Ok(fdf.format_to_string(&fixed))
}

fn currency_symbol(locale: &Locale) -> &'static str {
    static TABLE: OnceLock<std::collections::HashMap<&'static str, &'static str>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        [
            ("en", "$"),
            ("de", "€"),
            ("fr", "€"),
            ("es", "€"),
            ("it", "€"),
            ("ja", "¥"),
            ("zh", "¥"),
            ("ko", "₩"),
            ("ru", "₽"),
        ]
        .into_iter()
        .collect()
    });
    let tag = locale.to_string();
    let primary = tag.split('-').next().unwrap_or(&tag);
    table.get(primary).copied().unwrap_or("$")
}

fn decompose(millis: i64) -> Result<(i32, u8, u8, u32, u32, u32), MessageFormatError> {
    let days = millis.div_euclid(86_400_000);
    let ms_of_day = millis.rem_euclid(86_400_000);
    let hour = (ms_of_day / 3_600_000) as u32;
    let minute = ((ms_of_day % 3_600_000) / 60_000) as u32;
    let second = ((ms_of_day % 60_000) / 1_000) as u32;
    let (year, month, day) = civil_from_days(days);
    Ok((year, month, day, hour, minute, second))
}

/// Howard Hinnant's `civil_from_days`: days-since-epoch to a proleptic
/// Gregorian (year, month, day), used instead of hand-rolling calendar
/// arithmetic so `Date::try_new_iso` below still validates the result.
fn civil_from_days(z: i64) -> (i32, u8, u8) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let y = if m <= 2 { y + 1 } else { y };
    (y as i32, m, d)
}

fn weekday_name(date: &Date<Iso>) -> &'static str {
    use icu_calendar::types::IsoWeekday;
    match date.day_of_week() {
        IsoWeekday::Monday => "Monday",
        IsoWeekday::Tuesday => "Tuesday",
        IsoWeekday::Wednesday => "Wednesday",
        IsoWeekday::Thursday => "Thursday",
        IsoWeekday::Friday => "Friday",
        IsoWeekday::Saturday => "Saturday",
        IsoWeekday::Sunday => "Sunday",
    }
}

fn month_name(month: u8) -> &'static str {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    NAMES.get(month.saturating_sub(1) as usize).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locale(tag: &str) -> Locale {
        tag.parse().unwrap()
    }

    #[test]
    fn percent_style_appends_symbol() {
        let out = format_number(0.5, Some("percent"), &locale("en")).unwrap();
        assert!(out.ends_with('%'));
    }

    #[test]
    fn date_default_style_does_not_throw() {
        // 2024-03-05T00:00:00Z
        let millis: i64 = 1_709_596_800_000;
        assert!(format_date(millis, None, &locale("en")).is_ok());
        assert!(format_date(millis, Some("full"), &locale("en")).is_ok());
        assert!(format_date(millis, Some("short"), &locale("en")).is_ok());
    }

    #[test]
    fn time_default_style_does_not_throw() {
        let millis: i64 = 1_709_596_800_000 + 3_661_000;
        assert!(format_time(millis, None, &locale("en")).is_ok());
        assert!(format_time(millis, Some("short"), &locale("en")).is_ok());
    }
}

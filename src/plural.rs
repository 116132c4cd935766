//! Locale plural-rule tables (spec §4.A), generalizing the teacher's
//! `plural_rules_select`/`ordinal_rules_select` free functions in
//! `format.rs` into a component that also honors user-registered
//! pluralizers (spec §4.G/§6) and falls back to `other` for unknown
//! locales instead of panicking.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use icu::locid::Locale;
use icu::plurals::{PluralCategory, PluralRuleType, PluralRules};

/// A caller-supplied rule: maps a number to a keyword. For both `plural` and
/// `selectordinal` branches the evaluator calls this with the original,
/// un-offset argument value — offset only ever affects the `#` substitution,
/// never keyword selection (spec §9 Open Question (a) / testable property 4).
pub type PluralizerFn = Arc<dyn Fn(f64) -> String + Send + Sync>;

/// Wraps the CLDR plural-rule tables `icu::plurals` bakes in, plus an
/// override registry keyed by exact locale tag (spec §4.G: "a mutable
/// mapping from locale tag to pluralizer function").
#[derive(Default)]
pub(crate) struct PluralEngine {
    overrides: RwLock<HashMap<String, PluralizerFn>>,
}

impl PluralEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, locale_tag: &str, f: PluralizerFn) {
        self.overrides
            .write()
            .expect("plural override registry lock poisoned")
            .insert(locale_tag.to_owned(), f);
    }

    pub(crate) fn cardinal(&self, locale: &Locale, n: f64) -> String {
        if let Some(keyword) = self.overridden(locale, n) {
            return keyword;
        }
        cldr_category(locale, n, PluralRuleType::Cardinal)
    }

    pub(crate) fn ordinal(&self, locale: &Locale, n: f64) -> String {
        if let Some(keyword) = self.overridden(locale, n) {
            return keyword;
        }
        cldr_category(locale, n, PluralRuleType::Ordinal)
    }

    fn overridden(&self, locale: &Locale, n: f64) -> Option<String> {
        let tag = locale.to_string();
        let overrides = self.overrides.read().expect("plural override registry lock poisoned");
        overrides.get(&tag).map(|f| f(n))
    }
}

/// Exact tag, then primary subtag (`pt-BR` -> `pt`), then `other` for every
/// value (spec §4.A failure mode).
fn cldr_category(locale: &Locale, n: f64, rule_type: PluralRuleType) -> String {
    if let Some(rules) = try_rules(locale, rule_type) {
        return category_keyword(rules.category_for(operands(n)));
    }

    let tag = locale.to_string();
    if let Some(primary) = tag.split('-').next() {
        if primary != tag {
            if let Ok(primary_locale) = primary.parse::<Locale>() {
                if let Some(rules) = try_rules(&primary_locale, rule_type) {
                    return category_keyword(rules.category_for(operands(n)));
                }
            }
        }
    }

    log::warn!("no plural rules for locale `{tag}`, falling back to `other`");
    "other".to_owned()
}

fn try_rules(locale: &Locale, rule_type: PluralRuleType) -> Option<PluralRules> {
    PluralRules::try_new(&locale.into(), rule_type).ok()
}

/// CLDR operands (`n, i, v, w, f, t`) are derived the same way the teacher's
/// `format.rs` did it: format the number to a decimal string and parse that
/// string into `PluralOperands`, which reads off the visible fraction
/// digits an `f64` alone can't carry.
fn operands(n: f64) -> icu::plurals::PluralOperands {
    n.abs().to_string().parse().unwrap_or_default()
}

fn category_keyword(category: PluralCategory) -> String {
    match category {
        PluralCategory::Zero => "zero",
        PluralCategory::One => "one",
        PluralCategory::Two => "two",
        PluralCategory::Few => "few",
        PluralCategory::Many => "many",
        PluralCategory::Other => "other",
    }
    .to_owned()
}

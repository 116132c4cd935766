//! An implementation of the ICU MessageFormat pattern language: given a
//! template and a bag of named arguments, renders a string with variable
//! placeholders, `select`/`plural`/`selectordinal` branches, and typed value
//! formatters (`number`/`date`/`time`) resolved against the arguments and a
//! locale.
//!
//! The facade is [`MessageFormat`]; everything else in this crate exists to
//! support it:
//!
//! - [`pattern`] — the hand-written recursive-descent parser and the
//!   pattern tree it produces.
//! - [`eval`] — the evaluator that walks a pattern tree against arguments.
//! - [`plural`] — CLDR-derived plural-rule selection, with a
//!   caller-registrable override per locale.
//! - [`locale_format`] — the injected number/date/time formatting capability.
//! - [`registry`] — the `number`/`date`/`time` (and user-defined) formatter
//!   registry.
//! - [`cache`] — the opt-in parsed-pattern cache.
//! - [`value`] — the dynamically-typed argument values and argument map.
//! - [`error`] — the error type surfaced at the public API.

mod cache;
mod error;
mod eval;
mod locale_format;
mod pattern;
mod plural;
mod registry;
mod value;

use std::sync::Arc;

use icu::locid::Locale;

pub use error::MessageFormatError;
pub use locale_format::CustomValueFormatter;
pub use registry::ValueFormatter;
pub use value::{arg, Args, ArgsBuilder, ParamValue};

use cache::PatternCache;
use eval::Evaluator;
use plural::{PluralEngine, PluralizerFn};
use registry::FormatterRegistry;

/// Construction options for [`MessageFormat`] (spec §4.G/§6).
pub struct MessageFormatOptions {
    /// Whether parsed pattern trees are memoized for the lifetime of the
    /// facade (spec §4.F).
    pub use_cache: bool,
    /// The default locale tag (BCP-47, e.g. `"en"`, `"pt-BR"`) used when a
    /// call doesn't specify one via [`MessageFormat::format_with_locale`].
    pub locale: String,
    /// Intercepts `number`/`date`/`time` before the built-in locale
    /// formatter runs (spec §4.B).
    pub custom_value_formatter: Option<Arc<dyn CustomValueFormatter>>,
}

impl Default for MessageFormatOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            locale: "en".to_owned(),
            custom_value_formatter: None,
        }
    }
}

/// Binds the parser, evaluator, plural engine, formatter registry, and
/// pattern cache together (spec §4.G). Safe to share across threads and to
/// call concurrently: parsed trees are immutable, the cache synchronizes its
/// own insertions, and the registries use interior locking (spec §5).
pub struct MessageFormat {
    locale: Locale,
    cache: Option<PatternCache>,
    registry: FormatterRegistry,
    plural_engine: PluralEngine,
}

impl MessageFormat {
    pub fn new(options: MessageFormatOptions) -> Result<Self, MessageFormatError> {
        let locale =
            options
                .locale
                .parse::<Locale>()
                .map_err(|e| MessageFormatError::FormatterFailure {
                    name: "locale".to_owned(),
                    message: format!("invalid locale tag `{}`: {e}", options.locale),
                })?;
        Ok(Self {
            locale,
            cache: options.use_cache.then(PatternCache::new),
            registry: FormatterRegistry::new(options.custom_value_formatter),
            plural_engine: PluralEngine::new(),
        })
    }

    /// Formats `pattern` against `args` using the facade's default locale.
    pub fn format(&self, pattern: &str, args: &Args) -> Result<String, MessageFormatError> {
        self.format_with_locale(pattern, args, &self.locale)
    }

    /// Formats `pattern` against `args` using an explicit locale, overriding
    /// the facade's default for this call only. Useful for a server handling
    /// many locales through one cached facade instance.
    pub fn format_with_locale(
        &self,
        pattern: &str,
        args: &Args,
        locale: &Locale,
    ) -> Result<String, MessageFormatError> {
        log::trace!(
            "formatting pattern of {} bytes for locale {locale}",
            pattern.len()
        );
        let tree = match &self.cache {
            Some(cache) => cache.get_or_parse(pattern)?,
            None => Arc::new(pattern::parse(pattern)?),
        };
        Evaluator::new(locale, &self.registry, &self.plural_engine).eval(&tree, args)
    }

    /// Registers or replaces a `number`/`date`/`time`-style formatter under
    /// `name` (spec §4.D). Registering `select`, `plural`, or
    /// `selectordinal` is rejected to preserve the branching invariants.
    pub fn register_formatter(
        &self,
        name: impl Into<String>,
        formatter: Arc<dyn ValueFormatter>,
    ) -> Result<(), MessageFormatError> {
        self.registry.register(name, formatter)
    }

    /// Registers (or replaces) the pluralizer used for `locale_tag`,
    /// overriding the built-in CLDR table for both `plural` and
    /// `selectordinal` branches evaluated against that exact tag (spec
    /// §4.G/§6: "a mutable mapping from locale tag to pluralizer function").
    pub fn register_pluralizer(&self, locale_tag: &str, pluralizer: PluralizerFn) {
        self.plural_engine.register(locale_tag, pluralizer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mf() -> MessageFormat {
        MessageFormat::new(MessageFormatOptions::default()).unwrap()
    }

    #[test]
    fn greets_by_name() {
        let result = mf()
            .format("Hello, {name}!", &arg("name", "Jeff").build())
            .unwrap();
        assert_eq!(result, "Hello, Jeff!");
    }

    #[test]
    fn missing_argument_is_an_error() {
        let err = mf().format("Hello, {name}!", &Args::new()).unwrap_err();
        assert!(matches!(err, MessageFormatError::MissingArgument { .. }));
    }

    #[test]
    fn unknown_formatter_type_is_an_error() {
        let err = mf()
            .format("{x, frobnicate}", &arg("x", 1_i32).build())
            .unwrap_err();
        assert!(matches!(err, MessageFormatError::UnknownFormatter { .. }));
    }

    #[test]
    fn cache_and_no_cache_agree() {
        let cached = MessageFormat::new(MessageFormatOptions {
            use_cache: true,
            ..Default::default()
        })
        .unwrap();
        let uncached = MessageFormat::new(MessageFormatOptions {
            use_cache: false,
            ..Default::default()
        })
        .unwrap();
        let pattern = "{n, plural, one {one} other {# many}}";
        let args = arg("n", 7_i32).build();
        assert_eq!(
            cached.format(pattern, &args).unwrap(),
            uncached.format(pattern, &args).unwrap()
        );
    }
}

//! The evaluator (spec §4.E): walks a [`Pattern`] against an [`Args`] map, a
//! locale, the formatter registry, and the plural engine, writing the
//! rendered string.

use icu::locid::Locale;

use crate::error::MessageFormatError;
use crate::locale_format;
use crate::pattern::{BranchKey, BranchKind, Node, Pattern};
use crate::plural::PluralEngine;
use crate::registry::FormatterRegistry;
use crate::value::{Args, ParamValue};

pub(crate) struct Evaluator<'a> {
    locale: &'a Locale,
    registry: &'a FormatterRegistry,
    plural_engine: &'a PluralEngine,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(
        locale: &'a Locale,
        registry: &'a FormatterRegistry,
        plural_engine: &'a PluralEngine,
    ) -> Self {
        Self {
            locale,
            registry,
            plural_engine,
        }
    }

    pub(crate) fn eval(&self, pattern: &Pattern, args: &Args) -> Result<String, MessageFormatError> {
        let mut out = String::new();
        self.eval_pattern(pattern, args, None, &mut out)?;
        Ok(out)
    }

    fn eval_pattern(
        &self,
        pattern: &Pattern,
        args: &Args,
        pound: Option<f64>,
        out: &mut String,
    ) -> Result<(), MessageFormatError> {
        for node in &pattern.0 {
            self.eval_node(node, args, pound, out)?;
        }
        Ok(())
    }

    fn eval_node(
        &self,
        node: &Node,
        args: &Args,
        pound: Option<f64>,
        out: &mut String,
    ) -> Result<(), MessageFormatError> {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Variable(name) => {
                let value = lookup(args, name)?;
                out.push_str(&self.default_format(value)?);
            }
            Node::Formatted {
                name,
                type_name,
                style,
            } => {
                let value = lookup(args, name)?;
                let formatter = self.registry.get(type_name).ok_or_else(|| {
                    MessageFormatError::UnknownFormatter {
                        name: type_name.clone(),
                    }
                })?;
                out.push_str(&formatter.format(name, value, style.as_deref(), self.locale)?);
            }
            Node::Branching {
                name,
                kind,
                offset,
                branches,
            } => self.eval_branching(name, *kind, *offset, branches, args, out)?,
            Node::PluralHash => {
                let value = pound.expect(
                    "parser only emits PluralHash inside a plural/selectordinal branch body",
                );
                out.push_str(&locale_format::format_number(value, None, self.locale)?);
            }
        }
        Ok(())
    }

    fn eval_branching(
        &self,
        name: &str,
        kind: BranchKind,
        offset: u64,
        branches: &std::collections::HashMap<BranchKey, Pattern>,
        args: &Args,
        out: &mut String,
    ) -> Result<(), MessageFormatError> {
        let value = lookup(args, name)?;

        if kind == BranchKind::Select {
            let key = value
                .as_select_key()
                .ok_or_else(|| crate::value::type_mismatch(name, "a string key"))?;
            let branch = branches
                .get(&BranchKey::Keyword(key))
                .or_else(|| branches.get(&BranchKey::Keyword("other".to_owned())))
                .expect("parser guarantees an `other` branch");
            return self.eval_pattern(branch, args, None, out);
        }

        let n = value
            .as_decimal()
            .ok_or_else(|| crate::value::type_mismatch(name, "a real number"))?;

        // §4.E / §9 Open Question (a): exact `=N` matches the *original*
        // value, not the offset-adjusted one.
        if n.fract() == 0.0 && n.is_finite() {
            if let Some(branch) = branches.get(&BranchKey::Exact(n as i64)) {
                let diff = n - offset as f64;
                return self.eval_pattern(branch, args, Some(diff), out);
            }
        }

        // §4.E / testable property 4: the plural function is applied to the
        // *original* argument value, not the offset-adjusted one — only the
        // `#` substitution inside the chosen branch uses `n - offset`.
        let diff = n - offset as f64;
        let keyword = match kind {
            BranchKind::Plural => self.plural_engine.cardinal(self.locale, n),
            BranchKind::SelectOrdinal => self.plural_engine.ordinal(self.locale, n),
            BranchKind::Select => unreachable!("handled above"),
        };
        let branch = branches
            .get(&BranchKey::Keyword(keyword))
            .or_else(|| branches.get(&BranchKey::Keyword("other".to_owned())))
            .expect("parser guarantees an `other` branch");
        self.eval_pattern(branch, args, Some(diff), out)
    }

    fn default_format(&self, value: &ParamValue) -> Result<String, MessageFormatError> {
        if value.is_instant() {
            let millis = value
                .as_instant_millis()
                .expect("is_instant() implies as_instant_millis() is Some");
            return locale_format::format_date(millis, None, self.locale);
        }
        if let Some(n) = value.as_decimal() {
            return locale_format::format_number(n, None, self.locale);
        }
        Ok(value.to_string())
    }
}

fn lookup<'a>(args: &'a Args, name: &str) -> Result<&'a ParamValue, MessageFormatError> {
    args.get(name).ok_or_else(|| MessageFormatError::MissingArgument {
        name: name.to_owned(),
    })
}

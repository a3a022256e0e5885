//! Regex filtering and rewriting of individual fields.
//!
//! Rules are given on the command line as `-rN=<regex>` and `-wN=<template>`
//! for a 1-based field `N`. Both halves of a rule may appear anywhere among
//! the options; they are collected per field before normal option parsing
//! runs:
//!
//! ```text
//! csvgrep -r2=TOP data.csv                keep rows whose field 2 matches TOP
//! csvgrep -r1='^\d(.*)' -w1='$1' a.csv    strip a leading digit from field 1
//! ```
//!
//! Templates use `$N`/`${name}` for capture groups and `$0` for the whole
//! match.

use std::collections::HashMap;

use regex::Regex;
use tracing::trace;

use crate::error::{PipelineError, Result};
use crate::record::Record;
use crate::transform::RecordTransform;

/// Uncompiled rule text for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSpec {
    /// Regex to match; `None` behaves as the empty pattern.
    pub pattern: Option<String>,
    /// Rewrite template; `None` leaves the field alone.
    pub replacement: Option<String>,
}

/// Rules keyed by 0-based field index, iterated in first-mention order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    order: Vec<usize>,
    specs: HashMap<usize, RuleSpec>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The rule for `field`, created empty on first mention.
    pub fn entry(&mut self, field: usize) -> &mut RuleSpec {
        if !self.specs.contains_key(&field) {
            self.order.push(field);
        }
        self.specs.entry(field).or_default()
    }

    pub fn get(&self, field: usize) -> Option<&RuleSpec> {
        self.specs.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &RuleSpec)> {
        self.order
            .iter()
            .filter_map(|field| self.specs.get(field).map(|spec| (*field, spec)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Compile every pattern, keeping declaration order.
    pub fn compile(&self) -> Result<Vec<Rule>> {
        self.iter()
            .map(|(field, spec)| {
                let pattern = spec.pattern.as_deref().unwrap_or("");
                let regex = Regex::new(pattern).map_err(|source| PipelineError::InvalidPattern {
                    field: field + 1,
                    source,
                })?;
                Ok(Rule {
                    field,
                    regex,
                    replacement: spec.replacement.clone(),
                })
            })
            .collect()
    }
}

/// A compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    /// 0-based field index.
    pub field: usize,
    pub regex: Regex,
    pub replacement: Option<String>,
}

/// Pull `-rN=...`/`-wN=...` arguments out of a raw argument list.
///
/// Returns the rules and the remaining arguments (program name included) for
/// the regular option parser. Scanning stops at a bare `--`.
pub fn extract_rule_args<I>(args: I) -> Result<(RuleSet, Vec<String>)>
where
    I: IntoIterator<Item = String>,
{
    let mut rules = RuleSet::new();
    let mut rest = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--" {
            rest.push(arg);
            rest.extend(args.by_ref());
            break;
        }
        match rule_arg(&arg) {
            Some((kind, body)) => {
                let (field, value) = parse_rule_body(&arg, body)?;
                let spec = rules.entry(field);
                match kind {
                    RuleArg::Pattern => spec.pattern = Some(value.to_string()),
                    RuleArg::Replacement => spec.replacement = Some(value.to_string()),
                }
            }
            None => rest.push(arg),
        }
    }

    Ok((rules, rest))
}

enum RuleArg {
    Pattern,
    Replacement,
}

/// Recognise `-r<digit>...` and `-w<digit>...`.
fn rule_arg(arg: &str) -> Option<(RuleArg, &str)> {
    let (kind, body) = if let Some(body) = arg.strip_prefix("-r") {
        (RuleArg::Pattern, body)
    } else if let Some(body) = arg.strip_prefix("-w") {
        (RuleArg::Replacement, body)
    } else {
        return None;
    };
    body.starts_with(|c: char| c.is_ascii_digit())
        .then_some((kind, body))
}

/// Split `N=value` into a 0-based field index and the value.
fn parse_rule_body<'a>(arg: &str, body: &'a str) -> Result<(usize, &'a str)> {
    let invalid = || PipelineError::InvalidRuleArg {
        arg: arg.to_string(),
    };
    let (field, value) = body.split_once('=').ok_or_else(invalid)?;
    let field: usize = field.parse().map_err(|_| invalid())?;
    let field = field.checked_sub(1).ok_or_else(invalid)?;
    Ok((field, value))
}

/// Filters and rewrites records by per-field rules.
///
/// For each rule in order: with filtering on, a record whose field match
/// result equals `invert` is dropped; a rule with a template then rewrites
/// every match in its field. Header rows pass through untouched.
pub struct GrepTransform {
    rules: Vec<Rule>,
    filter: bool,
    invert: bool,
}

impl GrepTransform {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            filter: true,
            invert: false,
        }
    }

    /// With filtering off, rules only rewrite.
    #[must_use]
    pub fn with_filter(mut self, filter: bool) -> Self {
        self.filter = filter;
        self
    }

    /// Keep non-matching records instead of matching ones.
    #[must_use]
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }
}

impl RecordTransform for GrepTransform {
    fn transform(&mut self, mut record: Record, line: u64, is_header: bool) -> Result<Option<Record>> {
        if is_header || self.rules.is_empty() {
            return Ok(Some(record));
        }

        let len = record.len();
        for rule in &self.rules {
            let field = record
                .field_mut(rule.field)
                .ok_or_else(|| PipelineError::field_index(rule.field, len))?;

            if self.filter && rule.regex.is_match(field) == self.invert {
                trace!(line, field = rule.field + 1, "filtered");
                return Ok(None);
            }
            if let Some(template) = &rule.replacement {
                let rewritten = rule
                    .regex
                    .replace_all(field.as_str(), template.as_str())
                    .into_owned();
                *field = rewritten;
            }
        }
        Ok(Some(record))
    }

    fn name(&self) -> &str {
        "grep"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn grep(list: &[&str]) -> GrepTransform {
        let (rules, _) = extract_rule_args(args(list)).unwrap();
        GrepTransform::new(rules.compile().unwrap())
    }

    fn rec(fields: &[&str]) -> Record {
        Record::from_fields(fields.iter().copied())
    }

    #[test]
    fn test_extract_rules() {
        let (rules, rest) =
            extract_rule_args(args(&["csvgrep", "-r2=TOP", "-v", "-w2=$0!", "in.csv"])).unwrap();
        assert_eq!(rest, args(&["csvgrep", "-v", "in.csv"]));
        assert_eq!(rules.len(), 1);
        let spec = rules.get(1).unwrap();
        assert_eq!(spec.pattern.as_deref(), Some("TOP"));
        assert_eq!(spec.replacement.as_deref(), Some("$0!"));
    }

    #[test]
    fn test_extract_keeps_first_mention_order() {
        let (rules, _) =
            extract_rule_args(args(&["x", "-r3=a", "-r1=b", "-w3=c", "-r2=d"])).unwrap();
        let fields: Vec<usize> = rules.iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec![2, 0, 1]);
    }

    #[test]
    fn test_extract_value_may_contain_equals() {
        let (rules, _) = extract_rule_args(args(&["x", "-r1=a=b"])).unwrap();
        assert_eq!(rules.get(0).unwrap().pattern.as_deref(), Some("a=b"));
    }

    #[test]
    fn test_extract_stops_at_double_dash() {
        let (rules, rest) = extract_rule_args(args(&["x", "--", "-r1=a"])).unwrap();
        assert!(rules.is_empty());
        assert_eq!(rest, args(&["x", "--", "-r1=a"]));
    }

    #[test]
    fn test_extract_ignores_other_flags() {
        let (rules, rest) = extract_rule_args(args(&["x", "--reverse", "-rx"])).unwrap();
        assert!(rules.is_empty());
        assert_eq!(rest.len(), 3);
    }

    #[test]
    fn test_extract_rejects_malformed() {
        for bad in ["-r1", "-r0=a", "-w1x=a"] {
            let err = extract_rule_args(args(&["x", bad])).unwrap_err();
            assert_eq!(err.category(), ErrorCategory::Config, "{bad}");
        }
    }

    #[test]
    fn test_bad_regex() {
        let (rules, _) = extract_rule_args(args(&["x", "-r1=("])).unwrap();
        let err = rules.compile().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPattern { field: 1, .. }));
    }

    #[test]
    fn test_filter_keeps_matches() {
        let mut g = grep(&["x", "-r2=TOP"]);
        let top = rec(&["a", "TOP"]);
        assert_eq!(g.transform(top.clone(), 1, false).unwrap(), Some(top));
        assert_eq!(g.transform(rec(&["a", "BOTTOM"]), 2, false).unwrap(), None);
    }

    #[test]
    fn test_filter_inverted() {
        let mut g = grep(&["x", "-r2=TOP"]).with_invert(true);
        assert_eq!(g.transform(rec(&["a", "TOP"]), 1, false).unwrap(), None);
        assert!(g.transform(rec(&["a", "BOTTOM"]), 2, false).unwrap().is_some());
    }

    #[test]
    fn test_header_passes_verbatim() {
        let mut g = grep(&["x", "-r2=TOP", "-w2=X"]);
        let header = rec(&["h1", "h2"]);
        assert_eq!(g.transform(header.clone(), 0, true).unwrap(), Some(header));
        let short = rec(&["only"]);
        assert_eq!(g.transform(short.clone(), 0, true).unwrap(), Some(short));
    }

    #[test]
    fn test_rewrite_with_groups() {
        let mut g = grep(&["x", r"-r1=^\d(.*)", "-w1=$1"]);
        let out = g.transform(rec(&["7abc", "z"]), 1, false).unwrap();
        assert_eq!(out, Some(rec(&["abc", "z"])));
    }

    #[test]
    fn test_rewrite_only_keeps_non_matches() {
        let mut g = grep(&["x", "-r1=a", "-w1=[$0]"]).with_filter(false);
        assert_eq!(
            g.transform(rec(&["banana"]), 1, false).unwrap(),
            Some(rec(&["b[a]n[a]n[a]"]))
        );
        assert_eq!(g.transform(rec(&["xyz"]), 2, false).unwrap(), Some(rec(&["xyz"])));
    }

    #[test]
    fn test_replacement_without_pattern_matches_everything() {
        let mut g = grep(&["x", "-w1=<$0>"]);
        assert_eq!(g.transform(rec(&["v"]), 1, false).unwrap(), Some(rec(&["<>v<>"])));
    }

    #[test]
    fn test_rules_apply_in_order() {
        let mut g = grep(&["x", "-r1=a", "-w1=b", "-r2=z"]);
        assert_eq!(g.transform(rec(&["a", "q"]), 1, false).unwrap(), None);
        assert_eq!(
            g.transform(rec(&["a", "z"]), 2, false).unwrap(),
            Some(rec(&["b", "z"]))
        );
    }

    #[test]
    fn test_missing_field() {
        let mut g = grep(&["x", "-r3=a"]);
        let err = g.transform(rec(&["a", "b"]), 1, false).unwrap_err();
        assert_eq!(err.to_string(), "3: no such field in record of length 2");
    }
}

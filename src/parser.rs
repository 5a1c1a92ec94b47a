use std::collections::HashMap;

use crate::error::Error;
use crate::grammar;
use crate::model::{EnvironmentMap, ReferenceMode};
use crate::value::Value;

/// Upper bound on substitution passes over a single value. Reference
/// chains are cycle-checked by identifier; the depth cap additionally
/// stops pathological inputs where substituted text keeps composing new
/// references out of surrounding fragments.
const MAX_RESOLUTION_DEPTH: usize = 64;

/// Parse environment declarations from UTF-8 text, resolving
/// `${GROUP_NAME}` references.
pub fn parse_str(input: &str) -> Result<EnvironmentMap, Error> {
    parse_str_with_mode(input, ReferenceMode::Resolve)
}

/// Parse environment declarations with explicit reference handling.
///
/// `Preserve` keeps `${...}` syntax in values untouched; the mutation
/// path uses it so references survive a rewrite of the backing file.
pub fn parse_str_with_mode(input: &str, mode: ReferenceMode) -> Result<EnvironmentMap, Error> {
    let decoded = decode(input)?;
    match mode {
        ReferenceMode::Preserve => Ok(decoded),
        ReferenceMode::Resolve => resolve_references(decoded),
    }
}

/// Split into lines, validate each against the grammar, and build the
/// coerced map. Empty and whitespace-only lines contribute nothing; any
/// other non-matching line aborts the whole parse.
fn decode(input: &str) -> Result<EnvironmentMap, Error> {
    let mut map = EnvironmentMap::new();

    for line in input.lines().filter(|line| !line.trim().is_empty()) {
        let Some((identifier, raw_value)) = grammar::match_line(line) else {
            return Err(Error::Parsing {
                line: line.to_owned(),
                pattern: grammar::line_pattern(),
            });
        };

        let Some((group, name)) = grammar::split_identifier(identifier) else {
            return Err(Error::VariableParsing {
                identifier: identifier.to_owned(),
            });
        };

        // A duplicate identifier keeps its last occurrence.
        map.insert(group, name, Value::coerce(raw_value));
    }

    Ok(map)
}

/// Interpolation pass: expand every string value against a snapshot of
/// the fully-decoded map.
fn resolve_references(decoded: EnvironmentMap) -> Result<EnvironmentMap, Error> {
    let mut resolver = ReferenceResolver::new(&decoded);
    let mut resolved = EnvironmentMap::new();

    for (group, name, value) in decoded.iter() {
        let value = match value {
            Value::Str(raw) => resolver.expand(raw, &mut Vec::new())?,
            other => other.clone(),
        };
        resolved.insert(group, name, value);
    }

    Ok(resolved)
}

/// Resolves identifiers against the decoded, uninterpolated snapshot.
///
/// Results are memoized per identifier; the visit stack tracks the
/// active resolution chain so a revisited identifier raises
/// [`Error::CyclicReference`] instead of recursing forever.
struct ReferenceResolver<'a> {
    snapshot: &'a EnvironmentMap,
    resolved: HashMap<String, Value>,
}

impl<'a> ReferenceResolver<'a> {
    fn new(snapshot: &'a EnvironmentMap) -> Self {
        Self {
            snapshot,
            resolved: HashMap::new(),
        }
    }

    /// Substitute every `${GROUP_NAME}` occurrence in `raw`, re-scan the
    /// result for references the substitution may have formed, and
    /// coerce the final text.
    fn expand(&mut self, raw: &str, stack: &mut Vec<String>) -> Result<Value, Error> {
        let mut current = raw.to_owned();

        for _ in 0..MAX_RESOLUTION_DEPTH {
            let references: Vec<(String, String)> = grammar::references(&current)
                .map(|reference| (reference.token.to_owned(), reference.identifier.to_owned()))
                .collect();
            if references.is_empty() {
                return Ok(Value::coerce(&current));
            }

            for (token, identifier) in references {
                let substitute = self.resolve_identifier(&identifier, stack)?;
                current = current.replace(&token, &substitute.to_string());
            }
        }

        let identifier = grammar::references(&current)
            .next()
            .map(|reference| reference.identifier.to_owned())
            .unwrap_or_else(|| raw.to_owned());
        Err(Error::CyclicReference { identifier })
    }

    /// Fully expand one referenced identifier against the snapshot.
    fn resolve_identifier(
        &mut self,
        identifier: &str,
        stack: &mut Vec<String>,
    ) -> Result<Value, Error> {
        if let Some(done) = self.resolved.get(identifier) {
            return Ok(done.clone());
        }
        if stack.iter().any(|visited| visited == identifier) {
            return Err(Error::CyclicReference {
                identifier: identifier.to_owned(),
            });
        }

        let Some((group, name)) = grammar::split_identifier(identifier) else {
            return Err(Error::VariableParsing {
                identifier: identifier.to_owned(),
            });
        };
        let Some(value) = self.snapshot.get(group, name) else {
            return Err(Error::VariableNotFound {
                identifier: identifier.to_owned(),
            });
        };

        let value = match value {
            Value::Str(raw) => {
                let raw = raw.clone();
                stack.push(identifier.to_owned());
                let expanded = self.expand(&raw, stack)?;
                stack.pop();
                expanded
            }
            other => other.clone(),
        };

        self.resolved.insert(identifier.to_owned(), value.clone());
        Ok(value)
    }
}

use std::sync::LazyLock;

use regex::Regex;

/// Group segment of an identifier: one or more uppercase letters.
const GROUP_EXPRESSION: &str = "[A-Z]+";
/// Name segment of an identifier: uppercase letters, `-` and `.`.
const NAME_EXPRESSION: &str = r"[A-Z\-\.]+";

static LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&line_pattern()).expect("line pattern must compile"));

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&identifier_pattern()).expect("identifier pattern must compile"));

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\$\{{({GROUP_EXPRESSION}_{NAME_EXPRESSION})\}}"))
        .expect("reference pattern must compile")
});

/// Pattern a whole declaration line must match, carried in parse errors.
pub(crate) fn line_pattern() -> String {
    format!("^({GROUP_EXPRESSION}_{NAME_EXPRESSION})=(.*)$")
}

/// Pattern an identifier must match to split into group and name.
pub(crate) fn identifier_pattern() -> String {
    format!("^({GROUP_EXPRESSION})_({NAME_EXPRESSION})$")
}

/// Match one declaration line, yielding `(identifier, raw value)`.
///
/// This is the first of two validation stages; [`split_identifier`] is
/// the second. They are kept separate so line-level and identifier-level
/// failures stay distinct errors.
pub(crate) fn match_line(line: &str) -> Option<(&str, &str)> {
    let captures = LINE.captures(line)?;
    let identifier = captures.get(1)?.as_str();
    let value = captures.get(2)?.as_str();
    Some((identifier, value))
}

/// Split a bare identifier into `(group, name)`.
///
/// The group is the leading run of letters before the first underscore;
/// the name charset excludes `_`, so the split is unambiguous.
pub(crate) fn split_identifier(identifier: &str) -> Option<(&str, &str)> {
    let captures = IDENTIFIER.captures(identifier)?;
    let group = captures.get(1)?.as_str();
    let name = captures.get(2)?.as_str();
    Some((group, name))
}

/// A `${GROUP_NAME}` occurrence inside a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reference<'a> {
    /// The full `${GROUP_NAME}` token as it appears in the value.
    pub(crate) token: &'a str,
    /// The referenced identifier without the delimiters.
    pub(crate) identifier: &'a str,
}

/// Scan a value for `${GROUP_NAME}` references, left to right.
pub(crate) fn references(value: &str) -> impl Iterator<Item = Reference<'_>> {
    REFERENCE.captures_iter(value).filter_map(|captures| {
        let token = captures.get(0)?.as_str();
        let identifier = captures.get(1)?.as_str();
        Some(Reference { token, identifier })
    })
}

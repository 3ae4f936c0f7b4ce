//! Schematron context heuristics

use regex::Regex;
use std::sync::LazyLock;

/// Optional `prefix:` followed by an XML name or `*`
static CONTEXT_STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[A-Za-z_][\w.\-]*:)?(\*|[A-Za-z_][\w.\-]*)")
        .expect("context step pattern is a valid regex")
});

/// Recover the element name a Schematron rule context targets.
///
/// Best effort: the first name step of the context with any namespace prefix
/// stripped, or `*` for a wildcard step. Contexts built from axes, unions or
/// leading predicates are not evaluated as XPath and may yield a different
/// name than intended.
///
/// ```
/// use sne_model::context_element;
///
/// assert_eq!(context_element("tei:div[@type='chapter']"), Some("div"));
/// assert_eq!(context_element("tei:*[@subtype]"), Some("*"));
/// assert_eq!(context_element("///"), None);
/// ```
pub fn context_element(context: &str) -> Option<&str> {
    CONTEXT_STEP
        .captures(context)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

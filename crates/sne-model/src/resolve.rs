//! Cycle-guarded resolution of self-referential named graphs
//!
//! Groups, model classes, attribute classes and macros can refer to each
//! other (and to themselves) by name. Resolution walks those references with
//! an explicit visited set so a cycle contributes only what was already
//! discovered, never an infinite loop.

use std::collections::HashSet;
use tracing::{debug, trace};

/// One entry of a named definition: a concrete item or a reference to
/// another definition that must be expanded in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member<T> {
    Item(T),
    Ref(String),
}

/// Flatten the definition named `root` into its concrete items.
///
/// Items are returned in depth-first document order. Each definition is
/// expanded at most once per call, so a definition that reaches itself
/// (directly or transitively) adds nothing on the second visit. References
/// that `lookup` cannot resolve are dropped. Duplicates among the items are
/// left for the caller to remove.
pub fn flatten<'a, T, F>(root: &str, lookup: F) -> Vec<T>
where
    T: Clone + 'a,
    F: Fn(&str) -> Option<&'a [Member<T>]>,
{
    let mut visited = HashSet::new();
    visited.insert(root.to_string());

    let mut items = Vec::new();
    let mut to_visit: Vec<&'a Member<T>> = match lookup(root) {
        Some(members) => members.iter().rev().collect(),
        None => {
            debug!("Unresolved reference '{}'", root);
            return items;
        }
    };

    while let Some(member) = to_visit.pop() {
        match member {
            Member::Item(item) => items.push(item.clone()),
            Member::Ref(name) => {
                if !visited.insert(name.clone()) {
                    trace!("Skipping already expanded reference '{}' under '{}'", name, root);
                    continue;
                }
                match lookup(name) {
                    Some(members) => to_visit.extend(members.iter().rev()),
                    None => debug!("Unresolved reference '{}' under '{}'", name, root),
                }
            }
        }
    }

    items
}

/// The definitions currently being inlined, innermost last.
///
/// Unlike [`flatten`], a definition may be inlined again once its expansion
/// has finished; only re-entering a definition that is still open is refused.
#[derive(Debug, Default)]
pub struct ExpansionStack {
    active: Vec<String>,
}

impl ExpansionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `name` for expansion. Returns false (and opens nothing) when
    /// `name` is already being expanded.
    pub fn enter(&mut self, name: &str) -> bool {
        if self.is_active(name) {
            debug!("Cyclic expansion of '{}' via {:?}", name, self.active);
            return false;
        }
        self.active.push(name.to_string());
        true
    }

    /// Close the innermost expansion
    pub fn leave(&mut self) {
        self.active.pop();
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|n| n == name)
    }

    pub fn depth(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Members are whitespace separated; `@name` is a reference
    fn table(entries: &[(&str, &str)]) -> HashMap<String, Vec<Member<String>>> {
        entries
            .iter()
            .map(|(name, members)| {
                let members = members
                    .split_whitespace()
                    .map(|m| match m.strip_prefix('@') {
                        Some(reference) => Member::Ref(reference.to_string()),
                        None => Member::Item(m.to_string()),
                    })
                    .collect();
                ((*name).to_string(), members)
            })
            .collect()
    }

    fn resolve(table: &HashMap<String, Vec<Member<String>>>, root: &str) -> Vec<String> {
        flatten(root, |name| table.get(name).map(Vec::as_slice))
    }

    #[test]
    fn test_flatten_follows_nested_references_in_order() {
        let groups = table(&[
            ("model.inter", "list @model.phrase table"),
            ("model.phrase", "hi @model.emph"),
            ("model.emph", "emph"),
        ]);

        assert_eq!(
            resolve(&groups, "model.inter"),
            vec!["list", "hi", "emph", "table"]
        );
    }

    #[test]
    fn test_flatten_terminates_on_mutual_cycle() {
        let groups = table(&[("A", "@B"), ("B", "@A x")]);
        assert_eq!(resolve(&groups, "A"), vec!["x"]);
        assert_eq!(resolve(&groups, "B"), vec!["x"]);
    }

    #[test]
    fn test_flatten_terminates_on_self_reference() {
        let groups = table(&[("A", "a @A b")]);
        assert_eq!(resolve(&groups, "A"), vec!["a", "b"]);
    }

    #[test]
    fn test_flatten_drops_unresolved_references() {
        let groups = table(&[("A", "a @missing")]);
        assert_eq!(resolve(&groups, "A"), vec!["a"]);
        assert!(resolve(&groups, "missing").is_empty());
    }

    #[test]
    fn test_flatten_expands_shared_definition_once() {
        let groups = table(&[("A", "@B @C"), ("B", "@D"), ("C", "@D"), ("D", "d")]);
        assert_eq!(resolve(&groups, "A"), vec!["d"]);
    }

    #[test]
    fn test_expansion_stack_refuses_open_definition() {
        let mut stack = ExpansionStack::new();
        assert!(stack.enter("macro.a"));
        assert!(stack.enter("macro.b"));
        assert!(!stack.enter("macro.a"));
        assert_eq!(stack.depth(), 2);

        stack.leave();
        assert!(!stack.is_active("macro.b"));
        assert!(stack.enter("macro.b"));
    }
}

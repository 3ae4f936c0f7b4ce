//! Structural invariant checks

use crate::model::Schema;
use std::collections::BTreeSet;

impl Schema {
    /// Check the graph invariants, returning every violation found.
    ///
    /// - `elementNames` is the sorted key set of `elements`
    /// - each element is stored under its own name
    /// - `children` is exactly the name list of `childRefs`
    /// - for XSD/RelaxNG, `C ∈ P.children ⟺ P ∈ C.parents` over declared elements
    /// - for ODD/Schematron, `children` and `parents` are empty
    ///
    /// # Errors
    ///
    /// Returns the list of violation messages when any invariant fails.
    pub fn verify(&self) -> Result<(), Vec<String>> {
        let mut violations = Vec::new();

        let keys: Vec<&String> = self.elements.keys().collect();
        let names: Vec<&String> = self.element_names.iter().collect();
        if keys != names {
            violations.push("elementNames is not the sorted key set of elements".to_string());
        }

        for (key, element) in &self.elements {
            if *key != element.name {
                violations.push(format!("element '{}' is stored under '{key}'", element.name));
            }

            let ref_names: Vec<&str> = element.child_refs.iter().map(|r| r.name.as_str()).collect();
            let unique: BTreeSet<&str> = ref_names.iter().copied().collect();
            if unique.len() != ref_names.len() {
                violations.push(format!("'{key}' has duplicate child references"));
            }
            let children: BTreeSet<&str> = element.children.iter().map(String::as_str).collect();
            if children != unique || children.len() != element.children.len() {
                violations.push(format!("'{key}' children do not match its child references"));
            }

            if self.format.has_content_model() {
                for child in &element.children {
                    if let Some(target) = self.elements.get(child) {
                        if !target.parents.contains(key) {
                            violations.push(format!("'{child}' does not list parent '{key}'"));
                        }
                    }
                }
                for parent in &element.parents {
                    let listed = self
                        .elements
                        .get(parent)
                        .is_some_and(|p| p.children.contains(key));
                    if !listed {
                        violations.push(format!("parent '{parent}' does not list child '{key}'"));
                    }
                }
            } else if !element.children.is_empty() || !element.parents.is_empty() {
                violations.push(format!(
                    "'{key}' has a content model in a {} schema",
                    self.format.display_name()
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

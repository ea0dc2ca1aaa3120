//! `${Name}` expansion

use crate::store::PropertyStore;

/// Result of expanding `${Name}` references in a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Text after substitution; unresolved references are left as written
    pub text: String,
    /// Names referenced but not defined, in order of appearance
    pub missing: Vec<String>,
}

impl Expansion {
    /// Whether every reference was resolved
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Single left-to-right pass; substituted values are not scanned again
pub(crate) fn expand(store: &PropertyStore, input: &str) -> Expansion {
    let mut text = String::with_capacity(input.len());
    let mut missing = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        text.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(len) = after.find('}') else {
            // Unterminated reference, keep the remainder literally
            text.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let name = &after[..len];
        match store.get(name) {
            Some(value) => text.push_str(&value.to_string()),
            None => {
                text.push_str(&rest[start..start + 2 + len + 1]);
                missing.push(name.to_string());
            }
        }
        rest = &after[len + 1..];
    }
    text.push_str(rest);

    Expansion { text, missing }
}

/// Whether text contains a `${...}` reference
pub(crate) fn has_reference(input: &str) -> bool {
    input
        .find("${")
        .is_some_and(|start| input[start + 2..].contains('}'))
}

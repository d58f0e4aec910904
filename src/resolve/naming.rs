//! Synthesized names. The same nested shape reached through the same path
//! always maps to the same registry key.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::registry::OutputKind;

pub const SEPARATOR: &str = "__";

static SCHEMA_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").expect("valid name pattern")
});

/// `<owner>__<field>` plus `Input` for input-kind members.
pub fn member_type_name(owner: &str, field: &str, kind: OutputKind) -> String {
    format!("{owner}{SEPARATOR}{field}{}", kind.suffix())
}

/// Input record holding a field's arguments.
pub fn params_type_name(owner: &str, field: &str) -> String {
    format!("{owner}{SEPARATOR}{field}Input")
}

pub fn item_type_name(candidate: &str) -> String {
    format!("{candidate}Item")
}

pub fn is_valid_name(name: &str) -> bool {
    SCHEMA_NAME.is_match(name)
}

pub fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::InvalidName { name: name.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_the_owner_path() {
        assert_eq!(member_type_name("Query", "items", OutputKind::Object), "Query__items");
        assert_eq!(member_type_name("Mutation__addUser2Input", "details", OutputKind::Input), "Mutation__addUser2Input__detailsInput");
        assert_eq!(params_type_name("Mutation", "addUser"), "Mutation__addUserInput");
        assert_eq!(item_type_name("Query__items"), "Query__itemsItem");
    }

    #[test]
    fn validates_schema_names() {
        assert!(is_valid_name("Query__itemsItem"));
        assert!(is_valid_name("_private1"));
        assert!(!is_valid_name("1st"));
        assert!(!is_valid_name("my-field"));
        assert!(!is_valid_name("$ref"));
        assert!(!is_valid_name(""));
        assert!(matches!(check_name("a b"), Err(Error::InvalidName { name }) if name == "a b"));
    }
}

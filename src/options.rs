use crate::registry::DEFAULT_OPAQUE_SCALAR;

/// Marker property whose string-literal type names a custom scalar.
pub const DEFAULT_SCALAR_TAG: &str = "__gqly_type__";

pub const DEFAULT_ROOT_OPERATIONS: [&str; 3] = ["Query", "Mutation", "Subscription"];

#[derive(Debug, Clone)]
pub struct Options {
    /// Catch-all scalar for `any`, `void` and other unknown values.
    pub opaque_scalar: String,
    pub scalar_tag: String,
    /// Static members of the root class that become schema roots.
    pub root_operations: Vec<String>,
    /// Overrides the document's `root`.
    pub root: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            opaque_scalar: DEFAULT_OPAQUE_SCALAR.to_string(),
            scalar_tag: DEFAULT_SCALAR_TAG.to_string(),
            root_operations: DEFAULT_ROOT_OPERATIONS.iter().map(|s| s.to_string()).collect(),
            root: None,
        }
    }
}

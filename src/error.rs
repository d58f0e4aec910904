use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures. Any of these aborts the whole resolution run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("`{name}`: unions of more than one type are not supported ({})", branches.join(" | "))]
    UnsupportedUnion { name: String, branches: Vec<String> },

    #[error("cannot find a declaration named `{name}`")]
    MissingDeclaration { name: String },

    #[error("`{owner}.{field}`: parameter `{parameter}` {reason}")]
    MalformedParameter {
        owner: String,
        field: String,
        parameter: String,
        reason: &'static str,
    },

    #[error("`{name}` is not a valid schema name")]
    InvalidName { name: String },

    #[error("type alias `{name}` expands to itself")]
    CircularAlias { name: String },

    #[error("root `{name}` is not a class declaration")]
    InvalidRoot { name: String },

    #[error("malformed declaration graph at {path}: {source}")]
    MalformedGraph {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

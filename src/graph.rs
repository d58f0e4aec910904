//! Declaration graph handed over by the type-checking front end.
//!
//! Every node is already resolved: references point at declarations by name
//! and the resolver never looks at source syntax. The JSON form is internally
//! tagged by `kind` (see `Document`).
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// Resolved in order as published object types under the export name.
    #[serde(default)]
    pub exports: Vec<Export>,
    /// Class whose `Query`/`Mutation`/`Subscription` properties are roots.
    #[serde(default)]
    pub root: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Declaration {
    Class(ClassDecl),
    Alias(AliasDecl),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    /// Base types; only a single base is turned into an interface.
    #[serde(default)]
    pub extends: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeNode {
    Boolean,
    String,
    Number,
    Any,
    Void,
    Null,
    Undefined,
    Literal { value: serde_json::Value },
    Array { element: Box<TypeNode> },
    Union { types: Vec<TypeNode> },
    Intersection { types: Vec<TypeNode> },
    Reference {
        name: String,
        #[serde(default)]
        arguments: Vec<TypeNode>,
    },
    Class(ClassDecl),
    Object(ObjectLiteral),
    Function(Signature),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectLiteral {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub returns: Box<TypeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Member {
    Property(Property),
    Method(Method),
    Constructor {
        #[serde(default)]
        parameters: Vec<Parameter>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeNode>,
    #[serde(default)]
    pub initializer: Option<TypeNode>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub returns: TypeNode,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeNode>,
    #[serde(default)]
    pub pattern: Pattern,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pattern {
    #[default]
    Identifier,
    Object,
    Array,
    Rest,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(class) => &class.name,
            Declaration::Alias(alias) => &alias.name,
        }
    }
}

impl Parameter {
    /// Display name for diagnostics (`{..}`, `[..]` and `...` for patterns).
    pub fn label(&self) -> String {
        match (&self.name, self.pattern) {
            (Some(name), Pattern::Rest) => format!("...{name}"),
            (Some(name), _) => name.clone(),
            (None, Pattern::Object) => "{..}".to_string(),
            (None, Pattern::Array) => "[..]".to_string(),
            (None, Pattern::Rest) => "...".to_string(),
            (None, Pattern::Identifier) => "_".to_string(),
        }
    }
}

/// By-name index over a document's declarations.
#[derive(Debug)]
pub struct Graph<'d> {
    document: &'d Document,
    index: IndexMap<&'d str, &'d Declaration>,
}

impl<'d> Graph<'d> {
    pub fn new(document: &'d Document) -> Self {
        let mut index = IndexMap::with_capacity(document.declarations.len());
        for declaration in &document.declarations {
            let name = declaration.name();
            if index.contains_key(name) {
                warn!(name, "duplicate declaration; keeping the first one");
                continue;
            }
            index.insert(name, declaration);
        }
        Self { document, index }
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    pub fn declaration(&self, name: &str) -> Option<&'d Declaration> {
        self.index.get(name).copied()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

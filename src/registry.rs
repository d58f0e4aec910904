//! Ordered, deduplicated store of output schema types.
//!
//! Entries live in an append-only arena keyed by name. Insertion order is the
//! rendering order, and a type is inserted before its members are resolved, so
//! a second resolution of the same name (including a cyclic one) finds the
//! entry and stops.
use std::fmt::{self, Write};

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

pub const DEFAULT_OPAQUE_SCALAR: &str = "Any";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputKind {
    Object,
    Input,
}

/// Stable handle to a registry entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(usize);

/// Renderable reference to a type, e.g. `String!`, `[User]!`, `Any`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub label: String,
    pub nullable: bool,
    pub list: bool,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
    /// Input record whose fields are this field's arguments.
    pub parameters: Option<TypeId>,
}

#[derive(Debug, Clone)]
pub struct OutputType {
    pub name: String,
    pub kind: OutputKind,
    pub fields: Vec<Field>,
    pub base: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone)]
pub struct Registry {
    types: IndexMap<String, OutputType>,
    interfaces: IndexSet<String>,
    opaque: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl OutputKind {
    /// Suffix appended to synthesized names.
    pub fn suffix(self) -> &'static str {
        match self {
            OutputKind::Object => "",
            OutputKind::Input => "Input",
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            OutputKind::Object => "type",
            OutputKind::Input => "input",
        }
    }
}

impl TypeRef {
    pub fn named(label: impl Into<String>) -> Self {
        Self { label: label.into(), nullable: false, list: false }
    }

    pub fn opaque(label: impl Into<String>) -> Self {
        Self { label: label.into(), nullable: true, list: false }
    }

    /// Non-null list wrapping `item` with its own nullability.
    pub fn list_of(item: &TypeRef) -> Self {
        Self { label: format!("[{item}]"), nullable: false, list: true }
    }

    pub fn into_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)?;
        if !self.nullable {
            f.write_char('!')?;
        }
        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_OPAQUE_SCALAR)
    }
}

impl Registry {
    pub fn new(opaque: impl Into<String>) -> Self {
        Self {
            types: IndexMap::new(),
            interfaces: IndexSet::new(),
            opaque: opaque.into(),
        }
    }

    /// Name of the catch-all scalar.
    pub fn opaque(&self) -> &str {
        &self.opaque
    }

    /// Insert an empty entry unless `name` exists. The flag is `true` when an
    /// existing entry was returned; its kind and visibility are left as is.
    pub fn find_or_create(&mut self, name: &str, kind: OutputKind, published: bool) -> (TypeId, bool) {
        if let Some(index) = self.types.get_index_of(name) {
            return (TypeId(index), true);
        }
        debug!(name, kind = kind.keyword(), published, "registering type");
        let (index, _) = self.types.insert_full(name.to_string(), OutputType {
            name: name.to_string(),
            kind,
            fields: Vec::new(),
            base: None,
            published,
        });
        (TypeId(index), false)
    }

    pub fn find(&self, name: &str) -> Option<&OutputType> {
        self.types.get(name)
    }

    pub fn find_id(&self, name: &str) -> Option<TypeId> {
        self.types.get_index_of(name).map(TypeId)
    }

    pub fn get(&self, id: TypeId) -> &OutputType {
        &self.types[id.0]
    }

    pub(crate) fn push_field(&mut self, id: TypeId, field: Field) {
        self.types[id.0].fields.push(field);
    }

    pub(crate) fn set_base(&mut self, id: TypeId, base: &str) {
        self.types[id.0].base = Some(base.to_string());
    }

    pub fn mark_as_interface(&mut self, name: &str) {
        self.interfaces.insert(name.to_string());
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.interfaces.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Published entries in insertion order followed by the catch-all scalar.
    pub fn render(&self) -> String {
        let mut blocks: Vec<String> = self.iter()
            .filter(|ty| ty.published)
            .map(|ty| self.render_type(ty))
            .collect();
        blocks.push(format!("scalar {}", self.opaque));
        blocks.join("\n")
    }

    fn render_type(&self, ty: &OutputType) -> String {
        let interface = ty.kind == OutputKind::Object && self.is_interface(&ty.name);
        let keyword = if interface { "interface" } else { ty.kind.keyword() };
        let inherited = match (&ty.base, interface) {
            (Some(base), false) => self.find(base),
            _ => None,
        };

        let mut out = format!("{keyword} {}", ty.name);
        if let Some(base) = inherited {
            out.push_str(" implements ");
            out.push_str(&base.name);
        }
        out.push_str(" {\n");
        // inherited fields are repeated after the type's own
        let lines = ty.fields.iter()
            .chain(inherited.into_iter().flat_map(|base| base.fields.iter()))
            .map(|field| self.render_field(field))
            .collect::<Vec<_>>();
        out.push_str(&lines.join("\n"));
        out.push_str("\n}");
        out
    }

    fn render_field(&self, field: &Field) -> String {
        let mut out = format!("\t{}", field.name);
        let params = field.parameters.map(|id| self.get(id));
        if let Some(params) = params.filter(|params| !params.fields.is_empty()) {
            let args = params.fields.iter()
                .map(|param| format!("{}: {}", param.name, param.ty))
                .collect::<Vec<_>>();
            out.push('(');
            out.push_str(&args.join(", "));
            out.push(')');
        }
        out.push_str(&format!(": {}", field.ty));
        out
    }

    /// Debug view of every entry, published or not.
    pub fn emit_json(&self) -> Value {
        let types = self.iter().map(|ty| {
            let fields = ty.fields.iter().map(|field| {
                let mut o = json!({
                    "name": field.name,
                    "type": field.ty.to_string(),
                    "list": field.ty.list,
                });
                if let Some(params) = field.parameters.map(|id| self.get(id)) {
                    o["parametersType"] = Value::from(params.name.clone());
                    o["parameters"] = Value::Array(params.fields.iter().map(|param| json!({
                        "name": param.name,
                        "type": param.ty.to_string(),
                    })).collect());
                }
                o
            }).collect::<Vec<_>>();
            let mut o = json!({
                "name": ty.name,
                "kind": ty.kind,
                "published": ty.published,
                "interface": self.is_interface(&ty.name),
                "fields": fields,
            });
            if let Some(base) = &ty.base {
                o["base"] = Value::from(base.clone());
            }
            o
        }).collect::<Vec<_>>();
        json!({ "opaqueScalar": self.opaque, "types": types })
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

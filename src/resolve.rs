//! Type resolution over the declaration graph.
//!
//! One `resolve` call per field, parameter, array element and union branch.
//! Records (classes, aliased and anonymous object literals) are registered
//! before their members are visited; registry membership is the only cycle
//! guard.
pub mod naming;
pub mod params;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::graph::{ClassDecl, Declaration, Document, Graph, Member, Parameter, TypeNode};
use crate::options::Options;
use crate::registry::{Field, OutputKind, Registry, TypeId, TypeRef};

/// Type of a property with neither annotation nor initializer.
static IMPLICIT_ANY: TypeNode = TypeNode::Any;

/// References the resolver understands without a declaration.
fn is_builtin(name: &str) -> bool {
    matches!(name, "Promise" | "Array" | "ReadonlyArray")
}

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Intermediate result: the null marker survives until a union (or the
/// caller) decides what it means.
#[derive(Debug, Clone)]
enum Resolved {
    Null,
    Type(TypeRef),
}

pub struct Resolver<'g> {
    graph: Graph<'g>,
    registry: Registry,
    options: Options,
    /// Aliases currently being expanded outside of any record.
    expanding: Vec<&'g str>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Resolved {
    fn key(&self) -> Option<&str> {
        match self {
            Resolved::Null => None,
            Resolved::Type(ty) => Some(&ty.label),
        }
    }
}

impl<'g> Resolver<'g> {
    pub fn new(document: &'g Document, options: &Options) -> Self {
        Self {
            graph: Graph::new(document),
            registry: Registry::new(options.opaque_scalar.clone()),
            options: options.clone(),
            expanding: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn finish(self) -> Registry {
        self.registry
    }

    /// Resolve the document's exports, then its root class.
    pub fn resolve_document(&mut self) -> Result<()> {
        let document = self.graph.document();
        for export in &document.exports {
            if self.resolve(&export.name, &export.ty, OutputKind::Object, true)?.is_none() {
                debug!(export = %export.name, "export has no schema representation");
            }
        }
        let root = self.options.root.clone().or_else(|| document.root.clone());
        if let Some(root) = root {
            self.resolve_root(&root)?;
        }
        Ok(())
    }

    fn resolve_root(&mut self, root: &str) -> Result<()> {
        let declaration = self.graph.declaration(root)
            .ok_or_else(|| Error::MissingDeclaration { name: root.to_string() })?;
        let Declaration::Class(class) = declaration else {
            return Err(Error::InvalidRoot { name: root.to_string() });
        };
        // static or not: `Root.Query` and `new Root().Query` both name a root
        for member in &class.members {
            let Member::Property(property) = member else { continue };
            if !self.options.root_operations.contains(&property.name) {
                continue;
            }
            let node = property.initializer.as_ref()
                .or(property.ty.as_ref())
                .unwrap_or(&IMPLICIT_ANY);
            self.resolve(&property.name, node, OutputKind::Object, true)?;
        }
        Ok(())
    }

    /// `Ok(None)` means the node has no representation and the caller should
    /// omit whatever it was resolving.
    pub fn resolve(
        &mut self,
        name: &str,
        node: &'g TypeNode,
        kind: OutputKind,
        published: bool,
    ) -> Result<Option<TypeRef>> {
        let resolved = self.resolve_node(name, node, kind, published)?;
        Ok(resolved.map(|resolved| self.settle(resolved)))
    }

    fn settle(&self, resolved: Resolved) -> TypeRef {
        match resolved {
            Resolved::Null => self.opaque(),
            Resolved::Type(ty) => ty,
        }
    }

    fn opaque(&self) -> TypeRef {
        TypeRef::opaque(self.options.opaque_scalar.clone())
    }

    fn resolve_node(
        &mut self,
        name: &str,
        node: &'g TypeNode,
        kind: OutputKind,
        published: bool,
    ) -> Result<Option<Resolved>> {
        trace!(name, kind = kind.keyword(), "resolving");
        let resolved = match node {
            TypeNode::Boolean => Some(Resolved::Type(TypeRef::named("Boolean"))),
            TypeNode::String => Some(Resolved::Type(TypeRef::named("String"))),
            TypeNode::Number => Some(Resolved::Type(TypeRef::named("Float"))),
            TypeNode::Any => Some(Resolved::Type(self.opaque())),
            TypeNode::Void | TypeNode::Null | TypeNode::Undefined => Some(Resolved::Null),
            TypeNode::Literal { value } => match value {
                Value::Bool(_) => Some(Resolved::Type(TypeRef::named("Boolean"))),
                Value::Null => Some(Resolved::Null),
                other => {
                    debug!(name, literal = %other, "literal types are not supported");
                    None
                }
            },
            TypeNode::Array { element } => self.resolve_array(name, element, kind, published)?,
            TypeNode::Union { types } => self.resolve_union(name, types, kind, published)?,
            TypeNode::Intersection { types } => self.resolve_tagged(types)?,
            TypeNode::Reference { name: target, arguments } => {
                self.resolve_reference(name, target, arguments, kind, published)?
            }
            TypeNode::Class(class) => self.resolve_class(class, kind, published)?,
            TypeNode::Object(object) => {
                let type_name = object.alias.as_deref().unwrap_or(name);
                self.resolve_record(type_name, &object.members, None, kind, published)?
            }
            TypeNode::Function(signature) => self.resolve_node(name, &signature.returns, kind, published)?,
            TypeNode::Unsupported => {
                debug!(name, "unsupported type node");
                None
            }
        };
        Ok(resolved)
    }

    fn resolve_array(
        &mut self,
        name: &str,
        element: &'g TypeNode,
        kind: OutputKind,
        published: bool,
    ) -> Result<Option<Resolved>> {
        let item = self.resolve_node(&naming::item_type_name(name), element, kind, published)?;
        Ok(item.map(|item| Resolved::Type(TypeRef::list_of(&self.settle(item)))))
    }

    fn resolve_union(
        &mut self,
        name: &str,
        types: &'g [TypeNode],
        kind: OutputKind,
        published: bool,
    ) -> Result<Option<Resolved>> {
        let mut branches: Vec<Resolved> = Vec::with_capacity(types.len());
        let mut unresolved = false;
        for node in types {
            match self.resolve_node(name, node, kind, published)? {
                Some(branch) => {
                    if !branches.iter().any(|seen| seen.key() == branch.key()) {
                        branches.push(branch);
                    }
                }
                None => unresolved = true,
            }
        }
        if unresolved {
            debug!(name, "union has an unsupported branch");
            return Ok(None);
        }
        let opaque = &self.options.opaque_scalar;
        if branches.iter().any(|branch| branch.key() == Some(opaque.as_str())) {
            return Ok(Some(Resolved::Type(self.opaque())));
        }

        let had_null = branches.iter().any(|branch| matches!(branch, Resolved::Null));
        let mut real: Vec<TypeRef> = branches.into_iter()
            .filter_map(|branch| match branch {
                Resolved::Type(ty) => Some(ty),
                Resolved::Null => None,
            })
            .collect();
        match real.len() {
            0 => Ok(Some(Resolved::Null)),
            1 => {
                let ty = real.remove(0);
                Ok(Some(Resolved::Type(if had_null { ty.into_nullable() } else { ty })))
            }
            _ => Err(Error::UnsupportedUnion {
                name: name.to_string(),
                branches: real.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    /// `T & { __gqly_type__: "Name" }` names a scalar declared elsewhere.
    fn resolve_tagged(&self, types: &'g [TypeNode]) -> Result<Option<Resolved>> {
        for node in types {
            let Some(members) = self.object_members(node)? else { continue };
            let tag = members.iter().find_map(|member| match member {
                Member::Property(property) if property.name == self.options.scalar_tag => {
                    property.ty.as_ref().or(property.initializer.as_ref())
                }
                _ => None,
            });
            if let Some(TypeNode::Literal { value: Value::String(scalar) }) = tag {
                naming::check_name(scalar)?;
                return Ok(Some(Resolved::Type(TypeRef::named(scalar.clone()))));
            }
            break;
        }
        debug!("intersection without a scalar tag");
        Ok(None)
    }

    fn object_members(&self, node: &'g TypeNode) -> Result<Option<&'g [Member]>> {
        let members = match node {
            TypeNode::Object(object) => Some(object.members.as_slice()),
            TypeNode::Class(class) => Some(class.members.as_slice()),
            TypeNode::Reference { name, .. } if is_builtin(name) => None,
            TypeNode::Reference { name, .. } => {
                let declaration = self.graph.declaration(name)
                    .ok_or_else(|| Error::MissingDeclaration { name: name.clone() })?;
                match declaration {
                    Declaration::Class(class) => Some(class.members.as_slice()),
                    Declaration::Alias(alias) => match &alias.ty {
                        TypeNode::Object(object) => Some(object.members.as_slice()),
                        _ => None,
                    },
                }
            }
            _ => None,
        };
        Ok(members)
    }

    fn resolve_reference(
        &mut self,
        name: &str,
        target: &'g str,
        arguments: &'g [TypeNode],
        kind: OutputKind,
        published: bool,
    ) -> Result<Option<Resolved>> {
        match (target, arguments) {
            ("Promise", [inner, ..]) => return self.resolve_node(name, inner, kind, published),
            ("Promise", []) => return Ok(Some(Resolved::Type(self.opaque()))),
            ("Array" | "ReadonlyArray", [element]) => {
                return self.resolve_array(name, element, kind, published);
            }
            _ => {}
        }
        let declaration = self.graph.declaration(target)
            .ok_or_else(|| Error::MissingDeclaration { name: target.to_string() })?;
        self.resolve_declaration(declaration, kind, published)
    }

    fn resolve_declaration(
        &mut self,
        declaration: &'g Declaration,
        kind: OutputKind,
        published: bool,
    ) -> Result<Option<Resolved>> {
        match declaration {
            Declaration::Class(class) => self.resolve_class(class, kind, published),
            Declaration::Alias(alias) => match &alias.ty {
                TypeNode::Object(object) => {
                    self.resolve_record(&alias.name, &object.members, None, kind, published)
                }
                body => {
                    if self.expanding.contains(&alias.name.as_str()) {
                        return Err(Error::CircularAlias { name: alias.name.clone() });
                    }
                    // anonymous records inside the body are named after the alias
                    self.expanding.push(&alias.name);
                    let resolved = self.resolve_node(&alias.name, body, kind, published)?;
                    self.expanding.pop();
                    Ok(resolved)
                }
            },
        }
    }

    fn resolve_class(
        &mut self,
        class: &'g ClassDecl,
        kind: OutputKind,
        published: bool,
    ) -> Result<Option<Resolved>> {
        let base = match class.extends.as_slice() {
            [base] => Some(base.as_str()),
            _ => None,
        };
        self.resolve_record(&class.name, &class.members, base, kind, published)
    }

    fn resolve_record(
        &mut self,
        type_name: &str,
        members: &'g [Member],
        base: Option<&str>,
        kind: OutputKind,
        published: bool,
    ) -> Result<Option<Resolved>> {
        naming::check_name(type_name)?;
        let reference = Resolved::Type(TypeRef::named(type_name));
        let (id, existed) = self.registry.find_or_create(type_name, kind, published);
        if existed {
            return Ok(Some(reference));
        }
        // the base is only recorded; it renders wherever it is first reached
        if let Some(base) = base {
            if self.graph.declaration(base).is_none() {
                warn!(base, "base type is not part of the declaration graph");
            }
            self.registry.set_base(id, base);
            self.registry.mark_as_interface(base);
        }

        // a registered record ends any alias chain that led here
        let outer = std::mem::take(&mut self.expanding);
        self.resolve_members(id, type_name, members, kind)?;
        self.expanding = outer;
        Ok(Some(reference))
    }

    fn resolve_members(
        &mut self,
        id: TypeId,
        owner: &str,
        members: &'g [Member],
        kind: OutputKind,
    ) -> Result<()> {
        for member in members {
            if let Some(field) = self.resolve_member(owner, member, kind)? {
                self.registry.push_field(id, field);
            }
        }
        Ok(())
    }

    fn resolve_member(
        &mut self,
        owner: &str,
        member: &'g Member,
        kind: OutputKind,
    ) -> Result<Option<Field>> {
        let (field, node, parameters, optional): (&'g str, &'g TypeNode, Option<&'g [Parameter]>, bool) =
            match member {
                Member::Constructor { .. } => return Ok(None),
                Member::Property(property) if property.is_static => return Ok(None),
                Member::Method(method) if method.is_static => return Ok(None),
                Member::Property(property) => {
                    let value = property.initializer.as_ref()
                        .or(property.ty.as_ref())
                        .unwrap_or(&IMPLICIT_ANY);
                    // callable values contribute their call signature
                    match value {
                        TypeNode::Function(signature) => (
                            property.name.as_str(),
                            &*signature.returns,
                            Some(signature.parameters.as_slice()),
                            property.optional,
                        ),
                        node => (property.name.as_str(), node, None, property.optional),
                    }
                }
                Member::Method(method) => (
                    method.name.as_str(),
                    &method.returns,
                    Some(method.parameters.as_slice()),
                    false,
                ),
            };
        naming::check_name(field)?;

        let parameters = match (kind, parameters) {
            (OutputKind::Object, Some(parameters)) => self.materialize_params(owner, field, parameters)?,
            _ => None,
        };
        let member_name = naming::member_type_name(owner, field, kind);
        let Some(ty) = self.resolve(&member_name, node, kind, true)? else {
            debug!(owner, field, "omitting field with unsupported type");
            return Ok(None);
        };
        let ty = if optional { ty.into_nullable() } else { ty };
        Ok(Some(Field { name: field.to_string(), ty, parameters }))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

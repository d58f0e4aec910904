//! Field arguments from a call signature.
//!
//! Only one options object is supported: leading context placeholders are
//! skipped, the next parameter's type becomes an input record and that
//! record's fields become the field's arguments. Later parameters are ignored.
use tracing::debug;

use super::{naming, Resolver};
use crate::error::{Error, Result};
use crate::graph::{Declaration, Parameter, Pattern, TypeNode};
use crate::registry::{OutputKind, TypeId};

/// `this`, untyped and `any`-typed identifiers carry resolver context, not
/// arguments.
fn is_placeholder(param: &Parameter) -> bool {
    if param.pattern != Pattern::Identifier {
        return false;
    }
    match (param.name.as_deref(), &param.ty) {
        (Some("this"), _) => true,
        (_, None) | (_, Some(TypeNode::Any)) => true,
        _ => false,
    }
}

impl<'g> Resolver<'g> {
    pub(super) fn materialize_params(
        &mut self,
        owner: &str,
        field: &str,
        parameters: &'g [Parameter],
    ) -> Result<Option<TypeId>> {
        let Some(param) = parameters.iter().find(|param| !is_placeholder(param)) else {
            return Ok(None);
        };
        let malformed = |reason: &'static str| Error::MalformedParameter {
            owner: owner.to_string(),
            field: field.to_string(),
            parameter: param.label(),
            reason,
        };
        let ty = match (param.pattern, param.ty.as_ref()) {
            (Pattern::Rest, _) => {
                return Err(malformed("is a rest parameter; declare a single options object instead"));
            }
            (Pattern::Object, None) => {
                return Err(malformed("is destructured without a type annotation"));
            }
            (Pattern::Array, _) => {
                debug!(owner, field, "array-destructured parameter carries no arguments");
                return Ok(None);
            }
            (Pattern::Identifier, _) if param.name.is_none() => return Ok(None),
            (_, Some(ty)) => ty,
            (Pattern::Identifier, None) => return Ok(None),
        };

        if self.is_list_shaped(ty) {
            debug!(owner, field, "list-typed options parameter carries no arguments");
            return Ok(None);
        }

        let target = naming::params_type_name(owner, field);
        let Some(resolved) = self.resolve(&target, ty, OutputKind::Input, false)? else {
            debug!(owner, field, "parameter type has no schema representation");
            return Ok(None);
        };
        if resolved.list {
            return Ok(None);
        }
        Ok(self.registry.find_id(&resolved.label))
    }

    /// Whether `node` is an array, possibly behind aliases, promises or a
    /// nullable union. Lists never name an argument record.
    fn is_list_shaped(&self, node: &'g TypeNode) -> bool {
        let mut seen: Vec<&str> = Vec::new();
        let mut pending = vec![node];
        while let Some(node) = pending.pop() {
            match node {
                TypeNode::Array { .. } => return true,
                TypeNode::Reference { name, .. } if name == "Array" || name == "ReadonlyArray" => return true,
                TypeNode::Reference { name, arguments } if name == "Promise" => pending.extend(arguments.first()),
                TypeNode::Reference { name, .. } => {
                    if seen.contains(&name.as_str()) {
                        continue;
                    }
                    seen.push(name);
                    if let Some(Declaration::Alias(alias)) = self.graph.declaration(name) {
                        pending.push(&alias.ty);
                    }
                }
                TypeNode::Union { types } => pending.extend(types),
                _ => {}
            }
        }
        false
    }
}

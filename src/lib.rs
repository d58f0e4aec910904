//! Declaration graph → GraphQL SDL.
pub mod error;
pub mod graph;
pub mod options;
pub mod path_de;
pub mod registry;
pub mod resolve;

pub use error::{Error, Result};
pub use graph::Document;
pub use options::Options;
pub use registry::Registry;
pub use resolve::Resolver;

/// Resolve every export (and the root class, if any) into a fresh registry.
pub fn build_registry(document: &Document, options: &Options) -> Result<Registry> {
    let mut resolver = Resolver::new(document, options);
    resolver.resolve_document()?;
    Ok(resolver.finish())
}

pub fn transform(document: &Document, options: &Options) -> Result<String> {
    build_registry(document, options).map(|registry| registry.render())
}

/// Parse a JSON declaration graph and render it.
pub fn transform_str(src: &str, options: &Options) -> Result<String> {
    let document: Document = path_de::from_str_with_path(src)?;
    transform(&document, options)
}

//! Minimal CLI: declaration graph → (sdl | registry)
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gqly::options::{DEFAULT_ROOT_OPERATIONS, DEFAULT_SCALAR_TAG};
use gqly::registry::DEFAULT_OPAQUE_SCALAR;
use gqly::{Document, Options};
use rayon::prelude::*;
use tracing::info;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert JSON declaration graphs into a GraphQL schema
#[derive(Parser, Debug)]
#[command(name = "gqly", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// resolve and print the GraphQL SDL
    Sdl(ConvertOut),
    /// resolve and print every registered type (published or not) as JSON
    Registry(ConvertOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more declaration graph files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// class whose static root operations become schema roots (overrides the document's `root`)
    #[arg(long)]
    root: Option<String>,

    /// static member names of the root class treated as root operations
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_ROOT_OPERATIONS.map(String::from))]
    root_operations: Vec<String>,

    /// catch-all scalar for `any`, `void` and unknown values
    #[arg(long, default_value = DEFAULT_OPAQUE_SCALAR)]
    opaque_scalar: String,

    /// marker property naming a custom scalar in `T & { <tag>: "Name" }`
    #[arg(long, default_value = DEFAULT_SCALAR_TAG)]
    scalar_tag: String,
}

#[derive(clap::Parser, Debug)]
struct ConvertOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output file, or a directory when there are several inputs (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Sdl,
    Registry,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn options(&self) -> Options {
        Options {
            opaque_scalar: self.opaque_scalar.clone(),
            scalar_tag: self.scalar_tag.clone(),
            root_operations: self.root_operations.clone(),
            root: self.root.clone(),
        }
    }
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Sdl => "graphql",
            Format::Registry => "json",
        }
    }

    fn convert(self, source_path: &Path, options: &Options) -> Result<String> {
        let source = std::fs::read(source_path)
            .with_context(|| format!("failed to read {}", source_path.display()))?;
        let document: Document = gqly::path_de::from_slice_with_path(&source)
            .with_context(|| format!("failed to parse {}", source_path.display()))?;
        let registry = gqly::build_registry(&document, options)
            .with_context(|| format!("failed to convert {}", source_path.display()))?;
        info!(path = %source_path.display(), types = registry.len(), "resolved");
        match self {
            Format::Sdl => Ok(registry.render()),
            Format::Registry => Ok(serde_json::to_string_pretty(&registry.emit_json())?),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        let (format, target) = match &self.cmd {
            Command::Sdl(target) => (Format::Sdl, target),
            Command::Registry(target) => (Format::Registry, target),
        };
        // debug path
        if target.no_op {
            eprintln!("{self:#?}");
            return Ok(())
        }

        let options = target.input_settings.options();
        let source_paths = resolve_file_path_patterns(&target.input_settings.input)?;
        // one resolver per file; nothing is shared between them
        let outputs = source_paths
            .par_iter()
            .map(|source_path| format.convert(source_path, &options))
            .collect::<Result<Vec<_>>>()?;
        let outputs = source_paths.iter().zip(outputs).collect::<Vec<_>>();
        write_outputs(&outputs, format, target.out.as_deref())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_outputs(outputs: &[(&PathBuf, String)], format: Format, out: Option<&Path>) -> Result<()> {
    match (outputs, out) {
        ([(_, src)], Some(out)) => write_file(out, src),
        ([(_, src)], None) => {
            println!("{src}");
            Ok(())
        }
        (_, Some(out_dir)) => {
            std::fs::create_dir_all(out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            for (source_path, src) in outputs {
                let stem = source_path
                    .file_stem()
                    .with_context(|| format!("{} has no file name", source_path.display()))?;
                let file_name = format!("{}.{}", stem.to_string_lossy(), format.extension());
                write_file(&out_dir.join(file_name), src)?;
            }
            Ok(())
        }
        (_, None) => {
            for (source_path, src) in outputs {
                println!("# {}\n{src}", source_path.display());
            }
            Ok(())
        }
    }
}

fn write_file(out: &Path, src: &str) -> Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
    info!(path = %out.display(), "wrote");
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let before = out.len();
            for entry in glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))? {
                out.push(entry?);
            }
            if out.len() == before {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

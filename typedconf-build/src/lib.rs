//! Build-time generator for `typedconf`
//!
//! `typedconf-build` reads the sources of a crate, finds every trait marked
//! with `#[config_type]` and writes one struct implementing all of them to
//! `$OUT_DIR`. The runtime crate's `include_config!` pulls it back in.
//!
//! # Pipeline
//!
//! 1. **Discovery**: each source is parsed with `syn`; declarations, annotated
//!    elements and `enum` items are collected and their type paths resolved
//!    against the module's imports
//! 2. **Validation**: misplaced or clashing `#[config_value]` attributes are
//!    reported, each rule with one error naming every offender
//! 3. **Reduction**: every declaration is checked and turned into a partial
//!    spec; partial specs merge associatively into one
//! 4. **Emission**: the merged spec is rendered into the struct, its
//!    constructor and one trait impl per declaration
//!
//! All usage errors of a pass are reported together and nothing is written
//! when there is any.
//!
//! # Example
//!
//! ```rust,no_run
//! // build.rs
//! fn main() {
//!     match typedconf_build::Generator::new().source_dir("src").generate() {
//!         Ok(warnings) => warnings.report(),
//!         Err(diagnostics) => {
//!             diagnostics.report();
//!             std::process::exit(1);
//!         }
//!     }
//! }
//! ```
//!
//! Sources can also be given in memory, which is how the pipeline is tested:
//!
//! ```rust
//! let tokens = typedconf_build::Generator::new()
//!     .source_str(
//!         "crate::server",
//!         r#"
//!             #[config_type(context_path = "server")]
//!             pub trait ServerConfig {
//!                 #[config_value(path = "port")]
//!                 fn port(&self) -> i32;
//!             }
//!         "#,
//!     )
//!     .compile()
//!     .unwrap();
//! assert!(tokens.to_string().contains("ServerConfig for GlobalConfig"));
//! ```

mod attrs;
mod discover;
mod emit;
mod error;
mod extract;
mod mapper;
mod model;
mod names;
mod processor;
mod property;
mod reducer;
mod scope;
mod type_spec;

use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use proc_macro2::TokenStream;
use tracing::{debug, info, warn};

pub use attrs::{is_attr, TypeAttrs, TypeParam, ValueAttrs, CONFIG_TYPE, CONFIG_VALUE};
pub use discover::Discovered;
pub use emit::{render, synthesize, HEADER};
pub use error::{Diagnostic, DiagnosticError, Diagnostics, Error, UsageError};
pub use extract::{Capability, Extractor, TypeRef};
pub use mapper::{Mapper, ValueKind};
pub use model::{DeclMethod, Declaration, ValueElement};
pub use names::ItemPath;
pub use processor::Processor;
pub use property::PropertySpec;
pub use reducer::{accumulate, check_declaration, reduce, validate_values};
pub use scope::Scope;
pub use type_spec::TypeSpec;

const DEFAULT_STRUCT_NAME: &str = "GlobalConfig";
const DEFAULT_FILE_NAME: &str = "typedconf.rs";

#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Dir(PathBuf),
    Inline { module: ItemPath, code: String },
}

/// Runs the generation pass. Configure with the builder methods, then call
/// [`generate`](Generator::generate) from `build.rs`.
#[derive(Debug, Clone)]
pub struct Generator {
    sources: Vec<Source>,
    crate_root: PathBuf,
    struct_name: String,
    file_name: String,
    enums: Vec<ItemPath>,
    out_dir: Option<PathBuf>,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            crate_root: PathBuf::from("src"),
            struct_name: DEFAULT_STRUCT_NAME.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            enums: Vec::new(),
            out_dir: None,
        }
    }
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one source file.
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Source::File(path.into()));
        self
    }

    /// Add every `.rs` file under `dir`, recursively.
    pub fn source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sources.push(Source::Dir(dir.into()));
        self
    }

    /// Add source code held in memory as the contents of `module`
    /// (`"crate"`, `"crate::server"`, ...).
    pub fn source_str(mut self, module: &str, code: impl Into<String>) -> Self {
        self.sources.push(Source::Inline {
            module: ItemPath::parse(module),
            code: code.into(),
        });
        self
    }

    /// Directory that maps to `crate` when deriving module paths from file
    /// paths. Defaults to `src`.
    pub fn crate_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.crate_root = dir.into();
        self
    }

    /// Name of the generated struct. Defaults to `GlobalConfig`.
    pub fn struct_name(mut self, name: impl Into<String>) -> Self {
        self.struct_name = name.into();
        self
    }

    /// Name of the file written to the output directory. Defaults to
    /// `typedconf.rs`.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Treat `path` as an enum, for enums the sources do not declare.
    pub fn enum_type(mut self, path: &str) -> Self {
        self.enums.push(ItemPath::parse(path));
        self
    }

    /// Output directory. Defaults to `$OUT_DIR`.
    pub fn out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// Run the pass and return the generated items.
    pub fn compile(&self) -> Result<TokenStream, Diagnostics> {
        let files = self.files()?;
        self.compile_files(&files)
    }

    /// Run the pass and write the result to the output directory.
    ///
    /// Prints `cargo:rerun-if-changed` for every source file and source
    /// directory. A failure to write the file does not fail the pass; it
    /// comes back as a warning.
    pub fn generate(&self) -> Result<Diagnostics, Diagnostics> {
        let files = self.files()?;
        for path in self.watched(&files) {
            println!("cargo:rerun-if-changed={}", path.display());
        }

        let tokens = self.compile_files(&files)?;
        let out_dir = match &self.out_dir {
            Some(dir) => dir.clone(),
            None => std::env::var_os("OUT_DIR")
                .map(PathBuf::from)
                .ok_or(Error::MissingOutDir)?,
        };

        let mut diagnostics = Diagnostics::new();
        let target = out_dir.join(&self.file_name);
        match write(&target, &tokens) {
            Ok(()) => info!(path = %target.display(), "wrote generated config"),
            Err(error) => {
                warn!(error = %format!("{error:#}"), "could not write generated config");
                diagnostics.warn(format!("{error:#}"));
            }
        }
        Ok(diagnostics)
    }

    /// Paths cargo should watch: every source directory, so added files
    /// trigger a rebuild, followed by every file.
    fn watched<'a>(&'a self, files: &'a [PathBuf]) -> impl Iterator<Item = &'a Path> {
        let dirs = self.sources.iter().filter_map(|source| match source {
            Source::Dir(dir) => Some(dir.as_path()),
            _ => None,
        });
        dirs.chain(files.iter().map(PathBuf::as_path))
    }

    /// Every file source, directories expanded.
    fn files(&self) -> Result<Vec<PathBuf>, Diagnostics> {
        let mut files = Vec::new();
        for source in &self.sources {
            match source {
                Source::File(path) => files.push(path.clone()),
                Source::Dir(dir) => collect_rs_files(dir, &mut files)?,
                Source::Inline { .. } => {}
            }
        }
        Ok(files)
    }

    fn compile_files(&self, files: &[PathBuf]) -> Result<TokenStream, Diagnostics> {
        let mut discovered = Discovered::default();
        let mut failures = Diagnostics::new();

        for path in files {
            match self.scan_file(path) {
                Ok(found) => discovered.extend(found),
                Err(error) => failures.push(Diagnostic::Error(DiagnosticError::Source(error))),
            }
        }
        for source in &self.sources {
            if let Source::Inline { module, code } = source {
                match scan(module.to_string(), code, module.clone()) {
                    Ok(found) => discovered.extend(found),
                    Err(error) => failures.push(Diagnostic::Error(DiagnosticError::Source(error))),
                }
            }
        }
        if failures.has_errors() {
            return Err(failures);
        }

        let mut processor = Processor::new();
        processor.add_enums(self.enums.iter().cloned());
        let spec = processor.process(discovered)?.unwrap_or_default();
        Ok(synthesize(&spec, &self.struct_name))
    }

    fn scan_file(&self, path: &Path) -> Result<Discovered, Error> {
        let code = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        scan(path.display().to_string(), &code, module_of(&self.crate_root, path))
    }
}

fn scan(origin: String, code: &str, module: ItemPath) -> Result<Discovered, Error> {
    let file = syn::parse_file(code).map_err(|source| Error::Syntax { origin: origin.clone(), source })?;
    let mut discovered = Discovered::default();
    discovered.scan(&file, module);
    debug!(
        source = %origin,
        declarations = discovered.declarations.len(),
        values = discovered.values.len(),
        "scanned source"
    );
    Ok(discovered)
}

fn write(target: &Path, tokens: &TokenStream) -> anyhow::Result<()> {
    std::fs::write(target, render(tokens))
        .with_context(|| format!("failed to write generated config to '{}'", target.display()))
}

fn collect_rs_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), Error> {
    let io = |source: std::io::Error| Error::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = std::fs::read_dir(dir)
        .map_err(io)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io)?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_rs_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    Ok(())
}

/// Module path of a source file: `lib.rs` and `main.rs` at the root are the
/// crate itself, `a/mod.rs` is `crate::a`, `a/b.rs` is `crate::a::b`.
/// Files outside `crate_root` are treated as if they sat directly in it.
fn module_of(crate_root: &Path, file: &Path) -> ItemPath {
    let relative = file
        .strip_prefix(crate_root)
        .ok()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| file.file_name().map(PathBuf::from).unwrap_or_default());

    let mut module = ItemPath::crate_root();
    let mut components: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let Some(file_name) = components.pop() else {
        return module;
    };
    for dir in components {
        module = module.child(dir);
    }

    let stem = file_name.strip_suffix(".rs").unwrap_or(&file_name);
    let is_root = module == ItemPath::crate_root() && (stem == "lib" || stem == "main");
    if stem != "mod" && !is_root {
        module = module.child(stem);
    }
    module
}

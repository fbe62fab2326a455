//! Usage errors, pass failures and build-script diagnostics.

use std::fmt;
use std::path::PathBuf;

use proc_macro2::Span;

use crate::names::ItemPath;

/// Misuse of `#[config_type]` / `#[config_value]` attributable to one or
/// more source elements.
///
/// Renders as `Wrong annotation usage in '<names>'. <message>` where
/// `<names>` are the absolute names of the offending elements.
#[derive(Debug, Clone)]
pub struct UsageError {
    names: Vec<ItemPath>,
    message: String,
    spans: Vec<Span>,
}

impl UsageError {
    pub fn new(name: &ItemPath, span: Span, message: impl Into<String>) -> Self {
        Self {
            names: vec![name.clone()],
            message: message.into(),
            spans: vec![span],
        }
    }

    /// An error naming several elements at once.
    pub fn many<'a>(
        elements: impl IntoIterator<Item = (&'a ItemPath, Span)>,
        message: impl Into<String>,
    ) -> Self {
        let (names, spans) = elements
            .into_iter()
            .map(|(name, span)| (name.clone(), span))
            .unzip();
        Self {
            names,
            message: message.into(),
            spans,
        }
    }

    /// Wrap an attribute parse failure.
    pub fn from_syn(name: &ItemPath, error: &syn::Error) -> Self {
        Self::new(name, error.span(), error.to_string())
    }

    pub fn names(&self) -> &[ItemPath] {
        &self.names
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Convert into a `syn::Error` pointing at every offending span, for
    /// reporting from the attribute macros.
    pub fn to_syn_error(&self) -> syn::Error {
        let text = self.to_string();
        let mut spans = self.spans.iter();
        let first = spans.next().copied().unwrap_or_else(Span::call_site);
        let mut error = syn::Error::new(first, &text);
        for span in spans {
            error.combine(syn::Error::new(*span, &text));
        }
        error
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .names
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "Wrong annotation usage in '{names}'. {}", self.message)
    }
}

impl std::error::Error for UsageError {}

/// Failures that abort a generation pass before any usage check runs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source file could not be read.
    #[error("Failed to read source file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A source file is not valid Rust.
    #[error("Failed to parse source '{origin}': {source}")]
    Syntax { origin: String, source: syn::Error },

    /// No output directory was configured and `OUT_DIR` is not set.
    #[error("OUT_DIR is not set; call Generator::out_dir when running outside a build script")]
    MissingOutDir,
}

/// A single message produced by a generation pass.
#[derive(Debug)]
pub enum Diagnostic {
    Warning(String),
    Error(DiagnosticError),
}

/// Errors that fail the pass.
#[derive(Debug)]
pub enum DiagnosticError {
    Usage(UsageError),
    Source(Error),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Warning(message) => write!(f, "warning: {message}"),
            Diagnostic::Error(DiagnosticError::Usage(error)) => write!(f, "error: {error}"),
            Diagnostic::Error(DiagnosticError::Source(error)) => write!(f, "error: {error}"),
        }
    }
}

/// Everything a pass reported. A pass that returns `Diagnostics` as its error
/// contains at least one [`Diagnostic::Error`].
#[derive(Debug, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::Warning(message.into()));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.0.iter().any(|d| matches!(d, Diagnostic::Error(_)))
    }

    /// All usage errors, in the order they were found.
    pub fn usage_errors(&self) -> impl Iterator<Item = &UsageError> {
        self.0.iter().filter_map(|d| match d {
            Diagnostic::Error(DiagnosticError::Usage(error)) => Some(error),
            _ => None,
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|d| match d {
            Diagnostic::Warning(message) => Some(message.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Print every diagnostic for cargo. Each one becomes a `cargo:warning=`
    /// line, since build scripts have no error channel of their own; the
    /// caller exits with a failure status when [`has_errors`](Self::has_errors).
    pub fn report(&self) {
        for diagnostic in &self.0 {
            for line in diagnostic.to_string().lines() {
                println!("cargo:warning={line}");
            }
        }
    }
}

impl From<Vec<UsageError>> for Diagnostics {
    fn from(errors: Vec<UsageError>) -> Self {
        Self(
            errors
                .into_iter()
                .map(|error| Diagnostic::Error(DiagnosticError::Usage(error)))
                .collect(),
        )
    }
}

impl From<Error> for Diagnostics {
    fn from(error: Error) -> Self {
        Self(vec![Diagnostic::Error(DiagnosticError::Source(error))])
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, diagnostic) in self.0.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_message() {
        let name = ItemPath::parse("crate::server::ServerConfig");
        let error = UsageError::new(&name, Span::call_site(), "config_type annotation can only be used on traits");
        assert_eq!(
            error.to_string(),
            "Wrong annotation usage in 'crate::server::ServerConfig'. config_type annotation can only be used on traits"
        );
    }

    #[test]
    fn test_usage_error_names_are_comma_joined() {
        let a = ItemPath::parse("crate::A::port");
        let b = ItemPath::parse("crate::B::port");
        let error = UsageError::many([(&a, Span::call_site()), (&b, Span::call_site())], "duplicate");
        assert_eq!(error.to_string(), "Wrong annotation usage in 'crate::A::port,crate::B::port'. duplicate");
        assert_eq!(error.spans().len(), 2);
    }

    #[test]
    fn test_diagnostics_from_usage_errors() {
        let name = ItemPath::parse("crate::A");
        let mut diagnostics = Diagnostics::from(vec![UsageError::new(&name, Span::call_site(), "bad")]);
        diagnostics.warn("could not write");
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.usage_errors().count(), 1);
        assert_eq!(diagnostics.warnings().collect::<Vec<_>>(), ["could not write"]);
        assert_eq!(
            diagnostics.to_string(),
            "error: Wrong annotation usage in 'crate::A'. bad\nwarning: could not write"
        );
    }
}

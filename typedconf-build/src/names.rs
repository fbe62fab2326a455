//! Absolute names of declarations, methods and resolved type paths.

use std::fmt;

use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, ToTokens, TokenStreamExt};

/// An absolute, `::` separated item name such as `crate::server::ServerConfig`
/// or, for a method, `crate::server::ServerConfig::host`.
///
/// Ordering is lexicographic on the segments so maps keyed by `ItemPath`
/// iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemPath {
    segments: Vec<String>,
}

impl ItemPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The root module of the crate being generated for.
    pub fn crate_root() -> Self {
        Self::new(["crate"])
    }

    /// Parse `a::b::C`. A leading `::` is dropped.
    pub fn parse(path: &str) -> Self {
        Self::new(
            path.split("::")
                .map(str::trim)
                .filter(|segment| !segment.is_empty()),
        )
    }

    /// Name of a path as written, ignoring generic arguments.
    ///
    /// Returns `None` when any segment carries arguments, since such a path
    /// does not name an item on its own.
    pub fn of_path(path: &syn::Path) -> Option<Self> {
        path.segments
            .iter()
            .map(|segment| match segment.arguments {
                syn::PathArguments::None => Some(segment.ident.to_string()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(|segments| Self { segments })
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Append several segments.
    pub fn join(&self, rest: &[String]) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(rest.iter().cloned());
        Self { segments }
    }

    /// Segments following `prefix`, if this path starts with it.
    pub fn strip_prefix(&self, prefix: &ItemPath) -> Option<&[String]> {
        self.segments.strip_prefix(prefix.segments.as_slice())
    }

    pub fn parent(&self) -> Option<Self> {
        match self.segments.split_last() {
            Some((_, rest)) if !rest.is_empty() => Some(Self::new(rest.iter().cloned())),
            _ => None,
        }
    }

    /// Last segment.
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the path starts at the current crate rather than an external one.
    pub fn is_local(&self) -> bool {
        self.segments.first().is_some_and(|first| first == "crate")
    }

    /// Build a `syn::Path`. External paths get a leading `::`.
    pub fn to_path(&self) -> syn::Path {
        syn::Path {
            leading_colon: (!self.is_local()).then(Default::default),
            segments: self
                .segments
                .iter()
                .map(|segment| syn::PathSegment::from(ident(segment)))
                .collect(),
        }
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("::"))
    }
}

impl ToTokens for ItemPath {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        if !self.is_local() {
            tokens.extend(quote!(::));
        }
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                tokens.extend(quote!(::));
            }
            tokens.append(ident(segment));
        }
    }
}

/// Make an identifier from its source text, honouring the `r#` prefix.
pub fn ident(text: &str) -> Ident {
    match text.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(text, Span::call_site()),
    }
}

/// Render tokens the way a person would write them: `Vec<Option<String>>`
/// rather than `Vec < Option < String > >`.
pub fn display_tokens(tokens: &impl ToTokens) -> String {
    let mut text = tokens.to_token_stream().to_string();
    for (from, to) in [(" :: ", "::"), (":: ", "::"), (" ::", "::"), (" <", "<"), ("< ", "<"), (" >", ">"), (" ,", ",")] {
        text = text.replace(from, to);
    }
    text
}

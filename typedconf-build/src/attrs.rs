//! Parsing of `#[config_type(...)]` and `#[config_value(...)]` arguments.

use proc_macro2::TokenStream;
use syn::meta::ParseNestedMeta;
use syn::parse::{Parse, Parser};
use syn::{Attribute, LitBool, LitStr, Meta, Token, Type};

pub const CONFIG_TYPE: &str = "config_type";
pub const CONFIG_VALUE: &str = "config_value";

/// A type-valued attribute parameter as written by the user.
///
/// `mapper = M` yields [`TypeParam::One`], `validated_by(A, B)` yields
/// [`TypeParam::Many`]. Extraction into concrete references happens later in
/// [`crate::extract`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeParam {
    #[default]
    Absent,
    One(Type),
    Many(Vec<Type>),
}

/// Parsed `#[config_type(...)]` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeAttrs {
    /// Prefix prepended to every property path of the trait.
    pub context_path: String,

    /// Read types outside the built-in table with serde.
    pub bean_fallback: bool,

    /// Validators applied to the whole configuration through this trait.
    pub validated_by: TypeParam,
}

/// Parsed `#[config_value(...)]` arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueAttrs {
    /// Path relative to the enclosing `context_path`. Required; a missing
    /// path is reported as a usage error by the reducer.
    pub path: Option<String>,

    /// Custom mapper type.
    pub mapper: TypeParam,

    /// Field-level validators.
    pub validated_by: TypeParam,
}

impl TypeAttrs {
    /// Parse the arguments handed to the attribute macro.
    pub fn parse_args(args: TokenStream) -> syn::Result<Self> {
        let mut attrs = Self::default();
        syn::meta::parser(|meta| attrs.parse_meta(meta)).parse2(args)?;
        Ok(attrs)
    }

    /// Parse a `#[config_type]` attribute found in source.
    pub fn from_attr(attr: &Attribute) -> syn::Result<Self> {
        let mut attrs = Self::default();
        if !matches!(attr.meta, Meta::Path(_)) {
            attr.parse_nested_meta(|meta| attrs.parse_meta(meta))?;
        }
        Ok(attrs)
    }

    fn parse_meta(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        // context_path = "..."
        if meta.path.is_ident("context_path") {
            let value: LitStr = meta.value()?.parse()?;
            self.context_path = value.value();
            return Ok(());
        }

        // bean_fallback or bean_fallback = bool
        if meta.path.is_ident("bean_fallback") {
            self.bean_fallback = if meta.input.peek(Token![=]) {
                meta.value()?.parse::<LitBool>()?.value()
            } else {
                true
            };
            return Ok(());
        }

        if meta.path.is_ident("validated_by") {
            self.validated_by = parse_types(&meta)?;
            return Ok(());
        }

        Err(meta.error("unsupported config_type attribute"))
    }
}

impl ValueAttrs {
    pub fn parse_args(args: TokenStream) -> syn::Result<Self> {
        let mut attrs = Self::default();
        syn::meta::parser(|meta| attrs.parse_meta(meta)).parse2(args)?;
        Ok(attrs)
    }

    pub fn from_attr(attr: &Attribute) -> syn::Result<Self> {
        let mut attrs = Self::default();
        if !matches!(attr.meta, Meta::Path(_)) {
            attr.parse_nested_meta(|meta| attrs.parse_meta(meta))?;
        }
        Ok(attrs)
    }

    fn parse_meta(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        // path = "..."
        if meta.path.is_ident("path") {
            let value: LitStr = meta.value()?.parse()?;
            self.path = Some(value.value());
            return Ok(());
        }

        // mapper = Type
        if meta.path.is_ident("mapper") {
            self.mapper = TypeParam::One(meta.value()?.parse()?);
            return Ok(());
        }

        if meta.path.is_ident("validated_by") {
            self.validated_by = parse_types(&meta)?;
            return Ok(());
        }

        Err(meta.error("unsupported config_value attribute"))
    }
}

/// `name = Type` or `name(TypeA, TypeB)`.
fn parse_types(meta: &ParseNestedMeta) -> syn::Result<TypeParam> {
    if meta.input.peek(Token![=]) {
        return Ok(TypeParam::One(meta.value()?.parse()?));
    }
    let content;
    syn::parenthesized!(content in meta.input);
    let types = content.parse_terminated(Type::parse, Token![,])?;
    Ok(TypeParam::Many(types.into_iter().collect()))
}

/// Whether `attr` is `#[name]` or `#[typedconf::name]`.
pub fn is_attr(attr: &Attribute, name: &str) -> bool {
    let segments = &attr.path().segments;
    match segments.len() {
        1 => segments[0].ident == name,
        2 => segments[0].ident == "typedconf" && segments[1].ident == name,
        _ => false,
    }
}

pub fn find_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|attr| is_attr(attr, name))
}

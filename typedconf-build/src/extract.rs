//! Extraction of type-valued attribute parameters.
//!
//! Sentinel markers (`NoMapper`, `NoValidation`) are dropped here. Anything
//! else must be a plain type path; whether it actually implements
//! `ConfigMapper<T>` / `ConfigValidator<T>` for the right `T` is left to rustc
//! when the generated code is compiled.

use std::fmt;

use proc_macro2::{Span, TokenStream};
use quote::ToTokens;
use syn::spanned::Spanned;
use syn::{Path, Type};

use crate::attrs::TypeParam;
use crate::error::UsageError;
use crate::names::{display_tokens, ItemPath};

/// A reference to a user or library type taken from an attribute parameter,
/// with its path already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    path: Path,
}

impl TypeRef {
    pub fn new(path: Path) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_tokens(&self.path))
    }
}

impl ToTokens for TypeRef {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.path.to_tokens(tokens);
    }
}

/// The capability a parameter's types must provide. Only used to word errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Mapper,
    Validator,
}

impl Capability {
    fn sentinel(self) -> &'static str {
        match self {
            Capability::Mapper => "NoMapper",
            Capability::Validator => "NoValidation",
        }
    }

    fn module(self) -> &'static str {
        match self {
            Capability::Mapper => "mappers",
            Capability::Validator => "validators",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Mapper => f.write_str("ConfigMapper<T>"),
            Capability::Validator => f.write_str("ConfigValidator<T>"),
        }
    }
}

/// Extracts type references from one attribute parameter of one element.
pub struct Extractor<'a> {
    pub param: &'a str,
    pub capability: Capability,
    pub owner: &'a ItemPath,
    pub span: Span,
}

impl Extractor<'_> {
    /// At most one type. Absent or sentinel yields `None`.
    pub fn extract_one(&self, value: &TypeParam) -> Result<Option<TypeRef>, UsageError> {
        let mut refs = self.extract_many(value)?;
        match refs.len() {
            0 | 1 => Ok(refs.pop()),
            _ => Err(UsageError::new(
                self.owner,
                self.span,
                format!("Annotation parameter '{}' accepts a single type", self.param),
            )),
        }
    }

    /// Every non-sentinel type, in the order first written. Repeats are
    /// dropped.
    pub fn extract_many(&self, value: &TypeParam) -> Result<Vec<TypeRef>, UsageError> {
        let types: &[Type] = match value {
            TypeParam::Absent => &[],
            TypeParam::One(ty) => std::slice::from_ref(ty),
            TypeParam::Many(types) => types,
        };

        let mut refs = Vec::with_capacity(types.len());
        for ty in types {
            let path = self.check(ty)?;
            let found = TypeRef::new(path.clone());
            if !self.is_sentinel(path) && !refs.contains(&found) {
                refs.push(found);
            }
        }
        Ok(refs)
    }

    /// Structural check: only named types can implement the capability.
    fn check<'t>(&self, ty: &'t Type) -> Result<&'t Path, UsageError> {
        match ty {
            Type::Path(ty) if ty.qself.is_none() => Ok(&ty.path),
            Type::Group(group) => self.check(&group.elem),
            Type::Paren(paren) => self.check(&paren.elem),
            other => Err(UsageError::new(
                self.owner,
                other.span(),
                format!(
                    "Annotation parameter '{}' needs to be a '{}', found '{}'",
                    self.param,
                    self.capability,
                    display_tokens(other)
                ),
            )),
        }
    }

    fn is_sentinel(&self, path: &Path) -> bool {
        let segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        let sentinel = self.capability.sentinel();
        match segments.as_slice() {
            [name] => name == sentinel,
            [krate, name] => krate == "typedconf" && name == sentinel,
            [krate, module, name] => krate == "typedconf" && module == self.capability.module() && name == sentinel,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn extractor(owner: &ItemPath, capability: Capability) -> Extractor<'_> {
        Extractor {
            param: if capability == Capability::Mapper { "mapper" } else { "validated_by" },
            capability,
            owner,
            span: Span::call_site(),
        }
    }

    #[test]
    fn test_absent_parameter() {
        let owner = ItemPath::parse("crate::A::a");
        let extractor = extractor(&owner, Capability::Mapper);
        assert_eq!(extractor.extract_one(&TypeParam::Absent).unwrap(), None);
        assert!(extractor.extract_many(&TypeParam::Absent).unwrap().is_empty());
    }

    #[test]
    fn test_sentinels_are_filtered() {
        let owner = ItemPath::parse("crate::A::a");
        let mappers = extractor(&owner, Capability::Mapper);
        assert_eq!(mappers.extract_one(&TypeParam::One(parse_quote!(NoMapper))).unwrap(), None);
        assert_eq!(
            mappers.extract_one(&TypeParam::One(parse_quote!(::typedconf::mappers::NoMapper))).unwrap(),
            None
        );

        let validators = extractor(&owner, Capability::Validator);
        let refs = validators
            .extract_many(&TypeParam::Many(vec![
                parse_quote!(typedconf::NoValidation),
                parse_quote!(crate::checks::Port),
                parse_quote!(NonEmptyString),
            ]))
            .unwrap();
        let names: Vec<String> = refs.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["crate::checks::Port", "NonEmptyString"]);
    }

    #[test]
    fn test_repeated_validators_are_kept_once() {
        let owner = ItemPath::parse("crate::A::a");
        let refs = extractor(&owner, Capability::Validator)
            .extract_many(&TypeParam::Many(vec![
                parse_quote!(NonEmptyString),
                parse_quote!(crate::checks::Port),
                parse_quote!(NonEmptyString),
            ]))
            .unwrap();
        let names: Vec<String> = refs.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["NonEmptyString", "crate::checks::Port"]);
    }

    #[test]
    fn test_sentinel_of_the_other_kind_is_kept() {
        let owner = ItemPath::parse("crate::A::a");
        let validators = extractor(&owner, Capability::Validator);
        let refs = validators.extract_many(&TypeParam::One(parse_quote!(NoMapper))).unwrap();
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_non_path_type_is_rejected() {
        let owner = ItemPath::parse("crate::A::a");
        let err = extractor(&owner, Capability::Mapper)
            .extract_one(&TypeParam::One(parse_quote!((A, B))))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wrong annotation usage in 'crate::A::a'. Annotation parameter 'mapper' needs to be a 'ConfigMapper<T>', found '(A, B)'"
        );
    }

    #[test]
    fn test_more_than_one_mapper_is_rejected() {
        let owner = ItemPath::parse("crate::A::a");
        let err = extractor(&owner, Capability::Mapper)
            .extract_one(&TypeParam::Many(vec![parse_quote!(A), parse_quote!(B)]))
            .unwrap_err();
        assert!(err.message().contains("accepts a single type"));
    }
}

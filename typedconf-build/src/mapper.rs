//! The fixed table of built-in mappers and the choice of a mapper for a
//! property.

use std::collections::BTreeSet;

use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{GenericArgument, PathArguments, Type};

use crate::extract::TypeRef;
use crate::names::ItemPath;

/// A semantic value type with a built-in mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    String,
    Duration,
    Boolean,
    Int,
    Long,
    Number,
    Double,
    Config,
    ConfigValue,
    AnyRef,
    StringList,
    DurationList,
    BooleanList,
    IntList,
    LongList,
    NumberList,
    DoubleList,
    ConfigList,
    AnyRefList,
}

impl ValueKind {
    /// Look `ty` up in the table. `ty` must already be resolved: prelude
    /// types and primitives match by their short name, everything else only
    /// by its full path.
    pub fn of(ty: &Type) -> Option<Self> {
        let (name, argument) = type_name(ty)?;
        let segments: Vec<&str> = name.segments().iter().map(String::as_str).collect();

        if let Some(element) = argument {
            return match segments.as_slice() {
                ["Vec"] | ["std" | "alloc", "vec", "Vec"] => Self::of(element)?.list(),
                _ => None,
            };
        }

        let kind = match segments.as_slice() {
            ["String"] | ["std" | "alloc", "string", "String"] => Self::String,
            ["std" | "core", "time", "Duration"] => Self::Duration,
            ["bool"] | ["std" | "core", "primitive", "bool"] => Self::Boolean,
            ["i32"] | ["std" | "core", "primitive", "i32"] => Self::Int,
            ["i64"] | ["std" | "core", "primitive", "i64"] => Self::Long,
            ["f64"] | ["std" | "core", "primitive", "f64"] => Self::Double,
            ["typedconf" | "serde_json", "Number"] => Self::Number,
            ["typedconf", "Config"] => Self::Config,
            ["typedconf", "ConfigValue"] => Self::ConfigValue,
            ["typedconf", "AnyValue"] | ["serde_json", "Value"] => Self::AnyRef,
            _ => return None,
        };
        Some(kind)
    }

    /// The list counterpart of a scalar kind.
    fn list(self) -> Option<Self> {
        Some(match self {
            Self::String => Self::StringList,
            Self::Duration => Self::DurationList,
            Self::Boolean => Self::BooleanList,
            Self::Int => Self::IntList,
            Self::Long => Self::LongList,
            Self::Number => Self::NumberList,
            Self::Double => Self::DoubleList,
            Self::Config => Self::ConfigList,
            Self::AnyRef => Self::AnyRefList,
            _ => return None,
        })
    }

    /// Name of the runtime mapper in `typedconf::mappers`.
    pub fn mapper_name(self) -> &'static str {
        match self {
            Self::String => "StringM",
            Self::Duration => "DurationM",
            Self::Boolean => "BooleanM",
            Self::Int => "IntM",
            Self::Long => "LongM",
            Self::Number => "NumberM",
            Self::Double => "DoubleM",
            Self::Config => "ConfigM",
            Self::ConfigValue => "ConfigValueM",
            Self::AnyRef => "AnyRefM",
            Self::StringList => "StringListM",
            Self::DurationList => "DurationListM",
            Self::BooleanList => "BooleanListM",
            Self::IntList => "IntListM",
            Self::LongList => "LongListM",
            Self::NumberList => "NumberListM",
            Self::DoubleList => "DoubleListM",
            Self::ConfigList => "ConfigListM",
            Self::AnyRefList => "AnyRefListM",
        }
    }
}

/// How a property is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapper {
    /// `mapper = M` on the attribute.
    Custom(TypeRef),
    Builtin(ValueKind),
    /// `EnumM<T>` for a known enum.
    Enum(Type),
    /// `BeanM<T>` when the declaration opted into `bean_fallback`.
    Bean(Type),
}

impl Mapper {
    /// Pick the mapper for `target`. Precedence: custom, enum, built-in
    /// table, bean fallback. `None` means the type is unsupported.
    pub fn select(
        custom: Option<TypeRef>,
        target: &Type,
        enums: &BTreeSet<ItemPath>,
        bean_fallback: bool,
    ) -> Option<Self> {
        if let Some(custom) = custom {
            return Some(Self::Custom(custom));
        }
        if is_enum(target, enums) {
            return Some(Self::Enum(target.clone()));
        }
        if let Some(kind) = ValueKind::of(target) {
            return Some(Self::Builtin(kind));
        }
        bean_fallback.then(|| Self::Bean(target.clone()))
    }
}

impl ToTokens for Mapper {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.extend(match self {
            Mapper::Custom(custom) => quote!(#custom),
            Mapper::Builtin(kind) => {
                let name = crate::names::ident(kind.mapper_name());
                quote!(::typedconf::mappers::#name)
            }
            Mapper::Enum(ty) => quote!(::typedconf::mappers::EnumM<#ty>),
            Mapper::Bean(ty) => quote!(::typedconf::mappers::BeanM<#ty>),
        });
    }
}

/// The short name of a table type that resolution left as written, for
/// example because it came in through a glob import. The generated file
/// could not name it.
pub fn unresolved_table_name(ty: &Type) -> Option<String> {
    let (name, argument) = type_name(ty)?;
    if let Some(element) = argument {
        return match name.segments() {
            [vec] if vec == "Vec" => unresolved_table_name(element),
            _ => None,
        };
    }
    match name.segments() {
        [short] if ["Duration", "Number", "Config", "ConfigValue", "AnyValue"].contains(&short.as_str()) => {
            Some(short.clone())
        }
        _ => None,
    }
}

/// Unwrap `Option<T>` (also spelled `std::option::Option` or
/// `core::option::Option`) one level.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let (name, argument) = type_name(ty)?;
    let segments: Vec<&str> = name.segments().iter().map(String::as_str).collect();
    match segments.as_slice() {
        ["Option"] | ["std" | "core", "option", "Option"] => argument,
        _ => None,
    }
}

fn is_enum(ty: &Type, enums: &BTreeSet<ItemPath>) -> bool {
    match ty {
        Type::Path(ty) if ty.qself.is_none() => {
            ItemPath::of_path(&ty.path).is_some_and(|name| enums.contains(&name))
        }
        _ => false,
    }
}

/// Name of a path type and its single generic type argument, if it has
/// exactly one. Types with other argument shapes are not table types.
fn type_name(ty: &Type) -> Option<(ItemPath, Option<&Type>)> {
    let Type::Path(ty) = ty else {
        return None;
    };
    if ty.qself.is_some() {
        return None;
    }
    let mut segments = ty.path.segments.iter();
    let last = segments.next_back()?;
    let init: Vec<&syn::PathSegment> = segments.collect();
    if init.iter().any(|segment| !matches!(segment.arguments, PathArguments::None)) {
        return None;
    }

    let argument = match &last.arguments {
        PathArguments::None => None,
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match &args.args[0] {
            GenericArgument::Type(ty) => Some(ty),
            _ => return None,
        },
        _ => return None,
    };

    let name = ItemPath::new(
        init.into_iter()
            .chain(std::iter::once(last))
            .map(|segment| segment.ident.to_string()),
    );
    Some((name, argument))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::display_tokens;
    use syn::parse_quote;

    #[test]
    fn test_scalar_table() {
        let cases: Vec<(Type, ValueKind)> = vec![
            (parse_quote!(String), ValueKind::String),
            (parse_quote!(::std::string::String), ValueKind::String),
            (parse_quote!(::std::time::Duration), ValueKind::Duration),
            (parse_quote!(bool), ValueKind::Boolean),
            (parse_quote!(i32), ValueKind::Int),
            (parse_quote!(i64), ValueKind::Long),
            (parse_quote!(f64), ValueKind::Double),
            (parse_quote!(::typedconf::Number), ValueKind::Number),
            (parse_quote!(::typedconf::Config), ValueKind::Config),
            (parse_quote!(::typedconf::ConfigValue), ValueKind::ConfigValue),
            (parse_quote!(::serde_json::Value), ValueKind::AnyRef),
        ];
        for (ty, kind) in cases {
            assert_eq!(ValueKind::of(&ty), Some(kind), "{}", display_tokens(&ty));
        }
    }

    #[test]
    fn test_list_table() {
        assert_eq!(ValueKind::of(&parse_quote!(Vec<String>)), Some(ValueKind::StringList));
        assert_eq!(
            ValueKind::of(&parse_quote!(::std::vec::Vec<::std::time::Duration>)),
            Some(ValueKind::DurationList)
        );
        assert_eq!(ValueKind::of(&parse_quote!(Vec<::typedconf::Config>)), Some(ValueKind::ConfigList));
        assert_eq!(ValueKind::of(&parse_quote!(Vec<::typedconf::ConfigValue>)), None);
        assert_eq!(ValueKind::of(&parse_quote!(Vec<Vec<String>>)), None);
    }

    #[test]
    fn test_unsupported_types() {
        assert_eq!(ValueKind::of(&parse_quote!(u16)), None);
        assert_eq!(ValueKind::of(&parse_quote!(::std::time::Instant)), None);
        assert_eq!(ValueKind::of(&parse_quote!(&'static str)), None);
        assert_eq!(ValueKind::of(&parse_quote!(HashMap<String, String>)), None);
    }

    #[test]
    fn test_short_names_need_resolution() {
        assert_eq!(ValueKind::of(&parse_quote!(Duration)), None);
        assert_eq!(ValueKind::of(&parse_quote!(Vec<Config>)), None);
        assert_eq!(unresolved_table_name(&parse_quote!(Duration)), Some("Duration".to_string()));
        assert_eq!(unresolved_table_name(&parse_quote!(Vec<AnyValue>)), Some("AnyValue".to_string()));
        assert_eq!(unresolved_table_name(&parse_quote!(::std::time::Duration)), None);
        assert_eq!(unresolved_table_name(&parse_quote!(String)), None);
    }

    #[test]
    fn test_option_inner() {
        let ty: Type = parse_quote!(Option<i64>);
        assert_eq!(option_inner(&ty), Some(&parse_quote!(i64)));
        let ty: Type = parse_quote!(::std::option::Option<String>);
        assert_eq!(option_inner(&ty), Some(&parse_quote!(String)));
        assert_eq!(option_inner(&parse_quote!(i64)), None);
    }

    #[test]
    fn test_select_precedence() {
        let enums: BTreeSet<ItemPath> = [ItemPath::parse("crate::db::Mode")].into();
        let custom = TypeRef::new(parse_quote!(crate::PortMapper));

        let mode: Type = parse_quote!(crate::db::Mode);
        assert_eq!(
            Mapper::select(Some(custom.clone()), &mode, &enums, false),
            Some(Mapper::Custom(custom))
        );
        assert_eq!(Mapper::select(None, &mode, &enums, false), Some(Mapper::Enum(mode.clone())));

        let string: Type = parse_quote!(String);
        assert_eq!(
            Mapper::select(None, &string, &enums, true),
            Some(Mapper::Builtin(ValueKind::String))
        );

        let bean: Type = parse_quote!(crate::db::Credentials);
        assert_eq!(Mapper::select(None, &bean, &enums, false), None);
        assert_eq!(Mapper::select(None, &bean, &enums, true), Some(Mapper::Bean(bean.clone())));
    }

    #[test]
    fn test_mapper_tokens() {
        let mode: Type = parse_quote!(crate::db::Mode);
        assert_eq!(
            display_tokens(&Mapper::Builtin(ValueKind::IntList)),
            "::typedconf::mappers::IntListM"
        );
        assert_eq!(
            display_tokens(&Mapper::Enum(mode)),
            "::typedconf::mappers::EnumM<crate::db::Mode>"
        );
    }
}

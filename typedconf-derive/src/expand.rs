use proc_macro2::{Span, TokenStream};
use quote::{quote, ToTokens};
use syn::{Item, TraitItem, Type};

use typedconf_build::{
    check_declaration, is_attr, Capability, Declaration, Extractor, ItemPath, Scope, TypeAttrs, TypeParam, UsageError,
    ValueAttrs, CONFIG_TYPE, CONFIG_VALUE,
};

pub fn config_type(args: TokenStream, item: TokenStream) -> TokenStream {
    let attrs = match TypeAttrs::parse_args(args) {
        Ok(attrs) => attrs,
        Err(error) => return with_errors(item, [error]),
    };
    let mut item: Item = match syn::parse2(item.clone()) {
        Ok(item) => item,
        Err(error) => return with_errors(item, [error]),
    };
    let referenced = referenced_types(&item, &attrs);

    // Names are reported relative to the declaring module, which a macro
    // cannot see.
    let scope = Scope::empty(ItemPath::new(Vec::<String>::new()));
    let errors = match Declaration::from_item(&item, &scope, attrs.clone()) {
        Ok(declaration) => check(&declaration),
        Err(error) => vec![error],
    };

    if let Item::Trait(item) = &mut item {
        for trait_item in &mut item.items {
            if let TraitItem::Fn(method) = trait_item {
                method.attrs.retain(|attr| !is_attr(attr, CONFIG_VALUE));
            }
        }
    }

    if !errors.is_empty() {
        return with_errors(item.into_token_stream(), errors.iter().map(UsageError::to_syn_error));
    }

    // Mappers and validators are only named inside attributes that are
    // removed here; mention them once so their imports stay used and a
    // misspelled type fails at the attribute.
    quote! {
        #item
        const _: () = {
            #(let _ = ::core::marker::PhantomData::<#referenced>;)*
        };
    }
}

/// Every type written in a `mapper` or `validated_by` parameter, unresolved.
fn referenced_types(item: &Item, attrs: &TypeAttrs) -> Vec<Type> {
    let mut types = Vec::new();
    push_types(&mut types, &attrs.validated_by);
    if let Item::Trait(item) = item {
        let methods = item.items.iter().filter_map(|trait_item| match trait_item {
            TraitItem::Fn(method) => Some(method),
            _ => None,
        });
        for method in methods {
            let value = method.attrs.iter().find(|attr| is_attr(attr, CONFIG_VALUE));
            if let Some(Ok(value)) = value.map(ValueAttrs::from_attr) {
                push_types(&mut types, &value.mapper);
                push_types(&mut types, &value.validated_by);
            }
        }
    }
    types
}

fn push_types(types: &mut Vec<Type>, param: &TypeParam) {
    match param {
        TypeParam::Absent => {}
        TypeParam::One(ty) => types.push(ty.clone()),
        TypeParam::Many(many) => types.extend(many.iter().cloned()),
    }
}

pub fn config_value(_args: TokenStream, item: TokenStream) -> TokenStream {
    // Point at where the item starts.
    let span = item
        .clone()
        .into_iter()
        .next()
        .map_or_else(Span::call_site, |token| token.span());
    let error = syn::Error::new(
        span,
        format!("{CONFIG_VALUE} needs to be enclosed by a trait annotated with {CONFIG_TYPE}"),
    );
    with_errors(item, [error])
}

/// Declaration checks plus the per-property ones that need no knowledge of
/// other modules. Mapper selection is left to the build script, which knows
/// every enum of the crate.
fn check(declaration: &Declaration) -> Vec<UsageError> {
    if let Err(errors) = check_declaration(declaration) {
        return errors;
    }

    let mut errors = Vec::new();
    for method in &declaration.methods {
        let Some(attrs) = &method.attrs else {
            continue;
        };
        if attrs.path.is_none() {
            errors.push(UsageError::new(
                &method.path,
                method.span,
                format!("{CONFIG_VALUE} requires a 'path' parameter"),
            ));
        }
        let mapper = Extractor {
            param: "mapper",
            capability: Capability::Mapper,
            owner: &method.path,
            span: method.span,
        };
        if let Err(error) = mapper.extract_one(&attrs.mapper) {
            errors.push(error);
        }
        let validators = Extractor {
            param: "validated_by",
            capability: Capability::Validator,
            owner: &method.path,
            span: method.span,
        };
        if let Err(error) = validators.extract_many(&attrs.validated_by) {
            errors.push(error);
        }
    }
    errors
}

fn with_errors(item: TokenStream, errors: impl IntoIterator<Item = syn::Error>) -> TokenStream {
    let errors = errors.into_iter().map(|error| error.to_compile_error());
    quote! {
        #item
        #(#errors)*
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(args: TokenStream, item: TokenStream) -> String {
        config_type(args, item).to_string()
    }

    #[test]
    fn test_valid_trait_loses_value_attributes() {
        let output = expand(
            quote!(context_path = "server"),
            quote! {
                pub trait ServerConfig {
                    #[config_value(path = "port")]
                    fn port(&self) -> i32;

                    #[doc = "kept"]
                    #[typedconf::config_value(path = "host")]
                    fn host(&self) -> String;
                }
            },
        );
        assert!(!output.contains("config_value"));
        assert!(!output.contains("compile_error"));
        assert!(output.contains("\"kept\""));
        assert!(output.contains("fn port"));
    }

    #[test]
    fn test_parameter_types_stay_referenced() {
        let output = expand(
            quote!(validated_by(Consistent)),
            quote! {
                pub trait ServerConfig {
                    #[config_value(path = "port", mapper = PortMapper, validated_by(Port, NoValidation))]
                    fn port(&self) -> i32;
                }
            },
        );
        let compact: String = output.chars().filter(|c| !c.is_whitespace()).collect();
        assert!(compact.contains("const_:()="));
        for name in ["Consistent", "PortMapper", "Port", "NoValidation"] {
            assert!(compact.contains(&format!("PhantomData::<{name}>")), "{name}");
        }
    }

    #[test]
    fn test_non_trait_is_reported() {
        let output = expand(quote!(), quote!(pub struct Settings;));
        assert!(output.contains("compile_error"));
        assert!(output.contains("Settings"));
        assert!(output.contains("config_type annotation can only be used on traits"));
        assert!(output.contains("pub struct Settings"));
    }

    #[test]
    fn test_private_trait_is_reported() {
        let output = expand(quote!(), quote!(trait Hidden {}));
        assert!(output.contains("config_type annotation cannot be used on non public traits"));
    }

    #[test]
    fn test_unannotated_abstract_method() {
        let output = expand(
            quote!(),
            quote! {
                pub trait ServerConfig {
                    fn port(&self) -> i32;
                }
            },
        );
        assert!(output.contains("ServerConfig::port"));
        assert!(output.contains("Abstract method needs to be annotated with config_value"));
    }

    #[test]
    fn test_property_parameters() {
        let output = expand(
            quote!(),
            quote! {
                pub trait ServerConfig {
                    #[config_value]
                    fn port(&self) -> i32;

                    #[config_value(path = "host", mapper = (A, B))]
                    fn host(&self) -> String;
                }
            },
        );
        assert!(output.contains("config_value requires a"));
        assert!(output.contains("needs to be a"));
        assert!(output.contains("ConfigMapper<T>"));
    }

    #[test]
    fn test_unknown_type_is_left_to_the_build_script() {
        let output = expand(
            quote!(),
            quote! {
                pub trait Database {
                    #[config_value(path = "mode")]
                    fn mode(&self) -> Mode;
                }
            },
        );
        assert!(!output.contains("compile_error"));
    }

    #[test]
    fn test_malformed_arguments() {
        let output = expand(quote!(context = "x"), quote!(pub trait A {}));
        assert!(output.contains("unsupported config_type attribute"));
        assert!(output.contains("pub trait A"));
    }

    #[test]
    fn test_stray_config_value() {
        let output = config_value(quote!(path = "x"), quote!(fn x(&self) -> i32 { 0 })).to_string();
        assert!(output.contains("config_value needs to be enclosed by a trait annotated with config_type"));
        assert!(output.contains("fn x"));
    }
}

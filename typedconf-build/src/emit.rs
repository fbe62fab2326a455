//! Rendering of a [`TypeSpec`] into the generated configuration struct.

use proc_macro2::TokenStream;
use quote::quote;

use crate::names::ident;
use crate::type_spec::TypeSpec;

/// First line of every generated file.
pub const HEADER: &str = "// @generated by typedconf-build. Do not edit.\n";

/// The struct, its constructor and one trait impl per declaration.
pub fn synthesize(spec: &TypeSpec, struct_name: &str) -> TokenStream {
    let name = ident(struct_name);
    let properties: Vec<_> = spec.properties().map(|(_, property)| property).collect();

    let fields = properties.iter().map(|property| property.field());
    let initializers = properties.iter().map(|property| property.initializer());
    let readers = properties.iter().map(|property| property.read_fn());
    let unused_config = properties.is_empty().then(|| quote!(let _ = config;));
    let validate = validate_fn(spec);

    let impls = spec.super_interfaces().iter().map(|declaration| {
        let accessors = spec.properties_of(declaration).iter().map(|property| property.accessor());
        quote! {
            impl #declaration for #name {
                #(#accessors)*
            }
        }
    });

    quote! {
        /// Every `#[config_type]` trait of the crate, read and validated
        /// from one configuration tree.
        #[derive(Clone)]
        pub struct #name {
            #(#fields)*
        }

        impl #name {
            /// Read every value from `config`, then run every validator.
            pub fn new(config: &::typedconf::Config) -> ::std::result::Result<Self, ::typedconf::Error> {
                #unused_config
                let instance = Self {
                    #(#initializers)*
                };
                let errors = instance.validate();
                if !errors.is_empty() {
                    return ::std::result::Result::Err(::typedconf::ConfigValidationError::new(errors).into());
                }
                ::std::result::Result::Ok(instance)
            }

            #(#readers)*

            #validate
        }

        impl ::typedconf::FromConfig for #name {
            fn from_config(config: &::typedconf::Config) -> ::std::result::Result<Self, ::typedconf::Error> {
                Self::new(config)
            }
        }

        #(#impls)*
    }
}

/// Field-level validators first, in property order, then type-level ones.
fn validate_fn(spec: &TypeSpec) -> TokenStream {
    let fields: Vec<TokenStream> = spec
        .properties()
        .filter(|(_, property)| !property.validators.is_empty())
        .map(|(declaration, property)| property.validations(&declaration.to_string()))
        .collect();

    let types: Vec<TokenStream> = spec
        .validators()
        .flat_map(|(declaration, validators)| {
            let type_name = declaration.to_string();
            validators.iter().map(move |validator| {
                quote! {
                    errors.extend(
                        <#validator as ::typedconf::ConfigValidator<dyn #declaration>>::validate(self)
                            .into_iter()
                            .map(|error| error.with_type_info(#type_name)),
                    );
                }
            })
        })
        .collect();

    if fields.is_empty() && types.is_empty() {
        return quote! {
            fn validate(&self) -> ::std::vec::Vec<::typedconf::ValidationError> {
                ::std::vec::Vec::new()
            }
        };
    }

    quote! {
        fn validate(&self) -> ::std::vec::Vec<::typedconf::ValidationError> {
            let mut errors = ::std::vec::Vec::new();
            #(#fields)*
            #(#types)*
            errors
        }
    }
}

/// The contents of the generated file.
pub fn render(tokens: &TokenStream) -> String {
    format!("{HEADER}{tokens}\n")
}

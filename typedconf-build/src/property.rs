//! Per-accessor model: where a value lives, how it is read and validated,
//! and the members synthesized for it.

use std::collections::BTreeSet;

use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use syn::{ReturnType, Type};
use tracing::debug;

use crate::attrs::ValueAttrs;
use crate::error::UsageError;
use crate::extract::{Capability, Extractor, TypeRef};
use crate::mapper::{option_inner, unresolved_table_name, Mapper};
use crate::model::{DeclMethod, Declaration};
use crate::names::{display_tokens, ItemPath};

/// One annotated accessor of one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySpec {
    /// Absolute name of the accessor, for messages.
    pub name: ItemPath,
    pub ident: Ident,
    /// Dotted path in the configuration tree, context path included.
    pub config_path: String,
    /// Declared return type, `Option` included.
    pub field_type: Type,
    /// Type the mapper produces.
    pub target_type: Type,
    pub optional: bool,
    pub mapper: Mapper,
    pub validators: Vec<TypeRef>,
}

/// `context.path` joined with `path`; an empty context is omitted.
pub fn absolute_path(context_path: &str, path: &str) -> String {
    if context_path.is_empty() {
        path.to_string()
    } else {
        format!("{context_path}.{path}")
    }
}

impl PropertySpec {
    pub fn new(
        declaration: &Declaration,
        method: &DeclMethod,
        attrs: &ValueAttrs,
        enums: &BTreeSet<ItemPath>,
    ) -> Result<Self, UsageError> {
        let error = |message: String| UsageError::new(&method.path, method.span, message);

        let path = attrs
            .path
            .as_deref()
            .ok_or_else(|| error("config_value requires a 'path' parameter".to_string()))?;
        let config_path = absolute_path(&declaration.attrs.context_path, path);
        if path.trim().is_empty() || config_path.split('.').any(|key| key.trim().is_empty()) {
            return Err(error(format!(
                "Invalid config path '{config_path}'. Keys need to be non-empty and separated by single dots"
            )));
        }

        let field_type = match &method.sig.output {
            ReturnType::Type(_, ty) => (**ty).clone(),
            ReturnType::Default => return Err(error("config_value accessor needs to return a value".to_string())),
        };
        let (target_type, optional) = match option_inner(&field_type) {
            Some(inner) => (inner.clone(), true),
            None => (field_type.clone(), false),
        };

        let custom = Extractor {
            param: "mapper",
            capability: Capability::Mapper,
            owner: &method.path,
            span: method.span,
        }
        .extract_one(&attrs.mapper)?;

        if custom.is_none() {
            if let Some(name) = unresolved_table_name(&target_type) {
                return Err(error(format!(
                    "Config value type '{name}' cannot be resolved. Import it by name or write its full path"
                )));
            }
        }

        let mapper = Mapper::select(custom, &target_type, enums, declaration.attrs.bean_fallback)
            .ok_or_else(|| {
                error(format!(
                    "Unsupported config value type '{}'. Please provide a custom mapper",
                    display_tokens(&target_type)
                ))
            })?;

        let validators = Extractor {
            param: "validated_by",
            capability: Capability::Validator,
            owner: &method.path,
            span: method.span,
        }
        .extract_many(&attrs.validated_by)?;

        debug!(
            property = %method.path,
            path = %config_path,
            optional,
            validators = validators.len(),
            "resolved config value"
        );

        Ok(Self {
            name: method.path.clone(),
            ident: method.sig.ident.clone(),
            config_path,
            field_type,
            target_type,
            optional,
            mapper,
            validators,
        })
    }

    fn reader(&self) -> Ident {
        format_ident!("read_{}", self.ident.to_string().trim_start_matches("r#"), span = Span::call_site())
    }

    /// `name: Type,`
    pub fn field(&self) -> TokenStream {
        let ident = &self.ident;
        let ty = &self.field_type;
        quote!(#ident: #ty,)
    }

    /// `name: Self::read_name(config)?,`
    pub fn initializer(&self) -> TokenStream {
        let ident = &self.ident;
        let reader = self.reader();
        quote!(#ident: Self::#reader(config)?,)
    }

    /// Static reader. Optional properties turn a missing value into `None`;
    /// every other error propagates.
    pub fn read_fn(&self) -> TokenStream {
        let reader = self.reader();
        let mapper = &self.mapper;
        let target = &self.target_type;
        let field_type = &self.field_type;
        let path = &self.config_path;
        let apply = quote!(<#mapper as ::typedconf::ConfigMapper<#target>>::apply(config, #path));

        let body = if self.optional {
            quote! {
                match #apply {
                    ::std::result::Result::Ok(value) => ::std::result::Result::Ok(::std::option::Option::Some(value)),
                    ::std::result::Result::Err(::typedconf::ConfigError::Missing { .. }) => {
                        ::std::result::Result::Ok(::std::option::Option::None)
                    }
                    ::std::result::Result::Err(error) => ::std::result::Result::Err(error),
                }
            }
        } else {
            apply
        };

        quote! {
            fn #reader(config: &::typedconf::Config) -> ::std::result::Result<#field_type, ::typedconf::ConfigError> {
                #body
            }
        }
    }

    /// Trait accessor returning a copy of the field.
    pub fn accessor(&self) -> TokenStream {
        let ident = &self.ident;
        let ty = &self.field_type;
        quote! {
            fn #ident(&self) -> #ty {
                ::std::clone::Clone::clone(&self.#ident)
            }
        }
    }

    /// Field-level validation statements, annotated with `type_name` and the
    /// field name.
    pub fn validations(&self, type_name: &str) -> TokenStream {
        let ident = &self.ident;
        let ty = &self.field_type;
        let field = ident.to_string();
        let calls = self.validators.iter().map(|validator| {
            quote! {
                errors.extend(
                    <#validator as ::typedconf::ConfigValidator<#ty>>::validate(&self.#ident)
                        .into_iter()
                        .map(|error| error.with_field_info(#type_name, #field)),
                );
            }
        });
        quote!(#(#calls)*)
    }
}

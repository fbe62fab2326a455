//! What discovery reports about annotated source elements.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::visit_mut::VisitMut;
use syn::{Item, Signature, TraitItem, Visibility};

use crate::attrs::{find_attr, TypeAttrs, TypeParam, ValueAttrs, CONFIG_VALUE};
use crate::error::UsageError;
use crate::names::ItemPath;
use crate::scope::Scope;

/// An item carrying `#[config_type]`.
///
/// Any item kind is recorded so that misuse on structs, functions and so on
/// can be reported; only public, non-generic traits pass the reducer.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub path: ItemPath,
    /// Item kind as written in messages (`"trait"`, `"struct"`, ...).
    pub kind: &'static str,
    pub public: bool,
    pub generic: bool,
    pub attrs: TypeAttrs,
    pub methods: Vec<DeclMethod>,
    pub span: Span,
}

/// A method of a declared trait, annotated or not.
#[derive(Debug, Clone)]
pub struct DeclMethod {
    pub path: ItemPath,
    /// Signature with every type path resolved.
    pub sig: Signature,
    /// Has a default body.
    pub provided: bool,
    pub attrs: Option<ValueAttrs>,
    pub span: Span,
}

/// An element carrying `#[config_value]`, wherever it appears.
#[derive(Debug, Clone)]
pub struct ValueElement {
    pub path: ItemPath,
    pub is_method: bool,
    /// The directly enclosing item carries `#[config_type]`.
    pub enclosed: bool,
    pub span: Span,
}

impl ValueElement {
    /// Accessor name, used for the global uniqueness check.
    pub fn name(&self) -> &str {
        self.path.name()
    }
}

impl Declaration {
    /// Build the declaration for `item`, resolving the types of its
    /// signatures and attribute parameters against `scope`.
    pub fn from_item(item: &Item, scope: &Scope, mut attrs: TypeAttrs) -> Result<Self, UsageError> {
        resolve_param(scope, &mut attrs.validated_by);

        let Item::Trait(item) = item else {
            let (kind, name, span) = describe(item);
            return Ok(Self {
                path: scope.module().child(name),
                kind,
                public: matches!(item_visibility(item), Some(Visibility::Public(_))),
                generic: false,
                attrs,
                methods: Vec::new(),
                span,
            });
        };

        let path = scope.item(&item.ident);
        let methods = item
            .items
            .iter()
            .filter_map(|trait_item| match trait_item {
                TraitItem::Fn(method) => Some(method),
                _ => None,
            })
            .map(|method| -> Result<DeclMethod, UsageError> {
                let method_path = path.child(method.sig.ident.to_string());
                let attrs = match find_attr(&method.attrs, CONFIG_VALUE) {
                    Some(attr) => {
                        let mut attrs = ValueAttrs::from_attr(attr)
                            .map_err(|e| UsageError::from_syn(&method_path, &e))?;
                        resolve_param(scope, &mut attrs.mapper);
                        resolve_param(scope, &mut attrs.validated_by);
                        Some(attrs)
                    }
                    None => None,
                };
                let mut sig = method.sig.clone();
                scope.resolver().visit_signature_mut(&mut sig);
                Ok(DeclMethod {
                    path: method_path,
                    sig,
                    provided: method.default.is_some(),
                    attrs,
                    span: method.sig.ident.span(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            path,
            kind: "trait",
            public: matches!(item.vis, Visibility::Public(_)),
            generic: !item.generics.params.is_empty(),
            attrs,
            methods,
            span: item.ident.span(),
        })
    }

    pub fn is_trait(&self) -> bool {
        self.kind == "trait"
    }
}

fn resolve_param(scope: &Scope, param: &mut TypeParam) {
    match param {
        TypeParam::Absent => {}
        TypeParam::One(ty) => scope.resolve_type(ty),
        TypeParam::Many(types) => types.iter_mut().for_each(|ty| scope.resolve_type(ty)),
    }
}

/// Kind and name of a non-trait item, for messages.
/// Kind, name and the span of the name of an item that is not a trait.
fn describe(item: &Item) -> (&'static str, String, Span) {
    let named = |kind, ident: &syn::Ident| (kind, ident.to_string(), ident.span());
    match item {
        Item::Struct(item) => named("struct", &item.ident),
        Item::Enum(item) => named("enum", &item.ident),
        Item::Union(item) => named("union", &item.ident),
        Item::Fn(item) => named("function", &item.sig.ident),
        Item::Mod(item) => named("module", &item.ident),
        Item::Const(item) => named("constant", &item.ident),
        Item::Static(item) => named("static", &item.ident),
        Item::Type(item) => named("type alias", &item.ident),
        Item::TraitAlias(item) => named("trait alias", &item.ident),
        Item::Impl(item) => ("impl", impl_name(item), item.self_ty.span()),
        _ => ("item", "<item>".to_string(), item.span()),
    }
}

fn item_visibility(item: &Item) -> Option<&Visibility> {
    match item {
        Item::Struct(item) => Some(&item.vis),
        Item::Enum(item) => Some(&item.vis),
        Item::Union(item) => Some(&item.vis),
        Item::Fn(item) => Some(&item.vis),
        Item::Mod(item) => Some(&item.vis),
        Item::Const(item) => Some(&item.vis),
        Item::Static(item) => Some(&item.vis),
        Item::Type(item) => Some(&item.vis),
        Item::TraitAlias(item) => Some(&item.vis),
        Item::Trait(item) => Some(&item.vis),
        _ => None,
    }
}

/// Name used for the methods of an impl block: the implementing type.
pub(crate) fn impl_name(item: &syn::ItemImpl) -> String {
    match &*item.self_ty {
        syn::Type::Path(ty) => ty
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_else(|| "<impl>".to_string()),
        _ => "<impl>".to_string(),
    }
}

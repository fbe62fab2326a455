//! Discovery of annotated elements in parsed source files.

use std::collections::{BTreeMap, BTreeSet};

use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, ImplItem, Item, Meta, Token, TraitItem};
use tracing::debug;

use crate::attrs::{find_attr, TypeAttrs, CONFIG_TYPE, CONFIG_VALUE};
use crate::error::UsageError;
use crate::model::{impl_name, Declaration, ValueElement};
use crate::names::ItemPath;
use crate::scope::Scope;

/// Everything found in one or more source files.
#[derive(Debug, Default)]
pub struct Discovered {
    pub declarations: Vec<Declaration>,
    pub values: Vec<ValueElement>,
    /// Absolute names of every `enum` item.
    pub enums: BTreeSet<ItemPath>,
    /// Every name brought in by a `use`, mapped to what it names.
    pub aliases: BTreeMap<ItemPath, ItemPath>,
    /// Attribute arguments that failed to parse.
    pub errors: Vec<UsageError>,
}

impl Discovered {
    /// Walk `file` as the contents of `module`, including inline `mod` blocks.
    pub fn scan(&mut self, file: &syn::File, module: ItemPath) {
        self.walk(&file.items, module);
    }

    pub fn extend(&mut self, other: Discovered) {
        self.declarations.extend(other.declarations);
        self.values.extend(other.values);
        self.enums.extend(other.enums);
        self.aliases.extend(other.aliases);
        self.errors.extend(other.errors);
    }

    fn walk(&mut self, items: &[Item], module: ItemPath) {
        let scope = Scope::of_items(module, items);
        for (alias, target) in scope.imports() {
            self.aliases.insert(alias, target.clone());
        }
        for item in items.iter().filter(|item| !cfg_excluded(item_attrs(item))) {
            if let Some(attr) = find_attr(item_attrs(item), CONFIG_TYPE) {
                self.declare(item, attr, &scope);
            }
            self.collect_values(item, &scope);

            match item {
                Item::Enum(item) => {
                    self.enums.insert(scope.item(&item.ident));
                }
                Item::Mod(item) => {
                    if let Some((_, items)) = &item.content {
                        self.walk(items, scope.item(&item.ident));
                    }
                }
                _ => {}
            }
        }
    }

    fn declare(&mut self, item: &Item, attr: &Attribute, scope: &Scope) {
        let declared = TypeAttrs::from_attr(attr)
            .map_err(|e| UsageError::from_syn(&scope.module().child(item_label(item)), &e))
            .and_then(|attrs| Declaration::from_item(item, scope, attrs));
        match declared {
            Ok(declaration) => {
                debug!(declaration = %declaration.path, kind = declaration.kind, "found config_type");
                self.declarations.push(declaration);
            }
            Err(error) => self.errors.push(error),
        }
    }

    fn collect_values(&mut self, item: &Item, scope: &Scope) {
        let enclosed = find_attr(item_attrs(item), CONFIG_TYPE).is_some();
        match item {
            Item::Trait(item) => {
                let owner = scope.item(&item.ident);
                for trait_item in &item.items {
                    let (attrs, name, is_method) = match trait_item {
                        TraitItem::Fn(f) => (&f.attrs, &f.sig.ident, true),
                        TraitItem::Const(c) => (&c.attrs, &c.ident, false),
                        TraitItem::Type(t) => (&t.attrs, &t.ident, false),
                        _ => continue,
                    };
                    self.value(attrs, owner.child(name.to_string()), is_method, enclosed, name.span());
                }
            }
            Item::Impl(item) => {
                let owner = scope.module().child(impl_name(item));
                for impl_item in &item.items {
                    let (attrs, name, is_method) = match impl_item {
                        ImplItem::Fn(f) => (&f.attrs, &f.sig.ident, true),
                        ImplItem::Const(c) => (&c.attrs, &c.ident, false),
                        ImplItem::Type(t) => (&t.attrs, &t.ident, false),
                        _ => continue,
                    };
                    self.value(attrs, owner.child(name.to_string()), is_method, enclosed, name.span());
                }
            }
            Item::Struct(item) => {
                let owner = scope.item(&item.ident);
                for (index, field) in item.fields.iter().enumerate() {
                    let name = field
                        .ident
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| index.to_string());
                    self.value(&field.attrs, owner.child(name), false, enclosed, field.span());
                }
            }
            Item::Fn(item) => {
                self.value(&item.attrs, scope.item(&item.sig.ident), false, false, item.sig.ident.span());
            }
            Item::Const(item) => {
                self.value(&item.attrs, scope.item(&item.ident), false, false, item.ident.span());
            }
            Item::Static(item) => {
                self.value(&item.attrs, scope.item(&item.ident), false, false, item.ident.span());
            }
            _ => {}
        }
    }

    fn value(&mut self, attrs: &[Attribute], path: ItemPath, is_method: bool, enclosed: bool, span: proc_macro2::Span) {
        if find_attr(attrs, CONFIG_VALUE).is_some() {
            self.values.push(ValueElement {
                path,
                is_method,
                enclosed,
                span,
            });
        }
    }
}

/// Every enum in `enums` under each name `aliases` gives it, re-exports of
/// re-exports and renamed modules included.
pub fn enums_with_aliases(enums: &BTreeSet<ItemPath>, aliases: &BTreeMap<ItemPath, ItemPath>) -> BTreeSet<ItemPath> {
    let mut known = enums.clone();
    // One more level of re-export per pass; a chain cannot be longer than
    // the number of aliases, which also stops `use` cycles.
    for _ in 0..=aliases.len() {
        let mut found = Vec::new();
        for (alias, target) in aliases {
            for name in &known {
                if let Some(rest) = name.strip_prefix(target) {
                    let aliased = alias.join(rest);
                    if !known.contains(&aliased) {
                        found.push(aliased);
                    }
                }
            }
        }
        if found.is_empty() {
            break;
        }
        known.extend(found);
    }
    known
}

/// Whether `#[cfg(..)]` rules the item out of a normal, non-test build.
/// Predicates that depend on the build configuration count as enabled.
fn cfg_excluded(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("cfg"))
        .filter_map(|attr| attr.parse_args::<Meta>().ok())
        .any(|meta| cfg_value(&meta) == Some(false))
}

/// `Some` when the predicate is decided without knowing the build
/// configuration: `test` is off, everything else is unknown.
fn cfg_value(meta: &Meta) -> Option<bool> {
    match meta {
        Meta::Path(path) if path.is_ident("test") => Some(false),
        Meta::List(list) => {
            let nested = list
                .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
                .ok()?;
            let values: Vec<Option<bool>> = nested.iter().map(cfg_value).collect();
            if list.path.is_ident("not") {
                match values.as_slice() {
                    [value] => value.map(|value| !value),
                    _ => None,
                }
            } else if list.path.is_ident("all") {
                if values.contains(&Some(false)) {
                    Some(false)
                } else if values.contains(&None) {
                    None
                } else {
                    Some(true)
                }
            } else if list.path.is_ident("any") {
                if values.contains(&Some(true)) {
                    Some(true)
                } else if values.contains(&None) {
                    None
                } else {
                    Some(false)
                }
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Attributes of any item kind that can carry them.
pub(crate) fn item_attrs(item: &Item) -> &[Attribute] {
    match item {
        Item::Const(item) => &item.attrs,
        Item::Enum(item) => &item.attrs,
        Item::ExternCrate(item) => &item.attrs,
        Item::Fn(item) => &item.attrs,
        Item::ForeignMod(item) => &item.attrs,
        Item::Impl(item) => &item.attrs,
        Item::Macro(item) => &item.attrs,
        Item::Mod(item) => &item.attrs,
        Item::Static(item) => &item.attrs,
        Item::Struct(item) => &item.attrs,
        Item::Trait(item) => &item.attrs,
        Item::TraitAlias(item) => &item.attrs,
        Item::Type(item) => &item.attrs,
        Item::Union(item) => &item.attrs,
        Item::Use(item) => &item.attrs,
        _ => &[],
    }
}

fn item_label(item: &Item) -> String {
    match item {
        Item::Trait(item) => item.ident.to_string(),
        Item::Struct(item) => item.ident.to_string(),
        Item::Enum(item) => item.ident.to_string(),
        Item::Fn(item) => item.sig.ident.to_string(),
        Item::Impl(item) => impl_name(item),
        _ => "<item>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn discover(file: syn::File) -> Discovered {
        let mut discovered = Discovered::default();
        discovered.scan(&file, ItemPath::crate_root());
        discovered
    }

    #[test]
    fn test_discovers_declarations_values_and_enums() {
        let discovered = discover(parse_quote! {
            use typedconf::config_type;

            #[config_type(context_path = "db")]
            pub trait DatabaseConfig {
                #[config_value(path = "url")]
                fn url(&self) -> String;
            }

            pub enum Mode { Fast, Slow }

            mod nested {
                #[typedconf::config_type]
                pub trait Nested {}

                pub enum Level { Low }
            }
        });

        let names: Vec<String> = discovered.declarations.iter().map(|d| d.path.to_string()).collect();
        assert_eq!(names, ["crate::DatabaseConfig", "crate::nested::Nested"]);
        assert_eq!(discovered.declarations[0].attrs.context_path, "db");

        assert_eq!(discovered.values.len(), 1);
        assert_eq!(discovered.values[0].path.to_string(), "crate::DatabaseConfig::url");
        assert!(discovered.values[0].is_method);
        assert!(discovered.values[0].enclosed);

        assert!(discovered.enums.contains(&ItemPath::parse("crate::Mode")));
        assert!(discovered.enums.contains(&ItemPath::parse("crate::nested::Level")));
        assert!(discovered.errors.is_empty());
    }

    #[test]
    fn test_values_outside_config_types() {
        let discovered = discover(parse_quote! {
            pub trait Plain {
                #[config_value(path = "a")]
                fn a(&self) -> String;
            }

            #[config_type]
            pub struct Settings {
                #[config_value(path = "b")]
                b: String,
            }

            impl Settings {
                #[config_value(path = "c")]
                fn c(&self) -> String { String::new() }
            }
        });

        let summary: Vec<(String, bool, bool)> = discovered
            .values
            .iter()
            .map(|v| (v.path.to_string(), v.is_method, v.enclosed))
            .collect();
        assert_eq!(
            summary,
            [
                ("crate::Plain::a".to_string(), true, false),
                ("crate::Settings::b".to_string(), false, true),
                ("crate::Settings::c".to_string(), true, false),
            ]
        );
        assert_eq!(discovered.declarations[0].kind, "struct");
    }

    #[test]
    fn test_malformed_type_attribute_is_collected() {
        let discovered = discover(parse_quote! {
            #[config_type(context = "x")]
            pub trait Broken {}
        });

        assert!(discovered.declarations.is_empty());
        assert_eq!(discovered.errors.len(), 1);
        assert_eq!(discovered.errors[0].names()[0].to_string(), "crate::Broken");
    }

    #[test]
    fn test_test_only_items_are_skipped() {
        let discovered = discover(parse_quote! {
            #[cfg(test)]
            mod tests {
                #[config_type]
                pub trait OnlyInTests {}
            }

            #[cfg(all(test, feature = "x"))]
            pub enum TestLevel { Low }

            #[cfg(not(test))]
            #[config_type]
            pub trait OutsideTests {}

            #[cfg(feature = "extra")]
            #[config_type]
            pub trait Extra {}
        });

        let names: Vec<String> = discovered.declarations.iter().map(|d| d.path.to_string()).collect();
        assert_eq!(names, ["crate::OutsideTests", "crate::Extra"]);
        assert!(discovered.enums.is_empty());
    }

    #[test]
    fn test_enums_under_every_alias() {
        let discovered = discover(parse_quote! {
            pub mod db {
                pub enum Mode { Primary }
            }
            pub mod api {
                pub use crate::db::Mode as DbMode;
            }
            pub use api::DbMode;
            pub use db as storage;
        });

        let enums = enums_with_aliases(&discovered.enums, &discovered.aliases);
        let names: Vec<String> = enums.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["crate::DbMode", "crate::api::DbMode", "crate::db::Mode", "crate::storage::Mode"]
        );
    }

    #[test]
    fn test_alias_cycles_terminate() {
        let enums: BTreeSet<ItemPath> = [ItemPath::parse("crate::m::E")].into();
        let aliases: BTreeMap<ItemPath, ItemPath> =
            [(ItemPath::parse("crate::m::m"), ItemPath::parse("crate::m"))].into();
        let known = enums_with_aliases(&enums, &aliases);
        assert!(known.contains(&ItemPath::parse("crate::m::m::E")));
        assert!(known.len() <= 3);
    }
}

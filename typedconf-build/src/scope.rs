//! Resolution of type paths against the items and imports of a module.
//!
//! The generated struct lives in a single file included somewhere in the
//! crate, so every type it mentions must be written in a form that resolves
//! from anywhere: `crate::...` for local items and `::dep::...` for items of
//! other crates. Names that are neither imported nor declared in the module
//! (prelude types, primitives, glob imports) are left as written.

use std::collections::BTreeMap;

use syn::visit_mut::{self, VisitMut};
use syn::{Item, Path, PathArguments, UseTree};

use crate::names::ItemPath;

#[derive(Debug, Clone)]
pub struct Scope {
    module: ItemPath,
    names: BTreeMap<String, ItemPath>,
}

impl Scope {
    /// A scope that resolves nothing but `self::` / `super::`.
    pub fn empty(module: ItemPath) -> Self {
        Self {
            module,
            names: BTreeMap::new(),
        }
    }

    /// Collect the names introduced by the items of one module.
    pub fn of_items(module: ItemPath, items: &[Item]) -> Self {
        let mut scope = Self::empty(module);
        for name in items.iter().filter_map(item_name) {
            let path = scope.module.child(name.clone());
            scope.names.insert(name, path);
        }
        for item in items {
            if let Item::Use(item) = item {
                scope.add_use(&[], &item.tree, item.leading_colon.is_some());
            }
        }
        scope
    }

    pub fn module(&self) -> &ItemPath {
        &self.module
    }

    /// Absolute name of an item declared in this module.
    pub fn item(&self, name: &syn::Ident) -> ItemPath {
        self.module.child(name.to_string())
    }

    /// Names this module imports, as `(module::name, target)`. Lets a type
    /// reached through `pub use` be matched against where it is declared.
    pub fn imports(&self) -> impl Iterator<Item = (ItemPath, &ItemPath)> + '_ {
        self.names.iter().filter_map(|(name, target)| {
            let alias = self.module.child(name.clone());
            (alias != *target).then_some((alias, target))
        })
    }

    fn add_use(&mut self, prefix: &[String], tree: &UseTree, global: bool) {
        match tree {
            UseTree::Path(path) => {
                let mut prefix = prefix.to_vec();
                prefix.push(path.ident.to_string());
                self.add_use(&prefix, &path.tree, global);
            }
            UseTree::Name(name) => {
                let text = name.ident.to_string();
                if text == "self" {
                    if let Some(last) = prefix.last() {
                        let target = self.use_target(prefix, global);
                        self.names.insert(last.clone(), target);
                    }
                } else {
                    let mut full = prefix.to_vec();
                    full.push(text.clone());
                    let target = self.use_target(&full, global);
                    self.names.insert(text, target);
                }
            }
            UseTree::Rename(rename) => {
                let alias = rename.rename.to_string();
                if alias == "_" {
                    return;
                }
                let mut full = prefix.to_vec();
                full.push(rename.ident.to_string());
                let target = self.use_target(&full, global);
                self.names.insert(alias, target);
            }
            UseTree::Group(group) => {
                for tree in &group.items {
                    self.add_use(prefix, tree, global);
                }
            }
            UseTree::Glob(_) => {}
        }
    }

    /// Absolute target of a `use` path.
    fn use_target(&self, segments: &[String], global: bool) -> ItemPath {
        if global {
            return ItemPath::new(segments.iter().cloned());
        }
        match segments.split_first() {
            Some((first, rest)) if first == "crate" => ItemPath::crate_root().join(rest),
            Some((first, _)) if first == "self" || first == "super" => {
                let (base, consumed) = self.relative_base(segments);
                base.map(|base| base.join(&segments[consumed..]))
                    .unwrap_or_else(|| ItemPath::new(segments.iter().cloned()))
            }
            // A name already in scope shadows an extern crate of the same name.
            Some((first, rest)) => match self.names.get(first) {
                Some(target) => target.join(rest),
                None => ItemPath::new(segments.iter().cloned()),
            },
            None => ItemPath::new(segments.iter().cloned()),
        }
    }

    /// Module addressed by a run of leading `self` / `super` segments and how
    /// many segments it consumed. `None` when `super` climbs past the root.
    fn relative_base(&self, segments: &[String]) -> (Option<ItemPath>, usize) {
        let mut base = Some(self.module.clone());
        let mut consumed = 0;
        for segment in segments {
            match segment.as_str() {
                "self" if consumed == 0 => {}
                "super" => base = base.and_then(|module| module.parent()),
                _ => break,
            }
            consumed += 1;
        }
        (base, consumed)
    }

    /// Rewrite `path` in place into its absolute form.
    pub fn resolve_path(&self, path: &mut Path) {
        if path.leading_colon.is_some() {
            return;
        }
        let Some(first) = path.segments.first() else {
            return;
        };
        let first_name = first.ident.to_string();

        let (base, consumed, arguments) = match first_name.as_str() {
            "crate" | "Self" => return,
            "self" | "super" => {
                let names: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
                match self.relative_base(&names) {
                    (Some(base), consumed) if consumed < names.len() => (base, consumed, PathArguments::None),
                    _ => return,
                }
            }
            _ => match self.names.get(&first_name) {
                Some(target) => (target.clone(), 1, first.arguments.clone()),
                None => return,
            },
        };

        let mut resolved = base.to_path();
        if let Some(last) = resolved.segments.last_mut() {
            if !matches!(arguments, PathArguments::None) {
                last.arguments = arguments;
            }
        }
        for segment in path.segments.iter().skip(consumed) {
            resolved.segments.push(segment.clone());
        }
        *path = resolved;
    }

    /// A visitor resolving every path it walks over (types, generic
    /// arguments, bounds).
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver { scope: self }
    }

    pub fn resolve_type(&self, ty: &mut syn::Type) {
        self.resolver().visit_type_mut(ty);
    }
}

/// Walks a syntax node and resolves each path it finds.
pub struct Resolver<'a> {
    scope: &'a Scope,
}

impl VisitMut for Resolver<'_> {
    fn visit_path_mut(&mut self, path: &mut Path) {
        self.scope.resolve_path(path);
        visit_mut::visit_path_mut(self, path);
    }
}

fn item_name(item: &Item) -> Option<String> {
    let ident = match item {
        Item::Const(item) => &item.ident,
        Item::Enum(item) => &item.ident,
        Item::Fn(item) => &item.sig.ident,
        Item::Mod(item) => &item.ident,
        Item::Static(item) => &item.ident,
        Item::Struct(item) => &item.ident,
        Item::Trait(item) => &item.ident,
        Item::TraitAlias(item) => &item.ident,
        Item::Type(item) => &item.ident,
        Item::Union(item) => &item.ident,
        _ => return None,
    };
    Some(ident.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::display_tokens;
    use syn::{parse_quote, Type};

    fn scope(module: &str, items: Vec<Item>) -> Scope {
        Scope::of_items(ItemPath::parse(module), &items)
    }

    fn resolved(scope: &Scope, mut ty: Type) -> String {
        scope.resolve_type(&mut ty);
        display_tokens(&ty)
    }

    #[test]
    fn test_imports_become_absolute() {
        let scope = scope(
            "crate::server",
            vec![
                parse_quote!(use std::time::Duration;),
                parse_quote!(use crate::db::{Mode, Credentials as Creds};),
                parse_quote!(use typedconf::{self, NoMapper};),
            ],
        );

        assert_eq!(resolved(&scope, parse_quote!(Duration)), "::std::time::Duration");
        assert_eq!(resolved(&scope, parse_quote!(Mode)), "crate::db::Mode");
        assert_eq!(resolved(&scope, parse_quote!(Creds)), "crate::db::Credentials");
        assert_eq!(resolved(&scope, parse_quote!(NoMapper)), "::typedconf::NoMapper");
        assert_eq!(resolved(&scope, parse_quote!(typedconf::Config)), "::typedconf::Config");
    }

    #[test]
    fn test_generic_arguments_are_resolved() {
        let scope = scope("crate", vec![parse_quote!(use std::time::Duration;)]);
        assert_eq!(
            resolved(&scope, parse_quote!(Option<Vec<Duration>>)),
            "Option<Vec<::std::time::Duration>>"
        );
    }

    #[test]
    fn test_local_items_and_relative_paths() {
        let scope = scope(
            "crate::a::b",
            vec![parse_quote!(pub enum Level { Low, High }), parse_quote!(mod inner {})],
        );

        assert_eq!(resolved(&scope, parse_quote!(Level)), "crate::a::b::Level");
        assert_eq!(resolved(&scope, parse_quote!(inner::Kind)), "crate::a::b::inner::Kind");
        assert_eq!(resolved(&scope, parse_quote!(self::Level)), "crate::a::b::Level");
        assert_eq!(resolved(&scope, parse_quote!(super::Other)), "crate::a::Other");
        assert_eq!(resolved(&scope, parse_quote!(super::super::Root)), "crate::Root");
    }

    #[test]
    fn test_use_through_local_module() {
        let scope = scope(
            "crate",
            vec![parse_quote!(mod db {}), parse_quote!(use db::Mode;)],
        );
        assert_eq!(resolved(&scope, parse_quote!(Mode)), "crate::db::Mode");
    }

    #[test]
    fn test_unknown_names_are_left_alone() {
        let scope = scope("crate", vec![parse_quote!(use std::collections::*;)]);
        assert_eq!(resolved(&scope, parse_quote!(String)), "String");
        assert_eq!(resolved(&scope, parse_quote!(HashMap<String, i32>)), "HashMap<String, i32>");
        assert_eq!(resolved(&scope, parse_quote!(crate::Thing)), "crate::Thing");
        assert_eq!(resolved(&scope, parse_quote!(::serde_json::Value)), "::serde_json::Value");
    }

    #[test]
    fn test_imports_list_only_imported_names() {
        let scope = scope(
            "crate",
            vec![
                parse_quote!(pub mod db {}),
                parse_quote!(pub use db::Mode;),
                parse_quote!(use std::time::Duration as Timeout;),
            ],
        );
        let imports: Vec<(String, String)> = scope
            .imports()
            .map(|(alias, target)| (alias.to_string(), target.to_string()))
            .collect();
        assert_eq!(
            imports,
            [
                ("crate::Mode".to_string(), "crate::db::Mode".to_string()),
                ("crate::Timeout".to_string(), "std::time::Duration".to_string()),
            ]
        );
    }

    #[test]
    fn test_underscore_imports_are_skipped() {
        let scope = scope("crate", vec![parse_quote!(use std::fmt::Write as _;)]);
        assert_eq!(resolved(&scope, parse_quote!(Write)), "Write");
    }
}

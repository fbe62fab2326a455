//! The pass orchestrator: accumulates discovery rounds, validates them and
//! reduces the declarations into one [`TypeSpec`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::discover::{enums_with_aliases, Discovered};
use crate::error::UsageError;
use crate::model::{Declaration, ValueElement};
use crate::names::ItemPath;
use crate::reducer;
use crate::type_spec::TypeSpec;

/// Declarations and value elements seen so far, keyed by absolute name.
#[derive(Debug, Default)]
pub struct Processor {
    declarations: BTreeMap<ItemPath, Declaration>,
    values: BTreeMap<ItemPath, ValueElement>,
    enums: BTreeSet<ItemPath>,
    aliases: BTreeMap<ItemPath, ItemPath>,
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register enums that discovery cannot see, such as ones from other
    /// crates.
    pub fn add_enums(&mut self, enums: impl IntoIterator<Item = ItemPath>) {
        self.enums.extend(enums);
    }

    /// Run one round.
    ///
    /// Returns `Ok(None)` when the round added no declaration to an already
    /// populated accumulator, so there is nothing new to emit. The first
    /// round always produces a spec, even an empty one.
    pub fn process(&mut self, round: Discovered) -> Result<Option<TypeSpec>, Vec<UsageError>> {
        let Discovered {
            declarations,
            values,
            enums,
            aliases,
            errors,
        } = round;

        let populated = !self.declarations.is_empty();
        let mut added = false;
        for declaration in declarations {
            if !self.declarations.contains_key(&declaration.path) {
                added = true;
                self.declarations.insert(declaration.path.clone(), declaration);
            }
        }
        for value in values {
            self.values.entry(value.path.clone()).or_insert(value);
        }
        self.enums.extend(enums);
        self.aliases.extend(aliases);

        if !errors.is_empty() {
            return Err(errors);
        }
        if !added && populated {
            debug!("no new config types in this round");
            return Ok(None);
        }

        let values: Vec<ValueElement> = self.values.values().cloned().collect();
        reducer::validate_values(&values)?;

        debug!(
            declarations = self.declarations.len(),
            values = values.len(),
            "reducing config types"
        );
        let enums = enums_with_aliases(&self.enums, &self.aliases);
        reducer::reduce(self.declarations.values(), &enums).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn round(file: syn::File) -> Discovered {
        let mut discovered = Discovered::default();
        discovered.scan(&file, ItemPath::crate_root());
        discovered
    }

    #[test]
    fn test_first_empty_round_emits_empty_spec() {
        let mut processor = Processor::new();
        let spec = processor.process(Discovered::default()).unwrap();
        assert_eq!(spec, Some(TypeSpec::empty()));
    }

    #[test]
    fn test_rounds_without_new_declarations_are_skipped() {
        let mut processor = Processor::new();
        let first = round(parse_quote! {
            #[config_type]
            pub trait A {
                #[config_value(path = "a")]
                fn a(&self) -> String;
            }
        });
        let spec = processor.process(first).unwrap().unwrap();
        assert_eq!(spec.properties().count(), 1);

        assert_eq!(processor.process(Discovered::default()).unwrap(), None);

        let third = round(parse_quote! {
            mod b {
                #[config_type]
                pub trait B {
                    #[config_value(path = "b")]
                    fn b(&self) -> i64;
                }
            }
        });
        let spec = processor.process(third).unwrap().unwrap();
        let interfaces: Vec<String> = spec.super_interfaces().iter().map(ToString::to_string).collect();
        assert_eq!(interfaces, ["crate::A", "crate::b::B"]);
        assert_eq!(spec.properties().count(), 2);
    }

    #[test]
    fn test_duplicates_across_rounds_are_reported() {
        let mut processor = Processor::new();
        processor
            .process(round(parse_quote! {
                #[config_type]
                pub trait A {
                    #[config_value(path = "a.port")]
                    fn port(&self) -> i32;
                }
            }))
            .unwrap();

        let errors = processor
            .process(round(parse_quote! {
                mod b {
                    #[config_type]
                    pub trait B {
                        #[config_value(path = "b.port")]
                        fn port(&self) -> i32;
                    }
                }
            }))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].names().len(), 2);
    }

    #[test]
    fn test_discovery_errors_abort_the_round() {
        let mut processor = Processor::new();
        let errors = processor
            .process(round(parse_quote! {
                #[config_type(unknown)]
                pub trait A {}
            }))
            .unwrap_err();
        assert!(errors[0].message().contains("unsupported config_type attribute"));
    }

    #[test]
    fn test_enums_reached_through_reexports() {
        let mut processor = Processor::new();
        let spec = processor
            .process(round(parse_quote! {
                pub mod db {
                    pub enum Mode { Primary, Replica }
                }
                pub use db::Mode;

                mod app {
                    use crate::Mode;

                    #[config_type]
                    pub trait App {
                        #[config_value(path = "mode")]
                        fn mode(&self) -> Mode;
                    }
                }
            }))
            .unwrap()
            .unwrap();
        let (_, property) = spec.properties().next().unwrap();
        assert_eq!(property.mapper, crate::mapper::Mapper::Enum(parse_quote!(crate::Mode)));
    }

    #[test]
    fn test_registered_enums() {
        let mut processor = Processor::new();
        processor.add_enums([ItemPath::parse("log::Level")]);
        let spec = processor
            .process(round(parse_quote! {
                #[config_type]
                pub trait Logging {
                    #[config_value(path = "level")]
                    fn level(&self) -> log::Level;
                }
            }))
            .unwrap()
            .unwrap();
        let (_, property) = spec.properties().next().unwrap();
        assert_eq!(property.mapper, crate::mapper::Mapper::Enum(parse_quote!(log::Level)));
    }
}

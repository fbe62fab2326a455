//! Attribute macros for typedconf

use proc_macro::TokenStream;

mod expand;

/// Marks a trait as part of the generated configuration struct.
///
/// The trait is emitted unchanged apart from its `#[config_value]`
/// attributes, which are consumed here. Misuse that can be seen from the
/// trait alone (not a trait, not public, generic, unannotated abstract
/// methods, malformed parameters) is reported at the offending span.
/// Everything else is checked by `typedconf-build` when the struct is
/// generated.
///
/// # Supported Attributes
///
/// - `context_path = "a.b"`: prefix of every property path
/// - `validated_by(A, B)` or `validated_by = A`: type-level validators
/// - `bean_fallback` or `bean_fallback = bool`: read unsupported types with serde
///
/// # Example
///
/// See the `typedconf` crate documentation for usage examples.
#[proc_macro_attribute]
pub fn config_type(args: TokenStream, item: TokenStream) -> TokenStream {
    expand::config_type(args.into(), item.into()).into()
}

/// Marks a trait method as a configuration property.
///
/// Only meaningful inside a `#[config_type]` trait, which removes it before
/// this macro would run. Reaching this macro therefore means the attribute
/// is misplaced.
///
/// # Supported Attributes
///
/// - `path = "key"` (required): location relative to the trait's `context_path`
/// - `mapper = M`: custom `ConfigMapper<T>`
/// - `validated_by(A, B)` or `validated_by = A`: field-level validators
#[proc_macro_attribute]
pub fn config_value(args: TokenStream, item: TokenStream) -> TokenStream {
    expand::config_value(args.into(), item.into()).into()
}

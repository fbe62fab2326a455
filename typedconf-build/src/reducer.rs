//! Checks declarations and folds them into one [`TypeSpec`].

use std::collections::{BTreeMap, BTreeSet};

use syn::{FnArg, ReturnType, Signature};
use tracing::debug;

use crate::attrs::{CONFIG_TYPE, CONFIG_VALUE};
use crate::error::UsageError;
use crate::extract::{Capability, Extractor, TypeRef};
use crate::model::{DeclMethod, Declaration, ValueElement};
use crate::names::ItemPath;
use crate::property::PropertySpec;
use crate::type_spec::TypeSpec;

/// Structural checks on one declaration that need nothing but the
/// declaration itself. The first three reject the declaration outright,
/// before any method is looked at.
pub fn check_declaration(declaration: &Declaration) -> Result<(), Vec<UsageError>> {
    let reject = |message: String| Err(vec![UsageError::new(&declaration.path, declaration.span, message)]);

    if !declaration.is_trait() {
        return reject(format!("{CONFIG_TYPE} annotation can only be used on traits"));
    }
    if !declaration.public {
        return reject(format!("{CONFIG_TYPE} annotation cannot be used on non public traits"));
    }
    if declaration.generic {
        return reject(format!("{CONFIG_TYPE} annotation does not support generic traits"));
    }

    let mut errors = Vec::new();
    if let Err(error) = type_validators(declaration) {
        errors.push(error);
    }
    for method in &declaration.methods {
        if method.provided {
            continue;
        }
        if method.attrs.is_none() {
            errors.push(UsageError::new(
                &method.path,
                method.span,
                format!("Abstract method needs to be annotated with {CONFIG_VALUE} or have default implementation"),
            ));
        } else if let Some(problem) = accessor_problem(&method.sig) {
            errors.push(UsageError::new(&method.path, method.span, problem));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Why `sig` cannot be a generated accessor, if it cannot.
fn accessor_problem(sig: &Signature) -> Option<String> {
    if sig.asyncness.is_some() || sig.unsafety.is_some() || sig.constness.is_some() {
        return Some(format!("{CONFIG_VALUE} accessor cannot be async, unsafe or const"));
    }
    if !sig.generics.params.is_empty() {
        return Some(format!("{CONFIG_VALUE} accessor cannot have generic parameters"));
    }
    let takes_ref_self = matches!(
        sig.inputs.first(),
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none()
            && receiver.colon_token.is_none()
    );
    if !takes_ref_self || sig.inputs.len() != 1 {
        return Some(format!("{CONFIG_VALUE} accessor needs to take '&self' and nothing else"));
    }
    if matches!(sig.output, ReturnType::Default) {
        return Some(format!("{CONFIG_VALUE} accessor needs to return a value"));
    }
    None
}

fn type_validators(declaration: &Declaration) -> Result<Vec<TypeRef>, UsageError> {
    Extractor {
        param: "validated_by",
        capability: Capability::Validator,
        owner: &declaration.path,
        span: declaration.span,
    }
    .extract_many(&declaration.attrs.validated_by)
}

/// The spec of one declaration merged into `spec`.
///
/// Every problem found in the declaration is reported, not just the first.
pub fn accumulate(
    spec: TypeSpec,
    declaration: &Declaration,
    enums: &BTreeSet<ItemPath>,
) -> Result<TypeSpec, Vec<UsageError>> {
    check_declaration(declaration)?;

    let mut errors = Vec::new();
    let validators = type_validators(declaration).unwrap_or_default();
    let properties: Vec<PropertySpec> = declaration
        .methods
        .iter()
        .filter(|method| !method.provided)
        .filter_map(|method: &DeclMethod| {
            let attrs = method.attrs.as_ref()?;
            PropertySpec::new(declaration, method, attrs, enums)
                .map_err(|error| errors.push(error))
                .ok()
        })
        .collect();

    if !errors.is_empty() {
        return Err(errors);
    }

    debug!(
        declaration = %declaration.path,
        properties = properties.len(),
        validators = validators.len(),
        "accumulated config type"
    );
    Ok(spec.combine(TypeSpec::single(declaration.path.clone(), properties, validators)))
}

/// Fold every declaration into one spec, collecting the errors of all of
/// them.
pub fn reduce<'a>(
    declarations: impl IntoIterator<Item = &'a Declaration>,
    enums: &BTreeSet<ItemPath>,
) -> Result<TypeSpec, Vec<UsageError>> {
    let mut errors = Vec::new();
    let spec = declarations
        .into_iter()
        .fold(TypeSpec::empty(), |spec, declaration| {
            match accumulate(TypeSpec::empty(), declaration, enums) {
                Ok(single) => spec.combine(single),
                Err(found) => {
                    errors.extend(found);
                    spec
                }
            }
        });

    if errors.is_empty() {
        Ok(spec)
    } else {
        Err(errors)
    }
}

/// Checks over every `#[config_value]` element of the pass, run before
/// reduction. Each failing rule yields one error naming all offenders.
pub fn validate_values(values: &[ValueElement]) -> Result<(), Vec<UsageError>> {
    let mut errors = Vec::new();

    let non_methods: Vec<&ValueElement> = values.iter().filter(|v| !v.is_method).collect();
    if !non_methods.is_empty() {
        errors.push(UsageError::many(
            non_methods.iter().map(|v| (&v.path, v.span)),
            format!("{CONFIG_VALUE} can only be used on methods"),
        ));
    }

    let outside: Vec<&ValueElement> = values.iter().filter(|v| v.is_method && !v.enclosed).collect();
    if !outside.is_empty() {
        errors.push(UsageError::many(
            outside.iter().map(|v| (&v.path, v.span)),
            format!("{CONFIG_VALUE} needs to be enclosed by a type annotated with {CONFIG_TYPE}"),
        ));
    }

    let mut by_name: BTreeMap<&str, Vec<&ValueElement>> = BTreeMap::new();
    for value in values.iter().filter(|v| v.is_method) {
        by_name.entry(value.name()).or_default().push(value);
    }
    let duplicates: Vec<&ValueElement> = by_name
        .into_values()
        .filter(|group| group.len() > 1)
        .flatten()
        .collect();
    if !duplicates.is_empty() {
        errors.push(UsageError::many(
            duplicates.iter().map(|v| (&v.path, v.span)),
            format!(
                "{CONFIG_VALUE} cannot be used on multiple methods with the same name in different config type definitions"
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

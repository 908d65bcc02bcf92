//! Naming conventions linking serializers, backing models and entity types.
//!
//! A serializer named `FooSerializer` renders entities of type `Foo` and is
//! backed by the model named `Foo`. Entity type paths may carry a module
//! prefix (`app::models::Foo`) or use snake case (`foo_holder`); both are
//! normalised before the suffix is applied.

use convert_case::{Case, Casing};

///
/// CONSTANTS
///

/// Suffix every convention-named serializer carries.
pub const SERIALIZER_SUFFIX: &str = "Serializer";

/// Strip any leading module path (`app::models::Foo` becomes `Foo`).
#[must_use]
pub fn demodulize(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Convert a type name into its PascalCase form.
///
/// Names that are already PascalCase are returned untouched so acronyms
/// such as `HTTPLog` survive.
#[must_use]
pub fn camelize(name: &str) -> String {
    let already_pascal = name.chars().next().is_some_and(char::is_uppercase)
        && !name.contains(['_', '-', ' ']);

    if already_pascal {
        name.to_string()
    } else {
        name.to_case(Case::Pascal)
    }
}

/// Conventional serializer name for an entity type path.
#[must_use]
pub fn serializer_name_for(type_path: &str) -> String {
    format!("{}{SERIALIZER_SUFFIX}", camelize(demodulize(type_path)))
}

/// Conventional backing model name for a serializer name.
///
/// Everything before the first `Serializer` marker is the model name;
/// returns `None` when nothing precedes it.
#[must_use]
pub fn model_name_for(serializer_name: &str) -> Option<&str> {
    demodulize(serializer_name)
        .split(SERIALIZER_SUFFIX)
        .next()
        .filter(|name| !name.is_empty())
}

///
/// TESTS
///

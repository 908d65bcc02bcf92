use crate::{error::InternalError, render::ResolveError, render::Serializer};
use std::{fmt, sync::Arc};

///
/// PredicateFn
///

pub type PredicateFn = Arc<dyn Fn(&Serializer<'_>) -> bool + Send + Sync>;

///
/// Condition
///
/// Inclusion predicate for one field or relationship.
///
/// Always   → no condition declared.
/// Method   → named predicate declared on the serializer.
/// Closure  → inline predicate receiving the serializer.
/// Not      → negation (the `unless` form).
///

#[derive(Clone, Default)]
pub enum Condition {
    #[default]
    Always,
    Method(String),
    Closure(PredicateFn),
    Not(Box<Self>),
}

impl Condition {
    #[must_use]
    pub fn method(name: impl Into<String>) -> Self {
        Self::Method(name.into())
    }

    #[must_use]
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&Serializer<'_>) -> bool + Send + Sync + 'static,
    {
        Self::Closure(Arc::new(f))
    }

    /// Negate this condition.
    #[must_use]
    pub fn unless(self) -> Self {
        Self::Not(Box::new(self))
    }

    #[must_use]
    pub const fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }

    /// Named predicates this condition depends on.
    pub(crate) fn method_names(&self) -> Vec<&str> {
        match self {
            Self::Method(name) => vec![name.as_str()],
            Self::Not(inner) => inner.method_names(),
            Self::Always | Self::Closure(_) => Vec::new(),
        }
    }

    pub(crate) fn evaluate(&self, serializer: &Serializer<'_>) -> Result<bool, InternalError> {
        match self {
            Self::Always => Ok(true),
            Self::Closure(f) => Ok(f(serializer)),
            Self::Not(inner) => inner.evaluate(serializer).map(|b| !b),
            Self::Method(name) => {
                let type_error = |found: &str| -> InternalError {
                    ResolveError::ConditionType {
                        serializer: serializer.descriptor().name().to_string(),
                        condition: name.clone(),
                        found: found.to_string(),
                    }
                    .into()
                };

                let value = serializer
                    .call(name)
                    .ok_or_else(|| type_error("undefined method"))??;

                value.as_bool().ok_or_else(|| type_error(value.kind()))
            }
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::Method(name) => write!(f, "Method({name})"),
            Self::Closure(_) => write!(f, "Closure(..)"),
            Self::Not(inner) => write!(f, "Not({inner:?})"),
        }
    }
}

//! Build edges.

use super::{Value, Variable};
use crate::safe_str::{FormatError, Fragment, Renderable};
use indexmap::IndexMap;

/// A build statement linking outputs to a rule and its inputs.
///
/// ```
/// use ninja_synth::ir::BuildEdge;
///
/// let edge = BuildEdge::new(["main.o"], "cc")
///     .with_inputs(["main.c"])
///     .with_order_only(["gen/config.h"]);
/// assert_eq!(edge.rule, "cc");
/// assert_eq!(edge.inputs.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEdge {
    /// Files produced by the edge. Must be non-empty.
    pub outputs: Vec<Fragment>,
    /// Rule name, or [`super::PHONY`].
    pub rule: String,
    /// Explicit inputs, available to the command as `$in`.
    pub inputs: Vec<Fragment>,
    /// Inputs that trigger rebuilds but are not part of `$in`.
    pub implicit: Vec<Fragment>,
    /// Inputs that must exist first but never trigger rebuilds.
    pub order_only: Vec<Fragment>,
    /// Per-edge variable overrides, in insertion order.
    pub variables: IndexMap<Variable, Value>,
}

impl BuildEdge {
    /// An edge producing `outputs` with `rule`.
    #[must_use]
    pub fn new<I>(outputs: I, rule: impl Into<String>) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        Self {
            outputs: fragments(outputs),
            rule: rule.into(),
            inputs: Vec::new(),
            implicit: Vec::new(),
            order_only: Vec::new(),
            variables: IndexMap::new(),
        }
    }

    /// An edge producing `outputs` with the built-in phony rule.
    #[must_use]
    pub fn phony<I>(outputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        Self::new(outputs, super::PHONY)
    }

    /// Append explicit inputs.
    #[must_use]
    pub fn with_inputs<I>(mut self, inputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        self.inputs.extend(fragments(inputs));
        self
    }

    /// Append implicit inputs.
    #[must_use]
    pub fn with_implicit<I>(mut self, implicit: I) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        self.implicit.extend(fragments(implicit));
        self
    }

    /// Append order-only inputs.
    #[must_use]
    pub fn with_order_only<I>(mut self, order_only: I) -> Self
    where
        I: IntoIterator,
        I::Item: Renderable,
    {
        self.order_only.extend(fragments(order_only));
        self
    }

    /// Override `name` for this edge only.
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<Variable>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<(), FormatError> {
        self.outputs
            .iter()
            .chain(&self.inputs)
            .chain(&self.implicit)
            .chain(&self.order_only)
            .try_for_each(Fragment::validate)?;
        self.variables.values().try_for_each(Value::validate)
    }
}

fn fragments<I>(items: I) -> Vec<Fragment>
where
    I: IntoIterator,
    I::Item: Renderable,
{
    items.into_iter().map(|item| item.to_fragment()).collect()
}

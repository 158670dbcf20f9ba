//! Facet specifications and their resolution into domains.
//!
//! A facet assigns a table column to a role: one panel per value, one line
//! per value, or one slider stop per value. [`resolve`] turns a [`FacetSpec`]
//! into concrete, immutable [`Domains`] once, before any drawing happens.

use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::table::{ResultTable, Value};

/// Key identifying one domain entry. `None` is the single "no differentiation"
/// bucket of an absent facet.
pub type FacetKey = Option<Value>;

/// How one facet role selects its values.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FacetSelector {
    /// No differentiation: a single default bucket.
    #[default]
    Absent,
    /// Every distinct value of the column, in order of first appearance.
    AllValues(String),
    /// Exactly these values of the column, in the given order.
    RestrictedValues(String, Vec<Value>),
}

impl FacetSelector {
    /// Facet over every value of `column`.
    #[must_use]
    pub fn all(column: &str) -> Self {
        FacetSelector::AllValues(column.to_string())
    }

    /// Facet over an explicit, ordered subset of `column`.
    #[must_use]
    pub fn restricted<V: Into<Value>>(column: &str, values: impl IntoIterator<Item = V>) -> Self {
        FacetSelector::RestrictedValues(column.to_string(), values.into_iter().map(Into::into).collect())
    }

    /// The column this selector reads, if any.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            FacetSelector::Absent => None,
            FacetSelector::AllValues(c) | FacetSelector::RestrictedValues(c, _) => Some(c),
        }
    }

    /// Whether the selector is [`FacetSelector::Absent`].
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, FacetSelector::Absent)
    }
}

/// The role a facet plays in the figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetRole {
    /// One panel per value.
    Panel,
    /// One line per value on every panel.
    Line,
    /// The n-th slider.
    Slider(usize),
}

impl fmt::Display for FacetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacetRole::Panel => f.write_str("panel"),
            FacetRole::Line => f.write_str("line"),
            FacetRole::Slider(i) => write!(f, "slider[{i}]"),
        }
    }
}

/// Faceting specification for a figure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetSpec {
    panel: FacetSelector,
    line: FacetSelector,
    sliders: Vec<FacetSelector>,
}

impl FacetSpec {
    /// A spec with every role absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the panel facet.
    #[must_use]
    pub fn panel(mut self, selector: FacetSelector) -> Self {
        self.panel = selector;
        self
    }

    /// Set the line facet.
    #[must_use]
    pub fn line(mut self, selector: FacetSelector) -> Self {
        self.line = selector;
        self
    }

    /// Add a slider facet. Absent selectors are ignored.
    #[must_use]
    pub fn slider(mut self, selector: FacetSelector) -> Self {
        if !selector.is_absent() {
            self.sliders.push(selector);
        }
        self
    }

    /// Panel selector.
    #[must_use]
    pub fn panel_selector(&self) -> &FacetSelector {
        &self.panel
    }

    /// Line selector.
    #[must_use]
    pub fn line_selector(&self) -> &FacetSelector {
        &self.line
    }

    /// Slider selectors in control order.
    #[must_use]
    pub fn slider_selectors(&self) -> &[FacetSelector] {
        &self.sliders
    }
}

/// The resolved, ordered values of one facet role.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    column: Option<String>,
    values: Vec<FacetKey>,
}

impl Domain {
    /// The singleton "no differentiation" domain.
    #[must_use]
    pub fn absent() -> Self {
        Self { column: None, values: vec![None] }
    }

    fn of_column(column: &str, values: Vec<Value>) -> Self {
        Self { column: Some(column.to_string()), values: values.into_iter().map(Some).collect() }
    }

    /// Facet column, or `None` for an absent facet.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Whether this is the absent singleton.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.column.is_none()
    }

    /// Domain entries in order.
    #[must_use]
    pub fn values(&self) -> &[FacetKey] {
        &self.values
    }

    /// Number of entries (1 for an absent facet).
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a resolved domain; kept for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&FacetKey> {
        self.values.get(index)
    }
}

/// Domains for every role of a [`FacetSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct Domains {
    /// Panel domain.
    pub panel: Domain,
    /// Line domain.
    pub line: Domain,
    /// One domain per slider, in control order.
    pub sliders: Vec<Domain>,
}

/// Resolve a facet spec against a table.
///
/// Pure function over the table. Fails with a validation error if a facet
/// names an unknown column, a restricted value never occurs in its column,
/// or a column facet ends up with no values.
pub fn resolve<P>(table: &ResultTable<P>, spec: &FacetSpec) -> Result<Domains> {
    let panel = resolve_role(table, &spec.panel, FacetRole::Panel)?;
    let line = resolve_role(table, &spec.line, FacetRole::Line)?;
    let sliders = spec
        .sliders
        .iter()
        .enumerate()
        .map(|(i, selector)| resolve_role(table, selector, FacetRole::Slider(i)))
        .collect::<Result<Vec<_>>>()?;

    Ok(Domains { panel, line, sliders })
}

fn resolve_role<P>(table: &ResultTable<P>, selector: &FacetSelector, role: FacetRole) -> Result<Domain> {
    let domain = match selector {
        FacetSelector::Absent => Domain::absent(),
        FacetSelector::AllValues(column) => {
            ensure_column(table, column)?;
            Domain::of_column(column, table.distinct(column))
        }
        FacetSelector::RestrictedValues(column, values) => {
            ensure_column(table, column)?;
            if let Some(missing) = values.iter().find(|v| !table.contains_value(column, v)) {
                return Err(Error::MissingFacetValue {
                    value: missing.to_string(),
                    column: column.clone(),
                });
            }
            Domain::of_column(column, values.clone())
        }
    };

    if domain.is_empty() {
        return Err(Error::EmptyDomain { column: selector.column().unwrap_or_default().to_string() });
    }

    debug!(%role, column = domain.column().unwrap_or("-"), len = domain.len(), "resolved facet domain");
    Ok(domain)
}

fn ensure_column<P>(table: &ResultTable<P>, column: &str) -> Result<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(Error::UnknownColumn { column: column.to_string() })
    }
}

//! Frame/row matching for one panel/line cell.
//!
//! A cell query is the conjunction of one equality predicate per active
//! slider, plus the panel and line predicates when those facets are present.
//! Absent facets contribute nothing and match every row.

use tracing::trace;

use crate::error::{Error, Result};
use crate::facet::{Domain, Domains, FacetKey};
use crate::table::{Record, ResultTable, Value};

/// Conjunction of column equality predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellQuery<'q> {
    constraints: Vec<(&'q str, &'q Value)>,
    payload_column: Option<&'q str>,
}

impl<'q> CellQuery<'q> {
    /// A query matching every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for the cell at (`panel`, `line`) under the given slider selections.
    ///
    /// `sliders` holds one selected key per slider domain, in control order.
    #[must_use]
    pub fn for_cell(domains: &'q Domains, panel: &'q FacetKey, line: &'q FacetKey, sliders: &'q [FacetKey]) -> Self {
        let mut query = Self::new();
        for (domain, key) in domains.sliders.iter().zip(sliders) {
            query = query.facet(domain, key);
        }
        query.facet(&domains.panel, panel).facet(&domains.line, line)
    }

    /// Add the predicate for one facet; a no-op for absent facets.
    #[must_use]
    pub fn facet(mut self, domain: &'q Domain, key: &'q FacetKey) -> Self {
        if let (Some(column), Some(value)) = (domain.column(), key) {
            self.constraints.push((column, value));
        }
        self
    }

    /// Add an explicit `column == value` predicate.
    #[must_use]
    pub fn equals(mut self, column: &'q str, value: &'q Value) -> Self {
        self.constraints.push((column, value));
        self
    }

    /// Leave `column` out of ambiguity reports instead of the table's payload column.
    #[must_use]
    pub fn payload_column(mut self, column: Option<&'q str>) -> Self {
        self.payload_column = column;
        self
    }

    /// Number of predicates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the query matches every row.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Evaluate the conjunction on one record.
    #[must_use]
    pub fn matches<P>(&self, record: &Record<P>) -> bool {
        self.constraints.iter().all(|(column, value)| record.get(column) == Some(*value))
    }
}

/// Outcome of matching one cell.
#[derive(Debug)]
pub enum MatchResult<'t, P> {
    /// Exactly one record matched.
    Found(&'t Record<P>),
    /// No record matched; the line is cleared.
    NotFound,
    /// Two or more records matched; holds the columns that tell them apart.
    Ambiguous(Vec<String>),
}

impl<'t, P> MatchResult<'t, P> {
    /// Zero or one record, or [`Error::Ambiguity`].
    pub fn into_result(self) -> Result<Option<&'t Record<P>>> {
        match self {
            MatchResult::Found(record) => Ok(Some(record)),
            MatchResult::NotFound => Ok(None),
            MatchResult::Ambiguous(columns) => Err(Error::Ambiguity { columns }),
        }
    }

    /// Whether exactly one record matched.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found(_))
    }
}

/// Select the record matching `query`.
///
/// Stops scanning at the second match: only the first two matches are
/// needed to build the ambiguity report.
pub fn match_cell<'t, P>(table: &'t ResultTable<P>, query: &CellQuery<'_>) -> MatchResult<'t, P> {
    let mut hits = table.records().iter().filter(|record| query.matches(record));
    let result = match (hits.next(), hits.next()) {
        (None, _) => MatchResult::NotFound,
        (Some(record), None) => MatchResult::Found(record),
        (Some(first), Some(second)) => {
            let payload = query.payload_column.unwrap_or_else(|| table.payload_column());
            MatchResult::Ambiguous(differing_columns(table, payload, first, second))
        }
    };
    trace!(predicates = query.len(), found = result.is_found(), "matched cell");
    result
}

/// Columns other than `payload` on which two records differ, in schema order.
#[must_use]
pub fn differing_columns<P>(table: &ResultTable<P>, payload: &str, a: &Record<P>, b: &Record<P>) -> Vec<String> {
    table
        .columns()
        .iter()
        .filter(|column| column.as_str() != payload)
        .filter(|column| a.get(column) != b.get(column))
        .cloned()
        .collect()
}

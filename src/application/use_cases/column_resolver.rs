//! Column resolver
//!
//! Binds each logical role to a concrete column:
//! - scan columns in file order, and for each column the role's candidates
//!   in priority order; the first column containing a candidate wins
//! - with no match, fall back to a positional default
//!   (region → first, character → second or first, feature → last)
//!
//! Matching is a case-sensitive substring test, so `지역2` still matches
//! `지역`. Resolution never fails while at least one column exists; a
//! positional fallback may bind an unrelated column.

use tracing::{debug, warn};

use crate::domain::binding::{BindingSource, FieldBinding, ResolvedColumn, Role, RoleCandidates};

pub struct ColumnResolver {
    candidates: RoleCandidates,
}

impl ColumnResolver {
    pub fn new(candidates: RoleCandidates) -> Self {
        Self { candidates }
    }

    pub fn resolve(&self, columns: &[String]) -> Option<FieldBinding> {
        resolve_columns(columns, &self.candidates)
    }
}

/// Resolve every role against `columns`; `None` only if there are no columns.
pub fn resolve_columns(columns: &[String], candidates: &RoleCandidates) -> Option<FieldBinding> {
    Some(FieldBinding {
        region: resolve_role(columns, Role::Region, candidates.for_role(Role::Region))?,
        character: resolve_role(columns, Role::Character, candidates.for_role(Role::Character))?,
        feature: resolve_role(columns, Role::Feature, candidates.for_role(Role::Feature))?,
    })
}

fn resolve_role(columns: &[String], role: Role, candidates: &[String]) -> Option<ResolvedColumn> {
    let candidates: Vec<&str> = candidates
        .iter()
        .map(String::as_str)
        .filter(|candidate| !candidate.trim().is_empty())
        .collect();

    let mut matches = columns.iter().filter_map(|column| {
        candidates
            .iter()
            .find(|candidate| column.contains(**candidate))
            .map(|candidate| (column, *candidate))
    });

    if let Some((column, candidate)) = matches.next() {
        let also_matched: Vec<String> = matches.map(|(other, _)| other.clone()).collect();
        if also_matched.is_empty() {
            debug!(role = %role, column = %column, candidate, "Column matched");
        } else {
            warn!(
                role = %role,
                column = %column,
                others = ?also_matched,
                "Several columns match; binding the first in column order"
            );
        }

        return Some(ResolvedColumn {
            column: column.clone(),
            source: BindingSource::Matched {
                candidate: candidate.to_string(),
            },
            also_matched,
        });
    }

    let index = role.fallback_index(columns.len())?;
    let column = columns[index].clone();
    warn!(role = %role, column = %column, "No column matched; using positional default");

    Some(ResolvedColumn {
        column,
        source: BindingSource::Fallback,
        also_matched: Vec::new(),
    })
}

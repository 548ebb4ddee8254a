use serde::Serialize;

use crate::domain::binding::{FieldBinding, Role};
use crate::domain::dataset::DatasetRow;

/// Display string used when a resolved cell is blank or missing
pub const DEFAULT_PLACEHOLDER: &str = "정보 없음";

/// The chosen region and the profile read from its row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub region: String,
    pub character: String,
    pub feature: String,
}

impl Selection {
    /// Read the bound columns of `row`, trimming values and substituting
    /// `placeholder` for anything blank or absent.
    pub fn from_row(row: &DatasetRow<'_>, binding: &FieldBinding, placeholder: &str) -> Self {
        let read = |role: Role| -> String {
            row.get(binding.column(role))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .unwrap_or(placeholder)
                .to_string()
        };

        Self {
            region: read(Role::Region),
            character: read(Role::Character),
            feature: read(Role::Feature),
        }
    }

    /// Character name without a trailing parenthesised description.
    ///
    /// `김시간 (회중시계를 든 골동품 가게 주인)` becomes `김시간`.
    pub fn display_name(&self) -> &str {
        let name = self
            .character
            .split_once('(')
            .map(|(head, _)| head)
            .unwrap_or(&self.character)
            .trim();
        if name.is_empty() {
            self.character.trim()
        } else {
            name
        }
    }
}

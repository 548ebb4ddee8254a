// ============================================================
// FIELD BINDING
// ============================================================
// Logical roles and the concrete columns they resolve to

use serde::{Deserialize, Serialize};

/// Logical field the catalog needs from every row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Region,
    Character,
    Feature,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Region, Role::Character, Role::Feature];

    /// Positional default used when no column matches a candidate
    pub fn fallback_index(&self, column_count: usize) -> Option<usize> {
        if column_count == 0 {
            return None;
        }
        match self {
            Role::Region => Some(0),
            Role::Character => Some(if column_count > 1 { 1 } else { 0 }),
            Role::Feature => Some(column_count - 1),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Region => write!(f, "region"),
            Role::Character => write!(f, "character"),
            Role::Feature => write!(f, "feature"),
        }
    }
}

/// Ordered substring candidates per role, highest priority first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCandidates {
    pub region: Vec<String>,
    pub character: Vec<String>,
    pub feature: Vec<String>,
}

impl Default for RoleCandidates {
    fn default() -> Self {
        Self {
            region: to_strings(&["지역", "지역명", "region"]),
            character: to_strings(&["캐릭터", "인물", "이름", "character"]),
            feature: to_strings(&["특징", "설명", "성격", "feature"]),
        }
    }
}

impl RoleCandidates {
    pub fn new<S: AsRef<str>>(region: &[S], character: &[S], feature: &[S]) -> Self {
        Self {
            region: to_strings(region),
            character: to_strings(character),
            feature: to_strings(feature),
        }
    }

    pub fn for_role(&self, role: Role) -> &[String] {
        match role {
            Role::Region => &self.region,
            Role::Character => &self.character,
            Role::Feature => &self.feature,
        }
    }
}

/// How a role ended up bound to its column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingSource {
    /// The column name contains this candidate
    Matched { candidate: String },
    /// No candidate matched; positional default
    Fallback,
}

/// Column chosen for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub column: String,
    pub source: BindingSource,

    /// Later columns that also contained a candidate but lost on column order
    pub also_matched: Vec<String>,
}

impl ResolvedColumn {
    pub fn is_fallback(&self) -> bool {
        self.source == BindingSource::Fallback
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.also_matched.is_empty()
    }
}

/// Role → column mapping for one dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldBinding {
    pub region: ResolvedColumn,
    pub character: ResolvedColumn,
    pub feature: ResolvedColumn,
}

impl FieldBinding {
    pub fn get(&self, role: Role) -> &ResolvedColumn {
        match role {
            Role::Region => &self.region,
            Role::Character => &self.character,
            Role::Feature => &self.feature,
        }
    }

    pub fn column(&self, role: Role) -> &str {
        &self.get(role).column
    }

    /// Column names as (region, character, feature)
    pub fn columns(&self) -> (&str, &str, &str) {
        (
            self.column(Role::Region),
            self.column(Role::Character),
            self.column(Role::Feature),
        )
    }
}

fn to_strings<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values.iter().map(|v| v.as_ref().to_string()).collect()
}

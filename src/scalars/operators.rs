use std::fmt;

use serde::{Deserialize, Serialize};

/// Filter operators accepted inside a `where` field criteria object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    Nin,
    IsNull,
    NotNull,
    Like,
    Locate,
    Contains,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 13] = [
        FilterOperator::Eq,
        FilterOperator::Ne,
        FilterOperator::Gt,
        FilterOperator::Ge,
        FilterOperator::Lt,
        FilterOperator::Le,
        FilterOperator::In,
        FilterOperator::Nin,
        FilterOperator::IsNull,
        FilterOperator::NotNull,
        FilterOperator::Like,
        FilterOperator::Locate,
        FilterOperator::Contains,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "EQ",
            FilterOperator::Ne => "NE",
            FilterOperator::Gt => "GT",
            FilterOperator::Ge => "GE",
            FilterOperator::Lt => "LT",
            FilterOperator::Le => "LE",
            FilterOperator::In => "IN",
            FilterOperator::Nin => "NIN",
            FilterOperator::IsNull => "IS_NULL",
            FilterOperator::NotNull => "NOT_NULL",
            FilterOperator::Like => "LIKE",
            FilterOperator::Locate => "LOCATE",
            FilterOperator::Contains => "CONTAINS",
        }
    }

    pub fn parse(name: &str) -> Option<FilterOperator> {
        Self::ALL.iter().copied().find(|op| op.as_str() == name)
    }

    /// Operators whose operand is a list of candidate values.
    pub fn takes_list(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::Nin)
    }

    /// Operators whose operand is a boolean switch rather than a comparison value.
    pub fn takes_flag(&self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::NotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a criteria key looks like an operator token (`EQ`, `IS_NULL`, ...)
/// rather than a field name.
pub fn is_operator_token(key: &str) -> bool {
    key.len() > 1
        && key
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '_')
}

//! Candidate join-key mappings between two datasets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// Role a column pair plays in the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Date,
    Product,
}

impl Role {
    /// Roles every complete candidate must carry.
    pub const REQUIRED: [Role; 2] = [Role::Customer, Role::Date];

    pub fn label(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Date => "date",
            Role::Product => "product",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A column in a named dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    pub dataset: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(dataset: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.column)
    }
}

/// One role-tagged column pair: `left` from the first dataset, `right` from the second.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub role: Role,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

impl FieldMapping {
    pub fn new(role: Role, left: ColumnRef, right: ColumnRef) -> Self {
        Self { role, left, right }
    }

    /// Field-pair key, `"{left column}_{right column}"`.
    pub fn key(&self) -> String {
        format!("{}_{}", self.left.column, self.right.column)
    }

    pub fn is_date(&self) -> bool {
        self.role == Role::Date
    }
}

/// A proposed set of column correspondences, at most one per role.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CandidateMapping {
    fields: Vec<FieldMapping>,
}

impl CandidateMapping {
    /// Build a candidate, checking that roles are unique and each pair spans both datasets.
    ///
    /// Required roles are not enforced here; see [`CandidateMapping::ensure_complete`].
    pub fn new(fields: Vec<FieldMapping>) -> Result<Self, MappingError> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.role == field.role) {
                return Err(MappingError::DuplicateRole(field.role));
            }
            if field.left.dataset == field.right.dataset {
                return Err(MappingError::SameDataset {
                    role: field.role,
                    dataset: field.left.dataset.clone(),
                });
            }
        }
        Ok(Self { fields })
    }

    /// Build a complete customer/date[/product] candidate between two datasets.
    pub fn between(
        left_dataset: &str,
        right_dataset: &str,
        customer: (&str, &str),
        date: (&str, &str),
        product: Option<(&str, &str)>,
    ) -> Result<Self, MappingError> {
        let pair = |role: Role, (l, r): (&str, &str)| {
            FieldMapping::new(
                role,
                ColumnRef::new(left_dataset, l),
                ColumnRef::new(right_dataset, r),
            )
        };

        let mut fields = vec![pair(Role::Customer, customer), pair(Role::Date, date)];
        if let Some(product) = product {
            fields.push(pair(Role::Product, product));
        }
        Self::new(fields)
    }

    /// Fail with the first required role that is absent.
    pub fn ensure_complete(&self) -> Result<(), MappingError> {
        match Role::REQUIRED.iter().find(|role| self.field(**role).is_none()) {
            Some(role) => Err(MappingError::MissingRole(*role)),
            None => Ok(()),
        }
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// The mapping for a role, if present.
    pub fn field(&self, role: Role) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.role == role)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// A column pair as emitted by a mapping-suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedPair {
    pub table1_field: String,
    pub table2_field: String,
}

/// Suggestion-service document for one candidate mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MappingDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_mapping: Option<SuggestedPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_mapping: Option<SuggestedPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_mapping: Option<SuggestedPair>,
}

impl MappingDocument {
    /// Convert into a complete candidate over the two named datasets.
    pub fn into_candidate(
        self,
        left_dataset: &str,
        right_dataset: &str,
    ) -> Result<CandidateMapping, MappingError> {
        let fields = [
            (Role::Customer, self.customer_mapping),
            (Role::Date, self.date_mapping),
            (Role::Product, self.product_mapping),
        ]
        .into_iter()
        .filter_map(|(role, pair)| {
            pair.map(|p| {
                FieldMapping::new(
                    role,
                    ColumnRef::new(left_dataset, p.table1_field),
                    ColumnRef::new(right_dataset, p.table2_field),
                )
            })
        })
        .collect();

        let candidate = CandidateMapping::new(fields)?;
        candidate.ensure_complete()?;
        Ok(candidate)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labstock_core::{CategoryId, DomainError, DomainResult, Entity, LabId};

/// A grouping of components within one lab (name unique per lab).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub lab_id: LabId,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        description: impl Into<String>,
        lab_id: LabId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_input("category name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            description: description.into(),
            lab_id,
            created_at: now,
        })
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

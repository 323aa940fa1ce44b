use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labstock_core::{DomainError, DomainResult, Entity, LabId};

/// A physical lab that owns categories and stocked components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    pub id: LabId,
    pub name: String,
    pub location: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Lab {
    pub fn new(
        id: LabId,
        name: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::invalid_input("lab name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            location: location.into(),
            description: description.into(),
            created_at: now,
        })
    }
}

impl Entity for Lab {
    type Id = LabId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

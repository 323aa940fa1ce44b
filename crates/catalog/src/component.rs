use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use labstock_core::{CategoryId, ComponentId, DomainError, DomainResult, Entity, LabId};

/// Stock level relative to the component's minimum threshold.
///
/// Derived on read, never stored: `quantity` and `min_stock_level` are the
/// single source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockState {
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Low Stock")]
    LowStock,
    #[serde(rename = "In Stock")]
    InStock,
}

/// A stocked component owned by a category (and, denormalized, by its lab).
///
/// `quantity` is only ever mutated through the stock store's `adjust` path;
/// this type just carries the state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: ComponentId,
    pub name: String,
    pub category_id: CategoryId,
    /// Must always match the owning category's lab; divergence is rejected
    /// as invalid input on every write.
    pub lab_id: LabId,
    pub quantity: u32,
    pub min_stock_level: u32,
    pub unit: String,
    pub component_type: String,
    pub description: String,
    pub date_added: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Creation payload for a component (administrative surface).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComponent {
    pub name: String,
    pub category_id: CategoryId,
    pub lab_id: LabId,
    pub quantity: u32,
    pub min_stock_level: u32,
    pub unit: String,
    pub component_type: Option<String>,
    pub description: String,
}

impl Component {
    pub fn new(id: ComponentId, draft: NewComponent, now: DateTime<Utc>) -> DomainResult<Self> {
        if draft.name.trim().is_empty() {
            return Err(DomainError::invalid_input("component name cannot be empty"));
        }
        Ok(Self {
            id,
            name: draft.name,
            category_id: draft.category_id,
            lab_id: draft.lab_id,
            quantity: draft.quantity,
            min_stock_level: draft.min_stock_level,
            unit: draft.unit,
            component_type: draft
                .component_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Other".to_string()),
            description: draft.description,
            date_added: now,
            last_updated: now,
        })
    }

    /// Stock health relative to the minimum threshold.
    pub fn stock_state(&self) -> StockState {
        if self.quantity == 0 {
            StockState::OutOfStock
        } else if self.quantity <= self.min_stock_level {
            StockState::LowStock
        } else {
            StockState::InStock
        }
    }

    /// True when the stock monitor should flag this component.
    pub fn is_low(&self) -> bool {
        self.quantity <= self.min_stock_level
    }
}

impl Entity for Component {
    type Id = ComponentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

//! Stock store: the single source of truth for component quantities.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use labstock_catalog::Component;
use labstock_core::{CategoryId, ComponentId, DomainError, DomainResult, LabId};

/// Storage seam for components and their stock levels.
///
/// `adjust` is the **only** way any caller may change a component's quantity
/// (issue, return and administrative restock all go through it). Callers are
/// expected to hold the component's lock (see [`crate::locks`]) across their
/// read-validate-adjust sequence; the store itself only guarantees that each
/// single call is consistent.
pub trait StockStore: Send + Sync {
    /// Fetch a component by id.
    fn get(&self, id: ComponentId) -> DomainResult<Component>;

    /// Apply a signed stock delta, returning the new quantity.
    ///
    /// Rejects the change entirely (no partial write) if the result would be
    /// negative, with `InsufficientStock`.
    fn adjust(&self, id: ComponentId, delta: i64, now: DateTime<Utc>) -> DomainResult<u32>;

    /// Register a new component. Fails on duplicate id.
    fn insert(&self, component: Component) -> DomainResult<()>;

    /// Remove a component, returning it. Fails `NotFound` if absent.
    fn remove(&self, id: ComponentId) -> DomainResult<Component>;

    /// All components, sorted by name.
    fn list(&self) -> DomainResult<Vec<Component>>;

    /// Components belonging to one lab, sorted by name.
    fn list_by_lab(&self, lab_id: LabId) -> DomainResult<Vec<Component>>;

    /// Components belonging to one category, sorted by name.
    fn list_by_category(&self, category_id: CategoryId) -> DomainResult<Vec<Component>>;
}

/// In-memory stock store.
///
/// Intended for tests/dev and as the reference implementation of the
/// contract. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    components: RwLock<HashMap<ComponentId, Component>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut items: Vec<Component>) -> Vec<Component> {
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }
}

impl StockStore for InMemoryStockStore {
    fn get(&self, id: ComponentId) -> DomainResult<Component> {
        let components = self
            .components
            .read()
            .map_err(|_| DomainError::conflict("stock store lock poisoned"))?;
        components
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("component", id))
    }

    fn adjust(&self, id: ComponentId, delta: i64, now: DateTime<Utc>) -> DomainResult<u32> {
        let mut components = self
            .components
            .write()
            .map_err(|_| DomainError::conflict("stock store lock poisoned"))?;
        let component = components
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("component", id))?;

        let new_quantity = i64::from(component.quantity) + delta;
        if new_quantity < 0 {
            return Err(DomainError::insufficient_stock(
                delta.unsigned_abs().min(u64::from(u32::MAX)) as u32,
                component.quantity,
            ));
        }
        let new_quantity = u32::try_from(new_quantity)
            .map_err(|_| DomainError::invalid_input("stock quantity overflow"))?;

        component.quantity = new_quantity;
        component.last_updated = now;
        Ok(new_quantity)
    }

    fn insert(&self, component: Component) -> DomainResult<()> {
        let mut components = self
            .components
            .write()
            .map_err(|_| DomainError::conflict("stock store lock poisoned"))?;
        if components.contains_key(&component.id) {
            return Err(DomainError::conflict(format!(
                "component {} already exists",
                component.id
            )));
        }
        components.insert(component.id, component);
        Ok(())
    }

    fn remove(&self, id: ComponentId) -> DomainResult<Component> {
        let mut components = self
            .components
            .write()
            .map_err(|_| DomainError::conflict("stock store lock poisoned"))?;
        components
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("component", id))
    }

    fn list(&self) -> DomainResult<Vec<Component>> {
        let components = self
            .components
            .read()
            .map_err(|_| DomainError::conflict("stock store lock poisoned"))?;
        Ok(Self::sorted(components.values().cloned().collect()))
    }

    fn list_by_lab(&self, lab_id: LabId) -> DomainResult<Vec<Component>> {
        let components = self
            .components
            .read()
            .map_err(|_| DomainError::conflict("stock store lock poisoned"))?;
        Ok(Self::sorted(
            components
                .values()
                .filter(|c| c.lab_id == lab_id)
                .cloned()
                .collect(),
        ))
    }

    fn list_by_category(&self, category_id: CategoryId) -> DomainResult<Vec<Component>> {
        let components = self
            .components
            .read()
            .map_err(|_| DomainError::conflict("stock store lock poisoned"))?;
        Ok(Self::sorted(
            components
                .values()
                .filter(|c| c.category_id == category_id)
                .cloned()
                .collect(),
        ))
    }
}

//! In-memory registry of labs and categories.
//!
//! Administrative CRUD around the engine is intentionally thin; this store
//! exists so the engine can validate ownership edges (component → category →
//! lab) and enumerate dependents during cascade deletes.

use std::collections::HashMap;
use std::sync::RwLock;

use labstock_catalog::{Category, Lab};
use labstock_core::{CategoryId, DomainError, DomainResult, LabId};

#[derive(Debug, Default)]
pub struct CatalogStore {
    labs: RwLock<HashMap<LabId, Lab>>,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lab; lab names are globally unique.
    pub fn insert_lab(&self, lab: Lab) -> DomainResult<()> {
        let mut labs = self
            .labs
            .write()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;
        if labs.values().any(|l| l.name == lab.name) {
            return Err(DomainError::invalid_input(format!(
                "lab name '{}' is already taken",
                lab.name
            )));
        }
        labs.insert(lab.id, lab);
        Ok(())
    }

    pub fn get_lab(&self, id: LabId) -> DomainResult<Lab> {
        let labs = self
            .labs
            .read()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;
        labs.get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("lab", id))
    }

    pub fn list_labs(&self) -> DomainResult<Vec<Lab>> {
        let labs = self
            .labs
            .read()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;
        let mut items: Vec<_> = labs.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    pub fn remove_lab(&self, id: LabId) -> DomainResult<Lab> {
        let mut labs = self
            .labs
            .write()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;
        labs.remove(&id)
            .ok_or_else(|| DomainError::not_found("lab", id))
    }

    /// Register a category; names are unique within a lab and the owning lab
    /// must exist.
    pub fn insert_category(&self, category: Category) -> DomainResult<()> {
        self.get_lab(category.lab_id)?;

        let mut categories = self
            .categories
            .write()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;
        if categories
            .values()
            .any(|c| c.lab_id == category.lab_id && c.name == category.name)
        {
            return Err(DomainError::invalid_input(format!(
                "category name '{}' is already taken in this lab",
                category.name
            )));
        }
        categories.insert(category.id, category);
        Ok(())
    }

    pub fn get_category(&self, id: CategoryId) -> DomainResult<Category> {
        let categories = self
            .categories
            .read()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;
        categories
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("category", id))
    }

    pub fn list_categories(&self, lab_id: Option<LabId>) -> DomainResult<Vec<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;
        let mut items: Vec<_> = categories
            .values()
            .filter(|c| lab_id.is_none_or(|id| c.lab_id == id))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    pub fn remove_category(&self, id: CategoryId) -> DomainResult<Category> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;
        categories
            .remove(&id)
            .ok_or_else(|| DomainError::not_found("category", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lab(name: &str) -> Lab {
        Lab::new(LabId::new(), name, "B-Wing", "", Utc::now()).unwrap()
    }

    #[test]
    fn lab_names_are_unique() {
        let store = CatalogStore::new();
        store.insert_lab(lab("Electronics")).unwrap();
        let err = store.insert_lab(lab("Electronics")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn category_requires_existing_lab_and_unique_name_per_lab() {
        let store = CatalogStore::new();
        let orphan = Category::new(CategoryId::new(), "Sensors", "", LabId::new(), Utc::now())
            .unwrap();
        assert!(matches!(
            store.insert_category(orphan).unwrap_err(),
            DomainError::NotFound { .. }
        ));

        let l = lab("Electronics");
        let lab_id = l.id;
        store.insert_lab(l).unwrap();

        let a = Category::new(CategoryId::new(), "Sensors", "", lab_id, Utc::now()).unwrap();
        let b = Category::new(CategoryId::new(), "Sensors", "", lab_id, Utc::now()).unwrap();
        store.insert_category(a).unwrap();
        assert!(store.insert_category(b).is_err());
    }
}

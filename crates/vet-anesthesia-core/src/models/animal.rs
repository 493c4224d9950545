//! Animal (patient) models.

use serde::{Deserialize, Serialize};

use crate::calculator::{require_positive, CalcResult};

/// A registered animal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Animal {
    /// Local UUID
    pub local_id: String,
    /// Animal name
    pub name: String,
    /// Species (e.g., "canine", "feline")
    pub species: String,
    /// Breed
    pub breed: Option<String>,
    /// Age in whole years
    pub age_years: Option<u32>,
    /// Body weight in kg, the basis of every dose
    pub weight_kg: f64,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Animal {
    /// Create a new animal with required fields.
    pub fn new(name: String, species: String, weight_kg: f64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            local_id: uuid::Uuid::new_v4().to_string(),
            name,
            species,
            breed: None,
            age_years: None,
            weight_kg,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Check that the weight can be dosed against.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("weight_kg", self.weight_kg)?;
        Ok(())
    }

    /// Get the canonical species name (lowercase).
    pub fn canonical_species(&self) -> String {
        self.species.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_animal() {
        let animal = Animal::new("Rex".into(), "canine".into(), 10.0);
        assert_eq!(animal.name, "Rex");
        assert_eq!(animal.weight_kg, 10.0);
        assert_eq!(animal.local_id.len(), 36); // UUID format
        assert!(animal.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_weight() {
        let animal = Animal::new("Thor".into(), "feline".into(), 0.0);
        assert!(animal.validate().is_err());
    }

    #[test]
    fn test_canonical_species() {
        let animal = Animal::new("Rex".into(), "Canine".into(), 10.0);
        assert_eq!(animal.canonical_species(), "canine");
    }
}

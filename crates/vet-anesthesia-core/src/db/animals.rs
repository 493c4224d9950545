//! Animal database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::Animal;

const ANIMAL_COLUMNS: &str =
    "local_id, name, species, breed, age_years, weight_kg, created_at, updated_at";

impl Database {
    /// Insert a new animal.
    pub fn insert_animal(&self, animal: &Animal) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO animals (
                local_id, name, species, breed, age_years, weight_kg,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                animal.local_id,
                animal.name,
                animal.species,
                animal.breed,
                animal.age_years,
                animal.weight_kg,
                animal.created_at,
                animal.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing animal.
    pub fn update_animal(&self, animal: &Animal) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE animals SET
                name = ?2,
                species = ?3,
                breed = ?4,
                age_years = ?5,
                weight_kg = ?6,
                updated_at = datetime('now')
            WHERE local_id = ?1
            "#,
            params![
                animal.local_id,
                animal.name,
                animal.species,
                animal.breed,
                animal.age_years,
                animal.weight_kg,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get an animal by local ID.
    pub fn get_animal(&self, local_id: &str) -> DbResult<Option<Animal>> {
        let sql = format!("SELECT {} FROM animals WHERE local_id = ?", ANIMAL_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [local_id], animal_from_row)
            .optional()?)
    }

    /// List all animals, by name.
    pub fn list_animals(&self) -> DbResult<Vec<Animal>> {
        let sql = format!("SELECT {} FROM animals ORDER BY name", ANIMAL_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], animal_from_row)?;

        let mut animals = Vec::new();
        for row in rows {
            animals.push(row?);
        }
        Ok(animals)
    }

    /// Delete an animal. Its sessions keep their history with no animal link.
    pub fn delete_animal(&self, local_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM animals WHERE local_id = ?", [local_id])?;
        Ok(rows_affected > 0)
    }
}

fn animal_from_row(row: &Row<'_>) -> rusqlite::Result<Animal> {
    Ok(Animal {
        local_id: row.get(0)?,
        name: row.get(1)?,
        species: row.get(2)?,
        breed: row.get(3)?,
        age_years: row.get(4)?,
        weight_kg: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut animal = Animal::new("Rex".into(), "canine".into(), 10.0);
        animal.breed = Some("Beagle".into());
        animal.age_years = Some(4);
        db.insert_animal(&animal).unwrap();

        let retrieved = db.get_animal(&animal.local_id).unwrap().unwrap();
        assert_eq!(retrieved, animal);
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert!(db.get_animal("nope").unwrap().is_none());
    }

    #[test]
    fn test_update() {
        let db = setup_db();

        let mut animal = Animal::new("Rex".into(), "canine".into(), 10.0);
        db.insert_animal(&animal).unwrap();

        animal.weight_kg = 11.5;
        assert!(db.update_animal(&animal).unwrap());

        let retrieved = db.get_animal(&animal.local_id).unwrap().unwrap();
        assert_eq!(retrieved.weight_kg, 11.5);
    }

    #[test]
    fn test_non_positive_weight_rejected_by_store() {
        let db = setup_db();
        let animal = Animal::new("Ghost".into(), "canine".into(), 0.0);
        assert!(db.insert_animal(&animal).is_err());
    }

    #[test]
    fn test_list_and_delete() {
        let db = setup_db();

        let thor = Animal::new("Thor".into(), "feline".into(), 4.5);
        let rex = Animal::new("Rex".into(), "canine".into(), 10.0);
        db.insert_animal(&thor).unwrap();
        db.insert_animal(&rex).unwrap();

        let names: Vec<String> = db.list_animals().unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Rex", "Thor"]);

        assert!(db.delete_animal(&rex.local_id).unwrap());
        assert!(!db.delete_animal(&rex.local_id).unwrap());
        assert_eq!(db.list_animals().unwrap().len(), 1);
    }
}

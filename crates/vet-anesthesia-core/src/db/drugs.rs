//! Drug formulary database operations.

use rusqlite::{params, OptionalExtension, Row};
use strsim::jaro_winkler;

use super::{Database, DbError, DbResult};
use crate::calculator::{Concentration, ConcentrationUnit, DoseUnit};
use crate::models::{AdministrationMode, Drug};

/// Minimum name similarity for a fuzzy drug match.
const MIN_NAME_SIMILARITY: f64 = 0.80;

const DRUG_COLUMNS: &str = "local_id, name, dose, dose_unit, concentration, concentration_unit, \
     mode, route, syringe_volume_ml, comment, created_at, updated_at";

impl Database {
    /// Insert a new drug.
    pub fn insert_drug(&self, drug: &Drug) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO drugs (
                local_id, name, dose, dose_unit, concentration, concentration_unit,
                mode, route, syringe_volume_ml, comment, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                drug.local_id,
                drug.name,
                drug.dose,
                drug.dose_unit.to_string(),
                drug.concentration.value,
                drug.concentration.unit.to_string(),
                drug.mode.as_str(),
                drug.route,
                drug.syringe_volume_ml,
                drug.comment,
                drug.created_at,
                drug.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing drug.
    pub fn update_drug(&self, drug: &Drug) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE drugs SET
                name = ?2,
                dose = ?3,
                dose_unit = ?4,
                concentration = ?5,
                concentration_unit = ?6,
                mode = ?7,
                route = ?8,
                syringe_volume_ml = ?9,
                comment = ?10,
                updated_at = datetime('now')
            WHERE local_id = ?1
            "#,
            params![
                drug.local_id,
                drug.name,
                drug.dose,
                drug.dose_unit.to_string(),
                drug.concentration.value,
                drug.concentration.unit.to_string(),
                drug.mode.as_str(),
                drug.route,
                drug.syringe_volume_ml,
                drug.comment,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a drug by local ID.
    pub fn get_drug(&self, local_id: &str) -> DbResult<Option<Drug>> {
        let sql = format!("SELECT {} FROM drugs WHERE local_id = ?", DRUG_COLUMNS);
        self.conn
            .query_row(&sql, [local_id], DrugRow::from_row)
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List all drugs, by name.
    pub fn list_drugs(&self) -> DbResult<Vec<Drug>> {
        let sql = format!("SELECT {} FROM drugs ORDER BY name", DRUG_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], DrugRow::from_row)?;

        let mut drugs = Vec::new();
        for row in rows {
            drugs.push(row?.try_into()?);
        }
        Ok(drugs)
    }

    /// Find drugs whose name resembles `query`, best match first.
    ///
    /// Substring matches rank above fuzzy ones; fuzzy matches use
    /// Jaro-Winkler similarity on lowercase names.
    pub fn search_drugs(&self, query: &str, limit: usize) -> DbResult<Vec<Drug>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, Drug)> = self
            .list_drugs()?
            .into_iter()
            .filter_map(|drug| {
                let name = drug.name.to_lowercase();
                let score = if name.contains(&needle) {
                    1.0 + needle.len() as f64 / name.len().max(1) as f64
                } else {
                    jaro_winkler(&needle, &name)
                };
                (score >= MIN_NAME_SIMILARITY).then_some((score, drug))
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored.into_iter().map(|(_, drug)| drug).collect())
    }

    /// Delete a drug.
    pub fn delete_drug(&self, local_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM drugs WHERE local_id = ?", [local_id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct DrugRow {
    local_id: String,
    name: String,
    dose: f64,
    dose_unit: String,
    concentration: f64,
    concentration_unit: String,
    mode: String,
    route: Option<String>,
    syringe_volume_ml: Option<f64>,
    comment: Option<String>,
    created_at: String,
    updated_at: String,
}

impl DrugRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(DrugRow {
            local_id: row.get(0)?,
            name: row.get(1)?,
            dose: row.get(2)?,
            dose_unit: row.get(3)?,
            concentration: row.get(4)?,
            concentration_unit: row.get(5)?,
            mode: row.get(6)?,
            route: row.get(7)?,
            syringe_volume_ml: row.get(8)?,
            comment: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl TryFrom<DrugRow> for Drug {
    type Error = DbError;

    fn try_from(row: DrugRow) -> Result<Self, Self::Error> {
        let dose_unit: DoseUnit = row
            .dose_unit
            .parse()
            .map_err(|e| DbError::Constraint(format!("drug {}: {}", row.local_id, e)))?;
        let concentration_unit: ConcentrationUnit = row
            .concentration_unit
            .parse()
            .map_err(|e| DbError::Constraint(format!("drug {}: {}", row.local_id, e)))?;
        let mode: AdministrationMode = row
            .mode
            .parse()
            .map_err(|e| DbError::Constraint(format!("drug {}: {}", row.local_id, e)))?;

        Ok(Drug {
            local_id: row.local_id,
            name: row.name,
            dose: row.dose,
            dose_unit,
            concentration: Concentration::new(row.concentration, concentration_unit),
            mode,
            route: row.route,
            syringe_volume_ml: row.syringe_volume_ml,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn drug(name: &str, mode: AdministrationMode) -> Drug {
        let dose_unit = match mode {
            AdministrationMode::Bolus => DoseUnit::MG_PER_KG,
            AdministrationMode::ContinuousInfusion => DoseUnit::MG_PER_KG_PER_HOUR,
        };
        Drug::new(
            name.into(),
            4.0,
            dose_unit,
            Concentration::mg_per_ml(10.0),
            mode,
        )
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut remi = Drug::new(
            "Remifentanil".into(),
            5.0,
            DoseUnit::UG_PER_KG_PER_HOUR,
            Concentration::mg_per_ml(0.5),
            AdministrationMode::ContinuousInfusion,
        );
        remi.route = Some("IV".into());
        remi.syringe_volume_ml = Some(20.0);
        db.insert_drug(&remi).unwrap();

        let retrieved = db.get_drug(&remi.local_id).unwrap().unwrap();
        assert_eq!(retrieved, remi);
    }

    #[test]
    fn test_update() {
        let db = setup_db();

        let mut propofol = drug("Propofol", AdministrationMode::Bolus);
        db.insert_drug(&propofol).unwrap();

        propofol.dose = 6.0;
        propofol.dose_unit = DoseUnit::MG_PER_KG_PER_HOUR;
        propofol.mode = AdministrationMode::ContinuousInfusion;
        assert!(db.update_drug(&propofol).unwrap());

        let retrieved = db.get_drug(&propofol.local_id).unwrap().unwrap();
        assert_eq!(retrieved.dose, 6.0);
        assert_eq!(retrieved.dose_unit, DoseUnit::MG_PER_KG_PER_HOUR);
        assert!(retrieved.is_continuous());
    }

    #[test]
    fn test_zero_concentration_rejected_by_store() {
        let db = setup_db();
        let mut bad = drug("Broken", AdministrationMode::Bolus);
        bad.concentration = Concentration::mg_per_ml(0.0);
        assert!(db.insert_drug(&bad).is_err());
    }

    #[test]
    fn test_unknown_unit_in_row_is_reported() {
        let db = setup_db();
        let propofol = drug("Propofol", AdministrationMode::Bolus);
        db.insert_drug(&propofol).unwrap();
        db.conn()
            .execute(
                "UPDATE drugs SET dose_unit = 'grains' WHERE local_id = ?",
                [&propofol.local_id],
            )
            .unwrap();

        assert!(matches!(
            db.get_drug(&propofol.local_id),
            Err(DbError::Constraint(_))
        ));
    }

    #[test]
    fn test_search_drugs() {
        let db = setup_db();
        db.insert_drug(&drug("Propofol", AdministrationMode::Bolus)).unwrap();
        db.insert_drug(&drug("Ketamine", AdministrationMode::Bolus)).unwrap();
        db.insert_drug(&drug("Remifentanil", AdministrationMode::ContinuousInfusion))
            .unwrap();

        // Substring
        let results = db.search_drugs("keta", 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Ketamine");

        // Misspelling
        let results = db.search_drugs("propofal", 10).unwrap();
        assert_eq!(results[0].name, "Propofol");

        // Nothing close
        assert!(db.search_drugs("xylazine", 10).unwrap().is_empty());
        assert!(db.search_drugs("   ", 10).unwrap().is_empty());
    }

    #[test]
    fn test_list_and_delete() {
        let db = setup_db();
        let ketamine = drug("Ketamine", AdministrationMode::Bolus);
        db.insert_drug(&ketamine).unwrap();
        db.insert_drug(&drug("Atropine", AdministrationMode::Bolus)).unwrap();

        let names: Vec<String> = db.list_drugs().unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Atropine", "Ketamine"]);

        assert!(db.delete_drug(&ketamine.local_id).unwrap());
        assert_eq!(db.list_drugs().unwrap().len(), 1);
    }
}

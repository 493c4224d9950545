//! Infusion configuration database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::InfusionConfig;

impl Database {
    /// Insert a new infusion configuration.
    pub fn insert_infusion_config(&self, config: &InfusionConfig) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO infusion_configs (
                local_id, weight_kg, rate_ml_per_kg_per_hour, delivery_set,
                bag_volume_ml, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                config.local_id,
                config.weight_kg,
                config.rate_ml_per_kg_per_hour,
                config.delivery_set.as_str(),
                config.bag_volume_ml,
                config.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get an infusion configuration by local ID.
    pub fn get_infusion_config(&self, local_id: &str) -> DbResult<Option<InfusionConfig>> {
        self.conn
            .query_row(
                r#"
                SELECT local_id, weight_kg, rate_ml_per_kg_per_hour, delivery_set,
                       bag_volume_ml, created_at
                FROM infusion_configs
                WHERE local_id = ?
                "#,
                [local_id],
                |row| {
                    Ok(InfusionConfigRow {
                        local_id: row.get(0)?,
                        weight_kg: row.get(1)?,
                        rate_ml_per_kg_per_hour: row.get(2)?,
                        delivery_set: row.get(3)?,
                        bag_volume_ml: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }
}

/// Intermediate row struct for database mapping.
struct InfusionConfigRow {
    local_id: String,
    weight_kg: f64,
    rate_ml_per_kg_per_hour: f64,
    delivery_set: String,
    bag_volume_ml: f64,
    created_at: String,
}

impl TryFrom<InfusionConfigRow> for InfusionConfig {
    type Error = DbError;

    fn try_from(row: InfusionConfigRow) -> Result<Self, Self::Error> {
        let delivery_set = row.delivery_set.parse().map_err(|e| {
            DbError::Constraint(format!("infusion config {}: {}", row.local_id, e))
        })?;

        Ok(InfusionConfig {
            local_id: row.local_id,
            weight_kg: row.weight_kg,
            rate_ml_per_kg_per_hour: row.rate_ml_per_kg_per_hour,
            delivery_set,
            bag_volume_ml: row.bag_volume_ml,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::DeliverySet;
    use crate::models::InfusionSettings;

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();

        let config = InfusionConfig::with_settings(
            15.0,
            &InfusionSettings {
                rate_ml_per_kg_per_hour: 2.0,
                delivery_set: DeliverySet::Micro,
                bag_volume_ml: 250.0,
            },
        );
        db.insert_infusion_config(&config).unwrap();

        let retrieved = db.get_infusion_config(&config.local_id).unwrap().unwrap();
        assert_eq!(retrieved, config);
        assert_eq!(retrieved.flow_ml_per_hour().unwrap(), 30.0);
    }

    #[test]
    fn test_get_missing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_infusion_config("missing").unwrap().is_none());
    }

    #[test]
    fn test_unknown_delivery_set_in_row_is_reported() {
        let db = Database::open_in_memory().unwrap();
        let config = InfusionConfig::new(10.0);
        db.insert_infusion_config(&config).unwrap();
        db.conn()
            .execute(
                "UPDATE infusion_configs SET delivery_set = 'nano' WHERE local_id = ?",
                [&config.local_id],
            )
            .unwrap();

        let err = db.get_infusion_config(&config.local_id).unwrap_err();
        assert!(matches!(err, DbError::Constraint(ref msg) if msg.contains("nano")));
    }
}

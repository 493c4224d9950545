//! Protocol database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Protocol, ProtocolDrug, ProtocolStep};

impl Database {
    /// Create a protocol with drugs in the given order.
    ///
    /// Drug IDs that are not in the formulary are skipped; the remaining
    /// drugs keep their relative order with positions starting at 1.
    pub fn create_protocol(
        &mut self,
        name: &str,
        description: Option<&str>,
        drug_ids: &[String],
    ) -> DbResult<Protocol> {
        let protocol = Protocol::new(name.to_string(), description.map(str::to_string));

        let tx = self.transaction()?;
        tx.execute(
            r#"
            INSERT INTO protocols (protocol_id, name, description, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                protocol.protocol_id,
                protocol.name,
                protocol.description,
                protocol.created_at,
            ],
        )?;

        let mut position = 0u32;
        for drug_id in drug_ids {
            let exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM drugs WHERE local_id = ?)",
                [drug_id],
                |row| row.get(0),
            )?;
            if !exists {
                tracing::warn!("Skipping unknown drug {} in protocol {}", drug_id, name);
                continue;
            }
            position += 1;
            tx.execute(
                "INSERT INTO protocol_drugs (protocol_id, drug_id, position) VALUES (?1, ?2, ?3)",
                params![protocol.protocol_id, drug_id, position],
            )?;
        }
        tx.commit()?;

        Ok(protocol)
    }

    /// Get a protocol by ID.
    pub fn get_protocol(&self, protocol_id: &str) -> DbResult<Option<Protocol>> {
        Ok(self
            .conn
            .query_row(
                r#"
                SELECT protocol_id, name, description, created_at
                FROM protocols
                WHERE protocol_id = ?
                "#,
                [protocol_id],
                |row| {
                    Ok(Protocol {
                        protocol_id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }

    /// List all protocols, by name.
    pub fn list_protocols(&self) -> DbResult<Vec<Protocol>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT protocol_id, name, description, created_at
            FROM protocols
            ORDER BY name
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Protocol {
                protocol_id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        let mut protocols = Vec::new();
        for row in rows {
            protocols.push(row?);
        }
        Ok(protocols)
    }

    /// Drugs of a protocol in position order.
    pub fn protocol_steps(&self, protocol_id: &str) -> DbResult<Vec<ProtocolStep>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT drug_id, position
            FROM protocol_drugs
            WHERE protocol_id = ?
            ORDER BY position
            "#,
        )?;
        let links = stmt.query_map([protocol_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut steps = Vec::new();
        for link in links {
            let (drug_id, position) = link?;
            if let Some(drug) = self.get_drug(&drug_id)? {
                steps.push(ProtocolStep { position, drug });
            }
        }
        Ok(steps)
    }

    /// Add a drug to a protocol.
    ///
    /// Without an explicit position the drug goes after the last one.
    pub fn add_drug_to_protocol(
        &self,
        protocol_id: &str,
        drug_id: &str,
        position: Option<u32>,
    ) -> DbResult<ProtocolDrug> {
        if self.get_protocol(protocol_id)?.is_none() {
            return Err(DbError::NotFound(format!("protocol {}", protocol_id)));
        }
        if self.get_drug(drug_id)?.is_none() {
            return Err(DbError::NotFound(format!("drug {}", drug_id)));
        }

        let position = match position {
            Some(position) => position,
            None => {
                let count: u32 = self.conn.query_row(
                    "SELECT COUNT(*) FROM protocol_drugs WHERE protocol_id = ?",
                    [protocol_id],
                    |row| row.get(0),
                )?;
                count + 1
            }
        };

        self.conn.execute(
            "INSERT INTO protocol_drugs (protocol_id, drug_id, position) VALUES (?1, ?2, ?3)",
            params![protocol_id, drug_id, position],
        )?;

        Ok(ProtocolDrug {
            protocol_id: protocol_id.to_string(),
            drug_id: drug_id.to_string(),
            position,
        })
    }

    /// Remove a drug from a protocol.
    pub fn remove_drug_from_protocol(&self, protocol_id: &str, drug_id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            "DELETE FROM protocol_drugs WHERE protocol_id = ?1 AND drug_id = ?2",
            params![protocol_id, drug_id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a protocol and its drug links.
    pub fn delete_protocol(&self, protocol_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM protocols WHERE protocol_id = ?", [protocol_id])?;
        Ok(rows_affected > 0)
    }
}

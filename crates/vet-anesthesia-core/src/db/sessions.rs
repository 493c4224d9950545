//! Session database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{AnesthesiaSession, SessionKind, SessionSummary, WalkInSession};

const SESSION_COLUMNS: &str =
    "session_id, animal_id, drug_id, dose_used_ml, notes, infusion_config_id, performed_at";

const WALK_IN_COLUMNS: &str =
    "session_id, species, animal_name, weight_kg, drug_id, dose_used_ml, notes, performed_at";

impl Database {
    /// Insert a session for a registered animal.
    pub fn insert_session(&self, session: &AnesthesiaSession) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO anesthesia_sessions (
                session_id, animal_id, drug_id, dose_used_ml, notes,
                infusion_config_id, performed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                session.session_id,
                session.animal_id,
                session.drug_id,
                session.dose_used_ml,
                session.notes,
                session.infusion_config_id,
                session.performed_at,
            ],
        )?;
        Ok(())
    }

    /// Get a registered session by ID.
    pub fn get_session(&self, session_id: &str) -> DbResult<Option<AnesthesiaSession>> {
        let sql = format!(
            "SELECT {} FROM anesthesia_sessions WHERE session_id = ?",
            SESSION_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, [session_id], session_from_row)
            .optional()?)
    }

    /// List registered sessions, most recent first.
    pub fn list_sessions(&self) -> DbResult<Vec<AnesthesiaSession>> {
        let sql = format!(
            "SELECT {} FROM anesthesia_sessions ORDER BY performed_at DESC",
            SESSION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], session_from_row)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    /// List sessions for one animal, most recent first.
    pub fn list_sessions_for_animal(&self, animal_id: &str) -> DbResult<Vec<AnesthesiaSession>> {
        let sql = format!(
            "SELECT {} FROM anesthesia_sessions WHERE animal_id = ? ORDER BY performed_at DESC",
            SESSION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([animal_id], session_from_row)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    /// Insert a walk-in session.
    pub fn insert_walk_in_session(&self, session: &WalkInSession) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO walk_in_sessions (
                session_id, species, animal_name, weight_kg, drug_id,
                dose_used_ml, notes, performed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                session.session_id,
                session.species,
                session.animal_name,
                session.weight_kg,
                session.drug_id,
                session.dose_used_ml,
                session.notes,
                session.performed_at,
            ],
        )?;
        Ok(())
    }

    /// Get a walk-in session by ID.
    pub fn get_walk_in_session(&self, session_id: &str) -> DbResult<Option<WalkInSession>> {
        let sql = format!(
            "SELECT {} FROM walk_in_sessions WHERE session_id = ?",
            WALK_IN_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, [session_id], walk_in_from_row)
            .optional()?)
    }

    /// List walk-in sessions, most recent first.
    pub fn list_walk_in_sessions(&self) -> DbResult<Vec<WalkInSession>> {
        let sql = format!(
            "SELECT {} FROM walk_in_sessions ORDER BY performed_at DESC",
            WALK_IN_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], walk_in_from_row)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    /// Registered and walk-in sessions in one list, most recent first.
    pub fn list_session_summaries(&self) -> DbResult<Vec<SessionSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.session_id, 'registered', COALESCE(a.name, 'N/A'),
                   COALESCE(d.name, 'N/A'), s.dose_used_ml, s.performed_at
            FROM anesthesia_sessions s
            LEFT JOIN animals a ON a.local_id = s.animal_id
            LEFT JOIN drugs d ON d.local_id = s.drug_id
            UNION ALL
            SELECT w.session_id, 'walk_in', w.animal_name || ' (walk-in)',
                   COALESCE(d.name, 'N/A'), w.dose_used_ml, w.performed_at
            FROM walk_in_sessions w
            LEFT JOIN drugs d ON d.local_id = w.drug_id
            ORDER BY 6 DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            let kind: String = row.get(1)?;
            Ok(SessionSummary {
                session_id: row.get(0)?,
                kind: if kind == "walk_in" {
                    SessionKind::WalkIn
                } else {
                    SessionKind::Registered
                },
                animal_label: row.get(2)?,
                drug_label: row.get(3)?,
                dose_used_ml: row.get(4)?,
                performed_at: row.get(5)?,
            })
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<AnesthesiaSession> {
    Ok(AnesthesiaSession {
        session_id: row.get(0)?,
        animal_id: row.get(1)?,
        drug_id: row.get(2)?,
        dose_used_ml: row.get(3)?,
        notes: row.get(4)?,
        infusion_config_id: row.get(5)?,
        performed_at: row.get(6)?,
    })
}

fn walk_in_from_row(row: &Row<'_>) -> rusqlite::Result<WalkInSession> {
    Ok(WalkInSession {
        session_id: row.get(0)?,
        species: row.get(1)?,
        animal_name: row.get(2)?,
        weight_kg: row.get(3)?,
        drug_id: row.get(4)?,
        dose_used_ml: row.get(5)?,
        notes: row.get(6)?,
        performed_at: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{Concentration, DoseUnit};
    use crate::models::{AdministrationMode, Animal, Drug};

    fn setup_db() -> (Database, Animal, Drug) {
        let db = Database::open_in_memory().unwrap();
        let animal = Animal::new("Rex".into(), "canine".into(), 10.0);
        db.insert_animal(&animal).unwrap();
        let drug = Drug::new(
            "Propofol".into(),
            4.0,
            DoseUnit::MG_PER_KG,
            Concentration::mg_per_ml(10.0),
            AdministrationMode::Bolus,
        );
        db.insert_drug(&drug).unwrap();
        (db, animal, drug)
    }

    #[test]
    fn test_insert_and_get_session() {
        let (db, animal, drug) = setup_db();

        let mut session =
            AnesthesiaSession::new(Some(animal.local_id.clone()), drug.local_id.clone(), 4.0);
        session.notes = Some("Smooth induction".into());
        db.insert_session(&session).unwrap();

        let retrieved = db.get_session(&session.session_id).unwrap().unwrap();
        assert_eq!(retrieved, session);
        assert_eq!(db.list_sessions_for_animal(&animal.local_id).unwrap().len(), 1);
    }

    #[test]
    fn test_session_requires_known_drug() {
        let (db, animal, _) = setup_db();
        let session = AnesthesiaSession::new(Some(animal.local_id), "no-such-drug".into(), 4.0);
        assert!(db.insert_session(&session).is_err());
    }

    #[test]
    fn test_deleting_animal_keeps_session() {
        let (db, animal, drug) = setup_db();
        let session =
            AnesthesiaSession::new(Some(animal.local_id.clone()), drug.local_id.clone(), 4.0);
        db.insert_session(&session).unwrap();

        db.delete_animal(&animal.local_id).unwrap();

        let retrieved = db.get_session(&session.session_id).unwrap().unwrap();
        assert!(retrieved.animal_id.is_none());
    }

    #[test]
    fn test_walk_in_round_trip() {
        let (db, _, drug) = setup_db();

        let session = WalkInSession::new("feline".into(), "Mia".into(), 4.0, drug.local_id, 1.6);
        db.insert_walk_in_session(&session).unwrap();

        let retrieved = db.get_walk_in_session(&session.session_id).unwrap().unwrap();
        assert_eq!(retrieved, session);
        assert_eq!(db.list_walk_in_sessions().unwrap().len(), 1);
        assert!(db.get_session(&session.session_id).unwrap().is_none());
    }

    #[test]
    fn test_session_summaries() {
        let (db, animal, drug) = setup_db();

        let mut registered =
            AnesthesiaSession::new(Some(animal.local_id.clone()), drug.local_id.clone(), 4.0);
        registered.performed_at = "2026-01-01T10:00:00+00:00".into();
        db.insert_session(&registered).unwrap();

        let mut walk_in =
            WalkInSession::new("feline".into(), "Mia".into(), 4.0, drug.local_id.clone(), 1.6);
        walk_in.performed_at = "2026-01-02T10:00:00+00:00".into();
        db.insert_walk_in_session(&walk_in).unwrap();

        let summaries = db.list_session_summaries().unwrap();
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].session_id, walk_in.session_id);
        assert_eq!(summaries[0].kind, SessionKind::WalkIn);
        assert_eq!(summaries[0].animal_label, "Mia (walk-in)");

        assert_eq!(summaries[1].kind, SessionKind::Registered);
        assert_eq!(summaries[1].animal_label, "Rex");
        assert_eq!(summaries[1].drug_label, "Propofol");
    }
}

//! Clinic database operations.

use rusqlite::{params, OptionalExtension};

use super::{map_write_error, Database};
use crate::models::Clinic;
use crate::store::StoreResult;

impl Database {
    /// Insert a new clinic.
    pub fn insert_clinic(&self, clinic: &Clinic) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO clinics (id, name, require_lot_location) VALUES (?1, ?2, ?3)",
                params![clinic.id, clinic.name, clinic.require_lot_location],
            )
            .map_err(map_write_error)?;
        Ok(())
    }

    /// Get a clinic by ID.
    pub fn get_clinic(&self, id: &str) -> StoreResult<Option<Clinic>> {
        self.conn
            .query_row(
                "SELECT id, name, require_lot_location FROM clinics WHERE id = ?",
                [id],
                |row| {
                    Ok(Clinic {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        require_lot_location: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Change whether a clinic requires Left/Right in lot codes.
    pub fn set_require_lot_location(&self, id: &str, required: bool) -> StoreResult<bool> {
        let rows_affected = self.conn.execute(
            "UPDATE clinics SET require_lot_location = ?2 WHERE id = ?1",
            params![id, required],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CatalogStore;

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let clinic = Clinic::new("Eastside".into(), true);
        db.insert_clinic(&clinic).unwrap();

        let retrieved = db.get_clinic(&clinic.id).unwrap().unwrap();
        assert_eq!(retrieved, clinic);
    }

    #[test]
    fn test_lot_location_setting() {
        let db = Database::open_in_memory().unwrap();
        let clinic = Clinic::new("Eastside".into(), false);
        db.insert_clinic(&clinic).unwrap();
        assert!(!db.clinic_requires_lot_location(&clinic.id).unwrap());

        assert!(db.set_require_lot_location(&clinic.id, true).unwrap());
        assert!(db.clinic_requires_lot_location(&clinic.id).unwrap());

        assert!(!db.set_require_lot_location("missing", true).unwrap());
    }
}

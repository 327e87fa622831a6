//! Inventory unit database operations.

use rusqlite::params;

use super::drugs::drug_from_row;
use super::{map_write_error, Database};
use crate::models::{InventoryItem, Unit};
use crate::store::StoreResult;

impl Database {
    /// Insert a unit of stock.
    pub fn insert_unit(&self, unit: &Unit) -> StoreResult<()> {
        self.conn
            .execute(
                r#"
                INSERT INTO units (id, clinic_id, drug_id, available_quantity, lot_code)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    unit.id,
                    unit.clinic_id,
                    unit.drug_id,
                    unit.available_quantity,
                    unit.lot_code,
                ],
            )
            .map_err(map_write_error)?;
        Ok(())
    }

    /// Set the available quantity of a unit.
    pub fn set_available_quantity(&self, unit_id: &str, quantity: i64) -> StoreResult<bool> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE units SET available_quantity = ?2 WHERE id = ?1",
                params![unit_id, quantity],
            )
            .map_err(map_write_error)?;
        Ok(rows_affected > 0)
    }

    /// In-stock units at a clinic joined to their drug, in insertion order.
    pub fn list_in_stock(&self, clinic_id: &str) -> StoreResult<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT u.id, u.clinic_id, u.drug_id, u.available_quantity, u.lot_code,
                   d.id, d.medication_name, d.generic_name, d.strength,
                   d.strength_unit, d.ndc, d.form
            FROM units u
            JOIN drugs d ON d.id = u.drug_id
            WHERE u.clinic_id = ?
              AND u.available_quantity > 0
            ORDER BY u.rowid
            "#,
        )?;

        let rows = stmt.query_map([clinic_id], |row| {
            Ok(InventoryItem {
                unit: Unit {
                    id: row.get(0)?,
                    clinic_id: row.get(1)?,
                    drug_id: row.get(2)?,
                    available_quantity: row.get(3)?,
                    lot_code: row.get(4)?,
                },
                drug: drug_from_row(row, 5)?,
            })
        })?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }
}

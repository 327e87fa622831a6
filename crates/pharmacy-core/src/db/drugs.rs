//! Drug catalog database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{like_pattern, map_write_error, Database, UNICODE_LOWER};
use crate::models::{Drug, DrugId};
use crate::store::{CatalogTextQuery, DrugAttributes, StoreResult};

const DRUG_COLUMNS: &str =
    "id, medication_name, generic_name, strength, strength_unit, ndc, form";

impl Database {
    /// Insert a catalog drug.
    pub(super) fn insert_drug_row(&self, drug: &Drug) -> StoreResult<DrugId> {
        self.conn
            .execute(
                r#"
                INSERT INTO drugs (
                    id, medication_name, generic_name, strength, strength_unit, ndc,
                    ndc_digits, form
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    drug.id,
                    drug.medication_name,
                    drug.generic_name,
                    drug.strength,
                    drug.strength_unit,
                    drug.ndc,
                    drug.normalized_ndc(),
                    drug.form,
                ],
            )
            .map_err(map_write_error)?;
        Ok(drug.id.clone())
    }

    /// Get a catalog drug by ID.
    pub fn get_drug(&self, id: &str) -> StoreResult<Option<Drug>> {
        self.conn
            .query_row(
                &format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE id = ?"),
                [id],
                |row| drug_from_row(row, 0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get the first catalog drug whose raw NDC equals `ndc`.
    pub fn get_drug_by_ndc(&self, ndc: &str) -> StoreResult<Option<Drug>> {
        self.conn
            .query_row(
                &format!("SELECT {DRUG_COLUMNS} FROM drugs WHERE ndc = ? ORDER BY rowid LIMIT 1"),
                [ndc],
                |row| drug_from_row(row, 0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a catalog drug by name (case-insensitive), strength, unit and form.
    pub fn get_drug_by_attributes(&self, attrs: &DrugAttributes<'_>) -> StoreResult<Option<Drug>> {
        self.conn
            .query_row(
                &format!(
                    r#"
                    SELECT {DRUG_COLUMNS} FROM drugs
                    WHERE {UNICODE_LOWER}(medication_name) = ?1
                      AND strength = ?2
                      AND strength_unit = ?3
                      AND form = ?4
                    ORDER BY rowid
                    LIMIT 1
                    "#
                ),
                params![
                    attrs.medication_name.to_lowercase(),
                    attrs.strength,
                    attrs.strength_unit,
                    attrs.form
                ],
                |row| drug_from_row(row, 0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Substring search over names and (optionally) NDC, in catalog order.
    ///
    /// Names are compared Unicode-lowercased; the NDC pattern is matched
    /// against the digits-only form of the stored NDC.
    pub fn search_drugs_by_text(&self, query: &CatalogTextQuery) -> StoreResult<Vec<Drug>> {
        let name_pattern = like_pattern(&query.text.to_lowercase());
        let ndc_pattern = query.ndc.as_deref().map(like_pattern);

        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {DRUG_COLUMNS} FROM drugs
            WHERE {UNICODE_LOWER}(medication_name) LIKE ?1 ESCAPE '\'
               OR {UNICODE_LOWER}(generic_name) LIKE ?1 ESCAPE '\'
               OR (?2 IS NOT NULL AND ndc_digits LIKE ?2 ESCAPE '\')
            ORDER BY rowid
            LIMIT ?3
            "#
        ))?;

        let rows = stmt.query_map(
            params![name_pattern, ndc_pattern, query.limit as i64],
            |row| drug_from_row(row, 0),
        )?;

        let mut drugs = Vec::new();
        for row in rows {
            drugs.push(row?);
        }
        Ok(drugs)
    }
}

/// Read a drug from `row` starting at column `offset` (see `DRUG_COLUMNS`).
pub(super) fn drug_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Drug> {
    Ok(Drug {
        id: row.get(offset)?,
        medication_name: row.get(offset + 1)?,
        generic_name: row.get(offset + 2)?,
        strength: row.get(offset + 3)?,
        strength_unit: row.get(offset + 4)?,
        ndc: row.get(offset + 5)?,
        form: row.get(offset + 6)?,
    })
}

//! Composite lot/QR code generation.
//!
//! Format: `{LOT}-{MMDDYY}-{MED4}-{DOSE2}[-{SEQ2}]`, e.g. `BL-020526-AMLO-05`.
//! The encoder is one-way; dosages of 100 or more are truncated, not rounded.

use chrono::Datelike;

/// Width of the medication segment.
const MEDICATION_CODE_LEN: usize = 4;

/// Width of the dose segment.
const DOSE_CODE_LEN: usize = 2;

/// Generate the scanner-facing code for a unit of stock.
///
/// `date` is read through its calendar fields, so pass a local date
/// (`chrono::Local::now().date_naive()`) to get the local day. A `sequence`
/// of zero or `None` is omitted.
pub fn generate_qr_code<D: Datelike>(
    lot_code: &str,
    date: &D,
    medication_name: &str,
    dosage: &str,
    sequence: Option<u32>,
) -> String {
    let mut code = format!(
        "{}-{}-{}-{}",
        lot_code.to_uppercase(),
        date_code(date),
        medication_code(medication_name),
        dose_code(dosage),
    );

    if let Some(seq) = sequence.filter(|s| *s > 0) {
        code.push_str(&format!("-{:02}", seq));
    }

    code
}

/// Zero-padded `MMDDYY`.
pub fn date_code<D: Datelike>(date: &D) -> String {
    format!(
        "{:02}{:02}{:02}",
        date.month(),
        date.day(),
        date.year().rem_euclid(100)
    )
}

/// First four alphanumerics of the name, uppercased, padded with `X`.
pub fn medication_code(medication_name: &str) -> String {
    let mut code: String = medication_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MEDICATION_CODE_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    while code.len() < MEDICATION_CODE_LEN {
        code.push('X');
    }
    code
}

/// Integer part of the dosage, left-padded to two digits and cut to two.
pub fn dose_code(dosage: &str) -> String {
    let numeric: String = dosage
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let integer = numeric.split('.').next().unwrap_or_default();

    format!("{:0>width$}", integer, width = DOSE_CODE_LEN)
        .chars()
        .take(DOSE_CODE_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_basic_code() {
        let code = generate_qr_code("BL", &date(2026, 2, 5), "Amlodipine", "5mg", None);
        assert_eq!(code, "BL-020526-AMLO-05");
    }

    #[test]
    fn test_sequence() {
        let d = date(2026, 2, 5);
        assert_eq!(
            generate_qr_code("BL", &d, "Amlodipine", "5mg", Some(2)),
            "BL-020526-AMLO-05-02"
        );
        assert_eq!(
            generate_qr_code("BL", &d, "Amlodipine", "5mg", Some(0)),
            "BL-020526-AMLO-05"
        );
        assert_eq!(
            generate_qr_code("BL", &d, "Amlodipine", "5mg", Some(123)),
            "BL-020526-AMLO-05-123"
        );
    }

    #[test]
    fn test_lot_code_uppercased() {
        let code = generate_qr_code("ar", &date(2025, 12, 31), "Zinc", "50mg", None);
        assert_eq!(code, "AR-123125-ZINC-50");
    }

    #[test]
    fn test_medication_code_padding() {
        assert_eq!(medication_code("Zinc"), "ZINC");
        assert_eq!(medication_code("ASA"), "ASAX");
        assert_eq!(medication_code("B-12"), "B12X");
        assert_eq!(medication_code(""), "XXXX");
        assert_eq!(medication_code("co-amoxiclav"), "COAM");
    }

    #[test]
    fn test_dose_code() {
        assert_eq!(dose_code("5mg"), "05");
        assert_eq!(dose_code("2.5mg"), "02");
        assert_eq!(dose_code("0.5 mL"), "00");
        assert_eq!(dose_code("81mg"), "81");
        // Truncated, not rounded
        assert_eq!(dose_code("250mg"), "25");
        assert_eq!(dose_code("1000"), "10");
        assert_eq!(dose_code("as needed"), "00");
    }

    #[test]
    fn test_date_code_padding() {
        assert_eq!(date_code(&date(2009, 1, 2)), "010209");
        assert_eq!(date_code(&date(2100, 10, 20)), "102000");
    }
}

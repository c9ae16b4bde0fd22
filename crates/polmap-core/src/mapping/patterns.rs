//! Common regex patterns for policy scan extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Label and currency tokens stripped before numeric parsing
    pub static ref LABEL_TOKENS: Regex = Regex::new(
        r"(?i)\b(?:prima|premio|total|importe|monto|uyu|usd|u\$s|pesos|d[oó]lares)\b[\s:]*|[$]"
    ).unwrap();

    // Uruguayan amount format: thousand-dot, decimal-comma (1.234,56)
    pub static ref AMOUNT_UY: Regex = Regex::new(
        r"\b(\d{1,3}(?:\.?\d{3})*),(\d{2})\b"
    ).unwrap();

    // Standard amount format: thousand-comma, decimal-dot (1,234.56)
    pub static ref AMOUNT_US: Regex = Regex::new(
        r"\b(\d{1,3}(?:,?\d{3})*)\.(\d{2})\b"
    ).unwrap();

    // Grouped integers without a decimal part (45.000 / 45,000)
    pub static ref AMOUNT_UY_GROUPED: Regex = Regex::new(
        r"\b(\d{1,3}(?:\.\d{3})+)\b"
    ).unwrap();

    pub static ref AMOUNT_US_GROUPED: Regex = Regex::new(
        r"\b(\d{1,3}(?:,\d{3})+)\b"
    ).unwrap();

    // Last-resort bare numeric token
    pub static ref AMOUNT_BARE: Regex = Regex::new(
        r"\b(\d+)(?:[.,](\d{1,2}))?\b"
    ).unwrap();

    // Date formats, tried in order: DD/MM/YYYY, YYYY-MM-DD, DD-MM-YYYY.
    // The slash variant captures up to four digits in the day slot so the
    // day/year swap recovery can fire on reversed OCR fields.
    pub static ref DATE_DMY_SLASH: Regex = Regex::new(
        r"\b(\d{1,4})/(\d{1,2})/(\d{1,4})\b"
    ).unwrap();

    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_DMY_DASH: Regex = Regex::new(
        r"\b(\d{1,2})-(\d{1,2})-(\d{2,4})\b"
    ).unwrap();

    // Policy numbers: digits-only run of length 7-9 inside a blob
    pub static ref POLICY_DIGITS: Regex = Regex::new(
        r"\b(\d{7,9})\b"
    ).unwrap();

    // Labeled endorsement inside a blob
    pub static ref ENDORSEMENT_LABEL: Regex = Regex::new(
        r"(?i)endoso[\s:]*(\d+)"
    ).unwrap();

    // Labeled installment count inside a blob
    pub static ref INSTALLMENT_LABEL: Regex = Regex::new(
        r"(?i)(?:cuotas?|pagos?)[\s:]*(\d{1,2})\b"
    ).unwrap();

    // Vehicle year
    pub static ref YEAR_RUN: Regex = Regex::new(
        r"\b(19\d{2}|20\d{2})\b"
    ).unwrap();

    // Uruguayan plate shapes (current SAB1234, older A123456 family,
    // Mercosur AB123CD)
    pub static ref PLATE_STANDARD: Regex = Regex::new(
        r"\b([A-Z]{3}\d{4})\b"
    ).unwrap();

    pub static ref PLATE_LEGACY: Regex = Regex::new(
        r"\b([A-Z]{2}\d{4,6})\b"
    ).unwrap();

    pub static ref PLATE_MERCOSUR: Regex = Regex::new(
        r"\b([A-Z]{2}\d{3}[A-Z]{2})\b"
    ).unwrap();
}

/// Plate patterns in preference order for the blind record scan.
pub fn plate_patterns() -> [&'static Regex; 3] {
    [&PLATE_STANDARD, &PLATE_MERCOSUR, &PLATE_LEGACY]
}

/// Placeholder labels OCR sometimes returns instead of an actual plate.
pub const PLATE_PLACEHOLDERS: [&str; 5] = ["PATENTE", "MATRICULA", "MATRÍCULA", "PLACA", "CHAPA"];

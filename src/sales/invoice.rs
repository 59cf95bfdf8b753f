use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;

pub const SALE_INVOICE_PREFIX: &str = "INV";

const RANDOM_SUFFIX_LEN: usize = 6;

/// Generate a human-readable invoice number: prefix, YYMMDD, and six random
/// uppercase alphanumerics. Uniqueness relies on the random tail plus the
/// date segment; the database does not enforce it.
pub fn generate_invoice_number(prefix: &str) -> String {
    let date_segment = Utc::now().format("%y%m%d");
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();

    format!("{}{}{}", prefix, date_segment, suffix)
}

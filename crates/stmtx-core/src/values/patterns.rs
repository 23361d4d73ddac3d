//! Token shapes shared by the normalizers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 1.234,56 / 1234,56 / 4,929 / 920
    pub static ref GERMAN_NUMBER: Regex = Regex::new(
        r"^\d+(?:\.\d{3})*(?:,\d+)?$"
    ).unwrap();

    // 1,234.56 / 1234.56
    pub static ref ENGLISH_NUMBER: Regex = Regex::new(
        r"^\d+(?:,\d{3})*(?:\.\d+)?$"
    ).unwrap();

    // 1'234.56 / 1234.56
    pub static ref SWISS_NUMBER: Regex = Regex::new(
        r"^\d+(?:'\d{3})*(?:\.\d+)?$"
    ).unwrap();

    // 14.01.2021 / 1.2.21
    pub static ref DATE_DMY: Regex = Regex::new(
        r"^(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})$"
    ).unwrap();

    // Three-letter upper case currency code.
    pub static ref CURRENCY_CODE: Regex = Regex::new(
        r"^[A-Z]{3}$"
    ).unwrap();
}

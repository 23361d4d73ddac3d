//! Currency reference data.

use lazy_static::lazy_static;
use std::collections::HashSet;

use super::patterns::CURRENCY_CODE;

lazy_static! {
    /// Active ISO 4217 codes, plus the pence quotation unit `GBX` and the
    /// retired `HRK` that older statements still print.
    static ref KNOWN_CURRENCIES: HashSet<&'static str> = [
        "AED", "AFN", "ALL", "AMD", "ANG", "AOA", "ARS", "AUD", "AWG", "AZN", "BAM",
        "BBD", "BDT", "BGN", "BHD", "BIF", "BMD", "BND", "BOB", "BOV", "BRL", "BSD",
        "BTN", "BWP", "BYN", "BZD", "CAD", "CDF", "CHE", "CHF", "CHW", "CLF", "CLP",
        "CNY", "COP", "COU", "CRC", "CUP", "CVE", "CZK", "DJF", "DKK", "DOP", "DZD",
        "EGP", "ERN", "ETB", "EUR", "FJD", "FKP", "GBP", "GBX", "GEL", "GHS", "GIP",
        "GMD", "GNF", "GTQ", "GYD", "HKD", "HNL", "HRK", "HTG", "HUF", "IDR", "ILS",
        "INR", "IQD", "IRR", "ISK", "JMD", "JOD", "JPY", "KES", "KGS", "KHR", "KMF",
        "KPW", "KRW", "KWD", "KYD", "KZT", "LAK", "LBP", "LKR", "LRD", "LSL", "LYD",
        "MAD", "MDL", "MGA", "MKD", "MMK", "MNT", "MOP", "MRU", "MUR", "MVR", "MWK",
        "MXN", "MXV", "MYR", "MZN", "NAD", "NGN", "NIO", "NOK", "NPR", "NZD", "OMR",
        "PAB", "PEN", "PGK", "PHP", "PKR", "PLN", "PYG", "QAR", "RON", "RSD", "RUB",
        "RWF", "SAR", "SBD", "SCR", "SDG", "SEK", "SGD", "SHP", "SLE", "SLL", "SOS",
        "SRD", "SSP", "STN", "SVC", "SYP", "SZL", "THB", "TJS", "TMT", "TND", "TOP",
        "TRY", "TTD", "TWD", "TZS", "UAH", "UGX", "USD", "USN", "UYI", "UYU", "UYW",
        "UZS", "VED", "VES", "VND", "VUV", "WST", "XAF", "XAG", "XAU", "XCD", "XCG",
        "XDR", "XOF", "XPD", "XPF", "XPT", "YER", "ZAR", "ZMW", "ZWG", "ZWL",
    ]
    .into_iter()
    .collect();
}

/// Check whether `code` is a currency the reference table knows.
pub fn is_known_currency(code: &str) -> bool {
    CURRENCY_CODE.is_match(code) && KNOWN_CURRENCIES.contains(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_currencies() {
        assert!(is_known_currency("EUR"));
        assert!(is_known_currency("USD"));
        assert!(!is_known_currency("eur"));
        assert!(!is_known_currency("EURO"));
        assert!(!is_known_currency("XYZ"));
    }

    #[test]
    fn test_full_iso_list() {
        for code in ["VND", "PEN", "KES", "NGN", "MAD", "XOF", "UYU"] {
            assert!(is_known_currency(code), "{code}");
        }
        assert!(is_known_currency("GBX"));
        assert!(!is_known_currency("XXX"));
    }
}

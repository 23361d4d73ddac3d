//! Built-in bank definitions.

pub mod mlp_banking;

use crate::engine::ValueSource;
use crate::error::{ConfigError, ExtractionError};
use crate::extractor::BankExtractor;
use crate::models::{Security, StmtxConfig};

/// Every built-in bank extractor, in dispatch order.
pub fn all(config: &StmtxConfig) -> Result<Vec<BankExtractor>, ConfigError> {
    Ok(vec![mlp_banking::extractor(config)?])
}

/// Security from `name`, `isin` and `wkn` values of a capture map or context.
pub(crate) fn security_from(
    values: &dyn ValueSource,
    currency: Option<String>,
) -> Result<Security, ExtractionError> {
    let name = values
        .value("name")
        .ok_or_else(|| ExtractionError::MissingAttribute("name".to_string()))?;

    Ok(Security {
        name: name.trim().to_string(),
        isin: values.value("isin").map(|s| s.trim().to_string()),
        wkn: values.value("wkn").map(|s| s.trim().to_string()),
        currency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Context;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_security_from_context() {
        let mut ctx = Context::new();
        ctx.put("name", "SAUREN GLOBAL BALANCED ");
        ctx.put("isin", "LU0106280836");

        let security = security_from(&ctx, Some("EUR".to_string())).unwrap();
        assert_eq!(
            security,
            Security {
                name: "SAUREN GLOBAL BALANCED".to_string(),
                isin: Some("LU0106280836".to_string()),
                wkn: None,
                currency: Some("EUR".to_string()),
            }
        );
        assert!(security_from(&Context::new(), None).is_err());
    }
}

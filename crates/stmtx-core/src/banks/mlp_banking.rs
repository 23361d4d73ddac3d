//! MLP Banking AG statements: buys, sells, tax adjustments and fund
//! distributions.

use crate::engine::fx;
use crate::engine::{Block, DocumentMatcher, EngineLimits, TemplateBuilder, TransactionTemplate};
use crate::error::{ConfigError, ExtractionError};
use crate::extractor::BankExtractor;
use crate::models::{
    AccountKind, AccountTransaction, BuySellEntry, FeeCategory, Item, Money, PortfolioKind,
    StmtxConfig, TaxCategory, TransactionSubject,
};
use crate::values::Normalizer;

use super::security_from;

pub const LABEL: &str = "MLP Banking AG";

const DIVIDEND_MARKER: &str = r"(Gutschrift von .*|Aussch.ttung Investmentfonds|Dividendengutschrift|Thesaurierung von Investmentertr.gen)";

const TAX_LINES: [(&str, TaxCategory); 3] = [
    // Kapitalertragsteuer 25,00% auf 2.809,62 EUR 702,41- EUR
    (
        r"^Kapitalertragsteuer [\.,\d]+ ?% .* [\.,\d]+ [\w]{3} (?<tax>[\.,\d]+)\- (?<currency>[\w]{3})$",
        TaxCategory::CapitalGains,
    ),
    // Solidaritätszuschlag 5,50% auf 702,41 EUR 38,63- EUR
    (
        r"^Solidarit.tszuschlag [\.,\d]+ ?% .* [\.,\d]+ [\w]{3} (?<tax>[\.,\d]+)\- (?<currency>[\w]{3})$",
        TaxCategory::SolidaritySurcharge,
    ),
    // Kirchensteuer 8 % auf 2,70 EUR 0,21- EUR
    (
        r"^Kirchensteuer [\.,\d]+ ?% .* [\.,\d]+ [\w]{3} (?<tax>[\.,\d]+)\- (?<currency>[\w]{3})$",
        TaxCategory::ChurchTax,
    ),
];

pub fn extractor(config: &StmtxConfig) -> Result<BankExtractor, ConfigError> {
    let n = Normalizer::from_config(&config.extraction);
    let limits = config.extraction.engine_limits();

    Ok(BankExtractor::new(LABEL)
        .identifier("MLP Banking AG")
        .identifier("MLP FDL AG")
        .matcher(buy_sell(&n, limits)?)
        .matcher(dividends(&n, limits)?))
}

fn buy_sell(n: &Normalizer, limits: EngineLimits) -> Result<DocumentMatcher<Item>, ConfigError> {
    let builder = TransactionTemplate::builder(|| BuySellEntry::new(PortfolioKind::Buy))
        .limits(limits)
        .section(&["type"])
        .optional()
        .pattern(r"^Wertpapier Abrechnung (?<type>(Kauf|Verkauf))$")
        .assign(|t, v, _| {
            if v.get("type")? == "Verkauf" {
                t.kind = PortfolioKind::Sell;
            }
            Ok(())
        })
        // Stück 4,929 SAUREN GLOBAL BALANCED LU0106280836 (930920)
        // INHABER-ANTEILE A O.N
        // Ausführungskurs 20,29 EUR
        .section(&["name", "isin", "wkn", "name1", "currency"])
        .pattern(r"^St.ck [\.,\d]+ (?<name>.*) (?<isin>[\w]{12}) \((?<wkn>.*)\)$")
        .pattern(r"^(?<name1>.*)$")
        .pattern(r"^Ausf.hrungskurs [\.,\d]+ (?<currency>[\w]{3})")
        .assign({
            let n = n.clone();
            move |t, v, ctx| {
                let name1 = v.get("name1")?.trim().to_string();
                if !name1.starts_with("Handels-/Ausführungsplatz") {
                    let name = format!("{} {}", v.get("name")?.trim(), name1);
                    v.insert("name", name);
                }

                let currency = n.currency(v.get("currency")?);
                t.security = Some(security_from(&*v, Some(currency))?);

                // read back by the tax adjustment block
                ctx.put("name", v.get("name")?);
                ctx.put("isin", v.get("isin")?);
                ctx.put("wkn", v.get("wkn")?);
                Ok(())
            }
        })
        .section(&["shares"])
        .optional()
        .pattern(r"^St.ck (?<shares>[\.,\d]+) .* [\w]{12} \(.*\)$")
        .assign({
            let n = n.clone();
            move |t, v, ctx| {
                let shares = v.get("shares")?;
                t.shares = n.shares(shares)?;
                ctx.put("shares", shares);
                Ok(())
            }
        })
        // Schlusstag 14.01.2021
        .section(&["date"])
        .pattern(r"^Schlusstag (?<date>\d{2}\.\d{2}\.\d{4}).*")
        .assign({
            let n = n.clone();
            move |t, v, _| {
                t.date = Some(n.date(v.get("date")?)?);
                Ok(())
            }
        })
        // Ausmachender Betrag 100,01- EUR
        .section(&["amount", "currency"])
        .pattern(r"^Ausmachender Betrag (?<amount>[\.,\d]+)(\-)? (?<currency>[\w]{3})$")
        .assign({
            let n = n.clone();
            move |t, v, _| {
                let currency = n.currency(v.get("currency")?);
                t.money = Some(Money::of(currency, n.amount(v.get("amount")?)?));
                Ok(())
            }
        })
        // Devisenkurs (EUR/USD) 1,141 vom 18.02.2022
        // Kurswert 24.013,85 EUR
        .section(&["fxCurrency", "exchangeRate", "gross", "currency"])
        .optional()
        .pattern(r"^Devisenkurs \([\w]{3}\/(?<fxCurrency>[\w]{3})\) (?<exchangeRate>[\.,\d]+) .*$")
        .pattern(r"^Kurswert (?<gross>[\.,\d]+)(\-)? (?<currency>[\w]{3})$")
        .assign({
            let n = n.clone();
            move |t, v, ctx| {
                let tx_currency = transaction_currency(t)?;
                let fx_currency = n.currency(v.get("fxCurrency")?);
                let quoted = n.exchange_rate(v.get("exchangeRate")?)?;
                let rate = fx::resolve_exchange_rate(quoted, &tx_currency, &fx_currency)?;
                fx::store_rate(ctx, rate);

                let gross = Money::of(n.currency(v.get("currency")?), n.amount(v.get("gross")?)?);
                let fx_gross = Money::of(fx_currency, fx::multiply(gross.amount, rate)?);
                fx::check_and_set_gross_unit(gross, fx_gross, t, ctx);
                Ok(())
            }
        })
        // Veräußerungsverlust 3,00- EUR
        .section(&["note"])
        .optional()
        .pattern(r"^(?<note>Ver.ußerungsverlust [\.,\d]+\- [\w]{3})$")
        .assign(|t, v, _| {
            t.note = Some(v.get("note")?.trim().to_string());
            Ok(())
        });

    let template = taxes_and_fees(builder, n).wrap(|t, _| Some(Item::BuySell(t)))?;

    DocumentMatcher::builder("MLP buy/sell", r"Abrechnung (Kauf|Verkauf)")
        .limits(limits)
        .block(Block::new(r"^Wertpapier Abrechnung (Kauf|Verkauf)$", limits, template)?)
        .block(tax_adjustment(n, limits)?)
        .build()
}

/// The tax adjustment printed below a sale; declared after the trade
/// block so the security and shares are already in the context.
fn tax_adjustment(n: &Normalizer, limits: EngineLimits) -> Result<Block<Item>, ConfigError> {
    let template = TransactionTemplate::builder(|| AccountTransaction::new(AccountKind::TaxRefund))
        .limits(limits)
        // Ausmachender Betrag 0,79 EUR
        // Den Gegenwert buchen wir mit Valuta 03.03.2022 zu Gunsten des Kontos 1111111111111
        .section(&["amount", "currency", "date"])
        .optional()
        .pattern(r"^Ausmachender Betrag (?<amount>[\.,\d]+) (?<currency>[\w]{3})$")
        .pattern(r"^Den Gegenwert buchen wir mit Valuta (?<date>\d{2}\.\d{2}\.\d{4}) .*$")
        .assign({
            let n = n.clone();
            move |t, v, ctx| {
                t.shares = n.shares(ctx.require("shares")?)?;
                t.security = Some(security_from(&*ctx, None)?);
                t.date = Some(n.date(v.get("date")?)?);
                t.money = Some(Money::of(
                    n.currency(v.get("currency")?),
                    n.amount(v.get("amount")?)?,
                ));
                Ok(())
            }
        })
        .wrap(|t, _| {
            if t.money.as_ref().is_some_and(|m| !m.is_zero()) {
                Some(Item::Transaction(t))
            } else {
                None
            }
        })?;

    Block::new(r"^Steuerliche Ausgleichrechnung$", limits, template)
}

fn dividends(n: &Normalizer, limits: EngineLimits) -> Result<DocumentMatcher<Item>, ConfigError> {
    let builder = TransactionTemplate::builder(|| AccountTransaction::new(AccountKind::Dividends))
        .limits(limits)
        // A reinvested gross distribution is a tax refund if the
        // settlement is positive and taxes if it is negative.
        .section(&["type", "sign"])
        .optional()
        .pattern(r"^.* (?<type>(Aussch.ttung|Dividende|Ertrag|Thesaurierung brutto)) pro (St\.|St.ck) [\.,\d]+ [\w]{3}$")
        .pattern(r"^Ausmachender Betrag [\.,\d]+(?<sign>(\+|\-))? (?<currency>[\w]{3})$")
        .assign(|t, v, _| {
            if v.get("type")? == "Thesaurierung brutto" {
                match v.get("sign")? {
                    "+" => t.kind = AccountKind::TaxRefund,
                    "-" => t.kind = AccountKind::Taxes,
                    _ => {}
                }
            }
            Ok(())
        })
        // Stück 920 ISHSIV-FA.AN.HI.YI.CO.BD U.ETF IE00BYM31M36 (A2AFCX)
        // REGISTERED SHARES USD O.N.
        // Zahlbarkeitstag 29.12.2017 Ertrag pro St. 0,123000000 USD
        .section(&["name", "isin", "wkn", "name1", "currency"])
        .pattern(r"^St.ck [\.,\d]+ (?<name>.*) (?<isin>[\w]{12}) \((?<wkn>.*)\)$")
        .pattern(r"(?<name1>.*)")
        .pattern(
            r"^(Zahlbarkeitstag|Tag des Zuflusses) \d{2}\.\d{2}\.\d{4} (Aussch.ttung|Dividende|Ertrag|Thesaurierung brutto) pro (St\.|St.ck) [\.,\d]+ (?<currency>[\w]{3})$",
        )
        .assign({
            let n = n.clone();
            move |t, v, _| {
                let name1 = v.get("name1")?.trim().to_string();
                if !name1.starts_with("Zahlbarkeitstag") && !name1.starts_with("Tag des Zuflusses") {
                    let name = format!("{} {}", v.get("name")?.trim(), name1);
                    v.insert("name", name);
                }

                let currency = n.currency(v.get("currency")?);
                t.security = Some(security_from(&*v, Some(currency))?);
                Ok(())
            }
        })
        .section(&["shares"])
        .pattern(r"^St.ck (?<shares>[\.,\d]+) .*$")
        .assign({
            let n = n.clone();
            move |t, v, _| {
                t.shares = n.shares(v.get("shares")?)?;
                Ok(())
            }
        })
        // Den Betrag buchen wir mit Wertstellung 03.01.2018 zu Gunsten des Kontos xxxxxxxxxx
        .section(&["date"])
        .pattern(r"^Den Betrag buchen wir mit Wertstellung (?<date>\d{2}\.\d{2}\.\d{4}) .*$")
        .assign({
            let n = n.clone();
            move |t, v, _| {
                t.date = Some(n.date(v.get("date")?)?);
                Ok(())
            }
        })
        // Ausmachender Betrag 68,87+ EUR
        .section(&["amount", "currency"])
        .pattern(r"^Ausmachender Betrag (?<amount>[\.,\d]+)(\+|\-)? (?<currency>[\w]{3})$")
        .assign({
            let n = n.clone();
            move |t, v, _| {
                let currency = n.currency(v.get("currency")?);
                t.money = Some(Money::of(currency, n.amount(v.get("amount")?)?));
                Ok(())
            }
        })
        // Devisenkurs EUR / USD 1,2095
        // Ausschüttung 113,16 USD 93,56+ EUR
        .section(&["exchangeRate", "fxGross", "fxCurrency", "gross", "currency"])
        .optional()
        .pattern(r"^Devisenkurs .* (?<exchangeRate>[\.,\d]+)$")
        .pattern(r"^(Aussch.ttung|Dividendengutschrift) (?<fxGross>[\.,\d]+) (?<fxCurrency>[\w]{3}) (?<gross>[\.,\d]+)\+ (?<currency>[\w]{3})$")
        .assign({
            let n = n.clone();
            move |t, v, ctx| {
                let tx_currency = transaction_currency(t)?;
                let fx_currency = n.currency(v.get("fxCurrency")?);
                let quoted = n.exchange_rate(v.get("exchangeRate")?)?;
                let rate = fx::resolve_exchange_rate(quoted, &tx_currency, &fx_currency)?;
                fx::store_rate(ctx, rate);

                let gross = Money::of(n.currency(v.get("currency")?), n.amount(v.get("gross")?)?);
                let fx_gross = Money::of(fx_currency, n.amount(v.get("fxGross")?)?);
                fx::check_and_set_gross_unit(gross, fx_gross, t, ctx);
                Ok(())
            }
        });

    let template = taxes_and_fees(builder, n).wrap(|t, _| Some(Item::Transaction(t)))?;

    DocumentMatcher::builder("MLP distribution", DIVIDEND_MARKER)
        .limits(limits)
        .block(Block::new(&format!("^{}$", DIVIDEND_MARKER), limits, template)?)
        .build()
}

/// Optional tax and fee lines shared by all transaction types.
fn taxes_and_fees<S>(builder: TemplateBuilder<S>, n: &Normalizer) -> TemplateBuilder<S>
where
    S: TransactionSubject + 'static,
{
    let builder = TAX_LINES.iter().fold(builder, |builder, &(pattern, category)| {
        let n = n.clone();
        builder
            .section(&["tax", "currency"])
            .optional()
            .pattern(pattern)
            .assign(move |t, v, ctx| {
                let tax = Money::of(n.currency(v.get("currency")?), n.amount(v.get("tax")?)?);
                fx::add_tax(t, tax, category, ctx);
                Ok(())
            })
    });

    // Ihr Ausgabeaufschlag betraegt:
    // 0,00 EUR (0,000 Prozent)
    let n = n.clone();
    builder
        .section(&["fee", "currency"])
        .optional()
        .pattern(r"^(?<fee>[\.,\d]+) (?<currency>[\w]{3}) \([\.,\d]+ Prozent\)$")
        .assign(move |t, v, ctx| {
            let fee = Money::of(n.currency(v.get("currency")?), n.amount(v.get("fee")?)?);
            fx::add_fee(t, fee, FeeCategory::SalesLoad, ctx);
            Ok(())
        })
}

fn transaction_currency<T: TransactionSubject>(t: &T) -> Result<String, ExtractionError> {
    t.currency()
        .map(str::to_string)
        .ok_or_else(|| ExtractionError::Invalid {
            field: "exchangeRate".to_string(),
            reason: "no settlement amount".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::extractor::{DocumentInput, StatementExtractor};
    use crate::models::{Security, UnitKind};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const BUY: &str = "\
MLP Banking AG · Alte Heerstraße 40 · 69168 Wiesloch
Herrn Max Mustermann
Wertpapier Abrechnung Kauf
Nominale Wertpapierbezeichnung ISIN (WKN)
Stück 4,929 SAUREN GLOBAL BALANCED LU0106280836 (930920)
INHABER-ANTEILE A O.N
Handels-/Ausführungsplatz Außerbörslich (gemäß Weisung)
Schlusstag 14.01.2021
Ausführungskurs 20,29 EUR
Kurswert 100,01- EUR
Ihr Ausgabeaufschlag betraegt:
0,00 EUR (0,000 Prozent)
Ausmachender Betrag 100,01- EUR
Den Gegenwert buchen wir mit Valuta 18.01.2021 zu Lasten des Kontos 1111111111
";

    const FX_BUY: &str = "\
MLP Banking AG
Wertpapier Abrechnung Kauf
Stück 200 APPLE INC. US0378331005 (865985)
REGISTERED SHARES O.N.
Schlusstag 18.02.2022
Ausführungskurs 136,96 USD
Devisenkurs (EUR/USD) 1,141 vom 18.02.2022
Kurswert 24.013,85- EUR
Ausmachender Betrag 24.013,85- EUR
";

    const SELL_WITH_TAX_ADJUSTMENT: &str = "\
MLP Banking AG
Wertpapier Abrechnung Verkauf
Stück 4,929 SAUREN GLOBAL BALANCED LU0106280836 (930920)
INHABER-ANTEILE A O.N
Schlusstag 01.03.2022
Ausführungskurs 19,68 EUR
Kurswert 97,00 EUR
Veräußerungsverlust 3,00- EUR
Ausmachender Betrag 97,00 EUR
Steuerliche Ausgleichrechnung
Bemessungsgrundlage 3,00- EUR
Kapitalertragsteuer 0,75 EUR
Ausmachender Betrag 0,79 EUR
Den Gegenwert buchen wir mit Valuta 03.03.2022 zu Gunsten des Kontos 1111111111111
";

    const DIVIDEND_HEAD: &str = "\
MLP Banking AG
Ausschüttung Investmentfonds
Stück 920 ISHSIV-FA.AN.HI.YI.CO.BD U.ETF IE00BYM31M36 (A2AFCX)
REGISTERED SHARES USD O.N.
Zahlbarkeitstag 29.12.2017 Ausschüttung pro St. 0,123000000 USD
Bestandsstichtag 28.12.2017
Devisenkurs EUR / USD 1,2095
Ausschüttung 113,16 USD 93,56+ EUR
";

    const DIVIDEND_TAXES: [&str; 3] = [
        "Kapitalertragsteuer 25,00% auf 65,49 EUR 16,37- EUR",
        "Solidaritätszuschlag 5,50% auf 16,37 EUR 0,90- EUR",
        "Kirchensteuer 8 % auf 16,37 EUR 1,31- EUR",
    ];

    fn extract(text: &str) -> (Vec<Item>, Vec<crate::error::ErrorRecord>) {
        let bank = extractor(&StmtxConfig::default()).unwrap();
        let out = bank.extract(&DocumentInput::new("statement.pdf", text));
        (out.items, out.errors)
    }

    fn dividend(taxes: &[&str]) -> String {
        let gross = 9356;
        let withheld: i64 = [1637, 90, 131][..taxes.len()].iter().sum();
        let net = gross - withheld;
        let mut text = DIVIDEND_HEAD.to_string();
        for tax in taxes {
            text.push_str(tax);
            text.push('\n');
        }
        text.push_str(&format!(
            "Ausmachender Betrag {},{:02}+ EUR\n",
            net / 100,
            net % 100
        ));
        text.push_str("Den Betrag buchen wir mit Wertstellung 03.01.2018 zu Gunsten des Kontos 1234567890 (IBAN DE00 0000 0000\n");
        text
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_buy() {
        let (items, errors) = extract(BUY);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(items.len(), 1);

        let Item::BuySell(entry) = &items[0] else {
            panic!("expected a buy/sell entry");
        };
        assert_eq!(entry.kind, PortfolioKind::Buy);
        assert_eq!(entry.shares, 4929);
        assert_eq!(entry.date, date(2021, 1, 14));
        assert_eq!(entry.money, Some(Money::of("EUR", 10001)));
        assert_eq!(
            entry.security,
            Some(Security {
                name: "SAUREN GLOBAL BALANCED INHABER-ANTEILE A O.N".to_string(),
                isin: Some("LU0106280836".to_string()),
                wkn: Some("930920".to_string()),
                currency: Some("EUR".to_string()),
            })
        );
        assert!(entry.units.is_empty());
        assert_eq!(entry.gross_value(), 10001);
    }

    #[test]
    fn test_fx_buy_attaches_gross_value() {
        let (items, errors) = extract(FX_BUY);
        assert!(errors.is_empty(), "{:?}", errors);

        let Item::BuySell(entry) = &items[0] else {
            panic!("expected a buy/sell entry");
        };
        assert_eq!(entry.money, Some(Money::of("EUR", 2_401_385)));

        let unit = entry.gross_value_unit().unwrap();
        assert_eq!(unit.amount, Money::of("EUR", 2_401_385));
        assert_eq!(unit.forex, Some(Money::of("USD", 2_739_980)));
        assert_eq!(unit.exchange_rate, Some(Decimal::from_str("1.141").unwrap()));
    }

    #[test]
    fn test_sales_load_is_accumulated() {
        let text = BUY
            .replace("0,00 EUR (0,000 Prozent)", "5,00 EUR (5,000 Prozent)")
            .replace("Ausmachender Betrag 100,01- EUR", "Ausmachender Betrag 105,01- EUR");
        let (items, errors) = extract(&text);
        assert!(errors.is_empty(), "{:?}", errors);

        let Item::BuySell(entry) = &items[0] else {
            panic!("expected a buy/sell entry");
        };
        assert_eq!(entry.money, Some(Money::of("EUR", 10501)));
        assert_eq!(items[0].total_fees(), 500);
        assert_eq!(items[0].total_taxes(), 0);
        assert_eq!(entry.gross_value(), 10001);
        assert_eq!(entry.units.len(), 1);
        assert_eq!(entry.units[0].kind, UnitKind::Fee(FeeCategory::SalesLoad));
    }

    #[test]
    fn test_settlement_in_currency_outside_common_set() {
        let text = BUY
            .replace("Ausführungskurs 20,29 EUR", "Ausführungskurs 20,29 VND")
            .replace("Ausmachender Betrag 100,01- EUR", "Ausmachender Betrag 1.000,00- VND");
        let (items, errors) = extract(&text);
        assert!(errors.is_empty(), "{:?}", errors);

        assert_eq!(items[0].money(), Some(&Money::of("VND", 100_000)));
        assert_eq!(items[0].security().and_then(|s| s.currency.as_deref()), Some("VND"));
    }

    #[test]
    fn test_fx_buy_keeps_quoted_currency() {
        let text = FX_BUY
            .replace("Ausführungskurs 136,96 USD", "Ausführungskurs 20,00 PEN")
            .replace("Devisenkurs (EUR/USD) 1,141", "Devisenkurs (EUR/PEN) 4,0")
            .replace("Kurswert 24.013,85- EUR", "Kurswert 1.000,00- EUR")
            .replace("Ausmachender Betrag 24.013,85- EUR", "Ausmachender Betrag 1.000,00- EUR");
        let (items, errors) = extract(&text);
        assert!(errors.is_empty(), "{:?}", errors);

        let Item::BuySell(entry) = &items[0] else {
            panic!("expected a buy/sell entry");
        };
        assert_eq!(entry.security.as_ref().and_then(|s| s.currency.as_deref()), Some("PEN"));

        let unit = entry.gross_value_unit().unwrap();
        assert_eq!(unit.amount, Money::of("EUR", 100_000));
        assert_eq!(unit.forex, Some(Money::of("PEN", 400_000)));
        assert_eq!(unit.exchange_rate, Some(Decimal::from(4)));
    }

    #[test]
    fn test_settlement_in_quoted_currency_inverts_rate() {
        let text = FX_BUY.replace(
            "Ausmachender Betrag 24.013,85- EUR",
            "Ausmachender Betrag 27.399,80- USD",
        );
        let (items, errors) = extract(&text);
        assert!(errors.is_empty(), "{:?}", errors);

        let Item::BuySell(entry) = &items[0] else {
            panic!("expected a buy/sell entry");
        };
        assert_eq!(entry.money, Some(Money::of("USD", 2_739_980)));

        // The EUR gross is carried as the foreign side at 1 / 1,141.
        let unit = entry.gross_value_unit().unwrap();
        assert_eq!(unit.amount, Money::of("USD", 2_104_632));
        assert_eq!(unit.forex, Some(Money::of("EUR", 2_401_385)));
        assert_eq!(unit.exchange_rate, Some(Decimal::from_str("0.8764241893").unwrap()));
    }

    #[test]
    fn test_direction_is_exclusive() {
        let (buy, _) = extract(BUY);
        let (sell, _) = extract(&BUY.replace("Abrechnung Kauf", "Abrechnung Verkauf"));

        assert_eq!(buy.iter().map(Item::type_label).collect::<Vec<_>>(), vec!["BUY"]);
        assert_eq!(sell.iter().map(Item::type_label).collect::<Vec<_>>(), vec!["SELL"]);
    }

    #[test]
    fn test_sell_hands_security_to_tax_adjustment() {
        let (items, errors) = extract(SELL_WITH_TAX_ADJUSTMENT);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(items.len(), 2);

        let Item::BuySell(sell) = &items[0] else {
            panic!("expected a buy/sell entry");
        };
        assert_eq!(sell.kind, PortfolioKind::Sell);
        assert_eq!(sell.money, Some(Money::of("EUR", 9700)));
        assert_eq!(sell.note.as_deref(), Some("Veräußerungsverlust 3,00- EUR"));

        let Item::Transaction(refund) = &items[1] else {
            panic!("expected an account transaction");
        };
        assert_eq!(refund.kind, AccountKind::TaxRefund);
        assert_eq!(refund.money, Some(Money::of("EUR", 79)));
        assert_eq!(refund.date, date(2022, 3, 3));
        assert_eq!(refund.shares, 4929);
        assert_eq!(refund.security, sell.security.clone().map(|s| Security { currency: None, ..s }));
    }

    #[test]
    fn test_tax_adjustment_without_trade_yields_nothing() {
        let text = SELL_WITH_TAX_ADJUSTMENT.replace("Schlusstag 01.03.2022\n", "");
        let (items, errors) = extract(&text);
        assert!(items.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_required_line_drops_item() {
        let (items, errors) = extract(&BUY.replace("Schlusstag 14.01.2021\n", ""));
        assert!(items.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_corrupted_required_token_is_recorded() {
        let (items, errors) = extract(&BUY.replace("Schlusstag 14.01.2021", "Schlusstag 14.13.2021"));
        assert!(items.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MalformedToken);
        assert_eq!(errors[0].section.as_deref(), Some("date"));
        assert_eq!(errors[0].source, "statement.pdf");
    }

    #[test]
    fn test_dividend_in_foreign_currency() {
        let (items, errors) = extract(&dividend(&DIVIDEND_TAXES));
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(items.len(), 1);

        let Item::Transaction(t) = &items[0] else {
            panic!("expected an account transaction");
        };
        assert_eq!(t.kind, AccountKind::Dividends);
        assert_eq!(t.shares, 920_000);
        assert_eq!(t.date, date(2018, 1, 3));
        assert_eq!(t.money, Some(Money::of("EUR", 7498)));
        assert_eq!(
            t.security.as_ref().map(|s| s.name.as_str()),
            Some("ISHSIV-FA.AN.HI.YI.CO.BD U.ETF REGISTERED SHARES USD O.N.")
        );
        assert_eq!(t.security.as_ref().and_then(|s| s.currency.as_deref()), Some("USD"));

        let gross = t.gross_value_unit().unwrap();
        assert_eq!(gross.amount, Money::of("EUR", 9356));
        assert_eq!(gross.forex, Some(Money::of("USD", 11316)));
        assert!((t.gross_value() - gross.amount.amount).abs() <= 1);
    }

    #[test]
    fn test_tax_lines_accumulate_per_category() {
        for count in 0..=3 {
            let (items, errors) = extract(&dividend(&DIVIDEND_TAXES[..count]));
            assert!(errors.is_empty(), "{:?}", errors);

            let Item::Transaction(t) = &items[0] else {
                panic!("expected an account transaction");
            };
            let taxes = t.taxes_by_category();
            assert_eq!(taxes.len(), count);
            assert_eq!(t.gross_value(), 9356);
            if count == 3 {
                assert_eq!(taxes.get(&TaxCategory::CapitalGains), Some(&1637));
                assert_eq!(taxes.get(&TaxCategory::SolidaritySurcharge), Some(&90));
                assert_eq!(taxes.get(&TaxCategory::ChurchTax), Some(&131));
            }
        }
    }

    #[test]
    fn test_reinvested_distribution_with_negative_settlement_is_taxes() {
        let text = "\
MLP FDL AG
Thesaurierung von Investmenterträgen
Stück 12,5 DWS VERMÖGENSBILDUNGSFONDS I DE0008476524 (847652)
INHABER-ANTEILE LD
Zahlbarkeitstag 02.01.2023 Thesaurierung brutto pro St. 1,2000 EUR
Ausmachender Betrag 1,23- EUR
Den Betrag buchen wir mit Wertstellung 02.01.2023 zu Lasten des Kontos 1234567890
";
        let (items, errors) = extract(text);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(items.iter().map(Item::type_label).collect::<Vec<_>>(), vec!["TAXES"]);
        assert_eq!(items[0].shares(), 12_500);
        assert!(items[0].security().and_then(|s| s.currency.clone()).is_some());
        assert!(
            items
                .iter()
                .all(|i| matches!(i, Item::Transaction(t) if t.units.iter().all(|u| u.kind != UnitKind::GrossValue)))
        );
    }

    #[test]
    fn test_reinvested_distribution_with_positive_settlement_is_refund() {
        let text = "\
MLP FDL AG
Thesaurierung von Investmenterträgen
Stück 12,5 DWS VERMÖGENSBILDUNGSFONDS I DE0008476524 (847652)
INHABER-ANTEILE LD
Zahlbarkeitstag 02.01.2023 Thesaurierung brutto pro St. 1,2000 EUR
Ausmachender Betrag 1,23+ EUR
Den Betrag buchen wir mit Wertstellung 02.01.2023 zu Gunsten des Kontos 1234567890
";
        let (items, errors) = extract(text);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(items.iter().map(Item::type_label).collect::<Vec<_>>(), vec!["TAX_REFUND"]);
        assert_eq!(items[0].money(), Some(&Money::of("EUR", 123)));
        assert_eq!(items[0].date(), date(2023, 1, 2));
    }

    #[test]
    fn test_other_bank_is_not_accepted() {
        let bank = extractor(&StmtxConfig::default()).unwrap();
        assert!(bank.accepts(BUY));
        assert!(!bank.accepts("Comdirect Bank AG\nWertpapier Abrechnung Kauf"));
    }
}

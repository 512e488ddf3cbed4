//! # Fiat Amount Strings
//!
//! Receipts record amounts as display strings: `"-1000"`, `"-8,750"`,
//! `"1,400원"`, `"₩ 5,000"`, `"KRW 1000"`. [`FiatAmount::parse`] turns them
//! into a signed integer magnitude plus an optional currency marker.
//!
//! Outgoing transfers are negative; payment checks compare magnitudes.
//! Fractional amounts are rejected since the supported currency has no
//! minor unit.

use serde::{Deserialize, Serialize};

use crate::error::ContextError;

/// A parsed receipt amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiatAmount {
    magnitude: u64,
    negative: bool,
    currency: Option<String>,
}

fn invalid(value: &str, reason: impl Into<String>) -> ContextError {
    ContextError::InvalidAmount {
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn is_iso_code(s: &str) -> bool {
    s.len() == 3 && s.chars().all(|c| c.is_ascii_uppercase())
}

impl FiatAmount {
    /// Parse a receipt amount string.
    ///
    /// # Errors
    ///
    /// [`ContextError::InvalidAmount`] for empty input, fractional values,
    /// misplaced separators, or values beyond `u64`.
    pub fn parse(raw: &str) -> Result<Self, ContextError> {
        let mut s = raw.trim();
        let mut currency: Option<String> = None;

        if let Some(rest) = s.strip_suffix('원') {
            currency = Some("KRW".to_string());
            s = rest.trim_end();
        } else if s.len() > 3 && s.is_char_boundary(s.len() - 3) && is_iso_code(&s[s.len() - 3..])
        {
            currency = Some(s[s.len() - 3..].to_string());
            s = s[..s.len() - 3].trim_end();
        }

        let mut negative = false;
        if let Some(rest) = s.strip_prefix('-') {
            negative = true;
            s = rest.trim_start();
        } else if let Some(rest) = s.strip_prefix('+') {
            s = rest.trim_start();
        }

        if let Some(rest) = s.strip_prefix('₩') {
            currency = merge_marker(raw, currency, "KRW")?;
            s = rest.trim_start();
        } else if s.len() > 3 && s.is_char_boundary(3) && is_iso_code(&s[..3]) {
            let code = s[..3].to_string();
            currency = merge_marker(raw, currency, &code)?;
            s = s[3..].trim_start();
        }

        // A sign may also follow a leading marker: "₩-1,000".
        if !negative {
            if let Some(rest) = s.strip_prefix('-') {
                negative = true;
                s = rest;
            }
        }

        let magnitude = parse_grouped_digits(raw, s)?;
        Ok(Self {
            magnitude,
            negative: negative && magnitude != 0,
            currency,
        })
    }

    /// Absolute value of the amount.
    pub fn magnitude(&self) -> u64 {
        self.magnitude
    }

    /// Whether the amount was recorded as outgoing.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// ISO currency code if the string carried a marker.
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }
}

fn merge_marker(
    raw: &str,
    existing: Option<String>,
    found: &str,
) -> Result<Option<String>, ContextError> {
    match existing {
        Some(code) if code != found => Err(invalid(
            raw,
            format!("conflicting currency markers {code} and {found}"),
        )),
        _ => Ok(Some(found.to_string())),
    }
}

/// Digits with optional `,` thousands separators in groups of three.
fn parse_grouped_digits(raw: &str, s: &str) -> Result<u64, ContextError> {
    if s.is_empty() {
        return Err(invalid(raw, "no digits"));
    }
    if s.contains('.') {
        return Err(invalid(raw, "fractional amounts are not supported"));
    }
    let groups: Vec<&str> = s.split(',').collect();
    for (i, group) in groups.iter().enumerate() {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(raw, "expected digits with optional ',' separators"));
        }
        if groups.len() > 1 && ((i == 0 && group.len() > 3) || (i > 0 && group.len() != 3)) {
            return Err(invalid(raw, "misplaced thousands separator"));
        }
    }
    groups
        .concat()
        .parse::<u64>()
        .map_err(|e| invalid(raw, e.to_string()))
}

impl std::fmt::Display for FiatAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        write!(f, "{}", self.magnitude)?;
        if let Some(code) = &self.currency {
            write!(f, " {code}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_negative() {
        let a = FiatAmount::parse("-1000").unwrap();
        assert_eq!(a.magnitude(), 1000);
        assert!(a.is_negative());
        assert_eq!(a.currency(), None);
    }

    #[test]
    fn thousands_separators() {
        let a = FiatAmount::parse("-8,750").unwrap();
        assert_eq!(a.magnitude(), 8750);
        assert!(a.is_negative());
        assert_eq!(FiatAmount::parse("1,234,567").unwrap().magnitude(), 1_234_567);
    }

    #[test]
    fn won_suffix_and_symbol() {
        let a = FiatAmount::parse("1,400원").unwrap();
        assert_eq!(a.magnitude(), 1400);
        assert_eq!(a.currency(), Some("KRW"));
        let b = FiatAmount::parse("₩5,000").unwrap();
        assert_eq!(b.magnitude(), 5000);
        assert_eq!(b.currency(), Some("KRW"));
        let c = FiatAmount::parse("-₩1,000").unwrap();
        assert!(c.is_negative());
        assert_eq!(c.magnitude(), 1000);
    }

    #[test]
    fn iso_code_prefix_or_suffix() {
        let a = FiatAmount::parse("KRW 1000").unwrap();
        assert_eq!(a.currency(), Some("KRW"));
        assert_eq!(a.magnitude(), 1000);
        let b = FiatAmount::parse("-1000 USD").unwrap();
        assert_eq!(b.currency(), Some("USD"));
        assert!(b.is_negative());
    }

    #[test]
    fn conflicting_markers_rejected() {
        assert!(matches!(
            FiatAmount::parse("USD 1000원"),
            Err(ContextError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "-", "12.5", "1,00", "12a", "1,,000", ",100", "원"] {
            assert!(
                matches!(FiatAmount::parse(bad), Err(ContextError::InvalidAmount { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(FiatAmount::parse("99999999999999999999").is_err());
    }

    #[test]
    fn negative_zero_is_zero() {
        let a = FiatAmount::parse("-0").unwrap();
        assert!(!a.is_negative());
        assert_eq!(a.to_string(), "0");
    }

    #[test]
    fn display() {
        assert_eq!(FiatAmount::parse("-1,400원").unwrap().to_string(), "-1400 KRW");
    }
}

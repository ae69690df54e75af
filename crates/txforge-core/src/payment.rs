//! Payment-URI parsing.
//!
//! Splits `scheme:address?amount=..&label=..` payment strings into
//! their parts so applications can prefill a send form.

use std::collections::BTreeMap;

/// The parts of a payment URI.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaymentData {
    /// The bare address.
    pub address: String,
    /// The requested amount in coin units, when present.
    pub amount: Option<f64>,
    /// The label parameter, when present.
    pub label: Option<String>,
    /// The message parameter, when present.
    pub message: Option<String>,
    /// Any remaining query parameters.
    pub parameters: BTreeMap<String, String>,
}

/// Parses payment strings for one URI scheme.
pub struct PaymentAddressParser {
    valid_scheme: String,
    remove_scheme: bool,
}

impl PaymentAddressParser {
    /// Create a parser for a scheme.
    ///
    /// # Arguments
    /// * `valid_scheme` - The accepted scheme (e.g. "bitcoin").
    /// * `remove_scheme` - Strip the scheme from the returned address.
    ///
    /// # Returns
    /// A new `PaymentAddressParser`.
    pub fn new(valid_scheme: impl Into<String>, remove_scheme: bool) -> Self {
        PaymentAddressParser {
            valid_scheme: valid_scheme.into(),
            remove_scheme,
        }
    }

    /// Parse a payment string.
    ///
    /// Unknown schemes leave the string untouched in `address`; bare
    /// addresses pass through unchanged.
    ///
    /// # Arguments
    /// * `payment_address` - The raw payment string.
    ///
    /// # Returns
    /// The parsed `PaymentData`.
    pub fn parse(&self, payment_address: &str) -> PaymentData {
        let mut data = PaymentData::default();

        let (scheme_part, rest) = match payment_address.split_once(':') {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case(&self.valid_scheme) => {
                (Some(scheme), rest)
            }
            Some(_) | None => (None, payment_address),
        };

        let (address, query) = match rest.split_once('?') {
            Some((address, query)) => (address, Some(query)),
            None => (rest, None),
        };

        data.address = if scheme_part.is_some() && !self.remove_scheme {
            format!("{}:{}", self.valid_scheme, address)
        } else {
            address.to_string()
        };

        if let Some(query) = query {
            for pair in query.split('&') {
                let (key, value) = match pair.split_once('=') {
                    Some((key, value)) => (key, value),
                    None => continue,
                };
                match key {
                    "amount" => data.amount = value.parse().ok(),
                    "label" => data.label = Some(value.to_string()),
                    "message" => data.message = Some(value.to_string()),
                    _ => {
                        data.parameters.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }

        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A full payment URI splits into its parts.
    #[test]
    fn test_parse_full_uri() {
        let parser = PaymentAddressParser::new("bitcoin", true);
        let data =
            parser.parse("bitcoin:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa?amount=0.5&label=tip&x=1");
        assert_eq!(data.address, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
        assert_eq!(data.amount, Some(0.5));
        assert_eq!(data.label.as_deref(), Some("tip"));
        assert_eq!(data.parameters.get("x").map(String::as_str), Some("1"));
    }

    /// A bare address passes through untouched.
    #[test]
    fn test_parse_bare_address() {
        let parser = PaymentAddressParser::new("bitcoin", true);
        let data = parser.parse("bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
        assert_eq!(data.address, "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4");
        assert!(data.amount.is_none());
    }

    /// The scheme stays when removal is off.
    #[test]
    fn test_scheme_kept() {
        let parser = PaymentAddressParser::new("bitcoin", false);
        let data = parser.parse("bitcoin:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
        assert_eq!(data.address, "bitcoin:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
    }
}

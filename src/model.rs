use serde::Serialize;
use std::fmt;

/// One cryptocurrency's market snapshot. Values are taken as the API (or the
/// user) supplies them; nothing checks sign or range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Crypto {
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub market_cap: f64,
    pub circulating_supply: f64,
}

impl Crypto {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        price: f64,
        market_cap: f64,
        circulating_supply: f64,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            price,
            market_cap,
            circulating_supply,
        }
    }
}

impl fmt::Display for Crypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): Price: ${:.2}, Market Cap: ${:.2}, Circulating Supply: {:.2}",
            self.name, self.symbol, self.price, self.market_cap, self.circulating_supply
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_all_fields() {
        let btc = Crypto::new("Bitcoin", "BTC", 50000.0, 900_000_000_000.0, 19_000_000.0);
        assert_eq!(
            btc.to_string(),
            "Bitcoin (BTC): Price: $50000.00, Market Cap: $900000000000.00, Circulating Supply: 19000000.00"
        );
    }
}

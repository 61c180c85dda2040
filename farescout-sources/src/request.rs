//! Helpers shared by the site request builders.

use chrono::NaiveDate;
use url::Url;

use farescout_core::{AirportCode, AirportTable};
use farescout_fetch::AdapterError;

/// `DD/MM/YYYY`, as every supported site expects.
pub fn search_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Passes an endpoint through the airport table.
///
/// # Errors
///
/// Returns an error if the endpoint cannot be turned into a code.
pub fn resolve(airports: &AirportTable, code: &AirportCode) -> Result<AirportCode, AdapterError> {
    Ok(airports.resolve_code(code.as_str())?)
}

/// Parses a built search URL.
///
/// # Errors
///
/// Returns an error if `raw` is not a valid URL.
pub fn parse_url(raw: &str) -> Result<Url, AdapterError> {
    Url::parse(raw).map_err(|e| AdapterError::InvalidRequest(format!("{raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_date_pads() {
        let date = NaiveDate::from_ymd_opt(2027, 3, 5).unwrap();
        assert_eq!(search_date(date), "05/03/2027");
    }

    #[test]
    fn test_resolve_keeps_codes() {
        let table = AirportTable::builtin();
        let code = AirportCode::new("IXZ").unwrap();
        assert_eq!(resolve(&table, &code).unwrap().as_str(), "IXZ");
    }
}

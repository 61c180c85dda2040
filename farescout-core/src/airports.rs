//! Airport lookup table.
//!
//! Maps lowercase city names to [`AirportCode`]s and codes back to display
//! names. Built once at startup and shared read-only (usually behind an
//! `Arc`); nothing mutates a table after construction.

use std::collections::HashMap;
use std::io::Read;

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::models::AirportCode;

/// Built-in `(city, code)` pairs. Several spellings may share one code.
const BUILTIN_CITIES: &[(&str, &str)] = &[
    ("delhi", "DEL"),
    ("new delhi", "DEL"),
    ("mumbai", "BOM"),
    ("bombay", "BOM"),
    ("bangalore", "BLR"),
    ("bengaluru", "BLR"),
    ("chennai", "MAA"),
    ("madras", "MAA"),
    ("kolkata", "CCU"),
    ("calcutta", "CCU"),
    ("hyderabad", "HYD"),
    ("pune", "PNQ"),
    ("ahmedabad", "AMD"),
    ("goa", "GOI"),
    ("jaipur", "JAI"),
    ("lucknow", "LKO"),
    ("chandigarh", "IXC"),
    ("kochi", "COK"),
    ("cochin", "COK"),
    ("guwahati", "GAU"),
    ("srinagar", "SXR"),
    ("varanasi", "VNS"),
    ("bhubaneswar", "BBI"),
    ("indore", "IDR"),
    ("patna", "PAT"),
    ("nagpur", "NAG"),
    ("trivandrum", "TRV"),
    ("thiruvananthapuram", "TRV"),
    ("ranchi", "IXR"),
];

/// Built-in `(code, display name)` pairs.
const BUILTIN_NAMES: &[(&str, &str)] = &[
    ("DEL", "Delhi"),
    ("BOM", "Mumbai"),
    ("BLR", "Bangalore"),
    ("MAA", "Chennai"),
    ("CCU", "Kolkata"),
    ("HYD", "Hyderabad"),
    ("PNQ", "Pune"),
    ("AMD", "Ahmedabad"),
    ("GOI", "Goa"),
    ("JAI", "Jaipur"),
    ("LKO", "Lucknow"),
    ("IXC", "Chandigarh"),
    ("COK", "Kochi"),
    ("GAU", "Guwahati"),
    ("SXR", "Srinagar"),
    ("VNS", "Varanasi"),
    ("BBI", "Bhubaneswar"),
    ("IDR", "Indore"),
    ("PAT", "Patna"),
    ("NAG", "Nagpur"),
    ("TRV", "Trivandrum"),
    ("IXR", "Ranchi"),
];

/// Accepted city column headers, most preferred first.
const CITY_COLUMNS: &[&str] = &["city", "name", "location"];

/// Accepted code column headers, most preferred first.
const CODE_COLUMNS: &[&str] = &["code", "iata", "iata_code", "airport_code"];

// ============================================================================
// Airport Table
// ============================================================================

/// Immutable city ↔ airport-code lookup.
#[derive(Debug, Clone, Default)]
pub struct AirportTable {
    by_city: HashMap<String, AirportCode>,
    names: HashMap<AirportCode, String>,
}

impl AirportTable {
    /// Creates an empty table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the built-in table of Indian domestic airports.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (city, code) in BUILTIN_CITIES {
            if let Ok(code) = AirportCode::new(code) {
                table.by_city.insert((*city).to_string(), code);
            }
        }
        for (code, name) in BUILTIN_NAMES {
            if let Ok(code) = AirportCode::new(code) {
                table.names.insert(code, (*name).to_string());
            }
        }
        table
    }

    /// Returns a copy of this table extended with extra `city → code`
    /// entries. Extra entries win over existing ones.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAirportCode` if any code is malformed.
    pub fn with_entries<I, K, V>(mut self, entries: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (city, code) in entries {
            let code = AirportCode::new(code.as_ref())?;
            let city = normalize_city(city.as_ref());
            self.names
                .entry(code.clone())
                .or_insert_with(|| title_case(&city));
            self.by_city.insert(city, code);
        }
        Ok(self)
    }

    /// Reads a table from CSV holding a city column and a code column.
    ///
    /// See [`AirportTable::with_csv`] for the accepted layout.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::AirportData` if the CSV is unreadable or lacks a
    /// city or code column.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, CoreError> {
        Self::empty().with_csv(reader)
    }

    /// Returns a copy of this table extended with the rows of a CSV file.
    ///
    /// Headers are matched case-insensitively after trimming, and a leading
    /// byte-order mark is ignored. The city column is the first header found
    /// among `city`, `name`, `location`; the code column the first among
    /// `code`, `iata`, `iata_code`, `airport_code`. Other columns are ignored.
    /// Rows with a blank city or an invalid code are skipped.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::AirportData` if the CSV is unreadable or lacks a
    /// city or code column.
    pub fn with_csv<R: Read>(self, reader: R) -> Result<Self, CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_lowercase())
            .collect();
        let column = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| headers.iter().position(|h| h == name))
        };
        let city_column = column(CITY_COLUMNS).ok_or_else(|| {
            CoreError::AirportData(format!("no city column among {headers:?}"))
        })?;
        let code_column = column(CODE_COLUMNS).ok_or_else(|| {
            CoreError::AirportData(format!("no code column among {headers:?}"))
        })?;
        debug!(city_column, code_column, "Airport CSV columns");

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let (Some(city), Some(code)) = (record.get(city_column), record.get(code_column))
            else {
                continue;
            };
            if city.is_empty() || code.is_empty() {
                continue;
            }
            if AirportCode::new(code).is_err() {
                warn!(city, code, "Skipping airport row with invalid code");
                continue;
            }
            entries.push((city.to_string(), code.to_string()));
        }

        debug!(rows = entries.len(), "Read airport CSV");
        self.with_entries(entries)
    }

    /// Number of known city spellings.
    pub fn len(&self) -> usize {
        self.by_city.len()
    }

    /// Returns true if the table has no cities.
    pub fn is_empty(&self) -> bool {
        self.by_city.is_empty()
    }

    /// Looks a city name up exactly (case- and quote-insensitive).
    pub fn lookup(&self, city: &str) -> Option<&AirportCode> {
        self.by_city.get(&normalize_city(city))
    }

    /// Resolves a city name or code to an airport code.
    ///
    /// Tries the table first. Unknown three-letter inputs are taken as codes;
    /// anything else falls back to its first three letters, uppercased.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAirportCode` if the fallback is not three
    /// ASCII letters.
    pub fn resolve_code(&self, input: &str) -> Result<AirportCode, CoreError> {
        if let Some(code) = self.lookup(input) {
            return Ok(code.clone());
        }

        let clean = normalize_city(input);
        if clean.chars().count() == 3 {
            return AirportCode::new(&clean);
        }

        tracing::debug!(city = %clean, "City not in airport table, guessing code");
        let guess: String = clean.chars().take(3).collect();
        AirportCode::new(&guess).map_err(|_| CoreError::InvalidAirportCode(input.to_string()))
    }

    /// Returns the display name for a code, if known.
    pub fn city_name(&self, code: &AirportCode) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// Returns the display name for a code, or the code itself.
    pub fn display_name(&self, code: &AirportCode) -> String {
        self.city_name(code)
            .map_or_else(|| code.to_string(), ToString::to_string)
    }

    /// Finds every known city mentioned in `text`, ordered by position.
    ///
    /// Matches whole words only, and prefers the longest spelling at a given
    /// position (`new delhi` over `delhi`).
    pub fn find_cities(&self, text: &str) -> Vec<(usize, &str, &AirportCode)> {
        let haystack = text.to_lowercase();
        let mut hits: Vec<(usize, &str, &AirportCode)> = Vec::new();

        for (city, code) in &self.by_city {
            for (pos, _) in haystack.match_indices(city.as_str()) {
                if is_word_boundary(&haystack, pos, pos + city.len()) {
                    hits.push((pos, city.as_str(), code));
                }
            }
        }

        hits.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())));

        // Drop hits that start inside an earlier, longer hit.
        let mut kept: Vec<(usize, &str, &AirportCode)> = Vec::new();
        for hit in hits {
            if kept.last().is_some_and(|last| hit.0 < last.0 + last.1.len()) {
                continue;
            }
            kept.push(hit);
        }
        kept
    }
}

fn csv_error(e: csv::Error) -> CoreError {
    CoreError::AirportData(e.to_string())
}

fn normalize_city(city: &str) -> String {
    city.trim()
        .replace(['"', '\''], "")
        .to_lowercase()
}

fn title_case(city: &str) -> String {
    city.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

// ============================================================================
// Tests
// ============================================================================

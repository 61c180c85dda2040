//! Text output formatting with colors.

use farescout_core::{ComparisonReport, FlightRecord, ReportStatus};
use farescout_sources::SourceDescriptor;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a whole comparison report.
    ///
    /// Lists at most `top` records, cheapest first.
    pub fn format_report(&self, report: &ComparisonReport, top: usize) -> String {
        let mut lines = Vec::new();

        match &report.query {
            Some(query) => lines.push(format!("{}  {}", self.bold("Query:"), query.describe())),
            None => lines.push(format!("{}  {}", self.bold("Query:"), report.raw_query)),
        }

        if report.status != ReportStatus::InterpreterFailed {
            let sources = if report.sources_succeeded.is_empty() {
                self.red("none")
            } else {
                report
                    .sources_succeeded
                    .iter()
                    .map(|s| s.display_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            lines.push(format!("{} {}", self.bold("Sources:"), sources));
            lines.push(format!(
                "{} {} flights",
                self.bold("Results:"),
                report.total_results
            ));
        }

        lines.push(String::new());
        match &report.cheapest {
            Some(cheapest) => {
                lines.push(self.bold("Cheapest flight"));
                lines.push(self.format_cheapest(cheapest));
            }
            None => lines.push(self.format_status(report.status)),
        }

        let ranked = report.records_by_price();
        if ranked.len() > 1 && top > 0 {
            lines.push(String::new());
            lines.push(self.bold(&format!(
                "All flights ({} of {})",
                ranked.len().min(top),
                ranked.len()
            )));
            for record in ranked.into_iter().take(top) {
                lines.push(format!("  {}", self.format_record_line(record)));
            }
        }

        if !report.errors.is_empty() {
            lines.push(String::new());
            lines.push(self.yellow("Errors:"));
            for error in &report.errors {
                lines.push(format!("  • {}", self.dim(error)));
            }
        }

        lines.join("\n")
    }

    fn format_status(&self, status: ReportStatus) -> String {
        match status {
            ReportStatus::Found => self.green("Found"),
            ReportStatus::NoFlights => self.yellow("No flights found"),
            ReportStatus::AllSourcesFailed => self.red("Every source failed"),
            ReportStatus::InterpreterFailed => self.red("Could not understand the query"),
        }
    }

    fn format_cheapest(&self, record: &FlightRecord) -> String {
        let mut lines = vec![
            format!("  Airline:   {}", airline_with_code(record)),
            format!("  Price:     {}", self.green(&record.price.formatted())),
            format!(
                "  Departure: {}",
                time_and_city(record.departure_time, record.departure_city.as_deref())
            ),
            format!(
                "  Arrival:   {}",
                time_and_city(record.arrival_time, record.arrival_city.as_deref())
            ),
        ];
        if let Some(duration) = record.duration_label() {
            lines.push(format!("  Duration:  {duration}"));
        }
        lines.push(format!("  Stops:     {}", record.stops_label()));
        lines.push(format!("  Source:    {}", record.source.display_name()));
        lines.push(format!("  Book:      {}", self.cyan(&record.booking_reference)));
        lines.join("\n")
    }

    /// One-line summary of a record.
    pub fn format_record_line(&self, record: &FlightRecord) -> String {
        let times = match (record.departure_time, record.arrival_time) {
            (Some(dep), Some(arr)) => format!("{dep} → {arr}"),
            (Some(dep), None) => format!("{dep} → ?"),
            _ => "?".to_string(),
        };
        format!(
            "{:>9}  {:<26} {:<13} {:<9} {}",
            record.price.formatted(),
            airline_with_code(record),
            times,
            record.stops_label(),
            self.dim(record.source.display_name())
        )
    }

    /// Header for the sources listing.
    pub fn format_sources_header(&self) -> String {
        self.bold(&format!(
            "{:<12} {:<14} {:<12} {}",
            "Source", "CLI name", "Aliases", "Home page"
        ))
    }

    /// One row of the sources listing.
    pub fn format_source_line(&self, desc: &SourceDescriptor) -> String {
        let name = format!("{:<12}", desc.display_name());
        let name = if desc.metadata.default_enabled {
            self.green(&name)
        } else {
            self.dim(&name)
        };
        format!(
            "{} {:<14} {:<12} {}",
            name,
            desc.cli_name(),
            desc.cli.aliases.join(","),
            desc.metadata.home_url
        )
    }

    // ========================================================================
    // Color Helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

fn airline_with_code(record: &FlightRecord) -> String {
    match &record.flight_code {
        Some(code) => format!("{} ({code})", record.airline),
        None => record.airline.clone(),
    }
}

fn time_and_city(time: Option<farescout_core::ClockTime>, city: Option<&str>) -> String {
    match (time, city) {
        (Some(t), Some(c)) => format!("{t} {c}"),
        (Some(t), None) => t.to_string(),
        (None, Some(c)) => c.to_string(),
        (None, None) => "unknown".to_string(),
    }
}

//! Best-effort parsers for single table cells.
//!
//! Modem firmware renders numbers with a unit suffix (`"603000000 Hz"`,
//! `"-1.2 dBmV"`, `"5120 Ksym/sec"`). None of these parsers fail hard: a cell
//! that does not match yields the zero value with `ok == false`, so one bad
//! cell never discards the rest of its row.

use crate::error::ParseError;

/// Unit suffixes rendered by the modem status page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Hertz,
    DbMillivolt,
    Decibel,
    KiloSymbolsPerSecond,
    /// A bare number with no suffix.
    None,
}

impl Unit {
    fn suffix(self) -> &'static str {
        match self {
            Unit::Hertz => "Hz",
            Unit::DbMillivolt => "dBmV",
            Unit::Decibel => "dB",
            Unit::KiloSymbolsPerSecond => "Ksym/sec",
            Unit::None => "",
        }
    }
}

/// A parsed cell value together with whether the cell matched its pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field<T> {
    pub value: T,
    pub ok: bool,
}

impl<T: Default> Field<T> {
    fn parsed(value: T) -> Self {
        Self { value, ok: true }
    }

    fn unset() -> Self {
        Self {
            value: T::default(),
            ok: false,
        }
    }

    fn from_result(result: Result<T, ParseError>) -> (Self, Option<ParseError>) {
        match result {
            Ok(value) => (Self::parsed(value), None),
            Err(e) => (Self::unset(), Some(e)),
        }
    }
}

/// Splits `"<number> <suffix>"` and checks the suffix.
fn split_number(text: &str, unit: Unit) -> Result<&str, ParseError> {
    let text = text.trim();
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')))
        .unwrap_or(text.len());
    let (number, rest) = text.split_at(end);

    if rest.trim() != unit.suffix() {
        return Err(ParseError::number_parse(
            text,
            format!("expected unit '{}'", unit.suffix()),
        ));
    }
    if number.is_empty() {
        return Err(ParseError::number_parse(text, "no numeric value"));
    }
    Ok(number)
}

/// Parses a float with the given unit suffix.
///
/// Returns the error alongside the zeroed field so the caller can log it with
/// row context.
pub fn parse_float(text: &str, unit: Unit) -> (Field<f64>, Option<ParseError>) {
    Field::from_result(split_number(text, unit).and_then(|number| {
        number
            .parse::<f64>()
            .map_err(|e| ParseError::number_parse(text, e))
    }))
}

/// Parses an unsigned counter (codeword error counts).
pub fn parse_counter(text: &str) -> (Field<u64>, Option<ParseError>) {
    Field::from_result(split_number(text, Unit::None).and_then(|number| {
        number
            .parse::<u64>()
            .map_err(|e| ParseError::number_parse(text, e))
    }))
}

/// Symbol rate cells are reported in Ksym/sec; the result is in sym/sec.
pub fn parse_symbol_rate(text: &str) -> (Field<f64>, Option<ParseError>) {
    let (field, err) = parse_float(text, Unit::KiloSymbolsPerSecond);
    (
        Field {
            value: field.value * 1000.0,
            ok: field.ok,
        },
        err,
    )
}

/// Where a cell came from, for diagnosing firmware quirks from logs alone.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub endpoint: &'a str,
    pub page: &'a str,
    pub row: usize,
}

/// Reads cells of one table row by column position.
///
/// Columns past the end of a short row read as empty text, which in turn
/// parses to the zero value.
pub struct RowReader<'a> {
    cells: &'a [String],
    ctx: RowContext<'a>,
}

impl<'a> RowReader<'a> {
    pub fn new(cells: &'a [String], ctx: RowContext<'a>) -> Self {
        Self { cells, ctx }
    }

    pub fn text(&self, column: usize) -> String {
        self.cells
            .get(column)
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default()
    }

    pub fn float(&self, column: usize, unit: Unit) -> f64 {
        let (field, err) = parse_float(&self.text(column), unit);
        self.log(column, err);
        field.value
    }

    pub fn symbol_rate(&self, column: usize) -> f64 {
        let (field, err) = parse_symbol_rate(&self.text(column));
        self.log(column, err);
        field.value
    }

    pub fn counter(&self, column: usize) -> u64 {
        let (field, err) = parse_counter(&self.text(column));
        self.log(column, err);
        field.value
    }

    fn log(&self, column: usize, err: Option<ParseError>) {
        if let Some(err) = err {
            tracing::debug!(
                endpoint = self.ctx.endpoint,
                page = self.ctx.page,
                row = self.ctx.row,
                column,
                error = %err,
                "Cell did not match, using zero"
            );
        }
    }
}

/// Converts Hz to MHz.
pub fn hertz_to_megahertz(hz: f64) -> f64 {
    hz / 1e6
}

/// Renders a frequency the way the modem UI labels it, e.g. `"603.00 MHz"`.
pub fn format_megahertz(hz: f64) -> String {
    format!("{:.2} MHz", hertz_to_megahertz(hz))
}

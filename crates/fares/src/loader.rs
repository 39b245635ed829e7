use std::path::Path;

use rust_decimal::Decimal;
use ruta_core::models::FareRecord;
use ruta_core::text::normalize;
use thiserror::Error;

/// Fatal load-time conditions. A table that fails to load must never
/// reach the resolver.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("missing required column {0}")]
    MissingColumn(&'static str),
    #[error("no fare column found (tried TARIFA/PRECIO/IMPORTE, then numeric sniffing)")]
    MissingFareColumn,
    #[error("row {row}: invalid fare value {value:?}")]
    InvalidFare { row: usize, value: String },
    #[error("row {row}: negative fare {value}")]
    NegativeFare { row: usize, value: Decimal },
    #[error("table has no header row")]
    EmptyTable,
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

const REQUIRED_COLUMNS: [&str; 4] = ["ORIGEN", "DESTINO", "EMPRESA", "MODALIDAD"];
const FARE_COLUMN_NAMES: [&str; 3] = ["TARIFA", "PRECIO", "IMPORTE"];

/// Reads a `;`-delimited UTF-8 fare table. Header names are compared
/// after normalization, so "Tarifa ($)" resolves the fare column.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<FareRecord>, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize)
        .collect();
    if headers.is_empty() {
        return Err(TableError::EmptyTable);
    }

    let column = |name: &'static str| -> Result<usize, TableError> {
        headers
            .iter()
            .position(|header| header_matches(header, name))
            .ok_or(TableError::MissingColumn(name))
    };

    let origin_col = column("ORIGEN")?;
    let destination_col = column("DESTINO")?;
    let operator_col = column("EMPRESA")?;
    let mode_col = column("MODALIDAD")?;

    let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;

    let named_columns = [origin_col, destination_col, operator_col, mode_col];
    let fare_col = FARE_COLUMN_NAMES
        .iter()
        .find_map(|name| headers.iter().position(|header| header_matches(header, name)))
        .or_else(|| first_numeric_column(&headers, &rows, &named_columns))
        .ok_or(TableError::MissingFareColumn)?;

    let mut records = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let field = |col: usize| row.get(col).unwrap_or("").trim().to_string();
        let raw_fare = field(fare_col);
        if raw_fare.is_empty() {
            continue;
        }

        let fare = parse_fare(&raw_fare).ok_or_else(|| TableError::InvalidFare {
            row: idx + 1,
            value: raw_fare.clone(),
        })?;
        if fare.is_sign_negative() {
            return Err(TableError::NegativeFare {
                row: idx + 1,
                value: fare,
            });
        }

        records.push(FareRecord {
            operator: field(operator_col),
            mode: field(mode_col),
            origin: field(origin_col),
            destination: field(destination_col),
            fare,
        });
    }

    Ok(records)
}

fn header_matches(header: &str, name: &str) -> bool {
    header == name || header.starts_with(name) && header[name.len()..].starts_with(' ')
}

/// Fallback fare-column heuristic: the first unclaimed column whose
/// non-empty values all parse numerically.
fn first_numeric_column(
    headers: &[String],
    rows: &[csv::StringRecord],
    claimed: &[usize],
) -> Option<usize> {
    (0..headers.len())
        .filter(|col| !claimed.contains(col))
        .find(|&col| {
            let mut saw_value = false;
            for row in rows {
                match row.get(col).map(str::trim) {
                    Some("") | None => continue,
                    Some(value) => {
                        if parse_fare(value).is_none() {
                            return false;
                        }
                        saw_value = true;
                    }
                }
            }
            saw_value
        })
}

/// Accepts "$ 1200", "1200,50" and "1200.50" spellings.
fn parse_fare(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim_start_matches('$').trim().replace(' ', "");
    let cleaned = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };
    cleaned.parse::<Decimal>().ok()
}

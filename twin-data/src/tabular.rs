//! Auxiliary tabular inputs: clinical TSV exports and annotated genomic CSVs.
//!
//! A missing file degrades to an empty [`Table`]; a file that exists but
//! cannot be read or parsed is an error.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};
use twin_core::DashboardError;

pub const CLINICAL_PATIENT_FILE: &str = "data_clinical_patient.txt";
pub const CLINICAL_SAMPLE_FILE: &str = "data_clinical_sample.txt";
pub const MUTATIONS_FILE: &str = "data_mutations_fully_annotated_luad.csv";
pub const CNA_FILE: &str = "data_cna_fully_annotated_luad.csv";
pub const SV_FILE: &str = "data_sv_fully_annotated_luad.csv";

/// Header row plus data rows; every row has exactly one cell per header.
/// Short rows are padded with empty cells; rows wider than the header are
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn from_records(mut records: Vec<Vec<String>>) -> Result<Self, String> {
        if records.is_empty() {
            return Ok(Self::default());
        }
        let headers: Vec<String> = records
            .remove(0)
            .into_iter()
            .map(|header| header.trim().to_string())
            .collect();
        let width = headers.len();
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(index, mut row)| {
                if row.len() > width {
                    return Err(format!(
                        "row {} has {} cells, expected {width}",
                        index + 1,
                        row.len()
                    ));
                }
                row.resize(width, String::new());
                Ok(row)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// All cells of a column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&str> {
        let index = self.column_index(name)?;
        self.rows.get(row).map(|cells| cells[index].as_str())
    }

    /// Rows whose `column` equals `value`.
    pub fn filter_eq<'a>(
        &'a self,
        column: &str,
        value: &'a str,
    ) -> impl Iterator<Item = &'a [String]> + 'a {
        let index = self.column_index(column);
        self.rows.iter().filter_map(move |row| match index {
            Some(index) if row[index] == value => Some(row.as_slice()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClinicalTables {
    pub patients: Table,
    pub samples: Table,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenomicsTables {
    pub mutations: Table,
    pub cna: Table,
    pub sv: Table,
}

/// Patient and sample tables of a clinical export directory.
pub fn load_clinical_tables(
    directory: impl AsRef<Path>,
) -> Result<ClinicalTables, DashboardError> {
    let directory = directory.as_ref();
    let tsv_table = |name: &str| -> Result<Table, DashboardError> {
        match read_optional(&directory.join(name))? {
            Some(text) => parse_tsv(&text).map_err(|reason| malformed(name, reason)),
            None => Ok(Table::default()),
        }
    };

    let tables = ClinicalTables {
        patients: tsv_table(CLINICAL_PATIENT_FILE)?,
        samples: tsv_table(CLINICAL_SAMPLE_FILE)?,
    };
    info!(
        directory = %directory.display(),
        patients = tables.patients.len(),
        samples = tables.samples.len(),
        "clinical tables loaded"
    );
    Ok(tables)
}

/// Mutation, CNA and SV tables of an annotated genomics directory.
pub fn load_genomics_tables(
    directory: impl AsRef<Path>,
) -> Result<GenomicsTables, DashboardError> {
    let directory = directory.as_ref();
    let csv_table = |name: &str| -> Result<Table, DashboardError> {
        match read_optional(&directory.join(name))? {
            Some(text) => parse_csv(&text).map_err(|reason| malformed(name, reason)),
            None => Ok(Table::default()),
        }
    };

    let tables = GenomicsTables {
        mutations: csv_table(MUTATIONS_FILE)?,
        cna: csv_table(CNA_FILE)?,
        sv: csv_table(SV_FILE)?,
    };
    info!(
        directory = %directory.display(),
        mutations = tables.mutations.len(),
        cna = tables.cna.len(),
        sv = tables.sv.len(),
        "genomics tables loaded"
    );
    Ok(tables)
}

/// Tab-separated text; blank lines and lines starting with `#` are ignored.
pub fn parse_tsv(text: &str) -> Result<Table, String> {
    let records: Vec<Vec<String>> = strip_bom(text)
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
        .map(|line| line.split('\t').map(str::to_string).collect::<Vec<_>>())
        .collect();
    Table::from_records(records)
}

/// Comma-separated text with double-quote escaping; quoted fields may span
/// lines.
pub fn parse_csv(text: &str) -> Result<Table, String> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = strip_bom(text).chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(ch),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(ch),
        }
    }

    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records.retain(|row| !(row.len() == 1 && row[0].trim().is_empty()));

    Table::from_records(records)
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

fn malformed(filename: &str, reason: String) -> DashboardError {
    DashboardError::MalformedRecord {
        filename: filename.to_string(),
        reason,
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, DashboardError> {
    if !path.exists() {
        warn!(file = %path.display(), "auxiliary file not found, using an empty table");
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })
}

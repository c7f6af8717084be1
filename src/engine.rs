use crate::error::Result;
use crate::schema::{CanonicalRow, ReportPeriod, Section};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Join key of a table row. The section code keeps the three statements
/// and the footnote sections apart even where account keys coincide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    section: Section,
    statement_name: String,
    account_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableRow {
    pub section: Section,
    pub statement_name: String,
    pub account_key: String,
    pub account_name: String,
    /// One amount per table column, in column order.
    pub values: Vec<i64>,
}

impl TableRow {
    fn key(&self) -> RowKey {
        RowKey {
            section: self.section,
            statement_name: self.statement_name.clone(),
            account_key: self.account_key.clone(),
        }
    }
}

/// Row of the exported projection, without the section key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExportRow {
    pub statement_name: String,
    pub account_name: String,
    pub values: Vec<i64>,
}

/// Canonical rows laid out as one amount column per period.
///
/// Rows stay grouped by section in the fixed section order; within a
/// section they keep first-seen order. Every cell holds a value: cells a
/// join had nothing for are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisclosureTable {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl DisclosureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-column table from one extraction. Rows sharing a key are
    /// summed into one.
    pub fn from_rows(column: impl Into<String>, rows: &[CanonicalRow]) -> Self {
        let mut table = Self {
            columns: vec![column.into()],
            rows: Vec::with_capacity(rows.len()),
        };
        let mut index: HashMap<RowKey, usize> = HashMap::new();

        for row in rows {
            let key = RowKey {
                section: row.section,
                statement_name: row.statement_name.clone(),
                account_key: row.account_key.clone(),
            };
            match index.get(&key) {
                Some(&i) => {
                    let cell = &mut table.rows[i].values[0];
                    *cell = cell.saturating_add(row.amount);
                }
                None => {
                    index.insert(key, table.rows.len());
                    table.rows.push(TableRow {
                        section: row.section,
                        statement_name: row.statement_name.clone(),
                        account_key: row.account_key.clone(),
                        account_name: row.account_name.clone(),
                        values: vec![row.amount],
                    });
                }
            }
        }

        table.group_sections();
        table
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn row(&self, section: Section, account_key: &str) -> Option<&TableRow> {
        self.rows
            .iter()
            .find(|r| r.section == section && r.account_key == account_key)
    }

    pub fn value(&self, section: Section, account_key: &str, column: &str) -> Option<i64> {
        let index = self.column_index(column)?;
        self.row(section, account_key)
            .and_then(|r| r.values.get(index).copied())
    }

    /// Outer join on (section, statement name, account key): the result
    /// has every row of either table and the columns of `self` followed by
    /// those of `other`.
    pub fn outer_join(&mut self, other: &DisclosureTable) {
        let left_width = self.columns.len();
        let right_width = other.columns.len();

        let index: HashMap<RowKey, usize> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.key(), i))
            .collect();
        let mut matched = vec![false; self.rows.len()];
        let mut appended = Vec::new();

        for right in &other.rows {
            match index.get(&right.key()) {
                Some(&i) => {
                    matched[i] = true;
                    self.rows[i].values.extend_from_slice(&right.values);
                }
                None => {
                    let mut values = vec![0; left_width];
                    values.extend_from_slice(&right.values);
                    appended.push(TableRow {
                        values,
                        ..right.clone()
                    });
                }
            }
        }

        for (row, was_matched) in self.rows.iter_mut().zip(matched) {
            if !was_matched {
                row.values.resize(left_width + right_width, 0);
            }
        }

        self.rows.extend(appended);
        self.columns.extend(other.columns.iter().cloned());
        self.group_sections();
    }

    /// Turns year-to-date columns into per-period amounts for flow
    /// sections. Walks from the latest column to the earliest, so each
    /// column loses the cumulative value of the column before it; the
    /// first column is left as filed. Point-in-time sections are untouched.
    pub fn apply_period_deltas(&mut self) {
        for row in self.rows.iter_mut().filter(|r| r.section.is_flow()) {
            for i in (1..row.values.len()).rev() {
                row.values[i] = row.values[i].saturating_sub(row.values[i - 1]);
            }
        }
    }

    /// The table as exported: the section key dropped, display names only.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.rows
            .iter()
            .map(|r| ExportRow {
                statement_name: r.statement_name.clone(),
                account_name: r.account_name.clone(),
                values: r.values.clone(),
            })
            .collect()
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["statement_name".to_string(), "account_name".to_string()];
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header)?;

        for row in self.export_rows() {
            let mut record = vec![row.statement_name, row.account_name];
            record.extend(row.values.iter().map(|v| v.to_string()));
            writer.write_record(&record)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DisclosureTable)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    fn group_sections(&mut self) {
        let rank = |section: &Section| {
            Section::ALL
                .iter()
                .position(|s| s == section)
                .unwrap_or(Section::ALL.len())
        };
        self.rows.sort_by_key(|r| rank(&r.section));
    }
}

/// Joins the populated quarters of one year into a table with one
/// `"{year}.Qn"` column per quarter, in chronological order. Quarters with
/// no filing must not be passed in: they would otherwise show up as zero
/// columns and corrupt the period deltas.
pub fn aggregate_quarters(
    year: i32,
    quarters: &[(ReportPeriod, Vec<CanonicalRow>)],
    is_cumulative: bool,
) -> DisclosureTable {
    let mut ordered: Vec<&(ReportPeriod, Vec<CanonicalRow>)> = quarters.iter().collect();
    ordered.sort_by_key(|(period, _)| *period);

    let mut table = DisclosureTable::new();
    for (period, rows) in ordered {
        let column = period.column_label(year);
        debug!("Joining {} ({} rows)", column, rows.len());
        table.outer_join(&DisclosureTable::from_rows(column, rows));
    }

    if !is_cumulative {
        table.apply_period_deltas();
    }

    table
}

/// Full-year table from the annual report alone, as filed.
pub fn annual_table(year: i32, rows: &[CanonicalRow]) -> DisclosureTable {
    DisclosureTable::from_rows(year.to_string(), rows)
}

/// Outer-joins yearly tables left to right.
pub fn merge_tables<I>(tables: I) -> DisclosureTable
where
    I: IntoIterator<Item = DisclosureTable>,
{
    let mut tables = tables.into_iter();
    let Some(mut merged) = tables.next() else {
        return DisclosureTable::new();
    };
    for table in tables {
        merged.outer_join(&table);
    }
    merged
}

use crate::config::BuilderConfig;
use crate::corps::{CompanyDirectory, CompanyEntry};
use crate::engine::{aggregate_quarters, annual_table, merge_tables, DisclosureTable};
use crate::error::{DisclosureError, Result};
use crate::filing::{DisclosureSource, Filing};
use crate::schema::{FilingRequest, ReportPeriod};
use log::{debug, info};

/// The company to build history for, by registry code or by exact name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyTarget {
    pub corp_code: Option<String>,
    pub corp_name: Option<String>,
}

impl CompanyTarget {
    pub fn by_code(code: impl Into<String>) -> Self {
        Self {
            corp_code: Some(code.into()),
            corp_name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            corp_code: None,
            corp_name: Some(name.into()),
        }
    }

    fn resolve<'d>(&self, directory: &'d dyn CompanyDirectory) -> Result<&'d CompanyEntry> {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        // A name, when given, decides the company; the code is not consulted.
        match (non_blank(&self.corp_code), non_blank(&self.corp_name)) {
            (code, Some(name)) => {
                if let Some(code) = code {
                    debug!("Company code {} ignored in favour of name {}", code, name);
                }
                directory
                    .find_by_name(&name)
                    .ok_or_else(|| DisclosureError::CompanyNotFound(format!("name {}", name)))
            }
            (Some(code), None) => directory
                .find_by_code(&code)
                .ok_or_else(|| DisclosureError::CompanyNotFound(format!("code {}", code))),
            (None, None) => Err(DisclosureError::InvalidCompany(
                "either a company code or a company name is required".to_string(),
            )),
        }
    }
}

/// Builds quarterly and annual disclosure tables for one company.
pub struct DisclosureHistoryBuilder<'a> {
    config: BuilderConfig,
    corp_code: String,
    corp_name: String,
    source: &'a dyn DisclosureSource,
}

impl<'a> DisclosureHistoryBuilder<'a> {
    /// Fails when the target names no company or the directory has no
    /// listed company matching it.
    pub fn new(
        config: BuilderConfig,
        target: &CompanyTarget,
        directory: &dyn CompanyDirectory,
        source: &'a dyn DisclosureSource,
    ) -> Result<Self> {
        let company = target.resolve(directory)?;
        info!(
            "Building disclosure history for {} ({})",
            company.corp_name, company.corp_code
        );

        Ok(Self {
            config,
            corp_code: company.corp_code.clone(),
            corp_name: company.corp_name.clone(),
            source,
        })
    }

    pub fn corp_code(&self) -> &str {
        &self.corp_code
    }

    pub fn corp_name(&self) -> &str {
        &self.corp_name
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    fn filing(&self, year: i32, period: ReportPeriod) -> Filing<'a> {
        let request = FilingRequest {
            corp_code: self.corp_code.clone(),
            year,
            period,
            consolidated: self.config.consolidated,
        };
        Filing::new(self.source, request, self.config.unit)
    }

    /// One year of data. By quarter, each quarter that has been filed
    /// becomes a `"{year}.Qn"` column, differenced into per-quarter
    /// amounts for flow sections unless `is_cumulative`. Otherwise the
    /// annual report alone fills a single `"{year}"` column.
    pub fn aggregate_year(
        &self,
        year: i32,
        by_quarter: bool,
        is_cumulative: bool,
    ) -> Result<DisclosureTable> {
        if !by_quarter {
            info!("Processing {} annual report", year);
            let filing = self.filing(year, ReportPeriod::Q4);
            if !filing.has_data() {
                info!("No annual report for {}", year);
                return Ok(DisclosureTable::new());
            }
            return Ok(annual_table(year, &filing.extract_all()?));
        }

        let mut quarters = Vec::with_capacity(ReportPeriod::ALL.len());
        for period in ReportPeriod::ALL {
            info!("Processing {}", period.column_label(year));
            let filing = self.filing(year, period);
            if !filing.has_data() {
                info!("No filing for {}, skipping", period.column_label(year));
                continue;
            }
            let rows = filing.extract_all()?;
            debug!("{}: {} canonical rows", period.column_label(year), rows.len());
            quarters.push((period, rows));
        }

        Ok(aggregate_quarters(year, &quarters, is_cumulative))
    }

    /// Every year of `start_year..=end_year`, outer-joined left to right.
    pub fn merge_period(
        &self,
        start_year: i32,
        end_year: i32,
        by_quarter: bool,
        is_cumulative: bool,
    ) -> Result<DisclosureTable> {
        if start_year > end_year {
            return Err(DisclosureError::InvalidYearRange {
                start: start_year,
                end: end_year,
            });
        }

        let mut tables = Vec::new();
        for year in start_year..=end_year {
            tables.push(self.aggregate_year(year, by_quarter, is_cumulative)?);
            info!("Finished {}", year);
        }

        Ok(merge_tables(tables))
    }

    /// The by-quarter and by-year tables handed to export.
    pub fn build_tables(
        &self,
        start_year: i32,
        end_year: i32,
        is_cumulative: bool,
    ) -> Result<(DisclosureTable, DisclosureTable)> {
        let by_quarter = self.merge_period(start_year, end_year, true, is_cumulative)?;
        let by_year = self.merge_period(start_year, end_year, false, is_cumulative)?;
        Ok((by_quarter, by_year))
    }

    pub fn default_export_file_name(&self, start_year: i32, end_year: i32) -> String {
        format!(
            "{}_{}_{}_unit_{}.xlsx",
            self.corp_name,
            start_year,
            end_year,
            self.config.unit.name()
        )
    }
}

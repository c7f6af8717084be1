use crate::chart_of_accounts::accounts_for;
use crate::error::Result;
use crate::footnotes::{employee_rows, executive_rows, footnote_rows, shareholder_rows};
use crate::ingestion::convert_records;
use crate::resolver::resolve;
use crate::schema::{
    ApiResponse, CanonicalRow, DetailKind, EmployeeRecord, ExecutiveRecord, FilingRequest,
    FilingResponse, RawDisclosureRow, Section, ShareholderRecord, StatementType, Unit,
    NO_DATA_STATUS,
};
use log::{debug, warn};
use std::cell::OnceCell;

/// Where filings come from. Implementations perform blocking fetches;
/// a period with nothing published is a valid, empty answer.
pub trait DisclosureSource {
    /// Full statements of one periodic report.
    fn fetch_statements(&self, request: &FilingRequest) -> Result<FilingResponse>;

    /// HTML of the notes document attached to the report, if one exists.
    fn fetch_footnotes(&self, request: &FilingRequest) -> Result<Option<String>>;

    fn fetch_employee_status(&self, request: &FilingRequest) -> Result<ApiResponse<EmployeeRecord>>;

    fn fetch_executive_status(&self, request: &FilingRequest) -> Result<ApiResponse<ExecutiveRecord>>;

    fn fetch_major_shareholders(
        &self,
        request: &FilingRequest,
    ) -> Result<ApiResponse<ShareholderRecord>>;
}

/// One periodic report of one company.
///
/// The raw rows and the notes document are fetched at most once, on first
/// use, and live as long as the filing. Fetch failures and invalid
/// responses degrade to "no data" for this filing.
pub struct Filing<'a> {
    source: &'a dyn DisclosureSource,
    request: FilingRequest,
    unit: Unit,
    rows: OnceCell<Vec<RawDisclosureRow>>,
    footnotes: OnceCell<Option<String>>,
}

impl<'a> Filing<'a> {
    pub fn new(source: &'a dyn DisclosureSource, request: FilingRequest, unit: Unit) -> Self {
        Self {
            source,
            request,
            unit,
            rows: OnceCell::new(),
            footnotes: OnceCell::new(),
        }
    }

    pub fn request(&self) -> &FilingRequest {
        &self.request
    }

    pub fn raw_rows(&self) -> &[RawDisclosureRow] {
        self.rows.get_or_init(|| match self.source.fetch_statements(&self.request) {
            Ok(response) => {
                if response.status != NO_DATA_STATUS && !response.is_valid() {
                    warn!(
                        "Invalid statements response for {} {}.{} (status {}): {}",
                        self.request.corp_code,
                        self.request.year,
                        self.request.period,
                        response.status,
                        response.message.as_deref().unwrap_or("no list")
                    );
                } else if !response.is_valid() {
                    debug!(
                        "No statements for {} {}.{} (status {})",
                        self.request.corp_code, self.request.year, self.request.period, response.status
                    );
                }
                convert_records(&response.into_records())
            }
            Err(e) => {
                warn!(
                    "Fetching statements for {} {}.{} failed: {}",
                    self.request.corp_code, self.request.year, self.request.period, e
                );
                Vec::new()
            }
        })
    }

    /// Whether the report has been published with any statement rows.
    pub fn has_data(&self) -> bool {
        !self.raw_rows().is_empty()
    }

    fn footnotes_html(&self) -> Option<&str> {
        self.footnotes
            .get_or_init(|| match self.source.fetch_footnotes(&self.request) {
                Ok(html) => html,
                Err(e) => {
                    warn!(
                        "Fetching footnotes for {} {}.{} failed: {}",
                        self.request.corp_code, self.request.year, self.request.period, e
                    );
                    None
                }
            })
            .as_deref()
    }

    /// Rows of the statement, taken from the first of its raw divisions
    /// that has any.
    fn statement_rows(&self, statement_type: StatementType) -> Vec<RawDisclosureRow> {
        let rows = self.raw_rows();
        statement_type
            .statement_divs()
            .iter()
            .map(|div| {
                rows.iter()
                    .filter(|r| r.statement_div == *div)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .find(|selected| !selected.is_empty())
            .unwrap_or_default()
    }

    /// One canonical row per taxonomy account of `statement_type`, in
    /// taxonomy order, with amounts already rescaled. Empty when the
    /// filing has no rows for the statement.
    pub fn extract(&self, statement_type: StatementType) -> Vec<CanonicalRow> {
        let rows = self.statement_rows(statement_type);
        if rows.is_empty() {
            return Vec::new();
        }

        accounts_for(statement_type)
            .iter()
            .map(|account| CanonicalRow {
                section: Section::Statement(statement_type),
                statement_name: statement_type.display_name().to_string(),
                account_key: account.account_key.to_string(),
                account_name: account.display_name.to_string(),
                amount: self.unit.scale(resolve(&rows, account)),
            })
            .collect()
    }

    /// Rows of one detail section. Only an unrecognized reporting unit in
    /// a footnote table is an error.
    pub fn extract_detail(&self, kind: DetailKind) -> Result<Vec<CanonicalRow>> {
        match kind {
            DetailKind::Expense | DetailKind::Inventory => match self.footnotes_html() {
                Some(html) => footnote_rows(html, kind, self.unit),
                None => Ok(Vec::new()),
            },
            DetailKind::EmployeeStatus => {
                let records = self.fetch_or_empty(kind, |s, r| s.fetch_employee_status(r));
                Ok(employee_rows(&records, self.unit))
            }
            DetailKind::Executives => {
                let records = self.fetch_or_empty(kind, |s, r| s.fetch_executive_status(r));
                Ok(executive_rows(&records))
            }
            DetailKind::Shareholders => {
                let records = self.fetch_or_empty(kind, |s, r| s.fetch_major_shareholders(r));
                Ok(shareholder_rows(&records))
            }
        }
    }

    fn fetch_or_empty<T>(
        &self,
        kind: DetailKind,
        fetch: impl FnOnce(&dyn DisclosureSource, &FilingRequest) -> Result<ApiResponse<T>>,
    ) -> Vec<T> {
        match fetch(self.source, &self.request) {
            Ok(response) => response.into_records(),
            Err(e) => {
                warn!(
                    "Fetching {} for {} {}.{} failed: {}",
                    kind.display_name(),
                    self.request.corp_code,
                    self.request.year,
                    self.request.period,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Every section of the filing: the three statements, then the detail
    /// sections.
    pub fn extract_all(&self) -> Result<Vec<CanonicalRow>> {
        let mut rows = Vec::new();

        for statement_type in StatementType::ALL {
            let extracted = self.extract(statement_type);
            debug!("{}: {} rows", statement_type.display_name(), extracted.len());
            rows.extend(extracted);
        }

        for kind in DetailKind::ALL {
            let extracted = self.extract_detail(kind)?;
            debug!("{}: {} rows", kind.display_name(), extracted.len());
            rows.extend(extracted);
        }

        Ok(rows)
    }
}

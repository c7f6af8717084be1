use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account id the regulator API reports for rows that do not use a
/// standardized taxonomy code. Such rows can only be matched by label.
pub const NON_STANDARD_ACCOUNT_ID: &str = "-표준계정코드 미사용-";

/// Status code the regulator API returns when no filing data exists.
pub const NO_DATA_STATUS: &str = "013";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum StatementType {
    #[schemars(description = "Statement of financial position. Point-in-time balances.")]
    BalanceSheet,

    #[schemars(description = "Income statement. Activity over the reporting period.")]
    IncomeStatement,

    #[schemars(description = "Cash flow statement. Activity over the reporting period.")]
    CashFlow,
}

impl StatementType {
    pub const ALL: [StatementType; 3] = [
        StatementType::BalanceSheet,
        StatementType::IncomeStatement,
        StatementType::CashFlow,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            StatementType::BalanceSheet => "BS",
            StatementType::IncomeStatement => "CIS",
            StatementType::CashFlow => "CF",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StatementType::BalanceSheet => "재무상태표",
            StatementType::IncomeStatement => "손익계산서",
            StatementType::CashFlow => "현금흐름표",
        }
    }

    /// Raw `sj_div` values that carry this statement, in order of preference.
    /// Filers that split the income statement report `IS` alongside `CIS`;
    /// the others report everything under `CIS`.
    pub fn statement_divs(&self) -> &'static [&'static str] {
        match self {
            StatementType::BalanceSheet => &["BS"],
            StatementType::IncomeStatement => &["IS", "CIS"],
            StatementType::CashFlow => &["CF"],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum DetailKind {
    #[schemars(description = "Expense-by-nature footnote. Cumulative over the fiscal year.")]
    Expense,

    #[schemars(description = "Inventory breakdown footnote. Point-in-time balances.")]
    Inventory,

    #[schemars(description = "Employee headcount and payroll. Point-in-time.")]
    EmployeeStatus,

    #[schemars(description = "Executive headcount by registration, tenure and sex. Point-in-time.")]
    Executives,

    #[schemars(description = "Largest shareholder holdings. Point-in-time.")]
    Shareholders,
}

impl DetailKind {
    pub const ALL: [DetailKind; 5] = [
        DetailKind::Expense,
        DetailKind::Inventory,
        DetailKind::EmployeeStatus,
        DetailKind::Executives,
        DetailKind::Shareholders,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            DetailKind::Expense => "EXPENSE",
            DetailKind::Inventory => "INVENTORY",
            DetailKind::EmployeeStatus => "EMPLOYEE_STATUS",
            DetailKind::Executives => "EXECUTIVE_STATUS",
            DetailKind::Shareholders => "SHAREHOLDERS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DetailKind::Expense => "비용의 성격별 분류",
            DetailKind::Inventory => "재고자산",
            DetailKind::EmployeeStatus => "직원 현황",
            DetailKind::Executives => "임원 현황",
            DetailKind::Shareholders => "최대주주 현황",
        }
    }
}

/// The statement-level key every table row is grouped under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
pub enum Section {
    Statement(StatementType),
    Detail(DetailKind),
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Statement(StatementType::BalanceSheet),
        Section::Statement(StatementType::IncomeStatement),
        Section::Statement(StatementType::CashFlow),
        Section::Detail(DetailKind::Expense),
        Section::Detail(DetailKind::Inventory),
        Section::Detail(DetailKind::EmployeeStatus),
        Section::Detail(DetailKind::Executives),
        Section::Detail(DetailKind::Shareholders),
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Section::Statement(statement) => statement.code(),
            Section::Detail(kind) => kind.code(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Section::Statement(statement) => statement.display_name(),
            Section::Detail(kind) => kind.display_name(),
        }
    }

    /// Flow sections are filed as year-to-date cumulative values and need
    /// differencing to yield per-quarter amounts. Everything else is a
    /// point-in-time stock and is never differenced.
    pub fn is_flow(&self) -> bool {
        matches!(
            self,
            Section::Statement(StatementType::IncomeStatement)
                | Section::Statement(StatementType::CashFlow)
                | Section::Detail(DetailKind::Expense)
        )
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One of the four periodic reports filed for a fiscal year.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportPeriod {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 4] = [
        ReportPeriod::Q1,
        ReportPeriod::Q2,
        ReportPeriod::Q3,
        ReportPeriod::Q4,
    ];

    /// `reprt_code` parameter of the regulator API.
    pub fn code(&self) -> &'static str {
        match self {
            ReportPeriod::Q1 => "11013",
            ReportPeriod::Q2 => "11012",
            ReportPeriod::Q3 => "11014",
            ReportPeriod::Q4 => "11011",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReportPeriod::Q1 => "Q1",
            ReportPeriod::Q2 => "Q2",
            ReportPeriod::Q3 => "Q3",
            ReportPeriod::Q4 => "Q4",
        }
    }

    /// Calendar month the reporting period closes in.
    pub fn closing_month(&self) -> u32 {
        match self {
            ReportPeriod::Q1 => 3,
            ReportPeriod::Q2 => 6,
            ReportPeriod::Q3 => 9,
            ReportPeriod::Q4 => 12,
        }
    }

    pub fn column_label(&self, year: i32) -> String {
        format!("{}.{}", year, self.name())
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Unit {
    #[default]
    #[schemars(description = "Whole currency units")]
    Default,

    #[schemars(description = "Thousands of currency units")]
    Thousand,

    #[schemars(description = "Millions of currency units")]
    Million,
}

impl Unit {
    pub fn divisor(&self) -> i64 {
        match self {
            Unit::Default => 1,
            Unit::Thousand => 1_000,
            Unit::Million => 1_000_000,
        }
    }

    /// Rescales a whole-unit amount, truncating toward zero.
    pub fn scale(&self, amount: i64) -> i64 {
        amount / self.divisor()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Unit::Default => "default",
            Unit::Thousand => "thousand",
            Unit::Million => "million",
        }
    }
}

/// One line of a single filing, with amounts already parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawDisclosureRow {
    pub statement_div: String,
    pub account_id: String,
    pub account_label: String,
    pub period_amount: Option<i64>,
    pub cumulative_amount: Option<i64>,
}

impl RawDisclosureRow {
    pub fn is_non_standard(&self) -> bool {
        self.account_id == NON_STANDARD_ACCOUNT_ID
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalRow {
    pub section: Section,
    pub statement_name: String,
    pub account_key: String,
    pub account_name: String,
    pub amount: i64,
}

/// Identifies one periodic filing of one company.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilingRequest {
    pub corp_code: String,
    pub year: i32,
    pub period: ReportPeriod,
    pub consolidated: bool,
}

impl FilingRequest {
    /// `fs_div` parameter: consolidated or separate statements.
    pub fn fs_div(&self) -> &'static str {
        if self.consolidated {
            "CFS"
        } else {
            "OFS"
        }
    }
}

/// Envelope shared by every regulator API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub list: Option<Vec<T>>,
}

impl<T> ApiResponse<T> {
    pub fn no_data() -> Self {
        Self {
            status: NO_DATA_STATUS.to_string(),
            message: None,
            list: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status != NO_DATA_STATUS && self.list.is_some()
    }

    /// Records of a valid response; an invalid response yields none.
    pub fn into_records(self) -> Vec<T> {
        if !self.is_valid() {
            return Vec::new();
        }
        self.list.unwrap_or_default()
    }
}

pub type FilingResponse = ApiResponse<RawFilingRecord>;

/// A full-statement line as returned by the regulator API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFilingRecord {
    #[serde(default)]
    pub rcept_no: String,
    #[serde(default)]
    pub bsns_year: String,
    #[serde(default)]
    pub corp_code: String,
    pub sj_div: String,
    #[serde(default)]
    pub sj_nm: String,
    pub account_id: String,
    pub account_nm: String,
    #[serde(default)]
    pub account_detail: String,
    #[serde(default)]
    pub thstrm_nm: String,
    #[serde(default)]
    pub thstrm_amount: Option<String>,
    #[serde(default)]
    pub thstrm_add_amount: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeRecord {
    #[serde(default)]
    pub fo_bbm: Option<String>,
    #[serde(default)]
    pub sexdstn: Option<String>,
    #[serde(default)]
    pub rgllbr_co: Option<String>,
    #[serde(default)]
    pub cnttk_co: Option<String>,
    #[serde(default)]
    pub sm: Option<String>,
    #[serde(default)]
    pub fyer_salary_totamt: Option<String>,
}

/// One executive as listed in the executive-status disclosure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutiveRecord {
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub sexdstn: Option<String>,
    #[serde(default)]
    pub ofcps: Option<String>,
    /// `등기임원` or `미등기임원`.
    #[serde(default)]
    pub rgist_exctv_at: Option<String>,
    /// `상근` or `비상근`.
    #[serde(default)]
    pub fte_at: Option<String>,
    #[serde(default)]
    pub chrg_job: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareholderRecord {
    #[serde(default)]
    pub nm: Option<String>,
    #[serde(default)]
    pub relate: Option<String>,
    #[serde(default)]
    pub stock_knd: Option<String>,
    #[serde(default)]
    pub trmend_posesn_stock_co: Option<String>,
    #[serde(default)]
    pub trmend_posesn_stock_qota_rt: Option<String>,
}

/// Entry of the periodic-report search endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilingListRecord {
    #[serde(default)]
    pub corp_code: String,
    #[serde(default)]
    pub corp_name: String,
    pub report_nm: String,
    pub rcept_no: String,
    #[serde(default)]
    pub rcept_dt: String,
}

use disclosure_history_builder::chart_of_accounts::accounts_for;
use disclosure_history_builder::*;
use std::collections::HashMap;

const CORP_CODE: &str = "00999999";
const CORP_NAME: &str = "엑스전자";

const BS: Section = Section::Statement(StatementType::BalanceSheet);
const IS: Section = Section::Statement(StatementType::IncomeStatement);
const CF: Section = Section::Statement(StatementType::CashFlow);
const EXPENSE: Section = Section::Detail(DetailKind::Expense);
const EMPLOYEES: Section = Section::Detail(DetailKind::EmployeeStatus);
const EXECUTIVES: Section = Section::Detail(DetailKind::Executives);

/// Filings held in memory, keyed by fiscal year and report period.
#[derive(Default)]
struct MockSource {
    statements: HashMap<(i32, ReportPeriod), Vec<RawFilingRecord>>,
    footnotes: HashMap<(i32, ReportPeriod), String>,
    employees: HashMap<(i32, ReportPeriod), Vec<EmployeeRecord>>,
    executives: HashMap<(i32, ReportPeriod), Vec<ExecutiveRecord>>,
    failing: Vec<(i32, ReportPeriod)>,
}

impl DisclosureSource for MockSource {
    fn fetch_statements(&self, request: &FilingRequest) -> Result<FilingResponse> {
        let key = (request.year, request.period);
        if self.failing.contains(&key) {
            return Err(DisclosureError::InvalidResponse("connection reset".to_string()));
        }
        Ok(match self.statements.get(&key) {
            Some(records) => ApiResponse {
                status: "000".to_string(),
                message: Some("정상".to_string()),
                list: Some(records.clone()),
            },
            None => ApiResponse::no_data(),
        })
    }

    fn fetch_footnotes(&self, request: &FilingRequest) -> Result<Option<String>> {
        Ok(self.footnotes.get(&(request.year, request.period)).cloned())
    }

    fn fetch_employee_status(&self, request: &FilingRequest) -> Result<ApiResponse<EmployeeRecord>> {
        Ok(match self.employees.get(&(request.year, request.period)) {
            Some(records) => ApiResponse {
                status: "000".to_string(),
                message: None,
                list: Some(records.clone()),
            },
            None => ApiResponse::no_data(),
        })
    }

    fn fetch_executive_status(&self, request: &FilingRequest) -> Result<ApiResponse<ExecutiveRecord>> {
        Ok(match self.executives.get(&(request.year, request.period)) {
            Some(records) => ApiResponse {
                status: "000".to_string(),
                message: None,
                list: Some(records.clone()),
            },
            None => ApiResponse::no_data(),
        })
    }

    fn fetch_major_shareholders(
        &self,
        _request: &FilingRequest,
    ) -> Result<ApiResponse<ShareholderRecord>> {
        Ok(ApiResponse::no_data())
    }
}

fn with_commas(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

fn record(sj_div: &str, id: &str, name: &str, period: i64, cumulative: Option<i64>) -> RawFilingRecord {
    RawFilingRecord {
        corp_code: CORP_CODE.to_string(),
        sj_div: sj_div.to_string(),
        account_id: id.to_string(),
        account_nm: name.to_string(),
        thstrm_amount: Some(with_commas(period)),
        thstrm_add_amount: cumulative.map(with_commas),
        ..Default::default()
    }
}

/// Statement rows of one report. Flow amounts are year-to-date in won.
/// Quarterly reports carry the three-month figure as the period amount
/// and the year-to-date figure as the cumulative amount; the annual report
/// only has the period amount.
fn statements(
    period: ReportPeriod,
    assets: i64,
    revenue_ytd: i64,
    revenue_quarter: i64,
    operating_cf_ytd: i64,
) -> Vec<RawFilingRecord> {
    let revenue = if period == ReportPeriod::Q4 {
        record("IS", "ifrs-full_Revenue", "매출액", revenue_ytd, None)
    } else {
        record("IS", "ifrs-full_Revenue", "매출액", revenue_quarter, Some(revenue_ytd))
    };

    vec![
        record("BS", "ifrs-full_Assets", "자산총계", assets, None),
        record("BS", NON_STANDARD_ACCOUNT_ID, "재 고 자 산", assets / 10, None),
        revenue,
        record("CIS", "ifrs-full_Revenue", "매출액", revenue_ytd, None),
        record(
            "CF",
            "ifrs-full_CashFlowsFromUsedInOperatingActivities",
            "영업활동현금흐름",
            operating_cf_ytd,
            None,
        ),
    ]
}

fn expense_footnote(raw_materials_thousands: i64) -> String {
    format!(
        r#"<html><body>
        <p>28. 비용의 성격별 분류</p>
        <p>당분기 및 전분기 중 비용의 성격별 분류 내역은 다음과 같습니다.</p>
        <table><tr><td>(단위 : 천원)</td></tr></table>
        <table>
            <tr><th>구 분</th><th>당분기</th><th>전분기</th></tr>
            <tr><td>원재료 사용액</td><td>{}</td><td>1,000</td></tr>
            <tr><td>종업원급여</td><td>50,000</td><td>40,000</td></tr>
        </table>
        <p>29. 법인세비용</p>
        </body></html>"#,
        with_commas(raw_materials_thousands)
    )
}

fn employee_status() -> Vec<EmployeeRecord> {
    let row = |division: &str, sex: &str, regular: &str, contract: &str, total: &str, salary: &str| {
        EmployeeRecord {
            fo_bbm: Some(division.to_string()),
            sexdstn: Some(sex.to_string()),
            rgllbr_co: Some(regular.to_string()),
            cnttk_co: Some(contract.to_string()),
            sm: Some(total.to_string()),
            fyer_salary_totamt: Some(salary.to_string()),
        }
    };
    vec![
        row("반도체", "남", "80", "10", "90", "9,000,000,000"),
        row("반도체", "여", "20", "10", "30", "2,500,000,000"),
        row("합계", "", "100", "20", "120", "11,500,000,000"),
    ]
}

fn executive_status(unregistered: usize) -> Vec<ExecutiveRecord> {
    let row = |name: String, sex: &str, registered: &str, tenure: &str| ExecutiveRecord {
        nm: Some(name),
        sexdstn: Some(sex.to_string()),
        rgist_exctv_at: Some(registered.to_string()),
        fte_at: Some(tenure.to_string()),
        ..Default::default()
    };
    let mut records = vec![
        row("최대표".to_string(), "남", "등기임원", "상근"),
        row("정이사".to_string(), "여", "등기임원", "비상근"),
    ];
    records.extend((0..unregistered).map(|i| row(format!("상무{}", i), "남", "미등기임원", "상근")));
    records
}

/// Two full years for company X.
fn two_year_source() -> MockSource {
    let mut source = MockSource::default();

    let years = [
        (
            2022,
            [
                (ReportPeriod::Q1, 50_000_000_000, 1_000_000_000, 1_000_000_000, 300_000_000),
                (ReportPeriod::Q2, 52_000_000_000, 2_500_000_000, 1_500_000_000, 700_000_000),
                (ReportPeriod::Q3, 55_000_000_000, 4_000_000_000, 1_500_000_000, 900_000_000),
                (ReportPeriod::Q4, 60_000_000_000, 6_000_000_000, 0, 1_500_000_000),
            ],
        ),
        (
            2023,
            [
                (ReportPeriod::Q1, 61_000_000_000, 2_000_000_000, 2_000_000_000, 400_000_000),
                (ReportPeriod::Q2, 63_000_000_000, 4_200_000_000, 2_200_000_000, 500_000_000),
                (ReportPeriod::Q3, 64_000_000_000, 6_600_000_000, 2_400_000_000, 1_100_000_000),
                (ReportPeriod::Q4, 70_000_000_000, 9_000_000_000, 0, 2_000_000_000),
            ],
        ),
    ];

    for (year, quarters) in years {
        for (period, assets, revenue_ytd, revenue_quarter, operating_cf) in quarters {
            source.statements.insert(
                (year, period),
                statements(period, assets, revenue_ytd, revenue_quarter, operating_cf),
            );
        }
    }

    source
        .footnotes
        .insert((2023, ReportPeriod::Q1), expense_footnote(300_000));
    source
        .footnotes
        .insert((2023, ReportPeriod::Q2), expense_footnote(700_000));
    source
        .employees
        .insert((2023, ReportPeriod::Q4), employee_status());

    source
}

fn registry() -> CorpRegistry {
    CorpRegistry::from_xml(&format!(
        r#"<result>
            <list>
                <corp_code>{}</corp_code>
                <corp_name>{}</corp_name>
                <stock_code>099990</stock_code>
                <modify_date>20240101</modify_date>
            </list>
        </result>"#,
        CORP_CODE, CORP_NAME
    ))
    .unwrap()
}

fn builder<'a>(source: &'a MockSource, registry: &CorpRegistry) -> DisclosureHistoryBuilder<'a> {
    DisclosureHistoryBuilder::new(
        BuilderConfig::new(false, Unit::Thousand),
        &CompanyTarget::by_name(CORP_NAME),
        registry,
        source,
    )
    .unwrap()
}

fn quarter_columns() -> Vec<String> {
    [2022, 2023]
        .iter()
        .flat_map(|year| ReportPeriod::ALL.iter().map(move |p| p.column_label(*year)))
        .collect()
}

#[test]
fn test_two_years_by_quarter_discrete() {
    let source = two_year_source();
    let registry = registry();
    let builder = builder(&source, &registry);

    let table = builder.merge_period(2022, 2023, true, false).unwrap();

    assert_eq!(table.columns(), quarter_columns().as_slice());

    let statement_rows = table
        .rows
        .iter()
        .filter(|r| matches!(r.section, Section::Statement(_)))
        .count();
    let taxonomy_size: usize = StatementType::ALL.iter().map(|s| accounts_for(*s).len()).sum();
    assert_eq!(statement_rows, taxonomy_size);

    for row in &table.rows {
        assert_eq!(row.values.len(), 8, "row {} is not fully joined", row.account_key);
    }

    // Flow rows are per-quarter amounts in thousands of won.
    assert_eq!(
        table.row(IS, "REVENUE").unwrap().values,
        vec![1_000_000, 1_500_000, 1_500_000, 2_000_000, 2_000_000, 2_200_000, 2_400_000, 2_400_000]
    );
    assert_eq!(
        table.row(CF, "OPERATING_ACTIVITIES").unwrap().values,
        vec![300_000, 400_000, 200_000, 600_000, 400_000, 100_000, 600_000, 900_000]
    );

    // Balance sheet rows are point-in-time values as filed.
    assert_eq!(
        table.row(BS, "ASSETS").unwrap().values,
        vec![
            50_000_000, 52_000_000, 55_000_000, 60_000_000, 61_000_000, 63_000_000, 64_000_000,
            70_000_000
        ]
    );
    assert_eq!(table.value(BS, "INVENTORIES", "2022.Q1"), Some(5_000_000));

    // Accounts nobody reported are zero.
    assert_eq!(table.row(IS, "GROSS_PROFIT").unwrap().values, vec![0; 8]);
}

#[test]
fn test_footnote_and_employee_details() {
    let source = two_year_source();
    let registry = registry();
    let builder = builder(&source, &registry);

    let table = builder.merge_period(2022, 2023, true, false).unwrap();

    let raw_materials = table.row(EXPENSE, "원재료사용액").unwrap();
    assert_eq!(raw_materials.account_name, "원재료 사용액");
    assert_eq!(table.value(EXPENSE, "원재료사용액", "2022.Q4"), Some(0));
    assert_eq!(table.value(EXPENSE, "원재료사용액", "2023.Q1"), Some(300_000));
    assert_eq!(table.value(EXPENSE, "원재료사용액", "2023.Q2"), Some(400_000));

    assert_eq!(table.value(EMPLOYEES, "TOTAL_EMPLOYEES", "2023.Q4"), Some(120));
    assert_eq!(table.value(EMPLOYEES, "TOTAL_EMPLOYEES", "2023.Q3"), Some(0));
    assert_eq!(table.value(EMPLOYEES, "FEMALE_EMPLOYEES", "2023.Q4"), Some(30));
    assert_eq!(
        table.value(EMPLOYEES, "ANNUAL_SALARY_TOTAL", "2023.Q4"),
        Some(11_500_000)
    );
}

#[test]
fn test_executive_headcount_is_point_in_time() {
    let mut source = two_year_source();
    source
        .executives
        .insert((2023, ReportPeriod::Q2), executive_status(3));
    source
        .executives
        .insert((2023, ReportPeriod::Q4), executive_status(5));
    let registry = registry();
    let builder = builder(&source, &registry);

    let table = builder.merge_period(2023, 2023, true, false).unwrap();

    assert_eq!(table.value(EXECUTIVES, "TOTAL_EXECUTIVES", "2023.Q2"), Some(5));
    assert_eq!(table.value(EXECUTIVES, "TOTAL_EXECUTIVES", "2023.Q3"), Some(0));
    assert_eq!(table.value(EXECUTIVES, "TOTAL_EXECUTIVES", "2023.Q4"), Some(7));
    assert_eq!(table.value(EXECUTIVES, "UNREGISTERED_EXECUTIVES", "2023.Q4"), Some(5));
    assert_eq!(table.value(EXECUTIVES, "REGISTERED_EXECUTIVES", "2023.Q4"), Some(2));
    assert_eq!(table.value(EXECUTIVES, "FEMALE_EXECUTIVES", "2023.Q4"), Some(1));
    assert_eq!(table.value(EXECUTIVES, "FULL_TIME_EXECUTIVES", "2023.Q4"), Some(6));
}

#[test]
fn test_cumulative_output() {
    let source = two_year_source();
    let registry = registry();
    let builder = builder(&source, &registry);

    let table = builder.aggregate_year(2022, true, true).unwrap();
    assert_eq!(
        table.row(IS, "REVENUE").unwrap().values,
        vec![1_000_000, 2_500_000, 4_000_000, 6_000_000]
    );
}

#[test]
fn test_missing_quarter_uses_nearest_prior_column() {
    let mut source = two_year_source();
    source.statements.remove(&(2023, ReportPeriod::Q2));
    let registry = registry();
    let builder = builder(&source, &registry);

    let table = builder.aggregate_year(2023, true, false).unwrap();

    assert_eq!(table.columns(), ["2023.Q1", "2023.Q3", "2023.Q4"]);
    assert_eq!(
        table.row(IS, "REVENUE").unwrap().values,
        vec![2_000_000, 4_600_000, 2_400_000]
    );
}

#[test]
fn test_failed_fetch_degrades_to_missing_quarter() {
    let mut source = two_year_source();
    source.failing.push((2022, ReportPeriod::Q3));
    let registry = registry();
    let builder = builder(&source, &registry);

    let table = builder.aggregate_year(2022, true, false).unwrap();
    assert_eq!(table.columns(), ["2022.Q1", "2022.Q2", "2022.Q4"]);
    assert_eq!(table.value(IS, "REVENUE", "2022.Q4"), Some(3_500_000));
}

#[test]
fn test_unpublished_early_quarters() {
    let mut source = MockSource::default();
    source.statements.insert(
        (2024, ReportPeriod::Q1),
        statements(ReportPeriod::Q1, 10_000_000, 1_000_000, 1_000_000, 0),
    );
    let registry = registry();
    let builder = builder(&source, &registry);

    let table = builder.aggregate_year(2024, true, false).unwrap();
    assert_eq!(table.columns(), ["2024.Q1"]);
    assert_eq!(table.value(BS, "ASSETS", "2024.Q1"), Some(10_000));
}

#[test]
fn test_by_year_table() -> anyhow::Result<()> {
    let source = two_year_source();
    let registry = registry();
    let builder = builder(&source, &registry);

    let (by_quarter, by_year) = builder.build_tables(2022, 2023, false)?;

    assert_eq!(by_quarter.columns().len(), 8);
    assert_eq!(by_year.columns(), ["2022", "2023"]);
    assert_eq!(by_year.row(IS, "REVENUE").unwrap().values, vec![6_000_000, 9_000_000]);
    assert_eq!(by_year.row(BS, "ASSETS").unwrap().values, vec![60_000_000, 70_000_000]);
    assert_eq!(
        builder.default_export_file_name(2022, 2023),
        "엑스전자_2022_2023_unit_thousand.xlsx"
    );
    Ok(())
}

#[test]
fn test_export_projection() {
    let source = two_year_source();
    let registry = registry();
    let builder = builder(&source, &registry);

    let table = builder.merge_period(2023, 2023, false, false).unwrap();
    let csv = table.to_csv().unwrap();

    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("statement_name,account_name,2023"));
    assert!(csv.contains("재무상태표,자산총계,70000000"));
    assert!(csv.contains("손익계산서,매출액,9000000"));
    assert!(!csv.contains("BalanceSheet"));

    let exported = table.export_rows();
    assert_eq!(exported.len(), table.len());
}

#[test]
fn test_company_by_code_and_missing_company() {
    let source = two_year_source();
    let registry = registry();

    let by_code = DisclosureHistoryBuilder::new(
        BuilderConfig::default(),
        &CompanyTarget::by_code(CORP_CODE),
        &registry,
        &source,
    )
    .unwrap();
    assert_eq!(by_code.corp_name(), CORP_NAME);

    let missing = DisclosureHistoryBuilder::new(
        BuilderConfig::default(),
        &CompanyTarget::by_code("00000000"),
        &registry,
        &source,
    );
    assert!(matches!(missing, Err(DisclosureError::CompanyNotFound(_))));
}

#[test]
fn test_unrecognized_footnote_unit_is_fatal() {
    let mut source = two_year_source();
    source.footnotes.insert(
        (2023, ReportPeriod::Q1),
        expense_footnote(300_000).replace("천원", "천달러"),
    );
    let registry = registry();
    let builder = builder(&source, &registry);

    let result = builder.aggregate_year(2023, true, false);
    assert!(matches!(result, Err(DisclosureError::UnrecognizedUnit { .. })));
}

#[test]
fn test_chart_of_accounts_is_consistent() {
    assert!(chart_of_accounts::taxonomy_violations().is_empty());
    let chart = ChartOfAccounts::canonical();
    assert_eq!(
        chart.total_accounts(),
        StatementType::ALL.iter().map(|s| accounts_for(*s).len()).sum::<usize>()
    );
}

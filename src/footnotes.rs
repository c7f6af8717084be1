//! Detail data that lives outside the three statements: footnote tables
//! scraped from the filing's notes document, and the employee and
//! shareholder disclosures the regulator API serves separately.

use crate::chart_of_accounts::strip_whitespace;
use crate::error::{DisclosureError, Result};
use crate::ingestion::{parse_amount, parse_ratio};
use crate::schema::{
    CanonicalRow, DetailKind, EmployeeRecord, ExecutiveRecord, Section, ShareholderRecord, Unit,
};
use log::debug;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

static BLOCK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p, table").expect("valid block selector"));
static TR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid tr selector"));
static CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("valid cell selector"));

static NUMBERED_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*\S").expect("valid heading regex"));
static EXPENSE_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*비용").expect("valid expense heading regex"));
static INVENTORY_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*재고자산").expect("valid inventory heading regex"));
static UNIT_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"단위\s*[:：]\s*([^\s\)\]]*)").expect("valid unit label regex"));
static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"단위\s*[:：]\s*(백만원|천원|원)(?:[^\p{Hangul}]|$)").expect("valid unit regex")
});

/// A footnote data table with amounts converted to whole currency units.
#[derive(Debug, Clone, PartialEq)]
pub struct FootnoteTable {
    pub unit_multiplier: i64,
    pub rows: Vec<(String, i64)>,
}

fn heading_regex(kind: DetailKind) -> Option<&'static Regex> {
    match kind {
        DetailKind::Expense => Some(&*EXPENSE_HEADING_RE),
        DetailKind::Inventory => Some(&*INVENTORY_HEADING_RE),
        DetailKind::EmployeeStatus | DetailKind::Executives | DetailKind::Shareholders => None,
    }
}

fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_ancestor(element: &ElementRef<'_>, name: &str) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == name)
}

fn inside_table(element: &ElementRef<'_>) -> bool {
    has_ancestor(element, "table")
}

/// Column titles: a row under `thead` or one made only of `th` cells.
fn is_header_row(tr: &ElementRef<'_>, cells: &[ElementRef<'_>]) -> bool {
    has_ancestor(tr, "thead") || cells.iter().all(|c| c.value().name() == "th")
}

/// Multiplier a unit caption such as `(단위 : 천원)` stands for.
///
/// `Ok(None)` when the text carries no unit caption at all; an error when
/// the caption does not start with a currency unit that can be converted
/// safely. Units listed after the first one, as in `(단위 : 원, 주)`, are
/// ignored.
pub fn parse_unit_caption(text: &str, kind: DetailKind) -> Result<Option<i64>> {
    if let Some(caps) = UNIT_RE.captures(text) {
        return Ok(match caps.get(1).map(|m| m.as_str()) {
            Some("천원") => Some(1_000),
            Some("백만원") => Some(1_000_000),
            _ => Some(1),
        });
    }

    match UNIT_LABEL_RE.captures(text) {
        Some(caps) => Err(DisclosureError::UnrecognizedUnit {
            section: kind.display_name().to_string(),
            unit: caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string(),
        }),
        None => Ok(None),
    }
}

fn parse_data_table(table: ElementRef<'_>, multiplier: i64) -> Vec<(String, i64)> {
    let mut rows: Vec<(String, i64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tr in table.select(&TR_SELECTOR) {
        let elements: Vec<ElementRef<'_>> = tr.select(&CELL_SELECTOR).collect();
        if elements.is_empty() || is_header_row(&tr, &elements) {
            continue;
        }
        let cells: Vec<String> = elements.into_iter().map(collapse_text).collect();
        let Some((label, values)) = cells.split_first() else {
            continue;
        };
        if label.is_empty() {
            continue;
        }
        let Some(amount) = values.iter().find_map(|v| parse_amount(v)) else {
            continue;
        };
        let amount = amount.saturating_mul(multiplier);

        // Repeated labels (sub-totals split across lines) are summed.
        match index.get(label) {
            Some(&i) => rows[i].1 = rows[i].1.saturating_add(amount),
            None => {
                index.insert(label.clone(), rows.len());
                rows.push((label.clone(), amount));
            }
        }
    }

    rows
}

/// Locates the numbered footnote section for `kind` and reads its table.
///
/// The section heading is a paragraph such as `12. 재고자산`; the first
/// table after it states the unit, the second holds the data. A missing
/// section, a missing unit caption or a missing data table is reported as
/// `Ok(None)`.
pub fn parse_footnote_section(html: &str, kind: DetailKind) -> Result<Option<FootnoteTable>> {
    let Some(heading_re) = heading_regex(kind) else {
        return Ok(None);
    };

    let document = Html::parse_document(html);
    let blocks: Vec<ElementRef<'_>> = document
        .select(&BLOCK_SELECTOR)
        .filter(|el| !inside_table(el))
        .collect();

    let Some(start) = blocks.iter().position(|el| {
        el.value().name() == "p" && heading_re.is_match(&collapse_text(*el))
    }) else {
        debug!("No {} section in footnotes", kind.display_name());
        return Ok(None);
    };

    let mut tables = Vec::new();
    for el in &blocks[start + 1..] {
        match el.value().name() {
            "table" => {
                tables.push(*el);
                if tables.len() == 2 {
                    break;
                }
            }
            _ if NUMBERED_HEADING_RE.is_match(&collapse_text(*el)) => break,
            _ => {}
        }
    }

    let [unit_table, data_table] = tables.as_slice() else {
        debug!("Incomplete {} section in footnotes", kind.display_name());
        return Ok(None);
    };

    let Some(multiplier) = parse_unit_caption(&collapse_text(*unit_table), kind)? else {
        debug!("No unit caption in {} section", kind.display_name());
        return Ok(None);
    };

    Ok(Some(FootnoteTable {
        unit_multiplier: multiplier,
        rows: parse_data_table(*data_table, multiplier),
    }))
}

/// Canonical rows of one footnote section, rescaled to `unit`.
pub fn footnote_rows(html: &str, kind: DetailKind, unit: Unit) -> Result<Vec<CanonicalRow>> {
    let Some(table) = parse_footnote_section(html, kind)? else {
        return Ok(Vec::new());
    };

    Ok(table
        .rows
        .into_iter()
        .map(|(label, amount)| CanonicalRow {
            section: Section::Detail(kind),
            statement_name: kind.display_name().to_string(),
            account_key: strip_whitespace(&label),
            account_name: label,
            amount: unit.scale(amount),
        })
        .collect())
}

fn detail_row(kind: DetailKind, key: &str, name: &str, amount: i64) -> CanonicalRow {
    CanonicalRow {
        section: Section::Detail(kind),
        statement_name: kind.display_name().to_string(),
        account_key: key.to_string(),
        account_name: name.to_string(),
        amount,
    }
}

fn is_total_label(label: Option<&str>) -> bool {
    matches!(
        label.map(strip_whitespace).as_deref(),
        Some("합계") | Some("계") | Some("총계")
    )
}

fn sum_field<'a, I>(records: I, field: impl Fn(&EmployeeRecord) -> &Option<String>) -> i64
where
    I: Iterator<Item = &'a EmployeeRecord>,
{
    records
        .filter_map(|r| field(r).as_deref().and_then(parse_amount))
        .fold(0i64, |acc, v| acc.saturating_add(v))
}

/// Headcount and payroll rows from the employee-status disclosure.
///
/// Filers often add a grand-total line per business division; those lines
/// are skipped unless they are all there is.
pub fn employee_rows(records: &[EmployeeRecord], unit: Unit) -> Vec<CanonicalRow> {
    if records.is_empty() {
        return Vec::new();
    }

    let detail: Vec<&EmployeeRecord> = records
        .iter()
        .filter(|r| !is_total_label(r.fo_bbm.as_deref()))
        .collect();
    let used: Vec<&EmployeeRecord> = if detail.is_empty() {
        records.iter().collect()
    } else {
        detail
    };

    let by_sex = |sex: &str| {
        sum_field(
            used.iter()
                .copied()
                .filter(|r| r.sexdstn.as_deref().map(str::trim) == Some(sex)),
            |r| &r.sm,
        )
    };

    let kind = DetailKind::EmployeeStatus;
    vec![
        detail_row(kind, "REGULAR_EMPLOYEES", "정규직 수", sum_field(used.iter().copied(), |r| &r.rgllbr_co)),
        detail_row(kind, "CONTRACT_EMPLOYEES", "계약직 수", sum_field(used.iter().copied(), |r| &r.cnttk_co)),
        detail_row(kind, "MALE_EMPLOYEES", "남 직원 수", by_sex("남")),
        detail_row(kind, "FEMALE_EMPLOYEES", "여 직원 수", by_sex("여")),
        detail_row(kind, "TOTAL_EMPLOYEES", "직원 합계", sum_field(used.iter().copied(), |r| &r.sm)),
        detail_row(
            kind,
            "ANNUAL_SALARY_TOTAL",
            "연간급여 총액",
            unit.scale(sum_field(used.iter().copied(), |r| &r.fyer_salary_totamt)),
        ),
    ]
}

/// Executive headcounts: total, registered and unregistered, full-time,
/// and by sex. Entries without a name are not counted.
pub fn executive_rows(records: &[ExecutiveRecord]) -> Vec<CanonicalRow> {
    let named: Vec<&ExecutiveRecord> = records
        .iter()
        .filter(|r| r.nm.as_deref().is_some_and(|n| !n.trim().is_empty()))
        .collect();
    if named.is_empty() {
        return Vec::new();
    }

    let count = |field: fn(&ExecutiveRecord) -> &Option<String>, value: &str| {
        named
            .iter()
            .filter(|r| field(r).as_deref().map(strip_whitespace).as_deref() == Some(value))
            .count() as i64
    };

    let kind = DetailKind::Executives;
    vec![
        detail_row(kind, "REGISTERED_EXECUTIVES", "등기임원 수", count(|r| &r.rgist_exctv_at, "등기임원")),
        detail_row(kind, "UNREGISTERED_EXECUTIVES", "미등기임원 수", count(|r| &r.rgist_exctv_at, "미등기임원")),
        detail_row(kind, "FULL_TIME_EXECUTIVES", "상근 임원 수", count(|r| &r.fte_at, "상근")),
        detail_row(kind, "MALE_EXECUTIVES", "남 임원 수", count(|r| &r.sexdstn, "남")),
        detail_row(kind, "FEMALE_EXECUTIVES", "여 임원 수", count(|r| &r.sexdstn, "여")),
        detail_row(kind, "TOTAL_EXECUTIVES", "임원 합계", named.len() as i64),
    ]
}

/// Share count and ownership rows per holder and share class.
///
/// Ownership is expressed in hundredths of a percent so it stays integral.
pub fn shareholder_rows(records: &[ShareholderRecord]) -> Vec<CanonicalRow> {
    let kind = DetailKind::Shareholders;
    let mut rows = Vec::new();

    for record in records {
        let Some(name) = record.nm.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
            continue;
        };
        if is_total_label(Some(name)) {
            continue;
        }

        let holder = match record.stock_knd.as_deref().map(str::trim) {
            Some(stock) if !stock.is_empty() && stock != "-" => format!("{}({})", name, stock),
            _ => name.to_string(),
        };
        let key = strip_whitespace(&holder);

        let shares = record
            .trmend_posesn_stock_co
            .as_deref()
            .and_then(parse_amount)
            .unwrap_or(0);
        let ownership = record
            .trmend_posesn_stock_qota_rt
            .as_deref()
            .and_then(parse_ratio)
            .map(|rate| (rate * 100.0).round() as i64)
            .unwrap_or(0);

        rows.push(detail_row(
            kind,
            &format!("{}_SHARES", key),
            &format!("{} 보유주식수", holder),
            shares,
        ));
        rows.push(detail_row(
            kind,
            &format!("{}_OWNERSHIP", key),
            &format!("{} 지분율(0.01%)", holder),
            ownership,
        ));
    }

    rows
}

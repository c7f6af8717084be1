use crate::schema::{RawDisclosureRow, RawFilingRecord};

/// Parses an amount as filed: thousands separators, surrounding whitespace,
/// a leading minus or accounting-style parentheses. Dashes and blanks mean
/// "no value"; anything else that is not numeric yields `None`.
pub fn parse_amount(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '-') {
        return None;
    }

    let (negative, body) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, cleaned.as_str()),
    };
    // A sign inside parentheses is ambiguous.
    if negative && body.starts_with(['-', '+']) {
        return None;
    }

    let value = match body.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            let float = body.parse::<f64>().ok()?;
            if !float.is_finite() {
                return None;
            }
            float.trunc() as i64
        }
    };

    if negative {
        value.checked_neg()
    } else {
        Some(value)
    }
}

/// Parses a ratio such as `"12.34"` or `"12.34%"`.
pub fn parse_ratio(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '%')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_optional(raw: &Option<String>) -> Option<i64> {
    raw.as_deref().and_then(parse_amount)
}

impl From<&RawFilingRecord> for RawDisclosureRow {
    fn from(record: &RawFilingRecord) -> Self {
        Self {
            statement_div: record.sj_div.trim().to_string(),
            account_id: record.account_id.trim().to_string(),
            account_label: record.account_nm.clone(),
            period_amount: parse_optional(&record.thstrm_amount),
            cumulative_amount: parse_optional(&record.thstrm_add_amount),
        }
    }
}

pub fn convert_records(records: &[RawFilingRecord]) -> Vec<RawDisclosureRow> {
    records.iter().map(RawDisclosureRow::from).collect()
}

use crate::chart_of_accounts::CanonicalAccount;
use crate::schema::RawDisclosureRow;
use std::collections::HashSet;

/// Rows of one filing that report `account`: tagged with one of its codes,
/// or untagged with a label equal to one of its names once whitespace is
/// removed. Exact duplicate rows are kept once.
pub fn matching_rows<'a>(
    rows: &'a [RawDisclosureRow],
    account: &CanonicalAccount,
) -> Vec<&'a RawDisclosureRow> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|row| {
            account.matches_code(&row.account_id)
                || (row.is_non_standard() && account.matches_label(&row.account_label))
        })
        .filter(|row| seen.insert(*row))
        .collect()
}

/// Amount a single row contributes: the year-to-date value when it is
/// present and non-zero, otherwise the current-period value.
pub fn contribution(row: &RawDisclosureRow) -> i64 {
    match row.cumulative_amount {
        Some(cumulative) if cumulative != 0 => cumulative,
        _ => row.period_amount.unwrap_or(0),
    }
}

/// Sums every matching row of `rows` for `account`.
///
/// Returns zero when nothing matched, so an account the filer did not
/// report cannot be told apart from one reported as zero.
pub fn resolve(rows: &[RawDisclosureRow], account: &CanonicalAccount) -> i64 {
    matching_rows(rows, account)
        .into_iter()
        .map(contribution)
        .fold(0i64, |acc, v| acc.saturating_add(v))
}

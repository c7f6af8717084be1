use crate::error::Result;
use crate::schema::StatementType;
use serde::Serialize;
use std::collections::HashSet;

/// A line item of the canonical account schema.
///
/// Filers are not required to tag every line with a standardized code and
/// routinely vary free-text labels, so each account carries every code and
/// label variant observed for it. Labels are compared with all whitespace
/// removed.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CanonicalAccount {
    pub statement_type: StatementType,
    pub account_key: &'static str,
    pub display_name: &'static str,
    pub match_names: &'static [&'static str],
    pub match_codes: &'static [&'static str],
}

const fn account(
    statement_type: StatementType,
    account_key: &'static str,
    display_name: &'static str,
    match_names: &'static [&'static str],
    match_codes: &'static [&'static str],
) -> CanonicalAccount {
    CanonicalAccount {
        statement_type,
        account_key,
        display_name,
        match_names,
        match_codes,
    }
}

use StatementType::{BalanceSheet as BS, CashFlow as CF, IncomeStatement as IS};

pub static BALANCE_SHEET_ACCOUNTS: &[CanonicalAccount] = &[
    account(BS, "CURRENT_ASSETS", "유동자산", &["유동자산"], &["ifrs-full_CurrentAssets"]),
    account(
        BS,
        "CASH_AND_CASH_EQUIVALENTS",
        "현금및현금성자산",
        &["현금및현금성자산"],
        &[
            "ifrs-full_CashAndCashEquivalents",
            "ifrs-full_Cash",
            "ifrs-full_CashEquivalents",
        ],
    ),
    account(
        BS,
        "TRADE_AND_OTHER_CURRENT_RECEIVABLES",
        "매출채권 및 기타채권",
        &[
            "매출채권",
            "매출채권및기타채권",
            "매출채권 및 기타수취채권",
            "매출채권 및 기타채권",
        ],
        &[
            "ifrs-full_TradeAndOtherCurrentReceivables",
            "dart_ShortTermTradeReceivable",
            "dart_AllowanceForDoubtfulAcccountShortTermTradeReceivable",
            "ifrs-full_TradeReceivables",
        ],
    ),
    account(
        BS,
        "OTHER_CURRENT_ASSETS",
        "기타유동자산",
        &["기타유동자산"],
        &["ifrs-full_OtherCurrentAssets", "dart_OtherCurrentAssets"],
    ),
    account(
        BS,
        "INVENTORIES",
        "재고자산",
        &["재고자산"],
        &[
            "ifrs-full_Inventories",
            "dart_RawMaterialsGross",
            "ifrs-full_InventoriesTotal",
        ],
    ),
    account(BS, "NON_CURRENT_ASSETS", "비유동자산", &["비유동자산"], &["ifrs-full_NoncurrentAssets"]),
    account(
        BS,
        "TRADE_AND_OTHER_NON_CURRENT_RECEIVABLES",
        "매출채권 및 기타채권(비유동)",
        &[
            "매출채권(비유동)",
            "장기매출채권",
            "장기매출채권및기타채권",
            "장기매출채권 및 기타채권",
            "비유동매출채권 및 기타채권",
            "장기성매출채권",
            "매출채권및상각후원가측정금융자산(비유동)",
        ],
        &[
            "dart_LongTermTradeReceivablesGross",
            "dart_LongTermTradeAndOtherNonCurrentReceivablesGross",
            "dart_AllowanceForDoubtfulAcccountLongTermTradeReceivablesGross",
            "ifrs-full_NoncurrentTradeReceivables",
            "ifrs-full_NoncurrentReceivables",
        ],
    ),
    account(
        BS,
        "OTHER_NON_CURRENT_ASSETS",
        "기타비유동자산",
        &["기타비유동자산"],
        &["ifrs-full_OtherNoncurrentAssets", "dart_OtherNonCurrentAssets"],
    ),
    account(
        BS,
        "PROPERTY_PLANT_AND_EQUIPMENT",
        "유형자산",
        &["유형자산"],
        &[
            "ifrs-full_PropertyPlantAndEquipment",
            "dart_OtherPropertyPlantAndEquipmentGross",
        ],
    ),
    account(
        BS,
        "INTANGIBLE_ASSETS",
        "무형자산",
        &["무형자산", "무형자산 및 영업권", "기타무형자산"],
        &[
            "ifrs-full_IntangibleAssetsOtherThanGoodwill",
            "dart_OtherIntangibleAssetsGross",
            "dart_GoodwillGross",
            "ifrs-full_IntangibleAssetsAndGoodwill",
            "ifrs-full_OtherNoncurrentFinancialAssets",
        ],
    ),
    account(BS, "ASSETS", "자산총계", &["자산총계"], &["ifrs-full_Assets"]),
    account(BS, "CURRENT_LIABILITIES", "유동부채", &["유동부채"], &["ifrs-full_CurrentLiabilities"]),
    account(
        BS,
        "TRADE_AND_OTHER_CURRENT_PAYABLES",
        "매입채무 및 기타채무",
        &["매입채무", "유동매입채무", "매입채무및기타채무"],
        &[
            "ifrs-full_TradeAndOtherCurrentPayables",
            "dart_ShortTermTradePayables",
            "ifrs-full_TradeAndOtherPayablesToTradeSuppliers",
            "ifrs-full_TradeAndOtherCurrentPayablesToTradeSuppliers",
        ],
    ),
    account(
        BS,
        "SHORT_TERM_BORROWINGS",
        "단기차입금",
        &[
            "유동성장기차입금",
            "단기차입금",
            "단기차입금 및 유동성장기부채",
            "단기차입금및유동성장기차입금",
            "외화단기차입금",
            "단기 차입금",
            "차입금",
            "유동 장기 차입금",
            "유동성 단기차입금",
            "차입금및사채",
            "유동성사채및장기차입금",
            "유동차입금및유동사채",
            "유동 차입금 및 사채",
            "유동성차입금",
            "유동차입금",
        ],
        &[
            "ifrs-full_ShorttermBorrowings",
            "ifrs-full_Borrowings",
            "ifrs-full_OtherCurrentFinancialLiabilities",
        ],
    ),
    account(
        BS,
        "CURRENT_CONVERTIBLE_BONDS",
        "전환사채(유동)",
        &["전환사채", "전환사채(유동)", "유동전환사채"],
        &["dart_CurrentPortionOfConvertibleBonds", "dart_ConvertibleBonds"],
    ),
    account(
        BS,
        "SHORT_TERM_INCOME_RECEIVED_IN_ADVANCE",
        "선수수익(유동)",
        &["선수수익(유동)"],
        &["dart_ShortTermIncomeReceivedInAdvance"],
    ),
    account(
        BS,
        "SHORT_TERM_ADVANCES_CUSTOMERS",
        "선수금(유동)",
        &["선수금(유동)"],
        &["dart_ShortTermAdvancesCustomers", "ifrs-full_Advances"],
    ),
    account(
        BS,
        "NON_CURRENT_LIABILITIES",
        "비유동부채",
        &["비유동부채"],
        &["ifrs-full_NoncurrentLiabilities"],
    ),
    account(
        BS,
        "TRADE_AND_OTHER_NON_CURRENT_PAYABLES",
        "매입채무 및 기타채무(비유동)",
        &[
            "비유동매입채무 및 기타채무",
            "장기매입채무 및 기타채무",
            "매입채무 및 기타금융부채(비유동)",
            "장기매입채무및기타채무",
        ],
        &[
            "dart_LongTermTradeAndOtherNonCurrentPayables",
            "dart_LongTermTradePayablesGross",
        ],
    ),
    account(
        BS,
        "LONG_TERM_BORROWINGS",
        "장기차입금",
        &[
            "장기차입금 및 사채",
            "장기차입금",
            "비유동차입금및비유동사채",
            "비유동차입금",
        ],
        &["dart_LongTermBorrowingsGross", "ifrs-full_LongtermBorrowings"],
    ),
    account(
        BS,
        "NON_CURRENT_CONVERTIBLE_BONDS",
        "전환사채(비유동)",
        &["비유동전환사채", "전환사채(장기)"],
        &[],
    ),
    account(
        BS,
        "LONG_TERM_INCOME_RECEIVED_IN_ADVANCE",
        "선수수익(비유동)",
        &[],
        &["dart_LongTermIncomeReceivedInAdvance"],
    ),
    account(
        BS,
        "LONG_TERM_ADVANCES_CUSTOMERS",
        "선수금(비유동)",
        &["장기선수금"],
        &["dart_LongTermAdvancesCustomers"],
    ),
    account(BS, "LIABILITIES", "부채총계", &["부채총계"], &["ifrs-full_Liabilities"]),
    account(BS, "ISSUED_CAPITAL", "자본금", &["자본금"], &["ifrs-full_IssuedCapital"]),
    account(
        BS,
        "RETAINED_EARNINGS",
        "이익잉여금",
        &["이익잉여금", "이익잉여금(결손금)"],
        &["ifrs-full_RetainedEarnings"],
    ),
    account(BS, "EQUITY", "자본총계", &["자본총계"], &["ifrs-full_Equity"]),
    account(
        BS,
        "EQUITY_AND_LIABILITIES",
        "자본과부채총계",
        &["자본과부채총계"],
        &["ifrs-full_EquityAndLiabilities"],
    ),
];

pub static INCOME_STATEMENT_ACCOUNTS: &[CanonicalAccount] = &[
    account(IS, "REVENUE", "매출액", &["매출액"], &["ifrs-full_Revenue"]),
    account(
        IS,
        "REVENUE_FROM_SALE_OF_GOODS_PRODUCT",
        "제품매출액",
        &["제품매출", "제품매출액"],
        &[
            "dart_RevenueFromSaleOfGoodsProduct",
            "ifrs-full_RevenueFromSaleOfGoods",
        ],
    ),
    account(
        IS,
        "REVENUE_FROM_SALE_OF_GOODS_MERCHANDISE",
        "상품매출액",
        &["상품매출", "상품매출액", "(1) 상품매출액"],
        &["dart_RevenueFromSaleOfGoodsMerchandise"],
    ),
    account(IS, "COST_OF_SALES", "매출원가", &["매출원가"], &["ifrs-full_CostOfSales"]),
    account(
        IS,
        "COST_OF_SALES_FROM_SALE_OF_GOODS_PRODUCT",
        "제품매출원가",
        &["제품매출원가"],
        &["dart_CostOfSalesFromSaleOfGoodsProduct"],
    ),
    account(
        IS,
        "COST_OF_SALES_FROM_SALE_OF_GOODS_MERCHANDISE",
        "상품매출원가",
        &["상품매출원가"],
        &[
            "ifrs-full_CostOfMerchandiseSold",
            "dart_CostOfSalesFromSaleOfGoods",
        ],
    ),
    account(IS, "GROSS_PROFIT", "매출총이익", &["매출총이익"], &["ifrs-full_GrossProfit"]),
    account(
        IS,
        "SELLING_GENERAL_ADMINISTRATIVE_EXPENSES",
        "판매비와관리비",
        &["판매비와관리비", "판매비", "관리비", "판매관리비", "판매비용"],
        &[
            "dart_TotalSellingGeneralAdministrativeExpenses",
            "ifrs-full_GeneralAndAdministrativeExpense",
            "ifrs-full_SellingGeneralAndAdministrativeExpense",
            "ifrs-full_SellingExpense",
        ],
    ),
    account(
        IS,
        "OPERATING_INCOME_LOSS",
        "영업이익",
        &["영업이익"],
        &[
            "dart_OperatingIncomeLoss",
            "ifrs-full_ProfitLossFromOperatingActivities",
        ],
    ),
    account(
        IS,
        "PROFIT_LOSS",
        "당기순이익",
        &["당기순이익", "당기순이익(손실)"],
        &["ifrs-full_ProfitLoss"],
    ),
];

pub static CASH_FLOW_ACCOUNTS: &[CanonicalAccount] = &[
    account(
        CF,
        "OPERATING_ACTIVITIES",
        "영업활동현금흐름",
        &["영업활동현금흐름"],
        &[
            "ifrs-full_CashFlowsFromUsedInOperatingActivities",
            "ifrs-full_CashFlowsFromUsedInOperations",
        ],
    ),
    account(CF, "PROFIT_LOSS", "당기순이익", &["당기순이익"], &["ifrs-full_ProfitLoss"]),
    account(
        CF,
        "INTEREST_PAID",
        "이자지급",
        &["이자지급", "이자지급액", "이자지급(영업)"],
        &["ifrs-full_InterestPaidClassifiedAsOperatingActivities"],
    ),
    account(
        CF,
        "INTEREST_RECEIVED",
        "이자수취",
        &["이자수취", "이자수취(영업)", "이자수취액"],
        &["ifrs-full_InterestReceivedClassifiedAsOperatingActivities"],
    ),
    account(
        CF,
        "INVESTING_ACTIVITIES",
        "투자활동현금흐름",
        &["투자활동현금흐름"],
        &["ifrs-full_CashFlowsFromUsedInInvestingActivities"],
    ),
    account(
        CF,
        "PURCHASE_OF_FINANCIAL_INSTRUMENTS",
        "금융상품의 취득",
        &[
            "단기금융상품의 증가",
            "단기금융상품의 취득",
            "장단기금융상품의 취득",
            "금융상품의 증가",
            "장기금융상품의 납입",
            "장기금융상품의증가",
            "장단기금융상품의 증가",
            "장ㆍ단기금융상품의 증가",
            "장,단기금융상품의 증가",
        ],
        &[
            "dart_PurchaseOfShortTermFinancialInstruments",
            "dart_PurchaseOfLongTermFinancialInstruments",
            "dart_PurchaseOfFinancialInstruments",
            "ifrs-full_PurchaseOfFinancialInstrumentsClassifiedAsInvestingActivities",
            "ifrs-full_PurchaseOfOtherLongtermAssetsClassifiedAsInvestingActivities",
        ],
    ),
    account(
        CF,
        "SALES_OF_FINANCIAL_INSTRUMENTS",
        "금융상품의 처분",
        &[
            "단기금융상품의 감소",
            "장기금융상품의처분",
            "장기금융상품의 감소",
            "장단기금융상품의 처분",
            "단기금융상품의 처분",
            "장기금융상품의 해지",
            "단기금융상품의 해지",
            "장기금융상품의감소",
            "단기금융상품의감소",
            "장단기금융상품의 감소",
            "장ㆍ단기금융상품의 감소",
            "장,단기금융상품의 감소",
        ],
        &[
            "dart_ProceedsFromSalesOfShortTermFinancialInstruments",
            "dart_ProceedsFromSalesOfLongTermFinancialInstruments",
            "dart_ProceedsFromSalesOfFinancialInstruments",
            "dart_ProceedsFromSalesOfOtherFinancialAssets",
            "dart_ProceedsFromSalesOfOtherCurrentFinancialAssets",
        ],
    ),
    account(
        CF,
        "PURCHASE_OF_PROPERTY_PLANT_AND_EQUIPMENT",
        "유형자산의 취득",
        &[
            "유형자산의 취득",
            "유형자산의취득",
            "유형자산의 증가",
            "유형자산 취득",
        ],
        &[
            "ifrs-full_PurchaseOfPropertyPlantAndEquipmentClassifiedAsInvestingActivities",
            "dart_PurchaseOfOtherPropertyPlantAndEquipment",
        ],
    ),
    account(
        CF,
        "SALES_OF_PROPERTY_PLANT_AND_EQUIPMENT",
        "유형자산의 처분",
        &[
            "유형자산의 처분",
            "유형자산의 감소",
            "유형자산 처분",
            "유형자산 감소",
        ],
        &["ifrs-full_ProceedsFromSalesOfPropertyPlantAndEquipmentClassifiedAsInvestingActivities"],
    ),
    account(
        CF,
        "FINANCING_ACTIVITIES",
        "재무활동현금흐름",
        &["재무활동현금흐름"],
        &["ifrs-full_CashFlowsFromUsedInFinancingActivities"],
    ),
    account(
        CF,
        "PROCEEDS_FROM_BORROWINGS",
        "차입금의 증가",
        &[
            "차입금의 증가",
            "단기차입금의 차입",
            "장기차입금의 차입",
            "장기차입금의 증가",
            "단기차입금의 증가",
            "차입금의 순차입",
            "단기차입금의차입",
            "장기차입금의차입",
            "단기차입금의 순증감",
            "장기차입금의 증감",
            "차입금의 차입",
            "단기차입금의 순차입",
            "장기차입금의 순차입",
            "차입금및사채의 증가",
            "장기차입금 및 사채의 차입",
            "사채 및 장기차입금 차입",
            "단기차입금의증가",
            "유동성장기차입금의 차입",
            "유동성장기차입금의 증가",
            "장기차입금 차입",
            "단기차입금 증가",
            "차입금 차입",
            "유동성장기부채및단기차입금의 차입",
            "장기차입금의증가",
            "단기차입금 및 사채의 차입",
            "유동성차입금의 증가",
            "차입금 및 사채의 차입",
        ],
        &[
            "dart_ProceedsFromShortTermBorrowings",
            "dart_ProceedsFromLongTermBorrowings",
            "ifrs-full_ProceedsFromBorrowingsClassifiedAsFinancingActivities",
            "ifrs-full_ProceedsFromNoncurrentBorrowings",
            "ifrs-full_ProceedsFromCurrentBorrowings",
        ],
    ),
    account(
        CF,
        "REPAYMENTS_OF_BORROWINGS",
        "차입금의 감소",
        &[
            "유동성장기차입금의 상환",
            "장기차입금의 상환",
            "단기차입금의 상환",
            "유동성장기차입금의 감소",
            "장기차입금의 감소",
            "단기차입금의 감소",
            "유동장기차입금의 상환",
            "차입금의 상환",
            "차입금의 감소",
            "차입금의 순상환",
            "유동성장기차입금의상환",
            "유동성 장기차입금의 상환",
            "(유동성)장기차입금 상환",
            "유동성장기차입금 상환",
            "장기차입금의상환",
            "단기차입금의상환",
            "유동차입금의 상환",
            "장기차입금 상환",
            "차입금및사채의 상환",
            "유동성차입금의 상환",
            "장기차입금 및 사채의 상환",
            "사채 및 장기차입금 상환",
            "단기차입금의 순상환",
            "차입금 상환",
            "유동성단기차입금의 상환",
            "단기차입금의감소",
            "단기차입금 감소",
            "유동성장기부채및단기차입금의 상환",
            "유동성 장기차입금의 감소",
            "유동성장차입금의 감소",
            "단기차입금 및 사채의 상환",
            "유동성차입금(기타)의 상환",
            "유동성차입금의 감소",
            "유동성자기차입금 상환",
            "장기차입금 감소",
            "유동성장기차입금의감소",
        ],
        &[
            "dart_RepaymentsOfLongTermBorrowings",
            "dart_RepaymentsOfShortTermBorrowings",
            "ifrs-full_RepaymentsOfBorrowingsClassifiedAsFinancingActivities",
            "ifrs-full_RepaymentsOfCurrentBorrowings",
            "ifrs-full_RepaymentsOfNoncurrentBorrowings",
        ],
    ),
    account(
        CF,
        "DIVIDENDS_PAID",
        "배당금 지급",
        &["배당금지급", "배당금의 지급"],
        &["ifrs-full_DividendsPaidClassifiedAsFinancingActivities"],
    ),
];

/// Taxonomy accounts of one statement, in declaration order.
pub fn accounts_for(statement_type: StatementType) -> &'static [CanonicalAccount] {
    match statement_type {
        StatementType::BalanceSheet => BALANCE_SHEET_ACCOUNTS,
        StatementType::IncomeStatement => INCOME_STATEMENT_ACCOUNTS,
        StatementType::CashFlow => CASH_FLOW_ACCOUNTS,
    }
}

pub fn find_account(statement_type: StatementType, account_key: &str) -> Option<&'static CanonicalAccount> {
    accounts_for(statement_type)
        .iter()
        .find(|a| a.account_key == account_key)
}

/// Removes every whitespace character, the normal form labels are compared in.
pub fn strip_whitespace(label: &str) -> String {
    label.chars().filter(|c| !c.is_whitespace()).collect()
}

impl CanonicalAccount {
    pub fn matches_code(&self, account_id: &str) -> bool {
        self.match_codes.contains(&account_id)
    }

    pub fn matches_label(&self, label: &str) -> bool {
        let stripped = strip_whitespace(label);
        self.match_names
            .iter()
            .any(|name| strip_whitespace(name) == stripped)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountEntry {
    pub account_key: String,
    pub display_name: String,
    pub statement_type: StatementType,
    pub code: Option<String>,
    pub label_variants: usize,
}

impl From<&CanonicalAccount> for AccountEntry {
    fn from(account: &CanonicalAccount) -> Self {
        Self {
            account_key: account.account_key.to_string(),
            display_name: account.display_name.to_string(),
            statement_type: account.statement_type,
            code: account.match_codes.first().map(|c| c.to_string()),
            label_variants: account.match_names.len(),
        }
    }
}

/// Flattened, owned view of the taxonomy for documentation and export.
#[derive(Debug, Clone, Serialize)]
pub struct ChartOfAccounts {
    pub balance_sheet: Vec<AccountEntry>,
    pub income_statement: Vec<AccountEntry>,
    pub cash_flow: Vec<AccountEntry>,
}

impl ChartOfAccounts {
    pub fn canonical() -> Self {
        let entries = |statement| -> Vec<AccountEntry> {
            accounts_for(statement).iter().map(AccountEntry::from).collect()
        };
        Self {
            balance_sheet: entries(StatementType::BalanceSheet),
            income_statement: entries(StatementType::IncomeStatement),
            cash_flow: entries(StatementType::CashFlow),
        }
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Statement", "Account Key", "Display Name", "Primary Code"])?;

        for account in self.all_accounts() {
            writer.write_record([
                account.statement_type.display_name(),
                account.account_key.as_str(),
                account.display_name.as_str(),
                account.code.as_deref().unwrap_or(""),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        output.push_str("# Canonical Chart of Accounts\n\n");

        let sections = [
            (StatementType::BalanceSheet, &self.balance_sheet),
            (StatementType::IncomeStatement, &self.income_statement),
            (StatementType::CashFlow, &self.cash_flow),
        ];

        for (statement, accounts) in sections {
            output.push_str(&format!("## {}\n\n", statement.display_name()));
            for account in accounts {
                let code_marker = match &account.code {
                    Some(code) => format!(" `{}`", code),
                    None => " *(label match only)*".to_string(),
                };
                output.push_str(&format!(
                    "- {} ({}){}\n",
                    account.display_name, account.account_key, code_marker
                ));
            }
            output.push('\n');
        }

        output
    }

    pub fn total_accounts(&self) -> usize {
        self.balance_sheet.len() + self.income_statement.len() + self.cash_flow.len()
    }

    fn all_accounts(&self) -> impl Iterator<Item = &AccountEntry> {
        self.balance_sheet
            .iter()
            .chain(self.income_statement.iter())
            .chain(self.cash_flow.iter())
    }
}

/// Lists taxonomy problems: duplicate keys within a statement and accounts
/// with neither a code nor a label to match on.
pub fn taxonomy_violations() -> Vec<String> {
    let mut violations = Vec::new();

    for statement in StatementType::ALL {
        let mut seen = HashSet::new();
        for account in accounts_for(statement) {
            if !seen.insert(account.account_key) {
                violations.push(format!(
                    "{}: duplicate account key {}",
                    statement.code(),
                    account.account_key
                ));
            }
            if account.match_codes.is_empty() && account.match_names.is_empty() {
                violations.push(format!(
                    "{}: account {} has nothing to match on",
                    statement.code(),
                    account.account_key
                ));
            }
            if account.statement_type != statement {
                violations.push(format!(
                    "{}: account {} is declared under the wrong statement",
                    statement.code(),
                    account.account_key
                ));
            }
        }
    }

    violations
}

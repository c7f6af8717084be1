//! # Disclosure History Builder
//!
//! A library for turning a listed company's periodic regulatory filings
//! into canonical quarterly and annual time series.
//!
//! ## Core Concepts
//!
//! - **Canonical Taxonomy**: A fixed set of accounts per statement, each matched by
//!   standardized taxonomy codes or by free-text labels
//! - **Resolution**: Every raw row reporting an account is summed, preferring the
//!   year-to-date amount over the current-period one
//! - **Filings**: One report per company, year and quarter, fetched once and extracted
//!   into the three statements plus footnote and headcount details
//! - **Period Deltas**: Flow statements are filed year-to-date and are differenced into
//!   per-quarter amounts; balance sheet figures are left as filed
//! - **Outer Joins**: Quarters and years are joined on the canonical key with zero fill
//!
//! Amounts that were not reported and amounts reported as zero both show up as `0`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use disclosure_history_builder::*;
//!
//! let client = DartClient::from_env()?;
//! let registry = CorpRegistry::from_xml(&std::fs::read_to_string("CORPCODE.xml")?)?;
//!
//! let builder = DisclosureHistoryBuilder::new(
//!     BuilderConfig::new(true, Unit::Thousand),
//!     &CompanyTarget::by_name("삼성전자"),
//!     &registry,
//!     &client,
//! )?;
//!
//! let (by_quarter, by_year) = builder.build_tables(2022, 2023, false)?;
//! println!("{}", by_quarter.to_csv()?);
//! ```

pub mod calculator;
pub mod chart_of_accounts;
pub mod config;
pub mod corps;
pub mod engine;
pub mod error;
pub mod filing;
pub mod footnotes;
pub mod ingestion;
pub mod resolver;
pub mod schema;
pub mod utils;
pub mod viewer;

#[cfg(feature = "dart")]
pub mod client;

pub use calculator::{CompanyTarget, DisclosureHistoryBuilder};
pub use chart_of_accounts::{AccountEntry, CanonicalAccount, ChartOfAccounts};
pub use config::{BuilderConfig, DartConfig};
pub use corps::{CompanyDirectory, CompanyEntry, CorpRegistry};
pub use engine::{DisclosureTable, ExportRow, TableRow};
pub use error::{DisclosureError, Result};
pub use filing::{DisclosureSource, Filing};
pub use resolver::resolve;
pub use schema::*;

#[cfg(feature = "dart")]
pub use client::DartClient;

use crate::config::DartConfig;
use crate::error::{DisclosureError, Result};
use crate::filing::DisclosureSource;
use crate::schema::{
    ApiResponse, EmployeeRecord, ExecutiveRecord, FilingListRecord, FilingRequest,
    FilingResponse, ShareholderRecord,
};
use crate::utils::{filing_search_window, format_api_date, report_period_marker};
use crate::viewer::{parse_viewer_tree, select_footnote_node, ViewerNode};
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

/// `pblntf_ty` of periodic reports (business, half-year and quarterly).
const PERIODIC_REPORT_TYPE: &str = "A";
const SEARCH_PAGE_COUNT: &str = "100";

/// Blocking client for the regulator API and the filing viewer.
pub struct DartClient {
    client: Client,
    config: DartConfig,
}

impl DartClient {
    /// Fails without a usable API key.
    pub fn new(config: DartConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(DartConfig::from_env()?)
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.config.api_base_url, endpoint);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(&[("crtfc_key", self.config.api_key.as_str())])
            .query(params)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(DisclosureError::InvalidResponse(format!(
                "{} returned status {}",
                endpoint, status
            )));
        }

        Ok(response.json()?)
    }

    fn get_page(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/{}", self.config.viewer_base_url, path);
        debug!("GET {} {:?}", url, params);

        let response = self.client.get(&url).query(params).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(DisclosureError::InvalidResponse(format!(
                "{} returned status {}",
                path, status
            )));
        }

        Ok(response.text()?)
    }

    fn report_params<'r>(request: &'r FilingRequest, year: &'r str) -> Vec<(&'static str, &'r str)> {
        vec![
            ("corp_code", request.corp_code.as_str()),
            ("bsns_year", year),
            ("reprt_code", request.period.code()),
        ]
    }

    /// Periodic reports of the company received in the window after the
    /// requested period closed.
    pub fn search_filings(&self, request: &FilingRequest) -> Result<ApiResponse<FilingListRecord>> {
        let (start, end) = filing_search_window(request.year, request.period).ok_or_else(|| {
            DisclosureError::InvalidResponse(format!("no search window for {}", request.year))
        })?;
        let (bgn_de, end_de) = (format_api_date(start), format_api_date(end));

        self.get_json(
            "list.json",
            &[
                ("corp_code", request.corp_code.as_str()),
                ("bgn_de", bgn_de.as_str()),
                ("end_de", end_de.as_str()),
                ("pblntf_ty", PERIODIC_REPORT_TYPE),
                ("page_count", SEARCH_PAGE_COUNT),
            ],
        )
    }

    /// Receipt number of the first report whose name carries the period
    /// marker, e.g. `(2023.06)`.
    pub fn find_receipt_number(&self, request: &FilingRequest) -> Result<Option<String>> {
        let marker = report_period_marker(request.year, request.period);
        let found = self
            .search_filings(request)?
            .into_records()
            .into_iter()
            .find(|record| record.report_nm.contains(&marker))
            .map(|record| record.rcept_no);

        if found.is_none() {
            warn!(
                "No report marked {} for {}",
                marker, request.corp_code
            );
        }
        Ok(found)
    }

    pub fn fetch_viewer_tree(&self, rcept_no: &str) -> Result<Vec<ViewerNode>> {
        let page = self.get_page("dsaf001/main.do", &[("rcpNo", rcept_no)])?;
        Ok(parse_viewer_tree(&page))
    }

    pub fn fetch_viewer_document(&self, node: &ViewerNode) -> Result<String> {
        self.get_page("report/viewer.do", &node.viewer_query())
    }
}

impl DisclosureSource for DartClient {
    fn fetch_statements(&self, request: &FilingRequest) -> Result<FilingResponse> {
        let year = request.year.to_string();
        let mut params = Self::report_params(request, &year);
        params.push(("fs_div", request.fs_div()));
        self.get_json("fnlttSinglAcntAll.json", &params)
    }

    fn fetch_footnotes(&self, request: &FilingRequest) -> Result<Option<String>> {
        let Some(rcept_no) = self.find_receipt_number(request)? else {
            return Ok(None);
        };

        let nodes = self.fetch_viewer_tree(&rcept_no)?;
        let Some(node) = select_footnote_node(&nodes, request.consolidated) else {
            warn!("Report {} has no footnote section", rcept_no);
            return Ok(None);
        };

        self.fetch_viewer_document(node).map(Some)
    }

    fn fetch_employee_status(&self, request: &FilingRequest) -> Result<ApiResponse<EmployeeRecord>> {
        let year = request.year.to_string();
        self.get_json("empSttus.json", &Self::report_params(request, &year))
    }

    fn fetch_executive_status(&self, request: &FilingRequest) -> Result<ApiResponse<ExecutiveRecord>> {
        let year = request.year.to_string();
        self.get_json("exctvSttus.json", &Self::report_params(request, &year))
    }

    fn fetch_major_shareholders(
        &self,
        request: &FilingRequest,
    ) -> Result<ApiResponse<ShareholderRecord>> {
        let year = request.year.to_string();
        self.get_json("hyslrSttus.json", &Self::report_params(request, &year))
    }
}

//! The company profile endpoint (`company.json`).

use crate::dart::client::{DartClient, STATUS_OK};
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
struct CompanyResponse {
    status: String,
    message: String,
    #[serde(default)]
    corp_code: String,
    #[serde(default)]
    corp_name: String,
    #[serde(default)]
    corp_name_eng: Option<String>,
    #[serde(default)]
    stock_name: Option<String>,
    #[serde(default)]
    stock_code: Option<String>,
    #[serde(default)]
    ceo_nm: Option<String>,
    #[serde(default)]
    corp_cls: Option<String>,
    #[serde(default)]
    jurir_no: Option<String>,
    #[serde(default)]
    bizr_no: Option<String>,
    #[serde(default)]
    adres: Option<String>,
    #[serde(default)]
    hm_url: Option<String>,
    #[serde(default)]
    ir_url: Option<String>,
    #[serde(default)]
    phn_no: Option<String>,
    #[serde(default)]
    fax_no: Option<String>,
    #[serde(default)]
    induty_code: Option<String>,
    #[serde(default)]
    est_dt: Option<String>,
    #[serde(default)]
    acc_mt: Option<String>,
}

/// Company profile block returned alongside the structured financials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// DART corporate identifier.
    pub corp_code: String,
    /// Registered company name.
    pub corp_name: String,
    /// English company name.
    pub corp_name_eng: Option<String>,
    /// Listed stock name.
    pub stock_name: Option<String>,
    /// Six-digit KRX stock code.
    pub stock_code: Option<String>,
    /// CEO name.
    pub ceo_name: Option<String>,
    /// Corporation class (listing market).
    pub corp_class: Option<String>,
    /// Corporate registration number.
    pub registration_number: Option<String>,
    /// Business registration number.
    pub business_number: Option<String>,
    /// Registered address.
    pub address: Option<String>,
    /// Homepage URL.
    pub homepage: Option<String>,
    /// Investor-relations URL.
    pub ir_homepage: Option<String>,
    /// Phone number.
    pub phone_number: Option<String>,
    /// Fax number.
    pub fax_number: Option<String>,
    /// Industry code.
    pub industry_code: Option<String>,
    /// Establishment date.
    pub established_date: Option<NaiveDate>,
    /// Fiscal-year closing month.
    pub closing_month: Option<String>,
}

impl DartClient {
    /// Fetch the profile for one corporate identifier.
    pub async fn company(&self, corp_code: &str) -> Result<CompanyProfile> {
        let response: CompanyResponse = self
            .get_json("company.json", &[("corp_code", corp_code)])
            .await?;

        if response.status != STATUS_OK {
            return Err(DataError::Api {
                status: response.status,
                message: response.message,
            });
        }

        Ok(CompanyProfile {
            corp_code: response.corp_code,
            corp_name: response.corp_name,
            corp_name_eng: response.corp_name_eng,
            stock_name: response.stock_name,
            stock_code: response.stock_code,
            ceo_name: response.ceo_nm,
            corp_class: response.corp_cls,
            registration_number: response.jurir_no,
            business_number: response.bizr_no,
            address: response.adres,
            homepage: response.hm_url,
            ir_homepage: response.ir_url,
            phone_number: response.phn_no,
            fax_number: response.fax_no,
            industry_code: response.induty_code,
            established_date: response
                .est_dt
                .as_deref()
                .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y%m%d").ok()),
            closing_month: response.acc_mt,
        })
    }
}

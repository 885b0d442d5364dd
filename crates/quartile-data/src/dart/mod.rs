//! OpenDART API client and endpoint bindings.

pub mod client;
pub mod company;
pub mod financials;

pub use client::DartClient;
pub use company::CompanyProfile;
pub use financials::FilingRow;

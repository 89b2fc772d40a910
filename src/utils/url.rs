// src/utils/url.rs

//! URL builders for the roster service.

use url::Url;

use crate::error::{AppError, Result};
use crate::models::ViewKey;

/// Endpoint set for one facility on one roster host.
///
/// Yes, "captcha" and "Captcha": both spellings appear in the vendor's traffic.
#[derive(Debug, Clone)]
pub struct RosterEndpoints {
    base: Url,
    facility: String,
}

impl RosterEndpoints {
    pub fn new(base_url: &str, facility: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(AppError::config(format!("{base_url} cannot be a base URL")));
        }
        Ok(Self {
            base,
            facility: facility.to_string(),
        })
    }

    pub fn facility(&self) -> &str {
        &self.facility
    }

    fn build(&self, segments: &[&str]) -> Result<String> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::config(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url.to_string())
    }

    /// Public roster page; the captcha service reads it from the Referer.
    pub fn jail_page(&self) -> Result<String> {
        self.build(&["jtclientweb", "jailtracker", "index", self.facility.as_str()])
    }

    pub fn challenge(&self) -> Result<String> {
        self.build(&["jtclientweb", "captcha", "getnewcaptchaclient"])
    }

    pub fn validate(&self) -> Result<String> {
        self.build(&["jtclientweb", "Captcha", "validatecaptcha"])
    }

    /// Session-initiating roster call.
    pub fn roster(&self) -> Result<String> {
        self.build(&["jtclientweb", "Offender", self.facility.as_str()])
    }

    pub fn inmate(&self, arrest_no: &str, view_key: &ViewKey) -> Result<String> {
        let view_key = view_key.to_string();
        self.build(&[
            "jtclientweb",
            "Offender",
            self.facility.as_str(),
            arrest_no,
            "offenderbucket",
            view_key.as_str(),
        ])
    }
}

//! Wire types for the roster service.
//!
//! Field names follow the vendor's JSON, typos included
//! (`captchaRequred`). Every endpoint answers HTTP 200 on business
//! failure, so outcomes live in these bodies.

use serde::{Deserialize, Serialize};

use crate::models::{Case, Charge, Hold, InmateStub, SpecialField, ViewKey};

/// `GET jtclientweb/captcha/getnewcaptchaclient`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptchaChallenge {
    #[serde(rename = "captchaKey")]
    pub key: String,
    /// `data:image/gif;base64,...`
    #[serde(rename = "captchaImage")]
    pub inline_image: String,
}

/// `POST jtclientweb/Captcha/validatecaptcha`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptchaValidation {
    #[serde(rename = "captchaMatched", default)]
    pub matched: bool,
    /// May differ from the challenge key even on success.
    #[serde(rename = "captchaKey", default)]
    pub key: Option<String>,
}

/// Body shared by the validate, session-init and detail calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaPayload<'a> {
    pub captcha_key: &'a str,
    pub captcha_image: Option<&'a str>,
    pub user_code: &'a str,
}

impl<'a> CaptchaPayload<'a> {
    /// Submit a solver answer for a challenge.
    pub fn answer(challenge_key: &'a str, user_code: &'a str) -> Self {
        Self {
            captcha_key: challenge_key,
            captcha_image: None,
            user_code,
        }
    }

    /// Authenticate a data call with a validated key.
    pub fn authenticated(session_key: &'a str) -> Self {
        Self {
            captcha_key: session_key,
            captcha_image: None,
            user_code: "",
        }
    }
}

/// `POST jtclientweb/Offender/{slug}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    #[serde(rename = "captchaRequred", alias = "captchaRequired", default)]
    pub captcha_required: bool,
    #[serde(rename = "captchaKey", default)]
    pub key: Option<String>,
    #[serde(rename = "offenders", default)]
    pub stubs: Option<Vec<InmateStub>>,
    #[serde(rename = "offenderViewKey", default)]
    pub view_key: Option<ViewKey>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// `POST jtclientweb/Offender/{slug}/{arrestNo}/offenderbucket/{viewKey}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InmateResponse {
    #[serde(rename = "captchaRequred", alias = "captchaRequired", default)]
    pub captcha_required: bool,
    #[serde(rename = "captchaKey", default)]
    pub key: Option<String>,
    #[serde(rename = "offenderViewKey", default)]
    pub view_key: Option<ViewKey>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub cases: Option<Vec<Case>>,
    #[serde(default)]
    pub charges: Option<Vec<Charge>>,
    #[serde(default)]
    pub holds: Option<Vec<Hold>>,
    #[serde(rename = "offenderSpecialFields", default)]
    pub special_fields: Option<Vec<SpecialField>>,
}

/// Responses from authenticated calls that may demand a new captcha.
pub trait CaptchaGated {
    fn captcha_required(&self) -> bool;

    /// Cursor for the next call.
    fn view_key(&self) -> Option<&ViewKey>;

    /// Session key rotated by the server, if any.
    fn rotated_key(&self) -> Option<&str>;
}

impl CaptchaGated for RosterResponse {
    fn captcha_required(&self) -> bool {
        self.captcha_required
    }

    fn view_key(&self) -> Option<&ViewKey> {
        self.view_key.as_ref()
    }

    fn rotated_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

impl CaptchaGated for InmateResponse {
    fn captcha_required(&self) -> bool {
        self.captcha_required
    }

    fn view_key(&self) -> Option<&ViewKey> {
        self.view_key.as_ref()
    }

    fn rotated_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_decodes_vendor_fields() {
        let json = r#"{"captchaKey":"KEY","captchaImage":"data:image/gif;base64,AAAA","userCode":null}"#;
        let challenge: CaptchaChallenge = serde_json::from_str(json).unwrap();
        assert_eq!(challenge.key, "KEY");
        assert!(challenge.inline_image.starts_with("data:image/gif"));
    }

    #[test]
    fn payload_uses_vendor_names() {
        let body = serde_json::to_value(CaptchaPayload::answer("KEY", "a1B2")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"captchaKey": "KEY", "captchaImage": null, "userCode": "a1B2"})
        );
    }

    #[test]
    fn roster_response_tolerates_nulls_and_typo() {
        let json = r#"{"captchaRequred":false,"captchaKey":"NEW","offenders":[{"arrestNo":"1"}],
            "offenderViewKey":939027534,"errorMessage":null}"#;
        let response: RosterResponse = serde_json::from_str(json).unwrap();
        assert!(!response.captcha_required());
        assert_eq!(response.rotated_key(), Some("NEW"));
        assert_eq!(response.view_key(), Some(&ViewKey::Number(939027534)));
        assert_eq!(response.stubs.unwrap().len(), 1);

        let spelled: RosterResponse =
            serde_json::from_str(r#"{"captchaRequired":true,"offenders":null}"#).unwrap();
        assert!(spelled.captcha_required);
        assert!(spelled.stubs.is_none());
    }

    #[test]
    fn inmate_response_decodes_detail() {
        let json = r#"{"captchaRequred":false,"offenderViewKey":12,"captchaKey":"",
            "errorMessage":"","succes":true,
            "cases":[{"caseNo":"C1","bondAmount":500.0}],
            "charges":[{"chargeDescription":"BURGLARY","bondAmount":"0.00"}],
            "holds":null,
            "offenderSpecialFields":[{"labelText":"Booking Date","offenderValue":"6/28/2024"}]}"#;
        let response: InmateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.rotated_key(), None);
        assert_eq!(response.cases.as_ref().unwrap()[0].bond_amount, Some(500.0));
        assert_eq!(
            response.charges.as_ref().unwrap()[0].bond_amount.as_deref(),
            Some("0.00")
        );
        assert!(response.holds.is_none());
        assert_eq!(response.special_fields.unwrap()[0].label, "Booking Date");
    }
}

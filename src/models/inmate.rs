//! Inmate data structures.

use serde::{Deserialize, Serialize};

use crate::models::protocol::InmateResponse;

/// Identity-only record from the roster call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InmateStub {
    pub arrest_no: String,

    /// e.g. "6/28/2024T10:22:44"
    #[serde(default)]
    pub original_book_date_time: Option<String>,

    #[serde(default)]
    pub final_release_date_time: Option<String>,

    #[serde(default)]
    pub agency_name: Option<String>,

    #[serde(default)]
    pub jacket: Option<String>,
}

/// A court case attached to an inmate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Case {
    pub case_no: Option<String>,
    pub status: Option<String>,
    pub bond_type: Option<String>,
    pub bond_amount: Option<f64>,
    pub fine_amount: Option<f64>,
    /// "0y 0m 0d"
    pub sentence: Option<String>,
    /// "Jul 10 2024 9:00AM"
    pub court_time: Option<String>,
}

/// A single charge. Most fields are frequently null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Charge {
    pub case: Option<String>,
    pub case_no: Option<String>,
    pub crime_type: Option<String>,
    pub control_number: Option<String>,
    pub warrant_number: Option<String>,
    pub arrest_code: Option<String>,
    pub charge_description: Option<String>,
    pub bond_type: Option<String>,
    /// Sent as a string, e.g. "0.00"
    pub bond_amount: Option<String>,
    pub court_type: Option<String>,
    pub court_time: Option<String>,
    pub court_name: Option<String>,
    pub charge_status: Option<String>,
    pub offense_date: Option<String>,
    pub arrest_date: Option<String>,
    pub arresting_agency: Option<String>,
}

/// Holds have no observed schema yet.
pub type Hold = serde_json::Map<String, serde_json::Value>;

/// One row of the label/value side table in a detail response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialField {
    #[serde(rename = "labelText", default)]
    pub label: String,
    #[serde(rename = "offenderValue", default)]
    pub value: Option<String>,
}

/// Side-table labels that are projected onto named fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialLabel {
    SchedRelease,
    BookingDate,
    DateReleased,
    ArrestDate,
    ArrestingAgency,
    ArrestingOfficer,
}

/// Label text as sent by the server. Anything not listed is ignored.
const LABELS: &[(&str, SpecialLabel)] = &[
    ("Sched Release", SpecialLabel::SchedRelease),
    ("Booking Date", SpecialLabel::BookingDate),
    ("Date Released", SpecialLabel::DateReleased),
    ("Arrest Date", SpecialLabel::ArrestDate),
    ("Arresting Agency", SpecialLabel::ArrestingAgency),
    ("Arresting Officer", SpecialLabel::ArrestingOfficer),
];

impl SpecialLabel {
    /// Resolve a server label; `None` for labels we do not track.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        LABELS
            .iter()
            .find(|(text, _)| *text == label)
            .map(|(_, known)| *known)
    }
}

/// Named projection of the side table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialFields {
    pub sched_release: Option<String>,
    /// "6/28/2024 10:22:44 AM"; differs from the stub's booking time format
    pub booking_date: Option<String>,
    pub date_released: Option<String>,
    pub arrest_date: Option<String>,
    pub arresting_agency: Option<String>,
    pub arresting_officer: Option<String>,
}

impl SpecialFields {
    fn slot_mut(&mut self, label: SpecialLabel) -> &mut Option<String> {
        match label {
            SpecialLabel::SchedRelease => &mut self.sched_release,
            SpecialLabel::BookingDate => &mut self.booking_date,
            SpecialLabel::DateReleased => &mut self.date_released,
            SpecialLabel::ArrestDate => &mut self.arrest_date,
            SpecialLabel::ArrestingAgency => &mut self.arresting_agency,
            SpecialLabel::ArrestingOfficer => &mut self.arresting_officer,
        }
    }

    /// Build the projection from raw side-table rows.
    pub fn project(fields: &[SpecialField]) -> Self {
        let mut projected = Self::default();
        for field in fields {
            match SpecialLabel::from_label(&field.label) {
                Some(label) => *projected.slot_mut(label) = field.value.clone(),
                None => log::trace!("Ignoring special field {:?}", field.label),
            }
        }
        projected
    }
}

/// Roster stub plus per-inmate detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InmateRecord {
    #[serde(flatten)]
    pub stub: InmateStub,
    #[serde(default)]
    pub cases: Vec<Case>,
    #[serde(default)]
    pub charges: Vec<Charge>,
    #[serde(default)]
    pub holds: Vec<Hold>,
    #[serde(default)]
    pub special: SpecialFields,
    /// False until a detail call succeeded; distinguishes "no charges" from "never fetched".
    #[serde(default)]
    pub enriched: bool,
}

impl From<InmateStub> for InmateRecord {
    fn from(stub: InmateStub) -> Self {
        Self {
            stub,
            ..Self::default()
        }
    }
}

impl InmateRecord {
    pub fn arrest_no(&self) -> &str {
        &self.stub.arrest_no
    }

    /// Replace all detail with the contents of a detail response.
    pub fn apply_detail(&mut self, detail: &InmateResponse) {
        self.cases = detail.cases.clone().unwrap_or_default();
        self.charges = detail.charges.clone().unwrap_or_default();
        self.holds = detail.holds.clone().unwrap_or_default();
        self.special = SpecialFields::project(detail.special_fields.as_deref().unwrap_or_default());
        self.enriched = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(label: &str, value: &str) -> SpecialField {
        SpecialField {
            label: label.to_string(),
            value: Some(value.to_string()),
        }
    }

    #[test]
    fn projection_maps_known_labels() {
        let special = SpecialFields::project(&[
            field("Booking Date", "6/28/2024 10:22:44 AM"),
            field("Arrest Date", "6/28/2024"),
            field("Arresting Agency", "Circuit Court"),
            field(" Arresting Officer ", "SOME NAME"),
        ]);
        assert_eq!(special.booking_date.as_deref(), Some("6/28/2024 10:22:44 AM"));
        assert_eq!(special.arrest_date.as_deref(), Some("6/28/2024"));
        assert_eq!(special.arresting_agency.as_deref(), Some("Circuit Court"));
        assert_eq!(special.arresting_officer.as_deref(), Some("SOME NAME"));
        assert!(special.sched_release.is_none());
    }

    #[test]
    fn projection_drops_unknown_labels() {
        let special = SpecialFields::project(&[field("Eye Color", "BRO")]);
        assert_eq!(special, SpecialFields::default());
    }

    #[test]
    fn every_table_label_resolves() {
        for (text, label) in LABELS {
            assert_eq!(SpecialLabel::from_label(text), Some(*label));
        }
        assert_eq!(SpecialLabel::from_label("Shoe Size"), None);
    }

    #[test]
    fn apply_detail_overwrites() {
        let mut record = InmateRecord::from(InmateStub {
            arrest_no: "49949".into(),
            ..InmateStub::default()
        });
        let detail = InmateResponse {
            charges: Some(vec![Charge {
                charge_description: Some("BURGLARY".into()),
                ..Charge::default()
            }]),
            special_fields: Some(vec![field("Booking Date", "6/28/2024")]),
            ..InmateResponse::default()
        };

        record.apply_detail(&detail);
        let first = record.clone();
        record.apply_detail(&detail);

        assert_eq!(record, first);
        assert_eq!(record.charges.len(), 1);
        assert!(record.enriched);
    }

    #[test]
    fn stub_decodes_from_roster_json() {
        let json = r#"{"arrestNo":"49949","originalBookDateTime":"6/28/2024T10:22:44",
            "finalReleaseDateTime":null,"agencyName":"HCSO","jacket":"123","cases":null}"#;
        let stub: InmateStub = serde_json::from_str(json).unwrap();
        assert_eq!(stub.arrest_no, "49949");
        assert_eq!(stub.agency_name.as_deref(), Some("HCSO"));
        assert!(stub.final_release_date_time.is_none());
    }
}

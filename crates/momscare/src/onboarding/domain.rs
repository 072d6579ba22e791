use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned by the document store when an application is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub String);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a credential document held by object storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentRef(pub String);

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The two professional roles accepted for onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicantKind {
    Doctor,
    Nurse,
}

impl ApplicantKind {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicantKind::Doctor => "doctor",
            ApplicantKind::Nurse => "nurse",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            ApplicantKind::Doctor => "Doctor",
            ApplicantKind::Nurse => "Nurse",
        }
    }
}

/// Review state of an applicant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// Working hours for a single weekday, `HH:MM` on a 24-hour clock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

/// Doctor availability: either around the clock or a set of weekdays with optional hours.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Availability {
    pub days: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ranges: Option<BTreeMap<String, TimeRange>>,
    #[serde(rename = "is247")]
    pub is_247: bool,
}

/// Doctor onboarding form as posted by the UI. Absent keys decode as empty values so the
/// intake guard can report them per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorSubmission {
    pub name: String,
    pub contact_number: String,
    pub email: String,
    pub medical_qualification: String,
    pub specialization: String,
    pub service_areas: Vec<String>,
    pub license_no: String,
    pub document_id: DocumentRef,
    pub experience: Option<f64>,
    pub clinical_experience: String,
    pub availability: Availability,
}

/// Nurse onboarding form as posted by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NurseSubmission {
    pub name: String,
    pub contact_number: String,
    pub email: String,
    pub gender: String,
    pub nursing_qualification: String,
    pub nursing_category: String,
    pub service_areas: Vec<String>,
    pub license_no: String,
    pub document_id: DocumentRef,
    pub specific_skills: String,
    pub transport_mode: String,
    pub languages_known: Vec<String>,
}

/// Validated doctor fields as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub name: String,
    pub contact_number: String,
    pub email: String,
    pub medical_qualification: String,
    pub specialization: String,
    pub service_areas: Vec<String>,
    pub license_no: String,
    pub document_id: DocumentRef,
    pub experience: u32,
    pub clinical_experience: String,
    pub availability: Availability,
}

/// Validated nurse fields as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NurseProfile {
    pub name: String,
    pub contact_number: String,
    pub email: String,
    pub gender: String,
    pub nursing_qualification: String,
    pub nursing_category: String,
    pub service_areas: Vec<String>,
    pub license_no: String,
    pub document_id: DocumentRef,
    pub specific_skills: String,
    pub transport_mode: String,
    pub languages_known: Vec<String>,
}

/// Role-specific profile; serializes as the bare field set of the underlying role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ApplicantProfile {
    Doctor(DoctorProfile),
    Nurse(NurseProfile),
}

impl ApplicantProfile {
    pub fn kind(&self) -> ApplicantKind {
        match self {
            ApplicantProfile::Doctor(_) => ApplicantKind::Doctor,
            ApplicantProfile::Nurse(_) => ApplicantKind::Nurse,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ApplicantProfile::Doctor(profile) => &profile.name,
            ApplicantProfile::Nurse(profile) => &profile.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            ApplicantProfile::Doctor(profile) => &profile.email,
            ApplicantProfile::Nurse(profile) => &profile.email,
        }
    }

    pub fn document_id(&self) -> &DocumentRef {
        match self {
            ApplicantProfile::Doctor(profile) => &profile.document_id,
            ApplicantProfile::Nurse(profile) => &profile.document_id,
        }
    }
}

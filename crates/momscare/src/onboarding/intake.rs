use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::domain::{
    Availability, DoctorProfile, DoctorSubmission, NurseProfile, NurseSubmission, TimeRange,
};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

// Indian mobile numbering: ten digits, leading 6-9.
static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("mobile pattern compiles"));

static CLOCK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("clock pattern compiles"));

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// A single user-correctable problem, keyed by the wire name of the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field-level problem found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field) {
                fields.push(error.field);
            }
        }
        fields
    }

    /// First message recorded for `field`.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// One message per field, the shape the onboarding forms render inline.
    pub fn by_field(&self) -> BTreeMap<&'static str, String> {
        let mut map = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field)
                .or_insert_with(|| error.message.clone());
        }
        map
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid application fields: {}", self.fields().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Turns raw onboarding forms into normalized profiles, or reports every offending field.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn doctor_profile(
        &self,
        submission: DoctorSubmission,
    ) -> Result<DoctorProfile, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = required(&mut errors, "name", &submission.name, "Name is required");
        let contact_number = contact_number(&mut errors, &submission.contact_number);
        let email = email(&mut errors, &submission.email);
        let medical_qualification = required(
            &mut errors,
            "medicalQualification",
            &submission.medical_qualification,
            "Medical qualification is required",
        );
        let specialization = required(
            &mut errors,
            "specialization",
            &submission.specialization,
            "Specialization is required",
        );
        let service_areas = selection(
            &mut errors,
            "serviceAreas",
            submission.service_areas,
            "Please select at least one service area",
        );
        let license_no = required(
            &mut errors,
            "licenseNo",
            &submission.license_no,
            "License number is required",
        );
        let document_id = required(
            &mut errors,
            "documentId",
            &submission.document_id.0,
            "Please upload your official document",
        );
        let experience = experience(&mut errors, submission.experience);
        let clinical_experience = required(
            &mut errors,
            "clinicalExperience",
            &submission.clinical_experience,
            "Clinical experience is required",
        );
        let availability = availability(&mut errors, submission.availability);

        errors.finish(DoctorProfile {
            name,
            contact_number,
            email,
            medical_qualification,
            specialization,
            service_areas,
            license_no,
            document_id: document_id.into(),
            experience,
            clinical_experience,
            availability,
        })
    }

    pub fn nurse_profile(
        &self,
        submission: NurseSubmission,
    ) -> Result<NurseProfile, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = required(&mut errors, "name", &submission.name, "Name is required");
        let contact_number = contact_number(&mut errors, &submission.contact_number);
        let email = email(&mut errors, &submission.email);
        let gender = required(
            &mut errors,
            "gender",
            &submission.gender,
            "Gender is required",
        );
        let nursing_qualification = required(
            &mut errors,
            "nursingQualification",
            &submission.nursing_qualification,
            "Nursing qualification is required",
        );
        let nursing_category = required(
            &mut errors,
            "nursingCategory",
            &submission.nursing_category,
            "Nursing category is required",
        );
        let service_areas = selection(
            &mut errors,
            "serviceAreas",
            submission.service_areas,
            "Please select at least one service area",
        );
        let license_no = required(
            &mut errors,
            "licenseNo",
            &submission.license_no,
            "License number is required",
        );
        let document_id = required(
            &mut errors,
            "documentId",
            &submission.document_id.0,
            "Please upload your official document",
        );
        let specific_skills = required(
            &mut errors,
            "specificSkills",
            &submission.specific_skills,
            "Specific skills are required",
        );
        let transport_mode = required(
            &mut errors,
            "transportMode",
            &submission.transport_mode,
            "Transport mode is required",
        );
        let languages_known = selection(
            &mut errors,
            "languagesKnown",
            submission.languages_known,
            "Please select at least one language",
        );

        errors.finish(NurseProfile {
            name,
            contact_number,
            email,
            gender,
            nursing_qualification,
            nursing_category,
            service_areas,
            license_no,
            document_id: document_id.into(),
            specific_skills,
            transport_mode,
            languages_known,
        })
    }
}

fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    message: &str,
) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.push(field, message);
    }
    value.to_string()
}

fn contact_number(errors: &mut ValidationErrors, raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        errors.push("contactNumber", "Contact number is required");
        return String::new();
    }

    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    if !MOBILE_PATTERN.is_match(&digits) {
        errors.push(
            "contactNumber",
            "Please enter a valid 10-digit Indian mobile number",
        );
    }
    value.to_string()
}

/// Emails are stored trimmed and lowercased so uniqueness is case-insensitive.
fn email(errors: &mut ValidationErrors, raw: &str) -> String {
    let value = raw.trim().to_lowercase();
    if value.is_empty() {
        errors.push("email", "Email is required");
    } else if !EMAIL_PATTERN.is_match(&value) {
        errors.push("email", "Please enter a valid email address");
    }
    value
}

fn selection(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Vec<String>,
    message: &str,
) -> Vec<String> {
    let mut values: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        let entry = entry.trim();
        if !entry.is_empty() && !values.iter().any(|existing| existing == entry) {
            values.push(entry.to_string());
        }
    }
    if values.is_empty() {
        errors.push(field, message);
    }
    values
}

fn experience(errors: &mut ValidationErrors, raw: Option<f64>) -> u32 {
    match raw {
        None => {
            errors.push("experience", "Experience is required");
            0
        }
        Some(years)
            if years.is_finite()
                && years >= 0.0
                && years.fract() == 0.0
                && years <= f64::from(u32::MAX) =>
        {
            years as u32
        }
        Some(_) => {
            errors.push("experience", "Please enter a valid number of years");
            0
        }
    }
}

/// When `is247` is set the weekday schedule is ignored entirely.
fn availability(errors: &mut ValidationErrors, raw: Availability) -> Availability {
    if raw.is_247 {
        return Availability {
            days: Vec::new(),
            time_ranges: None,
            is_247: true,
        };
    }

    let mut days: Vec<String> = Vec::new();
    for day in &raw.days {
        let normalized = day.trim().to_ascii_lowercase();
        if !WEEKDAYS.contains(&normalized.as_str()) {
            errors.push(
                "availability",
                format!("'{}' is not a day of the week", day.trim()),
            );
            continue;
        }
        if !days.contains(&normalized) {
            days.push(normalized);
        }
    }

    if days.is_empty() && !errors.has("availability") {
        errors.push("availability", "Please select your availability");
    }

    let mut time_ranges = BTreeMap::new();
    for (day, range) in raw.time_ranges.unwrap_or_default() {
        let day = day.trim().to_ascii_lowercase();
        if !days.contains(&day) {
            continue;
        }

        // Half-filled rows come from the form before both pickers are set.
        let start = range.start.trim().to_string();
        let end = range.end.trim().to_string();
        if start.is_empty() || end.is_empty() {
            continue;
        }

        if !CLOCK_PATTERN.is_match(&start) || !CLOCK_PATTERN.is_match(&end) {
            errors.push(
                "availability",
                format!("Hours for {day} must use HH:MM (24-hour) times"),
            );
        } else if start == end {
            errors.push(
                "availability",
                format!("Hours for {day} must not start and end at the same time"),
            );
        }
        // An end earlier than the start is an overnight shift.
        time_ranges.insert(day, TimeRange { start, end });
    }

    Availability {
        days,
        time_ranges: if time_ranges.is_empty() {
            None
        } else {
            Some(time_ranges)
        },
        is_247: false,
    }
}

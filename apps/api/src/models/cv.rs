use serde::{Deserialize, Serialize};

use crate::models::date_value::DateValue;

/// Canonical tailored CV. Every list defaults to empty; every date-bearing field keeps
/// the display string alongside an optional normalized value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredCv {
    #[serde(default)]
    pub personal: PersonalInfo,
    #[serde(default)]
    pub professional_summary: String,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub skills: Skills,
    #[serde(default)]
    pub licenses_certifications: Vec<LicenseCertification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub description: String,
    pub achievements: Vec<String>,
    pub start_date_value: Option<DateValue>,
    pub end_date_value: Option<DateValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: String,
    pub gpa: String,
    pub start_date_value: Option<DateValue>,
    pub end_date_value: Option<DateValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub description: String,
    #[serde(rename = "tech_stack")]
    pub tech_stack: Vec<String>,
    pub link: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub start_date_value: Option<DateValue>,
    pub end_date_value: Option<DateValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LicenseCertification {
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub expiry: Option<String>,
    pub date_value: Option<DateValue>,
    pub expiry_value: Option<DateValue>,
}

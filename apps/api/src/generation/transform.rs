//! Data Transformation Layer: validates an `UntrustedCv` into a `StructuredCv`.
//!
//! Missing or null fields take their defaults. Scalars are coerced to strings. Only a
//! value of the wrong shape (an object where a list is expected, a list of non-objects
//! for a record section, a nested value where a string is expected) is a hard failure.
//! Every date-bearing field keeps its display string; the normalized value is `None`
//! when the display string cannot be parsed.

use chrono::{Datelike, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::extractor::UntrustedCv;
use crate::models::cv::{
    Education, Experience, LicenseCertification, PersonalInfo, Project, Skills, StructuredCv,
};
use crate::models::date_value::{parse_date_with_year, DateValue};

type Object = Map<String, Value>;

/// Converts raw model output into a `StructuredCv`, resolving "Present" against the
/// current year.
pub fn to_cv(raw: &UntrustedCv) -> Result<StructuredCv, AppError> {
    to_cv_at(raw, Utc::now().year())
}

pub fn to_cv_at(raw: &UntrustedCv, current_year: i32) -> Result<StructuredCv, AppError> {
    let root = match raw.as_value() {
        Value::Object(map) => map,
        Value::Null => return Ok(StructuredCv::default()),
        other => {
            return Err(AppError::Transformation(format!(
                "expected a JSON object at the top level, got {}",
                kind(other)
            )))
        }
    };
    let reader = Reader { current_year };

    let personal = match reader.object(root, "personal", "personal")? {
        Some(p) => PersonalInfo {
            name: reader.string(p, "name", "personal")?,
            email: reader.string(p, "email", "personal")?,
            phone: reader.string(p, "phone", "personal")?,
            location: reader.string(p, "location", "personal")?,
            website: reader.string(p, "website", "personal")?,
            linkedin: reader.string(p, "linkedin", "personal")?,
            github: reader.string(p, "github", "personal")?,
        },
        None => PersonalInfo::default(),
    };

    let experience = reader
        .records(root, "experience")?
        .into_iter()
        .enumerate()
        .map(|(i, e)| -> Result<Experience, AppError> {
            let path = format!("experience[{i}]");
            let start_date = reader.string(e, "startDate", &path)?;
            let end_date = reader.string(e, "endDate", &path)?;
            Ok(Experience {
                company: reader.string(e, "company", &path)?,
                role: reader.string(e, "role", &path)?,
                location: reader.string(e, "location", &path)?,
                description: reader.string(e, "description", &path)?,
                achievements: reader.string_list(e, "achievements", &path)?,
                start_date_value: reader.date(&start_date, &path),
                end_date_value: reader.date(&end_date, &path),
                start_date,
                end_date,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let education = reader
        .records(root, "education")?
        .into_iter()
        .enumerate()
        .map(|(i, e)| -> Result<Education, AppError> {
            let path = format!("education[{i}]");
            let start_date = reader.string(e, "startDate", &path)?;
            let end_date = reader.string(e, "endDate", &path)?;
            Ok(Education {
                institution: reader.string(e, "institution", &path)?,
                degree: reader.string(e, "degree", &path)?,
                field: reader.string(e, "field", &path)?,
                gpa: reader.string(e, "gpa", &path)?,
                start_date_value: reader.date(&start_date, &path),
                end_date_value: reader.date(&end_date, &path),
                start_date,
                end_date,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let projects = reader
        .records(root, "projects")?
        .into_iter()
        .enumerate()
        .map(|(i, p)| -> Result<Project, AppError> {
            let path = format!("projects[{i}]");
            let start_date = reader.optional_string(p, "startDate", &path)?;
            let end_date = reader.optional_string(p, "endDate", &path)?;
            Ok(Project {
                name: reader.string(p, "name", &path)?,
                description: reader.string(p, "description", &path)?,
                tech_stack: reader.string_list(p, "tech_stack", &path)?,
                link: reader.string(p, "link", &path)?,
                start_date_value: start_date.as_deref().and_then(|d| reader.date(d, &path)),
                end_date_value: end_date.as_deref().and_then(|d| reader.date(d, &path)),
                start_date,
                end_date,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let skills = match reader.object(root, "skills", "skills")? {
        Some(s) => Skills {
            technical: reader.string_list(s, "technical", "skills")?,
            soft: reader.string_list(s, "soft", "skills")?,
            languages: reader.string_list(s, "languages", "skills")?,
        },
        None => Skills::default(),
    };

    let licenses_certifications = reader
        .records(root, "licenses_certifications")?
        .into_iter()
        .enumerate()
        .map(|(i, c)| -> Result<LicenseCertification, AppError> {
            let path = format!("licenses_certifications[{i}]");
            let date = reader.string(c, "date", &path)?;
            let expiry = reader.optional_string(c, "expiry", &path)?;
            Ok(LicenseCertification {
                name: reader.string(c, "name", &path)?,
                issuer: reader.string(c, "issuer", &path)?,
                date_value: reader.date(&date, &path),
                expiry_value: expiry.as_deref().and_then(|d| reader.date(d, &path)),
                date,
                expiry,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let cv = StructuredCv {
        personal,
        professional_summary: reader.string(root, "professional_summary", "")?,
        experience,
        education,
        projects,
        skills,
        licenses_certifications,
    };

    info!(
        "CV transformed: experience={}, education={}, projects={}, certifications={}",
        cv.experience.len(),
        cv.education.len(),
        cv.projects.len(),
        cv.licenses_certifications.len()
    );
    Ok(cv)
}

/// Serializes a CV back into its JSON object form.
pub fn to_dict(cv: &StructuredCv) -> Result<Object, AppError> {
    match serde_json::to_value(cv).map_err(anyhow::Error::from)? {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::Internal(anyhow::anyhow!(
            "StructuredCv did not serialize to a JSON object"
        ))),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field readers
// ────────────────────────────────────────────────────────────────────────────

struct Reader {
    current_year: i32,
}

impl Reader {
    fn object<'a>(
        &self,
        parent: &'a Object,
        key: &str,
        path: &str,
    ) -> Result<Option<&'a Object>, AppError> {
        match parent.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(shape_error(path, "an object", other)),
        }
    }

    /// A list section whose items must all be objects.
    fn records<'a>(&self, parent: &'a Object, key: &str) -> Result<Vec<&'a Object>, AppError> {
        match parent.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    Value::Object(map) => Ok(map),
                    other => Err(shape_error(&format!("{key}[{i}]"), "an object", other)),
                })
                .collect(),
            Some(other) => Err(shape_error(key, "a list of objects", other)),
        }
    }

    fn string(&self, parent: &Object, key: &str, path: &str) -> Result<String, AppError> {
        Ok(self.optional_string(parent, key, path)?.unwrap_or_default())
    }

    /// Blank strings read as absent.
    fn optional_string(
        &self,
        parent: &Object,
        key: &str,
        path: &str,
    ) -> Result<Option<String>, AppError> {
        let value = match parent.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(v) => v,
        };
        let text = scalar_text(value)
            .ok_or_else(|| shape_error(&join_path(path, key), "a string", value))?;
        let trimmed = text.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    /// A list of strings. A lone scalar becomes a one-item list; null items are dropped.
    fn string_list(&self, parent: &Object, key: &str, path: &str) -> Result<Vec<String>, AppError> {
        let field = join_path(path, key);
        match parent.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .filter(|v| !v.is_null())
                .enumerate()
                .map(|(i, v)| {
                    scalar_text(v).ok_or_else(|| shape_error(&format!("{field}[{i}]"), "a string", v))
                })
                .filter(|r| !matches!(r, Ok(s) if s.trim().is_empty()))
                .collect(),
            Some(other) => match scalar_text(other) {
                Some(s) if s.trim().is_empty() => Ok(Vec::new()),
                Some(s) => Ok(vec![s]),
                None => Err(shape_error(&field, "a list of strings", other)),
            },
        }
    }

    fn date(&self, raw: &str, path: &str) -> Option<DateValue> {
        if raw.trim().is_empty() {
            return None;
        }
        let parsed = parse_date_with_year(raw, self.current_year);
        if parsed.is_none() {
            warn!("Could not normalize date '{raw}' in {path}; keeping display string only");
        }
        parsed
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn shape_error(field: &str, expected: &str, found: &Value) -> AppError {
    AppError::Transformation(format!("'{field}' must be {expected}, got {}", kind(found)))
}

//! HTML template registry and CV → HTML rendering.
//!
//! Templates are `<id>.html` files in `TEMPLATES_DIR`. The CV dictionary is the template
//! context, so `personal.name`, `experience`, `skills.technical` etc. are top-level names.

use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, Value};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::cv::StructuredCv;
use crate::models::date_value::{DateValue, MONTH_ABBREVIATIONS};

const TEMPLATE_EXTENSION: &str = "html";

#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    dir: PathBuf,
}

impl TemplateRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sorted template ids. A missing directory means no templates.
    pub async fn list(&self) -> Result<Vec<String>, AppError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(AppError::Render(format!(
                    "Cannot read template directory {}: {e}",
                    self.dir.display()
                )))
            }
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::Render(format!("Cannot read template directory: {e}")))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_safe_template_id(stem) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Template source for `id`. Unknown or unsafe ids are NotFound.
    pub async fn load(&self, id: &str) -> Result<String, AppError> {
        if !is_safe_template_id(id) {
            return Err(AppError::NotFound(format!("Template '{id}' not found")));
        }
        let path = self.dir.join(format!("{id}.{TEMPLATE_EXTENSION}"));
        match tokio::fs::read_to_string(&path).await {
            Ok(source) => {
                debug!("Loaded template {} ({} bytes)", path.display(), source.len());
                Ok(source)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("Template '{id}' not found")))
            }
            Err(e) => Err(AppError::Render(format!(
                "Cannot read template '{id}': {e}"
            ))),
        }
    }
}

/// Ids are plain file stems: ASCII alphanumerics, `-` and `_`.
pub fn is_safe_template_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Renders `source` with the CV as context. HTML auto-escaping is always on.
pub fn render_html(source: &str, cv: &StructuredCv) -> Result<String, AppError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.add_filter("month_name", month_name);
    env.add_filter("format_date", format_date);

    let html = env
        .template_from_str(source)
        .and_then(|template| template.render(cv))
        .map_err(|e| AppError::Render(format!("Template rendering failed: {e}")))?;

    info!(
        "Rendered CV HTML: {} bytes, experience={}, education={}",
        html.len(),
        cv.experience.len(),
        cv.education.len()
    );
    Ok(html)
}

// ────────────────────────────────────────────────────────────────────────────
// Filters
// ────────────────────────────────────────────────────────────────────────────

/// `3` → `Mar`. Empty for falsy input; anything out of range is echoed back.
fn month_name(value: Value) -> String {
    if !value.is_true() {
        return String::new();
    }
    let month = value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()));
    match month {
        Some(m) if (1..=12).contains(&m) => MONTH_ABBREVIATIONS[(m - 1) as usize].to_string(),
        _ => value.to_string(),
    }
}

/// `{year, month?, day?, isPresent?}` → display string. Empty for none/undefined or an
/// object that is not a valid date.
fn format_date(value: Value) -> String {
    date_from_value(&value)
        .map(|date| date.format())
        .unwrap_or_default()
}

fn date_from_value(value: &Value) -> Option<DateValue> {
    if value.is_undefined() || value.is_none() {
        return None;
    }
    let field = |name: &str| value.get_attr(name).ok().and_then(|v| v.as_i64());

    let year = i32::try_from(field("year")?).ok()?;
    let is_present = value
        .get_attr("isPresent")
        .map(|v| v.is_true())
        .unwrap_or(false);
    if is_present {
        return Some(DateValue::present(year));
    }

    let month = field("month").and_then(|m| u32::try_from(m).ok());
    let day = field("day").and_then(|d| u32::try_from(d).ok());
    match (month, day) {
        (None, _) => Some(DateValue::year_only(year)),
        (Some(m), None) => DateValue::month_year(year, m),
        (Some(m), Some(d)) => DateValue::full(year, m, d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cv::{Experience, PersonalInfo};

    fn sample_cv() -> StructuredCv {
        StructuredCv {
            personal: PersonalInfo {
                name: "Ada <Lovelace>".to_string(),
                ..Default::default()
            },
            experience: vec![Experience {
                company: "Analytical Engines".to_string(),
                start_date: "Mar 2021".to_string(),
                start_date_value: DateValue::month_year(2021, 3),
                end_date_value: Some(DateValue::present(2026)),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_is_sorted_and_html_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["modern.html", "classic.html", "notes.txt", "bad id.html"] {
            std::fs::write(dir.path().join(name), "<p></p>").unwrap();
        }
        let registry = TemplateRegistry::new(dir.path());
        assert_eq!(registry.list().await.unwrap(), vec!["classic", "modern"]);
    }

    #[tokio::test]
    async fn test_missing_directory_lists_nothing() {
        let registry = TemplateRegistry::new("/definitely/not/a/template/dir");
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_and_unsafe_ids_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("classic.html"), "<p></p>").unwrap();
        let registry = TemplateRegistry::new(dir.path());

        assert!(registry.load("classic").await.is_ok());
        for id in ["missing", "../classic", "", "classic.html"] {
            let err = registry.load(id).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)), "id {id:?}");
        }
    }

    #[test]
    fn test_render_uses_cv_fields_and_filters() {
        let source = "<h1>{{ personal.name }}</h1>\
            {% for job in experience %}<p>{{ job.company }}: \
            {{ job.startDateValue.month | month_name }} {{ job.startDateValue.year }} - \
            {{ job.endDateValue | format_date }}</p>{% endfor %}";
        let html = render_html(source, &sample_cv()).unwrap();
        assert!(html.contains("<h1>Ada &lt;Lovelace&gt;</h1>"));
        assert!(html.contains("Analytical Engines: Mar 2021 - Present"));
    }

    #[test]
    fn test_month_name_edge_cases() {
        assert_eq!(month_name(Value::from(12)), "Dec");
        assert_eq!(month_name(Value::from("1")), "Jan");
        assert_eq!(month_name(Value::from(0)), "");
        assert_eq!(month_name(Value::from(13)), "13");
        assert_eq!(month_name(Value::from(())), "");
    }

    #[test]
    fn test_format_date_handles_missing_and_partial_values() {
        let source = "[{{ missing | format_date }}][{{ personal.name | format_date }}]";
        assert_eq!(render_html(source, &sample_cv()).unwrap(), "[][]");

        let value = Value::from_serialize(DateValue::full(2023, 3, 15).unwrap());
        assert_eq!(format_date(value), "15 Mar 2023");
    }

    #[test]
    fn test_syntax_error_is_render_error() {
        let err = render_html("{% for %}", &StructuredCv::default()).unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }
}

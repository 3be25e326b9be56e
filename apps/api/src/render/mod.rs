// PDF rendering: template lookup, HTML rendering with minijinja, then an external
// HTML → PDF converter.

pub mod handlers;
pub mod pdf;
pub mod templates;

use tracing::info;

use crate::errors::AppError;
use crate::intake::validation::sanitize_filename;
use crate::models::cv::StructuredCv;

use self::pdf::PdfConverter;
use self::templates::{render_html, TemplateRegistry};

#[derive(Debug, Clone)]
pub struct Renderer {
    templates: TemplateRegistry,
    converter: PdfConverter,
}

impl Renderer {
    pub fn new(templates: TemplateRegistry, converter: PdfConverter) -> Self {
        Self {
            templates,
            converter,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub async fn render_pdf(&self, template_id: &str, cv: &StructuredCv) -> Result<Vec<u8>, AppError> {
        info!(
            "PDF generation: template={template_id}, experience={}, education={}",
            cv.experience.len(),
            cv.education.len()
        );
        let source = self.templates.load(template_id).await?;
        let html = render_html(&source, cv)?;
        self.converter.convert(&html).await
    }
}

/// `Ada Lovelace` → `cv_Ada_Lovelace.pdf`, reduced to a header-safe name.
pub fn download_filename(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    sanitize_filename(&format!("cv_{stem}.pdf"))
}

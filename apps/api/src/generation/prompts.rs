// LLM prompt constants for CV extraction and section rephrasing.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for structured CV extraction.
pub const EXTRACTION_SYSTEM: &str =
    "You are an expert at extracting structured data from CVs and tailoring them to a \
    target job. You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Extraction prompt template. Replace `{job_description}`, `{retrieved_context}`,
/// `{cv_text}` and `{date_rules}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract structured data from the CV below and tailor it to the job description.
The most job-relevant passages of the CV are listed first; use them to decide what to emphasise,
but take facts only from the CV itself. Never invent employers, dates, degrees or skills.

Job Description:
{job_description}

Most relevant CV passages:
{retrieved_context}

Full CV Text:
{cv_text}

Return a JSON object with EXACTLY these top-level keys:
{
  "personal": {
    "name": "Full name",
    "email": "email@example.com",
    "phone": "phone number",
    "location": "city, country",
    "website": "website URL or empty string",
    "linkedin": "LinkedIn URL or empty string",
    "github": "GitHub URL or empty string"
  },
  "professional_summary": "Brief professional summary tailored to the job",
  "experience": [
    {
      "role": "Job title",
      "company": "Company name",
      "startDate": "Start date (e.g. 'Jan 2023', '2023')",
      "endDate": "End date (e.g. 'Dec 2023', 'Present', 'Current')",
      "location": "Job location",
      "description": "Role description",
      "achievements": ["achievement 1", "achievement 2"]
    }
  ],
  "education": [
    {
      "degree": "Degree name",
      "institution": "Institution name",
      "field": "Field of study",
      "startDate": "Start date (e.g. 'Sep 2020', '2020')",
      "endDate": "End date (e.g. 'May 2023', '2023', 'Present')",
      "gpa": "GPA if mentioned or empty string"
    }
  ],
  "projects": [
    {
      "name": "Project name",
      "description": "Project description",
      "tech_stack": ["technology1", "technology2"],
      "link": "Project URL or empty string",
      "startDate": "Start date if available or null",
      "endDate": "End date if available or null"
    }
  ],
  "skills": {
    "technical": ["skill1", "skill2"],
    "soft": ["skill1", "skill2"],
    "languages": ["language1", "language2"]
  },
  "licenses_certifications": [
    {
      "name": "Certification name",
      "issuer": "Issuing organization",
      "date": "Issue date (e.g. 'Jan 2023', '2023')",
      "expiry": "Expiry date if applicable or null"
    }
  ]
}

{date_rules}

Return only the JSON object."#;

/// Shown in place of retrieved passages when the index returned nothing.
pub const NO_CONTEXT_PLACEHOLDER: &str = "(no passages retrieved)";

pub const REPHRASE_GENERIC_SYSTEM: &str = "You are a professional CV writer. \
    Rephrase this CV section to better align with the target job requirements.";

/// Writer instruction per section type. Unknown types use `REPHRASE_GENERIC_SYSTEM`.
pub const REPHRASE_SECTION_SYSTEMS: [(&str, &str); 6] = [
    (
        "professional_summary",
        "You are a professional CV writer. Rephrase this professional summary to better \
        align with the target job requirements while maintaining authenticity.",
    ),
    (
        "experience",
        "You are a professional CV writer. Rephrase this work experience description to \
        better highlight relevant skills and achievements for the target job.",
    ),
    (
        "project",
        "You are a professional CV writer. Rephrase this project description to better \
        showcase relevant technical skills and impact for the target job.",
    ),
    (
        "education",
        "You are a professional CV writer. Rephrase this education section to better \
        emphasize relevant coursework, achievements, or projects for the target job.",
    ),
    (
        "skills",
        "You are a professional CV writer. Rephrase and reorganize these skills to better \
        match the target job requirements and highlight the most relevant ones first.",
    ),
    (
        "certification",
        "You are a professional CV writer. Rephrase this certification description to \
        better emphasize its relevance to the target job.",
    ),
];

/// Rephrase prompt template. Replace `{job_description}`, `{section_title}` and
/// `{section_content}` before sending.
pub const REPHRASE_PROMPT_TEMPLATE: &str = r#"Job Description:
{job_description}

Current {section_title} Content:
{section_content}

Instructions:
1. Rephrase the content to better match the job requirements
2. Use action verbs and quantifiable achievements where the original supports them
3. Highlight relevant technical skills and technologies mentioned in the job description
4. Maintain professional tone and authenticity; do not invent facts
5. Keep the same length or slightly shorter
6. Focus on impact and results rather than just responsibilities
7. Use keywords from the job description naturally

Return only the rephrased content, no additional text or explanations."#;

// Caller-input intake: text validation/sanitisation and document text extraction.

pub mod extract;
pub mod validation;

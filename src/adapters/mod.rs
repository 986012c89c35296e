// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod dataset;
pub mod docx;
pub mod soffice;

pub use docx::DocxTemplateEngine;
pub use soffice::SofficeConverter;

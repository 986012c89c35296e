pub mod archive;
pub mod context;
pub mod conversion;
pub mod engine;
pub mod pipeline;
pub mod progress;
pub mod renderer;
pub mod tracker;

pub use crate::domain::model::{BatchInput, BatchResult, Record};
pub use crate::domain::ports::{
    ConfigProvider, Converter, Pipeline, ProgressSink, Storage, TemplateEngine,
};
pub use crate::utils::error::Result;

//! patent-annotate - LLM review and annotation of patent documents.
//!
//! Documents are parsed to text, reviewed by a chat model (or the offline
//! keyword reviewer), and the findings are anchored back onto the text as
//! highlighted HTML annotations.

pub mod annotation;
pub mod config;
pub mod llm;
pub mod parser;
pub mod services;
pub mod utils;

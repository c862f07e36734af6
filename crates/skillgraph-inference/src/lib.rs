//! # Skillgraph Inference
//!
//! Knowledge inference via a local Ollama model: given a skill, propose
//! related skills and parent categories as strict JSON.

pub mod ollama;
pub mod relations;

pub use ollama::OllamaClient;
pub use relations::{parse_relations, relation_prompt, OllamaInference};

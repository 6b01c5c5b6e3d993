pub mod fallback;
mod gemini;
pub mod parse;
pub mod prompts;
mod recommender;

pub use gemini::{AiError, GeminiClient, TextGenerator};
pub use recommender::Recommender;

// Résumé analysis: file encoding, the fixed extraction prompt, and the AI analyzer.
// All Gemini calls go through llm_client.

pub mod analyzer;
pub mod encoder;
pub mod prompts;

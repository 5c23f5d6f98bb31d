//! LLM-backed reference search.
//!
//! HTTP agents for Gemini, Claude and OpenAI produce raw text; the reference
//! provider and verifier turn that text into candidates through the recovery
//! parser in `citeflow-core`.

pub mod agent;
pub mod claude_api_agent;
pub mod factory;
pub mod gemini_api_agent;
pub mod openai_api_agent;
pub mod prompt;
pub mod reference_agent;

pub use agent::{AgentRequest, TextAgent, UnconfiguredAgent};
pub use claude_api_agent::ClaudeApiAgent;
pub use factory::{build_agent, build_reference_backends};
pub use gemini_api_agent::GeminiApiAgent;
pub use openai_api_agent::OpenAIApiAgent;
pub use reference_agent::{LlmReferenceProvider, LlmReferenceVerifier};

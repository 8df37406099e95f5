//! Cardsmith — turns free-form bug reports into structured Notion cards.
//!
//! Reports arrive over HTTP or a Telegram webhook, pass an LLM admissibility
//! check, get synthesized into a structured draft, and land in a Notion
//! database — with uploaded screenshots stored and embedded along the way.

pub mod cards;
pub mod channels;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod notion;
pub mod pipeline;
pub mod storage;

//! Retrieval-augmented question answering over a fixed knowledge base.
//!
//! One document is extracted, chunked, and embedded at startup; the result
//! is held immutable in an [`engine::Engine`] and queried for the lifetime
//! of the process:
//!
//! ```text
//! document ──extract──▶ text ──chunk──▶ chunks ──embed──▶ vector index
//!
//! query ──embed──▶ vector ──search──▶ top-k chunks ──prompt──▶ chat model
//! ```
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`config`] | TOML configuration and validation |
//! | [`extract`] | PDF / DOCX / plain-text extraction |
//! | [`chunk`] | Sentence-aware character windowing |
//! | [`embedding`] | Embedding providers (OpenAI, Ollama) |
//! | [`index`] | Flat inner-product vector index |
//! | [`prompt`] | Prompt assembly |
//! | [`completion`] | Chat completion client |
//! | [`engine`] | Startup pipeline and query answering |
//! | [`server`] | HTTP chat API |
//! | [`ask`], [`search`], [`chunks_cmd`] | CLI commands |

pub mod ask;
pub mod chunk;
pub mod chunks_cmd;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod extract;
pub mod index;
pub mod prompt;
pub mod search;
pub mod server;

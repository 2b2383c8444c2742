//! Pair-bond text codec & storage engine.
//!
//! Ingests plain-text documents, converts them into a canonical stream
//! of Token IDs drawn from a shared, hierarchically addressed
//! vocabulary, disassembles the stream into a Pair-Bond Map (PBM), and
//! persists both vocabulary and PBM such that the original word
//! sequence is recoverable byte-for-byte modulo whitespace placement.
//!
//! # Architecture
//!
//! ```text
//! text -> structure -> scan -> resolve -> pbm::disassemble -> storage::write
//! doc_id -> storage::read -> pbm::reassemble -> spacing -> text
//! ```
//!
//! The [`engine`] module is the crate's one external surface: a tagged
//! `Request` enum plus direct typed methods on [`engine::Engine`], both
//! funneling through the same internal logic.

pub mod byte_table;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod markers;
pub mod pbm;
pub mod resolve;
pub mod scan;
pub mod spacing;
pub mod storage;
pub mod structure;
pub mod token_id;
pub mod validate;
pub mod vocab;

pub use engine::{Engine, Request};
pub use error::{EngineError, Result};
pub use token_id::TokenId;

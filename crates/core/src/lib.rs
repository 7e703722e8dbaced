//! Core library for the Lunch Money MCP tools
//!
//! This crate is the **Functional Core** of the application, following the
//! Functional Core - Imperative Shell pattern:
//!
//! - **`lunchmoney_core`** (this crate): response shaping, transaction
//!   windowing and request descriptions
//! - **`lunchmoney`**: HTTP calls, the MCP server and the CLI (the Imperative Shell)
//!
//! Everything here is deterministic and testable with fixture data. The one
//! exception is [`response::OutputFormatter`], which writes file-mode
//! responses under a root directory supplied by the caller, the same way
//! persisted state is always handed an explicit directory.
//!
//! # Module Organization
//!
//! - [`response`]: output format/mode selection and file spill-over
//! - [`toon`]: the Token-Oriented Object Notation encoder
//! - [`transactions`]: local pagination, `plaid_metadata` stripping and search
//! - [`request`]: upstream endpoints, query strings and sparse bodies
//! - [`upstream`]: failure messages and list extraction
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use lunchmoney_core::transactions::{window, Transaction};
//!
//! let transactions: Vec<Transaction> = serde_json::from_value(fixture)?;
//! let page = window(transactions, 0, 1000).with_plaid_metadata(false);
//!
//! assert_eq!(page.total_count, 1500);
//! assert!(page.has_more);
//! ```

pub mod request;
pub mod response;
pub mod toon;
pub mod transactions;
pub mod upstream;

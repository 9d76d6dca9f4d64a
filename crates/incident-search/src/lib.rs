//! # Incident Search
//!
//! Simulated multi-source search for production error triage. A user
//! describes an error; the pipeline expands it into search terms, searches
//! four mock sources one after another, ranks the results and presents
//! them. Searches can be saved to a capped history and exported as a
//! report.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌────────────────────┐   ┌───────────┐
//! │   Form   │──▶│  Validate  │──▶│      Pipeline      │──▶│ Presenter │
//! │ CLI/shell│   │ (core)     │   │ expand ▸ search ×4 │   │ tty/json  │
//! └──────────┘   └────────────┘   │ ▸ aggregate        │   └───────────┘
//!                                 └─────────┬──────────┘
//!                                           ▼
//!                                 ┌────────────────────┐   ┌───────────┐
//!                                 │      Session       │──▶│  SQLite   │
//!                                 │ current + history  │   │  kv table │
//!                                 └─────────┬──────────┘   └───────────┘
//!                                           ▼
//!                                   PDF / text report
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! isearch init
//! isearch search --sample 1 --fast --save --export
//! isearch history
//! isearch shell
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite key-value store |
//! | [`pipeline`] | Search orchestrator state machine |
//! | [`progress`] | Presenters for pipeline events |
//! | [`render`] | Plain-text result and history formatting |
//! | [`session`] | Current search, history, save/export/clear |
//! | [`export`] | PDF and text report rendering |
//! | [`shell`] | Interactive command loop |
//! | [`sources`] | Source listing |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! Pure logic (models, corpus, expansion, simulation, ranking, history,
//! report layout) lives in the `incident-search-core` crate.

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod migrate;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod session;
pub mod shell;
pub mod sources;
pub mod sqlite_store;

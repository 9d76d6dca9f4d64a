//! # Incident Search Core
//!
//! Runtime-free logic for Incident Search: data models, the mock corpus,
//! rule-based query expansion, per-source search simulation, ranking,
//! the workflow diagram model, saved-search history, and report layout.
//!
//! This crate contains no tokio, sqlx, or filesystem I/O. Asynchronous
//! capabilities (delays, key-value storage) are traits implemented by the
//! `incident-search` application crate.

pub mod aggregate;
pub mod corpus;
pub mod delay;
pub mod error;
pub mod expand;
pub mod form;
pub mod graph;
pub mod history;
pub mod models;
pub mod report;
pub mod simulate;
pub mod store;

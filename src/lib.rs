//! # redress
//!
//! Complaint triage and analytics core.
//!
//! Ingests raw complaint records, classifies urgency from free-text content
//! via an external classifier, filters by viewer scope, aggregates into
//! multi-dimensional analytics views, and maintains a read/unread/dismissed
//! notification ledger with time-bounded undo.

pub mod analytics;
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod ledger;
pub mod model;
pub mod source;
pub mod storage;
pub mod telemetry;
pub mod triage;

//! TranscriptChain - A tamper-evident, append-only ledger of academic transcripts
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the chain, Merkle summarization and validation
//! - [`transcript`] - Course and transcript records
//! - [`staging`] - Courses waiting for the next block
//! - [`ledger`] - Chain plus staging area as one owned unit
//!
//! ## Cryptography
//! - [`crypto`] - SHA-256 digests
//!
//! ## Integration
//! - [`api`] - REST API (feature `api`)
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`logging`] - Tracing subscriber setup

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod ledger;
pub mod staging;
pub mod transcript;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Integration
// ============================================================================
#[cfg(feature = "api")]
pub mod api;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
pub mod logging;

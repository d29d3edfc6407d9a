//! shelfscan - scan-and-import pipeline for a personal e-book library.
//!
//! A background scanner discovers e-book files under a trusted directory,
//! fingerprints them by metadata-derived hash, tracks them through a
//! persisted status lifecycle, and imports the surviving candidates into
//! an external catalog engine.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod metadata;
pub mod models;
pub mod repository;
pub mod scanner;
pub mod schema;

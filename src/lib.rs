//! Standalone-executable module patcher library.
//!
//! This library provides the core components for `bunpatch`.
//! It is organized into several modules:
//! - `config`: CLI configuration.
//! - `error`: typed error taxonomy.
//! - `executable`: overlay boundary discovery and output validation.
//! - `overlay`: trailer/offsets/data-region layout decoding.
//! - `modules`: module table reading and target location.
//! - `replace`: in-place content replacement.
//! - `writer`: atomic patched-file emission.
//! - `patcher`: high-level extract/replace orchestration.

pub mod config;
pub mod error;
pub mod executable;
pub mod modules;
pub mod overlay;
pub mod patcher;
pub mod replace;
pub mod writer;

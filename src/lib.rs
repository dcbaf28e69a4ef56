//! Compare a committed package.json version against an npm registry.
//!
//! The crate resolves its configuration (package name, scope, registry URL,
//! auth token, target version expression, committed version, operator) from a
//! mix of explicit inputs and the local manifest through a lazy, memoized
//! fact graph, performs one registry lookup, selects a published version
//! (dist-tag first, semver range second) and evaluates
//! `selected <operator> committed` as a tri-state result.

pub mod auth;
pub mod check;
pub mod config;
pub mod error;
pub mod facts;
pub mod manifest;
pub mod output;
pub mod registry;
pub mod version;

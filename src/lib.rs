//! `configspan` maps configuration paths back to the line and column they
//! were written at.
//!
//! Configuration loaders report failures against logical paths such as
//! `servers[1].port`. This crate indexes the original source text so those
//! failures can point at the offending line with a caret underline.

/// Path model, dialect walkers, and diagnostic rendering.
pub mod locate;

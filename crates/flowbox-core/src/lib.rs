//! Flowbox Core Types
//!
//! This crate provides the foundational types shared by the Flowbox editor
//! and its hosts:
//!
//! - **Geometry**: points, sizes, bounds, insets and alignment ([`geometry`])
//! - **Colors**: CSS color parsing for the visual style ([`color::Color`])
//! - **Model**: the typed node tree the editor manipulates ([`model`])
//! - **Text**: the label measurement service ([`text`])

pub mod color;
pub mod geometry;
pub mod model;
pub mod text;

// Outward-facing data shapes.

pub mod dto;

pub use dto::{AstGraphDto, EdgeDto, NodeDto, NodeFamily};

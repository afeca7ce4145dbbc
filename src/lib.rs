// ThunderBird tree library: node model, scopes, program root, traversal
// contract and the canonical printer.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

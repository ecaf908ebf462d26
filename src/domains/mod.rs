//! Business logic organized by bounded contexts.

pub mod tools;

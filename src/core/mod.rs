// src/core/mod.rs

pub mod blueprint;
pub mod expander;
pub mod parameters;
pub mod resolver;

//! Stateless query and transfer services over a slice of entries.

pub mod services;

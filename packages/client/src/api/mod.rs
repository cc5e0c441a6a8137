//! One-line wrappers over platform endpoints.

pub mod challenges;
pub mod submissions;
pub mod users;

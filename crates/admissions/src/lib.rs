//! School admissions workflow: accounts, students, applications, documents, interviews and
//! staff, with the HTTP router that exposes them.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

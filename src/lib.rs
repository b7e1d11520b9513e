//! Server-rendered portfolio for an energy-infrastructure contractor.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;

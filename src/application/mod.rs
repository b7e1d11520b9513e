//! Application services sitting between the HTTP layer and the domain.

pub mod chrome;
pub mod error;
pub mod live;
pub mod portfolio;
pub mod query;
pub mod source;

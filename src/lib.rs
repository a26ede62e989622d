pub mod config;
pub mod corpus;
pub mod errors;
pub mod extraction;
pub mod pipeline;
pub mod resolution;
pub mod text;
pub mod types;

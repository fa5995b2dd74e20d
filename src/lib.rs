pub mod alert;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod instrument;
pub mod pipeline;
pub mod portfolio;
pub mod provider;
pub mod quote;
pub mod report;
pub mod scheduler;
pub mod utils;

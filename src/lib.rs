pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod date;
pub mod error;
pub mod observation;
pub mod output;
pub mod parser;
pub mod session;
pub mod stats;

pub mod config;
pub mod data;
pub mod neem;
pub mod query;
pub mod serve;

pub mod config;
pub mod enrich;
pub mod geocode;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod write;

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod discover;
pub mod matcher;
pub mod path_matcher;
pub mod paths;
pub mod pipeline;
pub mod render;
pub mod telemetry;
pub mod yaml;

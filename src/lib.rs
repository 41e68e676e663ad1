pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod track;

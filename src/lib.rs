pub mod config;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod sink;
pub mod snapshot;

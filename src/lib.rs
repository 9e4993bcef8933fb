pub mod config;
pub mod error;
pub mod event;
pub mod feeds;
pub mod fetch;
pub mod filter;
pub mod geojson;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod sink;
pub mod stats;
pub mod symbology;

#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! Shared vocabulary for the docsearch workspace: domain types, the error
//! taxonomy, capability traits for models and storage, configuration, page
//! extraction and chunking.

pub mod chunker;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod store;
pub mod traits;
pub mod types;

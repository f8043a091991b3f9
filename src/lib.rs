pub mod algorithms;
pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod instance;
pub mod pipeline;
pub mod reference;
pub mod render;
pub mod results;
pub mod significance;
pub mod solver;
pub mod stats;
pub mod workbook;
// cmd and reports are modules of the binary crate (main.rs).

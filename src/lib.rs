// Library exports for plotcsv

pub mod cli;
pub mod config;
pub mod csv_reader;
pub mod data;
pub mod error;
pub mod graph;
pub mod output;
pub mod runtime;
pub mod select;
pub mod style;
pub mod transform;

// Chart compilation
pub mod compiler;
pub mod ir;

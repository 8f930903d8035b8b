pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod fetch;
pub mod parser;
pub mod services;
pub mod storage;
pub mod ui;

#[cfg(test)]
mod testing;

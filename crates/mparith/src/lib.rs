//! mparith library: command-line front end for the arithmetic engine.

pub mod app;
pub mod config;
pub mod errors;

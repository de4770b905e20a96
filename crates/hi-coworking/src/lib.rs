pub mod catalog;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod gateway;

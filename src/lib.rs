//! grad-portal - graduate admissions search and entry pages.
//!
//! This library exposes the core modules for use in integration tests.

pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod handler;
pub mod logging;
pub mod pages;
pub mod render;
pub mod server;

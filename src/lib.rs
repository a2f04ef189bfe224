//! epubreader: reader shell for an EPUB rendering library.
//!
//! This library crate exposes all modules for use by the binaries and integration tests.

pub mod app;
pub mod book;
pub mod controllers;
pub mod database;
pub mod events;
pub mod managers;
pub mod platform;
pub mod reader;
pub mod rpc_handler;
pub mod services;
pub mod types;
pub mod url;
pub mod view;

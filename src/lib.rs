//! Library exports for the soulseer client, shared between the binary and tests.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod notifications;
pub mod pages;
pub mod payments;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;

//! Google Sheets API access: service-account auth and a typed REST client.

pub mod auth;
pub mod client;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::{SheetsClient, Worksheet};

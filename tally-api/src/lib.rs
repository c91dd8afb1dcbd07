//! tally-api: REST client for the tracker backend and the write-through record store

pub mod client;
pub mod store;

pub use client::{ApiClient, AuthResponse, RecordApi};
pub use store::{RecordStore, SubmitOutcome};

#![doc = "docsync-core: core logic library for docsync."]

//! This crate contains the synchronisation pipeline, its data model and the
//! interfaces to the record source and the document store. Concrete remote
//! store clients and configuration file parsing live in the `docsync` crate.
//!
//! # Usage
//! Build a [`config::SyncConfig`], pick a [`contract::RecordSource`] and a
//! [`contract::DocumentStore`], then call [`synchronise::synchronise`].

pub mod annotate;
pub mod committer;
pub mod config;
pub mod contract;
pub mod error;
pub mod planner;
pub mod progress;
pub mod record;
pub mod source;
pub mod state;
pub mod store;
pub mod synchronise;

pub use error::{Result, StoreError, SyncError};

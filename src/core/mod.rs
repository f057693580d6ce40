//! Core modules: account model, validation rules, form state, and the
//! SQLite-backed account store with its plumbing.

pub mod account;
pub mod accounts;
pub mod broker;
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod logging;
pub mod schemas;
pub mod store;
pub mod validate;
pub mod worker;

//! Cardhold - Payment Identity & Card Lifecycle Service
//!
//! This crate orchestrates the lifecycle of payment identities and tokenized
//! cards across two independently-failable systems: the external payment
//! processor and the durable profile store.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

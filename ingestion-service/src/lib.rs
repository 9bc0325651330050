//! Ingestion Service - validates and stores invoices and credit notes.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

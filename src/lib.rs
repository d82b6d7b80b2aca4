//! Quote Digest — mails project managers a summary of their open quotes.

pub mod config;
pub mod error;
pub mod mail;
pub mod pipeline;
pub mod schedule;
pub mod service;

//! Directory, lead capture, and CMS backend for prefabricated home manufacturers.

pub mod accounts;
pub mod blog;
pub mod builders;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod leads;
pub mod slug;
pub mod storage;
pub mod telemetry;
pub mod uploads;
pub mod validation;

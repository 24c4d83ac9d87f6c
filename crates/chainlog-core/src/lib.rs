//! # chainlog-core
//!
//! The storage boundary for chainlog.
//!
//! This crate provides the `AuditStorage` trait that every persistence
//! backend implements, with forwarding impls for `&T`, `Box<T>` and
//! `Arc<T>` so one backend can be shared between several holders.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chainlog_core::traits::AuditStorage;
//! ```

pub mod traits;

pub use traits::AuditStorage;

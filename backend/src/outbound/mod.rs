//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL repositories built on Diesel.
//! - **memory**: a single-process registry behind one mutex, used when no
//!   database is configured.
//! - **sessions**: server-side admin session store.
//! - **codes**: random registration and booking code generation.
//!
//! Adapters translate between domain types and storage representations; the
//! allocation and transition rules themselves live in the domain.

pub mod codes;
pub mod memory;
pub mod persistence;
pub mod sessions;

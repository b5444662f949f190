//! Persistence layer.
//!
//! A thin libsql client over an embedded SQLite database (file-backed or
//! in-memory) holding the three related tables: `users`, `stores`, and
//! `ratings`. Rating averages are never stored; they are computed in SQL on
//! every read.

#![allow(missing_docs)]

pub mod client;

pub use client::{DbClient, RatingDetail, StoreAggregate, UserFilters, UserSort, UserSortKey};

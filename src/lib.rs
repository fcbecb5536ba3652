//! Purpose: Typed client library for the Benchling entity-management REST API.
//! Exports: `api` (public surface), `core` (transport, codec, registry, capabilities),
//! `resources` (concrete resource types).
//! Role: Maps remote records onto `Model<T>` instances bound to a `Session`.
//! Invariants: Every network call goes through one session's `Http`; nothing is retried.
//! Invariants: Local field names are snake_case; wire names are lowerCamelCase.
pub mod api;
pub mod core;
pub mod resources;

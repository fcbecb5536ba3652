// Core modules implementing transport, field mapping, the resource registry and capabilities.
pub mod backend;
pub mod capability;
pub mod codec;
pub mod config;
pub mod dynamic;
pub mod error;
pub mod http;
pub mod inflect;
pub mod model;
pub mod registry;
pub mod session;

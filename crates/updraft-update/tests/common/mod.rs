//! Common test infrastructure for updraft-update tests
//!
//! # Usage
//!
//! In your test file, add:
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: Versions, repository coordinates, asset names
//! - `builders`: Release feed JSON, test configuration and app layouts
//! - `mock_server`: Wiremock setup helpers for feed and artifact endpoints
//! - `archive`: Zip fixtures, including deliberately corrupted ones
//! - `recorders`: Event sink and system hooks that record what they see

// Not every test binary uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod archive;
pub mod builders;
pub mod constants;
pub mod mock_server;
pub mod recorders;

pub use archive::*;
pub use builders::*;
pub use constants::*;
pub use mock_server::*;
pub use recorders::*;

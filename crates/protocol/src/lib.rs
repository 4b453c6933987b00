//! Shared wire types for the Eden console
//!
//! Defines the response envelope every backend call returns, the pagination
//! shapes, and the resource payloads of the consumed REST endpoints.

pub mod envelope;
pub mod identity;
pub mod infrastructure;
pub mod kubernetes;
pub mod paging;
pub mod tools;

pub use envelope::*;
pub use identity::*;
pub use infrastructure::*;
pub use kubernetes::*;
pub use paging::*;
pub use tools::*;

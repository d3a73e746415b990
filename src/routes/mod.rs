//! Routers: resource CRUD, documentation, and operational endpoints.

pub mod common;
pub mod docs;
pub mod resource;

pub use common::common_routes;
pub use docs::docs_routes;
pub use resource::{api_routes, resource_prefix, resource_routes};

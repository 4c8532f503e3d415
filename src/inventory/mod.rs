pub mod models;
pub mod compatibility;
pub mod ledger;
pub mod allocation_validator;
pub mod coordinator;
pub mod service;
pub mod handlers;

pub use models::*;
pub use compatibility::*;
pub use allocation_validator::*;
pub use coordinator::*;
pub use service::*;
pub use handlers::*;

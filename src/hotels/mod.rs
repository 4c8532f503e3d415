pub mod models;
pub mod repository;
pub mod service;
pub mod handlers;

pub use models::*;
pub use repository::*;
pub use service::*;
pub use handlers::*;

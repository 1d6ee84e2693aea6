//! Resource services shared by the HTTP handlers and the store-backed data provider.

mod crud;
pub mod enrich;
pub mod export;
mod validation;
pub use crud::CrudService;
pub use validation::RequestValidator;

pub mod openapi;
pub mod profile;

pub use openapi::ApiDoc;

pub mod api;
pub mod envelope;

pub use api::ApiClient;

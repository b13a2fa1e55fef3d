pub mod content_services;
pub mod service;

pub use service::LeaClientService;

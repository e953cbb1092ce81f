pub mod client;
pub mod encode;
pub mod factory;
pub mod provider;
pub mod wire;

pub use client::HttpAnnotationClient;
pub use factory::create_client;
pub use provider::AnnotationService;
pub use wire::{classify_response, ProcessImageResponse};

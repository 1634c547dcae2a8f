pub mod extract_handlers;
pub mod relay_handlers;
pub mod service_handler;

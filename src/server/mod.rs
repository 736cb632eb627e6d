pub mod app;
mod deserializers;
pub mod error_handlers;
mod pagination;
mod routes;

pub mod dto;
pub mod error;
pub mod handlers;
mod server;
pub mod state;

#[cfg(test)]
mod tests;

pub use server::{router, start_server};

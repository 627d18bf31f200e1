pub mod client;
pub mod definitions;
pub mod handlers;
pub mod logic;
pub mod model;

pub use client::RemoteOracle;
pub use model::LocalModel;

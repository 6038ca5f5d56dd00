//! Backend gateway for Hosur Recipes
//!
//! The hosted backend owns every durable record: videos, likes, comments and
//! user accounts. This crate describes those records and the calls the client
//! makes against them.
//!
//! - [`DataGateway`]: fetch/insert/delete/order operations on the `videos`,
//!   `video_likes` and `video_comments` collections
//! - [`AuthGateway`]: password sign-in, sign-up and sign-out
//! - [`RestBackend`]: both traits over HTTP (PostgREST + GoTrue)
//! - [`InMemoryGateway`]: both traits in process, with failure injection
//!
//! # Example
//!
//! ```no_run
//! use recipe_gateway::{DataGateway, GatewayConfig, RestBackend, VideoId};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = RestBackend::new(GatewayConfig::from_env()?);
//!     let likes = backend.list_likes(&VideoId::new("v1")).await?;
//!     println!("{} likes", likes.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod models;
pub mod rest;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::{AuthGateway, DataGateway};
pub use memory::{InMemoryGateway, Operation};
pub use models::*;
pub use rest::RestBackend;

//! # Command Handlers
//!
//! This module contains organized command handlers for the worldctl CLI application.
//!
//! ## Structure
//!
//! - `document` - Document commands (create, get, update, delete, search)
//! - `world` - World and collection listing
//! - `errors` - User-facing error messages and hints
//! - `shared` - Shared context, argument checks and result handling

pub mod document;
pub mod errors;
pub mod shared;
pub mod world;

pub use document::handle_document_command;
pub use shared::CommandContext;
pub use world::{handle_collections_command, handle_worlds_command};

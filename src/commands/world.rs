//! # World Command Handlers
//!
//! Listing worlds under the data root and the collections a world exposes.

use crate::{
    cli_utils,
    commands::errors::exit_with_handled_error,
    commands::shared::{CommandContext, locate_world_or_exit, validate_args_count_or_exit},
};

/// Handles `worlds`: prints every world id under the data root.
pub async fn handle_worlds_command(args: &[String], context: &CommandContext) {
    validate_args_count_or_exit(args, 0, 0, "worlds", "Usage: worldctl worlds");
    let worlds = match context.locator.list_worlds().await {
        Ok(worlds) => worlds,
        Err(e) => exit_with_handled_error(&e),
    };
    if worlds.is_empty() {
        cli_utils::print_success(&format!(
            "No worlds found under {}",
            context.locator.worlds_dir().display()
        ));
    } else {
        cli_utils::print_formatted_or_exit(&worlds, context.output, "worlds");
    }
}

/// Handles `collections <world>`: prints the collections the world exposes.
pub async fn handle_collections_command(args: &[String], context: &CommandContext) {
    validate_args_count_or_exit(
        args,
        1,
        1,
        "collections",
        "Usage: worldctl collections <world>",
    );
    let world = locate_world_or_exit(context, &args[0]).await;
    let collections = context.store.list_collections(&world);
    cli_utils::print_formatted_or_exit(&collections, context.output, "collections");
}

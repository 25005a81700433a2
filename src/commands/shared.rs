//! # Shared Command Utilities
//!
//! This module provides the state, argument checks and result handling shared by the
//! worldctl command handlers.

use std::path::Path;

use serde_json::Value;

use crate::cli_utils::{self, OutputFormat};
use crate::commands::errors::exit_with_handled_error;
use crate::{
    DocumentStore, JsonlBackend, OperationResult, SchemaCatalog, SearchOptions, StoreError,
    ValidateOptions, World, WorldLocator, WriteMeta,
};

/// Everything a command handler needs, assembled once from the command line.
pub struct CommandContext {
    /// Resolves world ids under the data root.
    pub locator: WorldLocator,
    /// The document store over the on-disk collections.
    pub store: DocumentStore<JsonlBackend>,
    /// Attribution for writes.
    pub meta: WriteMeta,
    /// Format for printed results.
    pub output: OutputFormat,
    /// Filters for `document search`.
    pub search: SearchOptions,
    /// Schemas new documents are validated against, when configured.
    pub catalog: Option<SchemaCatalog>,
    /// Options for catalog validation.
    pub validate_options: ValidateOptions,
}

/// Validates both minimum and maximum argument counts.
///
/// # Arguments
/// * `args` - The command arguments array
/// * `min_count` - The minimum number of arguments required (including subcommand)
/// * `max_count` - The maximum number of arguments allowed (including subcommand)
/// * `command` - The command name for error message
/// * `usage` - The usage string to display
pub fn validate_args_count_or_exit(
    args: &[String],
    min_count: usize,
    max_count: usize,
    command: &str,
    usage: &str,
) {
    if args.len() < min_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command requires more arguments", command),
            usage,
        );
    }
    if args.len() > max_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command has too many arguments", command),
            usage,
        );
    }
}

/// Parses a JSON argument, reading it from a file when it starts with `@`.
pub fn parse_json_arg(arg: &str) -> Result<Value, String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .map_err(|e| crate::commands::errors::format_cli_error(&e))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).map_err(|e| crate::commands::errors::format_cli_error(&e))
}

/// Parses a JSON argument or exits with the parse error.
pub fn parse_json_arg_or_exit(arg: &str) -> Value {
    parse_json_arg(arg).unwrap_or_else(|message| cli_utils::exit_with_error(&message))
}

/// Resolves a world id or exits.
pub async fn locate_world_or_exit(context: &CommandContext, world_id: &str) -> World {
    match context.locator.locate(world_id).await {
        Ok(world) => world,
        Err(e) => exit_with_handled_error(&e),
    }
}

/// Unwraps a document operation, printing its warnings, or exits on any failure.
pub fn operation_or_exit<T>(result: Result<OperationResult<T>, StoreError>) -> T {
    let operation = match result {
        Ok(operation) => operation,
        Err(e) => exit_with_handled_error(&e),
    };
    let (outcome, warnings) = operation.into_parts();
    for warning in &warnings {
        cli_utils::print_warning(warning);
    }
    match outcome {
        Ok(data) => data,
        Err(e) => exit_with_handled_error(&e),
    }
}

/// Macro to generate command dispatcher boilerplate.
macro_rules! dispatch_command {
    ($command_name:expr, $usage:expr, $args:expr, $context:expr, {
        $($subcommand:expr => $handler:expr),* $(,)?
    }) => {
        if $args.is_empty() {
            crate::cli_utils::exit_with_usage_error(
                &format!("{} command requires a subcommand", $command_name),
                $usage,
            );
        }

        match $args[0].as_str() {
            $(
                $subcommand => $handler($args, $context).await,
            )*
            _ => {
                let available_subcommands = vec![$($subcommand),*];
                crate::cli_utils::exit_with_error(&format!(
                    "Unknown {} subcommand '{}'. Available subcommands: {}",
                    $command_name,
                    $args[0],
                    available_subcommands.join(", ")
                ));
            }
        }
    };
}

pub(crate) use dispatch_command;

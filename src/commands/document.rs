//! # Document Command Handler
//!
//! This module handles document CLI commands: create, get, update, delete and search
//! within one collection of one world.

use crate::{
    Document, SearchResults, cli_utils,
    commands::shared::{
        CommandContext, dispatch_command, locate_world_or_exit, operation_or_exit,
        parse_json_arg_or_exit, validate_args_count_or_exit,
    },
    validate_document,
};

const DOCUMENT_USAGE: &str =
    "Usage: worldctl document <create|get|update|delete|search> <world> <type> [args...]";

/// Handles all document-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `context` - Store, locator and output settings
pub async fn handle_document_command(args: &[String], context: &CommandContext) {
    dispatch_command!("document", DOCUMENT_USAGE, args, context, {
        "create" => handle_document_create,
        "get" => handle_document_get,
        "update" => handle_document_update,
        "delete" => handle_document_delete,
        "search" => handle_document_search,
    });
}

async fn handle_document_create(args: &[String], context: &CommandContext) {
    validate_args_count_or_exit(
        args,
        4,
        4,
        "create",
        "Usage: worldctl document create <world> <type> <json|@file>",
    );
    let world = locate_world_or_exit(context, &args[1]).await;
    let document_type = &args[2];
    let mut data = parse_json_arg_or_exit(&args[3]);

    if let Some(catalog) = &context.catalog
        && let Some(result) =
            validate_document(catalog, document_type, &data, &context.validate_options)
    {
        for warning in result.warning_messages() {
            cli_utils::print_warning(&warning);
        }
        match result.into_result() {
            Ok(normalized) => data = normalized,
            Err(errors) => {
                let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
                cli_utils::print_formatted_or_exit(&lines, context.output, "validation errors");
                cli_utils::exit_with_error("Document failed validation");
            }
        }
    }

    let document = operation_or_exit(
        context
            .store
            .create(&world, document_type, data, &context.meta)
            .await,
    );
    print_document(&document, context);
}

async fn handle_document_get(args: &[String], context: &CommandContext) {
    validate_args_count_or_exit(
        args,
        4,
        4,
        "get",
        "Usage: worldctl document get <world> <type> <id>",
    );
    let world = locate_world_or_exit(context, &args[1]).await;
    let document = operation_or_exit(context.store.get(&world, &args[2], &args[3]).await);
    print_document(&document, context);
}

async fn handle_document_update(args: &[String], context: &CommandContext) {
    validate_args_count_or_exit(
        args,
        5,
        5,
        "update",
        "Usage: worldctl document update <world> <type> <id> <json|@file>",
    );
    let world = locate_world_or_exit(context, &args[1]).await;
    let payload = parse_json_arg_or_exit(&args[4]);
    let document = operation_or_exit(
        context
            .store
            .update(&world, &args[2], &args[3], &payload, &context.meta)
            .await,
    );
    print_document(&document, context);
}

async fn handle_document_delete(args: &[String], context: &CommandContext) {
    validate_args_count_or_exit(
        args,
        4,
        4,
        "delete",
        "Usage: worldctl document delete <world> <type> <id>",
    );
    let world = locate_world_or_exit(context, &args[1]).await;
    operation_or_exit(context.store.delete(&world, &args[2], &args[3]).await);
    cli_utils::print_success(&format!("Deleted document: {}", args[3]));
}

async fn handle_document_search(args: &[String], context: &CommandContext) {
    validate_args_count_or_exit(
        args,
        3,
        3,
        "search",
        "Usage: worldctl [--name PATTERN] [--id PATTERN] [--subtype TYPE] [--limit N] document search <world> <type>",
    );
    let world = locate_world_or_exit(context, &args[1]).await;
    let results: SearchResults =
        operation_or_exit(context.store.search(&world, &args[2], &context.search).await);
    cli_utils::print_formatted_or_exit(&results, context.output, "search results");
}

fn print_document(document: &Document, context: &CommandContext) {
    cli_utils::print_formatted_or_exit(document, context.output, "document");
}

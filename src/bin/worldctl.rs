use std::path::{Path, PathBuf};

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use worldkeeper::{
    Config, DocumentStore, JsonlBackend, SchemaCatalog, SearchOptions, WorldLocator, WriteMeta,
    cli_utils,
    commands::{
        CommandContext, errors::exit_with_handled_error, handle_collections_command,
        handle_document_command, handle_worlds_command,
    },
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Configuration file (.yaml, .yml or .json)")]
    config: Option<String>,
    #[arrrg(optional, "Directory holding worlds/ (overrides the config file)")]
    data_root: Option<String>,
    #[arrrg(optional, "User recorded as lastModifiedBy on writes")]
    user: Option<String>,
    #[arrrg(optional, "Schema catalog that new documents are validated against")]
    catalog: Option<String>,
    #[arrrg(optional, "Output format: json or yaml (default: json)")]
    output: Option<String>,
    #[arrrg(optional, "Search: wildcard pattern for the document name")]
    name: Option<String>,
    #[arrrg(optional, "Search: wildcard pattern for the document id")]
    id: Option<String>,
    #[arrrg(optional, "Search: exact document subtype")]
    subtype: Option<String>,
    #[arrrg(optional, "Search: maximum number of documents returned")]
    limit: Option<usize>,
    #[arrrg(flag, "Coerce strings to booleans during catalog validation")]
    coerce: bool,
    #[arrrg(flag, "Enable debug logging")]
    verbose: bool,
}

const USAGE: &str = r#"Usage: worldctl [options] <command> [args...]

Options:
  --config <file>      Configuration file (.yaml, .yml or .json)
  --data-root <dir>    Directory holding worlds/ (default: ./data)
  --user <id>          User recorded as lastModifiedBy on writes
  --catalog <file>     Schema catalog that new documents are validated against
  --output <format>    Output format: json or yaml (default: json)
  --name <pattern>     Search: wildcard pattern for the document name
  --id <pattern>       Search: wildcard pattern for the document id
  --subtype <type>     Search: exact document subtype
  --limit <n>          Search: maximum number of documents returned
  --coerce             Coerce strings to booleans during catalog validation
  --verbose            Enable debug logging

Commands:
  worlds                                        List worlds under the data root
  collections <world>                           List the collections a world exposes
  document create <world> <type> <json|@file>   Create a document
  document get <world> <type> <id>              Get a document by id
  document update <world> <type> <id> <json>   Merge a payload into a document
  document delete <world> <type> <id>           Delete a document
  document search <world> <type>                Search a collection"#;

fn load_config(options: &Options) -> Config {
    let mut config = match &options.config {
        Some(path) => {
            Config::from_file(Path::new(path)).unwrap_or_else(|e| exit_with_handled_error(&e))
        }
        None => Config::default(),
    };
    if let Some(data_root) = &options.data_root {
        config.data_root = PathBuf::from(data_root);
    }
    if options.coerce {
        config.coerce_types = true;
    }
    config
}

#[tokio::main]
async fn main() {
    let (options, free) =
        Options::from_command_line_relaxed("USAGE: worldctl <command> [args...]");
    cli_utils::init_tracing(options.verbose);

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    let config = load_config(&options);
    let catalog = options.catalog.as_ref().map(|path| {
        SchemaCatalog::from_file(Path::new(path)).unwrap_or_else(|e| exit_with_handled_error(&e))
    });
    let search = SearchOptions {
        name: options.name.clone(),
        id: options.id.clone(),
        document_type: options.subtype.clone(),
        limit: options.limit,
    };

    let context = CommandContext {
        locator: WorldLocator::new(config.data_root.clone()),
        store: DocumentStore::new(JsonlBackend::new(), config.store_settings()),
        meta: WriteMeta {
            user_id: options.user.clone(),
        },
        output: cli_utils::output_format_or_exit(options.output.as_deref()),
        search,
        catalog,
        validate_options: config.validate_options(),
    };

    match free[0].as_str() {
        "worlds" => {
            handle_worlds_command(&free[1..], &context).await;
        }
        "collections" => {
            handle_collections_command(&free[1..], &context).await;
        }
        "document" => {
            handle_document_command(&free[1..], &context).await;
        }
        _ => {
            cli_utils::exit_with_usage_error(
                &format!(
                    "Unknown command '{}'. Available commands: worlds, collections, document",
                    free[0]
                ),
                USAGE,
            );
        }
    }
}

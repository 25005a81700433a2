use std::io::Read;
use std::path::Path;
use std::process;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use worldkeeper::{
    Config, SchemaCatalog, SchemaNode, SchemaSource, ValidateOptions, ValidationResult,
    cli_utils::{self, OutputFormat},
    commands::errors::exit_with_handled_error,
    validate, validate_text,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Schema file holding a single schema node")]
    schema: Option<String>,
    #[arrrg(optional, "Schema catalog keyed by document type and subtype")]
    catalog: Option<String>,
    #[arrrg(optional, "Document type to look up in the catalog")]
    document_type: Option<String>,
    #[arrrg(optional, "Subtype to look up in the catalog (default: the data's type field)")]
    subtype: Option<String>,
    #[arrrg(optional, "Configuration file (.yaml, .yml or .json)")]
    config: Option<String>,
    #[arrrg(optional, "Output format: json or yaml (default: json)")]
    output: Option<String>,
    #[arrrg(flag, "Coerce strings and numbers to booleans")]
    coerce: bool,
    #[arrrg(flag, "Enable debug logging")]
    verbose: bool,
}

const USAGE: &str = r#"Usage: validate-document [options] <data.json|->...

Options:
  --schema <file>          Schema file holding a single schema node
  --catalog <file>         Schema catalog keyed by document type and subtype
  --document-type <type>   Document type to look up in the catalog (with --catalog)
  --subtype <subtype>      Subtype to look up (default: the data's type field)
  --config <file>          Configuration file (.yaml, .yml or .json)
  --output <format>        Output format: json or yaml (default: json)
  --coerce                 Coerce strings and numbers to booleans
  --verbose                Enable debug logging

Exits 0 when every input is valid and 1 otherwise."#;

enum Schemas {
    Single(SchemaNode),
    Catalog {
        catalog: SchemaCatalog,
        document_type: String,
        subtype: Option<String>,
    },
}

impl Schemas {
    fn lookup(&self, data: Option<&Value>) -> Option<&SchemaNode> {
        match self {
            Schemas::Single(node) => Some(node),
            Schemas::Catalog {
                catalog,
                document_type,
                subtype,
            } => {
                let subtype = subtype
                    .as_deref()
                    .or_else(|| data.and_then(|d| d.get("type")).and_then(Value::as_str));
                catalog.schema_for(document_type, subtype)
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    source: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized_data: Option<Value>,
}

impl Report {
    fn new(source: &str, result: ValidationResult) -> Self {
        Self {
            source: source.to_string(),
            valid: result.valid,
            errors: result.error_messages(),
            warnings: result.warning_messages(),
            normalized_data: result.normalized_data,
        }
    }

    fn failed(source: &str, message: String) -> Self {
        Self {
            source: source.to_string(),
            valid: false,
            errors: vec![message],
            warnings: Vec::new(),
            normalized_data: None,
        }
    }
}

fn load_schemas(options: &Options) -> Schemas {
    match (&options.schema, &options.catalog) {
        (Some(path), None) => {
            let text = std::fs::read_to_string(path)
                .unwrap_or_else(|e| exit_with_handled_error(&e));
            let parsed = if path.ends_with(".json") {
                SchemaNode::from_json_str(&text)
            } else {
                SchemaNode::from_yaml_str(&text)
            };
            Schemas::Single(parsed.unwrap_or_else(|e| exit_with_handled_error(&e)))
        }
        (None, Some(path)) => {
            let Some(document_type) = options.document_type.clone() else {
                cli_utils::exit_with_usage_error("--catalog requires --document-type", USAGE);
            };
            let catalog = SchemaCatalog::from_file(Path::new(path))
                .unwrap_or_else(|e| exit_with_handled_error(&e));
            Schemas::Catalog {
                catalog,
                document_type,
                subtype: options.subtype.clone(),
            }
        }
        (Some(_), Some(_)) => {
            cli_utils::exit_with_usage_error("Pass either --schema or --catalog, not both", USAGE)
        }
        (None, None) => cli_utils::exit_with_usage_error("No schema specified", USAGE),
    }
}

fn read_input(source: &str) -> std::io::Result<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        std::fs::read_to_string(source)
    }
}

fn check(source: &str, schemas: &Schemas, options: &ValidateOptions) -> Report {
    let text = match read_input(source) {
        Ok(text) => text,
        Err(e) => return Report::failed(source, format!("Failed to read input: {}", e)),
    };
    let parsed = serde_json::from_str::<Value>(&text).ok();
    let Some(schema) = schemas.lookup(parsed.as_ref()) else {
        return Report::failed(source, "No schema found for this document".to_string());
    };
    let result = match &parsed {
        Some(value) => validate(value, schema, options),
        None => validate_text(&text, schema, options),
    };
    debug!(source, valid = result.valid, errors = result.errors.len(), "validated");
    Report::new(source, result)
}

fn main() {
    let (options, free) =
        Options::from_command_line("USAGE: validate-document [options] <file>...");
    cli_utils::init_tracing(options.verbose);

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No input files specified", USAGE);
    }

    let mut config = match &options.config {
        Some(path) => {
            Config::from_file(Path::new(path)).unwrap_or_else(|e| exit_with_handled_error(&e))
        }
        None => Config::default(),
    };
    if options.coerce {
        config.coerce_types = true;
    }
    let output: OutputFormat = cli_utils::output_format_or_exit(options.output.as_deref());
    let schemas = load_schemas(&options);
    let validate_options = config.validate_options();

    let reports: Vec<Report> = free
        .iter()
        .map(|source| check(source, &schemas, &validate_options))
        .collect();
    let all_valid = reports.iter().all(|r| r.valid);

    if let [report] = reports.as_slice() {
        cli_utils::print_formatted_or_exit(report, output, "validation report");
    } else {
        cli_utils::print_formatted_or_exit(&reports, output, "validation reports");
    }

    process::exit(if all_valid { 0 } else { 1 });
}

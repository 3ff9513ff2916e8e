use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use log::info;

use mprest_core::config::{self, CONFIG_FILE_NAME, MprestConfig, OptionBag, OptionValue};
use mprest_core::format::{CommandFormatter, SourceFormatter, TidyFormatter};
use mprest_core::ir::{IrReturnType, IrSchema, IrSpec};
use mprest_core::postprocess::ArtifactPostProcessor;
use mprest_core::{ClientCodegen, CodeGenerator, GeneratedFile, RestClientCodegen, parse, transform};
use mprest_java_client::MicroProfileClientGenerator;

#[derive(Parser)]
#[command(
    name = "mprest",
    about = "MicroProfile REST client generator for OpenAPI 3.x",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Java sources from an OpenAPI spec
    Generate {
        /// Path to the OpenAPI spec file (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generator option override, e.g. `--option fieldGen=lombok` (repeatable)
        #[arg(short = 'O', long = "option", value_parser = parse_key_val)]
        options: Vec<(String, String)>,
    },

    /// Validate an OpenAPI spec
    Validate {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the grouping and resolved options for an OpenAPI spec
    Inspect {
        /// Path to the OpenAPI spec file
        #[arg(short, long)]
        input: PathBuf,

        /// Generator option override (repeatable)
        #[arg(short = 'O', long = "option", value_parser = parse_key_val)]
        options: Vec<(String, String)>,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new mprest configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            options,
        } => cmd_generate(input, output, &options),

        Commands::Validate { input } => cmd_validate(input),

        Commands::Inspect {
            input,
            options,
            format,
        } => cmd_inspect(input, &options, format),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "mprest", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing option name in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Interpret a command-line value the way YAML would for the supported shapes.
fn option_value(raw: &str) -> OptionValue {
    match raw {
        "true" => OptionValue::Bool(true),
        "false" => OptionValue::Bool(false),
        _ => match raw.parse::<i64>() {
            Ok(n) => OptionValue::Int(n),
            Err(_) => OptionValue::Text(raw.to_string()),
        },
    }
}

fn option_text(value: &OptionValue) -> Vec<String> {
    match value {
        OptionValue::Bool(b) => vec![b.to_string()],
        OptionValue::Int(n) => vec![n.to_string()],
        OptionValue::Text(s) => vec![s.clone()],
        OptionValue::List(items) => items.clone(),
        OptionValue::Other(v) => vec![v.to_string()],
    }
}

/// Apply `--option` overrides on top of the project file options.
///
/// The first override of a key replaces the file value; repeating the key on the
/// command line accumulates the values into a list.
fn apply_overrides(bag: &mut OptionBag, overrides: &[(String, String)]) {
    let mut seen = HashSet::new();
    for (key, raw) in overrides {
        if !seen.insert(key.as_str()) {
            let mut items = bag.get(key).map(option_text).unwrap_or_default();
            items.push(raw.clone());
            bag.insert(key.clone(), OptionValue::List(items));
        } else {
            bag.insert(key.clone(), option_value(raw));
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<MprestConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).context("failed to load project configuration")
}

fn load_spec(path: &Path) -> Result<IrSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };

    let ir = transform::transform(&parsed)?;
    Ok(ir)
}

/// Write generated files under `base`, recording each one for the formatting sweep.
fn write_files(
    base: &Path,
    files: &[GeneratedFile],
    artifacts: &mut ArtifactPostProcessor,
) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("  wrote {}", path.display());
        artifacts.record(path);
    }
    Ok(())
}

fn formatter_for(cfg: &MprestConfig) -> Box<dyn SourceFormatter> {
    match cfg
        .formatter_command
        .as_deref()
        .and_then(CommandFormatter::from_argv)
    {
        Some(command) => {
            info!("using external formatter {command:?}");
            Box::new(command)
        }
        None => Box::new(TidyFormatter),
    }
}

fn cmd_generate(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    overrides: &[(String, String)],
) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output_dir = output.unwrap_or_else(|| PathBuf::from(&cfg.output));

    let mut raw = cfg.options.clone();
    apply_overrides(&mut raw, overrides);
    let codegen = RestClientCodegen::from_options(&raw);

    let ir = load_spec(&input)?;
    eprintln!("Generating {} → {}", input.display(), output_dir.display());
    let files = MicroProfileClientGenerator.generate(&ir, &codegen)?;

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;

    let mut artifacts = ArtifactPostProcessor::new();
    write_files(&output_dir, &files, &mut artifacts)?;

    let formatter = formatter_for(&cfg);
    let report = codegen.post_process(&artifacts, formatter.as_ref());
    if report.skipped {
        eprintln!("  formatting disabled");
    } else {
        for (path, reason) in report.failures() {
            eprintln!("  warning: left {} unformatted: {reason}", path.display());
        }
    }

    eprintln!(
        "Generated {} files in {}",
        files.len(),
        output_dir.display()
    );
    Ok(())
}

fn cmd_validate(input: PathBuf) -> Result<()> {
    let content = fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content)?,
        _ => parse::from_yaml(&content)?,
    };

    eprintln!(
        "Valid OpenAPI {} spec: {}",
        parsed.openapi, parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());

    if let Some(ref components) = parsed.components {
        eprintln!("  Schemas: {}", components.schemas.len());
    }

    let ir = transform::transform(&parsed)?;
    let groups = RestClientCodegen::default().group_operations(&ir);
    eprintln!("  Operations: {}", ir.operations.len());
    eprintln!("  Groups: {}", groups.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: PathBuf, overrides: &[(String, String)], format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let mut raw = cfg.options.clone();
    apply_overrides(&mut raw, overrides);
    let codegen = RestClientCodegen::from_options(&raw);

    let ir = load_spec(&input)?;
    let summary = build_inspect_summary(&ir, &codegen);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{yaml}");
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }

    Ok(())
}

fn build_inspect_summary(ir: &IrSpec, codegen: &RestClientCodegen) -> serde_json::Value {
    let schemas: Vec<serde_json::Value> = ir
        .schemas
        .iter()
        .map(|s| {
            serde_json::json!({
                "name": s.name().pascal_case,
                "kind": match s {
                    IrSchema::Object(_) => "object",
                    IrSchema::Enum(_) => "enum",
                    IrSchema::Alias(_) => "alias",
                },
            })
        })
        .collect();

    let groups: Vec<serde_json::Value> = codegen
        .group_operations(ir)
        .iter()
        .map(|(key, ops)| {
            let operations: Vec<serde_json::Value> = ops
                .iter()
                .map(|g| {
                    serde_json::json!({
                        "name": g.operation.name.camel_case,
                        "method": g.operation.method.as_str(),
                        "path": g.operation.path,
                        "tags": g.operation.tags,
                        "sub_path": g.path,
                        "sub_resource": g.sub_resource,
                        "bean_param": g.has_bean_param.then(|| g.bean_param_name.clone()),
                        "void": matches!(g.operation.return_type, IrReturnType::Void),
                    })
                })
                .collect();
            serde_json::json!({
                "key": key,
                "interface": codegen.resolve_name(key),
                "operations": operations,
            })
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": ir.info.title,
            "version": ir.info.version,
            "description": ir.info.description,
        },
        "options": codegen.policy().to_options(),
        "schemas": schemas,
        "groups": groups,
    })
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

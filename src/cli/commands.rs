use crate::access::AccessRule;
use crate::config::ParserConfig;
use crate::generator::{generate_typescript, GenerateOptions};
use crate::hot_reload::watch_class_path;
use crate::openapi::{json_pointer, lint_document, lint_file, print_lint_issues, LintSeverity};
use crate::parser::plugins::TransferTypesConfiguration;
use crate::parser::{ParseResult, Parser as EndpointParser};
use crate::scan::reachable_classes;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Command-line interface for endpointgen
///
/// Scans class descriptors, generates the OpenAPI document and TypeScript
/// client sources, and lints generated documents.
#[derive(Parser)]
#[command(name = "endpointgen", version)]
#[command(about = "Endpoint discovery and OpenAPI generation", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the parser configuration comes from
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Parser configuration file (YAML, JSON or TOML)
    #[arg(short, long, env = "ENDPOINTGEN_CONFIG")]
    pub config: PathBuf,

    /// Replace the configured class path (repeatable)
    #[arg(long = "class-path")]
    pub class_path: Vec<PathBuf>,
}

impl ConfigArgs {
    pub fn load(&self) -> anyhow::Result<ParserConfig> {
        let mut config = ParserConfig::load(&self.config)?;
        if !self.class_path.is_empty() {
            config.class_path = self.class_path.clone();
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the OpenAPI document (and optionally TypeScript sources)
    Generate {
        #[command(flatten)]
        config: ConfigArgs,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also render TypeScript client sources into this directory
        #[arg(long)]
        typescript: Option<PathBuf>,

        /// Module the TypeScript functions import their call client from
        #[arg(long, default_value = "./connect-client")]
        client_module: String,

        /// Lint the generated document and fail on errors
        #[arg(long, default_value_t = false)]
        lint: bool,
    },
    /// Print endpoints, their methods and the reachable entity classes
    Inspect {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Lint a generated document
    ///
    /// Checks reference resolution, request and response shapes, operation
    /// ids and component schemas.
    Lint {
        /// Path to the document (JSON or YAML)
        #[arg(short, long)]
        document: PathBuf,

        /// Exit with error code if any errors are found
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,

        /// Show only errors (hide warnings and info)
        #[arg(long, default_value_t = false)]
        errors_only: bool,
    },
    /// Regenerate the document whenever the class path changes
    Watch {
        #[command(flatten)]
        config: ConfigArgs,

        /// File the document is written to on every change
        #[arg(short, long)]
        output: PathBuf,

        /// Also re-render TypeScript sources into this directory
        #[arg(long)]
        typescript: Option<PathBuf>,
    },
}

/// Execute the CLI command provided by the user
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the parser run
/// fails, output cannot be written, or linting finds errors when asked to
/// fail on them.
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            config,
            output,
            typescript,
            client_module,
            lint,
        } => {
            let result = EndpointParser::new(config.load()?).execute()?;
            if lint {
                let issues = lint_document(&result.document)?;
                print_lint_issues(&issues);
                if crate::openapi::has_errors(&issues) {
                    anyhow::bail!("generated document has lint errors");
                }
            }
            write_outputs(&result, output.as_deref(), typescript.as_deref(), &client_module)
        }
        Commands::Inspect { config } => {
            let config = config.load()?;
            let result = EndpointParser::new(config.clone()).execute()?;
            print!("{}", inspect(&config, &result));
            Ok(())
        }
        Commands::Lint {
            document,
            fail_on_error,
            errors_only,
        } => {
            let mut issues = lint_file(&document)
                .with_context(|| format!("failed to lint {}", document.display()))?;
            if errors_only {
                issues.retain(|i| i.severity == LintSeverity::Error);
            }
            print_lint_issues(&issues);
            if fail_on_error && crate::openapi::has_errors(&issues) {
                anyhow::bail!("lint found errors in {}", document.display());
            }
            Ok(())
        }
        Commands::Watch {
            config,
            output,
            typescript,
        } => {
            let config = config.load()?;
            let initial = EndpointParser::new(config.clone()).execute()?;
            write_outputs(&initial, Some(&output), typescript.as_deref(), "./connect-client")?;

            let _watcher = watch_class_path(config, move |result| {
                if let Err(e) =
                    write_outputs(&result, Some(&output), typescript.as_deref(), "./connect-client")
                {
                    error!(error = %e, "failed to write regenerated outputs");
                }
            })?;
            info!("watching for changes, press Ctrl-C to stop");
            loop {
                std::thread::park();
            }
        }
    }
}

fn write_outputs(
    result: &ParseResult,
    output: Option<&Path>,
    typescript: Option<&Path>,
    client_module: &str,
) -> anyhow::Result<()> {
    let json = result.document.to_json_pretty()?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "document written");
        }
        None => println!("{json}"),
    }
    if let Some(dir) = typescript {
        let options = GenerateOptions {
            client_module: client_module.to_string(),
        };
        generate_typescript(&result.document, dir, &options)?;
    }
    Ok(())
}

/// Human-readable summary of a parser run.
pub fn inspect(config: &ParserConfig, result: &ParseResult) -> String {
    let mut out = String::new();
    let world = result.scan.world();

    out.push_str("Endpoints:\n");
    for endpoint in result.scan.endpoints() {
        out.push_str(&format!("  {} ({})\n", endpoint.name, endpoint.class.name()));
        let prefix = format!("/{}/", endpoint.name);
        for path in result.document.paths.keys().filter(|p| p.starts_with(&prefix)) {
            let pointer = json_pointer(["paths", path.as_str(), "post"]);
            let access = result
                .associations
                .method(&pointer)
                .map(|m| AccessRule::effective(m, world.get(m.owner()), Some(&endpoint.class)))
                .unwrap_or_default();
            out.push_str(&format!("    POST /{}{path}  {access:?}\n", config.prefix()));
        }
    }

    let mappers = TransferTypesConfiguration {
        mappings: config.transfer_types.clone(),
    }
    .class_mappers();
    out.push_str("Reachable classes:\n");
    for class in reachable_classes(&result.scan, &mappers) {
        out.push_str(&format!("  {}\n", class.name()));
    }
    out
}

//! # Generator Module
//!
//! Renders TypeScript client sources from a generated document.
//!
//! ## Generated Structure
//!
//! ```text
//! out/
//! ├── models.ts      # one interface (or enum) per component schema
//! ├── Greeter.ts     # one async function per method of the endpoint
//! └── index.ts       # re-exports
//! ```
//!
//! Templates live in `templates/` and are rendered with `minijinja`. The
//! exact text is not a stable contract; the shape above is.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use endpointgen::generator::{generate_typescript, GenerateOptions};
//!
//! let written = generate_typescript(&result.document, "frontend/generated".as_ref(), &GenerateOptions::default())?;
//! ```

mod typescript;

use crate::openapi::OpenApiDocument;
use anyhow::Context;
use minijinja::{context, Environment};
use std::path::{Path, PathBuf};
use tracing::info;
use typescript::{endpoint_views, model_views, TypeNames};

const MODELS_TEMPLATE: &str = include_str!("../../templates/models.ts.jinja");
const ENDPOINT_TEMPLATE: &str = include_str!("../../templates/endpoint.ts.jinja");
const INDEX_TEMPLATE: &str = include_str!("../../templates/index.ts.jinja");

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Module the generated functions import their call client from
    pub client_module: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            client_module: "./connect-client".to_string(),
        }
    }
}

fn environment() -> anyhow::Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("models.ts.jinja", MODELS_TEMPLATE)?;
    env.add_template("endpoint.ts.jinja", ENDPOINT_TEMPLATE)?;
    env.add_template("index.ts.jinja", INDEX_TEMPLATE)?;
    Ok(env)
}

/// Writes `models.ts`, one `<Endpoint>.ts` per endpoint with methods and
/// `index.ts` into `out_dir`. Returns the written paths.
pub fn generate_typescript(
    document: &OpenApiDocument,
    out_dir: &Path,
    options: &GenerateOptions,
) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let env = environment()?;
    let names = TypeNames::new(document);
    let title = &document.info.title;
    let version = &document.info.version;
    let mut written = Vec::new();

    let models = env.get_template("models.ts.jinja")?.render(context! {
        title => title, version => version,
        models => model_views(document, &names),
    })?;
    written.push(write_file(out_dir, "models.ts", &models)?);

    let endpoints = endpoint_views(document, &names);
    let template = env.get_template("endpoint.ts.jinja")?;
    for view in &endpoints {
        let rendered = template.render(context! {
            title => title, version => version,
            client_module => &options.client_module,
            endpoint => &view.endpoint,
            imports => &view.imports,
            methods => &view.methods,
        })?;
        written.push(write_file(out_dir, &format!("{}.ts", view.endpoint), &rendered)?);
    }

    let index = env.get_template("index.ts.jinja")?.render(context! {
        title => title, version => version,
        endpoints => endpoints.iter().map(|v| v.endpoint.as_str()).collect::<Vec<_>>(),
    })?;
    written.push(write_file(out_dir, "index.ts", &index)?);

    info!(
        out_dir = %out_dir.display(),
        files = written.len(),
        "TypeScript sources generated"
    );
    Ok(written)
}

fn write_file(dir: &Path, name: &str, content: &str) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

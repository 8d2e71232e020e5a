//! # Parser Module
//!
//! Turns a scanned class path into an OpenAPI document by walking a graph
//! of nodes with a set of plugins.
//!
//! ## Overview
//!
//! - [`Node`] pairs a program element ([`NodeSource`]) with what plugins
//!   build for it ([`NodeTarget`]).
//! - [`NodePath`] is a node with its ancestor chain; plugins read context
//!   from it and leave remove / replace / skip commands on it.
//! - [`PluginExecutor`] drives the walk: each path is scanned for
//!   dependencies, entered, has its children walked, and is exited.
//! - [`Plugin`] is the extension point; [`CompositePlugin`] runs a sorted
//!   list of them as one and [`PluginRegistry`] builds that list from
//!   [`ParserConfig`].
//! - [`SharedStorage`] is the context of one run: the document being
//!   assembled, the [`AssociationMap`], class mappers and the
//!   [`DependencyController`] that keeps entities from being walked twice.
//!
//! ## Walk Order
//!
//! ```text
//! enter(root)
//!   enter(endpoint) → enter(method) → enter(parameter) → enter(signature)
//!                                                        exit(signature)
//!                                     exit(parameter)
//!                     exit(method)
//!   exit(endpoint)
//!   enter(entity) → … → exit(entity)        related dependencies
//! exit(root)
//! ```
//!
//! For an ancestor `A` of `B`: `enter(A) < enter(B) < exit(B) < exit(A)`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use endpointgen::config::ParserConfig;
//! use endpointgen::parser::Parser;
//!
//! let config = ParserConfig::new("com.example.Endpoint", "com.example.EndpointExposed")
//!     .with_class_path("build/classes");
//! let result = Parser::new(config).execute()?;
//! println!("{}", result.document.to_json_pretty()?);
//! ```

mod dependencies;
mod dependency;
mod error;
mod executor;
pub mod node;
mod path;
mod plugin;
pub mod plugins;
mod registry;
mod storage;

pub use dependencies::NodeDependencies;
pub use dependency::DependencyController;
pub use error::{ParserError, Result};
pub use executor::PluginExecutor;
pub use node::{Node, NodeRef, NodeSource, NodeTarget};
pub use path::{NodePath, PathCommand};
pub use plugin::{verify_plugins_order, CompositePlugin, Plugin};
pub use registry::{PluginFactory, PluginRegistry};
pub use storage::{AssociationMap, ClassMappers, PluginStorage, SharedStorage};

use crate::config::ParserConfig;
use crate::openapi::OpenApiDocument;
use crate::scan::{ClassPathScanner, ScanResult};
use std::sync::Arc;
use tracing::info;

/// Output of a parser run.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub document: OpenApiDocument,
    pub associations: AssociationMap,
    pub scan: Arc<ScanResult>,
}

/// Entry point: configuration plus the plugins to run.
#[derive(Clone)]
pub struct Parser {
    config: ParserConfig,
    registry: PluginRegistry,
}

impl Parser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            registry: PluginRegistry::with_backbone(),
        }
    }

    pub fn with_plugin_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Validates the configuration, scans the class path and walks it.
    pub fn execute(&self) -> Result<ParseResult> {
        self.config.validate()?;
        self.config.validate_class_path()?;
        let scan = ClassPathScanner::scan(&self.config)?;
        self.execute_with(scan)
    }

    /// Walks an already scanned class path.
    pub fn execute_with(&self, scan: ScanResult) -> Result<ParseResult> {
        self.config.validate()?;
        let mut plugin = self.registry.build(&self.config)?;
        let scan = Arc::new(scan);
        let document = OpenApiDocument::base(&self.config)?;
        let mut storage = SharedStorage::new(self.config.clone(), Arc::clone(&scan), document);

        let root = NodePath::root(Node::new(NodeSource::Root(Arc::clone(&scan))));
        PluginExecutor::new(&mut plugin, root).execute(&mut storage)?;

        let (mut document, associations) = storage.into_output();
        document.finalize();
        info!(
            endpoints = document.tags.len(),
            operations = document.paths.len(),
            schemas = document.components.schemas.len(),
            "endpoint document generated"
        );
        Ok(ParseResult {
            document,
            associations,
            scan,
        })
    }
}

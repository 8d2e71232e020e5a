//! # endpointgen
//!
//! **endpointgen** turns annotated backend service classes into a
//! client-callable API: an OpenAPI document, TypeScript client sources, and
//! a runtime that invokes the methods behind `POST /{prefix}/{endpoint}/{method}`.
//!
//! ## Overview
//!
//! Classes are described by descriptor files (YAML, JSON or TOML) on a class
//! path. A class carrying the endpoint annotation becomes an *endpoint*; its
//! public instance methods become operations, and every class reachable from
//! their parameters and results becomes a component schema.
//!
//! ## Architecture
//!
//! - **[`model`]** - class, member, property and type-signature models read from descriptors
//! - **[`scan`]** - class-path scanning, endpoint discovery and the flat reachability scan
//! - **[`parser`]** - the plugin-driven tree walk producing the document
//! - **[`openapi`]** - document and schema types, linting
//! - **[`access`]** - access rules and principals
//! - **[`runtime`]** - endpoint registry, argument binding, validation and invocation
//! - **[`generator`]** - TypeScript client rendering
//! - **[`hot_reload`]** - regeneration on class-path changes
//! - **[`config`]** / **[`logging`]** / **[`cli`]** - configuration, tracing setup and the command line
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant CLI as CLI<br/>(endpointgen)
//!     participant Scan as scan::ClassPathScanner
//!     participant Exec as parser::PluginExecutor
//!     participant Plugins as Backbone plugins
//!     participant Doc as openapi::OpenApiDocument
//!
//!     CLI->>Scan: scan(&config)
//!     Scan->>Scan: Read descriptors, find endpoints
//!     Scan-->>CLI: ScanResult
//!     CLI->>Exec: execute(root path)
//!     loop until the task queue is empty
//!         Exec->>Plugins: scan / resolve child nodes
//!         Exec->>Plugins: enter (in order)
//!         Plugins->>Doc: paths, schemas, constraints
//!         Exec->>Plugins: exit (reverse order)
//!     end
//!     Exec-->>CLI: ParseResult (document + associations)
//! ```
//!
//! ### Invocation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as runtime::EndpointService
//!     participant Invoker as runtime::EndpointInvoker
//!     participant Handler as MethodHandler
//!
//!     Client->>Service: POST /connect/Greeter/hello {"name": "Ann"}
//!     Service->>Invoker: invoke("Greeter", "hello", body, principal)
//!     Invoker->>Invoker: access check, bind, validate
//!     Invoker->>Handler: call(ctx, ["Ann"])
//!     Handler-->>Invoker: "Hello, Ann"
//!     Invoker-->>Client: 200 "Hello, Ann"
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use endpointgen::config::ParserConfig;
//! use endpointgen::parser::Parser;
//!
//! let config = ParserConfig::load("endpointgen.yaml".as_ref())?;
//! let result = Parser::new(config).execute()?;
//! println!("{}", result.document.to_json_pretty()?);
//! ```

pub mod access;
pub mod cli;
pub mod config;
pub mod generator;
pub mod hot_reload;
pub mod logging;
pub mod model;
pub mod openapi;
pub mod parser;
pub mod runtime;
pub mod scan;

//! # Hot Reload Module
//!
//! Re-runs the parser when class descriptors change so a development
//! server can swap in a new document and registry without restarting.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use endpointgen::hot_reload::watch_class_path;
//!
//! let service = EndpointService::new("connect", registry);
//! let reloading = service.clone();
//! let watcher = watch_class_path(config, move |result| {
//!     match EndpointRegistry::build(&result, implementations()) {
//!         Ok(registry) => reloading.reload(registry),
//!         Err(e) => tracing::warn!(error = %e, "registry rebuild failed"),
//!     }
//! })?;
//!
//! // Keep the watcher alive for as long as reloads should happen
//! std::mem::forget(watcher);
//! ```
//!
//! ## Reload Process
//!
//! 1. **Detection** - a create, modify or remove event under a class-path entry
//! 2. **Parse** - the full parser runs again against the class path
//! 3. **De-duplication** - the document fingerprint is compared with the last
//!    one handed out; unchanged documents are dropped (editors often save twice)
//! 4. **Callback** - the new [`ParseResult`] is handed to the caller
//!
//! ## Error Handling
//!
//! If the new class path fails to scan or parse, the error is logged and the
//! callback is not called, so the previous state keeps serving.

use crate::config::ParserConfig;
use crate::parser::{ParseResult, Parser};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Runs the parser and reports results whose document changed.
pub struct Reloader {
    parser: Parser,
    last_fingerprint: Mutex<Option<String>>,
}

impl Reloader {
    pub fn new(parser: Parser) -> Self {
        Self {
            parser,
            last_fingerprint: Mutex::new(None),
        }
    }

    /// Records the fingerprint of a result produced elsewhere (the initial
    /// run), so an unchanged first event is not reported.
    pub fn prime(&self, result: &ParseResult) {
        if let Ok(mut last) = self.last_fingerprint.lock() {
            *last = Some(result.document.fingerprint());
        }
    }

    /// Parses again; `None` when parsing failed or nothing changed.
    pub fn reload(&self) -> Option<ParseResult> {
        let result = match self.parser.execute() {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "hot-reload: parse failed, keeping previous state");
                return None;
            }
        };
        let fingerprint = result.document.fingerprint();
        let mut last = self.last_fingerprint.lock().ok()?;
        if last.as_deref() == Some(fingerprint.as_str()) {
            debug!("hot-reload: document unchanged");
            return None;
        }
        *last = Some(fingerprint);
        info!(
            operations = result.document.paths.len(),
            schemas = result.document.components.schemas.len(),
            "hot-reload: document changed"
        );
        Some(result)
    }
}

/// Watch the class path and hand every changed [`ParseResult`] to
/// `on_reload`.
pub fn watch_class_path<F>(config: ParserConfig, mut on_reload: F) -> notify::Result<RecommendedWatcher>
where
    F: FnMut(ParseResult) + Send + 'static,
{
    let entries = config.class_path.clone();
    let reloader = Reloader::new(Parser::new(config));

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                ) {
                    debug!(paths = ?event.paths, "hot-reload: class path changed");
                    if let Some(result) = reloader.reload() {
                        on_reload(result);
                    }
                }
            }
            Err(e) => warn!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    for entry in &entries {
        watcher.watch(entry, RecursiveMode::Recursive)?;
    }
    info!(entries = entries.len(), "hot-reload: watching class path");
    Ok(watcher)
}

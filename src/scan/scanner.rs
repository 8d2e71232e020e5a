use super::ScanResult;
use crate::config::ParserConfig;
use crate::model::{parse_descriptors, ClassDescriptor, DescriptorFormat};
use crate::parser::{ParserError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Reads class descriptors from the class path.
pub struct ClassPathScanner;

impl ClassPathScanner {
    /// Scans every class-path entry in order. Directories are walked
    /// recursively in file-name order so the result does not depend on the
    /// file system.
    pub fn scan(config: &ParserConfig) -> Result<ScanResult> {
        let mut descriptors = Vec::new();
        for file in Self::descriptor_files(&config.class_path)? {
            descriptors.extend(Self::read_file(&file)?);
        }
        ScanResult::from_descriptors(descriptors, config)
    }

    /// Descriptor files under `entries`, recognised by extension.
    pub fn descriptor_files(entries: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in entries {
            for item in WalkDir::new(entry).sort_by_file_name() {
                let item = item.map_err(|e| ParserError::Io {
                    path: e.path().map_or_else(|| entry.clone(), Path::to_path_buf),
                    source: e.into(),
                })?;
                if item.file_type().is_file() && format_of(item.path()).is_some() {
                    files.push(item.into_path());
                }
            }
        }
        debug!(files = files.len(), "descriptor files found");
        Ok(files)
    }

    fn read_file(path: &Path) -> Result<Vec<ClassDescriptor>> {
        let Some(format) = format_of(path) else {
            return Ok(Vec::new());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ParserError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let classes = parse_descriptors(&text, format).map_err(|e| ParserError::Descriptor {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        trace!(path = %path.display(), classes = classes.len(), "descriptor file read");
        Ok(classes)
    }
}

fn format_of(path: &Path) -> Option<DescriptorFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(DescriptorFormat::from_extension)
}

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::Product;

/// The read-only product collection every session searches.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

/// A source that contributed nothing to the catalog, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

/// The first record a source could not use, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub index: usize,
    pub reason: String,
}

/// Outcome of loading a data directory. Skips never fail the load.
///
/// `skipped` holds whole sources (and unreadable directory entries);
/// `record_errors` holds the first rejected record of each loaded source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub sources_loaded: usize,
    pub products_loaded: usize,
    pub records_skipped: usize,
    pub skipped: Vec<SkippedSource>,
    pub record_errors: Vec<SkippedRecord>,
}

impl Catalog {
    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Aggregate every `*.json` array under `data_dir` into one catalog.
    ///
    /// A missing directory yields an empty catalog. Unreadable or malformed
    /// sources are recorded in the report and otherwise ignored; so are
    /// individual records that are not product objects.
    pub fn load_dir(data_dir: &Path) -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let mut products = Vec::new();

        if !data_dir.exists() {
            tracing::warn!(path = %data_dir.display(), "catalog directory does not exist");
            return (Self::default(), report);
        }

        let files = list_json_files(data_dir, &mut report.skipped);
        if files.is_empty() {
            tracing::warn!(path = %data_dir.display(), "no .json catalog files found");
        }

        for file in files {
            match read_source(&file) {
                Ok(source) => {
                    tracing::debug!(
                        path = %file.display(),
                        products = source.products.len(),
                        skipped = source.skipped,
                        "catalog source loaded"
                    );
                    report.sources_loaded += 1;
                    report.products_loaded += source.products.len();
                    report.records_skipped += source.skipped;
                    if let Some((index, reason)) = source.first_error {
                        tracing::warn!(path = %file.display(), index, reason = %reason, "skipping catalog records");
                        report.record_errors.push(SkippedRecord { path: file.clone(), index, reason });
                    }
                    products.extend(source.products);
                }
                Err(err) => {
                    tracing::warn!(path = %file.display(), error = %err, "skipping catalog source");
                    report.skipped.push(SkippedSource { path: file, reason: err.to_string() });
                }
            }
        }

        tracing::info!(
            sources = report.sources_loaded,
            products = report.products_loaded,
            skipped_sources = report.skipped.len(),
            skipped_records = report.records_skipped,
            "catalog loaded"
        );
        (Self { products }, report)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Distinct vendor names, sorted.
    pub fn vendors(&self) -> Vec<String> {
        distinct(self.products.iter().map(|p| p.vendor.as_str()))
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        distinct(self.products.iter().map(|p| p.category.as_str()))
    }

    /// Distinct brands, sorted.
    pub fn brands(&self) -> Vec<String> {
        distinct(self.products.iter().map(|p| p.brand.as_str()))
    }

    /// Every tag used by any product, sorted.
    pub fn tags(&self) -> Vec<String> {
        distinct(self.products.iter().flat_map(|p| p.tags.iter().map(String::as_str)))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

struct Source {
    products: Vec<Product>,
    skipped: usize,
    first_error: Option<(usize, String)>,
}

fn read_source(path: &Path) -> Result<Source> {
    let raw = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&raw)?;
    let Value::Array(records) = value else {
        return Err(Error::Catalog(format!("{} is not a JSON array", path.display())));
    };
    let mut source = Source { products: Vec::with_capacity(records.len()), skipped: 0, first_error: None };
    for (index, record) in records.into_iter().enumerate() {
        let parsed = if record.is_object() {
            serde_json::from_value::<Product>(record).map_err(|e| e.to_string())
        } else {
            Err("record is not a JSON object".to_string())
        };
        match parsed {
            Ok(product) => source.products.push(product),
            Err(reason) => {
                source.skipped += 1;
                if source.first_error.is_none() {
                    source.first_error = Some((index, reason));
                }
            }
        }
    }
    Ok(source)
}

fn list_json_files(root: &Path, skipped: &mut Vec<SkippedSource>) -> Vec<PathBuf> {
    let mut json_files = Vec::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                tracing::warn!(path = %path.display(), error = %err, "unreadable catalog entry");
                skipped.push(SkippedSource { path, reason: err.to_string() });
                continue;
            }
        };
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
            json_files.push(path.to_path_buf());
        }
    }
    json_files.sort();
    json_files
}

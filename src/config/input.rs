use crate::core::Storage;
use crate::utils::error::Result;
use std::collections::BTreeSet;

/// Where a ZIP code list comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZipSource {
    /// ZIPs given directly on the command line.
    Inline(Vec<String>),
    /// A text file with one ZIP per line.
    File(String),
}

impl ZipSource {
    /// Deduplicated, sorted, blank entries dropped.
    pub async fn resolve<S: Storage>(&self, storage: &S) -> Result<BTreeSet<String>> {
        let zips = match self {
            ZipSource::Inline(list) => collect_zips(list.iter().map(String::as_str)),
            ZipSource::File(path) => {
                let data = storage.read_file(path).await?;
                let text = String::from_utf8_lossy(&data);
                collect_zips(text.lines())
            }
        };
        tracing::debug!("Resolved {} ZIP codes from {:?}", zips.len(), self);
        Ok(zips)
    }
}

fn collect_zips<'a>(items: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    items
        .map(str::trim)
        .filter(|z| !z.is_empty())
        .map(str::to_string)
        .collect()
}

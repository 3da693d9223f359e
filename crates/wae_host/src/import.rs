//! Import of legacy CSV records into a record store.

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;
use wae_io::legacy::load_legacy_csv;
use wae_io::store::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,

    /// Rows whose uid the store already held.
    pub duplicates: usize,

    /// Rows the parser could not convert.
    pub skipped: usize,
}

/// Appends every record of `csv` whose uid is not yet stored, so running
/// the import twice adds nothing the second time.
pub fn import_legacy<S: RecordStore>(store: &mut S, csv: &Path) -> Result<ImportSummary> {
    let legacy = load_legacy_csv(csv)?;
    let mut known: HashSet<String> = store.load_all()?.into_iter().map(|r| r.uid).collect();

    let mut summary = ImportSummary {
        imported: 0,
        duplicates: 0,
        skipped: legacy.skipped,
    };
    for record in legacy.records {
        if !known.insert(record.uid.clone()) {
            summary.duplicates += 1;
            continue;
        }
        store.append_record(record)?;
        summary.imported += 1;
    }

    info!(
        imported = summary.imported,
        duplicates = summary.duplicates,
        skipped = summary.skipped,
        source = %csv.display(),
        "imported legacy records"
    );
    Ok(summary)
}

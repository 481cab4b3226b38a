//! CSV translation between uploaded files and whiskey records.
//!
//! Import understands the native export columns and the OnlyDrams dialect;
//! export always writes the native columns.

pub mod export;
pub mod import;
pub mod reader;

pub use export::{export_csv, ExportError, EXPORT_HEADERS};
pub use import::{import_csv, ImportError, ImportReport, ImportSummary, ImportedWhiskey, Importer};
pub use reader::decode_upload;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryWhiskeyStore;
    use crate::database::repository::{WhiskeyFilters, WhiskeyStore};
    use crate::services::QuantityPolicy;
    use crate::testing::{sample_data, ALICE};

    #[tokio::test]
    async fn export_then_import_reproduces_fields() {
        let source = MemoryWhiskeyStore::new();

        let mut full = sample_data("Lagavulin 16", "scotch");
        full.distillery = Some("Lagavulin".to_string());
        full.region = Some("Islay".to_string());
        full.age = Some(16);
        full.abv = Some(43.0);
        full.proof = Some(86.0);
        full.quantity = Some(2);
        full.msrp = Some(99.99);
        full.rating = Some(9.5);
        full.tasting_notes = Some("Smoky, peaty, 10/10".to_string());
        full.status = Some("Opened".to_string());
        full.is_opened = Some(true);
        full.limited_edition = Some(true);
        full.purchase_date = Some("2024-12-24".to_string());
        full.private_notes = Some("Gift from \"Uncle Jim\"\nSecond line".to_string());
        source.create(ALICE, full).await.unwrap();

        let mut sparse = sample_data("Weller Special Reserve", "bourbon");
        sparse.quantity = Some(0);
        source.create(ALICE, sparse).await.unwrap();

        let exported = source.find_all(&WhiskeyFilters::owner(ALICE)).await.unwrap();
        let csv = export_csv(&exported).unwrap();

        let target = MemoryWhiskeyStore::new();
        let importer = Importer {
            owner: ALICE,
            username: "alice",
        };
        let report = import_csv(&target, importer, &csv, &QuantityPolicy::default())
            .await
            .unwrap();
        assert_eq!(report.summary.imported, 2, "report: {:?}", report);

        let imported = target.find_all(&WhiskeyFilters::owner(ALICE)).await.unwrap();
        let before: Vec<_> = exported.iter().map(|w| &w.fields).collect();
        let after: Vec<_> = imported.iter().map(|w| &w.fields).collect();
        assert_eq!(before, after);
    }
}

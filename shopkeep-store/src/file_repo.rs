use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use shopkeep_catalog::{Inventory, Product};

/// Flat-file repository for the inventory document: a JSON array of flat
/// product records, one per product, in stable iteration order.
pub struct FileRepository {
    path: PathBuf,
}

/// Persistence errors (unreadable destination, malformed document)
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Inventory file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed inventory document: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full document. The write goes to a temp file in the
    /// destination directory first, then replaces the target, so a failed
    /// write never leaves a corrupt document behind.
    pub fn save(&self, inventory: &Inventory) -> Result<(), StoreError> {
        let records: Vec<&Product> = inventory.products().collect();
        let document = serde_json::to_string_pretty(&records)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(document.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        tracing::debug!(
            "Saved {} product(s) to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read the document into a fresh inventory.
    pub fn load(&self) -> Result<Inventory, StoreError> {
        let mut inventory = Inventory::new();
        self.load_into(&mut inventory)?;
        Ok(inventory)
    }

    /// Read the document and merge it into an existing inventory. Records
    /// overwrite products with a matching id. Records whose `type` is
    /// missing or unrecognized are skipped; a recognized record with bad
    /// fields fails the whole load. Returns how many records were merged.
    pub fn load_into(&self, inventory: &mut Inventory) -> Result<usize, StoreError> {
        let raw = fs::read_to_string(&self.path)?;
        let records: Vec<Value> = serde_json::from_str(&raw)?;

        let mut loaded = 0;
        for record in records {
            match record.get("type").and_then(Value::as_str) {
                Some("Electronics") | Some("Grocery") | Some("Clothing") => {
                    let product: Product = serde_json::from_value(record)?;
                    inventory.upsert(product);
                    loaded += 1;
                }
                other => {
                    tracing::warn!("Skipping record with unrecognized type: {:?}", other);
                }
            }
        }

        tracing::debug!(
            "Loaded {} product(s) from {}",
            loaded,
            self.path.display()
        );
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_inventory() -> Inventory {
        let mut inventory = Inventory::new();
        inventory
            .add(Product::electronics(
                "E1".to_string(),
                "Phone".to_string(),
                500.0,
                10,
                "Acme".to_string(),
                2,
            ))
            .unwrap();
        inventory
            .add(Product::grocery(
                "G1".to_string(),
                "Milk".to_string(),
                2.5,
                5,
                "2025-12-31".parse().unwrap(),
            ))
            .unwrap();
        inventory
            .add(Product::clothing(
                "C1".to_string(),
                "Jacket".to_string(),
                79.99,
                3,
                "L".to_string(),
                "Leather".to_string(),
            ))
            .unwrap();
        inventory
    }

    #[test]
    fn test_save_then_load_round_trips_all_variants() {
        let dir = tempdir().unwrap();
        let repo = FileRepository::new(dir.path().join("inventory.json"));

        let original = sample_inventory();
        repo.save(&original).unwrap();

        let loaded = repo.load().unwrap();
        assert_eq!(loaded.len(), 3);

        let originals: Vec<&Product> = original.products().collect();
        let reloaded: Vec<&Product> = loaded.products().collect();
        assert_eq!(originals, reloaded);
    }

    #[test]
    fn test_save_overwrites_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(&path, "stale content").unwrap();

        let repo = FileRepository::new(&path);
        repo.save(&sample_inventory()).unwrap();

        let loaded = repo.load().unwrap();
        assert_eq!(loaded.len(), 3);
    }

    #[test]
    fn test_load_merges_and_overwrites_matching_ids() {
        let dir = tempdir().unwrap();
        let repo = FileRepository::new(dir.path().join("inventory.json"));
        repo.save(&sample_inventory()).unwrap();

        let mut inventory = Inventory::new();
        inventory
            .add(Product::electronics(
                "E1".to_string(),
                "Old Phone".to_string(),
                100.0,
                1,
                "Basic".to_string(),
                1,
            ))
            .unwrap();
        inventory
            .add(Product::clothing(
                "C9".to_string(),
                "Scarf".to_string(),
                9.99,
                7,
                "One Size".to_string(),
                "Wool".to_string(),
            ))
            .unwrap();

        let loaded = repo.load_into(&mut inventory).unwrap();

        assert_eq!(loaded, 3);
        // E1 overwritten, C9 untouched, no duplicate ids
        assert_eq!(inventory.len(), 4);
        assert_eq!(inventory.get("E1").unwrap().name, "Phone");
        assert_eq!(inventory.get("C9").unwrap().name, "Scarf");
    }

    #[test]
    fn test_unknown_type_records_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(
            &path,
            r#"[
                {"type": "Electronics", "product_id": "E1", "name": "Phone",
                 "price": 500.0, "quantity_in_stock": 10,
                 "brand": "Acme", "warranty_years": 2},
                {"type": "Furniture", "product_id": "F1", "name": "Desk",
                 "price": 120.0, "quantity_in_stock": 4},
                {"product_id": "X1", "name": "Untagged",
                 "price": 1.0, "quantity_in_stock": 1}
            ]"#,
        )
        .unwrap();

        let inventory = FileRepository::new(&path).load().unwrap();

        assert_eq!(inventory.len(), 1);
        assert!(inventory.get("E1").is_some());
    }

    #[test]
    fn test_malformed_document_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(&path, "not json at all").unwrap();

        let err = FileRepository::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn test_recognized_type_with_bad_fields_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.json");
        fs::write(
            &path,
            r#"[{"type": "Grocery", "product_id": "G1", "name": "Milk",
                 "price": 2.5, "quantity_in_stock": 5,
                 "expiry_date": "not-a-date"}]"#,
        )
        .unwrap();

        let err = FileRepository::new(&path).load().unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn test_missing_source_is_an_io_error() {
        let dir = tempdir().unwrap();
        let repo = FileRepository::new(dir.path().join("absent.json"));

        let err = repo.load().unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_unwritable_destination_is_an_io_error() {
        let dir = tempdir().unwrap();
        // The parent directory does not exist, so the temp file cannot be created
        let repo = FileRepository::new(dir.path().join("missing").join("inventory.json"));

        let err = repo.save(&sample_inventory()).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}

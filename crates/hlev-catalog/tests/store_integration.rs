//! Attribute store over `.hlar` files on disk

use approx::assert_relative_eq;
use hlev_catalog::{CatalogError, EntityView, Property, Selection, SourceTemplates, StoreConfig};
use hlev_storage::{encode_array, DType, FileReader, RawArray, RunId, Source};
use hlev_units::Unit;
use ndarray::{arr1, arr2, arr3};
use std::path::Path;

fn write(reader: &FileReader, source: Source, key: &str, array: RawArray, dtype: DType) {
    let path = reader.array_path(source, key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, encode_array(&array, dtype)).unwrap();
}

fn config(base: &Path) -> StoreConfig {
    let mut config = StoreConfig::from_toml(
        r#"
run = 4
[snapshots]
labels = ["000_z001p000", "001_z000p000"]
"#,
    )
    .unwrap();
    config.sources = SourceTemplates::under(&format!("{}/CE-{{run}}", base.display()));
    config
}

fn populate(config: &StoreConfig) {
    let reader = config.reader();
    write(&reader, Source::Properties, "M200", arr2(&[[14.0, 14.2], [11.0, -1.0]]).into_dyn(), DType::F64);
    write(&reader, Source::Properties, "SatFlag", arr2(&[[0.0, 0.0], [1.0, 1.0]]).into_dyn(), DType::I64);
    write(&reader, Source::Properties, "R200", arr2(&[[0.5, 1.2], [0.05, 0.06]]).into_dyn(), DType::F64);
    write(
        &reader,
        Source::Positions,
        "Centre",
        arr3(&[[[1.0, 1.0, 1.0], [2.0, 2.0, 2.0]], [[1.5, 1.0, 1.0], [2.2, 2.0, 2.0]]]).into_dyn(),
        DType::F64,
    );
    write(&reader, Source::SnipPaths, "RootIndex/Basic", arr1(&[0.0, 1.0, 2.0]).into_dyn(), DType::I64);
    for s in 0..3 {
        write(
            &reader,
            Source::SnipPaths,
            &format!("Snepshot_{:04}/Velocity", s),
            arr2(&[[s as f64, 0.0, 0.0], [0.0, s as f64, 0.0]]).into_dyn(),
            DType::F64,
        );
    }
}

#[test]
fn test_store_reads_run_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    populate(&config);
    assert!(dir.path().join("CE-4").join("properties").join("M200.hlar").exists());

    let store = config.open().unwrap();
    assert_eq!(store.run(), RunId::new(4));

    let m200 = store.get("M200").unwrap();
    assert_relative_eq!(m200.value()[[0, 1]], 10f64.powf(14.2), max_relative = 1e-12);
    assert!(m200.value()[[1, 1]].is_nan());

    let flags = store.get("SatFlag").unwrap();
    assert_eq!(flags.value()[[1, 0]], 1.0);
    assert_eq!(flags.unit(), Unit::DIMENSIONLESS);

    // z = 1 at the first snapshot halves the scale factor
    let r200 = store.property(Property::R200).unwrap();
    assert_relative_eq!(r200.value()[[0, 0]], 1.0);
    assert_relative_eq!(r200.value()[[0, 1]], 1.2);
}

#[test]
fn test_snip_paths_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    populate(&config);
    let store = config.open().unwrap();

    let velocity = store.get("snipVelocity").unwrap();
    assert_eq!(velocity.shape(), &[2, 3, 3]);
    assert_eq!(velocity.unit(), Unit::KM_PER_S);
    assert_eq!(velocity.value()[[1, 2, 1]], 2.0);
}

#[test]
fn test_views_over_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    populate(&config);
    let store = config.open().unwrap();

    let view = EntityView::new(&store, Selection::Mask(vec![false, true]));
    let centre = view.get("Centre").unwrap();
    assert_eq!(centre.shape(), &[1, 2, 3]);
    assert_relative_eq!(centre.value()[[0, 0, 0]], 3.0);
    assert_relative_eq!(centre.value()[[0, 1, 0]], 2.2);
}

#[test]
fn test_missing_table_is_storage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    populate(&config);
    let store = config.open().unwrap();

    let err = store.get("Mstar").unwrap_err();
    assert!(matches!(err, CatalogError::Storage { .. }));
    assert!(err.is_not_found());
    assert!(!store.contains("Mstar"));
}

#[test]
fn test_corrupt_file_is_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    populate(&config);
    let store = config.open().unwrap();

    let path = config.reader().array_path(Source::Properties, "R200");
    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&path, bytes).unwrap();

    let err = store.get("R200").unwrap_err();
    assert!(matches!(err, CatalogError::Storage { .. }));
    assert!(!err.is_not_found());
    assert!(store.is_empty());
}

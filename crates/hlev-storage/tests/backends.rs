//! Both backends behave the same behind `dyn BackingReader`

use hlev_storage::{
    encode_array, BackingReader, DType, FileReader, MemoryReader, Source, SourceRoots,
    StorageError,
};
use ndarray::{arr1, arr3};
use std::sync::Arc;
use std::thread;

fn populate(reader: &FileReader, source: Source, key: &str, array: &hlev_storage::RawArray, dtype: DType) {
    let path = reader.array_path(source, key);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, encode_array(array, dtype)).unwrap();
}

#[test]
fn test_backends_agree() {
    let temp_dir = tempfile::tempdir().unwrap();
    let file = FileReader::new(SourceRoots::under(temp_dir.path()));
    let memory = MemoryReader::new();

    let coords = arr3(&[[[1.0, 2.0, 3.0]], [[4.0, 5.0, 6.0]]]).into_dyn();
    let index = arr1(&[0.0, 3.0, -1.0]).into_dyn();
    let entries = [
        (Source::SnipPaths, "Snepshot_0001/Coordinates", &coords, DType::F64),
        (Source::SnipPaths, "RootIndex/Basic", &index, DType::I64),
    ];
    for (source, key, array, dtype) in entries {
        populate(&file, source, key, array, dtype);
        memory.insert(source, key, array.clone());
    }

    let readers: Vec<Box<dyn BackingReader>> = vec![Box::new(file), Box::new(memory)];
    for reader in &readers {
        assert_eq!(
            reader.read_raw(Source::SnipPaths, "Snepshot_0001/Coordinates").unwrap(),
            coords
        );
        assert_eq!(reader.read_raw(Source::SnipPaths, "RootIndex/Basic").unwrap(), index);

        let err = reader.read_raw(Source::Properties, "Snepshot_0001/Coordinates").unwrap_err();
        assert!(err.is_not_found(), "{}: {}", reader.describe(), err);
    }
}

#[test]
fn test_integer_files_truncate() {
    let temp_dir = tempfile::tempdir().unwrap();
    let reader = FileReader::new(SourceRoots::under(temp_dir.path()));
    populate(&reader, Source::Properties, "SatFlag", &arr1(&[0.0, 1.9, -2.5]).into_dyn(), DType::I64);

    let read = reader.read_raw(Source::Properties, "SatFlag").unwrap();
    assert_eq!(read, arr1(&[0.0, 1.0, -2.0]).into_dyn());
}

#[test]
fn test_corrupt_payload_is_not_missing() {
    let temp_dir = tempfile::tempdir().unwrap();
    let reader = FileReader::new(SourceRoots::under(temp_dir.path()));
    populate(&reader, Source::Positions, "Centre", &arr1(&[1.0, 2.0]).into_dyn(), DType::F64);

    let path = reader.array_path(Source::Positions, "Centre");
    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    std::fs::write(&path, bytes).unwrap();

    let err = reader.read_raw(Source::Positions, "Centre").unwrap_err();
    assert!(matches!(err, StorageError::ChecksumMismatch { .. }));
    assert!(!err.is_not_found());
}

#[test]
fn test_shared_reader_counts_reads() {
    let memory = Arc::new(MemoryReader::new().with(
        Source::Properties,
        "M200",
        arr1(&[12.0, 13.0]).into_dyn(),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let reader = Arc::clone(&memory);
            thread::spawn(move || reader.read_raw(Source::Properties, "M200").unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().len(), 2);
    }

    assert_eq!(memory.read_count(Source::Properties, "M200"), 4);
    assert_eq!(memory.total_reads(), 4);
}

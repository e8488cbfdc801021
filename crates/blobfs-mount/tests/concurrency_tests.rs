//! Concurrent access from many host threads.

mod common;

use blobfs_mount::{CreateMode, FileSystemOperations, FsStatus, RequestInfo};
use common::TestMount;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

#[test]
fn test_concurrent_resolve_shares_one_node() {
    let mount = TestMount::new();
    mount.write("\\shared.txt", b"x");
    mount.fs.registry().clear();
    let before = mount.fs.registry().constructed_count();

    let barrier = Barrier::new(THREADS);
    let nodes: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    mount.fs.registry().resolve("\\shared.txt", false).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for node in &nodes[1..] {
        assert!(Arc::ptr_eq(&nodes[0], node));
    }
    assert_eq!(mount.fs.registry().constructed_count(), before + 1);
}

#[test]
fn test_equivalent_paths_share_one_node() {
    let mount = TestMount::new();
    let a = mount.fs.registry().resolve("\\dir\\file", false).unwrap();
    let b = mount.fs.registry().resolve("/dir/file", false).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_concurrent_create_new_has_one_winner() {
    let mount = TestMount::new();
    let barrier = Barrier::new(THREADS);

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    mount.create("\\race.txt", CreateMode::CreateNew, false)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for result in &results {
        if let Err(status) = result {
            assert_eq!(*status, FsStatus::FileExists);
        }
    }
}

#[test]
fn test_concurrent_mkdir_has_one_winner() {
    let mount = TestMount::new();
    let barrier = Barrier::new(THREADS);

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    mount.mkdir("\\dir")
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .all(|r| matches!(r, Ok(()) | Err(FsStatus::FileExists))));
}

#[test]
fn test_concurrent_writers_to_distinct_files() {
    let mount = TestMount::new();
    mount.mkdir("\\out").unwrap();

    thread::scope(|s| {
        for i in 0..THREADS {
            let mount = &mount;
            s.spawn(move || {
                let path = format!("\\out\\file-{i}");
                let body = vec![i as u8; 100 * (i + 1)];
                mount.write(&path, &body);
            });
        }
    });

    let entries = mount.fs.find_files("\\out", &RequestInfo::directory()).unwrap();
    assert_eq!(entries.len(), THREADS);
    for i in 0..THREADS {
        let body = mount.read(&format!("\\out\\file-{i}")).unwrap();
        assert_eq!(body, vec![i as u8; 100 * (i + 1)]);
    }
    assert_eq!(mount.fs.open_handle_count(), 0);
    assert_eq!(mount.scratch_files(), 0);
}

#[test]
fn test_handles_on_same_file_are_independent() {
    let mount = TestMount::new();
    mount.write("\\f", b"original");

    let mut reader = mount.create("\\f", CreateMode::Open, false).unwrap();
    let mut writer = mount.create("\\f", CreateMode::Open, false).unwrap();
    assert_ne!(reader.handle, writer.handle);

    let mut buf = [0u8; 8];
    mount.fs.read_file("\\f", &mut buf, 0, &reader).unwrap();
    mount.fs.write_file("\\f", b"REPLACED", 0, &writer).unwrap();
    mount.fs.close_file("\\f", &mut writer).unwrap();

    // The reader keeps the content it hydrated
    let mut again = [0u8; 8];
    mount.fs.read_file("\\f", &mut again, 0, &reader).unwrap();
    assert_eq!(&again, b"original");
    mount.fs.close_file("\\f", &mut reader).unwrap();

    assert_eq!(mount.read("\\f").unwrap(), b"REPLACED");
}

//! Create/read/write/delete tests for the dispatcher.
//!
//! Everything runs against a `MemoryStore` with a temporary scratch
//! directory, so no external services are needed.

mod common;

use blobfs_core::{DirectoryMetadata, MemoryStore, ObjectStore};
use blobfs_mount::{
    BlobFileSystem, BlobFsError, CreateMode, FileSystemOperations, FsStatus, MountOptions,
    RequestInfo,
};
use common::{TestMount, CONTAINER};
use std::sync::Arc;

// ============================================================================
// Mount
// ============================================================================

#[test]
fn test_mount_creates_container_and_root_marker() {
    let mount = TestMount::new();
    assert!(mount.store.container_options().is_some());
    let body = mount.store.download("test1/.dir").unwrap();
    assert_eq!(DirectoryMetadata::decode(&body).unwrap().total_bytes_used, 0);
}

#[test]
fn test_mount_keeps_existing_root_document() {
    let store = Arc::new(MemoryStore::new(CONTAINER));
    store
        .upload("test1/.dir", &DirectoryMetadata::new(42).encode())
        .unwrap();
    let mount = TestMount::over(store, |o| o);
    let space = mount.fs.get_disk_free_space(&RequestInfo::default()).unwrap();
    assert_eq!(space.total_number_of_bytes, 42);
}

#[test]
fn test_mount_fails_when_store_unreachable() {
    let cache = tempfile::TempDir::new().unwrap();
    let store = Arc::new(MemoryStore::new(CONTAINER));
    store.set_offline(true);
    let fs = BlobFileSystem::new(store, MountOptions::new(CONTAINER, cache.path())).unwrap();
    assert_eq!(
        fs.mounted(&RequestInfo::directory()),
        Err(FsStatus::Error)
    );
}

#[test]
fn test_missing_cache_dir_is_rejected() {
    let cache = tempfile::TempDir::new().unwrap();
    let missing = cache.path().join("absent");
    let store = Arc::new(MemoryStore::new(CONTAINER));
    let result = BlobFileSystem::new(store, MountOptions::new(CONTAINER, missing));
    assert!(matches!(result, Err(BlobFsError::CacheRoot { .. })));
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn test_create_write_flush_delete_scenario() {
    let mount = TestMount::new();
    let fs = &mount.fs;
    let path = "\\a\\b.txt";

    let mut info = mount.create(path, CreateMode::CreateNew, false).unwrap();
    assert!(!info.is_directory);

    let meta = fs.get_file_information(path, &RequestInfo::file()).unwrap();
    assert!(!meta.is_directory());
    assert_eq!(meta.length, 0);
    assert_eq!(meta.file_name, "b.txt");

    assert_eq!(fs.write_file(path, b"hello", 0, &info), Ok(5));
    fs.flush_file_buffers(path, &info).unwrap();

    let meta = fs.get_file_information(path, &RequestInfo::file()).unwrap();
    assert_eq!(meta.length, 5);
    assert_eq!(mount.store.download("test1/a/b.txt").unwrap(), b"hello");

    fs.close_file(path, &mut info).unwrap();
    fs.delete_file(path, &RequestInfo::file()).unwrap();
    assert_eq!(
        fs.get_file_information(path, &RequestInfo::file()),
        Err(FsStatus::FileNotFound)
    );
}

// ============================================================================
// create_file dispositions
// ============================================================================

#[test]
fn test_create_new_twice_fails() {
    let mount = TestMount::new();
    mount.create("\\x.txt", CreateMode::CreateNew, false).unwrap();
    assert_eq!(
        mount.create("\\x.txt", CreateMode::CreateNew, false),
        Err(FsStatus::FileExists)
    );

    mount.mkdir("\\d").unwrap();
    assert_eq!(mount.mkdir("\\d"), Err(FsStatus::FileExists));
}

#[test]
fn test_create_file_after_failed_directory_lookup() {
    let mount = TestMount::new();
    let fs = &mount.fs;
    assert_eq!(
        fs.get_file_information("\\x", &RequestInfo::directory()),
        Err(FsStatus::PathNotFound)
    );
    assert_eq!(
        fs.delete_directory("\\x", &RequestInfo::directory()),
        Err(FsStatus::PathNotFound)
    );

    let mut info = mount.create("\\x", CreateMode::CreateNew, false).unwrap();
    assert!(!info.is_directory);
    assert!(mount.store.exists("test1/x").unwrap());
    assert!(!mount.store.exists("test1/x/.dir").unwrap());

    assert_eq!(fs.write_file("\\x", b"data", 0, &info), Ok(4));
    fs.close_file("\\x", &mut info).unwrap();
    assert_eq!(mount.read("\\x").unwrap(), b"data");
}

#[test]
fn test_open_absent() {
    let mount = TestMount::new();
    assert_eq!(
        mount.create("\\nope.txt", CreateMode::Open, false),
        Err(FsStatus::FileNotFound)
    );
    assert_eq!(
        mount.create("\\nope", CreateMode::Open, true),
        Err(FsStatus::PathNotFound)
    );
    assert_eq!(
        mount.create("\\nope.txt", CreateMode::Append, false),
        Err(FsStatus::FileNotFound)
    );
}

#[test]
fn test_open_existing_directory_without_hint() {
    let mount = TestMount::new();
    mount.mkdir("\\docs").unwrap();
    let info = mount.create("\\docs", CreateMode::Open, false).unwrap();
    assert!(info.is_directory);
}

#[test]
fn test_open_or_create() {
    let mount = TestMount::new();
    let mut info = mount.create("\\f", CreateMode::OpenOrCreate, false).unwrap();
    mount.fs.close_file("\\f", &mut info).unwrap();
    assert!(mount.store.exists("test1/f").unwrap());

    mount.write("\\f", b"keep me");
    let mut info = mount.create("\\f", CreateMode::Create, false).unwrap();
    mount.fs.close_file("\\f", &mut info).unwrap();
    assert_eq!(mount.read("\\f").unwrap(), b"keep me");
}

#[test]
fn test_truncate_existing_file() {
    let mount = TestMount::new();
    mount.write("\\t.bin", b"0123456789");
    let mut info = mount.create("\\t.bin", CreateMode::Truncate, false).unwrap();
    mount.fs.close_file("\\t.bin", &mut info).unwrap();

    let meta = mount
        .fs
        .get_file_information("\\t.bin", &RequestInfo::file())
        .unwrap();
    assert_eq!(meta.length, 0);
}

#[test]
fn test_truncate_or_append_directory_denied() {
    let mount = TestMount::new();
    mount.mkdir("\\d").unwrap();
    assert_eq!(
        mount.create("\\d", CreateMode::Truncate, true),
        Err(FsStatus::AccessDenied)
    );
    assert_eq!(
        mount.create("\\d", CreateMode::Append, true),
        Err(FsStatus::AccessDenied)
    );
}

#[test]
fn test_create_directory_writes_zero_document() {
    let mount = TestMount::new();
    mount.mkdir("\\docs").unwrap();
    assert_eq!(
        mount.store.download("test1/docs/.dir").unwrap(),
        br#"{"TotalBytesUsed":0}"#
    );
    let mut info = mount.create("\\docs", CreateMode::OpenOrCreate, true).unwrap();
    mount.fs.close_file("\\docs", &mut info).unwrap();
}

// ============================================================================
// Read / write
// ============================================================================

#[test]
fn test_write_flush_reopen_read_round_trip() {
    let mount = TestMount::new();
    let big = vec![0xA5u8; 4096];
    let cases: [&[u8]; 4] = [b"", b"x", b"exactly seven", &big];
    for content in cases {
        mount.write("\\rt.bin", content);
        assert_eq!(mount.read("\\rt.bin").unwrap(), content);
    }
}

#[test]
fn test_sparse_write_reads_zeros() {
    let mount = TestMount::new();
    let mut info = mount.create("\\s", CreateMode::CreateNew, false).unwrap();
    mount.fs.write_file("\\s", b"end", 5, &info).unwrap();
    mount.fs.close_file("\\s", &mut info).unwrap();
    assert_eq!(mount.read("\\s").unwrap(), b"\0\0\0\0\0end");
}

#[test]
fn test_overwrite_middle() {
    let mount = TestMount::new();
    mount.write("\\m", b"hello world");
    let mut info = mount.create("\\m", CreateMode::Open, false).unwrap();
    mount.fs.write_file("\\m", b"WORLD", 6, &info).unwrap();
    mount.fs.close_file("\\m", &mut info).unwrap();
    assert_eq!(mount.read("\\m").unwrap(), b"hello WORLD");
}

#[test]
fn test_append_writes_at_end() {
    let mount = TestMount::new();
    mount.write("\\log", b"hello");
    let mut info = mount.create("\\log", CreateMode::Append, false).unwrap();
    mount.fs.write_file("\\log", b" world", 0, &info).unwrap();
    mount.fs.close_file("\\log", &mut info).unwrap();
    assert_eq!(mount.read("\\log").unwrap(), b"hello world");
}

#[test]
fn test_open_without_io_downloads_nothing() {
    let mount = TestMount::new();
    mount.write("\\big", &[7u8; 1000]);
    let before = mount.fs.stats().snapshot().bytes_downloaded;

    let mut info = mount.create("\\big", CreateMode::Open, false).unwrap();
    mount.fs.close_file("\\big", &mut info).unwrap();
    assert_eq!(mount.fs.stats().snapshot().bytes_downloaded, before);

    assert_eq!(mount.read("\\big").unwrap().len(), 1000);
    assert_eq!(mount.fs.stats().snapshot().bytes_downloaded, before + 1000);
}

#[test]
fn test_close_flushes_dirty_data() {
    let mount = TestMount::new();
    let mut info = mount.create("\\c", CreateMode::CreateNew, false).unwrap();
    mount.fs.write_file("\\c", b"unflushed", 0, &info).unwrap();
    assert_eq!(mount.store.download("test1/c").unwrap(), b"");
    mount.fs.close_file("\\c", &mut info).unwrap();
    assert_eq!(mount.store.download("test1/c").unwrap(), b"unflushed");
    assert!(info.handle.is_none());
}

#[test]
fn test_scratch_file_lifecycle() {
    let mount = TestMount::new();
    assert_eq!(mount.scratch_files(), 0);
    let mut info = mount.create("\\s", CreateMode::CreateNew, false).unwrap();
    assert_eq!(mount.scratch_files(), 1);
    assert_eq!(mount.fs.open_handle_count(), 1);
    mount.fs.close_file("\\s", &mut info).unwrap();
    assert_eq!(mount.scratch_files(), 0);
    assert_eq!(mount.fs.open_handle_count(), 0);
}

#[test]
fn test_scratch_released_when_flush_fails() {
    let mount = TestMount::new();
    let mut info = mount.create("\\f", CreateMode::CreateNew, false).unwrap();
    mount.fs.write_file("\\f", b"data", 0, &info).unwrap();
    mount.store.set_offline(true);
    assert_eq!(mount.fs.close_file("\\f", &mut info), Err(FsStatus::Error));
    assert_eq!(mount.scratch_files(), 0);
    assert_eq!(mount.fs.open_handle_count(), 0);
}

#[test]
fn test_read_after_remote_delete() {
    let mount = TestMount::new();
    mount.write("\\gone", b"abc");
    let mut info = mount.create("\\gone", CreateMode::Open, false).unwrap();
    mount.store.delete("test1/gone").unwrap();
    let mut buf = [0u8; 3];
    assert_eq!(
        mount.fs.read_file("\\gone", &mut buf, 0, &info),
        Err(FsStatus::FileNotFound)
    );
    mount.fs.close_file("\\gone", &mut info).unwrap();
}

#[test]
fn test_read_on_directory_handle_denied() {
    let mount = TestMount::new();
    mount.mkdir("\\d").unwrap();
    let info = mount.create("\\d", CreateMode::Open, true).unwrap();
    let mut buf = [0u8; 4];
    assert_eq!(
        mount.fs.read_file("\\d", &mut buf, 0, &info),
        Err(FsStatus::AccessDenied)
    );
    assert_eq!(
        mount.fs.write_file("\\d", b"x", 0, &info),
        Err(FsStatus::AccessDenied)
    );
    // Nothing to upload for a directory
    mount.fs.flush_file_buffers("\\d", &info).unwrap();
}

#[test]
fn test_io_without_handle_fails() {
    let mount = TestMount::new();
    mount.write("\\f", b"x");
    let mut buf = [0u8; 1];
    assert_eq!(
        mount.fs.read_file("\\f", &mut buf, 0, &RequestInfo::file()),
        Err(FsStatus::Error)
    );
    let stale = RequestInfo {
        handle: Some(999),
        ..RequestInfo::default()
    };
    assert_eq!(
        mount.fs.write_file("\\f", b"x", 0, &stale),
        Err(FsStatus::Error)
    );
}

// ============================================================================
// Resize
// ============================================================================

#[test]
fn test_set_end_of_file() {
    let mount = TestMount::new();
    mount.write("\\r", b"0123456789");
    let mut info = mount.create("\\r", CreateMode::Open, false).unwrap();
    mount.fs.set_end_of_file("\\r", 4, &info).unwrap();
    mount.fs.close_file("\\r", &mut info).unwrap();
    assert_eq!(mount.read("\\r").unwrap(), b"0123");

    let mut info = mount.create("\\r", CreateMode::Open, false).unwrap();
    mount.fs.set_end_of_file("\\r", 6, &info).unwrap();
    mount.fs.close_file("\\r", &mut info).unwrap();
    assert_eq!(mount.read("\\r").unwrap(), b"0123\0\0");
}

#[test]
fn test_set_allocation_size_only_shrinks() {
    let mount = TestMount::new();
    mount.write("\\a", b"abcdef");
    let mut info = mount.create("\\a", CreateMode::Open, false).unwrap();
    mount.fs.set_allocation_size("\\a", 100, &info).unwrap();
    mount.fs.close_file("\\a", &mut info).unwrap();
    assert_eq!(mount.read("\\a").unwrap(), b"abcdef");

    let mut info = mount.create("\\a", CreateMode::Open, false).unwrap();
    mount.fs.set_allocation_size("\\a", 2, &info).unwrap();
    mount.fs.close_file("\\a", &mut info).unwrap();
    assert_eq!(mount.read("\\a").unwrap(), b"ab");
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn test_delete_absent_file() {
    let mount = TestMount::new();
    assert_eq!(
        mount.fs.delete_file("\\none", &RequestInfo::file()),
        Err(FsStatus::FileNotFound)
    );
}

#[test]
fn test_delete_on_close() {
    let mount = TestMount::new();
    mount.write("\\tmp", b"scratch");
    let mut info = mount.create("\\tmp", CreateMode::Open, false).unwrap();
    mount.fs.write_file("\\tmp", b"more", 0, &info).unwrap();
    info.delete_on_close = true;
    mount.fs.cleanup("\\tmp", &mut info).unwrap();
    mount.fs.close_file("\\tmp", &mut info).unwrap();

    // The pending write is not uploaded after the delete
    assert!(!mount.store.exists("test1/tmp").unwrap());
}

#[test]
fn test_cleanup_flushes() {
    let mount = TestMount::new();
    let mut info = mount.create("\\c", CreateMode::CreateNew, false).unwrap();
    mount.fs.write_file("\\c", b"data", 0, &info).unwrap();
    mount.fs.cleanup("\\c", &mut info).unwrap();
    assert_eq!(mount.store.download("test1/c").unwrap(), b"data");
    mount.fs.close_file("\\c", &mut info).unwrap();
}

#[test]
fn test_recreate_after_delete() {
    let mount = TestMount::new();
    mount.write("\\f", b"v1");
    mount.fs.delete_file("\\f", &RequestInfo::file()).unwrap();
    mount.create("\\f", CreateMode::CreateNew, false).unwrap();
}

// ============================================================================
// Unmount
// ============================================================================

#[test]
fn test_unmount_flushes_open_handles() {
    let mount = TestMount::new();
    let info = mount.create("\\open", CreateMode::CreateNew, false).unwrap();
    mount.fs.write_file("\\open", b"pending", 0, &info).unwrap();

    mount.fs.unmounted(&RequestInfo::default()).unwrap();
    assert_eq!(mount.store.download("test1/open").unwrap(), b"pending");
    assert_eq!(mount.fs.open_handle_count(), 0);
    assert_eq!(mount.scratch_files(), 0);
    assert!(mount.fs.registry().is_empty());
}

//! Integration tests for duplicate detection.

use std::fs::{self, File};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use strataoptima::duplicates::{DuplicateFinder, DuplicateMap, FinderConfig};
use strataoptima::scanner::{crawl, FileEntry, HashAlgorithm, WalkerConfig};
use tempfile::TempDir;

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(path).unwrap();
    file.write_all(content).unwrap();
}

fn set_age(path: &Path, seconds_ago: u64) {
    let when = SystemTime::now() - Duration::from_secs(seconds_ago);
    filetime::set_file_mtime(path, FileTime::from_system_time(when)).unwrap();
}

#[test]
fn test_two_identical_files_form_one_group() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    write_file(&a, b"same");
    write_file(&b, b"same");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find(&[a, b]);

    assert_eq!(groups.len(), 1);
    let group = groups.values().next().unwrap();
    assert_eq!(group.total_count(), 2);
    assert_eq!(group.hash, "51037a4a37730f52c8732586d3aaa316");
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.wasted_space, 4);
}

#[test]
fn test_oldest_file_is_original() {
    let dir = TempDir::new().unwrap();
    let newer = dir.path().join("newer.bin");
    let older = dir.path().join("older.bin");
    let newest = dir.path().join("newest.bin");
    write_file(&newer, b"payload");
    write_file(&older, b"payload");
    write_file(&newest, b"payload");
    set_age(&newer, 600);
    set_age(&older, 3600);
    set_age(&newest, 60);

    let (groups, _) = DuplicateFinder::with_defaults()
        .scan_directory(dir.path())
        .unwrap();

    let group = groups.values().next().unwrap();
    assert_eq!(group.original.name(), "older.bin");
    let copies: Vec<String> = group.copies.iter().map(FileEntry::name).collect();
    assert_eq!(copies, vec!["newer.bin", "newest.bin"]);
}

#[test]
fn test_distinct_content_never_groups() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("one.txt"), b"alpha");
    write_file(&dir.path().join("two.txt"), b"beta");
    write_file(&dir.path().join("three.txt"), b"gamma");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .scan_directory(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_groups, 0);
    assert_eq!(summary.wasted_space, 0);
}

#[test]
fn test_nested_duplicates_are_found() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("top.dat"), b"deep content");
    write_file(&dir.path().join("a/b/c/deep.dat"), b"deep content");
    write_file(&dir.path().join("a/other.dat"), b"something else");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .scan_directory(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.total_files, 3);
    let group = groups.values().next().unwrap();
    assert!(group
        .paths()
        .iter()
        .any(|p| p.ends_with("a/b/c/deep.dat")));
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("empty1"), b"");
    write_file(&dir.path().join("empty2"), b"");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .scan_directory(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups.contains_key("d41d8cd98f00b204e9800998ecf8427e"));
    assert_eq!(summary.wasted_space, 0);
}

#[test]
fn test_unreadable_files_never_group() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    write_file(&a, b"same");
    write_file(&b, b"same");

    let entries = crawl(dir.path());
    assert_eq!(entries.len(), 2);

    // Both vanish between discovery and hashing
    fs::remove_file(&a).unwrap();
    fs::remove_file(&b).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults().find_entries(entries);

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.unhashable_files, 2);
}

#[test]
fn test_missing_paths_are_skipped() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    write_file(&a, b"same");
    write_file(&b, b"same");

    let (groups, summary) =
        DuplicateFinder::with_defaults().find(&[a, b, dir.path().join("ghost.txt")]);

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_all_algorithms_agree_on_grouping() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("x1"), b"shared bytes");
    write_file(&dir.path().join("x2"), b"shared bytes");
    write_file(&dir.path().join("y"), b"unique bytes");

    for algorithm in [HashAlgorithm::Md5, HashAlgorithm::Sha1, HashAlgorithm::Sha256] {
        let finder = DuplicateFinder::new(FinderConfig::default().with_algorithm(algorithm));
        let (groups, _) = finder.scan_directory(dir.path()).unwrap();

        assert_eq!(groups.len(), 1, "algorithm {}", algorithm);
        let hash = groups.keys().next().unwrap();
        assert_eq!(hash.len(), algorithm.hex_len());
    }
}

#[test]
fn test_small_batches_and_single_thread_match_defaults() {
    let dir = TempDir::new().unwrap();
    for i in 0..20 {
        let content = format!("content-{}", i % 5);
        write_file(&dir.path().join(format!("file_{:02}.txt", i)), content.as_bytes());
    }

    let (default_groups, default_summary) = DuplicateFinder::with_defaults()
        .scan_directory(dir.path())
        .unwrap();

    let constrained = DuplicateFinder::new(
        FinderConfig::default()
            .with_io_threads(1)
            .with_batch_size(3)
            .with_buffer_size(2),
    );
    let (groups, summary) = constrained.scan_directory(dir.path()).unwrap();

    assert_eq!(groups.len(), 5);
    assert_eq!(summary.duplicate_files, 15);
    assert_eq!(groups.len(), default_groups.len());
    assert_eq!(summary.duplicate_files, default_summary.duplicate_files);
    for (hash, group) in &groups {
        assert_eq!(group.total_count(), default_groups[hash].total_count());
    }
}

#[test]
fn test_large_file_spanning_many_buffers() {
    let dir = TempDir::new().unwrap();
    let content: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    write_file(&dir.path().join("big1.bin"), &content);
    write_file(&dir.path().join("big2.bin"), &content);

    let mut altered = content.clone();
    altered[299_999] ^= 0xFF;
    write_file(&dir.path().join("big3.bin"), &altered);

    let (groups, _) = DuplicateFinder::with_defaults()
        .scan_directory(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups.values().next().unwrap().total_count(), 2);
}

#[test]
fn test_ignore_patterns_and_hidden_files() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("keep1.txt"), b"dup");
    write_file(&dir.path().join("keep2.txt"), b"dup");
    write_file(&dir.path().join("skip.tmp"), b"dup");
    write_file(&dir.path().join(".hidden"), b"dup");

    let walker_config = WalkerConfig::new(false, true, vec!["*.tmp".to_string()]);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (groups, summary) = finder.scan_directory(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.values().next().unwrap().total_count(), 2);

    let (groups, summary) = DuplicateFinder::with_defaults()
        .scan_directory(dir.path())
        .unwrap();
    assert_eq!(summary.total_files, 4);
    assert_eq!(groups.values().next().unwrap().total_count(), 4);
}

#[test]
fn test_scan_missing_root_is_error() {
    let dir = TempDir::new().unwrap();
    let result = DuplicateFinder::with_defaults().scan_directory(&dir.path().join("nope"));
    assert!(result.is_err());
}

#[test]
fn test_scan_file_as_root_is_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("file.txt");
    write_file(&file, b"x");

    let result = DuplicateFinder::with_defaults().scan_directory(&file);
    assert!(result.is_err());
}

#[test]
fn test_scan_does_not_modify_files() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.txt");
    write_file(&a, b"same");
    write_file(&dir.path().join("b.txt"), b"same");
    set_age(&a, 1000);
    let before = fs::metadata(&a).unwrap().modified().unwrap();

    DuplicateFinder::with_defaults()
        .scan_directory(dir.path())
        .unwrap();

    assert_eq!(fs::read(&a).unwrap(), b"same");
    assert_eq!(fs::metadata(&a).unwrap().modified().unwrap(), before);
}

/// Each group's hash with its original and copies, in report order.
fn assignments(groups: &DuplicateMap) -> BTreeMap<String, (PathBuf, Vec<PathBuf>)> {
    groups
        .iter()
        .map(|(hash, group)| {
            let copies = group.copies.iter().map(|c| c.path.clone()).collect();
            (hash.clone(), (group.original.path.clone(), copies))
        })
        .collect()
}

#[test]
fn test_repeated_scans_assign_identically() {
    let dir = TempDir::new().unwrap();
    let tied_at = FileTime::from_unix_time(1_600_000_000, 0);
    for name in ["tie_b.txt", "tie_a.txt", "nested/tie_c.txt"] {
        let path = dir.path().join(name);
        write_file(&path, b"same mtime");
        filetime::set_file_mtime(&path, tied_at).unwrap();
    }
    for (name, age) in [("x1.log", 50), ("x2.log", 500), ("deep/x3.log", 5)] {
        let path = dir.path().join(name);
        write_file(&path, b"aged copies");
        set_age(&path, age);
    }
    write_file(&dir.path().join("pair1.bin"), b"pair");
    write_file(&dir.path().join("pair2.bin"), b"pair");
    write_file(&dir.path().join("single.txt"), b"unique");

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4).with_batch_size(2));
    let (first, first_summary) = finder.scan_directory(dir.path()).unwrap();
    let (second, second_summary) = finder.scan_directory(dir.path()).unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(assignments(&first), assignments(&second));
    assert_eq!(first_summary.duplicate_files, second_summary.duplicate_files);
    assert_eq!(first_summary.wasted_space, second_summary.wasted_space);

    let aged = first.values().find(|g| g.total_count() == 3 && g.original.name() == "x2.log");
    assert!(aged.is_some());
}

//! Integration tests for type-based organizing.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use strataoptima::actions::{
    organize, organize_batch, resolve_collision, OrganizeConfig, OrganizeError, OrganizeMode,
    OrganizeProgressCallback,
};
use strataoptima::scanner::FileType;
use tempfile::TempDir;
use walkdir::WalkDir;

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(path).unwrap();
    file.write_all(content).unwrap();
}

/// Every path under `root` with its size and mtime.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, (u64, SystemTime)> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| {
            let metadata = entry.metadata().unwrap();
            (
                entry.path().to_path_buf(),
                (metadata.len(), metadata.modified().unwrap()),
            )
        })
        .collect()
}

#[test]
fn test_execute_moves_into_category_folders() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("inbox");
    let target = dir.path().join("sorted");

    let files = vec![
        source.join("photo.jpg"),
        source.join("clip.MP4"),
        source.join("song.flac"),
        source.join("report.pdf"),
        source.join("backup.zip"),
        source.join("main.rs"),
        source.join("mystery"),
    ];
    for file in &files {
        write_file(file, b"data");
    }

    let config = OrganizeConfig::new(&target).with_dry_run(false);
    let result = organize_batch::<dyn OrganizeProgressCallback>(&files, &config, None);

    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 7);
    for file in &files {
        assert!(!file.exists(), "{} should have moved", file.display());
    }

    assert!(target.join("Images/photo.jpg").is_file());
    assert!(target.join("Videos/clip.MP4").is_file());
    assert!(target.join("Audio/song.flac").is_file());
    assert!(target.join("Documents/report.pdf").is_file());
    assert!(target.join("Archives/backup.zip").is_file());
    assert!(target.join("Code/main.rs").is_file());
    assert!(target.join("Other/mystery").is_file());
    assert_eq!(fs::read(target.join("Images/photo.jpg")).unwrap(), b"data");
}

#[test]
fn test_collisions_get_numbered_suffixes() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("sorted");

    let sources: Vec<PathBuf> = ["cam1", "cam2", "cam3"]
        .iter()
        .map(|d| dir.path().join(d).join("photo.jpg"))
        .collect();
    for (i, source) in sources.iter().enumerate() {
        write_file(source, format!("shot {}", i).as_bytes());
    }

    let mut targets = Vec::new();
    for source in &sources {
        let result = organize(source, &target, false).unwrap();
        assert_eq!(result.mode, OrganizeMode::Executed);
        targets.push(result.target_path);
    }

    let images = target.join("Images");
    assert_eq!(
        targets,
        vec![
            images.join("photo.jpg"),
            images.join("photo_1.jpg"),
            images.join("photo_2.jpg"),
        ]
    );
    assert_eq!(fs::read(images.join("photo.jpg")).unwrap(), b"shot 0");
    assert_eq!(fs::read(images.join("photo_2.jpg")).unwrap(), b"shot 2");
}

#[test]
fn test_existing_files_in_target_are_never_overwritten() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("sorted");
    write_file(&target.join("Documents/notes.txt"), b"keep me");

    let source = dir.path().join("notes.txt");
    write_file(&source, b"new notes");

    let result = organize(&source, &target, false).unwrap();

    assert_eq!(result.target_path, target.join("Documents/notes_1.txt"));
    assert_eq!(
        fs::read(target.join("Documents/notes.txt")).unwrap(),
        b"keep me"
    );
    assert_eq!(fs::read(&result.target_path).unwrap(), b"new notes");
}

#[test]
fn test_dry_run_never_mutates_the_tree() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("inbox");
    let files = vec![
        source.join("a.png"),
        source.join("b.docx"),
        source.join("nested/c.mp3"),
    ];
    for file in &files {
        write_file(file, b"content");
    }
    write_file(&dir.path().join("sorted/Images/a.png"), b"already here");

    let before = snapshot(dir.path());

    let config = OrganizeConfig::new(dir.path().join("sorted"));
    assert!(config.dry_run);
    let result = organize_batch::<dyn OrganizeProgressCallback>(&files, &config, None);

    assert_eq!(result.success_count(), 3);
    assert!(result.successes.iter().all(|r| r.is_dry_run()));
    assert_eq!(
        result.successes[0].target_path,
        dir.path().join("sorted/Images/a_1.png")
    );

    assert_eq!(snapshot(dir.path()), before);
    assert!(!dir.path().join("sorted/Documents").exists());
}

#[test]
fn test_dry_run_matches_execute_destinations() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("sorted");
    let source = dir.path().join("slides.pptx");
    write_file(&source, b"deck");

    let planned = organize(&source, &target, true).unwrap();
    let executed = organize(&source, &target, false).unwrap();

    assert_eq!(planned.target_path, executed.target_path);
    assert_eq!(planned.file_type(), FileType::Document);
}

#[test]
fn test_relative_target_root_is_made_absolute() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("movie.mkv");
    write_file(&source, b"frames");

    let result = organize(&source, Path::new("organized"), true).unwrap();

    assert!(result.target_path.is_absolute());
    assert!(result.target_path.ends_with("organized/Videos/movie.mkv"));
}

#[test]
fn test_missing_source_fails_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("sorted");

    let result = organize(&dir.path().join("ghost.txt"), &target, false);

    assert!(matches!(result, Err(OrganizeError::SourceNotFound(_))));
    assert!(!target.exists());
}

#[test]
fn test_directory_source_is_rejected() {
    let dir = TempDir::new().unwrap();
    let folder = dir.path().join("folder");
    fs::create_dir(&folder).unwrap();

    let result = organize(&folder, &dir.path().join("sorted"), false);

    assert!(matches!(result, Err(OrganizeError::NotAFile(_))));
    assert!(folder.is_dir());
}

#[test]
fn test_batch_continues_after_failure() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("sorted");
    let first = dir.path().join("first.txt");
    let last = dir.path().join("last.txt");
    write_file(&first, b"1");
    write_file(&last, b"2");

    let files = vec![first, dir.path().join("ghost.txt"), last];
    let config = OrganizeConfig::new(&target).with_dry_run(false);
    let result = organize_batch::<dyn OrganizeProgressCallback>(&files, &config, None);

    assert_eq!(result.success_count(), 2);
    assert_eq!(result.failure_count(), 1);
    assert!(!result.all_succeeded());
    assert_eq!(result.failures[0].0, dir.path().join("ghost.txt"));
    assert!(target.join("Documents/first.txt").is_file());
    assert!(target.join("Documents/last.txt").is_file());
    assert_eq!(result.summary(), "Moved 2 file(s), 1 failed");
}

#[test]
fn test_resolve_collision_on_disk() {
    let dir = TempDir::new().unwrap();
    assert_eq!(
        resolve_collision(dir.path(), OsStr::new("archive.tar.gz")),
        dir.path().join("archive.tar.gz")
    );

    write_file(&dir.path().join("archive.tar.gz"), b"x");
    write_file(&dir.path().join("archive.tar_1.gz"), b"x");

    assert_eq!(
        resolve_collision(dir.path(), OsStr::new("archive.tar.gz")),
        dir.path().join("archive.tar_2.gz")
    );
}

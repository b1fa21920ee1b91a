use oxizip::{CompressionLevel, ErrorKind, UnzipFailure, Unzipper, ZipError, unzip_file, zip_files};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Build an archive directly with the codec, bypassing the writer's naming.
fn raw_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn test_parent_traversal_rejected() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("unsafe.zip");
    raw_archive(&archive, &[("../naughtyFile.txt", b"escaped")]);

    let dest = tmp.path().join("dest");
    let err = unzip_file(&archive, &dest, true, None).unwrap_err();

    assert!(matches!(
        err,
        ZipError::UnzipFail {
            reason: UnzipFailure::PathTraversal,
            ..
        }
    ));
    assert!(!tmp.path().join("naughtyFile.txt").exists());
}

#[test]
fn test_nested_traversal_rejected() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("unsafe.zip");
    raw_archive(
        &archive,
        &[
            ("fine.txt", b"fine"),
            ("a/b/../../../outside.txt", b"escaped"),
        ],
    );

    let dest = tmp.path().join("dest");
    let err = unzip_file(&archive, &dest, true, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnzipFail);
    assert!(!tmp.path().join("outside.txt").exists());
    // Entries before the offending one are already on disk.
    assert!(dest.join("fine.txt").is_file());
}

#[test]
fn test_inner_parent_components_allowed() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("dots.zip");
    raw_archive(&archive, &[("a/../b.txt", b"inside"), ("./c.txt", b"here")]);

    let dest = tmp.path().join("dest");
    unzip_file(&archive, &dest, true, None).unwrap();
    assert_eq!(fs::read(dest.join("b.txt")).unwrap(), b"inside");
    assert_eq!(fs::read(dest.join("c.txt")).unwrap(), b"here");
}

#[test]
fn test_relative_destination_with_dots() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("plain.zip");
    raw_archive(&archive, &[("file.txt", b"data")]);

    let dest = tmp.path().join("x").join("..").join("dest");
    unzip_file(&archive, &dest, true, None).unwrap();
    assert_eq!(fs::read(tmp.path().join("dest/file.txt")).unwrap(), b"data");
}

#[test]
fn test_corrupted_data_fails_crc() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("corrupt.zip");
    raw_archive(&archive, &[("data.txt", b"ABCDEFGHIJKLMNOPQRSTUVWXYZ")]);

    let mut bytes = fs::read(&archive).unwrap();
    let offset = bytes
        .windows(26)
        .position(|w| w == b"ABCDEFGHIJKLMNOPQRSTUVWXYZ")
        .unwrap();
    bytes[offset + 5] ^= 0xFF;
    fs::write(&archive, &bytes).unwrap();

    let err = unzip_file(&archive, tmp.path().join("out"), true, None).unwrap_err();
    assert!(matches!(
        err,
        ZipError::UnzipFail {
            reason: UnzipFailure::CrcMismatch,
            ..
        }
    ));
}

#[test]
fn test_truncated_archive_fails() {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("big.txt");
    fs::write(&source, "Test data. ".repeat(1000)).unwrap();
    let archive = tmp.path().join("truncated.zip");
    zip_files(&[&source], &archive, None, CompressionLevel::Default).unwrap();

    let bytes = fs::read(&archive).unwrap();
    fs::write(&archive, &bytes[..bytes.len() / 2]).unwrap();

    let err = unzip_file(&archive, tmp.path().join("out"), true, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnzipFail);
}

#[test]
fn test_missing_and_unrecognized_archives() {
    let tmp = TempDir::new().unwrap();

    let err = unzip_file(tmp.path().join("bb8.zip"), tmp.path(), true, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);

    let gif = tmp.path().join("3crBXeO.gif");
    fs::write(&gif, b"GIF89a").unwrap();
    let err = unzip_file(&gif, tmp.path(), true, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);

    let upper = tmp.path().join("ARCHIVE.ZIP");
    raw_archive(&upper, &[("a.txt", b"a")]);
    let err = unzip_file(&upper, tmp.path().join("out"), true, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileNotFound);
}

#[test]
fn test_windows_names_sanitized() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("names.zip");
    raw_archive(
        &archive,
        &[("what?.txt", b"first"), ("what*.txt", b"second")],
    );

    let dest = tmp.path().join("dest");
    Unzipper::new()
        .sanitize_names(true)
        .unzip_file(&archive, &dest)
        .unwrap();
    assert_eq!(fs::read(dest.join("what_.txt")).unwrap(), b"first");
    assert_eq!(fs::read(dest.join("what_ (1).txt")).unwrap(), b"second");
}

#[cfg(unix)]
mod permissions {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn mode(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_permissions_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(&src).unwrap();
        for (name, mode) in [("all.txt", 0o777), ("private.txt", 0o600), ("odd.txt", 0o604)] {
            let path = src.join(name);
            fs::write(&path, name).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        }

        let archive = tmp.path().join("perms.zip");
        zip_files(&[&src], &archive, None, CompressionLevel::Default).unwrap();
        let out = tmp.path().join("out");
        unzip_file(&archive, &out, true, None).unwrap();

        assert_eq!(mode(&out.join("src/all.txt")), 0o777);
        assert_eq!(mode(&out.join("src/private.txt")), 0o600);
        assert_eq!(mode(&out.join("src/odd.txt")), 0o604);
    }

    #[test]
    fn test_out_of_range_mode_not_applied() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("mode.zip");
        {
            let file = File::create(&archive).unwrap();
            let mut writer = zip::ZipWriter::new(file);
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Stored)
                .unix_permissions(0o200);
            writer.start_file("writeonly.txt", options).unwrap();
            writer.write_all(b"w").unwrap();
            writer.finish().unwrap();
        }

        let out = tmp.path().join("out");
        unzip_file(&archive, &out, true, None).unwrap();
        assert_ne!(mode(&out.join("writeonly.txt")), 0o200);
    }

    #[test]
    fn test_dos_archive_keeps_default_mode() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("dos.zip");
        raw_archive(&archive, &[("readme.txt", b"made on DOS")]);

        // Mark the entry as made on MS-DOS with only the archive bit set.
        let mut bytes = fs::read(&archive).unwrap();
        let start = bytes.windows(4).position(|w| w == b"PK\x01\x02").unwrap();
        bytes[start + 5] = 0;
        bytes[start + 38..start + 42].copy_from_slice(&0x20u32.to_le_bytes());
        fs::write(&archive, &bytes).unwrap();

        let out = tmp.path().join("out");
        unzip_file(&archive, &out, true, None).unwrap();

        let reference = out.join("reference.txt");
        File::create(&reference).unwrap();
        assert_eq!(fs::read(out.join("readme.txt")).unwrap(), b"made on DOS");
        assert_eq!(mode(&out.join("readme.txt")), mode(&reference));
    }
}

#[test]
fn test_empty_destination_rejected() {
    let tmp = TempDir::new().unwrap();
    let archive = tmp.path().join("plain.zip");
    raw_archive(&archive, &[("../evil.txt", b"escaped")]);

    let err = unzip_file(&archive, "", true, None).unwrap_err();
    assert!(matches!(
        err,
        ZipError::UnzipFail {
            reason: UnzipFailure::Destination(_),
            ..
        }
    ));
}

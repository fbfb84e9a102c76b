//! Archive extraction module
//!
//! Unpacks gzip-compressed tar streams entry by entry. Every entry's
//! destination is resolved against the canonical destination root before
//! anything is written; entries that would land outside it (zip-slip) are
//! drained and skipped without aborting the archive.

use std::path::{Component, Path, PathBuf};

use async_compression::tokio::bufread::GzipDecoder;
use buildenv_schema::LibraryId;
use futures::StreamExt;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt, BufReader};
use tokio_tar::EntryType;

use crate::error::ExtractError;

/// What an extraction wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    /// Regular files created.
    pub files_written: usize,
    /// Entries rejected or not representable (traversal, links, devices).
    pub entries_skipped: usize,
}

/// Extract a gzip-compressed tar stream.
///
/// With `flatten`, every file lands directly in `root` under its base name.
/// Otherwise entries keep their paths under `root/<library>/`.
///
/// # Errors
///
/// Returns [`ExtractError::MissingRoot`] if `root` does not exist, and
/// [`ExtractError::Io`] on decompression, archive or write failures. Files
/// written before the failure are left in place.
pub async fn extract_tar_gz<R: AsyncRead + Unpin>(
    reader: R,
    root: &Path,
    library: &LibraryId,
    flatten: bool,
) -> Result<ExtractSummary, ExtractError> {
    let decoder = GzipDecoder::new(BufReader::new(reader));
    extract_tar(decoder, root, library, flatten).await
}

/// Extract an uncompressed tar stream. See [`extract_tar_gz`].
///
/// # Errors
///
/// Same as [`extract_tar_gz`].
pub async fn extract_tar<R: AsyncRead + Unpin>(
    reader: R,
    root: &Path,
    library: &LibraryId,
    flatten: bool,
) -> Result<ExtractSummary, ExtractError> {
    let io_err = |source| ExtractError::Io {
        library: library.clone(),
        source,
    };

    let root = fs::canonicalize(root)
        .await
        .map_err(|_| ExtractError::MissingRoot {
            library: library.clone(),
            path: root.to_path_buf(),
        })?;

    let mut archive = tokio_tar::Archive::new(reader);
    let mut entries = archive.entries().map_err(io_err)?;
    let mut summary = ExtractSummary::default();

    while let Some(entry) = entries.next().await {
        let mut entry = entry.map_err(io_err)?;
        let entry_path = entry.path().map_err(io_err)?.into_owned();
        let entry_type = entry.header().entry_type();

        if entry_type.is_dir() {
            if !flatten {
                match contained_dir(&root, &root.join(library).join(&entry_path)).await {
                    Some(dir) => fs::create_dir_all(&dir).await.map_err(io_err)?,
                    None => {
                        tracing::warn!(
                            "Library {library} is using a zip-slip, skipping {}",
                            entry_path.display()
                        );
                        summary.entries_skipped += 1;
                    }
                }
            }
            continue;
        }

        // Archive metadata (e.g. git's pax comment), not content
        if matches!(entry_type, EntryType::XGlobalHeader) {
            drain(&mut entry).await.map_err(io_err)?;
            continue;
        }

        if !matches!(entry_type, EntryType::Regular | EntryType::Continuous) {
            tracing::warn!(
                "Library {library}: skipping non-regular entry {}",
                entry_path.display()
            );
            drain(&mut entry).await.map_err(io_err)?;
            summary.entries_skipped += 1;
            continue;
        }

        let Some(target) = file_target(&root, library, &entry_path, flatten).await else {
            tracing::warn!(
                "Library {library} is using a zip-slip, skipping {}",
                entry_path.display()
            );
            drain(&mut entry).await.map_err(io_err)?;
            summary.entries_skipped += 1;
            continue;
        };

        if !flatten {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).await.map_err(io_err)?;
            }
        }

        let mut file = fs::File::create(&target).await.map_err(io_err)?;
        if entry.header().size().map_err(io_err)? > 0 {
            tokio::io::copy(&mut entry, &mut file)
                .await
                .map_err(io_err)?;
            file.flush().await.map_err(io_err)?;
        }

        tracing::debug!("{library}: wrote {}", target.display());
        summary.files_written += 1;
    }

    Ok(summary)
}

/// Where a regular-file entry should be written, or `None` if it must be skipped.
async fn file_target(
    root: &Path,
    library: &LibraryId,
    entry_path: &Path,
    flatten: bool,
) -> Option<PathBuf> {
    let joined = if flatten {
        root.join(entry_path.file_name()?)
    } else {
        root.join(library).join(entry_path)
    };

    let normalized = normalize(&joined);
    let dir = contained_dir(root, normalized.parent()?).await?;
    let target = dir.join(normalized.file_name()?);

    // An existing symlink at the target would redirect the write.
    match fs::symlink_metadata(&target).await {
        Ok(meta) if meta.file_type().is_symlink() || meta.is_dir() => None,
        _ => Some(target),
    }
}

/// Resolve `dir` and return it if it stays inside the canonical `root`.
///
/// `..` and `.` are resolved lexically; the deepest ancestor that already
/// exists is canonicalized so symlinked directories are followed.
async fn contained_dir(root: &Path, dir: &Path) -> Option<PathBuf> {
    let normalized = normalize(dir);

    let mut resolved = None;
    for ancestor in normalized.ancestors() {
        if let Ok(canonical) = fs::canonicalize(ancestor).await {
            let rest = normalized.strip_prefix(ancestor).ok()?;
            resolved = Some(canonical.join(rest));
            break;
        }
    }

    resolved.filter(|p| p.starts_with(root))
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

async fn drain<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<u64> {
    tokio::io::copy(reader, &mut tokio::io::sink()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    /// Build a gzip tar in memory. Paths are written into the raw header so
    /// hostile names like `../../evil` survive.
    fn tar_gz(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            let name = &mut header.as_old_mut().name;
            name[..path.len()].copy_from_slice(path.as_bytes());
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_entry_type(tar::EntryType::Regular);
            header.set_cksum();
            builder.append(&header, data.as_bytes()).unwrap();
        }
        let tar = builder.into_inner().unwrap();

        let mut gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        gz.write_all(&tar).unwrap();
        gz.finish().unwrap()
    }

    #[tokio::test]
    async fn test_extract_into_library_dir() {
        let dir = tempdir().unwrap();
        let archive = tar_gz(&[
            ("include/foo.h", "#pragma once\n"),
            ("lib/libfoo.a", "!<arch>\n"),
        ]);

        let summary = extract_tar_gz(archive.as_slice(), dir.path(), &"mylib".into(), false)
            .await
            .unwrap();

        assert_eq!(summary.files_written, 2);
        assert_eq!(summary.entries_skipped, 0);
        let header = dir.path().join("mylib/include/foo.h");
        assert_eq!(std::fs::read_to_string(header).unwrap(), "#pragma once\n");
        assert!(dir.path().join("mylib/lib/libfoo.a").exists());
    }

    #[tokio::test]
    async fn test_zip_slip_entry_is_skipped() {
        let outer = tempdir().unwrap();
        let root = outer.path().join("build");
        std::fs::create_dir(&root).unwrap();

        let archive = tar_gz(&[
            ("../../evil", "pwned"),
            ("include/ok.h", "ok"),
        ]);

        let summary = extract_tar_gz(archive.as_slice(), &root, &"lib".into(), false)
            .await
            .unwrap();

        assert_eq!(summary.files_written, 1);
        assert_eq!(summary.entries_skipped, 1);
        assert!(!outer.path().join("evil").exists());
        assert!(root.join("lib/include/ok.h").exists());
    }

    #[tokio::test]
    async fn test_parent_segments_within_root_are_allowed() {
        let dir = tempdir().unwrap();
        let archive = tar_gz(&[("../other/hijack.h", "x"), ("a.h", "a")]);

        let summary = extract_tar_gz(archive.as_slice(), dir.path(), &"lib".into(), false)
            .await
            .unwrap();

        // Still under the root, so this is allowed; the root is the boundary.
        assert_eq!(summary.files_written, 2);
        assert!(dir.path().join("other/hijack.h").exists());
    }

    #[tokio::test]
    async fn test_absolute_entry_is_skipped() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let evil = outside.path().join("abs-evil");
        let evil_str = evil.to_str().unwrap();

        let archive = tar_gz(&[(evil_str, "x")]);
        let summary = extract_tar_gz(archive.as_slice(), dir.path(), &"lib".into(), false)
            .await
            .unwrap();

        assert_eq!(summary.entries_skipped, 1);
        assert!(!evil.exists());
    }

    #[tokio::test]
    async fn test_zero_byte_entry_creates_empty_file() {
        let dir = tempdir().unwrap();
        let archive = tar_gz(&[("include/empty.h", "")]);

        let summary = extract_tar_gz(archive.as_slice(), dir.path(), &"lib".into(), false)
            .await
            .unwrap();

        assert_eq!(summary.files_written, 1);
        let meta = std::fs::metadata(dir.path().join("lib/include/empty.h")).unwrap();
        assert!(meta.is_file());
        assert_eq!(meta.len(), 0);
    }

    #[tokio::test]
    async fn test_flatten_uses_base_names() {
        let dir = tempdir().unwrap();
        let archive = tar_gz(&[("include/deep/foo.h", "foo"), ("lib/libfoo.a", "a")]);

        let summary = extract_tar_gz(archive.as_slice(), dir.path(), &"lib".into(), true)
            .await
            .unwrap();

        assert_eq!(summary.files_written, 2);
        assert!(dir.path().join("foo.h").exists());
        assert!(dir.path().join("libfoo.a").exists());
        assert!(!dir.path().join("lib").exists());
    }

    #[tokio::test]
    async fn test_flatten_rejects_parent_only_name() {
        let dir = tempdir().unwrap();
        let archive = tar_gz(&[("..", "x"), ("ok.h", "ok")]);

        let summary = extract_tar_gz(archive.as_slice(), dir.path(), &"lib".into(), true)
            .await
            .unwrap();

        assert_eq!(summary.entries_skipped, 1);
        assert_eq!(summary.files_written, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_directory_escape_is_skipped() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("lib")).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("lib/escape")).unwrap();

        let archive = tar_gz(&[("escape/evil.h", "x")]);
        let summary = extract_tar_gz(archive.as_slice(), dir.path(), &"lib".into(), false)
            .await
            .unwrap();

        assert_eq!(summary.entries_skipped, 1);
        assert!(!outside.path().join("evil.h").exists());
    }

    #[tokio::test]
    async fn test_missing_root() {
        let dir = tempdir().unwrap();
        let archive = tar_gz(&[("a.h", "a")]);
        let err = extract_tar_gz(
            archive.as_slice(),
            &dir.path().join("missing"),
            &"lib".into(),
            false,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ExtractError::MissingRoot { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_stream_fails() {
        let dir = tempdir().unwrap();
        let err = extract_tar_gz(&b"definitely not gzip"[..], dir.path(), &"lib".into(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Io { .. }));
        assert_eq!(err.library(), &LibraryId::new("lib"));
    }

    #[tokio::test]
    async fn test_pax_global_header_is_not_counted() {
        let mut builder = tar::Builder::new(Vec::new());

        let comment = "52 comment=1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b\n";
        let mut pax = tar::Header::new_ustar();
        pax.set_path("pax_global_header").unwrap();
        pax.set_entry_type(tar::EntryType::XGlobalHeader);
        pax.set_size(comment.len() as u64);
        pax.set_mode(0o644);
        pax.set_cksum();
        builder.append(&pax, comment.as_bytes()).unwrap();

        let mut link = tar::Header::new_gnu();
        link.set_path("lib/libfoo.so").unwrap();
        link.set_entry_type(tar::EntryType::Symlink);
        link.set_link_name("/etc/passwd").unwrap();
        link.set_size(0);
        link.set_mode(0o777);
        link.set_cksum();
        builder.append(&link, std::io::empty()).unwrap();

        let mut file = tar::Header::new_gnu();
        file.set_path("include/foo.h").unwrap();
        file.set_size(4);
        file.set_mode(0o644);
        file.set_cksum();
        builder.append(&file, &b"foo\n"[..]).unwrap();

        let tar = builder.into_inner().unwrap();
        let dir = tempdir().unwrap();
        let summary = extract_tar(tar.as_slice(), dir.path(), &"lib".into(), false)
            .await
            .unwrap();

        assert_eq!(summary.files_written, 1);
        // Only the symlink is rejected content
        assert_eq!(summary.entries_skipped, 1);
        assert!(!dir.path().join("lib/pax_global_header").exists());
        assert!(!dir.path().join("pax_global_header").exists());
        assert!(dir.path().join("lib/include/foo.h").exists());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), Path::new("/a/c/d"));
        assert_eq!(normalize(Path::new("/a/../../..")), Path::new("/"));
    }
}

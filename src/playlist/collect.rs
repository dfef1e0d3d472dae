use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;

fn has_media_extension(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn walk_dir(dir: &Path, settings: &LibrarySettings, out: &mut Vec<PathBuf>) {
    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("skipping unreadable entry under {}: {e}", dir.display());
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && has_media_extension(path, settings) {
            out.push(path.to_path_buf());
        }
    }
}

/// Expand user-supplied paths into media files.
///
/// Files are kept when their extension is accepted; directories are walked in
/// file-name order. Anything else is logged and skipped. The input order of
/// `paths` is preserved.
pub fn collect_media(paths: &[PathBuf], settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk_dir(path, settings, &mut out);
        } else if path.is_file() {
            if has_media_extension(path, settings) {
                out.push(path.clone());
            } else {
                log::warn!("ignoring {}: unsupported file type", path.display());
            }
        } else {
            log::warn!("ignoring {}: no such file or directory", path.display());
        }
    }
    log::debug!("collected {} media file(s) from {} path(s)", out.len(), paths.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn has_media_extension_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(has_media_extension(Path::new("/tmp/a.mp4"), &settings));
        assert!(has_media_extension(Path::new("/tmp/a.MKV"), &settings));
        assert!(has_media_extension(Path::new("/tmp/a.mov"), &settings));
        assert!(has_media_extension(Path::new("/tmp/a.avi"), &settings));
        assert!(has_media_extension(Path::new("/tmp/a.mp3"), &settings));
        assert!(has_media_extension(Path::new("/tmp/a.wav"), &settings));
        assert!(has_media_extension(Path::new("/tmp/a.Ogg"), &settings));
        assert!(!has_media_extension(Path::new("/tmp/a.flac"), &settings));
        assert!(!has_media_extension(Path::new("/tmp/a.txt"), &settings));
        assert!(!has_media_extension(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn collect_walks_directories_in_name_order_and_filters() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.mp3"), b"x").unwrap();
        fs::write(dir.path().join("a.mkv"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let files = collect_media(&[dir.path().to_path_buf()], &LibrarySettings::default());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.mkv", "b.mp3"]);
    }

    #[test]
    fn collect_keeps_explicit_files_in_argument_order() {
        let dir = tempdir().unwrap();
        let z = dir.path().join("z.wav");
        let a = dir.path().join("a.wav");
        let txt = dir.path().join("readme.txt");
        fs::write(&z, b"x").unwrap();
        fs::write(&a, b"x").unwrap();
        fs::write(&txt, b"x").unwrap();
        let missing = dir.path().join("missing.mp3");

        let files = collect_media(
            &[z.clone(), txt, missing, a.clone()],
            &LibrarySettings::default(),
        );
        assert_eq!(files, vec![z, a]);
    }

    #[test]
    fn collect_respects_include_hidden_and_recursive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"x").unwrap();
        fs::write(dir.path().join("root.mp3"), b"x").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("child.mp3"), b"x").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            recursive: false,
            ..LibrarySettings::default()
        };
        let files = collect_media(&[dir.path().to_path_buf()], &settings);
        assert_eq!(files, vec![dir.path().join("root.mp3")]);

        let files = collect_media(&[dir.path().to_path_buf()], &LibrarySettings::default());
        assert_eq!(files.len(), 3);
    }
}

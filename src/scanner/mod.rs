pub mod extensions;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use compact_str::CompactString;
use rayon::prelude::*;

use self::extensions::is_image_extension;
use self::types::ImageEntry;
use crate::tree::arena::ImageId;

/// Load the images named by `input`: a directory is walked for image files,
/// anything else is read as an image list.
pub fn load_images(input: &Path) -> Result<Vec<ImageEntry>> {
    let paths = if input.is_dir() {
        scan_directory(input)?
    } else {
        read_image_list(input)?
    };
    tracing::info!("Found {} candidate images in {}", paths.len(), input.display());

    let entries = probe_images(&paths);
    if entries.is_empty() {
        bail!("no readable images in {}", input.display());
    }
    Ok(entries)
}

/// Read an image list: one path per line, surrounding whitespace trimmed,
/// blank lines and `#` comments ignored.
pub fn read_image_list(list: &Path) -> Result<Vec<PathBuf>> {
    let text = std::fs::read_to_string(list)
        .with_context(|| format!("failed to read image list {}", list.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect())
}

/// Recursively collect image files under `root`, sorted by path so ids are stable.
pub fn scan_directory(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }

    let mut paths = Vec::new();
    for entry in jwalk::WalkDir::new(root).sort(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_image = path
            .extension()
            .map(|ext| is_image_extension(&ext.to_string_lossy()))
            .unwrap_or(false);
        if is_image {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Read each image's dimensions (header only) in parallel.
///
/// Unreadable and zero-sized images are dropped with a warning; the
/// survivors get dense ids in input order.
pub fn probe_images(paths: &[PathBuf]) -> Vec<ImageEntry> {
    let probed: Vec<_> = paths
        .par_iter()
        .map(|path| (path, image::image_dimensions(path)))
        .collect();

    let mut entries = Vec::with_capacity(probed.len());
    for (path, dims) in probed {
        let (width, height) = match dims {
            Ok(dims) => dims,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        if width == 0 || height == 0 {
            tracing::warn!("Skipping {}: empty image ({}x{})", path.display(), width, height);
            continue;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        entries.push(ImageEntry {
            id: ImageId(entries.len() as u32),
            path: path.clone(),
            name: CompactString::new(&name),
            width,
            height,
        });
    }

    tracing::debug!("Probed {} of {} images", entries.len(), paths.len());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(w, h, Rgb([200, 40, 40])).save(&path).unwrap();
        path
    }

    #[test]
    fn image_list_skips_blanks_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("images.txt");
        std::fs::write(&list, "a.png\n\n  b.jpg  \n# c.png\n").unwrap();
        let paths = read_image_list(&list).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
    }

    #[test]
    fn directory_scan_keeps_only_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write_png(dir.path(), "b.png", 4, 2);
        write_png(&dir.path().join("nested"), "a.png", 2, 4);
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let paths = scan_directory(dir.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.extension().unwrap() == "png"));
    }

    #[test]
    fn probing_assigns_dense_ids_and_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let wide = write_png(dir.path(), "wide.png", 30, 10);
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"definitely not a png").unwrap();
        let tall = write_png(dir.path(), "tall.png", 10, 20);

        let entries = probe_images(&[wide, broken, tall]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, ImageId(0));
        assert_eq!(entries[0].name, "wide.png");
        assert_eq!(entries[0].ratio(), 3.0);
        assert_eq!(entries[1].id, ImageId(1));
        assert_eq!(entries[1].ratio(), 0.5);
        assert!(entries[1].ratio_unit().is_ok());
    }

    #[test]
    fn load_images_fails_without_readable_images() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_images(dir.path()).is_err());
    }
}

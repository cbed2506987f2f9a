//! Per-request transient storage.
//!
//! A [`Scratch`] owns a uniquely named directory holding the persisted upload
//! and any intermediate page images. Releasing it removes everything it holds;
//! a failed removal is logged and never surfaces as an error, so it cannot
//! replace the outcome of the request being reported.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, warn};

use crate::error::{InvoscanError, Result};
use crate::models::document::{extension_of, UploadedDocument};

/// Scratch directory for a single request.
#[derive(Debug)]
pub struct Scratch {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl Scratch {
    /// Create a fresh scratch directory under `root`.
    pub fn create_in(root: &Path) -> io::Result<Self> {
        fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix("invoscan-")
            .tempdir_in(root)?;
        let path = dir.path().to_path_buf();
        debug!("Created scratch directory {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write uploaded bytes into the scratch directory.
    ///
    /// The stored name is fixed; only the client's extension is kept.
    pub fn persist_upload(&self, original_filename: &str, data: &[u8]) -> io::Result<UploadedDocument> {
        let extension = extension_of(original_filename);
        let path = self.path.join(format!("upload{}", extension));
        fs::write(&path, data)?;
        debug!(
            "Persisted upload {:?} ({} bytes) to {}",
            original_filename,
            data.len(),
            path.display()
        );
        Ok(UploadedDocument {
            path,
            original_filename: original_filename.to_string(),
            extension,
        })
    }

    /// Copy an existing file into the scratch directory.
    pub fn persist_copy(&self, source: &Path) -> io::Result<UploadedDocument> {
        let original_filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = fs::read(source)?;
        self.persist_upload(&original_filename, &data)
    }

    /// Write a page image as PNG; the file is removed when the guard is released.
    pub fn page_image(&self, page: u32, image: &DynamicImage) -> Result<PageImage> {
        let file = tempfile::Builder::new()
            .prefix(&format!("page-{}-", page))
            .suffix(".png")
            .tempfile_in(&self.path)?;
        image
            .save_with_format(file.path(), ImageFormat::Png)
            .map_err(InvoscanError::Image)?;
        Ok(PageImage { file, page })
    }

    /// Remove the directory and everything in it.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!("Removed scratch directory {}", self.path.display()),
                Err(e) => warn!("Failed to remove scratch directory {}: {}", self.path.display(), e),
            }
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        self.release();
    }
}

/// An intermediate page image stored in a [`Scratch`] directory.
#[derive(Debug)]
pub struct PageImage {
    file: NamedTempFile,
    page: u32,
}

impl PageImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Delete the image now.
    pub fn release(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            warn!("Failed to remove page image {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn test_close_removes_upload() {
        let root = tempfile::tempdir().unwrap();
        let scratch = Scratch::create_in(root.path()).unwrap();
        let doc = scratch.persist_upload("Invoice.PNG", b"not really a png").unwrap();

        assert!(doc.path.exists());
        assert_eq!(doc.extension, ".png");
        assert_eq!(doc.original_filename, "Invoice.PNG");

        scratch.close();
        assert!(!doc.path.exists());
        assert_eq!(entries(root.path()), 0);
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let scratch = Scratch::create_in(root.path()).unwrap();
            scratch.persist_upload("a.pdf", b"%PDF-").unwrap();
            scratch.path().to_path_buf()
        };

        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_scratch_names_differ() {
        let root = tempfile::tempdir().unwrap();
        let a = Scratch::create_in(root.path()).unwrap();
        let b = Scratch::create_in(root.path()).unwrap();

        assert_ne!(a.path(), b.path());
        assert_eq!(entries(root.path()), 2);
    }

    #[test]
    fn test_page_image_release() {
        let root = tempfile::tempdir().unwrap();
        let scratch = Scratch::create_in(root.path()).unwrap();
        let image = DynamicImage::new_rgb8(4, 4);

        let page = scratch.page_image(1, &image).unwrap();
        let path = page.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(page.page(), 1);

        page.release();
        assert!(!path.exists());
        assert_eq!(entries(scratch.path()), 0);
    }
}

//! Asset loading for resources consumed at context-init time
//!
//! Decoding happens on the CPU; the result is handed to the graphics context
//! for upload. [`FsAssets`] reads from disk, [`MemoryAssets`] serves
//! pre-registered bytes and images (tests, embedded assets).

use crate::error::ResourceError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// RGBA8 pixel data ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    /// Row-major, 4 bytes per pixel
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Create a solid color image (useful for testing and defaults)
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut pixels = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Decode an encoded image (PNG) into RGBA8
    #[cfg(feature = "image")]
    pub fn decode(bytes: &[u8], path: &Path) -> Result<Self, ResourceError> {
        let img = image::load_from_memory(bytes).map_err(|e| ResourceError::Image {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded image {}x{} from {:?}", width, height, path);

        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

/// Source of asset bytes
pub trait AssetLoader {
    /// Read the raw bytes at `path`
    fn read(&self, path: &Path) -> Result<Vec<u8>, ResourceError>;

    /// Read and decode an image
    fn load_image(&self, path: &Path) -> Result<ImageData, ResourceError> {
        let bytes = self.read(path)?;
        decode_image(&bytes, path)
    }

    /// Read a UTF-8 text file
    fn read_to_string(&self, path: &Path) -> Result<String, ResourceError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| ResourceError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }
}

#[cfg(feature = "image")]
fn decode_image(bytes: &[u8], path: &Path) -> Result<ImageData, ResourceError> {
    ImageData::decode(bytes, path)
}

#[cfg(not(feature = "image"))]
fn decode_image(_bytes: &[u8], path: &Path) -> Result<ImageData, ResourceError> {
    Err(ResourceError::Image {
        path: path.to_path_buf(),
        reason: "image decoding is disabled (enable the `image` feature)".to_string(),
    })
}

/// Loads assets relative to a root directory
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `path` against the root; absolute paths are used unchanged
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl AssetLoader for FsAssets {
    fn read(&self, path: &Path) -> Result<Vec<u8>, ResourceError> {
        let full = self.resolve(path);
        std::fs::read(&full).map_err(|source| ResourceError::Io { path: full, source })
    }
}

/// In-memory assets keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    files: HashMap<PathBuf, Vec<u8>>,
    images: HashMap<PathBuf, ImageData>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), bytes.into());
        self
    }

    /// Register an already-decoded image
    pub fn with_image(mut self, path: impl Into<PathBuf>, image: ImageData) -> Self {
        self.images.insert(path.into(), image);
        self
    }
}

impl AssetLoader for MemoryAssets {
    fn read(&self, path: &Path) -> Result<Vec<u8>, ResourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }

    fn load_image(&self, path: &Path) -> Result<ImageData, ResourceError> {
        match self.images.get(path) {
            Some(image) => Ok(image.clone()),
            None => decode_image(&self.read(path)?, path),
        }
    }
}

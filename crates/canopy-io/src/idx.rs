//! IDX (MNIST-style) image and label file reader.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::IoError;
use crate::domain::Dataset;

/// Magic number of an unsigned-byte, 3-dimensional IDX file (images).
const IMAGE_MAGIC: u32 = 0x0000_0803;
/// Magic number of an unsigned-byte, 1-dimensional IDX file (labels).
const LABEL_MAGIC: u32 = 0x0000_0801;

const IMAGE_HEADER_LEN: usize = 16;
const LABEL_HEADER_LEN: usize = 8;

/// Reads a paired IDX image file and label file.
///
/// Image file layout (big-endian): magic `0x00000803`, record count, rows,
/// columns, then `count * rows * cols` unsigned pixel bytes. Label file
/// layout: magic `0x00000801`, record count, then one unsigned byte per
/// record. Trailing bytes past the declared payload are ignored.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::BadMagic`] | Header magic doesn't match the file kind |
/// | [`IoError::Truncated`] | File is shorter than its header promises |
/// | [`IoError::HeaderOverflow`] | Header dimensions overflow the payload size |
/// | [`IoError::EmptyDataset`] | Zero records or zero pixels per record |
/// | [`IoError::CountMismatch`] | Image and label record counts differ |
pub struct IdxReader {
    images: PathBuf,
    labels: PathBuf,
    limit: Option<usize>,
}

impl IdxReader {
    /// Create a new reader for the given image and label file paths.
    pub fn new(images: &Path, labels: &Path) -> Self {
        Self {
            images: images.to_path_buf(),
            labels: labels.to_path_buf(),
            limit: None,
        }
    }

    /// Read at most `limit` records from each file. `None` reads everything.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Read and validate both files, returning a [`Dataset`].
    #[instrument(skip(self), fields(images = %self.images.display(), labels = %self.labels.display()))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let (features, rows, cols) = self.read_images()?;
        let labels = self.read_labels()?;

        if features.len() != labels.len() {
            return Err(IoError::CountMismatch {
                images: features.len(),
                labels: labels.len(),
            });
        }

        info!(
            n_samples = labels.len(),
            n_features = rows * cols,
            "IDX dataset loaded"
        );
        Ok(Dataset::new(features, labels, rows, cols))
    }

    fn read_images(&self) -> Result<(Vec<Vec<f64>>, usize, usize), IoError> {
        let path = &self.images;
        let bytes = read_file(path)?;
        check_magic(path, &bytes, IMAGE_MAGIC)?;
        require_len(path, &bytes, IMAGE_HEADER_LEN)?;

        let count = be_u32(&bytes, 4) as usize;
        let rows = be_u32(&bytes, 8) as usize;
        let cols = be_u32(&bytes, 12) as usize;
        let n_records = self.limit.map_or(count, |limit| count.min(limit));
        let n_pixels = rows
            .checked_mul(cols)
            .ok_or_else(|| IoError::HeaderOverflow { path: path.clone() })?;
        if n_records == 0 || n_pixels == 0 {
            return Err(IoError::EmptyDataset { path: path.clone() });
        }
        debug!(count, rows, cols, n_records, "read image header");

        let payload_end = n_records
            .checked_mul(n_pixels)
            .and_then(|payload| payload.checked_add(IMAGE_HEADER_LEN))
            .ok_or_else(|| IoError::HeaderOverflow { path: path.clone() })?;
        require_len(path, &bytes, payload_end)?;

        let features = bytes[IMAGE_HEADER_LEN..payload_end]
            .chunks_exact(n_pixels)
            .map(|image| image.iter().map(|&p| f64::from(p)).collect())
            .collect();
        Ok((features, rows, cols))
    }

    fn read_labels(&self) -> Result<Vec<usize>, IoError> {
        let path = &self.labels;
        let bytes = read_file(path)?;
        check_magic(path, &bytes, LABEL_MAGIC)?;
        require_len(path, &bytes, LABEL_HEADER_LEN)?;

        let count = be_u32(&bytes, 4) as usize;
        let n_records = self.limit.map_or(count, |limit| count.min(limit));
        debug!(count, n_records, "read label header");

        let payload_end = n_records
            .checked_add(LABEL_HEADER_LEN)
            .ok_or_else(|| IoError::HeaderOverflow { path: path.clone() })?;
        require_len(path, &bytes, payload_end)?;

        Ok(bytes[LABEL_HEADER_LEN..payload_end]
            .iter()
            .map(|&l| usize::from(l))
            .collect())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, IoError> {
    std::fs::read(path).map_err(|source| IoError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })
}

fn require_len(path: &Path, bytes: &[u8], expected: usize) -> Result<(), IoError> {
    if bytes.len() < expected {
        return Err(IoError::Truncated {
            path: path.to_path_buf(),
            expected,
            got: bytes.len(),
        });
    }
    Ok(())
}

fn check_magic(path: &Path, bytes: &[u8], expected: u32) -> Result<(), IoError> {
    require_len(path, bytes, 4)?;
    let found = be_u32(bytes, 0);
    if found != expected {
        return Err(IoError::BadMagic {
            path: path.to_path_buf(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Big-endian u32 at `offset`. Callers check the length first.
fn be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::{IMAGE_MAGIC, IdxReader, LABEL_MAGIC};
    use crate::IoError;

    fn image_bytes(count: u32, rows: u32, cols: u32, pixels: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for word in [IMAGE_MAGIC, count, rows, cols] {
            bytes.extend_from_slice(&word.to_be_bytes());
        }
        bytes.extend_from_slice(pixels);
        bytes
    }

    fn label_bytes(labels: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&LABEL_MAGIC.to_be_bytes());
        bytes.extend_from_slice(&(labels.len() as u32).to_be_bytes());
        bytes.extend_from_slice(labels);
        bytes
    }

    fn write_pair(dir: &TempDir, images: &[u8], labels: &[u8]) -> (PathBuf, PathBuf) {
        let image_path = dir.path().join("images.idx3-ubyte");
        let label_path = dir.path().join("labels.idx1-ubyte");
        std::fs::write(&image_path, images).unwrap();
        std::fs::write(&label_path, labels).unwrap();
        (image_path, label_path)
    }

    #[test]
    fn reads_images_and_labels() {
        let dir = TempDir::new().unwrap();
        let pixels = [0, 1, 2, 3, 250, 251, 252, 253, 9, 9, 9, 9];
        let (images, labels) = write_pair(&dir, &image_bytes(3, 2, 2, &pixels), &label_bytes(&[7, 0, 3]));

        let dataset = IdxReader::new(&images, &labels).read().unwrap();
        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.n_features(), 4);
        assert_eq!(dataset.image_shape(), (2, 2));
        assert_eq!(dataset.features()[1], vec![250.0, 251.0, 252.0, 253.0]);
        assert_eq!(dataset.labels(), &[7, 0, 3]);
    }

    #[test]
    fn limit_truncates_both_files() {
        let dir = TempDir::new().unwrap();
        let pixels = [1, 2, 3, 4, 5, 6];
        let (images, labels) = write_pair(&dir, &image_bytes(3, 1, 2, &pixels), &label_bytes(&[0, 1, 2]));

        let dataset = IdxReader::new(&images, &labels)
            .with_limit(Some(2))
            .read()
            .unwrap();
        assert_eq!(dataset.n_samples(), 2);
        assert_eq!(dataset.labels(), &[0, 1]);
    }

    #[test]
    fn missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let err = IdxReader::new(&missing, &missing).read().unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn swapped_files_bad_magic() {
        let dir = TempDir::new().unwrap();
        let (images, labels) = write_pair(&dir, &image_bytes(1, 1, 1, &[5]), &label_bytes(&[1]));
        let err = IdxReader::new(&labels, &images).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::BadMagic {
                expected: IMAGE_MAGIC,
                found: LABEL_MAGIC,
                ..
            }
        ));
    }

    #[test]
    fn truncated_payload() {
        let dir = TempDir::new().unwrap();
        let (images, labels) = write_pair(&dir, &image_bytes(2, 2, 2, &[1, 2, 3]), &label_bytes(&[0, 1]));
        let err = IdxReader::new(&images, &labels).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::Truncated {
                expected: 24,
                got: 19,
                ..
            }
        ));
    }

    #[test]
    fn truncated_header() {
        let dir = TempDir::new().unwrap();
        let (images, labels) = write_pair(&dir, &[0, 0, 8], &label_bytes(&[0]));
        let err = IdxReader::new(&images, &labels).read().unwrap_err();
        assert!(matches!(err, IoError::Truncated { .. }));
    }

    #[test]
    fn empty_image_file() {
        let dir = TempDir::new().unwrap();
        let (images, labels) = write_pair(&dir, &image_bytes(0, 28, 28, &[]), &label_bytes(&[]));
        let err = IdxReader::new(&images, &labels).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn record_count_mismatch() {
        let dir = TempDir::new().unwrap();
        let (images, labels) = write_pair(&dir, &image_bytes(2, 1, 1, &[1, 2]), &label_bytes(&[0, 1, 1]));
        let err = IdxReader::new(&images, &labels).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::CountMismatch {
                images: 2,
                labels: 3
            }
        ));
    }

    #[test]
    fn oversized_header_dimensions() {
        let dir = TempDir::new().unwrap();
        let header = image_bytes(u32::MAX, u32::MAX, u32::MAX, &[]);
        let (images, labels) = write_pair(&dir, &header, &label_bytes(&[0]));
        let err = IdxReader::new(&images, &labels).read().unwrap_err();
        assert!(matches!(err, IoError::HeaderOverflow { .. }));
    }
}

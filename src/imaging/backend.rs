//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the gallery needs:
//! identify and thumbnail. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend); tests swap in a mock that
//! records calls instead of decoding pixels.

use super::params::ThumbnailParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
pub trait ImageBackend: Send + Sync {
    /// Get image dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode the source, crop or fit it, and return encoded JPEG bytes.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::params::{Quality, ThumbnailPolicy};
    use std::sync::Mutex;

    /// Mock backend that records operations without executing them.
    #[derive(Default)]
    pub struct MockBackend {
        pub identify_results: Mutex<Vec<Dimensions>>,
        pub fail_identify: bool,
        pub fail_thumbnails: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Thumbnail {
            source: String,
            size: u32,
            policy: ThumbnailPolicy,
            quality: u8,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(dims: Vec<Dimensions>) -> Self {
            Self {
                identify_results: Mutex::new(dims),
                ..Self::default()
            }
        }

        /// A backend whose thumbnails always fail, as for a corrupt file.
        pub fn failing() -> Self {
            Self {
                fail_thumbnails: true,
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(path.to_string_lossy().to_string()));

            if self.fail_identify {
                return Err(BackendError::ProcessingFailed(format!(
                    "Unrecognized image {}",
                    path.display()
                )));
            }
            // Unconfigured mocks report a small landscape image
            Ok(self.identify_results.lock().unwrap().pop().unwrap_or(Dimensions {
                width: 640,
                height: 480,
            }))
        }

        fn thumbnail(&self, params: &ThumbnailParams) -> Result<Vec<u8>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Thumbnail {
                source: params.source.to_string_lossy().to_string(),
                size: params.size,
                policy: params.policy,
                quality: params.quality.value(),
            });
            if self.fail_thumbnails {
                return Err(BackendError::ProcessingFailed(format!(
                    "Failed to decode {}",
                    params.source.display()
                )));
            }
            Ok(b"mock-jpeg".to_vec())
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 800,
            height: 600,
        }]);

        let result = backend.identify(Path::new("/test/image.jpg")).unwrap();
        assert_eq!(result.width, 800);
        assert_eq!(result.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(&ops[0], RecordedOp::Identify(p) if p == "/test/image.jpg"));
    }

    #[test]
    fn mock_identify_defaults_when_unconfigured() {
        let backend = MockBackend::new();
        let result = backend.identify(Path::new("/test/a.png")).unwrap();
        assert_eq!((result.width, result.height), (640, 480));
    }

    #[test]
    fn mock_records_thumbnail() {
        let backend = MockBackend::new();

        let bytes = backend
            .thumbnail(&ThumbnailParams {
                source: "/source.jpg".into(),
                size: 80,
                policy: ThumbnailPolicy::Fit,
                quality: Quality::new(70),
            })
            .unwrap();
        assert_eq!(bytes, b"mock-jpeg");

        let ops = backend.get_operations();
        assert!(matches!(
            &ops[0],
            RecordedOp::Thumbnail {
                size: 80,
                policy: ThumbnailPolicy::Fit,
                quality: 70,
                ..
            }
        ));
    }

    #[test]
    fn failing_mock_still_records() {
        let backend = MockBackend::failing();
        let result = backend.thumbnail(&ThumbnailParams {
            source: "/broken.png".into(),
            size: 80,
            policy: ThumbnailPolicy::Crop,
            quality: Quality::default(),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert_eq!(backend.get_operations().len(), 1);
    }
}

//! Media attacher: size-gated pass-through of an uploaded photo.

use crate::domain::Photo;
use crate::error::DomainError;

use super::PhotoUpload;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Accept `upload` if it is at most `max_bytes` long.
pub fn attach_photo(upload: PhotoUpload, max_bytes: usize) -> Result<Photo, DomainError> {
    if upload.size > max_bytes || upload.data.len() > max_bytes {
        return Err(DomainError::PayloadTooLarge {
            size: upload.size.max(upload.data.len()),
            limit: max_bytes,
        });
    }

    let content_type = upload
        .content_type
        .map(|ct| ct.trim().to_string())
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    Ok(Photo {
        data: upload.data,
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posts::DEFAULT_MAX_PHOTO_BYTES;

    #[test]
    fn photo_at_the_limit_is_accepted() {
        let upload = PhotoUpload::new(
            vec![0u8; DEFAULT_MAX_PHOTO_BYTES],
            Some("image/png".to_string()),
        );

        let photo = attach_photo(upload, DEFAULT_MAX_PHOTO_BYTES).unwrap();

        assert_eq!(photo.data.len(), 10_000_000);
        assert_eq!(photo.content_type, "image/png");
    }

    #[test]
    fn photo_one_byte_over_is_rejected() {
        let upload = PhotoUpload::new(
            vec![0u8; DEFAULT_MAX_PHOTO_BYTES + 1],
            Some("image/png".to_string()),
        );

        let err = attach_photo(upload, DEFAULT_MAX_PHOTO_BYTES).unwrap_err();

        assert!(matches!(
            err,
            DomainError::PayloadTooLarge {
                size: 10_000_001,
                limit: 10_000_000
            }
        ));
    }

    #[test]
    fn reported_size_wins_over_buffered_bytes() {
        let upload = PhotoUpload {
            data: vec![1, 2, 3],
            content_type: None,
            size: 42,
        };

        assert!(attach_photo(upload, 10).is_err());
    }

    #[test]
    fn missing_content_type_falls_back() {
        let photo = attach_photo(PhotoUpload::new(vec![7; 4], None), 10).unwrap();
        assert_eq!(photo.content_type, "application/octet-stream");
    }
}

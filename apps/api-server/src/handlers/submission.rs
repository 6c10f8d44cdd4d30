//! Reads a multipart post form into a [`PostSubmission`].

use actix_multipart::{Field, Multipart};
use futures::StreamExt;

use quill_core::DomainError;
use quill_core::posts::validator::parse_id_list;
use quill_core::posts::{PhotoUpload, PostSubmission};

/// Cap on any single text field.
const TEXT_FIELD_LIMIT: usize = 2 * 1024 * 1024;

/// Collect the known form fields. Blank text fields count as not supplied and
/// unknown fields are drained and ignored.
///
/// The photo is buffered up to `max_photo_bytes + 1` bytes; its full length is
/// still recorded so the size check sees the real upload size.
pub async fn read_submission(
    mut payload: Multipart,
    max_photo_bytes: usize,
) -> Result<PostSubmission, DomainError> {
    let mut submission = PostSubmission::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(malformed)?;
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "photo" => {
                let photo = read_photo(&mut field, max_photo_bytes).await?;
                if photo.size > 0 {
                    submission.photo = Some(photo);
                }
            }
            "about" => submission.about = read_text(&mut field).await?,
            "author" => submission.author = read_text(&mut field).await?,
            "body" => submission.body = read_text(&mut field).await?,
            "categories" => {
                submission.categories = read_text(&mut field)
                    .await?
                    .map(|raw| parse_id_list(&raw))
                    .transpose()?;
            }
            "tags" => {
                submission.tags = read_text(&mut field)
                    .await?
                    .map(|raw| parse_id_list(&raw))
                    .transpose()?;
            }
            "source" => submission.source = read_flag(&mut field, "source").await?,
            "verification" => {
                submission.verification = read_flag(&mut field, "verification").await?
            }
            _ => {
                tracing::debug!(field = %name, "Ignoring unknown form field");
                drain(&mut field).await?;
            }
        }
    }

    Ok(submission)
}

fn malformed(err: actix_multipart::MultipartError) -> DomainError {
    tracing::debug!(error = %err, "Malformed multipart body");
    DomainError::Upload("Image could not be uploaded".to_string())
}

async fn read_photo(field: &mut Field, max_bytes: usize) -> Result<PhotoUpload, DomainError> {
    let content_type = field.content_type().map(|mime| mime.essence_str().to_string());
    let keep = max_bytes.saturating_add(1);
    let mut data = Vec::new();
    let mut size = 0usize;

    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed)?;
        size = size.saturating_add(chunk.len());
        if data.len() < keep {
            let room = keep - data.len();
            data.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }
    }

    Ok(PhotoUpload {
        data,
        content_type,
        size,
    })
}

async fn read_text(field: &mut Field) -> Result<Option<String>, DomainError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(malformed)?;
        if bytes.len() + chunk.len() > TEXT_FIELD_LIMIT {
            return Err(DomainError::Upload(format!(
                "Field {} is too large",
                field.name().unwrap_or("unknown")
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    let text = String::from_utf8(bytes)
        .map_err(|_| DomainError::Upload("Form fields must be UTF-8 text".to_string()))?;
    Ok((!text.trim().is_empty()).then_some(text))
}

async fn read_flag(field: &mut Field, label: &str) -> Result<Option<bool>, DomainError> {
    match read_text(field).await?.as_deref().map(str::trim) {
        None => Ok(None),
        Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Some(raw) => Err(DomainError::Validation(format!(
            "{label} must be true or false, got {raw:?}"
        ))),
    }
}

async fn drain(field: &mut Field) -> Result<(), DomainError> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(malformed)?;
    }
    Ok(())
}

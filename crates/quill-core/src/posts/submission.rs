use uuid::Uuid;

/// Raw fields of a create or update request.
///
/// Every field is optional here; the validator decides which ones a given
/// operation requires.
#[derive(Debug, Clone, Default)]
pub struct PostSubmission {
    pub about: Option<String>,
    pub author: Option<String>,
    pub body: Option<String>,
    pub categories: Option<Vec<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
    pub source: Option<bool>,
    pub verification: Option<bool>,
    pub photo: Option<PhotoUpload>,
}

/// An uploaded image as received from the client.
///
/// `size` is the full length of the upload even when the reader stopped
/// buffering early, so the size gate sees the real figure.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
    pub size: usize,
}

impl PhotoUpload {
    pub fn new(data: Vec<u8>, content_type: Option<String>) -> Self {
        let size = data.len();
        Self {
            data,
            content_type,
            size,
        }
    }
}

//! Hand-framed `multipart/form-data` body used by the explicit-boundary
//! transport, where the client picks its own boundary instead of letting the
//! browser generate one.

use uuid::Uuid;

/// Form field the classifier reads the image from.
pub const FIELD_NAME: &str = "file";

pub fn new_boundary() -> String {
    format!("----LungScanBoundary{}", Uuid::new_v4().simple())
}

pub fn content_type(boundary: &str) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

pub fn encode_file_part(
    boundary: &str,
    field: &str,
    filename: &str,
    mime_type: &str,
    bytes: &[u8],
) -> Vec<u8> {
    let header = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{}\"\r\nContent-Type: {mime_type}\r\n\r\n",
        quote_filename(filename)
    );
    let trailer = format!("\r\n--{boundary}--\r\n");

    let mut body = Vec::with_capacity(header.len() + bytes.len() + trailer.len());
    body.extend_from_slice(header.as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(trailer.as_bytes());
    body
}

fn quote_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| if c == '"' { '\'' } else { c })
        .collect()
}

//! `multipart/related` bodies for Drive's single-request upload

const BOUNDARY_BASE: &str = "song_backup_part";

pub(super) struct RelatedBody {
    pub(super) boundary: String,
    pub(super) bytes: Vec<u8>,
}

impl RelatedBody {
    pub(super) fn content_type(&self) -> String {
        format!("multipart/related; boundary={}", self.boundary)
    }
}

/// JSON metadata part followed by the media part
pub(super) fn related_body(metadata: &serde_json::Value, data: &[u8], mime_type: &str) -> RelatedBody {
    let metadata = metadata.to_string();
    let boundary = pick_boundary(&[metadata.as_bytes(), data]);

    let mut bytes = Vec::with_capacity(data.len() + metadata.len() + 4 * boundary.len() + 128);
    bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    bytes.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    bytes.extend_from_slice(metadata.as_bytes());
    bytes.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    bytes.extend_from_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    bytes.extend_from_slice(data);
    bytes.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    RelatedBody { boundary, bytes }
}

/// First candidate boundary that occurs in none of the parts
fn pick_boundary(parts: &[&[u8]]) -> String {
    let mut attempt = 0u32;
    loop {
        let candidate = format!("{BOUNDARY_BASE}_{attempt:04}");
        if !parts.iter().any(|part| contains(part, candidate.as_bytes())) {
            return candidate;
        }
        attempt += 1;
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_layout() {
        let body = related_body(&json!({"name": "a.txt"}), b"la la", "text/plain");
        let text = String::from_utf8(body.bytes).unwrap();
        assert_eq!(body.boundary, "song_backup_part_0000");
        assert_eq!(
            text,
            "--song_backup_part_0000\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {\"name\":\"a.txt\"}\r\n\
             --song_backup_part_0000\r\n\
             Content-Type: text/plain\r\n\r\n\
             la la\r\n\
             --song_backup_part_0000--\r\n"
        );
    }

    #[test]
    fn boundary_avoids_payload_content() {
        let data = b"verse\n--song_backup_part_0000\nchorus song_backup_part_0001";
        let body = related_body(&json!({}), data, "text/plain");
        assert_eq!(body.boundary, "song_backup_part_0002");
        assert!(!contains(data, body.boundary.as_bytes()));
    }

    #[test]
    fn content_type_names_boundary() {
        let body = related_body(&json!({}), b"", "text/plain");
        assert_eq!(
            body.content_type(),
            "multipart/related; boundary=song_backup_part_0000"
        );
    }
}

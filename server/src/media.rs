//! Content type helpers shared by intake and static serving.

use std::path::Path;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Maps a file name's extension to a MIME type.
///
/// Scriptable formats such as SVG are not mapped and come back as
/// `application/octet-stream`.
pub fn content_type_for(name: impl AsRef<Path>) -> &'static str {
    let extension = name
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("tif" | "tiff") => "image/tiff",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("avif") => "image/avif",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        _ => OCTET_STREAM,
    }
}

/// Picks the declared type unless the client sent nothing useful,
/// in which case the type is guessed from the file name.
///
/// Parameters are dropped and common aliases are folded into one name.
pub fn resolve(declared: Option<&str>, file_name: &str) -> String {
    let essence = declared
        .and_then(|t| t.split(';').next())
        .map(|t| t.trim().to_ascii_lowercase());
    match essence.as_deref() {
        Some("image/jpg" | "image/pjpeg") => "image/jpeg".to_owned(),
        Some(t) if !t.is_empty() && t != OCTET_STREAM => t.to_owned(),
        _ => content_type_for(file_name).to_owned(),
    }
}

/// Returns the type a stored upload will be served with.
///
/// The upload must be a raster image and its declared type must match the one
/// its extension maps to, otherwise the offending type is returned as the error.
pub fn accepted_image_type(declared: Option<&str>, file_name: &str) -> Result<&'static str, String> {
    let served = content_type_for(file_name);
    let claimed = resolve(declared, file_name);
    if !is_image(&claimed) {
        return Err(claimed);
    }
    if claimed != served {
        return Err(format!("{claimed} (extension maps to {served})"));
    }
    Ok(served)
}

pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/") && !content_type.starts_with("image/svg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("apple.jpg", "image/jpeg")]
    #[case("APPLE.JPG", "image/jpeg")]
    #[case("a/b/c.png", "image/png")]
    #[case("drawing.svg", OCTET_STREAM)]
    #[case("noext", OCTET_STREAM)]
    #[case("archive.zip", OCTET_STREAM)]
    #[trace]
    fn content_type_for_tests(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(content_type_for(name), expected);
    }

    #[rstest]
    #[case(Some("image/png"), "apple.jpg", "image/png")]
    #[case(Some("Image/PNG"), "apple.jpg", "image/png")]
    #[case(Some("image/jpg"), "apple.jpg", "image/jpeg")]
    #[case(Some("image/jpeg; q=1"), "apple.jpg", "image/jpeg")]
    #[case(None, "apple.jpg", "image/jpeg")]
    #[case(Some(""), "apple.webp", "image/webp")]
    #[case(Some("application/octet-stream"), "apple.jpg", "image/jpeg")]
    #[case(Some("text/plain"), "apple.jpg", "text/plain")]
    #[trace]
    fn resolve_tests(#[case] declared: Option<&str>, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(resolve(declared, name), expected);
    }

    #[rstest]
    #[case(Some("image/jpeg"), "apple.jpg", Some("image/jpeg"))]
    #[case(Some("image/jpg"), "apple.JPEG", Some("image/jpeg"))]
    #[case(None, "leaf.png", Some("image/png"))]
    #[case(Some("image/png"), "x.svg", None)]
    #[case(Some("image/svg+xml"), "x.svg", None)]
    #[case(Some("image/jpeg"), "page.txt", None)]
    #[case(Some("image/png"), "apple.jpg", None)]
    #[case(Some("image/jpeg"), "noext", None)]
    #[case(None, "archive.zip", None)]
    #[trace]
    fn accepted_image_type_tests(
        #[case] declared: Option<&str>,
        #[case] name: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(accepted_image_type(declared, name).ok(), expected);
    }

    #[rstest]
    #[case("image/png", true)]
    #[case("image/svg+xml", false)]
    #[case("text/plain", false)]
    #[trace]
    fn is_image_tests(#[case] content_type: &str, #[case] expected: bool) {
        assert_eq!(is_image(content_type), expected);
    }
}

use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::domain::Asset;
use crate::media;

pub struct FileReply {
    asset: Asset,
}

impl FileReply {
    #[must_use]
    pub fn new(asset: Asset) -> Self {
        Self { asset }
    }

    fn disposition(&self) -> String {
        // quotes and control characters cannot be carried by a quoted-string
        let name: String = self
            .asset
            .name
            .chars()
            .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
            .collect();
        // only images are rendered in place, anything else is downloaded
        let kind = if media::is_image(self.asset.content_type) {
            "inline"
        } else {
            "attachment"
        };
        format!(r#"{kind}; filename="{name}""#)
    }
}

impl IntoResponse for FileReply {
    fn into_response(self) -> Response {
        let disposition = self.disposition();
        let len = self.asset.data.len().to_string();
        let content_type = self.asset.content_type;
        let mut res = Body::from(self.asset.data).into_response();
        res.headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        res.headers_mut().insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
        if let Ok(val) = HeaderValue::from_str(disposition.as_str()) {
            res.headers_mut().insert(header::CONTENT_DISPOSITION, val);
        }
        if let Ok(val) = HeaderValue::from_str(len.as_str()) {
            res.headers_mut().insert(header::CONTENT_LENGTH, val);
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn asset(name: &str) -> Asset {
        Asset {
            name: name.to_owned(),
            content_type: "image/png",
            data: vec![1, 2, 3],
        }
    }

    #[rstest]
    #[case("leaf.png", r#"inline; filename="leaf.png""#)]
    #[case("a\"b.png", r#"inline; filename="ab.png""#)]
    #[case("a\\b.png", r#"inline; filename="ab.png""#)]
    #[case("", r#"inline; filename="""#)]
    #[trace]
    fn disposition_tests(#[case] name: &str, #[case] expected: &str) {
        // Arrange
        let reply = FileReply::new(asset(name));

        // Act
        let disposition = reply.disposition();

        // Assert
        assert_eq!(disposition, expected);
    }

    #[rstest]
    #[case("image/jpeg", "inline")]
    #[case("text/plain; charset=utf-8", "attachment")]
    #[case("application/octet-stream", "attachment")]
    #[trace]
    fn disposition_by_content_type(#[case] content_type: &'static str, #[case] kind: &str) {
        // Arrange
        let reply = FileReply::new(Asset {
            name: "x".to_owned(),
            content_type,
            data: Vec::new(),
        });

        // Act
        let disposition = reply.disposition();

        // Assert
        assert_eq!(disposition, format!(r#"{kind}; filename="x""#));
    }

    #[test]
    fn into_response_headers() {
        // Arrange
        let reply = FileReply::new(asset("leaf.png"));

        // Act
        let res = reply.into_response();

        // Assert
        let headers = res.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers[header::CONTENT_LENGTH], "3");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }
}

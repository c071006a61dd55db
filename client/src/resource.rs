extern crate url;

use self::url::Url;
use core::fmt;

/// Base address of a FarmTrust server and the endpoints hanging off it.
#[derive(Clone)]
pub struct Endpoint {
    base: Url,
}

impl Endpoint {
    #[must_use]
    pub fn new(uri: &str) -> Option<Endpoint> {
        let base = Url::parse(uri).ok()?;
        if base.cannot_be_a_base() {
            return None;
        }
        Some(Endpoint { base })
    }

    #[must_use]
    pub fn inspect(&self) -> Url {
        self.join(&["api", "inspect"])
    }

    #[must_use]
    pub fn verify(&self, batch_id: &str) -> Url {
        self.join(&["api", "verify", batch_id])
    }

    #[must_use]
    pub fn federated_sync(&self) -> Url {
        self.join(&["api", "federated-sync"])
    }

    /// Resolves a `/uploads/...` path returned by the server.
    #[must_use]
    pub fn download(&self, url_path: &str) -> Url {
        let segments: Vec<&str> = url_path.split('/').filter(|s| !s.is_empty()).collect();
        self.join(&segments)
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            // keep whatever prefix the base carries, minus a trailing slash
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_correct_some() {
        // Act
        let r = Endpoint::new("http://localhost:5000");

        // Assert
        assert!(r.is_some());
    }

    #[rstest]
    #[case("http/localhost")]
    #[case("mailto:farm@example.com")]
    #[trace]
    fn new_incorrect_none(#[case] uri: &str) {
        // Act
        let r = Endpoint::new(uri);

        // Assert
        assert!(r.is_none());
    }

    #[rstest]
    #[case("http://localhost:5000", "http://localhost:5000/api/inspect")]
    #[case("http://localhost:5000/", "http://localhost:5000/api/inspect")]
    #[case("http://farm/trust", "http://farm/trust/api/inspect")]
    #[case("http://farm/trust/", "http://farm/trust/api/inspect")]
    #[trace]
    fn inspect_tests(#[case] base: &str, #[case] expected: &str) {
        // Arrange
        let e = Endpoint::new(base).unwrap();

        // Act
        let url = e.inspect();

        // Assert
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    #[case("BATCH001", "http://localhost/api/verify/BATCH001")]
    #[case("a/b", "http://localhost/api/verify/a%2Fb")]
    #[case("lot 7", "http://localhost/api/verify/lot%207")]
    #[trace]
    fn verify_escapes_batch(#[case] batch: &str, #[case] expected: &str) {
        // Arrange
        let e = Endpoint::new("http://localhost").unwrap();

        // Act
        let url = e.verify(batch);

        // Assert
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn federated_sync_url() {
        // Arrange
        let e = Endpoint::new("http://localhost:5000").unwrap();

        // Act
        let url = e.federated_sync();

        // Assert
        assert_eq!(url.as_str(), "http://localhost:5000/api/federated-sync");
    }

    #[test]
    fn download_url() {
        // Arrange
        let e = Endpoint::new("http://localhost:5000/").unwrap();

        // Act
        let url = e.download("/uploads/1-abc-apple.jpg");

        // Assert
        assert_eq!(url.as_str(), "http://localhost:5000/uploads/1-abc-apple.jpg");
    }
}

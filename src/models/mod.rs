pub mod blog;
pub mod development;
pub mod property;
pub mod testimonial;
pub mod user;

use url::Url;
use validator::ValidationError;

/// Every entry must parse as an absolute http(s) URL.
pub fn validate_url_list(urls: &Vec<String>) -> Result<(), ValidationError> {
    for raw in urls {
        let parsed = Url::parse(raw).map_err(|_| url_error())?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(url_error());
        }
    }
    Ok(())
}

fn url_error() -> ValidationError {
    let mut error = ValidationError::new("url");
    error.message = Some("Each image must be a valid http(s) URL".into());
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_urls() {
        let urls = vec!["https://cdn.example.com/a.jpg".to_string()];
        assert!(validate_url_list(&urls).is_ok());
    }

    #[test]
    fn rejects_relative_paths_and_odd_schemes() {
        assert!(validate_url_list(&vec!["/uploads/a.jpg".to_string()]).is_err());
        assert!(validate_url_list(&vec!["ftp://example.com/a.jpg".to_string()]).is_err());
    }
}

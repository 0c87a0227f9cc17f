use url::Url;

/// Get the dotted, lower-cased extension of the last URL path segment
pub fn extension_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.last()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Guess an extension from a Content-Type header
pub fn extension_from_content_type(content_type: &str) -> Option<String> {
    let ct = content_type.to_lowercase();
    let ext = if ct.contains("pdf") {
        ".pdf"
    } else if ct.contains("word") || ct.contains("document") {
        if ct.contains("openxml") {
            ".docx"
        } else {
            ".doc"
        }
    } else if ct.contains("csv") {
        ".csv"
    } else if ct.contains("text/plain") {
        ".txt"
    } else {
        return None;
    };
    Some(ext.to_string())
}

/// URL suffix first, Content-Type second
pub fn declared_extension(url: &Url, content_type: Option<&str>) -> Option<String> {
    extension_from_url(url).or_else(|| content_type.and_then(extension_from_content_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_extension_from_url_with_txt() {
        assert_eq!(extension_from_url(&url("https://example.com/test.txt")), Some(".txt".to_string()));
    }

    #[test]
    fn test_extension_from_url_lowercase() {
        assert_eq!(extension_from_url(&url("https://example.com/REPORT.PDF")), Some(".pdf".to_string()));
    }

    #[test]
    fn test_extension_from_url_ignores_query() {
        assert_eq!(
            extension_from_url(&url("https://example.com/data.csv?download=1&name=x.pdf")),
            Some(".csv".to_string())
        );
    }

    #[test]
    fn test_extension_from_url_no_extension() {
        assert_eq!(extension_from_url(&url("https://example.com/file")), None);
        assert_eq!(extension_from_url(&url("https://example.com/")), None);
        assert_eq!(extension_from_url(&url("https://example.com")), None);
        assert_eq!(extension_from_url(&url("https://example.com/latest/meta-data/")), None);
    }

    #[test]
    fn test_extension_from_url_dotfile() {
        assert_eq!(extension_from_url(&url("https://example.com/.hidden")), None);
    }

    #[test]
    fn test_extension_from_url_multiple_dots() {
        assert_eq!(extension_from_url(&url("https://example.com/a/file.tar.gz")), Some(".gz".to_string()));
    }

    #[test]
    fn test_extension_from_content_type() {
        assert_eq!(extension_from_content_type("application/pdf"), Some(".pdf".to_string()));
        assert_eq!(
            extension_from_content_type(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            Some(".docx".to_string())
        );
        assert_eq!(extension_from_content_type("application/msword"), Some(".doc".to_string()));
        assert_eq!(extension_from_content_type("text/csv; charset=utf-8"), Some(".csv".to_string()));
        assert_eq!(extension_from_content_type("Text/Plain"), Some(".txt".to_string()));
        assert_eq!(extension_from_content_type("application/octet-stream"), None);
    }

    #[test]
    fn test_declared_extension_prefers_url() {
        let u = url("https://example.com/notes.txt");
        assert_eq!(declared_extension(&u, Some("application/pdf")), Some(".txt".to_string()));

        let u = url("https://example.com/file");
        assert_eq!(declared_extension(&u, Some("text/plain")), Some(".txt".to_string()));
        assert_eq!(declared_extension(&u, None), None);
    }
}

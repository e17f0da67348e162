//! URL prefix helpers

pub fn with_leading_slash(url: &str) -> String {
    if url.starts_with('/') {
        url.to_string()
    } else {
        format!("/{}", url)
    }
}

pub fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Strip trailing slashes, keeping a lone `/`
pub fn without_trailing_slash(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.is_empty() && url.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

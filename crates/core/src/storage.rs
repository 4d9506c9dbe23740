//! Object naming for gallery images.

/// Folder every gallery image lives in.
pub const IMAGE_FOLDER: &str = "images";

/// Full object path for an uploaded file name.
#[must_use]
pub fn object_path(file_name: &str) -> String {
    format!("{IMAGE_FOLDER}/{file_name}")
}

/// Recover the object name from a stored download URL.
///
/// The URL is percent-decoded, the last `/` segment taken and cut at the
/// first `?`. For
/// `https://firebasestorage.googleapis.com/v0/b/bucket/o/images%2Fa.jpg?alt=media`
/// this yields `a.jpg`.
#[must_use]
pub fn object_name_from_url(url: &str) -> Option<String> {
    let decoded = urlencoding::decode(url).ok()?;
    let segment = decoded.rsplit('/').next()?;
    let name = segment.split('?').next().unwrap_or(segment);
    if name.is_empty() {
        return None;
    }
    Some(name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_from_download_url() {
        let url = "https://firebasestorage.googleapis.com/v0/b/forever.appspot.com/o/images%2Fmama%20at%20market.jpg?alt=media&token=abc";
        assert_eq!(
            object_name_from_url(url).as_deref(),
            Some("mama at market.jpg")
        );
    }

    #[test]
    fn test_object_name_without_query() {
        assert_eq!(
            object_name_from_url("https://cdn.example/images/one.png").as_deref(),
            Some("one.png")
        );
    }

    #[test]
    fn test_trailing_slash_has_no_name() {
        assert_eq!(object_name_from_url("https://cdn.example/images/"), None);
    }

    #[test]
    fn test_object_path() {
        assert_eq!(object_path("a.jpg"), "images/a.jpg");
    }
}

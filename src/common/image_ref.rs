use std::fmt;
use std::path::PathBuf;

/// Where a piece of album art lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    Remote(String),
    Local(PathBuf),
}

impl ImageRef {
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote(url.into())
    }

    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self::Local(path.into())
    }

    /// Final path segment, without any query string or fragment. A URL with
    /// no path beyond its host has none.
    pub fn file_name(&self) -> Option<String> {
        match self {
            ImageRef::Remote(url) => {
                let url = url.split(['?', '#']).next().unwrap_or(url);
                let path = match url.split_once("://") {
                    Some((_, rest)) => rest.split_once('/').map(|(_, path)| path)?,
                    None => url,
                };
                path.rsplit('/')
                    .next()
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
            }
            ImageRef::Local(path) => path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string),
        }
    }

    /// Lowercased extension of `file_name`.
    pub fn extension(&self) -> Option<String> {
        let name = self.file_name()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Remote(url) => f.write_str(url),
            ImageRef::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_extension_ignores_query() {
        let image = ImageRef::remote("https://cdn.example.com/art/Cover.JPG?w=300#top");
        assert_eq!(image.file_name().as_deref(), Some("Cover.JPG"));
        assert_eq!(image.extension().as_deref(), Some("jpg"));
    }

    #[test]
    fn missing_extension() {
        assert_eq!(ImageRef::remote("https://cdn.example.com/art/").extension(), None);
        assert_eq!(ImageRef::local("covers/.hidden").extension(), None);
        assert_eq!(ImageRef::local("covers/plain").extension(), None);
    }

    #[test]
    fn host_only_url_has_no_file_name() {
        for url in [
            "https://cdn.example.com",
            "https://cdn.example.com/",
            "https://cdn.example.com?w=300",
        ] {
            let image = ImageRef::remote(url);
            assert_eq!(image.file_name(), None);
            assert_eq!(image.extension(), None);
        }
        let image = ImageRef::remote("https://cdn.example.com/cover");
        assert_eq!(image.file_name().as_deref(), Some("cover"));
        assert_eq!(image.extension(), None);
    }

    #[test]
    fn local_display_is_path() {
        let image = ImageRef::local("covers/a.png");
        assert_eq!(image.to_string(), "covers/a.png");
        assert_eq!(image.extension().as_deref(), Some("png"));
    }
}

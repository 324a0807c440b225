//! Asset source for the command line: data URIs, HTTP(S) and local files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use design_renderer::image::load_image_from_bytes;
use design_renderer::{AssetSource, DataUriSource, RenderError, RenderResult, TextureData};
use reqwest::Client;
use url::Url;

/// Loads element images and mockups from wherever they live.
///
/// Relative paths are resolved against `base_dir`, normally the directory
/// of the design file.
#[derive(Debug, Clone)]
pub struct HostAssetSource {
    http: Client,
    base_dir: PathBuf,
}

impl HostAssetSource {
    /// Create a source resolving relative paths against `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .user_agent(concat!("design-studio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_dir: base_dir.into(),
        })
    }

    async fn fetch(&self, url: Url) -> RenderResult<Vec<u8>> {
        tracing::debug!("Fetching {url}");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| RenderError::AssetLoad(format!("GET {url}: {e}")))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RenderError::AssetLoad(format!("GET {url}: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn read(&self, path: &Path) -> RenderResult<Vec<u8>> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        tracing::debug!("Reading {}", path.display());
        tokio::fs::read(&path)
            .await
            .map_err(|e| RenderError::AssetLoad(format!("{}: {e}", path.display())))
    }
}

#[async_trait(?Send)]
impl AssetSource for HostAssetSource {
    async fn load(&self, source: &str) -> RenderResult<TextureData> {
        if source.starts_with("data:") {
            return DataUriSource.load(source).await;
        }
        let bytes = match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => self.fetch(url).await?,
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| RenderError::AssetLoad(format!("Bad file URL: {url}")))?;
                self.read(&path).await?
            }
            _ => self.read(Path::new(source)).await?,
        };
        load_image_from_bytes(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_pixel_png() -> Vec<u8> {
        TextureData {
            width: 1,
            height: 1,
            data: vec![255, 0, 0, 255],
            format: design_renderer::image::ImageFormat::Png,
        }
        .to_png()
        .expect("encode")
    }

    #[tokio::test]
    async fn test_relative_path_resolves_against_base_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("logo.png"), one_pixel_png()).expect("write");

        let source = HostAssetSource::new(dir.path()).expect("client");
        let texture = source.load("logo.png").await.expect("load");
        assert_eq!((texture.width, texture.height), (1, 1));

        let url = Url::from_file_path(dir.path().join("logo.png")).expect("file url");
        assert!(source.load(url.as_str()).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_file_is_asset_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = HostAssetSource::new(dir.path()).expect("client");
        let result = source.load("missing.png").await;
        assert!(matches!(result, Err(RenderError::AssetLoad(_))));
    }

    #[tokio::test]
    async fn test_data_uri_needs_no_io() {
        let source = HostAssetSource::new(".").expect("client");
        let result = source.load("data:image/png;base64,bm9wZQ==").await;
        assert!(matches!(result, Err(RenderError::AssetLoad(_))));
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::BoxFuture;
use thiserror::Error;
use url::Url;

use crate::models::Course;
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog is not a valid course list: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Supplies a fresh read-only snapshot of the catalog for each query.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> BoxFuture<'_, Result<Vec<Course>, CatalogError>>;
}

/// Picks the remote catalog when `catalog_url` is configured, the file otherwise.
pub fn from_settings(settings: &Settings) -> Arc<dyn CatalogSource> {
    match &settings.catalog_url {
        Some(url) => Arc::new(RemoteCatalog::new(url.clone())),
        None => Arc::new(FileCatalog::new(settings.catalog_path.clone())),
    }
}

#[derive(Clone, Debug)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalog {
    fn load(&self) -> BoxFuture<'_, Result<Vec<Course>, CatalogError>> {
        Box::pin(async move {
            let bytes = tokio::fs::read(&self.path)
                .await
                .map_err(|source| CatalogError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            Ok(serde_json::from_slice(&bytes)?)
        })
    }
}

#[derive(Clone)]
pub struct RemoteCatalog {
    client: reqwest::Client,
    url: Arc<Url>,
}

impl RemoteCatalog {
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: Arc::new(url),
        }
    }
}

impl CatalogSource for RemoteCatalog {
    fn load(&self) -> BoxFuture<'_, Result<Vec<Course>, CatalogError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(self.url.as_str())
                .send()
                .await?
                .error_for_status()?;
            let body = response.bytes().await?;
            Ok(serde_json::from_slice(&body)?)
        })
    }
}

/// Fixed snapshot, for tests and for embedding the engine without I/O.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    courses: Arc<Vec<Course>>,
}

impl InMemoryCatalog {
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            courses: Arc::new(courses),
        }
    }
}

impl CatalogSource for InMemoryCatalog {
    fn load(&self) -> BoxFuture<'_, Result<Vec<Course>, CatalogError>> {
        let courses = self.courses.as_ref().clone();
        Box::pin(async move { Ok(courses) })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use httpmock::prelude::*;
    use tempfile::NamedTempFile;

    use super::*;

    const CATALOG: &str = r#"[
        {
            "id": 1,
            "venue": {"name": "Leeds"},
            "formatted_start_date": "Sat 12th October 2024",
            "formatted_end_date": "Sun 13th October 2024",
            "days": [{"start_date": "2024-10-12"}, {"start_date": "2024-10-13"}],
            "available_spaces": 5
        }
    ]"#;

    #[tokio::test]
    async fn test_file_catalog_reads_courses() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let courses = FileCatalog::new(file.path()).load().await.unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].venue.name, "Leeds");
    }

    #[tokio::test]
    async fn test_bundled_catalog_decodes() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("storage/courses.json");
        let courses = FileCatalog::new(path).load().await.unwrap();
        assert!(!courses.is_empty());
    }

    #[tokio::test]
    async fn test_file_catalog_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileCatalog::new(dir.path().join("courses.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[tokio::test]
    async fn test_file_catalog_invalid_document() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"not\": \"a list\"}").unwrap();

        let err = FileCatalog::new(file.path()).load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }

    #[tokio::test]
    async fn test_remote_catalog_fetches_courses() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/courses.json");
            then.status(200)
                .header("content-type", "application/json")
                .body(CATALOG);
        });

        let url = Url::parse(&server.url("/courses.json")).unwrap();
        let courses = RemoteCatalog::new(url).load().await.unwrap();
        mock.assert();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].available_spaces, 5);
    }

    #[tokio::test]
    async fn test_remote_catalog_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/courses.json");
            then.status(503);
        });

        let url = Url::parse(&server.url("/courses.json")).unwrap();
        let err = RemoteCatalog::new(url).load().await.unwrap_err();
        assert!(matches!(err, CatalogError::Http(_)));
    }

    #[tokio::test]
    async fn test_in_memory_catalog_returns_snapshot() {
        let courses: Vec<Course> = serde_json::from_str(CATALOG).unwrap();
        let catalog = InMemoryCatalog::new(courses.clone());
        assert_eq!(catalog.load().await.unwrap(), courses);
        assert_eq!(catalog.load().await.unwrap(), courses);
    }
}

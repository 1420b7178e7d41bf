use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AlphabetEngine, EngineError, EngineHandle, SignTable};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const REMOTE_TABLE_FILENAME: &str = "sign_table.json";

/// Where the classification engine comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineSource {
    /// Built-in A-Z engine.
    #[default]
    Builtin,
    /// Sign table read from a local JSON file.
    Table { path: PathBuf },
    /// Sign table downloaded over HTTP, then loaded like a local table.
    Remote { url: String },
}

/// Load and instantiate the engine described by `source`.
///
/// Call at most once per session. `on_progress(bytes_downloaded, total_bytes)`
/// fires only for remote sources; total may be 0 if unknown.
pub async fn initialize<F>(source: &EngineSource, on_progress: F) -> Result<EngineHandle, EngineError>
where
    F: Fn(u64, u64) + Send + 'static,
{
    initialize_in(source, &tables_dir(), on_progress).await
}

/// [`initialize`] with remote tables stored under `download_dir`.
async fn initialize_in<F>(
    source: &EngineSource,
    download_dir: &Path,
    on_progress: F,
) -> Result<EngineHandle, EngineError>
where
    F: Fn(u64, u64) + Send + 'static,
{
    let result = match source {
        EngineSource::Builtin => {
            log::info!("Using built-in alphabet engine");
            Ok(EngineHandle::new(AlphabetEngine))
        }
        EngineSource::Table { path } => load_table(path.clone()).await,
        EngineSource::Remote { url } => {
            match download_table(url, download_dir, on_progress).await {
                Ok(path) => load_table(path).await,
                Err(e) => Err(e),
            }
        }
    };

    result.map_err(|e| EngineError::LoadFailure(e.to_string()))
}

/// Directory for downloaded tables: ~/.local/share/sign-visualizer/tables/
fn tables_dir() -> PathBuf {
    let mut p = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("sign-visualizer");
    p.push("tables");
    p
}

async fn load_table(path: PathBuf) -> Result<EngineHandle, BoxError> {
    let data = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| format!("{}: {e}", path.display()))?;

    let table = tokio::task::spawn_blocking(move || SignTable::from_json(&data)).await??;
    log::info!("Sign table loaded from {}", path.display());
    Ok(EngineHandle::new(table))
}

async fn download_table<F>(url: &str, dir: &Path, on_progress: F) -> Result<PathBuf, BoxError>
where
    F: Fn(u64, u64) + Send + 'static,
{
    let response = reqwest::get(url).await?.error_for_status()?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(REMOTE_TABLE_FILENAME);
    let partial = partial_path(&path);

    if let Err(e) = stream_to_file(response, &partial, on_progress).await {
        if let Err(rm) = tokio::fs::remove_file(&partial).await {
            log::warn!("Failed to remove {}: {rm}", partial.display());
        }
        return Err(e);
    }

    tokio::fs::rename(&partial, &path).await?;
    log::info!("Sign table downloaded to {}", path.display());
    Ok(path)
}

async fn stream_to_file<F>(
    response: reqwest::Response,
    path: &Path,
    on_progress: F,
) -> Result<(), BoxError>
where
    F: Fn(u64, u64) + Send + 'static,
{
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        on_progress(downloaded, total);
    }

    file.flush().await?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut p = path.as_os_str().to_owned();
    p.push(".part");
    PathBuf::from(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Classification, SelectionId};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    /// Serve one HTTP response announcing `content_length` bytes but sending `body`.
    async fn serve_once(body: &'static str, content_length: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut request).await;
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {content_length}\r\nConnection: close\r\n\r\n"
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/signs.json")
    }

    fn no_progress(_: u64, _: u64) {}

    #[tokio::test]
    async fn test_builtin_source() {
        let handle = initialize(&EngineSource::Builtin, no_progress).await.unwrap();
        assert_eq!(handle.total_entries(), 26);
        assert_eq!(
            handle.classify(SelectionId(1)),
            Ok(Classification::Matched('A'))
        );
    }

    #[tokio::test]
    async fn test_table_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("signs.json");
        std::fs::write(&path, r#"{ "total_signs": 3, "signs": { "1": "H", "3": "Y" } }"#)
            .unwrap();

        let handle = initialize(&EngineSource::Table { path }, no_progress)
            .await
            .unwrap();
        assert_eq!(handle.total_entries(), 3);
        assert_eq!(
            handle.classify(SelectionId(3)),
            Ok(Classification::Matched('Y'))
        );
        assert_eq!(handle.classify(SelectionId(2)), Ok(Classification::NoMatch));
    }

    #[tokio::test]
    async fn test_missing_table_is_load_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.json");

        let err = initialize(&EngineSource::Table { path }, no_progress)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::LoadFailure(ref msg) if msg.contains("absent.json")));
    }

    #[tokio::test]
    async fn test_invalid_table_is_load_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "total_signs": 0 }"#).unwrap();

        let err = initialize(&EngineSource::Table { path }, no_progress)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::LoadFailure("sign table declares no signs".into())
        );
    }

    #[tokio::test]
    async fn test_unfetchable_remote_is_load_failure() {
        let source = EngineSource::Remote {
            url: "not a url".into(),
        };
        let err = initialize(&source, no_progress).await.unwrap_err();
        assert!(matches!(err, EngineError::LoadFailure(_)));
    }

    #[tokio::test]
    async fn test_remote_source_downloads_and_reports_progress() {
        const BODY: &str = r#"{ "total_signs": 4, "signs": { "1": "W", "2": "X" } }"#;
        let url = serve_once(BODY, BODY.len()).await;
        let dir = TempDir::new().unwrap();

        let progress = Arc::new(Mutex::new(Vec::new()));
        let recorded = progress.clone();
        let handle = initialize_in(&EngineSource::Remote { url }, dir.path(), move |done, total| {
            recorded.lock().unwrap().push((done, total));
        })
        .await
        .unwrap();

        assert_eq!(handle.total_entries(), 4);
        assert_eq!(
            handle.classify(SelectionId(2)),
            Ok(Classification::Matched('X'))
        );
        assert_eq!(handle.classify(SelectionId(3)), Ok(Classification::NoMatch));

        let progress = progress.lock().unwrap();
        let total = BODY.len() as u64;
        assert!(!progress.is_empty());
        assert_eq!(progress.last(), Some(&(total, total)));

        let saved = dir.path().join(REMOTE_TABLE_FILENAME);
        assert_eq!(std::fs::read_to_string(&saved).unwrap(), BODY);
        assert!(!partial_path(&saved).exists());
    }

    #[tokio::test]
    async fn test_truncated_download_leaves_no_partial_file() {
        let url = serve_once(r#"{ "total_signs": "#, 4096).await;
        let dir = TempDir::new().unwrap();

        let err = initialize_in(&EngineSource::Remote { url }, dir.path(), no_progress)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::LoadFailure(_)));

        let saved = dir.path().join(REMOTE_TABLE_FILENAME);
        assert!(!saved.exists());
        assert!(!partial_path(&saved).exists());
    }

    #[tokio::test]
    async fn test_oversized_table_is_load_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.json");
        std::fs::write(&path, r#"{ "total_signs": 2147483647 }"#).unwrap();

        let err = initialize(&EngineSource::Table { path }, no_progress)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::LoadFailure(ref msg) if msg.contains("too large")));
    }

    #[test]
    fn test_source_serde() {
        let json = serde_json::to_string(&EngineSource::Builtin).unwrap();
        assert_eq!(json, r#"{"kind":"builtin"}"#);

        let source: EngineSource =
            serde_json::from_str(r#"{"kind":"remote","url":"https://example.com/t.json"}"#)
                .unwrap();
        assert_eq!(
            source,
            EngineSource::Remote {
                url: "https://example.com/t.json".into()
            }
        );
    }

    #[test]
    fn test_partial_path() {
        assert_eq!(
            partial_path(Path::new("/tmp/sign_table.json")),
            PathBuf::from("/tmp/sign_table.json.part")
        );
    }
}

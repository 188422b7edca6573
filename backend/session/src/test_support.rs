//! In-memory doubles shared by the handler and manager tests.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, ensure, Result};
use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use tempfile::TempDir;

use media::{Fetcher, ImagePipeline, MediaDirs, MediaError};
use morejpeg_core::{ChatCache, ChatId, ChatTransport};

use crate::handler::{ChatSessionHandler, HandlerSettings};

pub fn png_bytes() -> Vec<u8> {
    let img = RgbImage::from_fn(24, 16, |x, y| Rgb([(x * 10) as u8, (y * 15) as u8, 90]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

/// Records everything the handler sends; serves uploaded files from memory.
#[derive(Default)]
pub struct RecordingTransport {
    pub photos: Mutex<Vec<(ChatId, PathBuf)>>,
    pub texts: Mutex<Vec<(ChatId, String)>>,
    pub downloads: Mutex<Vec<String>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    photos_fail: AtomicBool,
}

impl RecordingTransport {
    pub fn upload(&self, file_id: &str, bytes: Vec<u8>) {
        self.files.lock().unwrap().insert(file_id.to_string(), bytes);
    }

    /// Make every later `send_photo` call fail.
    pub fn fail_photo_sends(&self) {
        self.photos_fail.store(true, Ordering::SeqCst);
    }

    pub fn photos_for(&self, chat_id: ChatId) -> usize {
        self.photos
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == chat_id)
            .count()
    }

    pub fn texts_for(&self, chat_id: ChatId) -> Vec<String> {
        self.texts
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| *c == chat_id)
            .map(|(_, t)| t.clone())
            .collect()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_photo(&self, chat_id: ChatId, path: &Path) -> Result<()> {
        if self.photos_fail.load(Ordering::SeqCst) {
            bail!("photo upload rejected");
        }
        ensure!(path.exists(), "sent photo {} does not exist", path.display());
        self.photos
            .lock()
            .unwrap()
            .push((chat_id, path.to_path_buf()));
        Ok(())
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.texts.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn download_file(&self, file_id: &str, dest: &Path) -> Result<()> {
        self.downloads.lock().unwrap().push(file_id.to_string());
        let bytes = self
            .files
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown file {file_id}"))?;
        tokio::fs::write(dest, bytes).await?;
        Ok(())
    }
}

/// Serves canned bodies per URL; anything else is a 404.
#[derive(Default)]
pub struct CannedFetcher {
    bodies: Mutex<HashMap<String, (Vec<u8>, &'static str)>>,
}

impl CannedFetcher {
    pub fn serve(&self, url: &str, body: Vec<u8>, extension: &'static str) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), (body, extension));
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, MediaError> {
        let found = self.bodies.lock().unwrap().get(url).cloned();
        let Some((body, extension)) = found else {
            return Err(MediaError::HttpStatus {
                status: 404,
                url: url.to_string(),
            });
        };
        let path = dest_dir.join(format!("{}.{extension}", uuid_like()));
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }
}

fn uuid_like() -> String {
    use std::sync::atomic::AtomicUsize;
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    format!("download-{}", COUNTER.fetch_add(1, Ordering::SeqCst))
}

pub struct Harness {
    pub root: TempDir,
    pub transport: Arc<RecordingTransport>,
    pub fetcher: Arc<CannedFetcher>,
    pub cache: Arc<ChatCache>,
    pub handler: Arc<ChatSessionHandler>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_cache(ChatCache::new()).await
    }

    pub async fn with_cache(cache: ChatCache) -> Self {
        let root = tempfile::tempdir().unwrap();
        let dirs = MediaDirs::new(root.path().join("downloads"), root.path().join("artifacts"));
        dirs.ensure().await.unwrap();

        let transport = Arc::new(RecordingTransport::default());
        let fetcher = Arc::new(CannedFetcher::default());
        let cache = Arc::new(cache);
        let pipeline = Arc::new(ImagePipeline::new(dirs, fetcher.clone()));
        let handler = Arc::new(ChatSessionHandler::new(
            cache.clone(),
            pipeline,
            transport.clone(),
            HandlerSettings::default(),
        ));

        Self {
            root,
            transport,
            fetcher,
            cache,
            handler,
        }
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.path().join("downloads")
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.path().join("artifacts")
    }
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

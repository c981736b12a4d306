//! Background sprite loading.
//!
//! Requests go to a single worker thread and complete on a later frame.
//! Every handle is stamped with the loader generation it was issued in;
//! [`AssetLoader::begin_generation`] invalidates all outstanding handles and
//! completions that arrive for an older generation are dropped.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, warn};

use crate::sprite_keys::{validate_sprite_key, SpriteKeyError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SpriteImage {
    /// Returns `None` when `rgba` does not hold exactly `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    /// Opaque single-colour image, used in place of assets that failed to load.
    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let rgba = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(color)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetLoadError {
    #[error("invalid sprite key {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: SpriteKeyError,
    },
    #[error("sprite {key:?} not found")]
    NotFound { key: String },
    #[error("failed to open {path}: {message}")]
    Open { path: PathBuf, message: String },
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("asset worker is not running; cannot load {key:?}")]
    WorkerUnavailable { key: String },
}

/// Where sprite bytes come from. Implementations run on the worker thread.
pub trait AssetSource: Send + Sync {
    fn load(&self, key: &str) -> Result<SpriteImage, AssetLoadError>;
}

/// Reads `<asset_root>/sprites/<key>.png`.
#[derive(Debug, Clone)]
pub struct DiskSpriteSource {
    asset_root: PathBuf,
}

impl DiskSpriteSource {
    pub fn new(asset_root: PathBuf) -> Self {
        Self { asset_root }
    }

    pub fn sprite_path(&self, key: &str) -> Result<PathBuf, AssetLoadError> {
        validate_sprite_key(key).map_err(|source| AssetLoadError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        Ok(self.asset_root.join("sprites").join(format!("{key}.png")))
    }
}

impl AssetSource for DiskSpriteSource {
    fn load(&self, key: &str) -> Result<SpriteImage, AssetLoadError> {
        let path = self.sprite_path(key)?;
        if !path.is_file() {
            return Err(AssetLoadError::NotFound {
                key: key.to_string(),
            });
        }
        load_png_rgba(&path)
    }
}

fn load_png_rgba(path: &Path) -> Result<SpriteImage, AssetLoadError> {
    let reader = ImageReader::open(path).map_err(|error| AssetLoadError::Open {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    let decoded = reader.decode().map_err(|error| AssetLoadError::Decode {
        path: path.to_path_buf(),
        message: error.to_string(),
    })?;
    let image = decoded.to_rgba8();
    Ok(SpriteImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetHandle {
    key: String,
    generation: u64,
}

impl AssetHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssetPoll {
    Pending,
    Ready(Arc<SpriteImage>),
    Failed(AssetLoadError),
    /// The handle was issued before the last [`AssetLoader::begin_generation`].
    Stale,
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Pending,
    Ready(Arc<SpriteImage>),
    Failed(AssetLoadError),
}

struct LoadJob {
    key: String,
    generation: u64,
}

struct LoadCompletion {
    key: String,
    generation: u64,
    result: Result<SpriteImage, AssetLoadError>,
}

pub struct AssetLoader {
    generation: u64,
    entries: HashMap<String, CacheEntry>,
    jobs: Option<Sender<LoadJob>>,
    completions: Receiver<LoadCompletion>,
    worker: Option<JoinHandle<()>>,
}

impl AssetLoader {
    pub fn spawn(source: Arc<dyn AssetSource>) -> io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<LoadJob>();
        let (done_tx, done_rx) = mpsc::channel::<LoadCompletion>();
        let worker = thread::Builder::new()
            .name("asset-loader".to_string())
            .spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let result = source.load(&job.key);
                    let completion = LoadCompletion {
                        key: job.key,
                        generation: job.generation,
                        result,
                    };
                    if done_tx.send(completion).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            generation: 0,
            entries: HashMap::new(),
            jobs: Some(job_tx),
            completions: done_rx,
            worker: Some(worker),
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidates every outstanding handle. Decoded images stay cached;
    /// pending and failed keys are forgotten so the next request retries them.
    pub fn begin_generation(&mut self) -> u64 {
        self.generation = self.generation.saturating_add(1);
        self.entries
            .retain(|_, entry| matches!(entry, CacheEntry::Ready(_)));
        debug!(generation = self.generation, "asset_generation_started");
        self.generation
    }

    pub fn request(&mut self, key: &str) -> AssetHandle {
        let handle = AssetHandle {
            key: key.to_string(),
            generation: self.generation,
        };
        if self.entries.contains_key(key) {
            return handle;
        }

        let job = LoadJob {
            key: key.to_string(),
            generation: self.generation,
        };
        let sent = self
            .jobs
            .as_ref()
            .map(|jobs| jobs.send(job).is_ok())
            .unwrap_or(false);
        let entry = if sent {
            CacheEntry::Pending
        } else {
            let error = AssetLoadError::WorkerUnavailable {
                key: key.to_string(),
            };
            warn!(sprite_key = key, error = %error, "sprite_load_failed");
            CacheEntry::Failed(error)
        };
        self.entries.insert(key.to_string(), entry);
        handle
    }

    pub fn poll(&self, handle: &AssetHandle) -> AssetPoll {
        if handle.generation != self.generation {
            return AssetPoll::Stale;
        }
        match self.entries.get(&handle.key) {
            Some(CacheEntry::Ready(image)) => AssetPoll::Ready(Arc::clone(image)),
            Some(CacheEntry::Failed(error)) => AssetPoll::Failed(error.clone()),
            Some(CacheEntry::Pending) | None => AssetPoll::Pending,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Pending))
            .count()
    }

    /// Applies every completion that has already arrived. Never blocks.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.completions.try_recv() {
                Ok(completion) => {
                    if self.apply_completion(completion) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Waits up to `timeout` for all pending requests of the current
    /// generation to complete.
    pub fn pump_blocking(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = self.pump();
        while self.pending_count() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.completions.recv_timeout(remaining) {
                Ok(completion) => {
                    if self.apply_completion(completion) {
                        applied += 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        applied
    }

    fn apply_completion(&mut self, completion: LoadCompletion) -> bool {
        if completion.generation != self.generation {
            debug!(
                sprite_key = %completion.key,
                completion_generation = completion.generation,
                generation = self.generation,
                "asset_load_discarded_stale"
            );
            return false;
        }
        let entry = match completion.result {
            Ok(image) => CacheEntry::Ready(Arc::new(image)),
            Err(error) => {
                warn!(sprite_key = %completion.key, error = %error, "sprite_load_failed");
                CacheEntry::Failed(error)
            }
        };
        self.entries.insert(completion.key, entry);
        true
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

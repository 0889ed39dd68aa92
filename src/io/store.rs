//! # Image stores: where the I/O collaborator reads and writes images.
//!
//! [`ImageStore`] is the seam between the engine's I/O protocol and actual
//! persistence. Two stores are provided:
//! - [`PgmStore`]: binary PGM (`P5`) files in an input and an output directory;
//! - [`MemoryStore`]: an in-memory map, for embedding and tests.
//!
//! Names never include an extension; `PgmStore` appends `.pgm`.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Persistence backend of the I/O collaborator.
///
/// ### Implementation requirements
/// - `load` returns exactly `width * height` row-major bytes or an error.
/// - `save` persists `bytes` (row-major, `width * height` long) under `name`.
/// - Use async I/O; avoid blocking the executor.
#[async_trait]
pub trait ImageStore: Send + Sync + 'static {
    /// Reads the image called `name`.
    async fn load(&self, name: &str, width: usize, height: usize) -> io::Result<Vec<u8>>;

    /// Writes the image called `name`.
    async fn save(&self, name: &str, width: usize, height: usize, bytes: &[u8]) -> io::Result<()>;
}

/// Binary PGM files: reads `<input>/<name>.pgm`, writes `<output>/<name>.pgm`.
#[derive(Debug, Clone)]
pub struct PgmStore {
    input: PathBuf,
    output: PathBuf,
}

impl PgmStore {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

#[async_trait]
impl ImageStore for PgmStore {
    async fn load(&self, name: &str, width: usize, height: usize) -> io::Result<Vec<u8>> {
        let path = self.input.join(format!("{name}.pgm"));
        let raw = tokio::fs::read(&path).await?;
        let (w, h, pixels) = parse_pgm(&raw)?;
        if (w, h) != (width, height) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{}: is {w}x{h}, expected {width}x{height}", path.display()),
            ));
        }
        Ok(pixels.to_vec())
    }

    async fn save(&self, name: &str, width: usize, height: usize, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.output).await?;
        let mut out = format!("P5\n{width} {height}\n255\n").into_bytes();
        out.extend_from_slice(bytes);
        tokio::fs::write(self.output.join(format!("{name}.pgm")), out).await
    }
}

/// Parses a binary PGM with maxval 255: returns `(width, height, pixels)`.
///
/// Header tokens may be separated by any whitespace and `#` comments.
pub fn parse_pgm(raw: &[u8]) -> io::Result<(usize, usize, &[u8])> {
    let invalid = |msg: &str| io::Error::new(io::ErrorKind::InvalidData, format!("pgm: {msg}"));

    let mut pos = 0;
    let mut tokens = Vec::with_capacity(4);
    while tokens.len() < 4 {
        while pos < raw.len() && (raw[pos].is_ascii_whitespace() || raw[pos] == b'#') {
            if raw[pos] == b'#' {
                while pos < raw.len() && raw[pos] != b'\n' {
                    pos += 1;
                }
            } else {
                pos += 1;
            }
        }
        let start = pos;
        while pos < raw.len() && !raw[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if start == pos {
            return Err(invalid("truncated header"));
        }
        tokens.push(std::str::from_utf8(&raw[start..pos]).map_err(|_| invalid("non-ascii header"))?);
    }
    // exactly one whitespace byte separates the header from the raster
    pos += 1;

    if tokens[0] != "P5" {
        return Err(invalid("only binary P5 is supported"));
    }
    let num = |t: &str| t.parse::<usize>().map_err(|_| invalid("bad number in header"));
    let (width, height, maxval) = (num(tokens[1])?, num(tokens[2])?, num(tokens[3])?);
    if maxval != 255 {
        return Err(invalid("maxval must be 255"));
    }

    let end = pos + width * height;
    if raw.len() < end {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("pgm: raster has {} of {} bytes", raw.len().saturating_sub(pos), width * height),
        ));
    }
    Ok((width, height, &raw[pos..end]))
}

/// In-memory image store.
///
/// Cloning shares the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    images: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` under `name`.
    pub async fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        self.images.write().await.insert(name.into(), bytes);
    }

    /// Returns a copy of the image called `name`.
    pub async fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.images.read().await.get(name).cloned()
    }

    /// Returns the stored names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.images.read().await.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn load(&self, name: &str, _width: usize, _height: usize) -> io::Result<Vec<u8>> {
        self.get(name)
            .await
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no image {name:?}")))
    }

    async fn save(&self, name: &str, _width: usize, _height: usize, bytes: &[u8]) -> io::Result<()> {
        self.insert(name, bytes.to_vec()).await;
        Ok(())
    }
}

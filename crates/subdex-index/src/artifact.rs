//! Building and persisting the paired `(index, metadata)` artifact.
//!
//! Two files share one prefix: `<prefix>.index` holds the raw vectors in a
//! little-endian binary layout, `<prefix>_meta.msgpack` the ordered
//! `(subject, links)` pairs. `metadata[i]` corresponds to the i-th vector
//! added; that positional correspondence is the only join key between a
//! search hit and its text, so both files are meaningless alone.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use subdex_core::traits::Embedder;
use subdex_core::types::SubjectRow;
use subdex_core::{Error, Result};

use crate::flat::{l2_normalize, FlatIndex};

const INDEX_MAGIC: &[u8; 4] = b"SDXF";
const INDEX_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// How many subjects go into one embedding call.
const EMBED_BATCH: usize = 64;

#[derive(Debug)]
pub struct Artifact {
    pub index: FlatIndex,
    pub metadata: Vec<(String, String)>,
}

impl Artifact {
    /// Embed every subject in row order and build the flat index. Vectors
    /// are unit-normalized here regardless of what the embedder returned,
    /// so inner-product search is cosine similarity by construction.
    pub fn build(rows: &[SubjectRow], embedder: &dyn Embedder) -> Result<Self> {
        let mut index = FlatIndex::new(embedder.dim())?;
        let mut metadata = Vec::with_capacity(rows.len());

        let pb = ProgressBar::new(rows.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} subjects")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        for batch in rows.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|r| r.subject.clone()).collect();
            let vectors = embedder
                .embed_batch(&texts)
                .map_err(|e| Error::Embedding(e.to_string()))?;
            for (row, mut vector) in batch.iter().zip(vectors.into_iter()) {
                l2_normalize(&mut vector);
                index.add(&vector)?;
                metadata.push((row.subject.clone(), row.links.clone()));
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        info!(vectors = index.len(), dim = index.dim(), "built artifact");
        Ok(Self { index, metadata })
    }

    /// Write both files. Each file is serialized fully in memory first, so
    /// a failure leaves no half-written artifact for this prefix.
    pub fn save(&self, prefix: &Path) -> Result<()> {
        debug_assert_eq!(self.index.len(), self.metadata.len());
        if let Some(parent) = prefix.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let raw = self.index.raw();
        let mut bytes = Vec::with_capacity(HEADER_LEN + raw.len() * 4);
        bytes.extend_from_slice(INDEX_MAGIC);
        bytes.extend_from_slice(&INDEX_VERSION.to_le_bytes());
        bytes.extend_from_slice(&u32::try_from(self.index.dim()).map_err(|_| {
            Error::Index(format!("dimension {} does not fit the file format", self.index.dim()))
        })?.to_le_bytes());
        bytes.extend_from_slice(&(self.index.len() as u64).to_le_bytes());
        for value in raw {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        fs::write(index_path(prefix), bytes)?;

        let meta_bytes = rmp_serde::to_vec(&self.metadata)
            .map_err(|e| Error::Index(format!("failed to serialize metadata: {e}")))?;
        fs::write(meta_path(prefix), meta_bytes)?;

        info!(prefix = %prefix.display(), vectors = self.index.len(), "saved artifact");
        Ok(())
    }

    /// Load both files; either one missing is a [`Error::MissingFile`].
    /// A count mismatch between the two is tolerated here (per-hit skip at
    /// query time), but it is worth a warning.
    pub fn load(prefix: &Path) -> Result<Self> {
        let index_file = index_path(prefix);
        let meta_file = meta_path(prefix);
        if !index_file.exists() {
            return Err(Error::missing(&index_file));
        }
        if !meta_file.exists() {
            return Err(Error::missing(&meta_file));
        }

        let bytes = fs::read(&index_file)?;
        let index = decode_index(&bytes)
            .map_err(|msg| Error::Index(format!("{}: {msg}", index_file.display())))?;

        let meta_bytes = fs::read(&meta_file)?;
        let metadata: Vec<(String, String)> = rmp_serde::from_slice(&meta_bytes)
            .map_err(|e| Error::MalformedInput(format!("{}: {e}", meta_file.display())))?;

        if metadata.len() != index.len() {
            warn!(
                vectors = index.len(),
                metadata = metadata.len(),
                "index and metadata counts differ; unmatched hits will be skipped"
            );
        }
        info!(prefix = %prefix.display(), vectors = index.len(), "loaded artifact");
        Ok(Self { index, metadata })
    }
}

fn decode_index(bytes: &[u8]) -> std::result::Result<FlatIndex, String> {
    if bytes.len() < HEADER_LEN {
        return Err("file shorter than header".to_string());
    }
    if &bytes[0..4] != INDEX_MAGIC {
        return Err("bad magic".to_string());
    }
    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != INDEX_VERSION {
        return Err(format!("unsupported version {version}"));
    }
    let dim = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    let count = u64::from_le_bytes([
        bytes[12], bytes[13], bytes[14], bytes[15], bytes[16], bytes[17], bytes[18], bytes[19],
    ]) as usize;

    let payload = &bytes[HEADER_LEN..];
    if payload.len() != count * dim * 4 {
        return Err(format!(
            "payload is {} bytes, expected {} for {} x {}",
            payload.len(),
            count * dim * 4,
            count,
            dim
        ));
    }
    let data: Vec<f32> = payload
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    FlatIndex::from_raw(dim, data).map_err(|e| e.to_string())
}

/// `<prefix>.index`
pub fn index_path(prefix: &Path) -> PathBuf {
    let mut s = prefix.as_os_str().to_os_string();
    s.push(".index");
    PathBuf::from(s)
}

/// `<prefix>_meta.msgpack`
pub fn meta_path(prefix: &Path) -> PathBuf {
    let mut s = prefix.as_os_str().to_os_string();
    s.push("_meta.msgpack");
    PathBuf::from(s)
}

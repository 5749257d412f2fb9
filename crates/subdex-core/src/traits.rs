/// Text to fixed-length vector. The backend (real model or test stub) is
/// chosen once per process; index build and query must share one instance
/// so both sides embed with the same configuration.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

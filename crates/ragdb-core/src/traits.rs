/// Maps text to fixed-dimension vectors.
///
/// Implementations must be deterministic for a fixed model and must return
/// exactly one vector of length `dim()` per input text.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `hash:d384`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

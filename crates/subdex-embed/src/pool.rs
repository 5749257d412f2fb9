use anyhow::Result;
use candle_core::{DType, Tensor};

/// Mean-pool `[B,T,H]` hidden states over the unmasked positions,
/// returning `[B,H]`.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let dims = hidden.dims();
    assert_eq!(dims.len(), 3, "hidden shape must be [B,T,H]");
    let hidden_dim = dims[2];

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?;
    let mask_broadcast =
        mask_3d.broadcast_as(hidden.shape()).unwrap_or(mask_3d.repeat((1, 1, hidden_dim))?);
    let masked = (hidden * &mask_broadcast)?;
    let sum = masked.sum(1)?;
    let lengths = mask.sum(1)?.unsqueeze(1)?.to_dtype(sum.dtype())?;
    Ok(sum.broadcast_div(&lengths)?)
}

/// L2-normalize `[B,H]` embeddings so inner product equals cosine
/// similarity downstream.
pub fn l2_normalize(embeddings: &Tensor) -> Result<Tensor> {
    let eps_val = match embeddings.dtype() {
        DType::F16 => 1e-6f32,
        _ => 1e-12f32,
    };
    let eps = Tensor::new(&[eps_val], embeddings.device())?
        .to_dtype(embeddings.dtype())?
        .unsqueeze(0)?;
    let norm = embeddings.sqr()?.sum_keepdim(1)?.sqrt()?;
    let norm = norm.broadcast_add(&eps)?;
    Ok(embeddings.broadcast_div(&norm)?)
}

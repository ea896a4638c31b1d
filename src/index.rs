use anyhow::Result;

/// Flat inner-product index over fixed-dimension vectors. Callers normalize
/// vectors before insertion and queries before search, which makes the inner
/// product equal to cosine similarity.
#[derive(Debug)]
pub struct VectorIndex {
    vectors: Vec<Vec<f32>>,
    dims: usize,
}

impl VectorIndex {
    /// Builds an index from pre-normalized vectors. All vectors must share
    /// one non-zero dimensionality.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dims = match vectors.first() {
            Some(first) => first.len(),
            None => anyhow::bail!("cannot build an index from zero embeddings"),
        };
        if dims == 0 {
            anyhow::bail!("embedding vectors must have at least one dimension");
        }
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dims {
                anyhow::bail!(
                    "embedding {} has {} dimensions, expected {}",
                    position,
                    vector.len(),
                    dims
                );
            }
        }
        Ok(Self { vectors, dims })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Returns the `k` entries most similar to `query` as (position, score)
    /// pairs, highest score first. Among equal scores, insertion order wins.
    /// Asking for more entries than the index holds returns them all.
    /// `query` must have the index dimensionality.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        debug_assert_eq!(query.len(), self.dims);
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| (position, dot(query, vector)))
            .collect();
        // Stable sort keeps insertion order among ties.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Scales `vector` to unit length in place. Vectors with near-zero norm are
/// left untouched.
pub fn normalize_l2(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

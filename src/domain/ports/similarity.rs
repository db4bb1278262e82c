/// Symmetric string similarity in `[0, 1]` where identical inputs score 1.
pub trait SimilarityFunction: Send + Sync {
    fn score(&self, a: &str, b: &str) -> f32;
}

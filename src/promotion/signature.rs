//! Task signature function: the promotion unit. Grounded verbatim
//! on `promotion_pipeline.py::_task_signature`.

use md5::{Digest, Md5};

/// `category ++ ":" ++` the 8-hex-digit MD5 prefix of the first 100
/// characters of `description`. Deterministic, and collision-resistant
/// enough for this purpose.
pub fn sign(category: &str, description: &str) -> String {
    let prefix: String = description.chars().take(100).collect();
    let mut hasher = Md5::new();
    hasher.update(prefix.as_bytes());
    let digest = hasher.finalize();
    format!("{}:{}", category, &hex::encode(digest)[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic() {
        assert_eq!(
            sign("algorithms", "two-sum problem"),
            sign("algorithms", "two-sum problem")
        );
    }

    #[test]
    fn signature_collapses_shared_template_prefix() {
        let base: String = "Two sum: given N integers and a target, print two indices whose values sum to it or -1 if none".chars().take(100).collect();
        let a = sign("algorithms", &base);
        let b = sign("algorithms", &format!("{}, instance with numbers 2 7 11 15", base));
        assert_eq!(a, b);
    }

    #[test]
    fn signature_distinguishes_categories() {
        assert_ne!(sign("algorithms", "x"), sign("strings", "x"));
    }
}

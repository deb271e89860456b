//! Content-based hashing for run IDs.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over the JSON form of the case configuration and the solver version.
pub fn compute_run_id<C: Serialize>(config: &C, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());
    hasher.update(solver_version.as_bytes());

    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Case {
        length_m: f64,
        workers: usize,
    }

    #[test]
    fn hash_stability() {
        let case = Case {
            length_m: 20.0,
            workers: 4,
        };
        let a = compute_run_id(&case, "v1");
        assert_eq!(a, compute_run_id(&case, "v1"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = Case {
            length_m: 20.0,
            workers: 4,
        };
        let b = Case {
            length_m: 20.5,
            workers: 4,
        };
        assert_ne!(compute_run_id(&a, "v1"), compute_run_id(&b, "v1"));
        assert_ne!(compute_run_id(&a, "v1"), compute_run_id(&a, "v2"));
    }
}

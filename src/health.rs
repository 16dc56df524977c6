//! Health-check handlers.
//!
//! | Check | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can it write filtered images? |

use std::path::Path;

use http::StatusCode;
use tracing::warn;

use crate::{Request, Response};

/// Always `200 OK` with body `"ok"`. If the process can answer HTTP at all,
/// it is alive.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"` when `scratch_dir` exists or can be created,
/// `503 Service Unavailable` otherwise.
pub async fn readiness(scratch_dir: &Path) -> Response {
    match tokio::fs::create_dir_all(scratch_dir).await {
        Ok(()) => Response::text("ready"),
        Err(e) => {
            warn!(dir = %scratch_dir.display(), error = %e, "scratch directory unavailable");
            Response::status(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_when_scratch_dir_can_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("scratch");

        let res = readiness(&scratch).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert!(scratch.is_dir());
    }

    #[tokio::test]
    async fn not_ready_when_scratch_path_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();

        let res = readiness(&file).await;
        assert_eq!(res.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

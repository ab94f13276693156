//! One-shot background model loading.
//!
//! The model file is the only thing the viewer touches that can take a
//! while, so it is read and parsed on a spawned thread while the first
//! frames already render the floor and lights. The result comes back over a
//! channel the frame loop polls; there is no cancellation and no retry.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread;

use crate::geometry::{GeometryError, Primitive, load_model};

/// Handle to an in-flight model load.
pub struct ModelLoad {
    rx: Receiver<Result<Vec<Primitive>, GeometryError>>,
}

impl ModelLoad {
    /// Kick off a load of `path` on a background thread.
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = channel();
        thread::spawn(move || {
            // The receiver may already be gone if the app shut down; a
            // failed send is then irrelevant.
            let _ = tx.send(load_model(&path));
        });
        Self { rx }
    }

    /// Non-blocking poll for the load result.
    ///
    /// Returns `None` while the load is still running. Once it returns
    /// `Some`, the handle is spent and further polls report a loader error.
    pub fn poll(&self) -> Option<Result<Vec<Primitive>, GeometryError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(GeometryError::Parse(
                "model loader thread exited without a result".into(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn poll_until_done(load: &ModelLoad) -> Result<Vec<Primitive>, GeometryError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = load.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "model load never completed");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn missing_file_resolves_to_an_error_not_a_panic() {
        let load = ModelLoad::spawn(PathBuf::from("assets/models/no-such-file.gltf"));
        let result = poll_until_done(&load);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_format_resolves_to_an_error() {
        let load = ModelLoad::spawn(PathBuf::from("assets/models/part.step"));
        let result = poll_until_done(&load);
        assert!(matches!(result, Err(GeometryError::UnknownFormat(_))));
    }
}

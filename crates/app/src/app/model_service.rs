use furnish_core::ModelService;

#[cfg(not(target_arch = "wasm32"))]
pub(crate) use threaded::ThreadedModelService;

/// Service used by the app: background threads on native, inline on the web
/// where models come back unresolved and render as placeholders.
pub(crate) fn default_model_service() -> Box<dyn ModelService> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        Box::new(ThreadedModelService::new())
    }
    #[cfg(target_arch = "wasm32")]
    {
        Box::new(furnish_core::InlineModelService::default())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod threaded {
    use std::path::Path;
    use std::sync::mpsc::{channel, Receiver, TryRecvError};
    use std::thread;

    use furnish_core::{load_model_file, ModelResponse, ModelService};
    use furnish_scene::SceneMesh;

    type Loader = fn(&Path) -> Result<SceneMesh, String>;

    struct PendingLoad {
        ticket: u64,
        model_id: String,
        receiver: Receiver<Result<SceneMesh, String>>,
    }

    impl PendingLoad {
        /// The finished response, or `None` while the loader is still running.
        fn try_finish(&self) -> Option<ModelResponse> {
            let result = match self.receiver.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return None,
                // loader thread panicked before sending
                Err(TryRecvError::Disconnected) => {
                    Err(format!("loader for {} stopped unexpectedly", self.model_id))
                }
            };
            Some(ModelResponse {
                ticket: self.ticket,
                model_id: self.model_id.clone(),
                result,
            })
        }
    }

    /// One loader thread per request, each with its own result channel.
    pub(crate) struct ThreadedModelService {
        loader: Loader,
        pending: Vec<PendingLoad>,
    }

    impl ThreadedModelService {
        pub(crate) fn new() -> Self {
            Self::with_loader(load_model_file)
        }

        pub(crate) fn with_loader(loader: Loader) -> Self {
            Self {
                loader,
                pending: Vec::new(),
            }
        }

        pub(crate) fn in_flight(&self) -> usize {
            self.pending.len()
        }
    }

    impl ModelService for ThreadedModelService {
        fn request(&mut self, ticket: u64, model_id: &str, path: &Path) {
            let (sender, receiver) = channel();
            let loader = self.loader;
            let path = path.to_path_buf();
            let spawned = thread::Builder::new()
                .name(format!("model-{model_id}"))
                .spawn(move || {
                    let _ = sender.send(loader(&path));
                });
            if let Err(err) = spawned {
                tracing::warn!("failed to start loader for {}: {}", model_id, err);
            }
            // a failed spawn drops the sender, so the next poll reports it
            self.pending.push(PendingLoad {
                ticket,
                model_id: model_id.to_string(),
                receiver,
            });
        }

        fn poll(&mut self) -> Vec<ModelResponse> {
            let mut finished = Vec::new();
            self.pending.retain(|load| match load.try_finish() {
                Some(response) => {
                    finished.push(response);
                    false
                }
                None => true,
            });
            finished
        }
    }

}

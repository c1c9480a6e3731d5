use super::{
    debounce::Debouncer,
    session::{EditorSession, Preview},
};
use crate::SessionResult;
use sketch_effect::SketchParams;
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

/// A shared session whose preview is re-rendered once per quiet period of
/// parameter edits.
pub struct LiveEditor {
    session: Arc<Mutex<EditorSession>>,
    requested: Mutex<SketchParams>,
    debouncer: Debouncer<SketchParams>,
}

impl LiveEditor {
    pub fn new<F>(session: EditorSession, window: Duration, mut on_preview: F) -> Self
    where
        F: FnMut(SessionResult<Preview>) + Send + 'static,
    {
        let requested = Mutex::new(session.params());
        let session = Arc::new(Mutex::new(session));
        let shared = session.clone();

        let debouncer = Debouncer::new(window, move |params| {
            let result = {
                let mut session = lock(&shared);
                session.set_params(params);
                session.render_preview()
            };
            on_preview(result);
        });

        Self {
            session,
            requested,
            debouncer,
        }
    }

    /// Queue a preview with new parameters.
    pub fn set_params(&self, params: SketchParams) {
        *lock(&self.requested) = params;
        self.debouncer.schedule(params);
    }

    /// Queue a preview after layer edits, keeping the latest requested
    /// parameters even when they are still pending.
    pub fn refresh(&self) {
        let params = *lock(&self.requested);
        self.debouncer.schedule(params);
    }

    /// Drop the pending preview and fall back to the applied parameters.
    pub fn cancel(&self) {
        self.debouncer.cancel();
        let applied = self.session().params();
        *lock(&self.requested) = applied;
    }

    /// Parameters of the most recent request, applied or not.
    pub fn requested_params(&self) -> SketchParams {
        *lock(&self.requested)
    }

    pub fn session(&self) -> MutexGuard<'_, EditorSession> {
        lock(&self.session)
    }

    pub fn shared_session(&self) -> Arc<Mutex<EditorSession>> {
        self.session.clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

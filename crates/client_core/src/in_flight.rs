use std::sync::{Mutex, PoisonError};

/// Clears a surface's in-flight flag if the request future is dropped before its response
/// is applied, so a canceled caller cannot leave the surface locked.
///
/// Call [`InFlight::disarm`] once the response is back; from then on the normal apply path
/// owns the flag.
pub(crate) struct InFlight<'a, S> {
    state: &'a Mutex<S>,
    clear: fn(&mut S),
    armed: bool,
}

impl<'a, S> InFlight<'a, S> {
    pub(crate) fn new(state: &'a Mutex<S>, clear: fn(&mut S)) -> Self {
        Self {
            state,
            clear,
            armed: true,
        }
    }

    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl<S> Drop for InFlight<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            (self.clear)(&mut state);
        }
    }
}

pub type RequestId = u64;

/// Progress of the one upload in flight. Exists only while a request is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadState {
    request_id: RequestId,
    percent_complete: u8,
}

impl UploadState {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            percent_complete: 0,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn percent_complete(&self) -> u8 {
        self.percent_complete
    }

    /// Applies a byte-progress event. Returns true if the percentage moved.
    ///
    /// Never decreases; events for other requests are ignored.
    pub fn record(&mut self, request_id: RequestId, loaded: u64, total: u64) -> bool {
        if request_id != self.request_id {
            return false;
        }
        let next = percent_complete(loaded, total);
        if next > self.percent_complete {
            self.percent_complete = next;
            true
        } else {
            false
        }
    }
}

/// Floor percentage so 100 is only reported once every byte went out.
/// An empty body counts as fully sent.
pub fn percent_complete(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let loaded = loaded.min(total);
    ((u128::from(loaded) * 100) / u128::from(total)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_floors_and_clamps() {
        assert_eq!(percent_complete(0, 200), 0);
        assert_eq!(percent_complete(199, 200), 99);
        assert_eq!(percent_complete(200, 200), 100);
        assert_eq!(percent_complete(500, 200), 100);
        assert_eq!(percent_complete(0, 0), 100);
    }

    #[test]
    fn progress_is_monotonic() {
        let mut state = UploadState::new(3);
        assert!(state.record(3, 50, 100));
        assert!(!state.record(3, 20, 100));
        assert_eq!(state.percent_complete(), 50);
        assert!(state.record(3, 100, 100));
        assert_eq!(state.percent_complete(), 100);
    }

    #[test]
    fn foreign_request_is_ignored() {
        let mut state = UploadState::new(1);
        assert!(!state.record(2, 100, 100));
        assert_eq!(state.percent_complete(), 0);
    }
}

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::{OcrEngine, OcrError, OcrPage};

/// Replays canned pages in order; errors once the queue is exhausted.
#[derive(Debug, Default)]
pub struct MockOcrEngine {
    pages: Mutex<VecDeque<OcrPage>>,
    calls: Mutex<usize>,
}

impl MockOcrEngine {
    pub fn new(pages: impl IntoIterator<Item = OcrPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into_iter().collect()),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image: &[u8]) -> Result<OcrPage, OcrError> {
        *self.calls.lock() += 1;
        self.pages
            .lock()
            .pop_front()
            .ok_or_else(|| OcrError::RecognitionFailed {
                reason: "mock engine has no pages left".to_string(),
            })
    }
}

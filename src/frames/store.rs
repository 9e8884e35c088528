use super::RawFrame;

/// Frame storage for one session.
///
/// Every ingested frame lands in both the session log and the answer buffer.
/// The session log only ever grows; the answer buffer is cut at each answer
/// boundary.
#[derive(Debug, Default)]
pub struct FrameStore {
    session: Vec<RawFrame>,
    answer: Vec<RawFrame>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, frame: RawFrame) {
        self.answer.push(frame.clone());
        self.session.push(frame);
    }

    pub fn session_frames(&self) -> &[RawFrame] {
        &self.session
    }

    pub fn answer_frames(&self) -> &[RawFrame] {
        &self.answer
    }

    /// Drops the current answer's frames and hands them back.
    pub fn cut_answer(&mut self) -> Vec<RawFrame> {
        std::mem::take(&mut self.answer)
    }

    pub fn session_len(&self) -> usize {
        self.session.len()
    }

    pub fn answer_len(&self) -> usize {
        self.answer.len()
    }

    /// Whole-session teardown.
    pub fn clear(&mut self) {
        self.session.clear();
        self.answer.clear();
    }
}

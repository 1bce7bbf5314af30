/// Linear opacity tween, driven by the frame clock (`egui::InputState::time`).
///
/// The tween starts lazily on the first sample so objects created between
/// frames don't skip part of their fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeIn {
    duration: f64,
    started_at: Option<f64>,
}

impl FadeIn {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration: f64::from(duration_secs.max(0.0)),
            started_at: None,
        }
    }

    /// Opacity in `0.0..=1.0` at `now`.
    pub fn sample(&mut self, now: f64) -> f32 {
        let start = *self.started_at.get_or_insert(now);
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - start) / self.duration).clamp(0.0, 1.0) as f32
    }

    pub fn is_finished(&self, now: f64) -> bool {
        match self.started_at {
            Some(start) => now - start >= self.duration,
            None => self.duration <= 0.0,
        }
    }
}

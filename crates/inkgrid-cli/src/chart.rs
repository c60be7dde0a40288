//! Text bar chart for digit scores.

use inkgrid::{ProbabilityVector, Renderer};

/// Horizontal bar chart, one row per digit, fixed 0–1 scale.
#[derive(Debug, Clone)]
pub struct TextBarChart {
    width: usize,
    frames: usize,
    last: ProbabilityVector,
}

impl TextBarChart {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            frames: 0,
            last: ProbabilityVector::zeros(),
        }
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Most recently rendered scores.
    pub fn last(&self) -> ProbabilityVector {
        self.last
    }

    /// Format `scores` as chart rows. Values outside [0, 1] are clamped.
    pub fn draw(&self, scores: &ProbabilityVector) -> String {
        let mut out = String::new();
        for (digit, &v) in scores.as_slice().iter().enumerate() {
            let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
            let filled = (v * self.width as f32).round() as usize;
            out.push_str(&format!(
                "{} |{}{}| {:.3}\n",
                digit,
                "#".repeat(filled),
                " ".repeat(self.width - filled),
                v
            ));
        }
        out
    }
}

impl Renderer for TextBarChart {
    fn render(&mut self, scores: &ProbabilityVector) {
        self.frames += 1;
        self.last = *scores;
        tracing::trace!("frame {}: {:?}", self.frames, scores.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bars_scale_to_width() {
        let mut scores = ProbabilityVector::zeros();
        scores.0[3] = 1.0;
        scores.0[8] = 0.5;
        let text = TextBarChart::new(10).draw(&scores);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "0 |          | 0.000");
        assert_eq!(lines[3], "3 |##########| 1.000");
        assert_eq!(lines[8], "8 |#####     | 0.500");
    }

    #[test]
    fn out_of_range_scores_are_clamped() {
        let mut scores = ProbabilityVector::zeros();
        scores.0[0] = 2.0;
        scores.0[1] = f32::NAN;
        let text = TextBarChart::new(4).draw(&scores);
        assert!(text.starts_with("0 |####| 1.000\n1 |    | 0.000\n"));
    }

    #[test]
    fn render_tracks_last_frame() {
        let mut chart = TextBarChart::new(8);
        let mut scores = ProbabilityVector::zeros();
        scores.0[2] = 0.7;
        chart.render(&ProbabilityVector::zeros());
        chart.render(&scores);
        assert_eq!(chart.frames(), 2);
        assert_eq!(chart.last(), scores);
    }
}

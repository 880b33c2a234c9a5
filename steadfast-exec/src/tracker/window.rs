use std::collections::VecDeque;

/// One recorded outcome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub success: bool,
    pub latency_ms: u64,
}

/// Fixed-capacity ring buffer of the most recent samples.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    cap: usize,
    samples: VecDeque<Sample>,
}

impl SampleWindow {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            samples: VecDeque::with_capacity(cap.min(1024)),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.cap {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn success_rate(&self) -> f64 {
        rate(self.samples.iter())
    }

    pub fn latencies(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().map(|s| s.latency_ms)
    }

    /// Coefficient of variation of latencies (0 for an empty or zero-mean window).
    pub fn latency_cv(&self) -> f64 {
        let n = self.samples.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.latencies().map(|l| l as f64).sum::<f64>() / n as f64;
        if mean <= 0.0 {
            return 0.0;
        }
        let var = self
            .latencies()
            .map(|l| (l as f64 - mean).powi(2))
            .sum::<f64>()
            / n as f64;
        var.sqrt() / mean
    }

    /// Fraction of adjacent samples whose outcome differs.
    pub fn flap_rate(&self) -> f64 {
        let n = self.samples.len();
        if n < 2 {
            return 0.0;
        }
        let flips = self
            .samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .filter(|(a, b)| a.success != b.success)
            .count();
        flips as f64 / (n - 1) as f64
    }

    /// Success rates of the oldest and newest thirds, once there are at least three samples.
    pub fn thirds(&self) -> Option<(f64, f64)> {
        let n = self.samples.len();
        let third = n / 3;
        if third == 0 {
            return None;
        }
        let oldest = rate(self.samples.iter().take(third));
        let newest = rate(self.samples.iter().skip(n - third));
        Some((oldest, newest))
    }
}

fn rate<'a>(samples: impl Iterator<Item = &'a Sample>) -> f64 {
    let (ok, total) = samples.fold((0usize, 0usize), |(ok, total), s| {
        (ok + usize::from(s.success), total + 1)
    });
    if total == 0 {
        0.0
    } else {
        ok as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(success: bool, latency_ms: u64) -> Sample {
        Sample { success, latency_ms }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let mut w = SampleWindow::new(3);
        for ok in [false, true, true, true] {
            w.push(s(ok, 10));
        }
        assert_eq!(w.len(), 3);
        assert_eq!(w.success_rate(), 1.0);
    }

    #[test]
    fn flap_rate_counts_changes() {
        let mut w = SampleWindow::new(10);
        for ok in [true, false, true, false, true] {
            w.push(s(ok, 10));
        }
        assert_eq!(w.flap_rate(), 1.0);
        assert_eq!(w.latency_cv(), 0.0);
    }

    #[test]
    fn thirds_need_three_samples() {
        let mut w = SampleWindow::new(10);
        w.push(s(true, 1));
        w.push(s(false, 1));
        assert!(w.thirds().is_none());
        w.push(s(false, 1));
        assert_eq!(w.thirds(), Some((1.0, 0.0)));
    }
}

/// One-dimensional map of a scroll axis, one cell per pixel, where covered
/// pixels are closed.
#[derive(Debug, Clone)]
pub struct OpenSpanMap {
    open: Vec<bool>,
}

/// Inclusive run of open cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenRun {
    pub start: usize,
    pub end: usize,
}

impl OpenRun {
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn midpoint(&self) -> usize {
        self.start + (self.end - self.start) / 2
    }
}

impl OpenSpanMap {
    pub fn new(len: usize) -> Self {
        Self {
            open: vec![true; len],
        }
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn is_open(&self, cell: usize) -> bool {
        self.open.get(cell).copied().unwrap_or(false)
    }

    /// Close `[start, end)`, clipped to the map.
    pub fn close(&mut self, start: i32, end: i32) {
        let len = self.open.len() as i64;
        let from = i64::from(start).clamp(0, len) as usize;
        let to = i64::from(end).clamp(0, len) as usize;
        if from < to {
            self.open[from..to].fill(false);
        }
    }

    /// Longest contiguous open run. The earliest wins a tie.
    pub fn longest_open_run(&self) -> Option<OpenRun> {
        let mut best: Option<OpenRun> = None;
        let mut current: Option<usize> = None;

        for (cell, &open) in self.open.iter().enumerate() {
            match (open, current) {
                (true, None) => current = Some(cell),
                (false, Some(start)) => {
                    best = longer(best, OpenRun { start, end: cell - 1 });
                    current = None;
                }
                _ => {}
            }
        }
        if let Some(start) = current {
            best = longer(best, OpenRun { start, end: self.open.len() - 1 });
        }
        best
    }
}

fn longer(best: Option<OpenRun>, run: OpenRun) -> Option<OpenRun> {
    match best {
        Some(b) if b.len() >= run.len() => Some(b),
        _ => Some(run),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_map_is_one_run() {
        let map = OpenSpanMap::new(800);
        assert_eq!(map.longest_open_run(), Some(OpenRun { start: 0, end: 799 }));
    }

    #[test]
    fn trailing_run_is_considered() {
        let mut map = OpenSpanMap::new(100);
        map.close(0, 20);
        map.close(30, 40);
        assert_eq!(map.longest_open_run(), Some(OpenRun { start: 40, end: 99 }));
    }

    #[test]
    fn closing_is_clipped_to_the_map() {
        let mut map = OpenSpanMap::new(10);
        map.close(-5, 3);
        map.close(8, 50);
        assert!(!map.is_open(0));
        assert!(map.is_open(3));
        assert!(!map.is_open(9));
        assert_eq!(map.longest_open_run(), Some(OpenRun { start: 3, end: 7 }));
    }

    #[test]
    fn fully_closed_map_has_no_run() {
        let mut map = OpenSpanMap::new(10);
        map.close(0, 10);
        assert_eq!(map.longest_open_run(), None);
    }

    #[test]
    fn earliest_run_wins_a_tie() {
        let mut map = OpenSpanMap::new(21);
        map.close(10, 11);
        let run = map.longest_open_run().unwrap();
        assert_eq!(run, OpenRun { start: 0, end: 9 });
        assert_eq!(run.midpoint(), 4);
    }
}

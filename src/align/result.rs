/// Outcome of one local alignment
///
/// Coordinates are matrix indices: `start` and `stop` hold (query, target)
/// pairs where the target index of `stop` is the exclusive end of the aligned
/// region in the target window and the indices of `start` sit just before the
/// first aligned base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentResult {
    pub(crate) aligned_target: String,
    pub(crate) aligned_query: String,
    pub(crate) match_line: String,
    pub(crate) score: i32,
    pub(crate) start: (usize, usize),
    pub(crate) stop: (usize, usize),
    pub(crate) query_len: usize,
}

impl AlignmentResult {
    pub(crate) fn empty(query_len: usize) -> Self {
        Self {
            aligned_target: String::new(),
            aligned_query: String::new(),
            match_line: String::new(),
            score: 0,
            start: (0, 0),
            stop: (0, 0),
            query_len,
        }
    }

    /// Best local score
    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    /// (query, target) indices just before the first aligned base
    #[must_use]
    pub fn start(&self) -> (usize, usize) {
        self.start
    }

    /// (query, target) indices of the last aligned base, exclusive
    #[must_use]
    pub fn stop(&self) -> (usize, usize) {
        self.stop
    }

    /// The target window bases covered by the alignment, gaps as '-'
    #[must_use]
    pub fn aligned_target(&self) -> &str {
        &self.aligned_target
    }

    /// The query bases covered by the alignment, gaps as '-'
    #[must_use]
    pub fn aligned_query(&self) -> &str {
        &self.aligned_query
    }

    /// True when no cell scored above zero
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.match_line.is_empty()
    }

    /// Fraction of alignment columns whose bases are identical
    ///
    /// Ambiguity matches (V or B against a compatible base) raise the score
    /// but do not count as identical columns.
    #[must_use]
    pub fn identity(&self) -> f64 {
        if self.match_line.is_empty() {
            return 0.0;
        }
        let matches = self.match_line.bytes().filter(|&b| b == b'|').count();
        matches as f64 / self.match_line.len() as f64
    }

    /// Fraction of the query consumed by the alignment
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.query_len == 0 {
            return 0.0;
        }
        let consumed = self.aligned_query.bytes().filter(|&b| b != b'-').count();
        consumed as f64 / self.query_len as f64
    }

    /// Three-line alignment diagram for trimming logs
    ///
    /// `target_offset` shifts the printed target coordinates; rear-window
    /// alignments pass the negated window length so positions read as offsets
    /// from the end of the read.
    #[must_use]
    pub fn to_diagram(&self, target_offset: i64) -> String {
        let target_start = self.start.1 as i64 + target_offset;
        let target_stop = self.stop.1 as i64 + target_offset;
        let mut out = String::with_capacity(3 * (self.match_line.len() + 20));
        out.push_str(&format!(
            "target: {:<4} {} {:>4}\n",
            target_start, self.aligned_target, target_stop
        ));
        out.push_str(&format!("{}{}\n", " ".repeat(13), self.match_line));
        out.push_str(&format!(
            " query: {:<4} {} {:>4}\n",
            self.start.0, self.aligned_query, self.stop.0
        ));
        out
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    fn sample() -> AlignmentResult {
        AlignmentResult {
            aligned_target: "AATTAA".to_string(),
            aligned_query: "AA--AA".to_string(),
            match_line: "||  ||".to_string(),
            score: 13,
            start: (0, 0),
            stop: (4, 6),
            query_len: 4,
        }
    }

    #[test]
    fn test_identity_counts_pipes_only() {
        let mut result = sample();
        assert!((result.identity() - 4.0 / 6.0).abs() < 1e-12);
        result.match_line = "::".to_string();
        assert!((result.identity() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_coverage_ignores_gaps() {
        let result = sample();
        assert!((result.coverage() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_result() {
        let result = AlignmentResult::empty(10);
        assert!(result.is_empty());
        assert!((result.identity() - 0.0).abs() < f64::EPSILON);
        assert!((result.coverage() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_diagram_front_window() {
        let diagram = sample().to_diagram(0);
        let expected = "target: 0    AATTAA    6\n\
                        \x20            ||  ||\n\
                        \x20query: 0    AA--AA    4\n";
        assert_eq!(diagram, expected);
    }

    #[test]
    fn test_diagram_rear_window_offsets() {
        let diagram = sample().to_diagram(-6);
        assert!(diagram.starts_with("target: -6   AATTAA    0\n"));
    }
}

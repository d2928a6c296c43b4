/// Longest query (adapter, barcode, or primer) the matrices support
pub const MAX_QUERY_LEN: usize = 200;

/// Longest target (read window) the matrices support
pub const MAX_TARGET_LEN: usize = 2000;

/// Matrix row stride
pub(crate) const COLS: usize = MAX_TARGET_LEN + 1;

/// Traceback direction of a matrix cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Diag,
    Left,
    Up,
}

/// Affine-gap scoring parameters
///
/// Gap penalties are negative; the opening penalty applies to the first base
/// of a gap and the extension penalty to each following base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoring {
    pub match_score: i32,
    pub mismatch: i32,
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            match_score: 3,
            mismatch: -3,
            gap_open: -7,
            gap_extend: -1,
        }
    }
}

/// Reusable alignment workspace
///
/// Holds the score and traceback matrices at their maximum size so repeated
/// alignments against the same workspace never reallocate. The first row and
/// column are fixed sentinels; the interior is rewritten by every alignment,
/// so a workspace can be reused across reads of different lengths.
#[derive(Debug, Clone)]
pub struct AlignmentConfig {
    pub(crate) scoring: Scoring,
    pub(crate) scores: Vec<i32>,
    pub(crate) dirs: Vec<Direction>,
}

impl AlignmentConfig {
    /// Allocates the workspace and initializes the sentinel row and column
    #[must_use]
    pub fn new(scoring: Scoring) -> Self {
        let cells = (MAX_QUERY_LEN + 1) * COLS;
        let mut dirs = vec![Direction::Diag; cells];
        for col in 1..COLS {
            dirs[col] = Direction::Left;
        }
        for row in 1..=MAX_QUERY_LEN {
            dirs[row * COLS] = Direction::Up;
        }
        Self {
            scoring,
            scores: vec![0; cells],
            dirs,
        }
    }

    #[must_use]
    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    #[inline]
    pub(crate) fn score_at(&self, row: usize, col: usize) -> i32 {
        self.scores[row * COLS + col]
    }

    #[inline]
    pub(crate) fn dir_at(&self, row: usize, col: usize) -> Direction {
        self.dirs[row * COLS + col]
    }

    #[inline]
    pub(crate) fn set_cell(&mut self, row: usize, col: usize, score: i32, dir: Direction) {
        let idx = row * COLS + col;
        self.scores[idx] = score;
        self.dirs[idx] = dir;
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self::new(Scoring::default())
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_sentinel_layout() {
        let config = AlignmentConfig::default();
        assert_eq!(config.dir_at(0, 0), Direction::Diag);
        assert_eq!(config.dir_at(0, 1), Direction::Left);
        assert_eq!(config.dir_at(0, MAX_TARGET_LEN), Direction::Left);
        assert_eq!(config.dir_at(1, 0), Direction::Up);
        assert_eq!(config.dir_at(MAX_QUERY_LEN, 0), Direction::Up);
        assert_eq!(config.score_at(0, 0), 0);
        assert_eq!(config.score_at(MAX_QUERY_LEN, MAX_TARGET_LEN), 0);
    }

    #[test]
    fn test_default_scoring() {
        let scoring = Scoring::default();
        assert_eq!(scoring.match_score, 3);
        assert_eq!(scoring.mismatch, -3);
        assert_eq!(scoring.gap_open, -7);
        assert_eq!(scoring.gap_extend, -1);
    }
}

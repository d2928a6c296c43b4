use super::config::{AlignmentConfig, Direction, MAX_QUERY_LEN, MAX_TARGET_LEN};
use super::result::AlignmentResult;
use crate::error::{AlignError, Result};

/// Scores a query base against a target base
///
/// V matches any of G/A/C and B any of G/T/C, so degenerate primer tails
/// align without penalty. All other comparisons are exact.
#[inline]
fn bases_match(query: u8, target: u8) -> bool {
    query == target
        || (query == b'V' && matches!(target, b'G' | b'A' | b'C'))
        || (query == b'B' && matches!(target, b'G' | b'T' | b'C'))
}

impl AlignmentConfig {
    /// Locally aligns `query` against `target` with affine gaps
    ///
    /// Fills the interior of the workspace row by row, tracking the first
    /// strictly-best cell in row-major order, then walks the traceback until
    /// the score drops to zero or an edge is reached.
    ///
    /// # Errors
    /// Returns an [`AlignError`] when either sequence exceeds the fixed
    /// workspace bounds.
    pub fn align(&mut self, query: &[u8], target: &[u8]) -> Result<AlignmentResult> {
        if target.len() > MAX_TARGET_LEN {
            return Err(AlignError::TargetTooLong {
                len: target.len(),
                max: MAX_TARGET_LEN,
            }
            .into());
        }
        if query.len() > MAX_QUERY_LEN {
            return Err(AlignError::QueryTooLong {
                len: query.len(),
                max: MAX_QUERY_LEN,
            }
            .into());
        }

        let scoring = self.scoring;
        let mut best_score = 0;
        let mut stop = (0, 0);
        for row in 1..=query.len() {
            for col in 1..=target.len() {
                let base_score = if bases_match(query[row - 1], target[col - 1]) {
                    scoring.match_score
                } else {
                    scoring.mismatch
                };
                let diag = self.score_at(row - 1, col - 1) + base_score;
                let left = self.score_at(row, col - 1)
                    + if self.dir_at(row, col - 1) == Direction::Left {
                        scoring.gap_extend
                    } else {
                        scoring.gap_open
                    };
                let up = self.score_at(row - 1, col)
                    + if self.dir_at(row - 1, col) == Direction::Up {
                        scoring.gap_extend
                    } else {
                        scoring.gap_open
                    };
                let cell = diag.max(left).max(up).max(0);
                let dir = if cell == diag {
                    Direction::Diag
                } else if cell == left {
                    Direction::Left
                } else {
                    Direction::Up
                };
                self.set_cell(row, col, cell, dir);
                if cell > best_score {
                    best_score = cell;
                    stop = (row, col);
                }
            }
        }

        if best_score == 0 {
            return Ok(AlignmentResult::empty(query.len()));
        }

        let mut result = AlignmentResult::empty(query.len());
        result.score = best_score;
        result.stop = stop;
        let (mut row, mut col) = stop;
        while row > 0 && col > 0 && self.score_at(row, col) > 0 {
            match self.dir_at(row, col) {
                Direction::Diag => {
                    let t = target[col - 1];
                    let q = query[row - 1];
                    result.aligned_target.push(t as char);
                    result.aligned_query.push(q as char);
                    result.match_line.push(if t == q { '|' } else { ':' });
                    row -= 1;
                    col -= 1;
                }
                Direction::Left => {
                    result.aligned_target.push(target[col - 1] as char);
                    result.aligned_query.push('-');
                    result.match_line.push(' ');
                    col -= 1;
                }
                Direction::Up => {
                    result.aligned_target.push('-');
                    result.aligned_query.push(query[row - 1] as char);
                    result.match_line.push(' ');
                    row -= 1;
                }
            }
        }
        result.start = (row, col);
        result.aligned_target = result.aligned_target.chars().rev().collect();
        result.aligned_query = result.aligned_query.chars().rev().collect();
        result.match_line = result.match_line.chars().rev().collect();
        Ok(result)
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::align::Scoring;

    #[test]
    fn test_perfect_match() {
        let mut config = AlignmentConfig::default();
        let result = config.align(b"ACGT", b"ACGT").unwrap();
        assert_eq!(result.score(), 12);
        assert_eq!(result.aligned_query(), "ACGT");
        assert_eq!(result.aligned_target(), "ACGT");
        assert_eq!(result.start(), (0, 0));
        assert_eq!(result.stop(), (4, 4));
        assert!((result.identity() - 1.0).abs() < f64::EPSILON);
        assert!((result.coverage() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ambiguity_codes_score_without_identity() {
        let mut config = AlignmentConfig::default();
        let result = config.align(b"VB", b"AT").unwrap();
        assert_eq!(result.score(), 6);
        assert_eq!(result.aligned_query(), "VB");
        assert_eq!(result.aligned_target(), "AT");
        // Ambiguity columns render as ':' and do not count toward identity
        assert!((result.identity() - 0.0).abs() < f64::EPSILON);

        let result = config.align(b"V", b"T").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_affine_gap_opens_once_then_extends() {
        let scoring = Scoring {
            match_score: 5,
            mismatch: -4,
            gap_open: -6,
            gap_extend: -1,
        };
        let mut config = AlignmentConfig::new(scoring);
        let result = config.align(b"AAAA", b"AATTAA").unwrap();
        // Four matches minus one gap open and one extension
        assert_eq!(result.score(), 13);
        assert_eq!(result.aligned_target(), "AATTAA");
        assert_eq!(result.aligned_query(), "AA--AA");
        assert_eq!(result.start(), (0, 0));
        assert_eq!(result.stop(), (4, 6));
        assert!((result.coverage() - 1.0).abs() < f64::EPSILON);
        assert!((result.identity() - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_first_best_cell_wins_ties() {
        let mut config = AlignmentConfig::default();
        // "AATT" against "AACTT" scores 6 both at the leading AA and at the
        // trailing TT; the earlier cell in row-major order is kept
        let result = config.align(b"AATT", b"AACTT").unwrap();
        assert_eq!(result.score(), 6);
        assert_eq!(result.stop(), (2, 2));
        assert_eq!(result.aligned_query(), "AA");
        assert_eq!(result.aligned_target(), "AA");
        assert!((result.coverage() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_positive_cell_yields_empty() {
        let mut config = AlignmentConfig::default();
        let result = config.align(b"AAAA", b"TTTT").unwrap();
        assert!(result.is_empty());
        assert_eq!(result.score(), 0);
        assert_eq!(result.start(), (0, 0));
        assert_eq!(result.stop(), (0, 0));
    }

    #[test]
    fn test_workspace_reuse_is_clean() {
        let mut config = AlignmentConfig::default();
        let first = config.align(b"TTTT", b"TTTT").unwrap();
        assert_eq!(first.score(), 12);
        let second = config.align(b"AC", b"GGACGG").unwrap();
        assert_eq!(second.score(), 6);
        assert_eq!(second.start(), (0, 2));
        assert_eq!(second.stop(), (2, 4));
        assert_eq!(second.aligned_query(), "AC");
    }

    #[test]
    fn test_length_limits() {
        let mut config = AlignmentConfig::default();
        let long_query = vec![b'A'; MAX_QUERY_LEN + 1];
        let err = config.align(&long_query, b"ACGT").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::AlignError(AlignError::QueryTooLong { .. })
        ));
        let long_target = vec![b'A'; MAX_TARGET_LEN + 1];
        let err = config.align(b"ACGT", &long_target).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::AlignError(AlignError::TargetTooLong { .. })
        ));
    }

    #[test]
    fn test_ligation_adapter_self_alignment() {
        let scoring = Scoring {
            match_score: 3,
            mismatch: -3,
            gap_open: -10,
            gap_extend: -1,
        };
        let mut config = AlignmentConfig::new(scoring);
        let adapter = b"AGCAATACGTAACTGAACGAAGTACAGG";
        let result = config.align(adapter, adapter).unwrap();
        assert_eq!(result.score(), 84);
        assert!((result.identity() - 1.0).abs() < f64::EPSILON);
        assert!((result.coverage() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_repeated_alignment_is_deterministic() {
        let mut config = AlignmentConfig::default();
        let first = config.align(b"ACGTAC", b"TTACGTACTT").unwrap();
        let second = config.align(b"ACGTAC", b"TTACGTACTT").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bounds_fit_exactly() {
        let mut config = AlignmentConfig::default();
        let query = vec![b'A'; MAX_QUERY_LEN];
        let target = vec![b'A'; MAX_TARGET_LEN];
        let result = config.align(&query, &target).unwrap();
        assert_eq!(result.score(), 3 * MAX_QUERY_LEN as i32);
    }
}

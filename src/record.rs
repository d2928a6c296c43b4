use crate::error::{ConfigError, RecordError, Result};

/// A single nanopore FASTQ record
///
/// Sequence and quality are kept as owned strings so records can be trimmed in
/// place and reformatted without touching the source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: String,
    desc: Option<String>,
    sequence: String,
    quality: String,
}

impl Record {
    /// Builds a validated record from its four FASTQ components
    ///
    /// # Errors
    /// Returns a [`RecordError`] if the sequence is empty or the sequence and
    /// quality lines disagree in length.
    pub fn new(
        id: String,
        desc: Option<String>,
        sequence: String,
        quality: String,
    ) -> Result<Self> {
        if sequence.is_empty() || quality.is_empty() {
            return Err(RecordError::EmptyRecord { id }.into());
        }
        if sequence.len() != quality.len() {
            return Err(RecordError::LengthMismatch {
                id,
                seq_len: sequence.len(),
                qual_len: quality.len(),
            }
            .into());
        }
        Ok(Self {
            id,
            desc,
            sequence,
            quality,
        })
    }

    /// The read name (header text up to the first space, without '@')
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The remainder of the header line after the read name, if any
    #[must_use]
    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    #[must_use]
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    #[must_use]
    pub fn quality(&self) -> &str {
        &self.quality
    }

    /// Number of bases in the read
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Fraction of G/C bases over the read length, case insensitive
    #[must_use]
    pub fn gc_content(&self) -> f64 {
        if self.sequence.is_empty() {
            return 0.0;
        }
        let gc = self
            .sequence
            .bytes()
            .filter(|b| matches!(b, b'G' | b'C' | b'g' | b'c'))
            .count();
        gc as f64 / self.sequence.len() as f64
    }

    /// Phred-scaled mean quality of the read
    ///
    /// Per-base qualities are converted back to error probabilities, averaged,
    /// and rescaled. This is the standard nanopore read quality, which is lower
    /// than the arithmetic mean of the quality characters.
    #[must_use]
    pub fn mean_quality(&self) -> f64 {
        if self.quality.is_empty() {
            return 0.0;
        }
        let error_sum: f64 = self
            .quality
            .bytes()
            .map(|q| 10.0_f64.powf(-(f64::from(q) - 33.0) / 10.0))
            .sum();
        -10.0 * (error_sum / self.quality.len() as f64).log10()
    }

    /// Checks the read against length, quality, and optional GC bounds
    ///
    /// Length bounds are inclusive; quality and GC bounds are strict.
    #[must_use]
    pub fn is_passed(&self, filter: &FilterOptions) -> bool {
        let len_ok = self.len() >= filter.min_length && self.len() <= filter.max_length;
        if !len_ok {
            return false;
        }
        if self.mean_quality() <= filter.min_quality {
            return false;
        }
        if let Some(min_gc) = filter.min_gc {
            if self.gc_content() <= min_gc {
                return false;
            }
        }
        if let Some(max_gc) = filter.max_gc {
            if self.gc_content() >= max_gc {
                return false;
            }
        }
        true
    }

    /// Formats the record back into its four-line FASTQ form
    #[must_use]
    pub fn to_fastq(&self) -> String {
        match &self.desc {
            Some(desc) => format!(
                "@{} {}\n{}\n+\n{}\n",
                self.id, desc, self.sequence, self.quality
            ),
            None => format!("@{}\n{}\n+\n{}\n", self.id, self.sequence, self.quality),
        }
    }

    /// Restricts the read to the half-open base range [start, end)
    ///
    /// Sequence and quality are clipped identically. A range that covers the
    /// whole read is a no-op; start == end empties the read.
    pub fn clip(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.sequence.len());
        self.sequence.truncate(end);
        self.quality.truncate(end);
        self.sequence.drain(..start);
        self.quality.drain(..start);
    }
}

/// Length, quality, and GC thresholds for read filtering
#[derive(Debug, Clone, Copy)]
pub struct FilterOptions {
    /// Minimum read length, inclusive
    pub min_length: usize,
    /// Maximum read length, inclusive
    pub max_length: usize,
    /// Reads must score strictly above this phred quality
    pub min_quality: f64,
    /// Reads must have GC content strictly above this fraction, if set
    pub min_gc: Option<f64>,
    /// Reads must have GC content strictly below this fraction, if set
    pub max_gc: Option<f64>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: usize::MAX,
            min_quality: 8.0,
            min_gc: None,
            max_gc: None,
        }
    }
}

impl FilterOptions {
    /// Checks the thresholds for internal consistency
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if a GC bound falls outside [0, 1] or the
    /// length bounds cross.
    pub fn validate(&self) -> Result<()> {
        if self.min_length > self.max_length {
            return Err(ConfigError::LengthOutOfRange {
                parameter: "minimum read length",
                value: self.min_length,
                min: 1,
                max: self.max_length,
            }
            .into());
        }
        for (name, bound) in [
            ("minimum GC content", self.min_gc),
            ("maximum GC content", self.max_gc),
        ] {
            if let Some(value) = bound {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::FractionOutOfRange {
                        parameter: name,
                        value,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Reverse complement of a nucleotide sequence
///
/// Handles the IUPAC codes the trimming queries use (V and B) in addition to
/// the four bases, preserving case. Unrecognized characters pass through
/// unchanged.
#[must_use]
pub fn reverse_complement(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(|b| match b {
            b'A' => 'T',
            b'T' => 'A',
            b'G' => 'C',
            b'C' => 'G',
            b'V' => 'B',
            b'B' => 'V',
            b'a' => 't',
            b't' => 'a',
            b'g' => 'c',
            b'c' => 'g',
            b'v' => 'b',
            b'b' => 'v',
            other => other as char,
        })
        .collect()
}

#[cfg(test)]
mod testing {
    use super::*;

    fn record(seq: &str, qual: &str) -> Record {
        Record::new("read1".to_string(), None, seq.to_string(), qual.to_string()).unwrap()
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = Record::new(
            "read1".to_string(),
            None,
            "ACGT".to_string(),
            "II".to_string(),
        )
        .unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[test]
    fn test_new_rejects_empty() {
        let err = Record::new(
            "read1".to_string(),
            None,
            String::new(),
            String::new(),
        )
        .unwrap_err();
        assert!(err.is_malformed_record());
    }

    #[test]
    fn test_gc_content() {
        let rec = record("GGCCAATT", "IIIIIIII");
        assert!((rec.gc_content() - 0.5).abs() < f64::EPSILON);
        let rec = record("acgt", "IIII");
        assert!((rec.gc_content() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mean_quality_uniform() {
        // All bases at Q40: mean error 1e-4, so the read scores exactly 40
        let rec = record("ACGT", "IIII");
        assert!((rec.mean_quality() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_quality_dominated_by_worst_base() {
        // One Q0 base among Q40 bases drags the read far below the mean of 30
        let rec = record("ACGT", "!III");
        let expected = -10.0 * ((1.0 + 3.0 * 1e-4) / 4.0_f64).log10();
        assert!((rec.mean_quality() - expected).abs() < 1e-9);
        assert!(rec.mean_quality() < 7.0);
    }

    #[test]
    fn test_is_passed_strict_quality_bound() {
        let rec = record("ACGT", "IIII");
        let mut filter = FilterOptions::default();
        filter.min_quality = 40.0;
        assert!(!rec.is_passed(&filter));
        filter.min_quality = 39.9;
        assert!(rec.is_passed(&filter));
    }

    #[test]
    fn test_is_passed_length_bounds_inclusive() {
        let rec = record("ACGT", "IIII");
        let filter = FilterOptions {
            min_length: 4,
            max_length: 4,
            min_quality: 0.0,
            min_gc: None,
            max_gc: None,
        };
        assert!(rec.is_passed(&filter));
    }

    #[test]
    fn test_is_passed_gc_bounds_strict() {
        let rec = record("GGCCAATT", "IIIIIIII");
        let mut filter = FilterOptions::default();
        filter.min_quality = 0.0;
        filter.min_gc = Some(0.5);
        assert!(!rec.is_passed(&filter));
        filter.min_gc = Some(0.4);
        filter.max_gc = Some(0.5);
        assert!(!rec.is_passed(&filter));
        filter.max_gc = Some(0.6);
        assert!(rec.is_passed(&filter));
    }

    #[test]
    fn test_filter_options_validation() {
        let filter = FilterOptions {
            min_gc: Some(1.5),
            ..FilterOptions::default()
        };
        assert!(filter.validate().unwrap_err().is_config());
        assert!(FilterOptions::default().validate().is_ok());
    }

    #[test]
    fn test_to_fastq_with_and_without_desc() {
        let rec = record("ACGT", "IIII");
        assert_eq!(rec.to_fastq(), "@read1\nACGT\n+\nIIII\n");
        let rec = Record::new(
            "read1".to_string(),
            Some("ch=12 start_time=0".to_string()),
            "ACGT".to_string(),
            "IIII".to_string(),
        )
        .unwrap();
        assert_eq!(rec.to_fastq(), "@read1 ch=12 start_time=0\nACGT\n+\nIIII\n");
    }

    #[test]
    fn test_clip() {
        let mut rec = record("ACGTACGT", "IIIIJJJJ");
        rec.clip(2, 6);
        assert_eq!(rec.sequence(), "GTAC");
        assert_eq!(rec.quality(), "IIJJ");

        let mut rec = record("ACGT", "IIII");
        rec.clip(4, 4);
        assert!(rec.is_empty());
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ACGT"), "ACGT");
        assert_eq!(reverse_complement("AACC"), "GGTT");
        assert_eq!(reverse_complement("AVB"), "VBT");
        assert_eq!(reverse_complement("acgtn"), "nacgt");
    }
}

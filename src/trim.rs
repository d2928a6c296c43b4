//! Adapter, barcode, and primer removal from read ends
//!
//! A trim pass aligns each configured anchor query against a short window at
//! the matching read end and clips the read where an accepted alignment
//! stops. Bottom-strand anchors are only attempted when neither top-strand
//! anchor matched, since a read comes from one strand or the other.
use std::io::Write;

use crate::adapters::{Anchor, SequenceInfo, TrimDirections};
use crate::align::{AlignmentConfig, AlignmentResult};
use crate::error::Result;
use crate::record::Record;

/// Writes the kit description block at the head of a trimming log
///
/// # Errors
/// Propagates write failures from the log sink.
pub fn write_log_header<W: Write>(log: &mut W, info: &SequenceInfo) -> Result<()> {
    log.write_all(info.describe().as_bytes())?;
    writeln!(log)?;
    Ok(())
}

fn accepted(result: &AlignmentResult, anchor: &Anchor) -> bool {
    result.coverage() > anchor.params.min_coverage
        && result.identity() > anchor.params.min_identity
}

fn write_event<W: Write>(
    log: &mut W,
    id: &str,
    side: &str,
    result: &AlignmentResult,
    target_offset: i64,
) -> Result<()> {
    writeln!(
        log,
        "{id} {side}\t{}\t{}\t{}\t{}",
        result.start().1 as i64 + target_offset,
        result.stop().1 as i64 + target_offset,
        result.start().0,
        result.stop().0,
    )?;
    log.write_all(result.to_diagram(target_offset).as_bytes())?;
    writeln!(log)?;
    Ok(())
}

/// Aligns an anchor against the leading window of the read
///
/// Returns the window length and the target offset where the accepted
/// alignment stops, or None when the alignment misses the thresholds.
fn attempt_front<W: Write>(
    read: &Record,
    anchor: &Anchor,
    config: &mut AlignmentConfig,
    log: &mut W,
) -> Result<Option<(usize, usize)>> {
    let window = anchor.params.window.min(read.len());
    let target = &read.sequence().as_bytes()[..window];
    let result = config.align(anchor.query.as_bytes(), target)?;
    if !accepted(&result, anchor) {
        return Ok(None);
    }
    write_event(log, read.id(), "Left", &result, 0)?;
    Ok(Some((window, result.stop().1)))
}

/// Aligns an anchor against the trailing window of the untrimmed remainder
///
/// Returns the absolute read offset where the kept portion ends, or None
/// when the alignment misses the thresholds.
fn attempt_rear<W: Write>(
    read: &Record,
    anchor: &Anchor,
    remaining: usize,
    config: &mut AlignmentConfig,
    log: &mut W,
) -> Result<Option<usize>> {
    let len = read.len();
    let window = anchor.params.window.min(remaining);
    let target = &read.sequence().as_bytes()[len - window..];
    let result = config.align(anchor.query.as_bytes(), target)?;
    if !accepted(&result, anchor) {
        return Ok(None);
    }
    write_event(log, read.id(), "Right", &result, -(window as i64))?;
    Ok(Some(len - window + result.start().1))
}

/// Searches the configured anchors and clips the read in place
///
/// Anchors run in a fixed order: top 5', top 3', then the bottom-strand pair
/// only if neither top anchor matched. A front alignment that runs to the
/// edge of its search window empties the read outright, since the whole
/// window is synthetic sequence and the true insert boundary is unknown.
/// Every accepted alignment appends an event block to `log`. Returns whether
/// the read was modified.
///
/// # Errors
/// Propagates alignment failures (oversized inputs) and log write failures.
pub fn trim<W: Write>(
    read: &mut Record,
    info: &SequenceInfo,
    directions: TrimDirections,
    config: &mut AlignmentConfig,
    log: &mut W,
) -> Result<bool> {
    let len = read.len();
    let mut trim_start = 0;
    let mut trim_end = len;
    let mut already_trimmed = false;

    if directions.top5 {
        if let Some(anchor) = info.top5() {
            if let Some((window, stop)) = attempt_front(read, anchor, config, log)? {
                already_trimmed = true;
                if stop >= window {
                    read.clip(0, 0);
                    return Ok(true);
                }
                trim_start = stop;
            }
        }
    }
    if directions.top3 {
        if let Some(anchor) = info.top3() {
            if let Some(end) = attempt_rear(read, anchor, len - trim_start, config, log)? {
                already_trimmed = true;
                trim_end = end;
            }
        }
    }
    if !already_trimmed {
        if directions.bot5 {
            if let Some(anchor) = info.bot5() {
                if let Some((window, stop)) = attempt_front(read, anchor, config, log)? {
                    already_trimmed = true;
                    if stop >= window {
                        read.clip(0, 0);
                        return Ok(true);
                    }
                    trim_start = stop;
                }
            }
        }
        if directions.bot3 {
            if let Some(anchor) = info.bot3() {
                if let Some(end) = attempt_rear(read, anchor, len - trim_start, config, log)? {
                    trim_end = end;
                }
            }
        }
    }

    if trim_end < trim_start {
        // Crossed cut points on a degenerate read; leave it alone
        return Ok(false);
    }
    if trim_start == 0 && trim_end == len {
        return Ok(false);
    }
    read.clip(trim_start, trim_end);
    Ok(true)
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::adapters::{AdapterCatalog, TrimParams};

    fn record(seq: &str) -> Record {
        Record::new(
            "read1".to_string(),
            None,
            seq.to_string(),
            "I".repeat(seq.len()),
        )
        .unwrap()
    }

    fn anchor(query: &str, window: usize) -> Anchor {
        Anchor::new(query.to_string(), TrimParams::new(window, 0.8, 0.8))
    }

    #[test]
    fn test_front_adapter_removed() {
        let adapter = "CCTGTACTTCGTTCAGTTACGTATTGCT";
        let info = SequenceInfo::front_only("test".to_string(), anchor(adapter, 100));
        let mut read = record(&format!("{adapter}{}", "A".repeat(100)));
        let mut config = AlignmentConfig::default();
        let mut log = Vec::new();

        let trimmed = trim(&mut read, &info, info.directions(), &mut config, &mut log).unwrap();
        assert!(trimmed);
        assert_eq!(read.sequence(), "A".repeat(100));
        assert_eq!(read.quality().len(), 100);

        let log = String::from_utf8(log).unwrap();
        assert!(log.starts_with("read1 Left\t0\t28\t0\t28\n"));
        assert!(log.contains("target: 0"));
    }

    #[test]
    fn test_no_match_leaves_read_unchanged() {
        let catalog = AdapterCatalog::new();
        let info = catalog.get("SQK-LSK114").unwrap();
        let mut read = record(&"T".repeat(300));
        let mut config = AlignmentConfig::default();
        let mut log = Vec::new();

        let trimmed = trim(&mut read, info, info.directions(), &mut config, &mut log).unwrap();
        assert!(!trimmed);
        assert_eq!(read.sequence(), "T".repeat(300));
        assert!(log.is_empty());
    }

    #[test]
    fn test_match_filling_window_empties_read() {
        let info = SequenceInfo::front_only("test".to_string(), anchor(&"A".repeat(10), 10));
        let mut read = record(&format!("{}CCCC", "A".repeat(10)));
        let mut config = AlignmentConfig::default();
        let mut log = Vec::new();

        let trimmed = trim(&mut read, &info, info.directions(), &mut config, &mut log).unwrap();
        assert!(trimmed);
        assert!(read.is_empty());
        assert!(read.quality().is_empty());
        let log = String::from_utf8(log).unwrap();
        assert!(log.contains("read1 Left"));
    }

    #[test]
    fn test_rear_adapter_reports_negative_offsets() {
        let info = SequenceInfo::paired(
            "test".to_string(),
            anchor("TTTTTTTTTT", 10),
            anchor("GGGGGCCCCC", 20),
        );
        let mut read = record(&format!("{}GGGGGCCCCC", "A".repeat(100)));
        let mut config = AlignmentConfig::default();
        let mut log = Vec::new();

        let trimmed = trim(&mut read, &info, info.directions(), &mut config, &mut log).unwrap();
        assert!(trimmed);
        assert_eq!(read.sequence(), "A".repeat(100));

        let log = String::from_utf8(log).unwrap();
        assert!(log.starts_with("read1 Right\t-10\t0\t0\t10\n"));
        assert!(log.contains("target: -10"));
    }

    #[test]
    fn test_bottom_strand_searched_when_top_misses() {
        let info = SequenceInfo::double_stranded(
            "test".to_string(),
            anchor("TTTTGGGG", 10),
            anchor("CCCCTTTT", 10),
            anchor("AAAACCCC", 10),
            anchor("TTTTAAAA", 10),
        );
        let mut read = record(&format!("AAAACCCC{}", "G".repeat(92)));
        let mut config = AlignmentConfig::default();
        let mut log = Vec::new();

        let trimmed = trim(&mut read, &info, info.directions(), &mut config, &mut log).unwrap();
        assert!(trimmed);
        assert_eq!(read.sequence(), "G".repeat(92));
        let log = String::from_utf8(log).unwrap();
        assert_eq!(log.matches("Left").count(), 1);
    }

    #[test]
    fn test_bottom_strand_skipped_after_top_hit() {
        // Both strands would match the front, but a top hit must suppress
        // the bottom pass entirely
        let info = SequenceInfo::double_stranded(
            "test".to_string(),
            anchor("AAAACCCC", 10),
            anchor("CCCCTTTT", 10),
            anchor("AAAACCCC", 10),
            anchor("TTTTAAAA", 10),
        );
        let mut read = record(&format!("AAAACCCC{}", "G".repeat(92)));
        let mut config = AlignmentConfig::default();
        let mut log = Vec::new();

        trim(&mut read, &info, info.directions(), &mut config, &mut log).unwrap();
        let log = String::from_utf8(log).unwrap();
        assert_eq!(log.matches("read1 Left").count(), 1);
    }

    #[test]
    fn test_both_ends_trimmed_in_one_pass() {
        let info = SequenceInfo::paired(
            "test".to_string(),
            anchor("CCCCCCCCCC", 15),
            anchor("GGGGGGGGGG", 15),
        );
        let mut read = record(&format!(
            "CCCCCCCCCC{}GGGGGGGGGG",
            "A".repeat(50)
        ));
        let mut config = AlignmentConfig::default();
        let mut log = Vec::new();

        let trimmed = trim(&mut read, &info, info.directions(), &mut config, &mut log).unwrap();
        assert!(trimmed);
        assert_eq!(read.sequence(), "A".repeat(50));
        let log = String::from_utf8(log).unwrap();
        assert!(log.contains("read1 Left"));
        assert!(log.contains("read1 Right"));
    }

    #[test]
    fn test_log_header_describes_kit() {
        let catalog = AdapterCatalog::new();
        let info = catalog.get("SQK-RAD114").unwrap();
        let mut log = Vec::new();
        write_log_header(&mut log, info).unwrap();
        let log = String::from_utf8(log).unwrap();
        assert!(log.starts_with("kit: SQK-RAD114\n"));
        assert!(log.ends_with("\n\n"));
    }
}

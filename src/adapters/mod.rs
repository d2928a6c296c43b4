//! Kit catalog: which sequences to search at which read ends
//!
//! Every sequencing kit leaves known synthetic sequence at predictable read
//! ends. A [`SequenceInfo`] names up to four trim anchors (top and bottom
//! strand, 5' and 3' end), each with its query sequence and search
//! parameters. The catalog is built once at startup and passed by reference
//! into the pipeline; there is no global state.
use std::collections::HashMap;

use crate::align::MAX_QUERY_LEN;
use crate::error::{ConfigError, Result};
use crate::record::reverse_complement;

pub mod kits;

/// Valid search window range in bases
pub const WINDOW_RANGE: (usize, usize) = (10, 2000);

const CUSTOM_PRIMER_PARAMS: TrimParams = TrimParams::new(180, 0.8, 0.8);

/// Search parameters of one trim anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimParams {
    /// How many bases from the read end to search
    pub window: usize,
    /// Accept only alignments covering more than this fraction of the query
    pub min_coverage: f64,
    /// Accept only alignments with more than this fraction identical columns
    pub min_identity: f64,
}

impl TrimParams {
    #[must_use]
    pub const fn new(window: usize, min_coverage: f64, min_identity: f64) -> Self {
        Self {
            window,
            min_coverage,
            min_identity,
        }
    }
}

/// One trim anchor: the query sequence and how to search for it
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub query: String,
    pub params: TrimParams,
}

impl Anchor {
    #[must_use]
    pub fn new(query: String, params: TrimParams) -> Self {
        Self { query, params }
    }

    fn validate(&self, names: AnchorNames) -> Result<()> {
        if self.query.is_empty() || self.query.len() > MAX_QUERY_LEN {
            return Err(ConfigError::LengthOutOfRange {
                parameter: names.query,
                value: self.query.len(),
                min: 1,
                max: MAX_QUERY_LEN,
            }
            .into());
        }
        if self.params.window < WINDOW_RANGE.0 || self.params.window > WINDOW_RANGE.1 {
            return Err(ConfigError::LengthOutOfRange {
                parameter: names.window,
                value: self.params.window,
                min: WINDOW_RANGE.0,
                max: WINDOW_RANGE.1,
            }
            .into());
        }
        for (name, value) in [
            (names.coverage, self.params.min_coverage),
            (names.identity, self.params.min_identity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FractionOutOfRange {
                    parameter: name,
                    value,
                }
                .into());
            }
        }
        Ok(())
    }
}

struct AnchorNames {
    query: &'static str,
    window: &'static str,
    coverage: &'static str,
    identity: &'static str,
}

const TOP5_NAMES: AnchorNames = AnchorNames {
    query: "top 5' end query length",
    window: "top 5' end window length",
    coverage: "top 5' end coverage",
    identity: "top 5' end identity",
};
const TOP3_NAMES: AnchorNames = AnchorNames {
    query: "top 3' end query length",
    window: "top 3' end window length",
    coverage: "top 3' end coverage",
    identity: "top 3' end identity",
};
const BOT5_NAMES: AnchorNames = AnchorNames {
    query: "bottom 5' end query length",
    window: "bottom 5' end window length",
    coverage: "bottom 5' end coverage",
    identity: "bottom 5' end identity",
};
const BOT3_NAMES: AnchorNames = AnchorNames {
    query: "bottom 3' end query length",
    window: "bottom 3' end window length",
    coverage: "bottom 3' end coverage",
    identity: "bottom 3' end identity",
};

/// Which anchors a trim pass should attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimDirections {
    pub top5: bool,
    pub top3: bool,
    pub bot5: bool,
    pub bot3: bool,
}

impl TrimDirections {
    #[must_use]
    pub fn any(&self) -> bool {
        self.top5 || self.top3 || self.bot5 || self.bot3
    }
}

/// Partial override of one anchor's numeric parameters
///
/// Unset fields keep the catalog value.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorOverride {
    pub window: Option<usize>,
    pub min_coverage: Option<f64>,
    pub min_identity: Option<f64>,
}

/// Partial override of all four anchors, as collected from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimOverrides {
    pub top5: AnchorOverride,
    pub top3: AnchorOverride,
    pub bot5: AnchorOverride,
    pub bot3: AnchorOverride,
}

/// Per-kit trim anchors
///
/// The anchor set encodes the library chemistry: rapid kits only leave
/// adapter at the 5' end, ligation kits at both ends of the top strand, and
/// cDNA kits on both strands because either strand may be sequenced.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceInfo {
    name: String,
    top5: Option<Anchor>,
    top3: Option<Anchor>,
    bot5: Option<Anchor>,
    bot3: Option<Anchor>,
}

impl SequenceInfo {
    /// A kit searched only at the top-strand 5' end
    #[must_use]
    pub fn front_only(name: String, top5: Anchor) -> Self {
        Self {
            name,
            top5: Some(top5),
            top3: None,
            bot5: None,
            bot3: None,
        }
    }

    /// A kit searched at both ends of the top strand
    #[must_use]
    pub fn paired(name: String, top5: Anchor, top3: Anchor) -> Self {
        Self {
            name,
            top5: Some(top5),
            top3: Some(top3),
            bot5: None,
            bot3: None,
        }
    }

    /// A kit searched at both ends of both strands
    #[must_use]
    pub fn double_stranded(
        name: String,
        top5: Anchor,
        top3: Anchor,
        bot5: Anchor,
        bot3: Anchor,
    ) -> Self {
        Self {
            name,
            top5: Some(top5),
            top3: Some(top3),
            bot5: Some(bot5),
            bot3: Some(bot3),
        }
    }

    /// Builds anchors for a user-supplied primer pair
    ///
    /// The forward primer opens the top strand and the rear of the top strand
    /// reads as the reverse complement of the reverse primer; the bottom
    /// strand mirrors both. All four anchors share the default primer search
    /// parameters until overridden.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if a primer is empty or exceeds the maximum
    /// query length.
    pub fn custom(name: String, forward: &str, reverse: &str) -> Result<Self> {
        let info = Self::double_stranded(
            name,
            Anchor::new(forward.to_string(), CUSTOM_PRIMER_PARAMS),
            Anchor::new(reverse_complement(reverse), CUSTOM_PRIMER_PARAMS),
            Anchor::new(reverse.to_string(), CUSTOM_PRIMER_PARAMS),
            Anchor::new(reverse_complement(forward), CUSTOM_PRIMER_PARAMS),
        );
        info.validate()?;
        Ok(info)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn top5(&self) -> Option<&Anchor> {
        self.top5.as_ref()
    }

    #[must_use]
    pub fn top3(&self) -> Option<&Anchor> {
        self.top3.as_ref()
    }

    #[must_use]
    pub fn bot5(&self) -> Option<&Anchor> {
        self.bot5.as_ref()
    }

    #[must_use]
    pub fn bot3(&self) -> Option<&Anchor> {
        self.bot3.as_ref()
    }

    /// Derives which anchors to attempt from the configured queries
    #[must_use]
    pub fn directions(&self) -> TrimDirections {
        TrimDirections {
            top5: self.top5.is_some(),
            top3: self.top3.is_some(),
            bot5: self.bot5.is_some(),
            bot3: self.bot3.is_some(),
        }
    }

    /// Applies partial numeric overrides, leaving unset fields untouched
    ///
    /// Overrides addressed at anchors the kit does not define are ignored.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if an overridden value falls outside its
    /// documented range.
    pub fn update(&mut self, overrides: &TrimOverrides) -> Result<()> {
        fn apply(anchor: &mut Option<Anchor>, patch: &AnchorOverride) {
            if let Some(anchor) = anchor {
                if let Some(window) = patch.window {
                    anchor.params.window = window;
                }
                if let Some(cov) = patch.min_coverage {
                    anchor.params.min_coverage = cov;
                }
                if let Some(id) = patch.min_identity {
                    anchor.params.min_identity = id;
                }
            }
        }
        apply(&mut self.top5, &overrides.top5);
        apply(&mut self.top3, &overrides.top3);
        apply(&mut self.bot5, &overrides.bot5);
        apply(&mut self.bot3, &overrides.bot3);
        self.validate()
    }

    /// Checks all configured anchors against the documented parameter ranges
    ///
    /// # Errors
    /// Returns a [`ConfigError`] naming the offending parameter.
    pub fn validate(&self) -> Result<()> {
        if let Some(anchor) = &self.top5 {
            anchor.validate(TOP5_NAMES)?;
        }
        if let Some(anchor) = &self.top3 {
            anchor.validate(TOP3_NAMES)?;
        }
        if let Some(anchor) = &self.bot5 {
            anchor.validate(BOT5_NAMES)?;
        }
        if let Some(anchor) = &self.bot3 {
            anchor.validate(BOT3_NAMES)?;
        }
        Ok(())
    }

    /// Human-readable summary written at the head of trimming logs
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = format!("kit: {}\n", self.name);
        for (label, anchor) in [
            ("top 5' end", &self.top5),
            ("top 3' end", &self.top3),
            ("bottom 5' end", &self.bot5),
            ("bottom 3' end", &self.bot3),
        ] {
            if let Some(anchor) = anchor {
                out.push_str(&format!(
                    "{label}: {} (window: {}, min coverage: {}, min identity: {})\n",
                    anchor.query,
                    anchor.params.window,
                    anchor.params.min_coverage,
                    anchor.params.min_identity
                ));
            }
        }
        out
    }
}

/// The immutable kit catalog, keyed by kit name or `<kit>-<barcode>` key
#[derive(Debug, Clone)]
pub struct AdapterCatalog {
    entries: HashMap<String, SequenceInfo>,
}

impl AdapterCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: kits::build_catalog(),
        }
    }

    /// Looks up a kit or barcoded-kit entry
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownBarcode`] when the key names a known
    /// barcoded family with an out-of-range barcode number, and
    /// [`ConfigError::UnknownKit`] otherwise.
    pub fn get(&self, key: &str) -> Result<&SequenceInfo> {
        if let Some(info) = self.entries.get(key) {
            return Ok(info);
        }
        if let Some((family, number)) = key.rsplit_once('-') {
            if let Ok(barcode) = number.parse::<usize>() {
                if let Some(&(_, max)) = kits::BARCODED_FAMILIES
                    .iter()
                    .find(|(name, _)| *name == family)
                {
                    return Err(ConfigError::UnknownBarcode {
                        kit: family.to_string(),
                        barcode,
                        max,
                    }
                    .into());
                }
            }
        }
        Err(ConfigError::UnknownKit {
            name: key.to_string(),
        }
        .into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AdapterCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog = AdapterCatalog::new();
        let info = catalog.get("SQK-LSK114").unwrap();
        assert_eq!(info.name(), "SQK-LSK114");
        let top5 = info.top5().unwrap();
        assert_eq!(top5.params.window, 100);
        assert!((top5.params.min_coverage - 0.75).abs() < f64::EPSILON);
        let top3 = info.top3().unwrap();
        assert_eq!(top3.params.window, 60);
        assert!((top3.params.min_coverage - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_catalog_unknown_names() {
        let catalog = AdapterCatalog::new();
        let err = catalog.get("SQK-XYZ999").unwrap_err();
        assert!(err.to_string().contains("Unknown kit name"));
        let err = catalog.get("SQK-NBD114.24-30").unwrap_err();
        assert!(err.to_string().contains("Unknown barcode 30"));
        assert!(err.to_string().contains("[1, 24]"));
        let err = catalog.get("SQK-RBK114.96-200").unwrap_err();
        assert!(err.to_string().contains("[1, 96]"));
    }

    #[test]
    fn test_directions_by_family() {
        let catalog = AdapterCatalog::new();
        let rapid = catalog.get("SQK-RAD114").unwrap().directions();
        assert!(rapid.top5 && !rapid.top3 && !rapid.bot5 && !rapid.bot3);
        let ligation = catalog.get("SQK-LSK114").unwrap().directions();
        assert!(ligation.top5 && ligation.top3 && !ligation.bot5);
        let cdna = catalog.get("SQK-PCS114").unwrap().directions();
        assert!(cdna.top5 && cdna.top3 && cdna.bot5 && cdna.bot3);
        assert!(cdna.any());
    }

    #[test]
    fn test_catalog_entries_validate() {
        let catalog = AdapterCatalog::new();
        for key in ["SQK-LSK114", "SQK-PCS114", "SQK-NBD114.96-42", "SQK-PCB114.24-24"] {
            catalog.get(key).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn test_custom_primers() {
        let info = SequenceInfo::custom("primers".to_string(), "ACGTACGTAC", "TTGGCCAATT").unwrap();
        assert_eq!(info.top5().unwrap().query, "ACGTACGTAC");
        assert_eq!(info.top3().unwrap().query, reverse_complement("TTGGCCAATT"));
        assert_eq!(info.bot5().unwrap().query, "TTGGCCAATT");
        assert_eq!(info.bot3().unwrap().query, reverse_complement("ACGTACGTAC"));
        assert_eq!(info.top5().unwrap().params.window, 180);

        let too_long = "A".repeat(MAX_QUERY_LEN + 1);
        let err = SequenceInfo::custom("primers".to_string(), &too_long, "ACGT").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_update_partial_override() {
        let catalog = AdapterCatalog::new();
        let mut info = catalog.get("SQK-LSK114").unwrap().clone();
        let overrides = TrimOverrides {
            top5: AnchorOverride {
                window: Some(80),
                min_coverage: None,
                min_identity: Some(0.9),
            },
            ..TrimOverrides::default()
        };
        info.update(&overrides).unwrap();
        let top5 = info.top5().unwrap();
        assert_eq!(top5.params.window, 80);
        assert!((top5.params.min_coverage - 0.75).abs() < f64::EPSILON);
        assert!((top5.params.min_identity - 0.9).abs() < f64::EPSILON);
        // Untouched anchor keeps its catalog values
        assert_eq!(info.top3().unwrap().params.window, 60);
    }

    #[test]
    fn test_update_rejects_out_of_range() {
        let catalog = AdapterCatalog::new();
        let mut info = catalog.get("SQK-LSK114").unwrap().clone();
        let overrides = TrimOverrides {
            top3: AnchorOverride {
                window: Some(5000),
                ..AnchorOverride::default()
            },
            ..TrimOverrides::default()
        };
        let err = info.update(&overrides).unwrap_err();
        assert!(err.to_string().contains("top 3' end window length"));

        let mut info = catalog.get("SQK-PCS114").unwrap().clone();
        let overrides = TrimOverrides {
            bot5: AnchorOverride {
                min_identity: Some(1.5),
                ..AnchorOverride::default()
            },
            ..TrimOverrides::default()
        };
        assert!(info.update(&overrides).unwrap_err().is_config());
    }

    #[test]
    fn test_override_on_absent_anchor_is_ignored() {
        let catalog = AdapterCatalog::new();
        let mut info = catalog.get("SQK-RAD114").unwrap().clone();
        let overrides = TrimOverrides {
            top3: AnchorOverride {
                window: Some(50),
                ..AnchorOverride::default()
            },
            ..TrimOverrides::default()
        };
        info.update(&overrides).unwrap();
        assert!(info.top3().is_none());
    }

    #[test]
    fn test_describe_lists_configured_anchors() {
        let catalog = AdapterCatalog::new();
        let text = catalog.get("SQK-RAD114").unwrap().describe();
        assert!(text.starts_with("kit: SQK-RAD114\n"));
        assert!(text.contains("top 5' end:"));
        assert!(!text.contains("top 3' end:"));
        assert!(text.contains("window: 150"));
    }
}

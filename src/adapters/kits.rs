//! Embedded kit chemistry: adapter, flanking, and barcode sequences
//!
//! Sequences follow the ONT chemistry technical document. Composite queries
//! are assembled here exactly as they appear on the top strand of a read, so
//! the trimming engine can align them without further orientation logic.
use std::collections::HashMap;

use super::{Anchor, SequenceInfo, TrimParams};
use crate::record::reverse_complement;

/// Ligation adapter, 5' end of the top strand
pub const LA_ADAPTER_5: &str = "CCTGTACTTCGTTCAGTTACGTATTGCT";
/// Ligation adapter, 3' end of the top strand
pub const LA_ADAPTER_3: &str = "AGCAATACGTAACTGAACGAAGTACAGG";

/// Native adapter pieces surrounding native barcodes
pub const NA_ADAPTER_5: &str = "CCTGTACTTCGTTCAGTTACGTATTGCT";
pub const NA_ADAPTER_3: &str = "ACGTAACTGAACGAAGTACAGG";
pub const NB_LEFT_FLANKING_5: &str = "AAGGTTAA";
pub const NB_RIGHT_FLANKING_5: &str = "CAGCACCT";
pub const NB_LEFT_FLANKING_3: &str = "AGGTGCTG";
pub const NB_RIGHT_FLANKING_3: &str = "TTAACCTTAGCAAT";

/// Rapid adapter pieces surrounding rapid barcodes
pub const RB_LEFT_FLANKING: &str = "GCTTGGGTGTTTAACC";
pub const RB_RIGHT_FLANKING: &str =
    "GTTTTCGCATTTATCGTGAAACGCTTTCGCGTTTTTCGTGCGCCGCTTCA";

/// Strand switching primer II; V matches G, A, or C
pub const SSPII: &str = "TTTCTGTTGGTGCTGATATTGCTTTVVVVTTVVVVTTVVVVTTVVVVTTTGGG";
/// cDNA RT adapter, one extra T at the 3' end relative to the document
pub const CRTA: &str = "CTTGCGGGCGGCGGACTCTCCTCTGAAGATAGAGCGACAGGCAAGT";

// Search parameters per kit family: (window, min coverage, min identity)
const LSK_TOP5: TrimParams = TrimParams::new(100, 0.75, 0.75);
const LSK_TOP3: TrimParams = TrimParams::new(60, 0.5, 0.75);
const NBD_TOP5: TrimParams = TrimParams::new(150, 0.4, 0.75);
const NBD_TOP3: TrimParams = TrimParams::new(150, 0.3, 0.75);
const RAD_TOP5: TrimParams = TrimParams::new(150, 0.5, 0.75);
const RBK_TOP5: TrimParams = TrimParams::new(200, 0.4, 0.75);
const PCS_TOP5: TrimParams = TrimParams::new(150, 0.6, 0.75);
const PCS_TOP3: TrimParams = TrimParams::new(150, 0.4, 0.75);
const PCS_BOT5: TrimParams = TrimParams::new(150, 0.6, 0.75);
const PCS_BOT3: TrimParams = TrimParams::new(150, 0.4, 0.75);
const PCB_END: TrimParams = TrimParams::new(180, 0.3, 0.75);

/// Native barcodes NB01 through NB96
pub const NATIVE_BARCODES: [&str; 96] = [
    "AAGAAAGTTGTCGGTGTCTTTGTG",
    "TCGATTCCGTTTGTAGTCGTCTGT",
    "GAGTCTTGTGTCCCAGTTACCAGG",
    "TTCGGATTCTATCGTGTTTCCCTA",
    "CTTGTCCAGGGTTTGTGTAACCTT",
    "TTCTCGCAAAGGCAGAAAGTAGTC",
    "GTGTTACCGTGGGAATGAATCCTT",
    "TTCAGGGAACAAACCAAGTTACGT",
    "AACTAGGCACAGCGAGTCTTGGTT",
    "AAGCGTTGAAACCTTTGTCCTCTC",
    "GTTTCATCTATCGGAGGGAATGGA",
    "CAGGTAGAAAGAAGCAGAATCGGA",
    "TCACACGAGTATGGAAGTCGTTCT",
    "TCTATGGGTCCCAAGAGACTCGTT",
    "CAGTGGTGTTAGCGAGGTAGACCT",
    "AGTACGAACCACTGTCAGTTGACG",
    "ATCAGAGGTACTTTCCTGGAGGGT",
    "GCCTATCTAGGTTGTTGGGTTTGG",
    "ATCTCTTGACACTGCACGAGGAAC",
    "ATGAGTTCTCGTAACAGGACGCAA",
    "TAGAGAACGGACAATGAGAGGCTC",
    "CGTACTTTGATACATGGCAGTGGT",
    "CGAGGAGGTTCACTGGGTAGTAAG",
    "CTAACCCATCATGCAGAACTATGC",
    "CATTGCGTTGCATACCCAACTTAC",
    "ATGAGAATGCGTAGTCGCTGTATG",
    "TGTAAGAGGTGAATCTAACCGTCG",
    "GATACGGTGCCTTCTTAGGTTTCA",
    "GGTCTGTCAACCCAAGGTGTCTAG",
    "TGGGTCGAAGTAGATCCTCACTGA",
    "CAATGTAACTGATTGCTGTACGCA",
    "ATGACGTTGTCGGACTTCTACTGG",
    "AGTTACCCAACCGTACCAAGTCTG",
    "GCCTTTGACTTGAGTTCTTCGTCC",
    "GCAGTCCCTCAGCTTCGTAAGTAG",
    "TGTTTCCTCCTCTAACTGGGACAT",
    "TGATACTAAGCATCAATCGCAAGC",
    "TTCTCTGTATCGTCCTCCTGTGGT",
    "GAGAGGCTCTAGTTGACACTGTGG",
    "GGCTATCCTTGGTCATCCAAACTA",
    "CGTGTACTTCTCTGGACGAACTCC",
    "CTGGCAGGTATGCCTTACACGTAG",
    "CTACCGTCGAGTCAACAACGAAAG",
    "GAGTGGGAAGGAACCCTTTCTACT",
    "CACTGAAGGCATCTCTGTTGGATC",
    "CAGGAGAATGAAGTGGAACACAGC",
    "GAACTACCTGTGGGAAAGTTGCAC",
    "TACAGGTGTACCACGTTCCAGATG",
    "CTAGATGTTCAAAGCTGCACCAGT",
    "ACGCAGGAAGTTACCAAAGTCCAT",
    "GAGGACCCAGTAGGCTCATTCAAC",
    "GTCCACGAACAATCTTGTCTCTCA",
    "CTTTGCATGAGACGGTCTGAATCT",
    "CATGCTCCTTAGTCAAAGCTCTTG",
    "CGTAGATCAGGGTCTCATCTTCCA",
    "TTCATGCCACCTGTTGAGTAGTGA",
    "ACTTCCGAAGGAGATTGACCTAGC",
    "TCAGACTCACGGAGGAGTAACCTG",
    "ACCTTGCTTTCCCTTCTTGATTGA",
    "CCATAGAAGCCTTGGTTGAACATG",
    "GTGCTGAGGCACATAGTACCCTCT",
    "TACGTCCTGAAGTAAGTGTGGGTG",
    "GTTCAAGACCCAGGAACTTCAGAA",
    "GAAAGTCGATGAACGGTGTCTGTC",
    "CCTTGTCTGGAGGAAGACTGAGAA",
    "GAAGTTAGAAGCCACAAGGATCGG",
    "GGTGAGCACACGAGTATGACAAAC",
    "CCACCTTCGTGTTTGCTTAGATTC",
    "AGATCACATGAGGCTCGGACTGTA",
    "ACACTCCATTCGTAGGATCTCGGT",
    "CTGTTACTACCTGATGCTCCCAGG",
    "GTCGGTATGGAAGACAGTCAGCTA",
    "GAGGGTTCTGTCATCCTGTTTCTT",
    "AGTGGAAGTGTTGGGATGCTTGTA",
    "ACAACAGGGTTCATCACAATGGTC",
    "GTCCAGGGTTGATGTAACAAGCAT",
    "GTTGTATCCCTGAGAAACAGGTCG",
    "TTCTGATTCAAAGGTTCGGTTGTT",
    "CAGCAGTGAGAACTATCTCCGAGA",
    "GAATCGCTATCCTATGTTCATCCG",
    "CCGAAACAACTTCACAAGATGAGG",
    "TAGTCCTGGAACTCGACATACCGT",
    "TTCGACCTTACCTAGATCAAGCCA",
    "TGGCACAGGTTCTAGGTCCACTAC",
    "GATCATCCAACTAACTCCTCCGTT",
    "TACTTACGCTTGTTGGGATCACCT",
    "CCTCCCTAACAACAGGAGCATGTA",
    "CTGCTTCGGATCGGTAGTAGAAGA",
    "CAACTAGCCAAACATTGATGCTGT",
    "GCCTCAAACCGTACCCTCTACATC",
    "AGTAGCGTGAGTTCCTATGGAGCC",
    "GGTCCTGTATCTTTCCACTCACAA",
    "CCCAAGTCTGAAGTGATGGAAACT",
    "GTAGGTGGCAGTTTGAGGACAATC",
    "AAGTCCATTCTTCTTCCAGACAGG",
    "ATGGTGGACTCTATGACCGTTCAG",
];

/// Rapid barcodes RB13 through RB96; RB01 through RB12 equal NB01 through NB12
const RAPID_BARCODES_13_ON: [&str; 84] = [
    "AGAACGACTTCCATACTCGTGTGA",
    "AACGAGTCTCTTGGGACCCATAGA",
    "AGGTCTACCTCGCTAACACCACTG",
    "CGTCAACTGACAGTGGTTCGTACT",
    "ACCCTCCAGGAAAGTACCTCTGAT",
    "CCAAACCCAACAACCTAGATAGGC",
    "GTTCCTCGTGCAGTGTCAAGAGAT",
    "TTGCGTCCTGTTACGAGAACTCAT",
    "GAGCCTCTCATTGTCCGTTCTCTA",
    "ACCACTGCCATGTATCAAAGTACG",
    "CTTACTACCCAGTGAACCTCCTCG",
    "GCATAGTTCTGCATGATGGGTTAG",
    "GTAAGTTGGGTATGCAACGCAATG",
    "CATACAGCGACTACGCATTCTCAT",
    "CGACGGTTAGATTCACCTCTTACA",
    "TGAAACCTAAGAAGGCACCGTATC",
    "CTAGACACCTTGGGTTGACAGACC",
    "TCAGTGAGGATCTACTTCGACCCA",
    "TGCGTACAGCAATCAGTTACATTG",
    "CCAGTAGAAGTCCGACAACGTCAT",
    "CAGACTTGGTACGGTTGGGTAACT",
    "GGACGAAGAACTCAAGTCAAAGGC",
    "CTACTTACGAAGCTGAGGGACTGC",
    "ATGTCCCAGTTAGAGGAGGAAACA",
    "GCTTGCGATTGATGCTTAGTATCA",
    "ACCACAGGAGGACGATACAGAGAA",
    "CCACAGTGTCAACTAGAGCCTCTC",
    "TAGTTTGGATGACCAAGGATAGCC",
    "GGAGTTCGTCCAGAGAAGTACACG",
    "CTACGTGTAAGGCATACCTGCCAG",
    "CTTTCGTTGTTGACTCGACGGTAG",
    "AGTAGAAAGGGTTCCTTCCCACTC",
    "GATCCAACAGAGATGCCTTCAGTG",
    "GCTGTGTTCCACTTCATTCTCCTG",
    "GTGCAACTTTCCCACAGGTAGTTC",
    "CATCTGGAACGTGGTACACCTGTA",
    "ACTGGTGCAGCTTTGAACATCTAG",
    "ATGGACTTTGGTAACTTCCTGCGT",
    "GTTGAATGAGCCTACTGGGTCCTC",
    "TGAGAGACAAGATTGTTCGTGGAC",
    "AGATTCAGACCGTCTCATGCAAAG",
    "CAAGAGCTTTGACTAAGGAGCATG",
    "TGGAAGATGAGACCCTGATCTACG",
    "TCACTACTCAACAGGTGGCATGAA",
    "GCTAGGTCAATCTCCTTCGGAAGT",
    "CAGGTTACTCCTCCGTGAGTCTGA",
    "TCAATCAAGAAGGGAAAGCAAGGT",
    "CATGTTCAACCAAGGCTTCTATGG",
    "AGAGGGTACTATGTGCCTCAGCAC",
    "CACCCACACTTACTTCAGGACGTA",
    "TTCTGAAGTTCCTGGGTCTTGAAC",
    "GACAGACACCGTTCATCGACTTTC",
    "TTCTCAGTCTTCCTCCAGACAAGG",
    "CCGATCCTTGTGGCTTCTAACTTC",
    "GTTTGTCATACTCGTGTGCTCACC",
    "GAATCTAAGCAAACACGAAGGTGG",
    "TACAGTCCGAGCCTCATGTGATCT",
    "ACCGAGATCCTACGAATGGAGTGT",
    "CCTGGGAGCATCAGGTAGTAACAG",
    "TAGCTGACTGTCTTCCATACCGAC",
    "AAGAAACAGGATGACAGAACCCTC",
    "TACAAGCATCCCAACACTTCCACT",
    "GACCATTGTGATGAACCCTGTTGT",
    "ATGCTTGTTACATCAACCCTGGAC",
    "CGACCTGTTTCTCAGGGATACAAC",
    "AACAACCGAACCTTTGAATCAGAA",
    "TCTCGGAGATAGTTCTCACTGCTG",
    "CGGATGAACATAGGATAGCGATTC",
    "CCTCATCTTGTGAAGTTGTTTCGG",
    "ACGGTATGTCGAGTTCCAGGACTA",
    "TGGCTTGATCTAGGTAAGGTCGAA",
    "GTAGTGGACCTAGAACCTGTGCCA",
    "AACGGAGGAGTTAGTTGGATGATC",
    "AGGTGATCCCAACAAGCGTAAGTA",
    "TACATGCTCCTGTTGTTAGGGAGG",
    "TCTTCTACTACCGATCCGAAGCAG",
    "ACAGCATCAATGTTTGGCTAGTTG",
    "GATGTAGAGGGTACGGTTTGAGGC",
    "GGCTCCATAGGAACTCACGCTACT",
    "TTGTGAGTGGAAAGATACAGGACC",
    "AGTTTCCATCACTTCAGACTTGGG",
    "GATTGTCCTCAAACTGCCACCTAC",
    "CCTGTCTGGAAGAAGAATGGACTT",
    "CTGAACGGTCATAGAGTCCACCAT",
];

/// Rapid barcode by 0-based index
#[must_use]
pub fn rapid_barcode(index: usize) -> &'static str {
    if index < 12 {
        NATIVE_BARCODES[index]
    } else {
        RAPID_BARCODES_13_ON[index - 12]
    }
}

/// Barcoded kit families and their barcode counts
pub const BARCODED_FAMILIES: [(&str, usize); 5] = [
    ("SQK-NBD114.24", 24),
    ("SQK-NBD114.96", 96),
    ("SQK-RBK114.24", 24),
    ("SQK-RBK114.96", 96),
    ("SQK-PCB114.24", 24),
];

fn native_entry(name: String, barcode: &str) -> SequenceInfo {
    let top5 = format!(
        "{NA_ADAPTER_5}{NB_LEFT_FLANKING_5}{}{NB_RIGHT_FLANKING_5}",
        reverse_complement(barcode)
    );
    let top3 = format!("{NB_LEFT_FLANKING_3}{barcode}{NB_RIGHT_FLANKING_3}{NA_ADAPTER_3}");
    SequenceInfo::paired(
        name,
        Anchor::new(top5, NBD_TOP5),
        Anchor::new(top3, NBD_TOP3),
    )
}

fn rapid_entry(name: String, barcode: &str) -> SequenceInfo {
    let top5 = format!("{RB_LEFT_FLANKING}{barcode}{RB_RIGHT_FLANKING}");
    SequenceInfo::front_only(name, Anchor::new(top5, RBK_TOP5))
}

fn pcr_barcode_entry(name: String, barcode: &str) -> SequenceInfo {
    let crta_rc = reverse_complement(CRTA);
    let sspii_rc = reverse_complement(SSPII);
    let barcode_rc = reverse_complement(barcode);
    SequenceInfo::double_stranded(
        name,
        Anchor::new(format!("{barcode}{SSPII}"), PCB_END),
        Anchor::new(format!("{CRTA}{barcode_rc}"), PCB_END),
        Anchor::new(format!("{barcode}{crta_rc}"), PCB_END),
        Anchor::new(format!("{sspii_rc}{barcode_rc}"), PCB_END),
    )
}

/// Builds the full kit catalog keyed by kit name or `<kit>-<barcode>` key
pub(super) fn build_catalog() -> HashMap<String, SequenceInfo> {
    let mut catalog = HashMap::new();
    catalog.insert(
        "SQK-LSK114".to_string(),
        SequenceInfo::paired(
            "SQK-LSK114".to_string(),
            Anchor::new(LA_ADAPTER_5.to_string(), LSK_TOP5),
            Anchor::new(LA_ADAPTER_3.to_string(), LSK_TOP3),
        ),
    );
    let rapid_adapter = format!("{RB_LEFT_FLANKING}{RB_RIGHT_FLANKING}");
    for name in ["SQK-RAD114", "SQK-ULK114"] {
        catalog.insert(
            name.to_string(),
            SequenceInfo::front_only(
                name.to_string(),
                Anchor::new(rapid_adapter.clone(), RAD_TOP5),
            ),
        );
    }
    catalog.insert(
        "SQK-PCS114".to_string(),
        SequenceInfo::double_stranded(
            "SQK-PCS114".to_string(),
            Anchor::new(SSPII.to_string(), PCS_TOP5),
            Anchor::new(CRTA.to_string(), PCS_TOP3),
            Anchor::new(reverse_complement(CRTA), PCS_BOT5),
            Anchor::new(reverse_complement(SSPII), PCS_BOT3),
        ),
    );
    for i in 0..96 {
        let native = NATIVE_BARCODES[i];
        let rapid = rapid_barcode(i);
        if i < 24 {
            catalog.insert(
                format!("SQK-NBD114.24-{}", i + 1),
                native_entry(format!("SQK-NBD114.24-{}", i + 1), native),
            );
            catalog.insert(
                format!("SQK-RBK114.24-{}", i + 1),
                rapid_entry(format!("SQK-RBK114.24-{}", i + 1), rapid),
            );
            catalog.insert(
                format!("SQK-PCB114.24-{}", i + 1),
                pcr_barcode_entry(format!("SQK-PCB114.24-{}", i + 1), rapid),
            );
        }
        catalog.insert(
            format!("SQK-NBD114.96-{}", i + 1),
            native_entry(format!("SQK-NBD114.96-{}", i + 1), native),
        );
        catalog.insert(
            format!("SQK-RBK114.96-{}", i + 1),
            rapid_entry(format!("SQK-RBK114.96-{}", i + 1), rapid),
        );
    }
    catalog
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_barcode_tables() {
        for barcode in NATIVE_BARCODES {
            assert_eq!(barcode.len(), 24);
        }
        for i in 0..96 {
            assert_eq!(rapid_barcode(i).len(), 24);
        }
        // The first 12 rapid barcodes are the native ones
        assert_eq!(rapid_barcode(0), NATIVE_BARCODES[0]);
        assert_eq!(rapid_barcode(11), NATIVE_BARCODES[11]);
        assert_ne!(rapid_barcode(12), NATIVE_BARCODES[12]);
    }

    #[test]
    fn test_catalog_size() {
        let catalog = build_catalog();
        // 4 plain kits + 24 + 96 native, 24 + 96 rapid, 24 PCR-barcoded
        assert_eq!(catalog.len(), 4 + 24 + 96 + 24 + 96 + 24);
        assert!(catalog.contains_key("SQK-LSK114"));
        assert!(catalog.contains_key("SQK-NBD114.96-96"));
        assert!(!catalog.contains_key("SQK-NBD114.24-25"));
    }

    #[test]
    fn test_native_composite_layout() {
        let catalog = build_catalog();
        let info = &catalog["SQK-NBD114.24-1"];
        let top5 = info.top5().unwrap();
        assert_eq!(
            top5.query,
            "CCTGTACTTCGTTCAGTTACGTATTGCTAAGGTTAACACAAAGACACCGACAACTTTCTTCAGCACCT"
        );
        assert_eq!(top5.query.len(), 68);
        let top3 = info.top3().unwrap();
        assert_eq!(
            top3.query,
            "AGGTGCTGAAGAAAGTTGTCGGTGTCTTTGTGTTAACCTTAGCAATACGTAACTGAACGAAGTACAGG"
        );
        assert_eq!(top3.query.len(), 68);
    }

    #[test]
    fn test_rapid_composite_layout() {
        let catalog = build_catalog();
        let info = &catalog["SQK-RBK114.24-1"];
        let top5 = info.top5().unwrap();
        assert_eq!(top5.query.len(), 16 + 24 + 50);
        assert!(top5.query.starts_with(RB_LEFT_FLANKING));
        assert!(top5.query.ends_with(RB_RIGHT_FLANKING));
        assert!(info.top3().is_none());
        assert!(info.bot5().is_none());
    }

    #[test]
    fn test_cdna_anchors() {
        let catalog = build_catalog();
        let info = &catalog["SQK-PCS114"];
        assert_eq!(info.top5().unwrap().query, SSPII);
        assert_eq!(info.top3().unwrap().query, CRTA);
        assert_eq!(
            info.bot5().unwrap().query,
            "ACTTGCCTGTCGCTCTATCTTCAGAGGAGAGTCCGCCGCCCGCAAG"
        );
        assert_eq!(
            info.bot3().unwrap().query,
            "CCCAAABBBBAABBBBAABBBBAABBBBAAAGCAATATCAGCACCAACAGAAA"
        );
    }
}

//! UniProt flat-text record parser
//!
//! Reads a single entry in the line-tagged UniProt text format
//! (https://web.expasy.org/docs/userman.html) and keeps what the protein
//! builder stores:
//!
//! ```text
//! ID   ADRB2_HUMAN             Reviewed;         413 AA.
//! DE   RecName: Full=Beta-2 adrenergic receptor;
//! DE   AltName: Full=Beta-2 adrenoreceptor {ECO:0000303|PubMed:2831218};
//! GN   Name=ADRB2; Synonyms=ADRB2R, B2AR;
//! OS   Homo sapiens (Human).
//! SQ   SEQUENCE   413 AA;  46459 MW;  8F2A2E56C4A0D0B1 CRC64;
//!      MGQPGNGSAF LLAPNRSHAP DHDVTQQRDE ...
//! //
//! ```

use flate2::read::GzDecoder;
use std::io::{BufRead, BufReader};

use super::models::{ReviewStatus, UniProtRecord};
use super::RecordError;

/// Parser for one UniProt text entry
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse_str(&self, text: &str) -> Result<UniProtRecord, RecordError> {
        self.parse_reader(text.as_bytes())
    }

    /// Parse a gzip-compressed entry
    pub fn parse_gzip(&self, data: &[u8]) -> Result<UniProtRecord, RecordError> {
        self.parse_reader(BufReader::new(GzDecoder::new(data)))
    }

    /// Parse until the `//` terminator or end of input
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<UniProtRecord, RecordError> {
        let mut builder = RecordBuilder::default();
        let mut in_sequence = false;

        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(RecordError::Read)?;
            let line_no = index + 1;

            if line.starts_with("//") {
                break;
            }

            if line.starts_with("ID") {
                builder.parse_id_line(&line);
            } else if line.starts_with("OS") {
                builder.parse_os_line(&line);
            } else if line.starts_with("DE") {
                builder.parse_de_line(&line);
            } else if line.starts_with("GN") {
                builder.parse_gn_line(&line);
            } else if line.starts_with("SQ") {
                builder.parse_sq_line(&line, line_no)?;
                in_sequence = true;
            } else if in_sequence {
                builder.push_sequence(&line);
            }
        }

        builder.build()
    }
}

#[derive(Debug, Default)]
struct RecordBuilder {
    entry_name: Option<String>,
    review_status: Option<ReviewStatus>,
    organism: Option<String>,
    names: Vec<String>,
    genes: Vec<String>,
    declared_length: Option<usize>,
    sequence: String,
}

impl RecordBuilder {
    /// `ID   ADRB2_HUMAN   Reviewed;   413 AA.`
    fn parse_id_line(&mut self, line: &str) {
        let mut tokens = line.split_whitespace().skip(1);
        if let Some(entry_name) = tokens.next() {
            self.entry_name = Some(entry_name.to_lowercase());
        }
        if let Some(status) = tokens.next() {
            self.review_status = ReviewStatus::from_id_token(status);
        }
    }

    /// `OS   Homo sapiens (Human).`, continuation lines are joined
    fn parse_os_line(&mut self, line: &str) {
        let text = line.get(2..).unwrap_or_default().trim();
        match &mut self.organism {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(text);
            },
            None => self.organism = Some(text.to_string()),
        }
    }

    /// `DE   RecName: Full=Beta-2 adrenergic receptor {ECO:...};`
    fn parse_de_line(&mut self, line: &str) {
        if let Some(value) = line.split('=').nth(1) {
            let name = value
                .split('{')
                .next()
                .unwrap_or_default()
                .trim()
                .trim_matches(';')
                .trim();
            self.names.push(name.to_string());
        }
    }

    /// `GN   Name=ADRB2 {ECO:...}; Synonyms=ADRB2R, B2AR;`
    fn parse_gn_line(&mut self, line: &str) {
        for segment in line.split(';').filter(|s| s.contains('=')) {
            let Some(values) = segment.split('=').nth(1) else {
                continue;
            };
            for gene in values.split(',') {
                let gene = gene.split('{').next().unwrap_or_default().trim();
                if !gene.is_empty() {
                    self.genes.push(gene.to_string());
                }
            }
        }
    }

    /// `SQ   SEQUENCE   413 AA;  46459 MW;  ...`
    fn parse_sq_line(&mut self, line: &str, line_no: usize) -> Result<(), RecordError> {
        let length = line.split_whitespace().nth(2).ok_or_else(|| RecordError::Parse {
            line: line_no,
            message: "SQ line has no sequence length".to_string(),
        })?;
        let length = length.parse::<usize>().map_err(|e| RecordError::Parse {
            line: line_no,
            message: format!("invalid sequence length '{}': {}", length, e),
        })?;
        self.declared_length = Some(length);
        self.sequence.clear();
        Ok(())
    }

    fn push_sequence(&mut self, line: &str) {
        self.sequence
            .extend(line.chars().filter(|c| !c.is_whitespace()));
    }

    fn build(self) -> Result<UniProtRecord, RecordError> {
        let entry_name = self.entry_name.ok_or(RecordError::Incomplete("entry name"))?;
        let review_status = self
            .review_status
            .ok_or(RecordError::Incomplete("review status"))?;
        let organism = self.organism.ok_or(RecordError::Incomplete("organism"))?;
        let declared_length = self
            .declared_length
            .ok_or(RecordError::Incomplete("sequence"))?;

        let (species_latin_name, species_common_name) = split_organism(&organism);
        if species_latin_name.is_empty() {
            return Err(RecordError::Incomplete("species name"));
        }

        Ok(UniProtRecord {
            entry_name,
            review_status,
            species_latin_name,
            species_common_name,
            names: self.names,
            genes: self.genes,
            declared_length,
            sequence: self.sequence,
        })
    }
}

/// "Homo sapiens (Human)." -> ("Homo sapiens", "Human")
fn split_organism(organism: &str) -> (String, String) {
    let full = organism.trim().trim_matches('.');
    match full.split_once('(') {
        Some((latin, rest)) => {
            let latin = latin.trim().to_string();
            let common = rest.split(')').next().unwrap_or_default().trim();
            if common.is_empty() {
                (latin.clone(), latin)
            } else {
                (latin, common.to_string())
            }
        },
        None => (full.trim().to_string(), full.trim().to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const MINIMAL: &str = "ID   FOO_HUMAN   Reviewed;\n\
                           OS  Homo sapiens (Human).\n\
                           SQ   SEQUENCE 3 AA.\n\
                           MKV\n\
                           //\n";

    #[test]
    fn test_minimal_record() {
        let record = RecordParser::new().parse_str(MINIMAL).unwrap();
        assert_eq!(record.entry_name, "foo_human");
        assert_eq!(record.review_status, ReviewStatus::Reviewed);
        assert_eq!(record.source_name(), "SWISSPROT");
        assert_eq!(record.species_latin_name, "Homo sapiens");
        assert_eq!(record.species_common_name, "Human");
        assert_eq!(record.sequence, "MKV");
        assert_eq!(record.declared_length, 3);
        assert!(record.names.is_empty());
        assert!(record.genes.is_empty());
    }

    #[test]
    fn test_id_line_unreviewed() {
        let mut builder = RecordBuilder::default();
        builder.parse_id_line("ID   Q8N6U8_HUMAN            Unreviewed;       391 AA.");
        assert_eq!(builder.entry_name.as_deref(), Some("q8n6u8_human"));
        assert_eq!(builder.review_status, Some(ReviewStatus::Unreviewed));
    }

    #[test]
    fn test_de_lines_keep_order_and_strip_evidence() {
        let mut builder = RecordBuilder::default();
        builder.parse_de_line("DE   RecName: Full=Beta-2 adrenergic receptor;");
        builder.parse_de_line("DE            Short=Beta-2 adrenoreceptor {ECO:0000303|PubMed:2831218};");
        builder.parse_de_line("DE   Flags: Precursor;");
        assert_eq!(
            builder.names,
            vec!["Beta-2 adrenergic receptor", "Beta-2 adrenoreceptor"]
        );
    }

    #[test]
    fn test_gn_line_splits_synonyms() {
        let mut builder = RecordBuilder::default();
        builder.parse_gn_line("GN   Name=ADRB2 {ECO:0000312|HGNC:HGNC:286}; Synonyms=ADRB2R, B2AR;");
        builder.parse_gn_line("GN   ORFNames=FLJ00001;");
        assert_eq!(builder.genes, vec!["ADRB2", "ADRB2R", "B2AR", "FLJ00001"]);
    }

    #[test]
    fn test_os_without_common_name() {
        assert_eq!(
            split_organism("Danio rerio."),
            ("Danio rerio".to_string(), "Danio rerio".to_string())
        );
        assert_eq!(
            split_organism("Escherichia coli (strain K12) (Bacteria)."),
            ("Escherichia coli".to_string(), "strain K12".to_string())
        );
    }

    #[test]
    fn test_multi_line_organism() {
        let text = "ID   AA2AR_RAT   Reviewed;   410 AA.\n\
                    OS   Rattus\n\
                    OS   norvegicus (Rat).\n\
                    SQ   SEQUENCE   4 AA;\n\
                         MPIM\n\
                    //\n";
        let record = RecordParser::new().parse_str(text).unwrap();
        assert_eq!(record.species_latin_name, "Rattus norvegicus");
        assert_eq!(record.species_common_name, "Rat");
    }

    #[test]
    fn test_sequence_whitespace_is_removed() {
        let text = "ID   X_HUMAN   Reviewed;\n\
                    OS   Homo sapiens (Human).\n\
                    SQ   SEQUENCE   20 AA;  2000 MW;\n\
                         MGQPGNGSAF LLAPNRSHAP\n\
                         DHDV\n\
                    //\n\
                    ID   IGNORED_HUMAN   Reviewed;\n";
        let record = RecordParser::new().parse_str(text).unwrap();
        assert_eq!(record.sequence, "MGQPGNGSAFLLAPNRSHAPDHDV");
        assert_eq!(record.entry_name, "x_human");
        // declared length is informational only
        assert_eq!(record.declared_length, 20);
    }

    #[test]
    fn test_invalid_sequence_length_is_an_error() {
        let text = "ID   X_HUMAN   Reviewed;\nOS   Homo sapiens.\nSQ   SEQUENCE   many AA;\n//\n";
        let err = RecordParser::new().parse_str(text).unwrap_err();
        assert!(matches!(err, RecordError::Parse { line: 3, .. }));
    }

    #[test]
    fn test_missing_fields_are_incomplete() {
        let no_sq = "ID   X_HUMAN   Reviewed;\nOS   Homo sapiens.\n//\n";
        assert!(matches!(
            RecordParser::new().parse_str(no_sq),
            Err(RecordError::Incomplete("sequence"))
        ));

        let unknown_status = "ID   X_HUMAN   Draft;\nOS   Homo sapiens.\nSQ   SEQUENCE 1 AA;\nM\n//\n";
        assert!(matches!(
            RecordParser::new().parse_str(unknown_status),
            Err(RecordError::Incomplete("review status"))
        ));
    }

    #[test]
    fn test_parse_gzip() {
        use flate2::{write::GzEncoder, Compression};
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(MINIMAL.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let record = RecordParser::new().parse_gzip(&compressed).unwrap();
        assert_eq!(record.entry_name, "foo_human");
    }
}

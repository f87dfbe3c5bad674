//! Classification of taxonomy file lines

/// Spaces per indentation level
pub const INDENT_WIDTH: usize = 4;

/// Minimum number of `","`-separated fields on a protein line
pub const PROTEIN_LINE_FIELDS: usize = 32;

const PROTEIN_NAME_FIELD: usize = 4;

/// Human, mouse and rat accession columns, in import order
pub const ACCESSION_FIELDS: [usize; 3] = [15, 31, 23];

/// One line of the taxonomy file with its indentation depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyLine {
    pub depth: usize,
    pub kind: LineKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Family(FamilyLine),
    Protein(ProteinLine),
    /// Quoted line with too few fields
    MalformedProtein { fields: usize },
}

/// `name` or `name | scheme_slug`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyLine {
    pub name: String,
    pub scheme: Option<String>,
}

/// Quoted comma-separated receptor row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinLine {
    pub name: String,
    /// Candidates in [`ACCESSION_FIELDS`] order, possibly empty
    pub accessions: Vec<String>,
}

impl TaxonomyLine {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim_end_matches(['\r', '\n']);
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        let depth = indent / INDENT_WIDTH;
        let text = raw.trim();

        let kind = if text.is_empty() {
            LineKind::Blank
        } else if text.starts_with('"') {
            parse_protein(text)
        } else {
            LineKind::Family(parse_family(text))
        };

        Self { depth, kind }
    }
}

fn parse_family(text: &str) -> FamilyLine {
    let mut parts = text.split('|');
    let name = parts.next().unwrap_or_default().trim().to_string();
    let scheme = parts.next().map(|slug| slug.trim().to_string());
    FamilyLine { name, scheme }
}

fn parse_protein(text: &str) -> LineKind {
    let fields: Vec<&str> = text.split("\",\"").map(|f| f.trim_matches('"')).collect();
    if fields.len() < PROTEIN_LINE_FIELDS {
        return LineKind::MalformedProtein {
            fields: fields.len(),
        };
    }

    LineKind::Protein(ProteinLine {
        name: fields[PROTEIN_NAME_FIELD].to_string(),
        accessions: ACCESSION_FIELDS
            .iter()
            .map(|&i| fields[i].trim().to_string())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protein_row(indent: usize, name: &str, human: &str, mouse: &str, rat: &str) -> String {
        let mut fields = vec![String::new(); PROTEIN_LINE_FIELDS];
        fields[0] = "1".to_string();
        fields[PROTEIN_NAME_FIELD] = name.to_string();
        fields[15] = human.to_string();
        fields[31] = mouse.to_string();
        fields[23] = rat.to_string();
        format!("{}\"{}\"", " ".repeat(indent), fields.join("\",\""))
    }

    #[test]
    fn test_family_line_with_scheme() {
        let line = TaxonomyLine::parse("Class A (Rhodopsin) | gpcrdba");
        assert_eq!(line.depth, 0);
        assert_eq!(
            line.kind,
            LineKind::Family(FamilyLine {
                name: "Class A (Rhodopsin)".to_string(),
                scheme: Some("gpcrdba".to_string()),
            })
        );
    }

    #[test]
    fn test_family_line_depth() {
        let line = TaxonomyLine::parse("        Aminergic receptors\n");
        assert_eq!(line.depth, 2);
        assert!(matches!(line.kind, LineKind::Family(ref f) if f.scheme.is_none()));

        // partial indents round down
        assert_eq!(TaxonomyLine::parse("      Odd").depth, 1);
    }

    #[test]
    fn test_protein_line_accession_order() {
        let raw = protein_row(12, "β2-adrenoceptor", "P07550", "P18762", "P10608");
        let line = TaxonomyLine::parse(&raw);
        assert_eq!(line.depth, 3);
        assert_eq!(
            line.kind,
            LineKind::Protein(ProteinLine {
                name: "β2-adrenoceptor".to_string(),
                accessions: vec![
                    "P07550".to_string(),
                    "P10608".to_string(),
                    "P18762".to_string(),
                ],
            })
        );
    }

    #[test]
    fn test_first_field_quote_is_stripped() {
        let mut fields = vec!["x".to_string(); PROTEIN_LINE_FIELDS];
        fields[PROTEIN_NAME_FIELD] = "5-HT1A".to_string();
        let raw = format!("\"{}\"", fields.join("\",\""));
        let LineKind::Protein(protein) = TaxonomyLine::parse(&raw).kind else {
            panic!("expected protein line");
        };
        assert_eq!(protein.name, "5-HT1A");
    }

    #[test]
    fn test_short_protein_line_is_malformed() {
        let line = TaxonomyLine::parse("    \"1\",\"2\",\"3\"");
        assert_eq!(line.kind, LineKind::MalformedProtein { fields: 3 });
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(TaxonomyLine::parse("        ").kind, LineKind::Blank);
        assert_eq!(TaxonomyLine::parse("").kind, LineKind::Blank);
    }
}

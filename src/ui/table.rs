use tabled::{settings::Style, Table, Tabled};
use crate::concept::Concept;

#[derive(Tabled)]
pub struct ConceptRow {
    #[tabled(rename = "Concept")]
    pub name: String,
    #[tabled(rename = "Parents")]
    pub parents: String,
    #[tabled(rename = "Attributes")]
    pub attributes: usize,
    #[tabled(rename = "Links")]
    pub links: usize,
    #[tabled(rename = "Inbound")]
    pub rlinks: usize,
}

impl From<&Concept> for ConceptRow {
    fn from(concept: &Concept) -> Self {
        Self {
            name: concept.name.clone(),
            parents: concept.parents.join(", "),
            attributes: concept.all_attributes().len(),
            links: concept.links.len(),
            rlinks: concept.rlinks.len(),
        }
    }
}

pub fn concepts_table(concepts: &[Concept]) -> String {
    if concepts.is_empty() {
        return String::new();
    }

    let rows: Vec<ConceptRow> = concepts.iter().map(ConceptRow::from).collect();
    Table::new(&rows).with(Style::rounded()).to_string()
}

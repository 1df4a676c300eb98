pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{concept_details, dim, error, header, info, section, success, summary_row, warn};
pub use table::{concepts_table, ConceptRow};
pub use theme::{theme, Theme};

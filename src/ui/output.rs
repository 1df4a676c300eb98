use crate::concept::Concept;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::DATABASE, text.style(theme().header));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn));
}

pub fn info(label: &str, value: &str) {
    println!("{} {}: {}", Icons::INFO, label.style(theme().label), value);
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header));
}

pub fn dim(text: &str) -> String {
    text.style(theme().label).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label), value);
}

/// Print a loaded concept: parents, own and inherited attributes, links
pub fn concept_details(concept: &Concept) {
    let theme = theme();
    println!("{} {}", Icons::CONCEPT, concept.name.style(theme.concept));

    if !concept.parents.is_empty() {
        let parents: Vec<String> = concept
            .parents
            .iter()
            .map(|p| p.style(theme.concept).to_string())
            .collect();
        println!("  {} {}", Icons::PARENT, parents.join(", "));
    }

    section("Attributes");
    let all = concept.all_attributes();
    if all.is_empty() {
        println!("  {}", dim("(none)"));
    }
    for (name, attr) in &all {
        let own = concept.attributes.contains_key(name);
        let mut line = if own {
            name.style(theme.attribute).to_string()
        } else {
            name.style(theme.inherited).to_string()
        };
        line.push_str(&format!(" {}", attr.domain.base));
        if attr.required {
            line.push_str(" required");
        }
        if let Some(default) = &attr.default {
            line.push_str(&format!(" default {}", default));
        }
        if !own {
            line.push_str(&format!(" {}", "(inherited)".style(theme.inherited)));
        }
        println!("  {} {}", Icons::FIELD, line);
    }

    if !concept.links.is_empty() {
        section("Links");
        for link in concept.links.values() {
            println!(
                "  {} {} -> {} [{}]",
                Icons::LINK,
                link.link_type.style(theme.link),
                link.target.style(theme.concept),
                link.mapping.style(theme.mapping)
            );
        }
    }

    if !concept.rlinks.is_empty() {
        section("Inbound links");
        for link in concept.rlinks.values() {
            println!(
                "  {} {} <- {} [{}]",
                Icons::INBOUND,
                link.link_type.style(theme.link),
                link.source.style(theme.concept),
                link.mapping.style(theme.mapping)
            );
        }
    }
}

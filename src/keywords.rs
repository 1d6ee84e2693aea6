//! Search keywords derived from a product image.

const BASE_TAGS: [&str; 2] = ["product", "image"];

fn is_separator(c: char) -> bool {
    c == '_' || c == '-' || c.is_whitespace()
}

fn type_tags(type_key: &str) -> &'static [&'static str] {
    match type_key {
        "stair_treads" => &["stair", "treads"],
        "stair_risers" => &["stair", "risers"],
        "stair_nosing" => &["stair", "nosing"],
        "accessories" => &["accessories"],
        _ => &[],
    }
}

/// File stem of an image URL or path: last segment, query and extension removed.
fn file_stem(image: &str) -> &str {
    let no_query = image.split(['?', '#']).next().unwrap_or(image);
    let name = no_query.rsplit('/').next().unwrap_or(no_query);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

/// Keywords for an image: base tags, file-name words, product-name words, the type key and its
/// tags. Words of two characters or fewer are dropped; order is first appearance.
pub fn image_keywords(image: &str, product_name: Option<&str>, product_type: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |word: &str| {
        let word = word.to_lowercase();
        if !word.is_empty() && !out.contains(&word) {
            out.push(word);
        }
    };
    BASE_TAGS.iter().for_each(|t| push(t));
    file_stem(image)
        .split(is_separator)
        .filter(|w| w.chars().count() > 2)
        .for_each(&mut push);
    if let Some(name) = product_name {
        name.split_whitespace()
            .filter(|w| w.chars().count() > 2)
            .for_each(&mut push);
    }
    if let Some(t) = product_type.map(str::trim).filter(|t| !t.is_empty()) {
        push(t);
        type_tags(t).iter().for_each(|tag| push(tag));
    }
    out
}

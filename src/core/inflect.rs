// Deterministic naming rules turning a resource type name into wire paths and keys.
use heck::ToSnakeCase;

/// Collection path segment: `DNASequence` -> `dna-sequences`.
pub fn collection_path(type_name: &str) -> String {
    snake_plural(type_name).replace('_', "-")
}

/// Local list key in page responses: `DNASequence` -> `dna_sequences`.
pub fn snake_plural(type_name: &str) -> String {
    let snake = type_name.to_snake_case();
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", pluralize(last)),
        None => pluralize(&snake),
    }
}

/// Local key holding a list of identifiers: `DNASequence` -> `dna_sequence_ids`.
pub fn ids_key(type_name: &str) -> String {
    format!("{}_ids", type_name.to_snake_case())
}

pub fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.is_empty() && !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    if word.ends_with(['s', 'x', 'z']) || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{word}es");
    }
    format!("{word}s")
}

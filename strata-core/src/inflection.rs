/// Singular form of an English table name, enough for the `<singular>_id` foreign key
/// convention. Only the last `_` separated word is inflected: `blog_posts` gives `blog_post`.
pub fn singularize(value: &str) -> String {
    let (head, word) = match value.rfind('_') {
        Some(i) => value.split_at(i + 1),
        None => ("", value),
    };
    format!("{head}{}", singularize_word(word))
}

const IRREGULAR: [(&str, &str); 8] = [
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("data", "datum"),
    ("indices", "index"),
];

const UNCOUNTABLE: [&str; 6] = ["equipment", "information", "news", "series", "species", "status"];

fn singularize_word(word: &str) -> String {
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == word) {
        return (*singular).to_owned();
    }
    if UNCOUNTABLE.contains(&word) {
        return word.to_owned();
    }
    if word.ends_with("ies") && word.len() > 3 {
        return format!("{}y", &word[..word.len() - 3]);
    }
    for suffix in ["sses", "xes", "ches", "shes", "zzes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_owned();
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        return word[..word.len() - 1].to_owned();
    }
    word.to_owned()
}

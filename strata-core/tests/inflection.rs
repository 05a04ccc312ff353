#[cfg(test)]
mod tests {
    use strata_core::{foreign_key_column, singularize};

    #[test]
    fn regular_plurals() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("matches"), "match");
        assert_eq!(singularize("wishes"), "wish");
        assert_eq!(singularize("buzzes"), "buzz");
        assert_eq!(singularize("glass"), "glass");
        assert_eq!(singularize("tag"), "tag");
    }

    #[test]
    fn irregular_and_uncountable() {
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("men"), "man");
        assert_eq!(singularize("children"), "child");
        assert_eq!(singularize("mice"), "mouse");
        assert_eq!(singularize("geese"), "goose");
        assert_eq!(singularize("data"), "datum");
        assert_eq!(singularize("news"), "news");
        assert_eq!(singularize("series"), "series");
    }

    #[test]
    fn last_word_only() {
        assert_eq!(singularize("blog_posts"), "blog_post");
        assert_eq!(singularize("sales_people"), "sales_person");
        assert_eq!(singularize("order_categories"), "order_category");
    }

    #[test]
    fn foreign_keys() {
        assert_eq!(foreign_key_column("users"), "user_id");
        assert_eq!(foreign_key_column("posts"), "post_id");
        assert_eq!(foreign_key_column("people"), "person_id");
    }
}

#[cfg(test)]
mod tests {
    use strata_core::{AssociationKind, ModelRegistry, OrmError, association_statement_name};

    #[test]
    fn lookups() {
        let mut registry = ModelRegistry::new();
        registry
            .associate_table("User", "users")
            .associate_table("Post", "posts")
            .one_to_many("User", "posts", "Post")
            .many_to_one("Post", "author", "User");
        assert_eq!(registry.table("User").unwrap(), "users");
        assert_eq!(registry.entity_type("posts").unwrap(), "Post");
        let author = registry.association("Post", "author").unwrap();
        assert_eq!(author.kind, AssociationKind::ManyToOne);
        assert_eq!(author.target, "User");
        assert_eq!(registry.associations("User"), ["posts"]);
        let error = registry.association("User", "friends").unwrap_err();
        assert!(matches!(
            OrmError::of(&error),
            Some(OrmError::Configuration(..))
        ));
    }

    #[test]
    fn clashing_statement_names() {
        assert_eq!(
            association_statement_name("order_items", "tags"),
            association_statement_name("order", "items_tags")
        );
        let mut registry = ModelRegistry::new();
        registry
            .associate_table("OrderItem", "order_items")
            .associate_table("Order", "order")
            .associate_table("Tag", "tags")
            .associate_table("ItemTag", "items_tags")
            .many_to_many("OrderItem", "tags", "Tag")
            .one_to_many("Order", "items_tags", "ItemTag");
        for (owner, name) in [("OrderItem", "tags"), ("Order", "items_tags")] {
            let error = registry.association(owner, name).unwrap_err();
            assert!(
                matches!(OrmError::of(&error), Some(OrmError::Configuration(..))),
                "{owner}.{name} should be rejected"
            );
        }
    }

    #[test]
    fn shared_table_with_the_same_relationship() {
        let mut registry = ModelRegistry::new();
        registry
            .associate_table("User", "users")
            .associate_table("Admin", "users")
            .associate_table("Post", "posts")
            .one_to_many("User", "posts", "Post")
            .one_to_many("Admin", "posts", "Post");
        assert!(registry.association("User", "posts").is_ok());
        assert!(registry.association("Admin", "posts").is_ok());

        registry.many_to_many("Admin", "posts", "Post");
        assert!(registry.association("User", "posts").is_err());
    }
}

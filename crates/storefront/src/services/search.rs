//! Name search over users and products.

use crate::models::{Product, User};

/// Matches for one query.
#[derive(Debug, Default)]
pub struct SearchResults {
    /// Matching users, sorted by username.
    pub users: Vec<User>,
    /// Matching products, in catalogue order.
    pub products: Vec<Product>,
}

impl SearchResults {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.products.is_empty()
    }
}

/// Filter `users` and `products` down to those whose name contains `query`,
/// ignoring case.
///
/// The query is matched as given, surrounding spaces included. A blank
/// query matches nothing.
#[must_use]
pub fn search(query: &str, users: Vec<User>, products: Vec<Product>) -> SearchResults {
    if query.trim().is_empty() {
        return SearchResults::default();
    }
    let needle = query.to_lowercase();

    let mut users: Vec<User> = users
        .into_iter()
        .filter(|u| u.username.as_str().to_lowercase().contains(&needle))
        .collect();
    users.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()).then(a.id.cmp(&b.id)));

    let mut products: Vec<Product> = products
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect();
    products.sort_by_key(|p| p.id);

    SearchResults { users, products }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bazaar_core::{Cart, Email, Price, ProductId, UserId, Username};
    use chrono::Utc;

    use super::*;

    fn user(id: i64, name: &str) -> User {
        User {
            id: UserId::new(id),
            username: Username::parse(name).unwrap(),
            email: Email::parse(&format!("user{id}@example.com")).unwrap(),
            cart: Cart::new(),
            created_at: Utc::now(),
        }
    }

    fn product(id: i64, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            price: Price::parse("1").unwrap(),
            owner_id: UserId::new(1),
            photo: "x.png".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_matches_case_insensitively() {
        let results = search(
            "LAMP",
            vec![user(1, "lampwright"), user(2, "Bob")],
            vec![product(1, "Desk lamp"), product(2, "Chair"), product(3, "Lampshade")],
        );
        assert_eq!(results.users.len(), 1);
        let names: Vec<_> = results.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Desk lamp", "Lampshade"]);
    }

    #[test]
    fn test_users_sorted_by_username() {
        let results = search(
            "an",
            vec![user(1, "Zane"), user(2, "Anna"), user(3, "Dan")],
            Vec::new(),
        );
        let names: Vec<_> = results.users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["Anna", "Dan", "Zane"]);
    }

    #[test]
    fn test_unicode_lowercasing() {
        let results = search("ÉTÉ", Vec::new(), vec![product(1, "Robe d'été")]);
        assert_eq!(results.products.len(), 1);
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        let results = search("   ", vec![user(1, "Anna")], vec![product(1, "Anything")]);
        assert!(results.is_empty());
    }

    #[test]
    fn test_surrounding_spaces_are_part_of_the_query() {
        let products = vec![product(1, "Lamp"), product(2, "Desk lamp")];
        let results = search(" lamp", Vec::new(), products);
        let names: Vec<_> = results.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Desk lamp"]);
    }
}

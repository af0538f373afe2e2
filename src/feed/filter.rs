use crate::domain::Post;

/// Case-insensitive substring search over content, address, author and the
/// category label. An empty query keeps every post; order is preserved.
pub fn filter_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return posts.iter().collect();
    }
    posts.iter().filter(|post| matches(post, &needle)).collect()
}

/// `needle` must already be lowercased.
pub fn matches(post: &Post, needle: &str) -> bool {
    [
        post.content.as_str(),
        post.address.as_str(),
        post.author.as_str(),
        post.category.label(),
    ]
    .iter()
    .any(|haystack| haystack.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Category;
    use chrono::Utc;

    fn post(id: i64, author: &str, content: &str, address: &str, category: Category) -> Post {
        Post {
            id,
            author: author.into(),
            content: content.into(),
            address: address.into(),
            cep: String::new(),
            phone: String::new(),
            timestamp: String::new(),
            created_at: Utc::now(),
            category,
            urgent: category.is_urgent(),
            image: None,
        }
    }

    fn sample() -> Vec<Post> {
        vec![
            post(1, "Rita", "Flood waters rising on the avenue", "Rua A, 1 - Centro, Santos - SP", Category::Fire),
            post(2, "Bruno", "Árvore caída", "Rua B, 2 - Vila, Osasco - SP", Category::Storm),
            post(3, "Flood Response Team", "Barcos disponíveis", "Rua C, 3 - Sé, São Paulo - SP", Category::Help),
            post(4, "Lia", "Incêndio no mato", "Rua Floodgate, 4 - X, Y - SP", Category::Fire),
            post(5, "Nina", "Rua alagada", "Rua D, 5 - Z, W - SP", Category::Flood),
        ]
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let posts = sample();
        let ids: Vec<i64> = filter_posts(&posts, "").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_query_matches_content_author_and_address() {
        let posts = sample();
        let ids: Vec<i64> = filter_posts(&posts, "FLOOD").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_query_matches_category_label() {
        let posts = sample();
        let ids: Vec<i64> = filter_posts(&posts, "alagamento").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5]);

        let ids: Vec<i64> = filter_posts(&posts, "ajuda").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_accented_query_is_case_insensitive() {
        let posts = sample();
        let ids: Vec<i64> = filter_posts(&posts, "INCÊNDIO").iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_no_match() {
        let posts = sample();
        assert!(filter_posts(&posts, "terremoto").is_empty());
        assert_eq!(posts.len(), 5);
    }
}

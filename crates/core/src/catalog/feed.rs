//! Community feed derived from the posts embedded in product creators.

use std::collections::HashSet;

use super::{CommunityPost, Product};
use crate::types::PostId;

/// Collect the community feed from the creators of `products`.
///
/// Several products can share a creator, so the same post may be seen more
/// than once; the first occurrence wins. Posts without an author are
/// attributed to the creator they were found under. Hashtags are
/// normalized (see [`normalize_hashtags`]) and, when a post lists none,
/// extracted from its content. The result is newest first.
#[must_use]
pub fn community_feed(products: &[Product]) -> Vec<CommunityPost> {
    let mut seen: HashSet<PostId> = HashSet::new();
    let mut posts: Vec<CommunityPost> = Vec::new();

    for product in products {
        for post in &product.creator.posts {
            if !seen.insert(post.id.clone()) {
                continue;
            }

            let mut post = post.clone();
            if post.author.id.is_empty() {
                post.author = product.creator.summary();
            }
            post.hashtags = if post.hashtags.is_empty() {
                extract_hashtags(&post.content)
            } else {
                normalize_hashtags(&post.hashtags)
            };
            posts.push(post);
        }
    }

    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    posts
}

/// Strip leading `#`, lowercase, drop blanks and duplicates (order kept).
#[must_use]
pub fn normalize_hashtags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.trim().trim_start_matches('#').to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Pull `#tags` out of free text.
#[must_use]
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let tags: Vec<String> = content
        .split_whitespace()
        .filter_map(|word| word.strip_prefix('#'))
        .map(|tag| {
            tag.chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect::<String>()
        })
        .collect();
    normalize_hashtags(&tags)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::super::User;
    use super::super::fixtures::product;
    use super::*;
    use crate::types::UserId;

    fn post(id: &str, day: u32, tags: &[&str]) -> CommunityPost {
        CommunityPost {
            id: PostId::new(id),
            author: User::default(),
            content: format!("post {id} #Robotics #opensource"),
            images: Vec::new(),
            product: None,
            hashtags: tags.iter().map(ToString::to_string).collect(),
            timestamp: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
            likes: 0,
            replies: 0,
        }
    }

    #[test]
    fn test_feed_dedupes_and_sorts_newest_first() {
        let mut a = product("a", 1, &[]);
        a.creator.posts = vec![post("p1", 3, &["robotics"]), post("p2", 10, &[])];
        let mut b = product("b", 1, &[]);
        // Same creator listed twice: p1 shows up again.
        b.creator.posts = vec![post("p1", 3, &["robotics"]), post("p3", 5, &[])];

        let feed = community_feed(&[a, b]);
        let ids: Vec<&str> = feed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p3", "p1"]);
    }

    #[test]
    fn test_feed_attributes_missing_author_to_creator() {
        let mut a = product("a", 1, &[]);
        a.creator.posts = vec![post("p1", 1, &[])];
        let mut authored = post("p2", 2, &[]);
        authored.author = User {
            id: UserId::new("guest"),
            ..User::default()
        };
        a.creator.posts.push(authored);

        let feed = community_feed(&[a]);
        let p1 = feed.iter().find(|p| p.id.as_str() == "p1").unwrap();
        assert_eq!(p1.author.id.as_str(), "maker-a");
        assert!(p1.author.posts.is_empty());
        let p2 = feed.iter().find(|p| p.id.as_str() == "p2").unwrap();
        assert_eq!(p2.author.id.as_str(), "guest");
    }

    #[test]
    fn test_hashtags_normalized_or_extracted() {
        let mut a = product("a", 1, &[]);
        a.creator.posts = vec![
            post("listed", 1, &["#AI", "ai", " stickerbox "]),
            post("extracted", 2, &[]),
        ];
        let feed = community_feed(&[a]);
        let listed = feed.iter().find(|p| p.id.as_str() == "listed").unwrap();
        assert_eq!(listed.hashtags, vec!["ai", "stickerbox"]);
        let extracted = feed.iter().find(|p| p.id.as_str() == "extracted").unwrap();
        assert_eq!(extracted.hashtags, vec!["robotics", "opensource"]);
    }

    #[test]
    fn test_extract_hashtags_stops_at_punctuation() {
        assert_eq!(
            extract_hashtags("Purring! 😺 #robotics, #cat."),
            vec!["robotics", "cat"]
        );
        assert!(extract_hashtags("no tags here").is_empty());
    }
}

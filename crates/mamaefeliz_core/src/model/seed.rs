//! Example posts materialized the first time a store meets empty state.

use crate::model::post::{Comment, Post, PostCategory};
use chrono::{DateTime, Duration, Utc};

const DAY_MS: i64 = 86_400_000;
const HOUR_MS: i64 = 3_600_000;

/// Builds the fixed seed set with timestamps relative to `now`.
///
/// Ids are fixed so repeated seeding of empty environments yields the same
/// identities.
pub fn seed_posts(now: DateTime<Utc>) -> Vec<Post> {
    vec![
        Post {
            id: "1".to_string(),
            title: "Dica infalível para cólicas!".to_string(),
            content: "Meninas, descobri que fazer compressa morna com sementes de cereja ajuda muito! Alguém mais já testou?".to_string(),
            category: PostCategory::Health,
            author: "Mamãe da Sofia".to_string(),
            timestamp: now - Duration::milliseconds(DAY_MS * 2),
            likes: 12,
            comments: vec![Comment {
                id: "c1".to_string(),
                author: "Mamãe do Pedro".to_string(),
                text: "Aqui em casa funcionou super bem também!".to_string(),
                timestamp: now - Duration::milliseconds(86_000_000 * 2),
                is_expert: false,
            }],
            is_reported: false,
        },
        Post {
            id: "2".to_string(),
            title: "Regressão do sono aos 4 meses".to_string(),
            content: "Socorro! Meu bebê dormia a noite toda e agora acorda de hora em hora. É normal? Quanto tempo dura?".to_string(),
            category: PostCategory::Sleep,
            author: "Ana Luiza".to_string(),
            timestamp: now - Duration::milliseconds(HOUR_MS),
            likes: 5,
            comments: Vec::new(),
            is_reported: false,
        },
        Post {
            id: "3".to_string(),
            title: "Ideias para lancheira escolar (2 anos)".to_string(),
            content: "Preciso de ideias saudáveis e práticas para mandar na escola. Ele não gosta muito de frutas inteiras.".to_string(),
            category: PostCategory::Food,
            author: "Carla M.".to_string(),
            timestamp: now - Duration::milliseconds(172_800_000),
            likes: 24,
            comments: Vec::new(),
            is_reported: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::seed_posts;
    use chrono::Utc;

    #[test]
    fn seed_has_three_posts_and_one_comment() {
        let posts = seed_posts(Utc::now());
        assert_eq!(posts.len(), 3);
        let comments: usize = posts.iter().map(|post| post.comments.len()).sum();
        assert_eq!(comments, 1);
        assert!(posts.iter().all(|post| post.is_visible()));
    }
}

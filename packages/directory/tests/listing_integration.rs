//! Post listings must give the same answer whether or not the backing store
//! has the composite indexes for filtered, ordered queries.

use chrono::{Duration, Utc};
use directory::{list_posts, ContentPost, MemoryStore, PostQuery, PostStore};

async fn seeded(store: MemoryStore) -> MemoryStore {
    let now = Utc::now();
    let posts = [
        ContentPost::new("Morning light", "article")
            .with_category("wellbeing")
            .with_created_at(now - Duration::hours(3)),
        ContentPost::new("Breathe", "audio")
            .with_category("wellbeing")
            .with_created_at(now - Duration::hours(2)),
        ContentPost::new("Slow walks", "article")
            .with_category("wellbeing")
            .with_created_at(now - Duration::hours(1)),
        ContentPost::new("Local cafes", "article")
            .with_category("places")
            .with_created_at(now),
    ];
    for post in &posts {
        store.insert_post(post).await.unwrap();
    }
    store
}

fn titles(posts: &[ContentPost]) -> Vec<&str> {
    posts.iter().map(|p| p.title.as_str()).collect()
}

#[tokio::test]
async fn test_filtered_listing_same_with_and_without_indexes() {
    let indexed = seeded(MemoryStore::new()).await;
    let unindexed = seeded(MemoryStore::without_composite_indexes()).await;

    let query = PostQuery::of_type("article").in_category("wellbeing");

    let a = list_posts(&indexed, &query).await;
    let b = list_posts(&unindexed, &query).await;

    assert_eq!(titles(&a), vec!["Slow walks", "Morning light"]);
    assert_eq!(titles(&a), titles(&b));
}

#[tokio::test]
async fn test_limit_applies_after_ordering_without_indexes() {
    let store = seeded(MemoryStore::without_composite_indexes()).await;

    let posts = list_posts(&store, &PostQuery::of_type("article").limit(2)).await;
    assert_eq!(titles(&posts), vec!["Local cafes", "Slow walks"]);
}

#[tokio::test]
async fn test_unfiltered_listing_newest_first() {
    let store = seeded(MemoryStore::without_composite_indexes()).await;

    let posts = list_posts(&store, &PostQuery::default()).await;
    assert_eq!(posts.len(), 4);
    assert_eq!(posts[0].title, "Local cafes");
    assert_eq!(posts[3].title, "Morning light");
}

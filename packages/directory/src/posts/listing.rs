//! Post listings with client-side fallback.

use tracing::debug;

use crate::error::StoreError;
use crate::fallback::{or_empty, with_fallback};
use crate::posts::models::{ContentPost, PostQuery};
use crate::traits::store::PostStore;

/// Posts matching `query`, newest first.
///
/// Falls back to a full fetch plus client-side filtering when the store
/// lacks the composite index for the query, and to an empty list when both
/// paths fail.
pub async fn list_posts<S: PostStore + ?Sized>(store: &S, query: &PostQuery) -> Vec<ContentPost> {
    let result = with_fallback("list_posts", store.query_posts(query), move || async move {
        let posts = store.all_posts().await?;
        Ok::<_, StoreError>(query.apply(posts))
    })
    .await;

    let posts = or_empty("list_posts", result);
    debug!(
        post_type = ?query.post_type,
        category = ?query.category,
        count = posts.len(),
        "Posts listed"
    );
    posts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::FaultyStore;
    use chrono::{Duration, Utc};

    async fn seeded(store: &MemoryStore) {
        let now = Utc::now();
        for (title, post_type, category, age) in [
            ("Morning calm", "audio", Some("sleep"), 3),
            ("Gratitude", "article", Some("mindset"), 2),
            ("Body scan", "audio", Some("sleep"), 1),
            ("Stretching", "video", None, 0),
        ] {
            let mut post = ContentPost::new(title, post_type).with_created_at(now - Duration::hours(age));
            if let Some(category) = category {
                post = post.with_category(category);
            }
            store.insert_post(&post).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_indexed_and_fallback_agree() {
        let indexed = MemoryStore::new();
        let unindexed = MemoryStore::without_composite_indexes();
        seeded(&indexed).await;
        seeded(&unindexed).await;

        let query = PostQuery::of_type("audio").in_category("sleep");
        let a: Vec<_> = list_posts(&indexed, &query).await.into_iter().map(|p| p.title).collect();
        let b: Vec<_> = list_posts(&unindexed, &query).await.into_iter().map(|p| p.title).collect();

        assert_eq!(a, vec!["Body scan", "Morning calm"]);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_total_failure_is_empty() {
        let store = FaultyStore::new(MemoryStore::new());
        seeded(store.inner()).await;
        store.fail_queries(true);

        assert!(list_posts(&store, &PostQuery::default()).await.is_empty());
    }
}

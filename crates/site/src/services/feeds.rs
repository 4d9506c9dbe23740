//! One-shot feed fetches for each view.
//!
//! A failed fetch becomes [`FeedState::Unavailable`], which the templates
//! render as a persistent "Loading ..." line. The failure is logged and
//! nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use forever_core::feed::{self, RECENT_STORY_LIMIT};
use forever_core::{FeedState, Gallery, Photo, RecentStories, Story, Tribute};
use moka::future::Cache;
use tracing::instrument;

use crate::firebase::{ContentStore, Document, fetch_all};

/// How long the slideshow reuses a photo listing.
pub const SLIDESHOW_TTL: Duration = Duration::from_secs(30);

async fn fetch<D, S>(store: &S) -> FeedState<Vec<D>>
where
    D: Document,
    S: ContentStore,
{
    let result = fetch_all::<D, S>(store).await;
    if let Err(e) = &result {
        tracing::error!(collection = %D::COLLECTION, error = %e, "Feed fetch failed");
    }
    FeedState::from_fetch(result)
}

/// Tributes, pinned first then newest first.
#[instrument(skip_all)]
pub async fn tribute_feed<S: ContentStore>(store: &S) -> FeedState<Vec<Tribute>> {
    fetch::<Tribute, S>(store).await.map(|mut tributes| {
        feed::sort_tributes(&mut tributes);
        tributes
    })
}

/// Stories in store order.
#[instrument(skip_all)]
pub async fn story_feed<S: ContentStore>(store: &S) -> FeedState<Vec<Story>> {
    fetch::<Story, S>(store).await
}

/// Stories for the Stories view: store order, with the story this visitor
/// just published in front.
#[instrument(skip_all, fields(published = published.is_some()))]
pub async fn stories_view<S: ContentStore>(
    store: &S,
    published: Option<Story>,
) -> FeedState<Vec<Story>> {
    let mut stories = story_feed(store).await;
    if let (Some(list), Some(story)) = (stories.ready_mut(), published) {
        feed::prepend_story(list, story);
    }
    stories
}

/// The newest stories and the total count, for the About view.
#[instrument(skip_all)]
pub async fn recent_stories<S: ContentStore>(store: &S) -> FeedState<RecentStories> {
    fetch::<Story, S>(store)
        .await
        .map(|stories| RecentStories::compose(stories, RECENT_STORY_LIMIT))
}

/// Gallery photos in store order.
#[instrument(skip_all)]
pub async fn photo_feed<S: ContentStore>(store: &S) -> FeedState<Vec<Photo>> {
    fetch::<Photo, S>(store).await
}

/// The gallery, with the photo this visitor just uploaded in front.
#[instrument(skip_all, fields(uploaded = uploaded.is_some()))]
pub async fn gallery_view<S: ContentStore>(
    store: &S,
    uploaded: Option<Photo>,
) -> FeedState<Gallery> {
    photo_feed(store).await.map(|photos| {
        let mut gallery = Gallery::new(photos);
        if let Some(photo) = uploaded {
            gallery.prepend(photo);
        }
        gallery
    })
}

/// Everything the About view fetches, requested concurrently.
#[derive(Debug)]
pub struct AboutFeeds {
    pub tributes: FeedState<Vec<Tribute>>,
    pub photos: FeedState<Vec<Photo>>,
    pub recent: FeedState<RecentStories>,
}

impl AboutFeeds {
    /// Fetch the About feeds. `published` is a tribute this visitor just
    /// wrote; it is placed in display order even if the listing missed it.
    pub async fn load<S: ContentStore>(store: &S, published: Option<Tribute>) -> Self {
        let (mut tributes, photos, recent) =
            tokio::join!(tribute_feed(store), photo_feed(store), recent_stories(store));
        if let (Some(list), Some(tribute)) = (tributes.ready_mut(), published) {
            feed::prepend_tribute(list, tribute);
        }
        Self {
            tributes,
            photos,
            recent,
        }
    }
}

/// Short-lived photo listing shared by slideshow frames.
///
/// Every open page polls a new frame each interval; this keeps those polls
/// from listing the collection every time. Failed listings are not cached.
#[derive(Clone)]
pub struct SlideshowPhotos {
    cache: Cache<(), Arc<Vec<Photo>>>,
}

impl Default for SlideshowPhotos {
    fn default() -> Self {
        Self::new(SLIDESHOW_TTL)
    }
}

impl SlideshowPhotos {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Current photos, from cache when fresh.
    pub async fn get<S: ContentStore>(&self, store: &S) -> FeedState<Arc<Vec<Photo>>> {
        if let Some(photos) = self.cache.get(&()).await {
            return FeedState::Ready(photos);
        }

        match photo_feed(store).await {
            FeedState::Ready(photos) => {
                let photos = Arc::new(photos);
                self.cache.insert((), Arc::clone(&photos)).await;
                FeedState::Ready(photos)
            }
            FeedState::Unavailable => FeedState::Unavailable,
        }
    }

    /// Forget the listing after the gallery changed.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use forever_core::DocumentId;

    use super::*;
    use crate::firebase::Collection;
    use crate::firebase::memory::{DocumentOp, MemoryContentStore};
    use crate::firebase::values::{boolean, fields, string};

    fn tribute(store: &MemoryContentStore, id: &str, name: &str, date: &str, pin: bool) {
        store.insert(
            Collection::Tributes,
            id,
            fields([
                ("name", string(name)),
                ("tribute", string("In loving memory")),
                ("date", string(date)),
                ("icon", string("candle")),
                ("pin", boolean(pin)),
            ]),
        );
    }

    fn story(store: &MemoryContentStore, id: &str, date: &str) {
        store.insert(
            Collection::Testimonials,
            id,
            fields([
                ("name", string(id)),
                ("story", string("A memory")),
                ("date", string(date)),
            ]),
        );
    }

    #[tokio::test]
    async fn test_tribute_feed_sorted() {
        let store = MemoryContentStore::new();
        tribute(&store, "a", "Old", "2024-06-01T10:00:00.000Z", false);
        tribute(&store, "b", "Pinned", "2024-05-01T10:00:00.000Z", true);
        tribute(&store, "c", "New", "2024-06-18T10:00:00.000Z", false);

        let feed = tribute_feed(&store).await;
        let names: Vec<_> = feed.ready().unwrap().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Pinned", "New", "Old"]);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_unavailable_not_empty() {
        let store = MemoryContentStore::new();
        assert_eq!(story_feed(&store).await.ready().map(Vec::len), Some(0));

        store.fail(Collection::Testimonials, DocumentOp::List);
        assert!(story_feed(&store).await.is_unavailable());
        assert!(recent_stories(&store).await.is_unavailable());
    }

    #[tokio::test]
    async fn test_story_feed_keeps_store_order() {
        let store = MemoryContentStore::new();
        story(&store, "first", "2024-01-01T00:00:00.000Z");
        story(&store, "second", "2024-06-01T00:00:00.000Z");

        let feed = story_feed(&store).await;
        assert_eq!(feed.ready().unwrap()[0].name, "first");
    }

    #[tokio::test]
    async fn test_recent_stories_slice_and_total() {
        let store = MemoryContentStore::new();
        for (i, day) in ["01", "05", "03", "04", "02"].iter().enumerate() {
            story(&store, &format!("s{i}"), &format!("2024-06-{day}T00:00:00.000Z"));
        }

        let about = AboutFeeds::load(&store, None).await;
        let recent = about.recent.ready().unwrap();
        assert_eq!(recent.total, 5);
        let names: Vec<_> = recent.items.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["s1", "s3", "s2"]);
    }

    #[tokio::test]
    async fn test_stories_view_puts_published_story_first() {
        let store = MemoryContentStore::new();
        story(&store, "Paul", "2024-06-17T09:00:00.000Z");
        let jane = Story {
            name: "Jane".to_string(),
            story: "A memory".to_string(),
            date: "2024-06-18T12:00:00.000Z".to_string(),
        };
        story(&store, "Jane", &jane.date);

        let view = stories_view(&store, Some(jane)).await;
        let names: Vec<_> = view.ready().unwrap().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Jane", "Paul"]);

        let later = stories_view(&store, None).await;
        assert_eq!(later.ready().unwrap()[0].name, "Paul");
    }

    #[tokio::test]
    async fn test_gallery_view_puts_upload_first_once() {
        let store = MemoryContentStore::new();
        for id in ["old", "new"] {
            store.insert(
                Collection::Images,
                id,
                fields([("imageUrl", string(format!("https://example.test/{id}.jpg")))]),
            );
        }
        let uploaded = photo_feed(&store).await.ready().unwrap()[1].clone();

        let view = gallery_view(&store, Some(uploaded)).await;
        let ids: Vec<_> = view
            .ready()
            .unwrap()
            .photos()
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[tokio::test]
    async fn test_slideshow_cache_survives_store_failure() {
        let store = MemoryContentStore::new();
        store.insert(
            Collection::Images,
            "img1",
            fields([("imageUrl", string("https://example.test/a.jpg"))]),
        );
        let photos = SlideshowPhotos::default();

        let first = photos.get(&store).await;
        assert_eq!(first.ready().unwrap()[0].id, DocumentId::new("img1"));

        store.fail(Collection::Images, DocumentOp::List);
        assert!(!photos.get(&store).await.is_unavailable());

        photos.invalidate().await;
        assert!(photos.get(&store).await.is_unavailable());
    }
}

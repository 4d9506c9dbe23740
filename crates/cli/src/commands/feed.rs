//! Print the feeds as the site shows them.
//!
//! Reads run anonymously, like a signed-out visitor's page load.

#![allow(clippy::print_stdout)]

use forever_core::FeedState;
use forever_core::preview::Preview;
use forever_site::firebase::FirestoreClient;
use forever_site::services::feeds::{photo_feed, story_feed, tribute_feed};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

fn store() -> Result<FirestoreClient, Box<dyn std::error::Error>> {
    let (client, config) = super::firebase()?;
    Ok(FirestoreClient::new(client, &config))
}

fn ready<T>(feed: &FeedState<T>) -> Result<&T, Box<dyn std::error::Error>> {
    feed.ready()
        .ok_or_else(|| "Feed unavailable; the fetch error was logged".into())
}

/// Print tributes, pinned first then newest first.
///
/// # Errors
///
/// Returns an error if configuration is missing or the fetch fails.
pub async fn tributes() -> CommandResult {
    let feed = tribute_feed(&store()?).await;
    for tribute in ready(&feed)? {
        let pin = if tribute.pin { "[pinned] " } else { "" };
        let icon = tribute.icon.map_or("", |icon| icon.as_str());
        println!(
            "{pin}{} ({}) {icon}\n  {}",
            tribute.name,
            tribute.date,
            Preview::of(&tribute.tribute).display(false)
        );
    }
    Ok(())
}

/// Print stories in store order.
///
/// # Errors
///
/// Returns an error if configuration is missing or the fetch fails.
pub async fn stories() -> CommandResult {
    let feed = story_feed(&store()?).await;
    for story in ready(&feed)? {
        println!(
            "{} ({})\n  {}",
            story.name,
            story.date,
            Preview::of(&story.story).display(false)
        );
    }
    Ok(())
}

/// Print gallery photos in store order.
///
/// # Errors
///
/// Returns an error if configuration is missing or the fetch fails.
pub async fn photos() -> CommandResult {
    let feed = photo_feed(&store()?).await;
    let photos = ready(&feed)?;
    for photo in photos {
        println!(
            "{}  {}  {}",
            photo.id,
            photo.image_url,
            photo.description.as_deref().unwrap_or_default()
        );
    }
    println!("{} photos", photos.len());
    Ok(())
}

//! Markdown content for the memorial pages.
//!
//! The biography, the About introduction and the "Recent updates" sidebar are
//! edited as markdown files with YAML frontmatter and loaded once at startup.
//!
//! ```text
//! content/
//! ├── about.md    - heading, facts, dedication
//! ├── life.md     - biography; `<!-- more -->` ends the collapsed part
//! └── updates.md  - sidebar entries (frontmatter only)
//! ```

use std::path::Path;
use std::sync::Arc;

use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;

/// Marker separating the collapsed biography from the rest.
pub const MORE_MARKER: &str = "<!-- more -->";

/// Frontmatter of `about.md`.
#[derive(Debug, Clone, Deserialize)]
pub struct AboutMeta {
    pub heading: String,
    #[serde(default)]
    pub facts: Vec<String>,
}

/// The About view's introduction.
#[derive(Debug, Clone)]
pub struct AboutIntro {
    pub meta: AboutMeta,
    pub content_html: String,
}

/// Frontmatter of `life.md`.
#[derive(Debug, Clone, Deserialize)]
pub struct LifeMeta {
    pub title: String,
    #[serde(default)]
    pub byline: Option<String>,
}

/// The biography, rendered whole and up to the more marker.
#[derive(Debug, Clone)]
pub struct LifeStory {
    pub meta: LifeMeta,
    pub summary_html: String,
    pub content_html: String,
}

impl LifeStory {
    /// Whether the collapsed rendition hides anything.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.summary_html != self.content_html
    }
}

/// One line of the "Recent updates" sidebar.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Display date, e.g. "June 18".
    pub date: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct UpdatesMeta {
    #[serde(default)]
    updates: Vec<Update>,
}

/// Content held in memory for the life of the process.
#[derive(Debug, Clone)]
pub struct SiteContent {
    about: Arc<AboutIntro>,
    life: Arc<LifeStory>,
    updates: Arc<Vec<Update>>,
}

impl SiteContent {
    /// Load all content from the filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is missing or its frontmatter is invalid.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let about = load_about(&read(&content_dir.join("about.md"))?)?;
        let life = load_life(&read(&content_dir.join("life.md"))?)?;
        let updates = load_updates(&read(&content_dir.join("updates.md"))?)?;

        tracing::info!(updates = updates.len(), "Loaded site content");

        Ok(Self {
            about: Arc::new(about),
            life: Arc::new(life),
            updates: Arc::new(updates),
        })
    }

    /// Build content from already-parsed parts.
    #[must_use]
    pub fn new(about: AboutIntro, life: LifeStory, updates: Vec<Update>) -> Self {
        Self {
            about: Arc::new(about),
            life: Arc::new(life),
            updates: Arc::new(updates),
        }
    }

    #[must_use]
    pub fn about(&self) -> &AboutIntro {
        &self.about
    }

    #[must_use]
    pub fn life(&self) -> &LifeStory {
        &self.life
    }

    #[must_use]
    pub fn updates(&self) -> &[Update] {
        &self.updates
    }
}

fn read(path: &Path) -> Result<String, ContentError> {
    std::fs::read_to_string(path).map_err(|e| ContentError::Io(format!("{}: {e}", path.display())))
}

fn parse<T: serde::de::DeserializeOwned>(raw: &str) -> Result<ParsedEntity<T>, ContentError> {
    let matter = Matter::<YAML>::new();
    matter
        .parse(raw)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))
}

/// Parse `about.md`.
///
/// # Errors
///
/// Returns an error if the frontmatter is missing or invalid.
pub fn load_about(raw: &str) -> Result<AboutIntro, ContentError> {
    let parsed: ParsedEntity<AboutMeta> = parse(raw)?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(AboutIntro {
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Parse `life.md`.
///
/// # Errors
///
/// Returns an error if the frontmatter is missing or invalid.
pub fn load_life(raw: &str) -> Result<LifeStory, ContentError> {
    let parsed: ParsedEntity<LifeMeta> = parse(raw)?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    let body = parsed.content;
    let summary = body.split(MORE_MARKER).next().unwrap_or_default();
    let full = body.replace(MORE_MARKER, "");

    Ok(LifeStory {
        meta,
        summary_html: render_markdown(summary),
        content_html: render_markdown(&full),
    })
}

/// Parse `updates.md`. A file without frontmatter means no updates.
///
/// # Errors
///
/// Returns an error if the frontmatter is invalid.
pub fn load_updates(raw: &str) -> Result<Vec<Update>, ContentError> {
    let parsed: ParsedEntity<UpdatesMeta> = parse(raw)?;
    Ok(parsed.data.map(|meta| meta.updates).unwrap_or_default())
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;

    // Content is trusted (checked into the repo) and uses raw HTML sparingly
    options.render.r#unsafe = true;

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_life_summary_stops_at_marker() {
        let life = load_life(
            "---\ntitle: Her Life\nbyline: June 17\n---\n### Early years\n\nBorn in Dschang.\n\n<!-- more -->\n\n### Family\n\nMother of many.\n",
        )
        .unwrap();

        assert_eq!(life.meta.title, "Her Life");
        assert!(life.summary_html.contains("Early years"));
        assert!(!life.summary_html.contains("Family"));
        assert!(life.content_html.contains("Family"));
        assert!(life.has_more());
    }

    #[test]
    fn test_life_without_marker_has_nothing_more() {
        let life = load_life("---\ntitle: Her Life\n---\nShort.\n").unwrap();
        assert!(!life.has_more());
        assert!(life.meta.byline.is_none());
    }

    #[test]
    fn test_about_requires_frontmatter() {
        assert!(load_about("No frontmatter here.").is_err());

        let about = load_about("---\nheading: Remember\nfacts:\n  - 76 years old\n---\nDedication.").unwrap();
        assert_eq!(about.meta.facts, vec!["76 years old".to_string()]);
        assert!(about.content_html.contains("<p>Dedication.</p>"));
    }

    #[test]
    fn test_updates_list() {
        let updates = load_updates(
            "---\nupdates:\n  - date: June 18\n    text: JANE EPITCHOP shared a story.\n---\n",
        )
        .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].date, "June 18");
        assert!(load_updates("").unwrap().is_empty());
    }
}

//! The markdown content shipped with the site.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use forever_site::content::SiteContent;

fn content() -> SiteContent {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../site/content");
    SiteContent::load(&dir).unwrap()
}

#[test]
fn test_shipped_content_loads() {
    let content = content();

    assert_eq!(
        content.about().meta.heading,
        "Let the memory of FELICITE be with us forever."
    );
    assert_eq!(content.about().meta.facts.len(), 3);
    assert_eq!(content.life().meta.title, "Mme Nguetemo née MANGO Félicité");
    assert_eq!(content.updates().len(), 5);
}

#[test]
fn test_biography_collapses() {
    let life = content().life().clone();

    assert!(life.has_more());
    assert!(life.summary_html.contains("VIE ASSOCIATIVE"));
    assert!(!life.summary_html.contains("VIE FAMILIALE"));
    assert!(life.content_html.contains("VIE FAMILIALE"));
}

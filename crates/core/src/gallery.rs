//! Gallery feed with its single selected photo.

use crate::records::Photo;
use crate::types::DocumentId;

/// Photos in store order plus the photo an admin has selected, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    photos: Vec<Photo>,
    selected: Option<DocumentId>,
}

impl Gallery {
    #[must_use]
    pub const fn new(photos: Vec<Photo>) -> Self {
        Self {
            photos,
            selected: None,
        }
    }

    #[must_use]
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Select a photo by id. Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<&DocumentId>) {
        self.selected = id.filter(|id| self.photos.iter().any(|p| &p.id == *id)).cloned();
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Photo> {
        let id = self.selected.as_ref()?;
        self.photos.iter().find(|p| &p.id == id)
    }

    #[must_use]
    pub fn is_selected(&self, id: &DocumentId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Put a just-written photo at the front.
    ///
    /// A listing that already returned the photo keeps one copy, first.
    pub fn prepend(&mut self, photo: Photo) {
        self.photos.retain(|p| p.id != photo.id);
        self.photos.insert(0, photo);
    }

    /// Drop the selected photo and clear the selection.
    ///
    /// Returns the removed photo, or `None` when nothing was selected.
    pub fn remove_selected(&mut self) -> Option<Photo> {
        let id = self.selected.take()?;
        let position = self.photos.iter().position(|p| p.id == id)?;
        Some(self.photos.remove(position))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn photo(id: &str) -> Photo {
        Photo {
            id: DocumentId::new(id),
            image_url: format!("https://cdn.example/images/{id}.jpg"),
            description: None,
        }
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let mut gallery = Gallery::new(vec![photo("a"), photo("b"), photo("c")]);
        gallery.select(Some(&DocumentId::new("b")));
        assert_eq!(gallery.selected().unwrap().id.as_str(), "b");

        let removed = gallery.remove_selected().unwrap();
        assert_eq!(removed.id.as_str(), "b");
        assert!(gallery.selected().is_none());
        let ids: Vec<_> = gallery.photos().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_remove_without_selection_is_noop() {
        let mut gallery = Gallery::new(vec![photo("a")]);
        assert!(gallery.remove_selected().is_none());
        assert_eq!(gallery.photos().len(), 1);
    }

    #[test]
    fn test_selecting_unknown_photo_clears() {
        let mut gallery = Gallery::new(vec![photo("a")]);
        gallery.select(Some(&DocumentId::new("a")));
        gallery.select(Some(&DocumentId::new("zzz")));
        assert!(gallery.selected().is_none());
        assert!(!gallery.is_selected(&DocumentId::new("a")));
    }

    #[test]
    fn test_prepend() {
        let mut gallery = Gallery::new(vec![photo("a")]);
        gallery.prepend(photo("new"));
        assert_eq!(gallery.photos()[0].id.as_str(), "new");

        gallery.prepend(photo("a"));
        let ids: Vec<_> = gallery.photos().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "new"]);
    }
}

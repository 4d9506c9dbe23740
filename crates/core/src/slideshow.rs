//! Slideshow index state.
//!
//! The browser drives the timer; this type defines what a tick means so the
//! server can answer `GET /slideshow/{index}` with the next frame. Every
//! frame carries [`SLIDE_INTERVAL`] for the page script to wait on.

use std::time::Duration;

/// Time between two slides.
pub const SLIDE_INTERVAL: Duration = Duration::from_millis(3000);

/// [`SLIDE_INTERVAL`] in whole milliseconds, as rendered for the page script.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn interval_ms() -> u64 {
    SLIDE_INTERVAL.as_millis() as u64
}

/// Current position of a slideshow over `count` photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slideshow {
    index: usize,
    count: usize,
}

impl Slideshow {
    /// Resume at `index`, folded into range.
    ///
    /// A frame requested after the photo count changed lands back in range,
    /// and an empty slideshow stays at 0.
    #[must_use]
    pub const fn at(index: usize, count: usize) -> Self {
        Self {
            index: if count == 0 { 0 } else { index % count },
            count,
        }
    }

    /// Current index, always in `[0, count)` or 0 when empty.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Advance by exactly one slide.
    pub const fn tick(&mut self) {
        self.index = if self.count == 0 {
            0
        } else {
            (self.index + 1) % self.count
        };
    }

    /// The photo at the current index, if there is one.
    #[must_use]
    pub fn current<'a, T>(&self, photos: &'a [T]) -> Option<&'a T> {
        photos.get(self.index)
    }

    /// Index that the next tick will show.
    #[must_use]
    pub const fn next_index(&self) -> usize {
        let mut next = *self;
        next.tick();
        next.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_is_three_seconds() {
        assert_eq!(interval_ms(), 3000);
    }

    #[test]
    fn test_each_tick_moves_one_slide_in_range() {
        for count in 1..6 {
            let mut show = Slideshow::at(0, count);
            for step in 1..20 {
                show.tick();
                assert!(show.index() < count);
                assert_eq!(show.index(), step % count);
            }
        }
    }

    #[test]
    fn test_empty_slideshow_stays_at_zero() {
        let mut show = Slideshow::at(5, 0);
        assert_eq!(show.index(), 0);
        show.tick();
        assert_eq!(show.index(), 0);
        assert!(show.current::<u8>(&[]).is_none());
    }

    #[test]
    fn test_shrunk_count_folds_index() {
        let show = Slideshow::at(4, 3);
        assert_eq!(show.index(), 1);
        assert_eq!(show.current(&["a", "b", "c"]), Some(&"b"));
    }

    #[test]
    fn test_next_index_wraps() {
        assert_eq!(Slideshow::at(2, 3).next_index(), 0);
        assert_eq!(Slideshow::at(9, 0).next_index(), 0);
        assert_eq!(Slideshow::at(7, 4).index(), 3);
    }
}

//! Display projections over the pool
//!
//! Pure functions: bounded, deduplicated lists built from the current entries.
//! Randomised builders take the RNG as a parameter so callers (and tests) can
//! seed them. [`SnapshotCache`] memoises a projection until the entries list or
//! the reshuffle key changes.

use crate::models::{ExternalAlbum, ExternalArtist, SimilarArtistEntry};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;

/// Up to `count` artists in uniformly random order.
pub fn sample_artists<R: Rng + ?Sized>(
    entries: &[SimilarArtistEntry],
    count: usize,
    rng: &mut R,
) -> Vec<ExternalArtist> {
    let mut seen = HashSet::new();
    let mut artists: Vec<&ExternalArtist> = entries
        .iter()
        .map(|entry| &entry.artist)
        .filter(|artist| seen.insert(artist.id.as_str()))
        .collect();

    artists.shuffle(rng);
    artists.into_iter().take(count).cloned().collect()
}

/// Up to `count` albums, one per artist per pass.
///
/// Entries are shuffled, then pass `i` takes album `i` of each entry. This
/// spreads the sample across artists before going deeper into any one
/// discography. Stops when a pass finds no album at its index.
pub fn sample_albums<R: Rng + ?Sized>(
    entries: &[SimilarArtistEntry],
    count: usize,
    rng: &mut R,
) -> Vec<ExternalAlbum> {
    let mut order: Vec<&SimilarArtistEntry> = entries.iter().collect();
    order.shuffle(rng);

    let mut seen = HashSet::new();
    let mut albums = Vec::with_capacity(count);
    let mut index = 0;

    while albums.len() < count {
        let mut found_any = false;
        for entry in &order {
            let Some(album) = entry.albums.get(index) else {
                continue;
            };
            found_any = true;
            if seen.insert(album.id.as_str()) {
                albums.push(album.clone());
                if albums.len() == count {
                    break;
                }
            }
        }
        if !found_any {
            break;
        }
        index += 1;
    }

    albums
}

/// Up to `count` dated albums, newest first.
///
/// Undated albums are dropped and ids deduplicated. Dates are ISO ordered, so
/// string comparison sorts them ("2019" < "2019-03" < "2019-03-08").
pub fn newest_albums(entries: &[SimilarArtistEntry], count: usize) -> Vec<ExternalAlbum> {
    let mut seen = HashSet::new();
    let mut albums: Vec<&ExternalAlbum> = entries
        .iter()
        .flat_map(|entry| entry.albums.iter())
        .filter(|album| album.release_date.as_deref().is_some_and(|d| !d.is_empty()))
        .filter(|album| seen.insert(album.id.as_str()))
        .collect();

    albums.sort_by(|a, b| b.release_date.cmp(&a.release_date));
    albums.into_iter().take(count).cloned().collect()
}

/// Memoised projection keyed on the entries `Arc`, a reshuffle key and the count
pub struct SnapshotCache<T> {
    source: Option<Arc<Vec<SimilarArtistEntry>>>,
    reshuffle_key: u64,
    count: usize,
    value: Arc<Vec<T>>,
}

impl<T> Default for SnapshotCache<T> {
    fn default() -> Self {
        Self {
            source: None,
            reshuffle_key: 0,
            count: 0,
            value: Arc::new(Vec::new()),
        }
    }
}

impl<T> SnapshotCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value, recomputed only if an input changed.
    pub fn get_or_compute(
        &mut self,
        entries: &Arc<Vec<SimilarArtistEntry>>,
        reshuffle_key: u64,
        count: usize,
        compute: impl FnOnce(&[SimilarArtistEntry], usize) -> Vec<T>,
    ) -> Arc<Vec<T>> {
        let fresh = self
            .source
            .as_ref()
            .is_some_and(|source| Arc::ptr_eq(source, entries))
            && self.reshuffle_key == reshuffle_key
            && self.count == count;

        if !fresh {
            self.value = Arc::new(compute(entries, count));
            self.source = Some(Arc::clone(entries));
            self.reshuffle_key = reshuffle_key;
            self.count = count;
        }

        Arc::clone(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn album(id: &str, date: Option<&str>) -> ExternalAlbum {
        ExternalAlbum::new(id, format!("Album {id}"), "Someone", date)
    }

    fn entry(id: &str, albums: Vec<ExternalAlbum>) -> SimilarArtistEntry {
        SimilarArtistEntry {
            artist: ExternalArtist::new(id, format!("Artist {id}")),
            albums,
        }
    }

    fn pool() -> Vec<SimilarArtistEntry> {
        vec![
            entry("a", vec![album("a1", Some("2001")), album("a2", Some("2015-06-01")), album("a3", None)]),
            entry("b", vec![album("b1", Some("2019-03"))]),
            entry("c", vec![]),
            entry("d", vec![album("d1", Some("2019-03-08")), album("a2", Some("2015-06-01"))]),
        ]
    }

    #[test]
    fn test_sample_artists_is_bounded_and_unique() {
        let mut rng = StdRng::seed_from_u64(7);
        let artists = sample_artists(&pool(), 3, &mut rng);
        assert_eq!(artists.len(), 3);

        let ids: HashSet<_> = artists.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_sample_artists_same_seed_same_order() {
        let a = sample_artists(&pool(), 4, &mut StdRng::seed_from_u64(42));
        let b = sample_artists(&pool(), 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_albums_round_robin_covers_artists_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let albums = sample_albums(&pool(), 3, &mut rng);

        // Pass 0 yields one album from each of a, b, d before any second album
        let ids: HashSet<_> = albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, HashSet::from(["a1", "b1", "d1"]));
    }

    #[test]
    fn test_sample_albums_stops_when_exhausted() {
        let mut rng = StdRng::seed_from_u64(11);
        let albums = sample_albums(&pool(), 50, &mut rng);

        // a1 a2 a3 b1 d1 (the duplicate a2 under d is dropped)
        assert_eq!(albums.len(), 5);
    }

    #[test]
    fn test_sample_albums_empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_albums(&[], 10, &mut rng).is_empty());
    }

    #[test]
    fn test_newest_albums_sorted_dated_and_unique() {
        let albums = newest_albums(&pool(), 10);
        let ids: Vec<_> = albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "b1", "a2", "a1"]);
    }

    #[test]
    fn test_newest_albums_bounded() {
        let albums = newest_albums(&pool(), 2);
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].id, "d1");
    }

    #[test]
    fn test_cache_recomputes_only_on_change() {
        let mut cache = SnapshotCache::new();
        let entries = Arc::new(pool());
        let mut computed = 0;

        let mut build = |key: u64, entries: &Arc<Vec<SimilarArtistEntry>>| {
            cache.get_or_compute(entries, key, 2, |e, n| {
                computed += 1;
                newest_albums(e, n)
            })
        };

        let first = build(0, &entries);
        let second = build(0, &entries);
        assert!(Arc::ptr_eq(&first, &second));

        build(1, &entries);
        build(1, &Arc::new(pool()));
        drop(build);
        assert_eq!(computed, 3);
    }
}

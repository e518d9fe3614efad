use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::SimilarityMetric;
use crate::models::MediaProperties;
use crate::subject::Subject;

/// Reads technical properties of a media file, e.g. through a media
/// inspection library. Returns `None` when they cannot be determined.
pub trait PropertySource: Send + Sync {
    fn read(&self, path: &Path) -> Option<MediaProperties>;
}

impl<F: Fn(&Path) -> Option<MediaProperties> + Send + Sync> PropertySource for F {
    fn read(&self, path: &Path) -> Option<MediaProperties> {
        self(path)
    }
}

/// Per-session memo of file properties. Misses are remembered too, so
/// every path is read at most once while the cache lives.
#[derive(Default)]
pub struct PropertyCache {
    source: Option<Box<dyn PropertySource>>,
    entries: Mutex<HashMap<PathBuf, Option<MediaProperties>>>,
}

impl PropertyCache {
    pub fn new(source: impl PropertySource + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            entries: Mutex::default(),
        }
    }

    pub fn get(&self, path: &Path) -> Option<MediaProperties> {
        let source = self.source.as_ref()?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *entries.entry(path.to_owned()).or_insert_with(|| {
            let properties = source.read(path);
            tracing::trace!(path = %path.display(), ?properties, "read media properties");
            properties
        })
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for PropertyCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCache")
            .field("has_source", &self.source.is_some())
            .field("entries", &self.len())
            .finish()
    }
}

/// Allowed differences for [`PropertiesMetric`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute, in frames per second.
    pub frame_rate: f64,
    /// Relative to the longer duration.
    pub duration: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            frame_rate: 0.1,
            duration: 0.02,
        }
    }
}

/// Compares frame rate and duration. Each property known on both sides
/// counts `+1` within tolerance and `-1` outside it. The score is their
/// mean, or `0` if no property is known on both sides.
#[derive(Debug, Clone, Default)]
pub struct PropertiesMetric {
    cache: Arc<PropertyCache>,
    tolerance: Tolerance,
}

impl PropertiesMetric {
    pub fn new(cache: Arc<PropertyCache>, tolerance: Tolerance) -> Self {
        Self { cache, tolerance }
    }

    fn compare(&self, a: MediaProperties, b: MediaProperties) -> f32 {
        let mut votes = Vec::with_capacity(2);
        if let (Some(x), Some(y)) = (a.frame_rate, b.frame_rate) {
            votes.push((x - y).abs() <= self.tolerance.frame_rate);
        }
        if let (Some(x), Some(y)) = (a.duration_secs, b.duration_secs) {
            votes.push((x - y).abs() <= self.tolerance.duration * x.max(y));
        }
        if votes.is_empty() {
            return 0.0;
        }
        let sum: f32 = votes.iter().map(|&ok| if ok { 1.0 } else { -1.0 }).sum();
        sum / votes.len() as f32
    }
}

impl<A: Subject + ?Sized, B: Subject + ?Sized> SimilarityMetric<A, B> for PropertiesMetric {
    fn score(&self, a: &A, b: &B) -> f32 {
        match (a.properties(&self.cache), b.properties(&self.cache)) {
            (Some(x), Some(y)) => self.compare(x, y),
            _ => 0.0,
        }
    }

    fn name(&self) -> &str {
        "properties"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::models::{MediaFile, SubtitleDescriptor};

    fn props(frame_rate: Option<f64>, duration_secs: Option<f64>) -> MediaProperties {
        MediaProperties {
            frame_rate,
            duration_secs,
        }
    }

    fn subtitle(frame_rate: Option<f64>, duration_secs: Option<f64>) -> SubtitleDescriptor {
        let mut subtitle = SubtitleDescriptor::new("Show.S01E01.srt");
        subtitle.frame_rate = frame_rate;
        subtitle.duration_secs = duration_secs;
        subtitle
    }

    #[test]
    fn test_votes() {
        let metric = PropertiesMetric::default();
        let file = MediaFile::new("a.mkv").with_properties(props(Some(23.976), Some(1300.0)));
        assert_eq!(metric.score(&file, &subtitle(Some(23.976), Some(1310.0))), 1.0);
        assert_eq!(metric.score(&file, &subtitle(Some(25.0), Some(1310.0))), 0.0);
        assert_eq!(metric.score(&file, &subtitle(Some(25.0), None)), -1.0);
        assert_eq!(metric.score(&file, &subtitle(None, None)), 0.0);
    }

    #[test]
    fn test_missing_properties_are_neutral() {
        let metric = PropertiesMetric::default();
        assert_eq!(metric.score(&MediaFile::new("a.mkv"), &subtitle(Some(25.0), None)), 0.0);
    }

    #[test]
    fn test_cache_reads_each_path_once() {
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);
        let cache = Arc::new(PropertyCache::new(move |_: &Path| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(props(Some(25.0), None))
        }));
        let metric = PropertiesMetric::new(Arc::clone(&cache), Tolerance::default());
        let file = MediaFile::new("/tv/a.mkv");
        for _ in 0..3 {
            assert_eq!(metric.score(&file, &subtitle(Some(25.0), None)), 1.0);
        }
        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }
}

use constants::coordinate_system::SceneFrame;
use thiserror::Error;

/// Why a scene never became ready.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to fetch scene asset: {0}")]
    Fetch(String),
    #[error("failed to decode scene asset: {0}")]
    Decode(String),
    #[error("scene asset contains no scene")]
    EmptyScene,
}

/// Lifecycle of the one scene asset owned by a viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadPhase {
    /// No URL was supplied; the placeholder is shown instead.
    Absent,
    /// Nothing requested yet.
    Idle,
    Fetching,
    /// Bytes are with the glTF loader or the scene is being instantiated.
    Decoding,
    Ready(SceneFrame),
    Failed(LoadError),
}

/// User-facing loading indicator state. Written by the loader only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerDisplay {
    Loading,
    Ready,
    Failed,
    Absent,
}

impl ViewerDisplay {
    pub fn message(self) -> Option<&'static str> {
        match self {
            ViewerDisplay::Loading => Some("Loading 3D Model..."),
            ViewerDisplay::Failed => Some("Failed to load 3D model"),
            ViewerDisplay::Absent => Some("No 3D model available"),
            ViewerDisplay::Ready => None,
        }
    }
}

/// Permission to run one fetch for one viewer generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub url: String,
}

/// Single-shot loader. Every failure is terminal; a new viewer is the only retry.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    url: Option<String>,
    generation: u64,
    phase: LoadPhase,
    fetches_issued: u32,
}

impl AssetLoader {
    pub fn new(generation: u64) -> Self {
        Self {
            url: None,
            generation,
            phase: LoadPhase::Idle,
            fetches_issued: 0,
        }
    }

    /// Start the one load of this viewer. A missing or blank URL moves to
    /// [`LoadPhase::Absent`]. Refused once anything has been requested.
    pub fn begin(&mut self, url: Option<String>) -> Option<LoadTicket> {
        if self.phase != LoadPhase::Idle {
            return None;
        }
        let Some(url) = url.filter(|url| !url.trim().is_empty()) else {
            self.phase = LoadPhase::Absent;
            return None;
        };
        self.url = Some(url.clone());
        self.phase = LoadPhase::Fetching;
        self.fetches_issued += 1;
        Some(LoadTicket {
            generation: self.generation,
            url,
        })
    }

    /// Accept a fetch result. Results for another generation are ignored.
    /// Returns the bytes to decode on success.
    pub fn fetched(&mut self, generation: u64, result: Result<Vec<u8>, LoadError>) -> Option<Vec<u8>> {
        if generation != self.generation || self.phase != LoadPhase::Fetching {
            return None;
        }
        match result {
            Ok(bytes) if bytes.is_empty() => {
                self.phase = LoadPhase::Failed(LoadError::Fetch("empty response body".to_string()));
                None
            }
            Ok(bytes) => {
                self.phase = LoadPhase::Decoding;
                Some(bytes)
            }
            Err(err) => {
                self.phase = LoadPhase::Failed(err);
                None
            }
        }
    }

    /// Terminal failure from any in-progress phase.
    pub fn fail(&mut self, err: LoadError) {
        if matches!(self.phase, LoadPhase::Fetching | LoadPhase::Decoding) {
            self.phase = LoadPhase::Failed(err);
        }
    }

    pub fn finish(&mut self, frame: SceneFrame) -> bool {
        if self.phase == LoadPhase::Decoding {
            self.phase = LoadPhase::Ready(frame);
            true
        } else {
            false
        }
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetches_issued(&self) -> u32 {
        self.fetches_issued
    }

    pub fn frame(&self) -> Option<&SceneFrame> {
        match &self.phase {
            LoadPhase::Ready(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn display(&self) -> ViewerDisplay {
        match self.phase {
            LoadPhase::Absent => ViewerDisplay::Absent,
            LoadPhase::Ready(_) => ViewerDisplay::Ready,
            LoadPhase::Failed(_) => ViewerDisplay::Failed,
            LoadPhase::Idle | LoadPhase::Fetching | LoadPhase::Decoding => ViewerDisplay::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    fn loader_for(url: &str, generation: u64) -> AssetLoader {
        let mut loader = AssetLoader::new(generation);
        loader.begin(Some(url.to_string())).unwrap();
        loader
    }

    #[test]
    fn missing_url_is_absent_and_never_fetches() {
        let mut loader = AssetLoader::new(1);
        assert_eq!(loader.begin(None), None);
        assert_eq!(loader.display(), ViewerDisplay::Absent);
        assert_eq!(loader.begin(Some("https://cdn/late.glb".to_string())), None);

        let mut blank = AssetLoader::new(1);
        assert_eq!(blank.begin(Some("  ".to_string())), None);
        assert_eq!(blank.display(), ViewerDisplay::Absent);
        assert_eq!(blank.fetches_issued(), 0);
    }

    #[test]
    fn happy_path_reaches_ready() {
        let mut loader = AssetLoader::new(4);
        assert_eq!(loader.display(), ViewerDisplay::Loading);
        let ticket = loader.begin(Some("https://cdn/house.glb".to_string())).unwrap();
        assert_eq!(ticket.generation, 4);
        assert_eq!(loader.fetched(4, Ok(vec![1, 2, 3])), Some(vec![1, 2, 3]));
        assert_eq!(loader.display(), ViewerDisplay::Loading);
        let frame = SceneFrame {
            center: Vec3::ONE,
            scale: 2.0,
        };
        assert!(loader.finish(frame));
        assert_eq!(loader.frame(), Some(&frame));
        assert_eq!(loader.display(), ViewerDisplay::Ready);
    }

    #[test]
    fn failure_is_terminal_without_retry() {
        let mut loader = loader_for("https://cdn/404.glb", 1);
        loader.fetched(1, Err(LoadError::Fetch("HTTP 404".to_string())));
        assert_eq!(loader.display(), ViewerDisplay::Failed);

        for _ in 0..10 {
            assert_eq!(loader.begin(Some("https://cdn/404.glb".to_string())), None);
        }
        assert_eq!(loader.fetches_issued(), 1);
        assert_eq!(
            *loader.phase(),
            LoadPhase::Failed(LoadError::Fetch("HTTP 404".to_string()))
        );
    }

    #[test]
    fn second_begin_while_in_flight_is_refused() {
        let mut loader = loader_for("https://cdn/a.glb", 3);
        assert_eq!(loader.begin(Some("https://cdn/b.glb".to_string())), None);
        assert_eq!(loader.url(), Some("https://cdn/a.glb"));
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut loader = loader_for("https://cdn/a.glb", 2);
        assert_eq!(loader.fetched(1, Ok(vec![9])), None);
        assert_eq!(*loader.phase(), LoadPhase::Fetching);
    }

    #[test]
    fn decode_failure_after_fetch() {
        let mut loader = loader_for("https://cdn/a.glb", 0);
        loader.fetched(0, Ok(vec![0xde, 0xad]));
        loader.fail(LoadError::Decode("invalid glTF header".to_string()));
        assert_eq!(loader.display(), ViewerDisplay::Failed);
        assert!(!loader.finish(SceneFrame::IDENTITY));
    }

    #[test]
    fn empty_body_counts_as_fetch_failure() {
        let mut loader = loader_for("https://cdn/a.glb", 0);
        assert_eq!(loader.fetched(0, Ok(Vec::new())), None);
        assert_eq!(loader.display(), ViewerDisplay::Failed);
    }
}

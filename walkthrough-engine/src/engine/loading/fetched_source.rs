use std::path::{Path, PathBuf};

use bevy::asset::io::memory::{Dir, MemoryAssetReader};
use bevy::asset::io::{AssetSource, AssetSourceId};
use bevy::prelude::*;

/// Asset source the fetched scene bytes are published under.
pub const FETCHED_SOURCE: &str = "fetched";

/// In-memory directory backing the `fetched://` asset source.
///
/// Holds at most one scene file: publishing replaces whatever an older
/// viewer left behind.
#[derive(Resource, Default)]
pub struct FetchedAssets {
    dir: Dir,
    published: Option<PathBuf>,
}

impl FetchedAssets {
    /// Publish `bytes` for one viewer generation and return the asset path to load.
    pub fn publish(&mut self, generation: u64, url: &str, bytes: Vec<u8>) -> String {
        self.release();
        let file = PathBuf::from(format!("scene-{generation}.{}", extension_for(url)));
        self.dir.insert_asset(&file, bytes);
        let path = format!("{FETCHED_SOURCE}://{}", file.display());
        self.published = Some(file);
        path
    }

    /// Drop the published bytes once the glTF loader is done with them.
    pub fn release(&mut self) {
        if let Some(file) = self.published.take() {
            self.dir.remove_asset(&file);
        }
    }
}

/// Register the `fetched://` source. Must run before `AssetPlugin` is added.
pub fn register_fetched_source(app: &mut App) -> FetchedAssets {
    let assets = FetchedAssets::default();
    let root = assets.dir.clone();
    app.register_asset_source(
        AssetSourceId::from(FETCHED_SOURCE),
        AssetSource::build().with_reader(move || {
            Box::new(MemoryAssetReader {
                root: root.clone(),
            })
        }),
    );
    assets
}

/// glTF loader is picked by extension; anything but `.gltf` is treated as binary.
fn extension_for(url: &str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if path.to_ascii_lowercase().ends_with(".gltf") {
        "gltf"
    } else {
        "glb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_ignores_query_and_case() {
        assert_eq!(extension_for("https://cdn/house.GLTF?v=3"), "gltf");
        assert_eq!(extension_for("https://cdn/house.glb#top"), "glb");
        assert_eq!(extension_for("https://cdn/model"), "glb");
    }

    #[test]
    fn published_path_is_generation_scoped() {
        let mut assets = FetchedAssets::default();
        let first = assets.publish(1, "https://cdn/a.glb", vec![1, 2]);
        let second = assets.publish(2, "https://cdn/a.glb", vec![3]);
        assert_eq!(first, "fetched://scene-1.glb");
        assert_ne!(first, second);
        assert!(assets.dir.get_asset(Path::new("scene-2.glb")).is_some());
    }

    #[test]
    fn rebuilds_keep_only_the_latest_scene() {
        let mut assets = FetchedAssets::default();
        for generation in 1..=5 {
            assets.publish(generation, "https://cdn/house.glb", vec![0; 64]);
        }
        let retained: Vec<u64> = (1..=5)
            .filter(|generation| {
                assets
                    .dir
                    .get_asset(Path::new(&format!("scene-{generation}.glb")))
                    .is_some()
            })
            .collect();
        assert_eq!(retained, vec![5]);

        assets.release();
        assert!(assets.dir.get_asset(Path::new("scene-5.glb")).is_none());
    }
}

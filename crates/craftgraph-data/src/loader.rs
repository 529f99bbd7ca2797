//! Import pipeline: data mod checkout in, finished graph out.
//!
//! Record files are read as UTF-8 with CRLF normalized to LF. Only missing
//! directories and undecodable transition records are hard errors;
//! everything else degrades per record with a logged warning.

use craftgraph_core::biome::{self, Biome};
use craftgraph_core::category::Category;
use craftgraph_core::config::EngineConfig;
use craftgraph_core::depth;
use craftgraph_core::graph::{CraftGraph, GraphBuilder};
use craftgraph_core::id::ObjectId;
use craftgraph_core::object::GameObject;
use craftgraph_core::transition::{Transition, TransitionParseError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("data directory '{0}' not found")]
    MissingDataDir(PathBuf),

    #[error("record directory '{0}' not found")]
    MissingRecordDir(PathBuf),

    #[error("unreadable transition record '{file}'")]
    Transition {
        file: PathBuf,
        #[source]
        source: TransitionParseError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Loads one data mod checkout. Each call to [`GameDataLoader::load`]
/// rebuilds the whole graph from scratch; there is no incremental path.
#[derive(Debug)]
pub struct GameDataLoader {
    data_dir: PathBuf,
    config: EngineConfig,
}

impl GameDataLoader {
    pub fn new(data_dir: impl Into<PathBuf>, config: EngineConfig) -> GameDataLoader {
        GameDataLoader {
            data_dir: data_dir.into(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full import: objects, categories, transitions (split, merge,
    /// wire), biomes, then the depth fixed point.
    pub fn load(&self) -> Result<CraftGraph, LoadError> {
        if !self.data_dir.is_dir() {
            return Err(LoadError::MissingDataDir(self.data_dir.clone()));
        }

        let mut objects = self.import_objects()?;
        let categories = self.import_categories(&mut objects)?;

        let mut builder = self.import_transitions()?;
        builder.split_categories(&categories, &objects);
        builder.merge_generic_transitions();
        builder.merge_attack_transitions(self.config.grave_id);
        info!(count = builder.transitions.len(), "transitions expanded");

        let mut biomes = self.import_biomes()?;
        biome::attach_objects(&mut biomes, &mut objects);
        info!(count = biomes.len(), "biomes imported");

        let mut graph = builder.build(objects, categories, biomes);
        depth::calculate(&mut graph);
        Ok(graph)
    }

    fn import_objects(&self) -> Result<BTreeMap<ObjectId, GameObject>, LoadError> {
        let mut objects = BTreeMap::new();
        for (path, _filename) in self.record_files("objects", ".txt")? {
            let content = read_normalized(&path)?;
            if let Some(object) = GameObject::parse(&content) {
                objects.insert(object.id, object);
            }
        }
        info!(count = objects.len(), "objects imported");
        Ok(objects)
    }

    fn import_categories(
        &self,
        objects: &mut BTreeMap<ObjectId, GameObject>,
    ) -> Result<Vec<Category>, LoadError> {
        let mut categories: Vec<Category> = Vec::new();
        for (path, _filename) in self.record_files("categories", ".txt")? {
            let content = read_normalized(&path)?;
            if let Some(mut category) = Category::parse(&content) {
                if category.add_to_objects(objects, categories.len()) {
                    categories.push(category);
                }
            }
        }
        info!(count = categories.len(), "categories imported");
        Ok(categories)
    }

    fn import_transitions(&self) -> Result<GraphBuilder, LoadError> {
        let mut builder = GraphBuilder::new();
        for (path, filename) in self.record_files("transitions", ".txt")? {
            let content = read_normalized(&path)?;
            let transition =
                Transition::parse(&filename, &content).map_err(|source| LoadError::Transition {
                    file: path.clone(),
                    source,
                })?;
            builder.add(transition);
        }
        Ok(builder)
    }

    /// Biomes come from ground tile filenames; ground heat records sit among
    /// the object files. A mod without ground tiles simply has no biomes.
    fn import_biomes(&self) -> Result<Vec<Biome>, LoadError> {
        let ground = self.data_dir.join("ground");
        if !ground.is_dir() {
            debug!("no ground directory, skipping biomes");
            return Ok(Vec::new());
        }
        let mut biomes = Vec::new();
        for (_path, filename) in self.record_files("ground", ".tga")? {
            if let Some(b) = Biome::from_filename(&filename) {
                biomes.push(b);
            }
        }
        for (path, filename) in self.record_files("objects", ".txt")? {
            if filename.starts_with("groundHeat") {
                let content = read_normalized(&path)?;
                Biome::apply_ground_heat(&mut biomes, &filename, &content);
            }
        }
        Ok(biomes)
    }

    /// Files with the given extension, sorted by filename so every run
    /// visits records in the same order.
    fn record_files(&self, sub: &str, extension: &str) -> Result<Vec<(PathBuf, String)>, LoadError> {
        let dir = self.data_dir.join(sub);
        if !dir.is_dir() {
            return Err(LoadError::MissingRecordDir(dir));
        }
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(extension) {
                files.push((entry.path(), name));
            }
        }
        files.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(files)
    }
}

fn read_normalized(path: &Path) -> Result<String, std::io::Error> {
    Ok(std::fs::read_to_string(path)?.replace("\r\n", "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_test_dir(suffix: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "craftgraph_loader_test_{suffix}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        for sub in ["objects", "categories", "transitions"] {
            fs::create_dir_all(dir.join(sub)).unwrap();
        }
        dir
    }

    fn cleanup(dir: &Path) {
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_data_dir_is_an_error() {
        let loader = GameDataLoader::new("/nonexistent/craftgraph", EngineConfig::default());
        assert!(matches!(loader.load(), Err(LoadError::MissingDataDir(_))));
    }

    #[test]
    fn missing_record_dir_is_an_error() {
        let dir = make_test_dir("missing_records");
        fs::remove_dir_all(dir.join("transitions")).unwrap();
        let loader = GameDataLoader::new(&dir, EngineConfig::default());
        assert!(matches!(loader.load(), Err(LoadError::MissingRecordDir(_))));
        cleanup(&dir);
    }

    #[test]
    fn bad_transition_filename_is_an_error() {
        let dir = make_test_dir("bad_transition");
        fs::write(dir.join("objects/30.txt"), "id=30\nStone\n").unwrap();
        fs::write(dir.join("transitions/notes.txt"), "0 0").unwrap();
        let loader = GameDataLoader::new(&dir, EngineConfig::default());
        assert!(matches!(loader.load(), Err(LoadError::Transition { .. })));
        cleanup(&dir);
    }

    #[test]
    fn crlf_records_are_normalized() {
        let dir = make_test_dir("crlf");
        fs::write(dir.join("objects/30.txt"), "id=30\r\nStone\r\nheatValue=2\r\n").unwrap();
        let loader = GameDataLoader::new(&dir, EngineConfig::default());
        let graph = loader.load().unwrap();
        let stone = &graph.objects[&ObjectId(30)];
        assert_eq!(stone.name, "Stone");
        assert_eq!(stone.data.heat_value, 2);
        cleanup(&dir);
    }

    #[test]
    fn idless_records_are_skipped() {
        let dir = make_test_dir("idless");
        fs::write(dir.join("objects/30.txt"), "id=30\nStone\n").unwrap();
        fs::write(dir.join("objects/groundHeat_0.txt"), "0.5\n").unwrap();
        let loader = GameDataLoader::new(&dir, EngineConfig::default());
        let graph = loader.load().unwrap();
        assert_eq!(graph.objects.len(), 1);
        cleanup(&dir);
    }
}

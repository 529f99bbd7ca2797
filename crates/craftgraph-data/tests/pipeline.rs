//! Full pipeline over a miniature data mod written to a temp directory:
//! records in, derived catalog/object payloads out.

use craftgraph_core::config::EngineConfig;
use craftgraph_core::id::ObjectId;
use craftgraph_data::catalog;
use craftgraph_data::loader::GameDataLoader;
use std::fs;
use std::path::{Path, PathBuf};

fn oid(raw: i32) -> ObjectId {
    ObjectId(raw)
}

fn make_mod_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "craftgraph_pipeline_test_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    for sub in ["objects", "categories", "transitions", "ground"] {
        fs::create_dir_all(dir.join(sub)).unwrap();
    }

    let write = |rel: &str, content: &str| fs::write(dir.join(rel), content).unwrap();

    // Naturals.
    write(
        "objects/30.txt",
        "id=30\nStone\nmapChance=0.4#biomes_0\nfoodValue=0\n",
    );
    write(
        "objects/31.txt",
        "id=31\nBranch\nmapChance=0.3#biomes_0\nfoodValue=0\n",
    );
    write(
        "objects/35.txt",
        "id=35\nFlint\nmapChance=0.1#biomes_0\nfoodValue=0\n",
    );
    write(
        "objects/34.txt",
        "id=34\nBerry\nmapChance=0.2#biomes_0\nfoodValue=3,1\nnumUses=3,0.5\n",
    );
    // Craftables.
    write("objects/32.txt", "id=32\nSharp Stone\nfoodValue=0\n");
    write("objects/33.txt", "id=33\nSkewer\nfoodValue=0\n");
    // Category object.
    write("objects/100.txt", "id=100\n@Pointed\nfoodValue=0\n");
    // Ground heat record living among the objects.
    write("objects/groundHeat_0.txt", "0.5\n");

    write("categories/100.txt", "parentID=100\nnumObjects=2\n32\n35\n");

    // Stone on stone knaps a sharp stone (the striker survives).
    write("transitions/30_30.txt", "30 32");
    // Any pointed thing whittles a branch into a skewer.
    write("transitions/100_31.txt", "100 33");

    write("ground/ground_0.tga", "");

    dir
}

fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

#[test]
fn pipeline_builds_the_full_model() {
    let dir = make_mod_dir("full");
    let loader = GameDataLoader::new(&dir, EngineConfig::default());
    let graph = loader.load().unwrap();

    // Every record with an id landed; the heat record did not.
    assert_eq!(graph.objects.len(), 7);

    // Category splitting is a closure: nothing references the placeholder.
    assert!(graph.transitions.values().all(|t| {
        t.actor_id != oid(100)
            && t.target_id != oid(100)
            && t.new_actor_id != oid(100)
            && t.new_target_id != oid(100)
    }));
    // One knapping rule plus one whittling rule per category member.
    assert_eq!(graph.transitions.len(), 3);

    // Depth: naturals at zero, each step at least one deeper, and the
    // skewer takes the cheap flint route over the knapped stone route.
    assert_eq!(graph.objects[&oid(30)].depth.value(), Some(0.0));
    assert_eq!(graph.objects[&oid(32)].depth.value(), Some(1.0));
    assert_eq!(graph.objects[&oid(33)].depth.value(), Some(1.0));

    // Biomes: one biome, heated, holding every natural.
    assert_eq!(graph.biomes.len(), 1);
    assert_eq!(graph.biomes[0].ground_heat, 0.5);
    assert_eq!(
        graph.biomes[0].object_ids,
        vec![oid(30), oid(31), oid(34), oid(35)]
    );

    cleanup(&dir);
}

#[test]
fn pipeline_catalog_and_exports() {
    let dir = make_mod_dir("exports");
    let loader = GameDataLoader::new(&dir, EngineConfig::default());
    let graph = loader.load().unwrap();
    let config = loader.config();

    let catalog = catalog::build_catalog(&graph, config);
    // The category object is hidden; everything else shows, newest first.
    assert_eq!(
        catalog.ids,
        vec![oid(35), oid(34), oid(33), oid(32), oid(31), oid(30)]
    );
    assert_eq!(catalog.biome_ids, vec!["0".to_string()]);
    assert_eq!(catalog.biome_names, vec![Some("Grasslands")]);
    assert_eq!(catalog.badges["food"].ids, vec![oid(34)]);

    let exported = catalog::export_objects(&graph, config);
    assert_eq!(exported.len(), graph.objects.len());

    let berry = &exported.iter().find(|(id, _)| *id == oid(34)).unwrap().1;
    assert_eq!(berry.food_value, Some([3, 1]));
    assert_eq!(berry.num_uses, Some(3));
    assert_eq!(berry.map_chance, Some(0.2));
    let spawns = berry.biomes.as_ref().unwrap();
    assert_eq!(spawns.len(), 1);
    assert!((spawns[0].spawn_chance - 0.2).abs() < 1e-6);

    let skewer = &exported.iter().find(|(id, _)| *id == oid(33)).unwrap().1;
    assert!(skewer.craftable);
    let recipe = skewer.recipe.as_ref().unwrap();
    let ingredients = recipe.ingredients.as_ref().unwrap();
    assert!(ingredients.contains(&oid(31)));
    assert!(recipe.uncraftables.is_none());

    let biomes = catalog::export_biomes(&graph);
    assert_eq!(biomes.len(), 1);
    assert_eq!(biomes[0].objects.len(), 4);

    cleanup(&dir);
}

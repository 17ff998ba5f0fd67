use recipe_rag::embedding::HashingEmbedder;
use recipe_rag::indexer::{build_index, ArtifactSet};
use recipe_rag::ingest::{run_normalize, ChunkingConfig};
use recipe_rag::models::{Chunk, ChunkMeta, RecipeDocument};
use recipe_rag::search::{retrieve, QueryFilters, StepStore};
use recipe_rag::utils::jsonl;
use recipe_rag::Error;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const CSV: &str = r#"id,name,minutes,ingredients_raw_str,steps,tags,diets,allergens,meals,cuisine,calories
r1,Vegan Black Bean Chili,30,"['black beans', 'tomatoes', 'onion', 'chili powder']","['Saute the onion.', 'Add beans and tomatoes.', 'Simmer for twenty minutes.']","['chili', 'one-pot']",['vegan'],[],['dinner'],mexican,320.5
r2,Slow Beef Stew,120,"['beef chuck', 'carrots', 'potatoes']","['Brown the beef.', 'Add vegetables.', 'Braise for two hours.']",['stew'],[],[],"['dinner', 'lunch']",irish,610
r3,Fluffy Vegan Pancakes,20,"flour, oat milk, baking powder","['Whisk.', 'Fry.']",['breakfast'],"vegan, dairy-free",['gluten'],['breakfast'],american,NaN
,,NaN,,,,,,,,
"#;

struct Fixture {
    _dir: tempfile::TempDir,
    jsonl_dir: PathBuf,
    index_dir: PathBuf,
}

fn embedder() -> HashingEmbedder {
    HashingEmbedder::new(64)
}

fn setup() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("recipes.csv");
    fs::write(&csv_path, CSV).unwrap();

    let jsonl_dir = dir.path().join("rag_jsonl");
    let index_dir = dir.path().join("index_artifacts");

    let chunking = ChunkingConfig {
        max_tokens: 8,
        overlap: 2,
    };
    let report = run_normalize(&csv_path, &jsonl_dir, &chunking, None).unwrap();
    assert_eq!(report.recipe_count, 4);

    build_index(&jsonl_dir.join("chunks.jsonl"), &index_dir, &embedder()).unwrap();

    Fixture {
        _dir: dir,
        jsonl_dir,
        index_dir,
    }
}

fn read_chunks(dir: &Path) -> Vec<Chunk> {
    jsonl::read_all(&dir.join("chunks.jsonl")).unwrap()
}

#[test]
fn test_normalized_documents() {
    let fx = setup();
    let docs: Vec<RecipeDocument> = jsonl::read_all(&fx.jsonl_dir.join("recipes.jsonl")).unwrap();

    assert_eq!(docs.len(), 4);
    assert_eq!(docs[0].id, "r1");
    assert_eq!(docs[0].metadata.minutes, Some(30));
    assert_eq!(docs[0].metadata.nutrition.calories, Some(320.5));
    assert!(docs[0].text.starts_with("Vegan Black Bean Chili\nIngredients: black beans, tomatoes"));
    assert_eq!(docs[1].metadata.meals, vec!["dinner", "lunch"]);
    assert_eq!(docs[2].metadata.ingredients, vec!["flour", "oat milk", "baking powder"]);
    assert_eq!(docs[2].metadata.diets, vec!["vegan", "dairy-free"]);
    assert_eq!(docs[2].metadata.nutrition.calories, None);
    assert!(docs[2].metadata.diet_flags.is_vegan);
    assert_eq!(docs[3].title, "(Unnamed Recipe)");
    assert!(!docs[3].id.is_empty());
    assert_eq!(docs[3].metadata.source.dataset, "recipes.csv");
    assert_eq!(docs[3].metadata.source.row_index, 3);
}

#[test]
fn test_chunk_indices_are_gapless_per_document() {
    let fx = setup();
    let chunks = read_chunks(&fx.jsonl_dir);

    let mut docs_seen = Vec::new();
    for chunk in &chunks {
        if docs_seen.last() != Some(&chunk.doc_id) {
            assert_eq!(chunk.chunk_index, 0, "first chunk of {}", chunk.doc_id);
            docs_seen.push(chunk.doc_id.clone());
        }
        assert_eq!(chunk.chunk_id, format!("{}:{}", chunk.doc_id, chunk.chunk_index));
    }
    for pair in chunks.windows(2) {
        if pair[0].doc_id == pair[1].doc_id {
            assert_eq!(pair[1].chunk_index, pair[0].chunk_index + 1);
        }
    }
    assert_eq!(docs_seen.len(), 4, "every document has at least one chunk");
}

#[test]
fn test_sidecars_align_with_chunks() {
    let fx = setup();
    let chunks = read_chunks(&fx.jsonl_dir);
    let texts: Vec<serde_json::Value> = jsonl::read_all(&fx.index_dir.join("texts.jsonl")).unwrap();
    let metas: Vec<ChunkMeta> = jsonl::read_all(&fx.index_dir.join("metas.jsonl")).unwrap();

    assert_eq!(texts.len(), chunks.len());
    assert_eq!(metas.len(), chunks.len());
    for ((chunk, text), meta) in chunks.iter().zip(&texts).zip(&metas) {
        assert_eq!(text["text"], chunk.text.as_str());
        assert_eq!(meta.chunk_id, chunk.chunk_id);
        assert_eq!(meta.doc_id, chunk.doc_id);
        assert_eq!(meta.ingredients, chunk.metadata.ingredients);
    }

    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();
    assert_eq!(artifacts.len(), chunks.len());
    assert_eq!(artifacts.manifest.count, chunks.len());
    assert_eq!(artifacts.manifest.embed_model, "hashing-64");
}

#[test]
fn test_query_auto_filters_select_vegan_dinner() {
    let fx = setup();
    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();

    let retrieval = retrieve(
        "vegan dinner under 45 minutes",
        5,
        QueryFilters::default(),
        &artifacts,
        &embedder(),
    )
    .unwrap();

    assert_eq!(retrieval.filters.max_minutes, Some(45));
    assert_eq!(retrieval.filters.diet.as_deref(), Some("vegan"));
    assert_eq!(retrieval.filters.meal.as_deref(), Some("dinner"));

    let ids: Vec<&str> = retrieval.results.iter().map(|r| r.meta.doc_id.as_str()).collect();
    assert_eq!(ids, vec!["r1"]);
}

#[test]
fn test_results_are_deduplicated_and_ranked() {
    let fx = setup();
    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();

    let retrieval = retrieve("beans beef pancakes", 10, QueryFilters::default(), &artifacts, &embedder()).unwrap();
    let results = retrieval.results;

    let unique: HashSet<&str> = results.iter().map(|r| r.meta.doc_id.as_str()).collect();
    assert_eq!(unique.len(), results.len());
    assert_eq!(results.len(), 4);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_explicit_filters_exclude() {
    let fx = setup();
    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();

    let filters = QueryFilters {
        max_minutes: Some(60),
        exclude_allergen: Some("gluten".to_string()),
        ..Default::default()
    };
    let retrieval = retrieve("hearty food", 10, filters, &artifacts, &embedder()).unwrap();
    let ids: HashSet<&str> = retrieval.results.iter().map(|r| r.meta.doc_id.as_str()).collect();

    assert!(ids.contains("r1"));
    assert!(!ids.contains("r2"), "120 minute stew exceeds the bound");
    assert!(!ids.contains("r3"), "gluten allergen excluded");
    assert_eq!(ids.len(), 2, "unknown minutes pass the time filter");

    let filters = QueryFilters {
        exclude_ingredients: Some("beef, black bean".to_string()),
        diet: Some("keto".to_string()),
        ..Default::default()
    };
    let retrieval = retrieve("anything", 10, filters, &artifacts, &embedder()).unwrap();
    assert!(retrieval.results.is_empty());
}

#[test]
fn test_top_k_truncates() {
    let fx = setup();
    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();

    let retrieval = retrieve("recipe", 2, QueryFilters::default(), &artifacts, &embedder()).unwrap();
    assert_eq!(retrieval.results.len(), 2);

    let retrieval = retrieve("recipe", 0, QueryFilters::default(), &artifacts, &embedder()).unwrap();
    assert!(retrieval.results.is_empty());
}

#[test]
fn test_step_enrichment() {
    let fx = setup();
    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();
    let retrieval = retrieve("stew and pancakes", 10, QueryFilters::default(), &artifacts, &embedder()).unwrap();

    let mut results = retrieval.results;
    StepStore::load(&fx.jsonl_dir.join("recipes.jsonl")).enrich(&mut results);

    let stew = results.iter().find(|r| r.meta.doc_id == "r2").unwrap();
    assert_eq!(
        stew.steps.as_deref().unwrap(),
        ["Brown the beef.", "Add vegetables.", "Braise for two hours."]
    );
    let unnamed = results.iter().find(|r| r.meta.recipe_title == "(Unnamed Recipe)").unwrap();
    assert!(unnamed.steps.is_none());
}

#[test]
fn test_query_rejects_different_embedding() {
    let fx = setup();
    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();

    let result = retrieve("soup", 3, QueryFilters::default(), &artifacts, &HashingEmbedder::new(32));
    assert!(matches!(result, Err(Error::EmbeddingMismatch(_))));

    let same_name = HashingEmbedder::with_model_id(32, "hashing-64");
    let result = retrieve("soup", 3, QueryFilters::default(), &artifacts, &same_name);
    assert!(matches!(result, Err(Error::EmbeddingMismatch(_))));
}

#[test]
fn test_sidecar_length_mismatch_is_fatal() {
    let fx = setup();
    let texts_path = fx.index_dir.join("texts.jsonl");
    let mut texts = fs::read_to_string(&texts_path).unwrap();
    texts.push_str("{\"text\": \"stray\"}\n");
    fs::write(&texts_path, texts).unwrap();

    let err = ArtifactSet::load(&fx.index_dir).err().unwrap();
    assert!(matches!(err, Error::SidecarMismatch(_)));
}

#[test]
fn test_reordered_sidecars_still_resolve_by_chunk_id() {
    let fx = setup();
    let texts_path = fx.index_dir.join("texts.jsonl");
    let metas_path = fx.index_dir.join("metas.jsonl");

    let mut texts: Vec<String> = fs::read_to_string(&texts_path).unwrap().lines().map(String::from).collect();
    let mut metas: Vec<String> = fs::read_to_string(&metas_path).unwrap().lines().map(String::from).collect();
    texts.reverse();
    metas.reverse();
    fs::write(&texts_path, texts.join("\n") + "\n").unwrap();
    fs::write(&metas_path, metas.join("\n") + "\n").unwrap();

    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();
    let retrieval = retrieve("vegan dinner", 5, QueryFilters::default(), &artifacts, &embedder()).unwrap();
    let top = &retrieval.results[0];
    assert_eq!(top.meta.doc_id, "r1");
    assert!(top.text.split_whitespace().count() <= 8);
}

#[test]
fn test_missing_artifacts_are_fatal() {
    let fx = setup();
    fs::remove_file(fx.index_dir.join("metas.jsonl")).unwrap();
    assert!(matches!(ArtifactSet::load(&fx.index_dir), Err(Error::NotFound(_))));

    fs::remove_file(fx.index_dir.join("manifest.json")).unwrap();
    let err = ArtifactSet::load(&fx.index_dir).err().unwrap();
    assert!(err.to_string().contains("manifest.json"));
}

#[test]
fn test_rebuild_replaces_artifact_set() {
    let fx = setup();
    let chunks_path = fx.jsonl_dir.join("chunks.jsonl");
    let chunks = read_chunks(&fx.jsonl_dir);

    let first: Vec<Chunk> = chunks.into_iter().filter(|c| c.doc_id == "r1").collect();
    let mut out = Vec::new();
    for chunk in &first {
        jsonl::write_line(&mut out, chunk).unwrap();
    }
    fs::write(&chunks_path, out).unwrap();

    build_index(&chunks_path, &fx.index_dir, &embedder()).unwrap();
    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();
    assert_eq!(artifacts.len(), first.len());
}

#[test]
fn test_empty_chunks_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let chunks_path = dir.path().join("chunks.jsonl");
    fs::write(&chunks_path, "\n").unwrap();

    let result = build_index(&chunks_path, &dir.path().join("out"), &embedder());
    assert!(matches!(result, Err(Error::EmptyCorpus(_))));
}

#[test]
fn test_huge_top_k_returns_every_recipe() {
    let fx = setup();
    let artifacts = ArtifactSet::load(&fx.index_dir).unwrap();

    let retrieval =
        retrieve("beans beef pancakes", usize::MAX, QueryFilters::default(), &artifacts, &embedder())
            .unwrap();
    assert_eq!(retrieval.results.len(), 4);
}

#[test]
fn test_repeated_recipe_ids_fail_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("recipes.csv");
    fs::write(&csv_path, "id,name\nr1,Soup\nr1,Stew\n").unwrap();

    let jsonl_dir = dir.path().join("rag_jsonl");
    let index_dir = dir.path().join("index_artifacts");
    run_normalize(&csv_path, &jsonl_dir, &ChunkingConfig::default(), None).unwrap();

    let err = build_index(&jsonl_dir.join("chunks.jsonl"), &index_dir, &embedder()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(err.to_string().contains("r1:0"));
    assert!(!index_dir.join("manifest.json").exists());
}

use figment::Jail;
use ragdb_core::config::{expand_path, resolve_with_base, Config, EmbeddingProviderKind, Settings};
use std::path::Path;

#[test]
fn defaults_apply_without_any_files() {
    Jail::expect_with(|jail| {
        let config = Config::load_from(jail.directory(), "test").map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.chunking.chunk_size, 512);
        assert_eq!(settings.chunking.overlap, 50);
        assert_eq!(settings.search.top_k, 5);
        assert_eq!(settings.search.candidate_k, 20);
        Ok(())
    });
}

#[test]
fn env_file_and_env_vars_layer_over_base_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [data]
            index_dir = "/var/lib/ragdb"

            [search]
            top_k = 8
            lexical_weight = 0.5
            semantic_weight = 0.5
            "#,
        )?;
        jail.create_file(
            "config.test.toml",
            r#"
            [chunking]
            chunk_size = 64
            overlap = 8
            "#,
        )?;
        jail.set_env("APP_SEARCH__TOP_K", 3);
        jail.set_env("APP_EMBEDDING__PROVIDER", "bert");

        let config = Config::load_from(jail.directory(), "test").map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.data.index_dir, "/var/lib/ragdb");
        assert_eq!(settings.chunking.chunk_size, 64);
        assert_eq!(settings.chunking.overlap, 8);
        assert_eq!(settings.search.top_k, 3, "env var wins over files");
        assert_eq!(settings.search.lexical_weight, 0.5);
        assert_eq!(settings.embedding.provider, EmbeddingProviderKind::Bert);
        let top_k: usize = config.get("search.top_k").map_err(|e| e.to_string())?;
        assert_eq!(top_k, 3);
        Ok(())
    });
}

#[test]
fn invalid_overlap_fails_validation() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[chunking]\nchunk_size = 10\noverlap = 10\n")?;
        let config = Config::load_from(jail.directory(), "dev").map_err(|e| e.to_string())?;
        assert!(config.settings().is_err());
        Ok(())
    });
}

#[test]
fn zero_weights_fail_validation() {
    let mut settings = Settings::default();
    settings.search.lexical_weight = 0.0;
    settings.search.semantic_weight = 0.0;
    assert!(settings.validate().is_err());
    settings.search.semantic_weight = f32::NAN;
    assert!(settings.validate().is_err());
    settings.search.semantic_weight = 1.0;
    assert!(settings.validate().is_ok());
}

#[test]
fn relative_paths_resolve_against_base() {
    let base = Path::new("/srv/app");
    assert_eq!(resolve_with_base(base, "data/index"), Path::new("/srv/app/data/index"));
    assert_eq!(resolve_with_base(base, "/abs/index"), Path::new("/abs/index"));
    assert_eq!(Settings::default().index_dir(base), Path::new("/srv/app/data/index"));
}

#[test]
fn expand_path_leaves_plain_paths_alone() {
    assert_eq!(expand_path("plain/dir"), Path::new("plain/dir"));
}

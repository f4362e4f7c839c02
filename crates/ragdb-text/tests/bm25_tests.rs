use ragdb_text::LexicalIndex;

fn corpus(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|s| s.to_string()).collect()
}

#[test]
fn scores_align_with_corpus_positions() {
    let index = LexicalIndex::build(&corpus(&["the quick brown fox jumps", "a lazy dog sleeps"])).expect("build");
    assert_eq!(index.len(), 2);
    assert_eq!(index.indexed_docs(), 2);

    let scores = index.score_all("fox").expect("score");
    assert_eq!(scores.len(), 2);
    assert!(scores[0] > 0.0, "matching chunk scores positive: {:?}", scores);
    assert_eq!(scores[1], 0.0);
}

#[test]
fn rarer_terms_weigh_more() {
    let index = LexicalIndex::build(&corpus(&[
        "rust rust tokio",
        "rust serde",
        "rust clap",
        "python flask",
    ]))
    .expect("build");
    let rare = index.score_all("tokio").expect("score");
    let common = index.score_all("rust").expect("score");
    assert!(rare[0] > common[0], "idf favours the rare term: {} vs {}", rare[0], common[0]);
    assert_eq!(common[3], 0.0);
    assert!(common[1] > 0.0 && common[2] > 0.0);
}

#[test]
fn tokenization_is_whitespace_only_and_case_sensitive() {
    let index = LexicalIndex::build(&corpus(&["Fox, hunting", "fox hunting"])).expect("build");

    let lower = index.score_all("fox").expect("score");
    assert_eq!(lower[0], 0.0, "no lowercasing or punctuation stripping");
    assert!(lower[1] > 0.0);

    let punct = index.score_all("Fox,").expect("score");
    assert!(punct[0] > 0.0);
    assert_eq!(punct[1], 0.0);
}

#[test]
fn empty_query_scores_zero() {
    let index = LexicalIndex::build(&corpus(&["alpha beta", "gamma"])).expect("build");
    assert_eq!(index.score_all("").expect("score"), vec![0.0, 0.0]);
    assert_eq!(index.score_all("   \t").expect("score"), vec![0.0, 0.0]);
    assert_eq!(index.score_all("zeta").expect("score"), vec![0.0, 0.0]);
}

#[test]
fn empty_corpus_scores_nothing() {
    let index = LexicalIndex::build(&[]).expect("build");
    assert!(index.is_empty());
    assert!(index.score_all("anything").expect("score").is_empty());
}

#[test]
fn rebuild_recomputes_global_statistics() {
    let mut index = LexicalIndex::build(&corpus(&["solar panel wiring", "battery storage"])).expect("build");
    let before = index.score_all("solar").expect("score")[0];

    index
        .rebuild(&corpus(&[
            "solar panel wiring",
            "battery storage",
            "solar water heater",
            "solar cooker",
        ]))
        .expect("rebuild");
    assert_eq!(index.len(), 4);
    let after = index.score_all("solar").expect("score");
    assert_eq!(after.len(), 4);
    assert!(after[0] < before, "term got more common so idf dropped: {} -> {}", before, after[0]);
    assert_eq!(after[1], 0.0);
}

#[test]
fn repeated_builds_are_deterministic() {
    let texts = corpus(&["water filter sand charcoal", "charcoal kiln", "sand bags flood"]);
    let a = LexicalIndex::build(&texts).expect("build").score_all("sand charcoal").expect("score");
    let b = LexicalIndex::build(&texts).expect("build").score_all("sand charcoal").expect("score");
    assert_eq!(a, b);
    assert!(a[0] > a[1] && a[0] > a[2], "chunk with both terms wins: {:?}", a);
}

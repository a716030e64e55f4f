//! End-to-end tests over the public API: configuration in, translated text
//! and path out, with deterministic mock engines standing in for the models.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use triglot::{
    EngineProvider, MockBehavior, MockEngineProvider, Orchestrator, TranslateError,
    TranslationConfig,
};

const CONFIG: &str = r#"{
    "languages": {"zh": "Chinese", "en": "English", "el": "Greek"},
    "routes": {
        "zh": {
            "en": {"path": ["zh-en"], "engines": ["opus.zh-en"]},
            "el": {"path": ["zh-en", "en-el"], "engines": ["opus.zh-en", "opus.en-el"]}
        },
        "en": {
            "zh": {"path": ["en-zh"], "engines": ["opus.en-zh"]},
            "el": {"path": ["en-el"], "engines": ["opus.en-el"]}
        },
        "el": {
            "en": {"path": ["el-en"], "engines": ["opus.el-en"]},
            "zh": {"path": ["el-en", "en-zh"], "engines": ["opus.el-en", "opus.en-zh"]}
        }
    }
}"#;

fn orchestrator(provider: Arc<MockEngineProvider>) -> Orchestrator {
    let config = TranslationConfig::from_json(CONFIG).expect("test config must parse");
    Orchestrator::new(&config, provider as Arc<dyn EngineProvider>)
        .expect("test config must validate")
}

fn mappings(pairs: &[(&str, &str)]) -> MockBehavior {
    MockBehavior::Mappings(
        pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect::<HashMap<_, _>>(),
    )
}

#[tokio::test]
async fn chain_translation_composes_mock_engines_in_order() {
    // zh->el is configured as [zh-en, en-el]. With f1("A") = "B" and
    // f2("B") = "C", translating "A" must produce "C" and the full path.
    let provider = Arc::new(
        MockEngineProvider::new()
            .with_behavior("opus.zh-en", mappings(&[("A", "B")]))
            .with_behavior("opus.en-el", mappings(&[("B", "C")])),
    );
    let orchestrator = orchestrator(provider);

    let result = orchestrator.translate("A", "zh", "el").await.unwrap();
    assert_eq!(result.text, "C");
    assert_eq!(result.path, vec!["Chinese", "English", "Greek"]);
}

#[tokio::test]
async fn direct_translation_reports_both_endpoints() {
    let provider = Arc::new(MockEngineProvider::new());
    let orchestrator = orchestrator(provider);

    let result = orchestrator.translate("hello", "en", "zh").await.unwrap();
    assert_eq!(result.path, vec!["English", "Chinese"]);
}

#[tokio::test]
async fn every_configured_pair_translates() {
    let provider = Arc::new(MockEngineProvider::new());
    let orchestrator = orchestrator(provider);

    for (source, target) in [
        ("zh", "en"),
        ("zh", "el"),
        ("en", "zh"),
        ("en", "el"),
        ("el", "en"),
        ("el", "zh"),
    ] {
        let result = orchestrator.translate("text", source, target).await;
        assert!(result.is_ok(), "pair {source}->{target} failed: {result:?}");
    }
}

#[tokio::test]
async fn engines_are_shared_across_pairs_and_requests() {
    let provider = Arc::new(MockEngineProvider::new());
    let orchestrator = orchestrator(Arc::clone(&provider));

    // zh->el and en->el both use opus.en-el; el->zh and en->zh both use
    // opus.en-zh. Each engine must load exactly once across all of it.
    orchestrator.translate("a", "zh", "el").await.unwrap();
    orchestrator.translate("b", "en", "el").await.unwrap();
    orchestrator.translate("c", "el", "zh").await.unwrap();
    orchestrator.translate("d", "en", "zh").await.unwrap();

    assert_eq!(provider.load_count("opus.en-el"), 1);
    assert_eq!(provider.load_count("opus.en-zh"), 1);
    assert_eq!(provider.total_loads(), 4); // zh-en, en-el, el-en, en-zh
}

#[tokio::test]
async fn batch_with_failing_middle_item_keeps_the_others() {
    let provider = Arc::new(
        MockEngineProvider::new()
            .with_behavior("opus.zh-en", MockBehavior::FailOn("二".to_string())),
    );
    let orchestrator = orchestrator(Arc::clone(&provider));

    let texts = vec!["一".to_string(), "二".to_string(), "三".to_string()];
    let results = orchestrator
        .translate_batch(&texts, "zh", "el")
        .await
        .unwrap();

    assert!(results[0].is_ok());
    assert!(matches!(
        results[1].as_ref().unwrap_err(),
        TranslateError::Inference { .. }
    ));
    assert!(results[2].is_ok());

    // The failing item never reached the second hop, the others did; both
    // engines loaded exactly once for the whole batch.
    assert_eq!(provider.load_count("opus.zh-en"), 1);
    assert_eq!(provider.load_count("opus.en-el"), 1);
}

#[tokio::test]
async fn cache_clear_between_requests_reloads_engines() {
    let provider = Arc::new(MockEngineProvider::new());
    let orchestrator = orchestrator(Arc::clone(&provider));

    orchestrator.translate("a", "zh", "en").await.unwrap();
    orchestrator.clear_cache();
    orchestrator.translate("b", "zh", "en").await.unwrap();

    assert_eq!(provider.load_count("opus.zh-en"), 2);
}

#[tokio::test]
async fn failed_engine_load_heals_on_retry() {
    let provider = Arc::new(MockEngineProvider::new());
    provider.fail_loads("opus.zh-en");
    let orchestrator = orchestrator(Arc::clone(&provider));

    let err = orchestrator.translate("a", "zh", "en").await.unwrap_err();
    assert!(matches!(err, TranslateError::EngineLoad { .. }));

    provider.restore_loads("opus.zh-en");
    assert!(orchestrator.translate("a", "zh", "en").await.is_ok());
}

#[tokio::test]
async fn concurrent_requests_on_one_pair_load_each_engine_once() {
    let provider = Arc::new(MockEngineProvider::new().with_load_delay(Duration::from_millis(30)));
    let orchestrator = Arc::new(orchestrator(Arc::clone(&provider)));

    let tasks: Vec<_> = (0..6)
        .map(|i| {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move {
                orchestrator
                    .translate(&format!("text {i}"), "zh", "el")
                    .await
            })
        })
        .collect();

    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(provider.load_count("opus.zh-en"), 1);
    assert_eq!(provider.load_count("opus.en-el"), 1);
}

#[tokio::test]
async fn deadline_applies_to_the_whole_batch() {
    let provider = Arc::new(MockEngineProvider::new().with_run_delay(Duration::from_millis(60)));
    let orchestrator = orchestrator(provider);

    let texts: Vec<String> = (0..4).map(|i| format!("text {i}")).collect();
    let results = orchestrator
        .translate_batch_with_deadline(&texts, "en", "el", Duration::from_millis(100))
        .await
        .unwrap();

    // The first item fits the budget; a later one must run out.
    assert!(results[0].is_ok());
    assert!(results.iter().any(|item| matches!(
        item,
        Err(TranslateError::Timeout { .. })
    )));
}

#[tokio::test]
async fn listing_routes_matches_configuration() {
    let provider = Arc::new(MockEngineProvider::new());
    let orchestrator = orchestrator(provider);

    let routes = orchestrator.available_routes();
    assert_eq!(routes.len(), 3);
    assert_eq!(
        routes["Chinese"],
        vec!["Greek".to_string(), "English".to_string()]
    );
    assert_eq!(
        routes["Greek"],
        vec!["English".to_string(), "Chinese".to_string()]
    );
}

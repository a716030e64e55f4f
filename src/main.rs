use std::sync::Arc;
use std::time::Duration;

use clap::{Arg, Command};

use triglot::{
    EngineProvider, MockEngineProvider, Orchestrator, RemoteEngineProvider, TranslationConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("warn".parse().unwrap()),
        )
        .init();

    let matches = Command::new("triglot")
        .version("0.1.0")
        .about("Translate between Chinese, English, and Greek, chaining through English where needed")
        .arg(
            Arg::new("source")
                .help("Source language code (zh, en, el)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("target")
                .help("Target language code (zh, en, el)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("text")
                .help("Text to translate")
                .required(true)
                .index(3),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to a translation config JSON file (default: built-in zh/en/el routes)"),
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .short('e')
                .help("Inference service base URL (default: TRIGLOT_ENGINE_URL)"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use deterministic mock engines instead of the inference service")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .short('t')
                .value_parser(clap::value_parser!(u64))
                .help("Overall deadline in seconds, covering engine loads and inference"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show the translation path")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let source = matches.get_one::<String>("source").unwrap();
    let target = matches.get_one::<String>("target").unwrap();
    let text = matches.get_one::<String>("text").unwrap();
    let use_mock = matches.get_flag("mock");
    let verbose = matches.get_flag("verbose");

    // 1. Configuration
    let config = match matches.get_one::<String>("config") {
        Some(path) => TranslationConfig::from_file(path).map_err(|e| {
            eprintln!("❌ {e}");
            e
        })?,
        None => TranslationConfig::builtin(),
    };

    // 2. Engine provider
    let provider: Arc<dyn EngineProvider> = if use_mock {
        Arc::new(MockEngineProvider::new())
    } else {
        let remote = match matches.get_one::<String>("endpoint") {
            Some(endpoint) => RemoteEngineProvider::new(endpoint.clone()),
            None => RemoteEngineProvider::from_env(),
        };
        match remote {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                eprintln!("❌ {e}");
                eprintln!("   Set it with: export TRIGLOT_ENGINE_URL=http://localhost:9100");
                eprintln!("   Or use --mock to run with deterministic mock engines");
                return Err(e.into());
            }
        }
    };

    // 3. Translate
    let orchestrator = Orchestrator::new(&config, provider)?;
    let result = match matches.get_one::<u64>("timeout") {
        Some(seconds) => {
            orchestrator
                .translate_with_deadline(text, source, target, Duration::from_secs(*seconds))
                .await
        }
        None => orchestrator.translate(text, source, target).await,
    };

    match result {
        Ok(translation) => {
            if verbose {
                println!("🌍 {}", translation.path.join(" → "));
            }
            println!("{}", translation.text);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Translation failed: {e}");
            Err(e.into())
        }
    }
}

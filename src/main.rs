use clap::Parser;
use fuzzdoc::{
    DataDir,
    IndexStore,
    SearchConfig,
    SearchEngine,
    StoreConfig,
    cli::{Cli, Command, IndexArgs, SearchArgs, StatusArgs, TokenizeArgs},
    error,
    search,
    shell,
    tokenize,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("FUZZDOC_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }
    if let Command::Tokenize(args) = &cli.command {
        return cmd_tokenize(args);
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let config = StoreConfig::from_data_dir(&data_dir, cli.corpus.as_deref())
        .with_patterns(cli.patterns.iter().cloned());
    let mut store = IndexStore::new(config)?;

    match cli.command {
        Command::Index(args) => cmd_index(&mut store, &args)?,
        Command::Search(args) => cmd_search(&mut store, &args)?,
        Command::Status(args) => cmd_status(&mut store, &data_dir, &args)?,
        Command::Shell => {
            let engine = SearchEngine::new(SearchConfig::default());
            let stdin = std::io::stdin();
            shell::run(&mut store, &engine, stdin.lock(), &mut std::io::stdout())?;
        }
        Command::Tokenize(_) | Command::Completions(_) => {}
    }

    Ok(())
}

fn cmd_index(store: &mut IndexStore, args: &IndexArgs) -> error::Result<()> {
    let stats = store.build_index(args.full)?;
    if args.json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!("{}", shell::summarize(&stats));
    }
    Ok(())
}

fn cmd_search(store: &mut IndexStore, args: &SearchArgs) -> error::Result<()> {
    if !(0.0..=100.0).contains(&args.threshold) {
        return Err(error::Error::Config(format!(
            "--threshold must be between 0 and 100, got {}",
            args.threshold
        )));
    }

    let config = SearchConfig {
        fuzzy_threshold: args.threshold,
        fuzzy_limit: args.expansions,
        ..SearchConfig::default()
    };
    let mut engine = SearchEngine::new(config);
    if args.no_fuzzy {
        engine = engine.without_fuzzy();
    }

    let hits = engine.search(store, &args.query, args.count);
    if args.json {
        println!("{}", search::format_json(&hits, store.index(), &args.query)?);
    } else {
        println!("{}", search::format_human(&hits, store.index()));
    }
    Ok(())
}

fn cmd_tokenize(args: &TokenizeArgs) -> error::Result<()> {
    let tokens = tokenize(&args.text);
    if args.json {
        println!("{}", serde_json::to_string(&tokens)?);
    } else {
        for token in &tokens {
            println!("{token}");
        }
    }
    Ok(())
}

fn cmd_status(
    store: &mut IndexStore,
    data_dir: &DataDir,
    args: &StatusArgs,
) -> error::Result<()> {
    let status = store.load();
    let index = store.index();
    let config = store.config();

    if args.json {
        let value = serde_json::json!({
            "data_dir": data_dir.root(),
            "corpus": config.corpus_dir,
            "index_file": config.index_file,
            "patterns": config.patterns,
            "documents": index.doc_count(),
            "vocabulary": index.vocab_size(),
            "updated_at": index.updated_at,
            "load_status": format!("{status:?}"),
        });
        println!("{value}");
    } else {
        println!("Data directory: {}", data_dir.root().display());
        println!("Corpus: {}", config.corpus_dir.display());
        println!("Patterns: {}", config.patterns.join(", "));
        println!("Index file: {}", config.index_file.display());
        println!("Documents: {}", index.doc_count());
        println!("Vocabulary: {}", index.vocab_size());
        match index.updated_at {
            Some(ts) => println!("Last build: {ts:.0} (unix seconds)"),
            None => println!("Last build: never"),
        }
    }
    Ok(())
}

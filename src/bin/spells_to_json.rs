use tibia_spells::{catalog, output, RetryPolicy, SpellFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = reqwest::Client::new();

    println!("Getting spell info.");
    let catalog = catalog::fetch_catalog(&client, &SpellFilter::default(), &RetryPolicy::default())
        .await
        .unwrap();
    for failure in &catalog.failures {
        eprintln!("[tibia-spells] skipped {}: {}", failure.url, failure.reason);
    }

    println!("Converting into json.");
    let dir = std::env::current_dir().unwrap().join("json");

    println!("Saving to file at {}", dir.join("spells.json").display());
    output::save_catalog(&catalog.spells, &dir).await.unwrap();

    println!("Finished.");
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).unwrap();
}

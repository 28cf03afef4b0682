use std::io::{self, Write};
use std::path::Path;
use vector_kb_core::{ChromaStore, KnowledgeBase, SearchHit};

const DEFAULT_SEARCH_RESULTS: usize = 5;
const DEFAULT_EXPORT_RESULTS: usize = 10;
const DEFAULT_EXPORT_FILE: &str = "search_results.json";
const PREVIEW_CHARS: usize = 200;

/// Interactive menu over the knowledge base: search, statistics,
/// export, exit.
pub async fn run(kb: &KnowledgeBase<ChromaStore>) -> io::Result<()> {
    print_banner();

    loop {
        println!();
        println!("{}", "=".repeat(60));
        println!("choose an option:");
        println!("1. search the knowledge base");
        println!("2. show statistics");
        println!("3. export search results");
        println!("4. exit");
        println!("{}", "=".repeat(60));

        match prompt("option (1-4): ")?.as_str() {
            "1" => search_loop(kb).await?,
            "2" => show_statistics(kb).await,
            "3" => export_results(kb).await?,
            "4" => {
                println!("goodbye!");
                return Ok(());
            }
            _ => println!("invalid option, try again"),
        }
    }
}

fn print_banner() {
    println!("{}", "=".repeat(60));
    println!("           vector knowledge base console");
    println!("{}", "=".repeat(60));
}

async fn search_loop(kb: &KnowledgeBase<ChromaStore>) -> io::Result<()> {
    println!();
    println!("knowledge base search");
    println!("{}", "-".repeat(30));

    loop {
        let query = prompt("search query (type 'back' for the main menu): ")?;

        if query.eq_ignore_ascii_case("back") {
            return Ok(());
        }

        if query.is_empty() {
            println!("please enter a query");
            continue;
        }

        let top_k = prompt_count(
            &format!("number of results (default {DEFAULT_SEARCH_RESULTS}): "),
            DEFAULT_SEARCH_RESULTS,
        )?;

        println!("\nsearching for '{query}'...");
        let hits = kb.search(&query, top_k).await;

        if hits.is_empty() {
            println!("no results found");
            continue;
        }

        println!("\nfound {} result(s):", hits.len());
        println!("{}", "-".repeat(50));
        print_hits(&hits);

        let export = prompt("\nexport these results to a file? (y/n): ")?;
        if export.eq_ignore_ascii_case("y") {
            let filename = prompt_with_default(
                &format!("file name (default: {DEFAULT_EXPORT_FILE}): "),
                DEFAULT_EXPORT_FILE,
            )?;
            if kb
                .export_search_results(&query, top_k, Path::new(&filename))
                .await
            {
                println!("search results exported to: {filename}");
            } else {
                println!("export failed, see the log for details");
            }
        }
    }
}

async fn show_statistics(kb: &KnowledgeBase<ChromaStore>) {
    println!();
    println!("knowledge base statistics");
    println!("{}", "-".repeat(30));

    let info = kb.collection_info().await;
    println!("collection: {}", info.collection_name);
    println!("documents:  {}", info.total_documents);
}

async fn export_results(kb: &KnowledgeBase<ChromaStore>) -> io::Result<()> {
    println!();
    println!("export search results");
    println!("{}", "-".repeat(30));

    let query = prompt("search query: ")?;
    if query.is_empty() {
        println!("please enter a query");
        return Ok(());
    }

    let top_k = prompt_count(
        &format!("number of results (default {DEFAULT_EXPORT_RESULTS}): "),
        DEFAULT_EXPORT_RESULTS,
    )?;
    let filename = prompt_with_default(
        &format!("output file name (default: {DEFAULT_EXPORT_FILE}): "),
        DEFAULT_EXPORT_FILE,
    )?;

    println!("\nsearching and exporting '{query}'...");
    if kb
        .export_search_results(&query, top_k, Path::new(&filename))
        .await
    {
        println!("search results exported to: {filename}");
    } else {
        println!("export failed, see the log for details");
    }

    Ok(())
}

pub fn print_hits(hits: &[SearchHit]) {
    for (index, hit) in hits.iter().enumerate() {
        println!("\nresult {}:", index + 1);
        println!("  file: {}", metadata_str(hit, "file_name"));
        println!("  type: {}", metadata_str(hit, "file_type"));
        match hit.distance {
            Some(distance) => println!("  similarity: {:.3}", 1.0 - distance),
            None => println!("  similarity: n/a"),
        }
        println!("  text: {}...", preview(&hit.text));
    }
}

fn metadata_str(hit: &SearchHit, key: &str) -> String {
    hit.metadata
        .get(key)
        .and_then(|value| value.as_str())
        .unwrap_or("n/a")
        .to_string()
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_with_default(label: &str, default: &str) -> io::Result<String> {
    let input = prompt(label)?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Empty or non-numeric input silently falls back to the default.
fn prompt_count(label: &str, default: usize) -> io::Result<usize> {
    let input = prompt(label)?;
    Ok(input.parse().unwrap_or(default))
}

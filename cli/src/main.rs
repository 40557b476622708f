//! ojs: command-line interface for the OJS knowledge REST API
//!
//! Resolves searches the same way the dashboard does and prints records,
//! triples or RDF.

use clap::{Parser, Subcommand};
use comfy_table::{Table, ContentArrangement};
use ojs_knowledge::api::{ArticleRecord, RecordSource, RestClient};
use ojs_knowledge::config::{OrcidConfig, ENV_API_URL};
use ojs_knowledge::orcid::{enrich_authors, OrcidClient};
use ojs_knowledge::rdf::{build_triples, RdfExporter, RdfFormat};
use ojs_knowledge::resolver::{QueryResolver, SearchKind, SearchQuery};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ojs", version, about = "OJS knowledge graph CLI")]
struct Cli {
    /// REST API base URL
    #[arg(long, default_value = "http://localhost:8000", global = true, env = ENV_API_URL)]
    url: String,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Search articles
    Search {
        /// article, author, institution or keywords
        kind: SearchKind,
        /// Search term; empty article search lists everything
        #[arg(default_value = "")]
        term: String,
    },
    /// Search and print the resulting triples
    Triples {
        kind: SearchKind,
        #[arg(default_value = "")]
        term: String,
    },
    /// Search and print the resulting triples as RDF
    Export {
        kind: SearchKind,
        #[arg(default_value = "")]
        term: String,

        /// turtle or ntriples
        #[arg(long, default_value = "turtle")]
        rdf: RdfFormat,

        /// Base IRI for expanded URIs
        #[arg(long, default_value = "http://example.org/ojs/")]
        base_iri: String,
    },
    /// Most active sections
    Sections,
    /// Top authors
    Authors {
        /// Look up ORCID profiles
        #[arg(long)]
        enrich: bool,
    },
    /// One article by DOI
    Article { doi: String },
    /// Articles related to a DOI
    Related { doi: String },
    /// Start an interactive REPL
    Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let client = Arc::new(RestClient::new(&cli.url));

    let result = match cli.command {
        Commands::Search { kind, term } => {
            run_search(&client, SearchQuery::new(kind, term), &cli.format).await
        }
        Commands::Triples { kind, term } => {
            run_triples(&client, SearchQuery::new(kind, term), &cli.format).await
        }
        Commands::Export { kind, term, rdf, base_iri } => {
            run_export(&client, SearchQuery::new(kind, term), rdf, &base_iri).await
        }
        Commands::Sections => run_sections(client.as_ref(), &cli.format).await,
        Commands::Authors { enrich } => run_authors(client.as_ref(), enrich, &cli.format).await,
        Commands::Article { doi } => run_article(client.as_ref(), &doi, &cli.format).await,
        Commands::Related { doi } => run_related(client.as_ref(), &doi, &cli.format).await,
        Commands::Shell => run_shell(&client, &cli.format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

async fn resolve(client: &Arc<RestClient>, query: SearchQuery) -> Result<Vec<ArticleRecord>, Box<dyn std::error::Error>> {
    let source: Arc<dyn RecordSource> = client.clone();
    let resolver = QueryResolver::new(source);
    Ok(resolver.resolve(query).await.result?)
}

/// Print rows in the selected format; `json` is used as-is for JSON output
fn print_rows(
    format: &OutputFormat,
    headers: &[&str],
    rows: Vec<Vec<String>>,
    json: serde_json::Value,
) -> CliResult {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Csv => {
            println!("{}", headers.join(","));
            for row in &rows {
                let cells: Vec<String> = row.iter().map(|v| format_csv_value(v)).collect();
                println!("{}", cells.join(","));
            }
        }
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(headers);
            let count = rows.len();
            for row in rows {
                table.add_row(row);
            }

            println!("{}", table);
            println!("{} row(s)", count);
        }
    }
    Ok(())
}

fn article_rows(articles: &[ArticleRecord]) -> Vec<Vec<String>> {
    articles
        .iter()
        .map(|a| vec![
            a.title.clone(),
            a.author.clone(),
            a.doi.clone(),
            a.section.clone().unwrap_or_default(),
            a.institution.clone().unwrap_or_default(),
            a.keywords.clone().unwrap_or_default(),
        ])
        .collect()
}

const ARTICLE_HEADERS: [&str; 6] = ["title", "author", "doi", "section", "institution", "keywords"];

async fn run_search(client: &Arc<RestClient>, query: SearchQuery, format: &OutputFormat) -> CliResult {
    let articles = resolve(client, query).await?;
    print_rows(format, &ARTICLE_HEADERS, article_rows(&articles), serde_json::to_value(&articles)?)
}

async fn run_triples(client: &Arc<RestClient>, query: SearchQuery, format: &OutputFormat) -> CliResult {
    let triples = build_triples(&resolve(client, query).await?);
    let rows = triples
        .iter()
        .map(|t| vec![t.subject.to_string(), t.predicate.to_string(), t.object.to_string()])
        .collect();
    print_rows(format, &["subject", "predicate", "object"], rows, serde_json::to_value(&triples)?)
}

async fn run_export(
    client: &Arc<RestClient>,
    query: SearchQuery,
    format: RdfFormat,
    base_iri: &str,
) -> CliResult {
    let triples = build_triples(&resolve(client, query).await?);
    print!("{}", RdfExporter::new(base_iri).serialize(&triples, format)?);
    Ok(())
}

async fn run_sections(client: &RestClient, format: &OutputFormat) -> CliResult {
    let sections = client.active_sections().await?;
    let rows = sections
        .iter()
        .map(|s| vec![s.seccion.clone(), s.cantidad.to_string()])
        .collect();
    print_rows(format, &["section", "articles"], rows, serde_json::to_value(&sections)?)
}

async fn run_authors(client: &RestClient, enrich: bool, format: &OutputFormat) -> CliResult {
    let authors = client.top_authors().await?;
    let profiles = if enrich {
        let lookup = OrcidClient::from_config(&OrcidConfig::default())?;
        let names: Vec<String> = authors.iter().map(|a| a.autor.clone()).collect();
        enrich_authors(&lookup, &names).await
    } else {
        Default::default()
    };

    let rows = authors
        .iter()
        .map(|a| {
            let profile = profiles.get(&a.autor);
            vec![
                a.autor.clone(),
                a.publicaciones.to_string(),
                profile.and_then(|p| p.country.clone()).unwrap_or_default(),
                profile.and_then(|p| p.biography.clone()).unwrap_or_default(),
            ]
        })
        .collect();
    let json = serde_json::json!({ "authors": authors, "profiles": profiles });
    print_rows(format, &["author", "publications", "country", "biography"], rows, json)
}

async fn run_article(client: &RestClient, doi: &str, format: &OutputFormat) -> CliResult {
    match client.article_by_doi(doi).await? {
        Some(detail) => {
            let rows = vec![vec![
                detail.titulo.clone(),
                detail.autor.clone(),
                detail.url.clone(),
                detail.resumen.clone(),
            ]];
            print_rows(format, &["title", "author", "url", "abstract"], rows, serde_json::to_value(&detail)?)
        }
        None => {
            println!("No article with DOI {}", doi);
            Ok(())
        }
    }
}

async fn run_related(client: &RestClient, doi: &str, format: &OutputFormat) -> CliResult {
    let articles = client.related_articles(doi).await?;
    print_rows(format, &ARTICLE_HEADERS, article_rows(&articles), serde_json::to_value(&articles)?)
}

async fn run_shell(client: &Arc<RestClient>, format: &OutputFormat) -> CliResult {
    println!("OJS Interactive Shell");
    println!("Type kind:term searches, or :help for commands. :quit to exit.\n");

    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        eprint!("ojs> ");

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed {
            ":quit" | ":exit" | ":q" => break,
            ":help" | ":h" => {
                println!("Commands:");
                println!("  :sections     Most active sections");
                println!("  :authors      Top authors");
                println!("  :quit         Exit shell");
                println!("  <kind>:<term> Search, e.g. autor:Ana or institution:MIT");
            }
            ":sections" => {
                if let Err(e) = run_sections(client.as_ref(), format).await {
                    eprintln!("Error: {}", e);
                }
            }
            ":authors" => {
                if let Err(e) = run_authors(client.as_ref(), false, format).await {
                    eprintln!("Error: {}", e);
                }
            }
            input => match input.parse::<SearchQuery>() {
                Ok(query) => {
                    if let Err(e) = run_search(client, query, format).await {
                        eprintln!("Error: {}", e);
                    }
                }
                Err(e) => eprintln!("Error: {}", e),
            },
        }
    }

    println!("Bye!");
    Ok(())
}

fn format_csv_value(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

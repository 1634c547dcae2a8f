use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use page_extract_cli::{
    fetch::{FetchOptions, HttpFetcher, PageFetcher, RelayClient},
    page::analyze_page,
    text::{html_to_simple_text, html_to_text},
    utils, PageContext, ProcessorRegistry,
};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract lists, articles and page structure from web pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the listing rows of a supported site
    List(Source),
    /// Extract the article of a supported site's detail page
    Article(Source),
    /// Metadata and structure of any page
    Analyze(Source),
    /// Convert a page or HTML file to plain text
    Text {
        #[command(flatten)]
        source: Source,
        /// Line breaks only, no bullets, links or fences
        #[arg(long)]
        simple: bool,
    },
    /// Tell whether a URL is a listing or a detail page of a supported site
    Classify {
        #[arg(short, long)]
        url: String,
    },
    /// Domains with a site processor
    Domains,
}

#[derive(Args, Debug)]
struct Source {
    /// Page URL; fetched unless --file is given
    #[arg(short, long)]
    url: String,

    /// Read the page markup from a local file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Fetch through a relay endpoint instead of directly
    #[arg(long, env = "RELAY_URL")]
    relay: Option<String>,

    /// Request timeout in seconds for direct fetches
    #[arg(long)]
    timeout: Option<u64>,

    /// Extra attempts for transient fetch failures
    #[arg(long, default_value_t = 0)]
    retries: usize,
}

impl Source {
    async fn load(&self) -> anyhow::Result<PageContext> {
        let html = match &self.file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
            None => {
                let fetcher: Box<dyn PageFetcher> = match &self.relay {
                    Some(endpoint) => Box::new(RelayClient::new(endpoint.clone())),
                    None => Box::new(HttpFetcher::new(FetchOptions {
                        timeout: self.timeout.map(Duration::from_secs),
                        retries: self.retries,
                        ..FetchOptions::default()
                    })?),
                };
                fetcher.fetch_html(&self.url).await?
            }
        };
        Ok(PageContext::new(self.url.clone(), html))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    utils::init_tracing();

    let cli = Cli::parse();
    let output = cli.output.as_deref();
    let registry = ProcessorRegistry::with_defaults();

    match cli.command {
        Command::List(source) => {
            let page = source.load().await?;
            if !registry.is_processor_available(&page) {
                bail!("no processor for {}; supported: {:?}", page.url, registry.supported_domains());
            }
            let items = registry.try_extract_current_list(&page)?;
            utils::save_json(&items, output)?;
        }
        Command::Article(source) => {
            let page = source.load().await?;
            let Some(article) = registry.try_extract_current_article(&page)? else {
                bail!("no article content found at {}", page.url);
            };
            utils::save_json(&article, output)?;
        }
        Command::Analyze(source) => {
            let page = source.load().await?;
            let content = analyze_page(&page).await;
            utils::save_json(&content, output)?;
        }
        Command::Text { source, simple } => {
            let page = source.load().await?;
            let text = if simple {
                html_to_simple_text(&page.html)
            } else {
                html_to_text(&page.html)
            };
            utils::save_text(&text, output)?;
        }
        Command::Classify { url } => {
            let kind = registry.page_kind(&url);
            let supported = registry.processor_for(&url).is_some();
            utils::save_json(&json!({ "url": url, "supported": supported, "kind": kind }), output)?;
        }
        Command::Domains => {
            utils::save_json(&json!({ "domains": registry.supported_domains() }), output)?;
        }
    }

    Ok(())
}

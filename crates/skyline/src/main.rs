use std::sync::Arc;

use clap::{Parser, Subcommand};
use skyline::client::{CredentialKey, Error, FileCredentialStore, PostData, SessionManager};
use skyline::common::session::SessionStore;
use skyline::common::types::collection::split_at_uri;
use skyline::config::Config;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "Skyline - resilient AT Protocol client demo")]
struct Args {
    /// Account DID or handle (e.g., did:plc:abc123)
    #[arg(short, long)]
    account: String,

    /// App password
    #[arg(short, long)]
    password: String,

    /// Account host; overrides SKYLINE_PDS
    #[arg(long)]
    pds: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in (or reuse the cached session) and show where the account lives
    Whoami,
    /// Publish a post; links, mentions and hashtags become facets
    Post {
        /// Post text
        text: String,
        /// `at://` URI of a post to quote
        #[arg(long)]
        quote: Option<String>,
    },
    /// Like a post
    Like {
        /// Author DID or handle
        repo: String,
        /// Record key of the post
        rkey: String,
    },
    /// Search repositories through the moderation service
    SearchRepos {
        /// Search term
        query: String,
        /// Maximum results
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Delete the cached credentials for this account
    Logout,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(pds) = args.pds {
        config.pds = pds;
    }

    let store = Arc::new(FileCredentialStore::new(&config.cache_dir));
    if let Command::Logout = args.command {
        let key = CredentialKey::new(config.pds.clone(), &args.account);
        store.del(&key).await.map_err(Error::from)?;
        println!("credentials removed");
        return Ok(());
    }

    let manager = SessionManager::new(store, Arc::new(reqwest::Client::new()));
    let client = manager
        .obtain_client(&args.account, &args.password, config)
        .await?;

    match args.command {
        Command::Whoami => {
            let record = client.record().await;
            println!(
                "logged in as {} ({})",
                record.session.handle, record.session.did
            );
            println!("data host: {}", record.endpoints.data_host);
            match &record.endpoints.moderation_host {
                Some(moderation) => println!("moderation proxy: {}", moderation.atproto_proxy),
                None => println!("moderation proxy: none"),
            }
        }
        Command::Post { text, quote } => {
            let quote = match quote {
                Some(uri) => {
                    let (repo, _, rkey) = split_at_uri(&uri)
                        .ok_or_else(|| Error::InvalidInput(format!("not a record uri: {uri}")))?;
                    Some(client.post_ref(repo, rkey).await?)
                }
                None => None,
            };
            let out = client
                .create_post(PostData::new().text(text).maybe_quote(quote).build())
                .await?;
            println!("posted {} ({})", out.uri, out.cid);
        }
        Command::Like { repo, rkey } => {
            let out = client.like(&repo, &rkey).await?;
            println!("liked: {}", out.uri);
        }
        Command::SearchRepos { query, limit } => {
            let out = client.search_repos(&query, None, limit).await?;
            println!("{} repos matching {query:?}:", out.repos.len());
            for repo in out.repos {
                println!("  {} {}", repo.did, repo.handle);
            }
        }
        // Handled before login.
        Command::Logout => {}
    }

    Ok(())
}

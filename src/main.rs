use clap::{Parser, Subcommand};
use makoto_lib::bookmarks::BookmarkKind;
use makoto_lib::commands;
use makoto_lib::outbound::{LinkType, OutboundClickPayload, PageContext};
use makoto_lib::schema::SchemaKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "makoto")]
#[command(about = "Comment previews, form validation and click tracking for the Makoto Club store guide")]
#[command(version = VERSION)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join comment fragments within a character limit
    Comment {
        /// Comment fragments (read from stdin, one per line, when omitted)
        fragments: Vec<String>,
        /// Character limit (defaults to the configured comment limit)
        #[arg(long)]
        limit: Option<usize>,
        /// Cut an oversized first fragment instead of keeping it whole
        #[arg(long)]
        strict: bool,
        /// Print the gallery caption, with a placeholder when empty
        #[arg(long)]
        caption: bool,
    },

    /// Build a card preview cut at exactly the limit
    Preview {
        /// Comment fragments (read from stdin, one per line, when omitted)
        fragments: Vec<String>,
        /// Character limit (defaults to the configured preview limit)
        #[arg(long)]
        limit: Option<usize>,
        /// Mark the preview as continued even when nothing was cut
        #[arg(long)]
        always_ellipsis: bool,
        /// Print the preview as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a store or survey JSON document
    Validate {
        /// Form schema to check against
        #[arg(value_enum)]
        kind: SchemaKind,
        /// JSON file (`-` for stdin)
        file: PathBuf,
    },

    /// Send an outbound-click beacon to the API
    Track {
        #[arg(long)]
        store_id: String,
        #[arg(long, default_value = "")]
        store_name: String,
        /// recruitment, official, line, x, bsky, phone, email
        #[arg(long)]
        link_type: LinkType,
        #[arg(long)]
        target_url: String,
        /// Page path the click happened on
        #[arg(long, default_value = "/")]
        path: String,
        #[arg(long)]
        referrer: Option<String>,
        /// Cookie header of the page (for the session id)
        #[arg(long)]
        cookie: Option<String>,
        /// Page query string (for UTM parameters)
        #[arg(long)]
        query: Option<String>,
    },

    /// Manage local bookmarks
    Bookmark {
        #[command(subcommand)]
        command: BookmarkCommands,
    },

    /// Run the HTTP API server
    Serve {
        /// Port (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Display version information
    Version,
}

#[derive(Subcommand)]
enum BookmarkCommands {
    /// List bookmarked ids
    List {
        #[arg(long, value_enum, default_value = "store")]
        kind: BookmarkKind,
    },
    /// Add an id, or remove it if already bookmarked
    Toggle {
        id: String,
        #[arg(long, value_enum, default_value = "store")]
        kind: BookmarkKind,
    },
    /// Remove every bookmark of a kind
    Clear {
        #[arg(long, value_enum, default_value = "store")]
        kind: BookmarkKind,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Comment { fragments, limit, strict, caption } => {
            commands::comment::run(fragments, limit, strict, caption)
        }
        Commands::Preview { fragments, limit, always_ellipsis, json } => {
            commands::comment::preview(fragments, limit, always_ellipsis, json)
        }
        Commands::Validate { kind, file } => commands::validate::run(kind, &file),
        Commands::Track {
            store_id,
            store_name,
            link_type,
            target_url,
            path,
            referrer,
            cookie,
            query,
        } => commands::track::run(
            OutboundClickPayload {
                store_id,
                store_name,
                link_type,
                target_url,
            },
            PageContext {
                path,
                referrer,
                cookie_header: cookie,
                query,
            },
        ),
        Commands::Bookmark { command } => match command {
            BookmarkCommands::List { kind } => commands::bookmark::list(kind),
            BookmarkCommands::Toggle { id, kind } => commands::bookmark::toggle(kind, id),
            BookmarkCommands::Clear { kind } => commands::bookmark::clear(kind),
        },
        Commands::Serve { port } => commands::serve::run(port),
        Commands::Version => {
            println!("Makoto v{}", VERSION);
            println!("Store guide tooling for comment previews and click analytics");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

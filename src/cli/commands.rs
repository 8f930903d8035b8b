use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedwatch")]
#[command(about = "Watch collections of RSS/Atom feeds and open the ones that changed")]
#[command(version)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "FEEDWATCH_DB_PATH")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, empty collection
    AddCollection {
        title: String,
    },

    /// Delete a collection with all of its feeds
    RemoveCollection {
        /// Collection id or title
        collection: String,
    },

    /// Add a feed to a collection
    Add {
        /// Collection id or title
        collection: String,

        /// Feed URL
        url: String,

        /// Display title (defaults to the channel title)
        #[arg(short, long)]
        title: Option<String>,

        /// Store the feed without downloading it first
        #[arg(long)]
        no_verify: bool,
    },

    /// Remove a feed
    Remove {
        /// Feed id as shown by `list`
        feed: String,
    },

    /// List collections, their feeds and each feed's state
    List,

    /// Refresh read and failed feeds and report how many were updated
    Check {
        /// Collection id or title
        collection: String,
    },

    /// Open every unread feed of a collection
    Open {
        /// Collection id or title
        collection: String,
    },

    /// Merge every unread feed of a collection into one document
    Unify {
        /// Collection id or title
        collection: String,
    },

    /// Refresh and open a single feed
    OpenFeed {
        /// Feed id as shown by `list`
        feed: String,
    },

    /// Mark a feed as read
    MarkRead {
        /// Feed id, or a collection with --all
        target: String,

        /// Mark every feed of the collection
        #[arg(long)]
        all: bool,
    },

    /// Mark a feed as updated (unread)
    MarkUpdated {
        /// Feed id, or a collection with --all
        target: String,

        /// Mark every feed of the collection
        #[arg(long)]
        all: bool,
    },

    /// Import feeds from an OPML file
    Import {
        /// Path to OPML file
        path: String,

        /// Collection for feeds outside any folder
        #[arg(short, long, default_value = "Imported")]
        collection: String,
    },

    /// Export all collections as OPML
    Export {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show or change batch settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print every setting with its current value
    Show,

    /// Change a setting
    Set {
        /// asynchronousFeedChecking, showFeedUpdatePopup or renderFeeds
        key: String,

        #[arg(action = ArgAction::Set)]
        value: bool,
    },
}

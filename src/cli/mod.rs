//! Command-line interface for vidshelf.
//!
//! The CLI is the request layer: it resolves the acting user from
//! `--user`/`--password` (or `VIDSHELF_USER`/`VIDSHELF_PASSWORD`) and then
//! calls into the library on that user's behalf.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::MediaFetcher;
use crate::config::{self, ResolvedConfig};
use crate::domain::{UserId, Video, VideoId};
use crate::library::{LibraryService, LibraryStore, MediaStorage, OwnershipPolicy};
use crate::users::{UserDirectory, MAX_USERS};

pub mod playlist;

use playlist::{truncate, PlaylistCommands};

/// vidshelf - personal video library
#[derive(Parser, Debug)]
#[command(name = "vidshelf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Username to act as
    #[arg(short, long, global = true, env = "VIDSHELF_USER")]
    pub user: Option<String>,

    /// Password for --user
    #[arg(short, long, global = true, env = "VIDSHELF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account for --user with --password
    Register,

    /// Delete the --user account and everything it owns
    Unregister,

    /// Download a video from a URL into your library
    Fetch {
        /// Source URL
        url: String,
    },

    /// List your videos
    Videos,

    /// Delete a video and its file
    DeleteVideo {
        /// Video ID
        video_id: String,
    },

    /// Print the file path of a video (for playback)
    Path {
        /// Video ID
        video_id: String,
    },

    /// Manage playlists
    Playlist {
        #[command(subcommand)]
        command: PlaylistCommands,
    },

    /// List registered usernames
    Users,

    /// Show resolved configuration (debug)
    Config,
}

/// Everything a logged-in command needs
pub struct Session {
    pub config: &'static ResolvedConfig,
    pub directory: UserDirectory,
    pub library: LibraryService,
    pub actor: UserId,
    pub username: String,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Config => show_config(),
            Commands::Users => list_users().await,
            Commands::Register => {
                let (username, password) = credentials(&self.user, &self.password)?;
                register(username, password).await
            }
            Commands::Unregister => {
                let session = login(&self.user, &self.password).await?;
                unregister(session).await
            }
            Commands::Fetch { url } => {
                let session = login(&self.user, &self.password).await?;
                fetch(&session, &url).await
            }
            Commands::Videos => {
                let session = login(&self.user, &self.password).await?;
                let videos = session.library.list_videos(&session.actor).await;
                print_videos(&videos);
                Ok(())
            }
            Commands::DeleteVideo { video_id } => {
                let session = login(&self.user, &self.password).await?;
                session
                    .library
                    .delete_video(&session.actor, &VideoId::new(video_id))
                    .await?;
                Ok(())
            }
            Commands::Path { video_id } => {
                let session = login(&self.user, &self.password).await?;
                let path = session
                    .library
                    .media_path(&session.actor, &VideoId::new(video_id))
                    .await?;
                println!("{}", path.display());
                Ok(())
            }
            Commands::Playlist { command } => {
                let session = login(&self.user, &self.password).await?;
                playlist::execute(&session, command).await
            }
        }
    }
}

/// Both credentials or an error naming the missing one
fn credentials<'a>(user: &'a Option<String>, password: &'a Option<String>) -> Result<(&'a str, &'a str)> {
    let user = user
        .as_deref()
        .context("No user given. Use --user or set VIDSHELF_USER")?;
    let password = password
        .as_deref()
        .context("No password given. Use --password or set VIDSHELF_PASSWORD")?;
    Ok((user, password))
}

fn open_directory(config: &ResolvedConfig) -> Result<UserDirectory> {
    UserDirectory::open(config.users_path()).context("Failed to load user directory")
}

/// Authenticate and open the library
async fn login(user: &Option<String>, password: &Option<String>) -> Result<Session> {
    let (user, password) = credentials(user, password)?;
    let config = config::config()?;

    let store = LibraryStore::open(&config.home)
        .with_context(|| format!("Failed to open data directory: {}", config.home.display()))?;

    let directory = open_directory(config)?;
    let (actor, username) = directory
        .authenticate(user, password)
        .await
        .context("Login failed")?;

    let media = MediaStorage::new(&config.media);
    let library = LibraryService::open(store, media, OwnershipPolicy::new(config.ownership))
        .context("Failed to load library")?;

    Ok(Session {
        config,
        directory,
        library,
        actor,
        username,
    })
}

async fn register(username: &str, password: &str) -> Result<()> {
    let config = config::config()?;
    // Hold the data directory lock while the directory changes
    let _store = LibraryStore::open(&config.home)
        .with_context(|| format!("Failed to open data directory: {}", config.home.display()))?;

    let directory = open_directory(config)?;
    let id = directory.register(username, password).await?;

    println!("Registered {} ({})", username.trim(), id);
    Ok(())
}

async fn unregister(session: Session) -> Result<()> {
    session
        .library
        .purge_owner(&session.actor)
        .await
        .context("Failed to remove owned content")?;
    session.directory.delete(&session.actor).await?;

    println!("Deleted account {}", session.username);
    Ok(())
}

async fn fetch(session: &Session, url: &str) -> Result<()> {
    session
        .library
        .media()
        .ensure_dir()
        .await
        .context("Failed to create media directory")?;

    let fetcher = session.config.fetcher.build();
    let media = fetcher
        .fetch(url, session.library.media().dir())
        .await
        .with_context(|| format!("{} could not fetch {}", fetcher.name(), url))?;

    let video = session
        .library
        .add_video(&session.actor, media.into())
        .await?;

    println!("Added {} ({})", video.title, video.id);
    Ok(())
}

async fn list_users() -> Result<()> {
    let config = config::config()?;
    let directory = open_directory(config)?;
    let users = directory.list().await;

    println!("{}/{} accounts", users.len(), MAX_USERS);
    for user in users {
        println!("  {}", user.username);
    }
    Ok(())
}

fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("Data directory: {}", config.home.display());
    println!("Media directory: {}", config.media.display());
    println!("Ownership mode: {}", config.ownership);
    println!("Videos: {}", config.videos_path().display());
    println!("Playlists: {}", config.playlists_path().display());
    println!("Users: {}", config.users_path().display());
    println!(
        "Fetcher: {} (format {}, timeout {}s)",
        config.fetcher.binary, config.fetcher.format, config.fetcher.timeout_seconds
    );
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none)"),
    }
    Ok(())
}

/// Print a table of videos
pub(crate) fn print_videos(videos: &[Video]) {
    if videos.is_empty() {
        println!("No videos");
        return;
    }

    println!("{:<38} {:<40} {:<12}", "VIDEO ID", "TITLE", "TYPE");
    println!("{}", "-".repeat(92));
    for video in videos {
        println!(
            "{:<38} {:<40} {:<12}",
            video.id,
            truncate(&video.title, 40),
            video.mime
        );
    }
}

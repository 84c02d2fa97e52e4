// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Args, Parser, Subcommand};
use snafu::Whatever;
use tracing::info;
use watchlater_app::{AddRequest, App, AppConfig};
use watchlater_common_telemetry as telemetry;
use watchlater_core::{EntryId, SortOption, ViewMode};

mod build_info;

#[derive(Debug, Parser)]
#[clap(
name = "watchlater",
about = "Keep and browse a watch-later list of video links",
author = build_info::AUTHOR,
version = build_info::VERSION,
long_version = build_info::LONG_VERSION)]
struct Cli {
    /// Data directory override; config, token and logs live under it
    #[arg(long, global = true)]
    data_dir: Option<std::path::PathBuf>,

    /// Log level filter, e.g. `debug` or `info,reqwest=warn`
    #[arg(long, global = true, value_parser = parse_log_level)]
    log_level: Option<String>,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    List(ListArgs),
    Add(AddArgs),
    Delete(DeleteArgs),
    Login(LoginArgs),
    Logout(LogoutArgs),
    Whoami(WhoamiArgs),
}

#[derive(Debug, Clone, Args)]
#[command(flatten_help = true)]
#[command(long_about = r"

Shows the playlists. Signed in, the playlist view lists your own entries as
cards; the feed view and anonymous sessions show a table of everything.
Examples:

watchlater list
watchlater list --sort contentAsc
watchlater list --view feed

")]
struct ListArgs {
    /// One of dateDesc, dateAsc, contentAsc, contentDesc
    #[arg(long, value_parser = parse_sort)]
    sort: Option<SortOption>,

    /// playlists or feed
    #[arg(long, default_value = "playlists", value_parser = parse_view)]
    view: ViewMode,
}

impl ListArgs {
    async fn run(self, app: &App) -> Result<String, Whatever> {
        app.list(self.sort, self.view).await
    }
}

#[derive(Debug, Clone, Args)]
#[command(flatten_help = true)]
#[command(long_about = r"

Adds a playlist entry. The platform is derived from the source URL; a
missing date or time defaults to now.
Examples:

watchlater add --content 'Conference talk' --sauce https://youtu.be/abc
watchlater add --content Jam --sauce https://vimeo.com/1 --date 2024-06-01 --time 18:00

")]
struct AddArgs {
    #[arg(long)]
    content: String,

    /// Source URL of the video
    #[arg(long)]
    sauce: String,

    /// YYYY-MM-DD
    #[arg(long)]
    date: Option<String>,

    /// HH:MM
    #[arg(long)]
    time: Option<String>,
}

impl AddArgs {
    async fn run(self, app: &App) -> Result<String, Whatever> {
        app.add(AddRequest {
            content: self.content,
            sauce:   self.sauce,
            date:    self.date,
            time:    self.time,
        })
        .await
    }
}

#[derive(Debug, Clone, Args)]
#[command(flatten_help = true)]
#[command(long_about = r"

Deletes a playlist entry by id.
Examples:

watchlater delete 42

")]
struct DeleteArgs {
    id: EntryId,
}

impl DeleteArgs {
    async fn run(self, app: &App) -> Result<String, Whatever> { app.delete(self.id).await }
}

#[derive(Debug, Clone, Args)]
#[command(flatten_help = true)]
#[command(long_about = r"

Checks a session token with the identity service and saves it.
Examples:

watchlater login eyJhbGciOi...

")]
struct LoginArgs {
    token: String,
}

impl LoginArgs {
    async fn run(self, app: &App) -> Result<String, Whatever> { app.login(&self.token).await }
}

/// Forgets the saved session token.
#[derive(Debug, Clone, Args)]
struct LogoutArgs {}

impl LogoutArgs {
    async fn run(self, app: &App) -> Result<String, Whatever> { app.logout().await }
}

/// Prints the id of the signed-in user.
#[derive(Debug, Clone, Args)]
struct WhoamiArgs {}

impl WhoamiArgs {
    async fn run(self, app: &App) -> Result<String, Whatever> { app.whoami().await }
}

fn parse_sort(value: &str) -> Result<SortOption, String> {
    SortOption::parse(value).map_err(|e| e.to_string())
}

fn parse_log_level(value: &str) -> Result<String, String> {
    telemetry::parse_level(value).map(|_| value.to_owned())
}

fn parse_view(value: &str) -> Result<ViewMode, String> {
    value
        .parse()
        .map_err(|_| format!("unknown view {value:?}, expected playlists or feed"))
}

#[tokio::main]
async fn main() -> Result<(), Whatever> {
    human_panic::setup_panic!();
    let cli = Cli::parse();

    if let Some(dir) = &cli.data_dir {
        watchlater_paths::set_custom_data_dir(dir);
    }
    let mut config = AppConfig::load(watchlater_paths::config_file())?.with_default_log_dir();
    if let Some(level) = cli.log_level {
        config.logging.level = Some(level);
    }

    let _guards = telemetry::logging::init_global_logging("watchlater", &config.logging);
    telemetry::panic_hook::set_panic_hook();
    info!(version = build_info::VERSION, "starting");

    let app = config.open().await?;
    let output = match cli.commands {
        Commands::List(args) => args.run(&app).await,
        Commands::Add(args) => args.run(&app).await,
        Commands::Delete(args) => args.run(&app).await,
        Commands::Login(args) => args.run(&app).await,
        Commands::Logout(args) => args.run(&app).await,
        Commands::Whoami(args) => args.run(&app).await,
    }?;
    print!("{output}");
    Ok(())
}

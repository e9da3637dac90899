use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "plango", about = "Plan & Go command-line client")]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "plango.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Sign out every other session of this account.
    RevokeAll,
    #[command(subcommand)]
    Profile(ProfileCommand),
    #[command(subcommand)]
    Trips(TripsCommand),
    #[command(subcommand)]
    Members(MembersCommand),
    #[command(subcommand)]
    Messages(MessagesCommand),
    #[command(subcommand)]
    Comments(CommentsCommand),
    /// Run the in-memory stub backend.
    ServeStub {
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    /// Look up another user by id.
    User { user_id: i64 },
    Update(ProfileArgs),
    Delete,
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub about: String,
    #[arg(long, default_value = "")]
    pub telegram: String,
    #[arg(long, default_value = "")]
    pub birthday: String,
    #[arg(long, default_value = "")]
    pub avatar_url: String,
}

#[derive(Subcommand, Debug)]
pub enum TripsCommand {
    List(PageArgs),
    /// Trips that already ended.
    Archive,
    Create(TripArgs),
    Show { trip_id: i64 },
    Update {
        trip_id: i64,
        #[command(flatten)]
        trip: TripUpdateArgs,
    },
    Delete { trip_id: i64 },
}

#[derive(Args, Debug)]
pub struct PageArgs {
    #[arg(long, default_value_t = 0)]
    pub skip: u32,
    #[arg(long, default_value_t = 100)]
    pub limit: u32,
}

#[derive(Args, Debug)]
pub struct TripArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub destination: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub budget: Option<f64>,
}

#[derive(Args, Debug)]
pub struct TripUpdateArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub destination: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub budget: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum MembersCommand {
    List { trip_id: i64 },
    Join {
        trip_id: i64,
        #[arg(long)]
        message: Option<String>,
    },
    /// Change a member's role (organizer, member or viewer).
    Role {
        trip_id: i64,
        user_id: i64,
        role: String,
    },
    /// Remove a member; your own id leaves the trip.
    Remove { trip_id: i64, user_id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum MessagesCommand {
    List {
        trip_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    Send { trip_id: i64, content: String },
}

#[derive(Subcommand, Debug)]
pub enum CommentsCommand {
    List {
        trip_id: i64,
        #[command(flatten)]
        page: PageArgs,
    },
    Add { trip_id: i64, content: String },
    Delete { comment_id: i64 },
}

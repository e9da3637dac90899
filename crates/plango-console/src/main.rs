#![allow(non_snake_case)]

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use plango_client::{
    config, ApiClient, ApiError, FileStorage, Paging, ProfileDraft, RegisterForm, Session,
    TripQuery,
};
use plango_types::{JoinRequest, MemberRole, TripCreate, TripUpdate};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::{
    Cli, Command, CommentsCommand, MembersCommand, MessagesCommand, ProfileCommand, TripsCommand,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let defaultLevel = if matches!(cli.command, Command::ServeStub { .. }) {
        "info"
    } else {
        "warn"
    };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(defaultLevel)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Command::ServeStub { bind } = &cli.command {
        return match serve_stub(bind).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let appConfig = config::load(&cli.config);
    tracing::debug!(
        "loaded config from {}: api={} storage={}",
        cli.config.display(),
        appConfig.api.base_url,
        appConfig.storage.path.display()
    );

    let storage = Arc::new(FileStorage::open(appConfig.storage.path.clone()));
    let session = Arc::new(Session::new(storage));
    let client = match ApiClient::new(&appConfig.api, session) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve_stub(bind: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!("stub backend listening on {}", listener.local_addr()?);
    plango_stub::serve(listener, plango_stub::StubState::new()).await
}

async fn run(client: &ApiClient, command: Command) -> Result<(), ApiError> {
    match command {
        Command::Register {
            email,
            password,
            confirm_password,
            name,
        } => {
            let request = RegisterForm {
                name,
                email,
                password,
                confirm_password,
            }
            .validate()?;
            let response = client.auth().register(&request).await?;
            println!("registered as {}", response.user.display_name());
        }
        Command::Login { email, password } => {
            let response = client.auth().login(&email, &password).await?;
            println!("logged in as {}", response.user.display_name());
        }
        Command::Logout => {
            client.auth().logout().await?;
            println!("logged out");
        }
        Command::Whoami => {
            if !client.session().is_authenticated() {
                return Err(ApiError::Validation("not logged in".into()));
            }
            print_json(&client.auth().me().await?);
        }
        Command::RevokeAll => print_json(&client.auth().revoke_all().await?),
        Command::Profile(command) => run_profile(client, command).await?,
        Command::Trips(command) => run_trips(client, command).await?,
        Command::Members(command) => run_members(client, command).await?,
        Command::Messages(command) => match command {
            MessagesCommand::List { trip_id, page } => {
                let paging = Paging {
                    skip: page.skip,
                    limit: page.limit,
                };
                print_json(&client.messages().list(trip_id, paging).await?);
            }
            MessagesCommand::Send { trip_id, content } => {
                print_json(&client.messages().send(trip_id, &content).await?);
            }
        },
        Command::Comments(command) => match command {
            CommentsCommand::List { trip_id, page } => {
                let paging = Paging {
                    skip: page.skip,
                    limit: page.limit,
                };
                print_json(&client.comments().list(trip_id, paging).await?);
            }
            CommentsCommand::Add { trip_id, content } => {
                print_json(&client.comments().add(trip_id, &content).await?);
            }
            CommentsCommand::Delete { comment_id } => {
                client.comments().remove(comment_id).await?;
                println!("comment {comment_id} deleted");
            }
        },
        Command::ServeStub { .. } => {
            return Err(ApiError::Validation("serve-stub does not use the API client".into()));
        }
    }
    Ok(())
}

async fn run_profile(client: &ApiClient, command: ProfileCommand) -> Result<(), ApiError> {
    match command {
        ProfileCommand::Show => print_json(&client.users().me().await?),
        ProfileCommand::User { user_id } => print_json(&client.users().get(user_id).await?),
        ProfileCommand::Update(args) => {
            let update = ProfileDraft {
                name: args.name,
                about: args.about,
                telegram: args.telegram,
                birthday: args.birthday,
                avatar_url: args.avatar_url,
            }
            .into_update();
            if update.is_empty() {
                return Err(ApiError::Validation("nothing to update".into()));
            }
            print_json(&client.users().update_me(&update).await?);
        }
        ProfileCommand::Delete => {
            client.users().delete_me().await?;
            println!("account deleted");
        }
    }
    Ok(())
}

async fn run_trips(client: &ApiClient, command: TripsCommand) -> Result<(), ApiError> {
    match command {
        TripsCommand::List(page) => {
            let query = TripQuery::paged(Paging {
                skip: page.skip,
                limit: page.limit,
            });
            print_json(&client.trips().list(&query).await?);
        }
        TripsCommand::Archive => {
            let today = chrono::Local::now().date_naive();
            let trips = client.trips().archived(&TripQuery::default(), today).await?;
            if trips.is_empty() {
                println!("no finished trips yet");
            }
            for trip in trips {
                let ended = trip.end_date.map(|d| d.to_string()).unwrap_or_default();
                println!("#{} {} ({}) ended {ended}", trip.id, trip.title, trip.destination);
            }
        }
        TripsCommand::Create(args) => {
            let trip = TripCreate {
                title: args.title,
                description: args.description,
                destination: args.destination,
                start_date: args.start,
                end_date: args.end,
                budget_total: args.budget,
            };
            print_json(&client.trips().create(&trip).await?);
        }
        TripsCommand::Show { trip_id } => print_json(&client.trips().get(trip_id).await?),
        TripsCommand::Update { trip_id, trip } => {
            let update = TripUpdate {
                title: trip.title,
                description: trip.description,
                destination: trip.destination,
                start_date: trip.start,
                end_date: trip.end,
                budget_total: trip.budget,
            };
            print_json(&client.trips().update(trip_id, &update).await?);
        }
        TripsCommand::Delete { trip_id } => {
            client.trips().remove(trip_id).await?;
            println!("trip {trip_id} deleted");
        }
    }
    Ok(())
}

async fn run_members(client: &ApiClient, command: MembersCommand) -> Result<(), ApiError> {
    match command {
        MembersCommand::List { trip_id } => print_json(&client.members().list(trip_id).await?),
        MembersCommand::Join { trip_id, message } => {
            let request = JoinRequest { trip_id, message };
            print_json(&client.members().join(trip_id, &request).await?);
        }
        MembersCommand::Role {
            trip_id,
            user_id,
            role,
        } => {
            let role = MemberRole::from(role);
            print_json(&client.members().update_role(trip_id, user_id, &role).await?);
        }
        MembersCommand::Remove { trip_id, user_id } => {
            client.members().remove(trip_id, user_id).await?;
            println!("member {user_id} removed from trip {trip_id}");
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::warn!("failed to render response: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serve_stub_is_rejected_by_the_client_dispatcher() {
        let client = ApiClient::in_memory("http://127.0.0.1:9").unwrap();
        let command = Command::ServeStub {
            bind: "127.0.0.1:0".into(),
        };

        let err = run(&client, command).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}

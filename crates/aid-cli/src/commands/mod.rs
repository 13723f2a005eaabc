use std::path::PathBuf;

use clap::{Args, Subcommand};

use aid_types::{ConversationId, HelpRequestId};

use crate::App;

mod account;
mod chat;
mod conversations;
mod requests;

#[derive(Subcommand)]
pub enum Command {
    /// Log in and remember the session
    Login(LoginArgs),
    /// Create an account
    Signup(SignupArgs),
    /// End the session on the server and forget it locally
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List open help requests
    Requests,
    /// Post a new help request
    Submit(SubmitArgs),
    /// Take on a help request and open a conversation with its requester
    Assign { help_request_id: HelpRequestId },
    /// List your conversations
    Conversations,
    /// Mark the request behind a conversation as complete
    Complete { conversation_id: ConversationId },
    /// Put a request back on the board once enough helpers are assigned
    Republish { conversation_id: ConversationId },
    /// Open a conversation: new messages are printed, each stdin line is sent
    Chat { conversation_id: ConversationId },
    /// Show how many requests the community has completed
    Stats {
        /// Keep polling and print every change
        #[arg(long)]
        watch: bool,
    },
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "AID_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct SignupArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "AID_PASSWORD", hide_env_values = true)]
    pub password: String,
    /// Defaults to --password
    #[arg(long)]
    pub password_confirmation: Option<String>,
    /// Photo ID to upload with the registration
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

#[derive(Args)]
pub struct SubmitArgs {
    #[arg(long)]
    pub title: String,
    /// one-time-task or material-need
    #[arg(long = "type")]
    pub request_type: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, allow_hyphen_values = true)]
    pub lat: String,
    #[arg(long, allow_hyphen_values = true)]
    pub lng: String,
}

pub async fn run(command: Command, app: &App) -> anyhow::Result<()> {
    match command {
        Command::Login(args) => account::login(app, args).await,
        Command::Signup(args) => account::signup(app, args).await,
        Command::Logout => account::logout(app).await,
        Command::Whoami => account::whoami(app),
        Command::Requests => requests::list(app).await,
        Command::Submit(args) => requests::submit(app, args).await,
        Command::Assign { help_request_id } => requests::assign(app, help_request_id).await,
        Command::Conversations => conversations::list(app).await,
        Command::Complete { conversation_id } => {
            conversations::complete(app, conversation_id).await
        }
        Command::Republish { conversation_id } => {
            conversations::republish(app, conversation_id).await
        }
        Command::Chat { conversation_id } => chat::run(app, conversation_id).await,
        Command::Stats { watch } => requests::stats(app, watch).await,
    }
}

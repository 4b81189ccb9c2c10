//! `bulkmail` - compose once, send to many.
//!
//! Command-line front end for the bulk-email workflow: log in, configure the
//! outbound provider, compose a draft, attach files and send one message per
//! recipient, then inspect results and server history.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod commands;
mod config;

use std::path::PathBuf;

use bulkmail_api::Provider;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::App;

#[derive(Parser)]
#[command(name = "bulkmail", version, about = "Compose once, send to many")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Session name; each session keeps its own draft, results and token
    #[arg(long, global = true, env = "BULKMAIL_SESSION")]
    session: Option<String>,

    /// Base URL of the user API
    #[arg(long, global = true, env = "BULKMAIL_USER_API", value_name = "URL")]
    user_api: Option<String>,

    /// Base URL of the mail API
    #[arg(long, global = true, env = "BULKMAIL_MAIL_API", value_name = "URL")]
    mail_api: Option<String>,

    /// Configuration file
    #[arg(long = "config", global = true, env = "BULKMAIL_CONFIG", value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and keep the token for this session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the token for this session
    Logout,
    /// Show the logged-in user
    Profile,
    /// Show or update the outbound mail provider settings
    Settings {
        /// Sender address
        #[arg(long)]
        from_mail: Option<String>,
        /// Provider app password
        #[arg(long)]
        app_password: Option<String>,
        /// gmail, zoho, outlook or yahoo
        #[arg(long)]
        provider: Option<Provider>,
    },
    /// Edit the draft
    #[command(subcommand)]
    Compose(ComposeCommand),
    /// Manage draft attachments
    #[command(subcommand)]
    Attach(AttachCommand),
    /// Send the draft to every recipient
    Send {
        /// Files to attach, replacing the current attachments
        #[arg(long, num_args = 1.., value_name = "FILE")]
        attach: Vec<PathBuf>,
    },
    /// Show send results of this session
    Results {
        /// Filter on recipient, error or status
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show server-side send history, latest first
    History {
        /// Filter on recipient or subject
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Clear the draft, attachments and results
    Clear,
    /// Show or write the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ComposeCommand {
    /// Set the subject
    Subject { value: String },
    /// Set the body (HTML allowed)
    Body {
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        value: Option<String>,
        /// Read the body from a file
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Set the comma-separated recipient list
    Recipients { value: String },
    /// Print the draft
    Show,
}

#[derive(Subcommand)]
enum AttachCommand {
    /// Add files
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove the attachment at a position shown by `attach list`
    Remove { index: usize },
    /// List attachments
    List,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config_file.unwrap_or_else(config::default_path);
    let mut config = config::load(&config_path).await?;
    if let Some(session) = cli.session {
        config.session = session;
    }
    if let Some(url) = cli.user_api {
        config.user_api = url;
    }
    if let Some(url) = cli.mail_api {
        config.mail_api = url;
    }

    let log_level = match cli.verbose {
        0 => config.log_level.as_str(),
        1 => "bulkmail=debug,bulkmail_core=debug,bulkmail_api=debug",
        _ => "trace",
    };
    setup_logging(log_level);
    debug!(session = %config.session, "Using config {:?}", config_path);

    let app = App::new(config, config_path);

    match cli.command {
        Command::Login { email, password } => app.login(&email, &password).await,
        Command::Register {
            name,
            email,
            password,
        } => app.register(&name, &email, &password).await,
        Command::Logout => app.logout().await,
        Command::Profile => app.profile().await,
        Command::Settings {
            from_mail,
            app_password,
            provider,
        } => app.settings(from_mail, app_password, provider).await,
        Command::Compose(ComposeCommand::Subject { value }) => app.set_subject(value).await,
        Command::Compose(ComposeCommand::Body { value, file }) => {
            app.set_body(value, file.as_deref()).await
        }
        Command::Compose(ComposeCommand::Recipients { value }) => app.set_recipients(value).await,
        Command::Compose(ComposeCommand::Show) => app.show_draft().await,
        Command::Attach(AttachCommand::Add { paths }) => app.attach(&paths).await,
        Command::Attach(AttachCommand::Remove { index }) => app.detach(index).await,
        Command::Attach(AttachCommand::List) => app.list_attachments().await,
        Command::Send { attach } => app.send(&attach).await,
        Command::Results { query, json } => app.results(query.as_deref(), json).await,
        Command::History { query, json } => app.history(query.as_deref(), json).await,
        Command::Clear => app.clear().await,
        Command::Config(ConfigCommand::Show) => app.show_config(),
        Command::Config(ConfigCommand::Init { force }) => app.init_config(force).await,
    }
}

/// Logs to stderr, filtered by `RUST_LOG` or `level`.
fn setup_logging(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_send_with_attachments() {
        let cli = Cli::try_parse_from([
            "bulkmail", "--session", "work", "send", "--attach", "cv.pdf", "cover.pdf",
        ])
        .unwrap();
        assert_eq!(cli.session.as_deref(), Some("work"));
        let Command::Send { attach } = cli.command else {
            panic!("expected send");
        };
        assert_eq!(attach, vec![PathBuf::from("cv.pdf"), PathBuf::from("cover.pdf")]);
    }

    #[test]
    fn body_needs_value_or_file() {
        assert!(Cli::try_parse_from(["bulkmail", "compose", "body"]).is_err());
        assert!(Cli::try_parse_from(["bulkmail", "compose", "body", "--file", "b.html"]).is_ok());
        assert!(
            Cli::try_parse_from(["bulkmail", "compose", "body", "x", "--file", "b.html"]).is_err()
        );
    }

    #[test]
    fn login_takes_only_credentials() {
        let cli = Cli::try_parse_from([
            "bulkmail", "login", "--email", "a@b.co", "--password", "secret",
        ])
        .unwrap();
        let Command::Login { email, password } = cli.command else {
            panic!("expected login");
        };
        assert_eq!((email.as_str(), password.as_str()), ("a@b.co", "secret"));
        assert!(
            Cli::try_parse_from([
                "bulkmail", "login", "--email", "a@b.co", "--password", "secret", "--remember",
            ])
            .is_err()
        );
    }

    #[test]
    fn provider_is_parsed() {
        let cli = Cli::try_parse_from(["bulkmail", "settings", "--provider", "Gmail"]).unwrap();
        let Command::Settings { provider, .. } = cli.command else {
            panic!("expected settings");
        };
        assert_eq!(provider, Some(Provider::Gmail));
        assert!(Cli::try_parse_from(["bulkmail", "settings", "--provider", "aol"]).is_err());
    }
}

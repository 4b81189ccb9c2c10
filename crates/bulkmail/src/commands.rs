//! Command handlers.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use bulkmail_api::{Client, HistoryEntry, Profile, Provider, ProviderSettings};
use bulkmail_core::{
    Attachment, ComposeSession, DraftStore, FileRef, SendEvent, SendOrchestrator, SendOutcome,
    SendStatus, SqliteStore, credentials, history, results,
};
use chrono::{DateTime, Local, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::{self, Config};

/// Resolved configuration plus where it came from.
pub struct App {
    config: Config,
    config_path: PathBuf,
}

impl App {
    pub const fn new(config: Config, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
        }
    }

    async fn store(&self) -> anyhow::Result<SqliteStore> {
        let path = self.config.database_path();
        SqliteStore::open(&path, &self.config.session)
            .await
            .with_context(|| format!("Failed to open session database {}", path.display()))
    }

    async fn session(&self) -> anyhow::Result<ComposeSession<SqliteStore>> {
        let store = self.store().await?;
        Ok(ComposeSession::hydrate(DraftStore::new(store)).await)
    }

    /// API client carrying the session token.
    async fn authorized_client(&self, store: &SqliteStore) -> anyhow::Result<Client> {
        let Some(token) = credentials::stored_token(store).await? else {
            bail!("Not logged in. Run `bulkmail login` first.");
        };
        Ok(Client::new(self.config.endpoints()?).with_token(token))
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<()> {
        let client = Client::new(self.config.endpoints()?);
        let response = client
            .login(email, password)
            .await
            .context("Login failed")?;

        let store = self.store().await?;
        credentials::store_token(&store, &response.token).await?;

        info!(session = %self.config.session, "Logged in");
        println!("Logged in as {email}");
        Ok(())
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> anyhow::Result<()> {
        Client::new(self.config.endpoints()?)
            .register(name, email, password)
            .await
            .context("Registration failed")?;
        println!("Account created for {email}. Log in with `bulkmail login`.");
        Ok(())
    }

    pub async fn logout(&self) -> anyhow::Result<()> {
        let store = self.store().await?;
        credentials::clear_session_token(&store).await?;
        if let Err(e) = credentials::forget_token(&self.config.session) {
            warn!(error = %e, "Could not clean up keyring token");
        }
        println!("Logged out");
        Ok(())
    }

    pub async fn profile(&self) -> anyhow::Result<()> {
        let store = self.store().await?;
        let profile = self
            .authorized_client(&store)
            .await?
            .me()
            .await
            .context("Failed to load profile")?;
        print_profile(&profile);
        Ok(())
    }

    pub async fn settings(
        &self,
        from_mail: Option<String>,
        app_password: Option<String>,
        provider: Option<Provider>,
    ) -> anyhow::Result<()> {
        let store = self.store().await?;
        let client = self.authorized_client(&store).await?;
        let current = client.me().await.context("Failed to load settings")?;

        if from_mail.is_none() && app_password.is_none() && provider.is_none() {
            print_settings(&current);
            return Ok(());
        }

        let Some(provider) = provider.or_else(|| current.provider()) else {
            bail!("No provider configured. Pass --provider gmail|zoho|outlook|yahoo.");
        };
        let settings = ProviderSettings {
            from_mail: from_mail.or(current.from_mail).unwrap_or_default(),
            app_password: app_password.or(current.app_password).unwrap_or_default(),
            provider,
        };
        client
            .update_settings(&settings)
            .await
            .context("Update failed")?;
        println!("Settings updated successfully!");
        Ok(())
    }

    pub async fn set_subject(&self, subject: String) -> anyhow::Result<()> {
        self.session().await?.set_subject(subject).await;
        println!("Subject saved");
        Ok(())
    }

    pub async fn set_body(&self, body: Option<String>, file: Option<&Path>) -> anyhow::Result<()> {
        let body = match file {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            None => body.unwrap_or_default(),
        };
        self.session().await?.set_body(body).await;
        println!("Body saved");
        Ok(())
    }

    pub async fn set_recipients(&self, recipients: String) -> anyhow::Result<()> {
        let mut session = self.session().await?;
        session.set_recipients(recipients).await;
        println!("{} recipient(s)", session.recipient_count());
        Ok(())
    }

    pub async fn show_draft(&self) -> anyhow::Result<()> {
        let session = self.session().await?;
        let draft = session.draft();
        println!("Subject:     {}", draft.subject);
        println!("Recipients:  {}", session.recipient_count());
        for recipient in draft.recipient_list() {
            println!("  {recipient}");
        }
        println!("Attachments: {}", draft.attachments.len());
        print_attachments(draft.attachments.items());
        println!("Body:");
        println!("{}", draft.body);
        Ok(())
    }

    pub async fn attach(&self, paths: &[PathBuf]) -> anyhow::Result<()> {
        let files = read_files(paths).await?;
        let mut session = self.session().await?;
        let before = session.draft().attachments.len();
        if let Some(error) = session.add_attachments(files).await {
            eprintln!("{error}");
        }
        let added = session.draft().attachments.len() - before;
        println!(
            "Added {added} file(s). Names are kept for this session; pass the files to \
             `bulkmail send --attach` to include them."
        );
        print_attachments(session.draft().attachments.items());
        Ok(())
    }

    pub async fn detach(&self, position: usize) -> anyhow::Result<()> {
        let mut session = self.session().await?;
        let removed = match position.checked_sub(1) {
            Some(index) => session.remove_attachment(index).await,
            None => None,
        };
        let Some(removed) = removed else {
            bail!("No attachment at position {position}");
        };
        println!("Removed {}", removed.name());
        Ok(())
    }

    pub async fn list_attachments(&self) -> anyhow::Result<()> {
        let session = self.session().await?;
        if session.draft().attachments.is_empty() {
            println!("No attachments");
        }
        print_attachments(session.draft().attachments.items());
        Ok(())
    }

    pub async fn send(&self, attach: &[PathBuf]) -> anyhow::Result<()> {
        let store = self.store().await?;
        let client = self.authorized_client(&store).await?;
        let mut session = ComposeSession::hydrate(DraftStore::new(store)).await;

        if !attach.is_empty() {
            let files = read_files(attach).await?;
            if let Some(error) = session.reselect_attachments(files).await {
                eprintln!("{error}");
            }
        }

        let mut orchestrator = SendOrchestrator::new(client);
        let mut bar: Option<ProgressBar> = None;
        let outcome = orchestrator
            .send_all(&mut session, |event| match event {
                SendEvent::Started { batch_id, total } => {
                    info!(batch = %batch_id, total, "Sending");
                    bar = Some(progress_bar(total));
                }
                SendEvent::Progress { outcome, .. } => {
                    if let Some(bar) = &bar {
                        if outcome.status == SendStatus::Failed {
                            bar.println(format!(
                                "failed  {}: {}",
                                outcome.recipient,
                                outcome.error.as_deref().unwrap_or_default()
                            ));
                        }
                        bar.set_message(outcome.recipient.clone());
                        bar.inc(1);
                    }
                }
                SendEvent::Finished(_) => {
                    if let Some(bar) = bar.take() {
                        bar.finish_and_clear();
                    }
                }
            })
            .await;

        let summary = match outcome {
            Ok(summary) => summary,
            Err(errors) => {
                for error in &errors {
                    eprintln!("{error}");
                }
                bail!("Draft is not ready to send");
            }
        };

        println!(
            "Batch {}: {} sent, {} failed",
            summary.batch_id, summary.succeeded, summary.failed
        );
        if summary.failed > 0 {
            bail!(
                "{} of {} sends failed; see `bulkmail results --query failed`",
                summary.failed,
                summary.total
            );
        }
        Ok(())
    }

    pub async fn results(&self, query: Option<&str>, json: bool) -> anyhow::Result<()> {
        let session = self.session().await?;
        let matches = results::filter(session.results(), query.unwrap_or_default());

        if json {
            println!("{}", serde_json::to_string_pretty(&matches)?);
            return Ok(());
        }

        let summary = session.summary();
        println!("{} Sent / {} Failed", summary.success, summary.failed);
        if matches.is_empty() {
            println!("No results");
        }
        for outcome in matches {
            print_outcome(outcome);
        }
        Ok(())
    }

    pub async fn history(&self, query: Option<&str>, json: bool) -> anyhow::Result<()> {
        let store = self.store().await?;
        let entries = self
            .authorized_client(&store)
            .await?
            .history()
            .await
            .context("Failed to load history")?;
        let entries = history::latest_first(entries);
        let matches = history::filter(&entries, query.unwrap_or_default());

        if json {
            println!("{}", serde_json::to_string_pretty(&matches)?);
            return Ok(());
        }

        if matches.is_empty() {
            println!("No history found");
        }
        for entry in matches {
            print_history_entry(entry);
        }
        Ok(())
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        self.session().await?.clear_all().await;
        println!("Draft and results cleared");
        Ok(())
    }

    pub fn show_config(&self) -> anyhow::Result<()> {
        eprintln!("# {}", self.config_path.display());
        println!("{}", serde_json::to_string_pretty(&self.config)?);
        Ok(())
    }

    pub async fn init_config(&self, force: bool) -> anyhow::Result<()> {
        if self.config_path.exists() && !force {
            bail!(
                "{} already exists; pass --force to overwrite",
                self.config_path.display()
            );
        }
        config::save(&self.config, &self.config_path).await?;
        println!("Wrote {}", self.config_path.display());
        Ok(())
    }
}

async fn read_files(paths: &[PathBuf]) -> anyhow::Result<Vec<FileRef>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = FileRef::from_path(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(file);
    }
    Ok(files)
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} Sending [{bar:40.cyan/blue}] {pos}/{len} {percent}% {msg}")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

fn local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn print_attachments(items: &[Attachment]) {
    for (position, item) in items.iter().enumerate() {
        let note = if item.is_placeholder() {
            "  (re-select before sending)"
        } else {
            ""
        };
        println!("  {}. {} ({}){note}", position + 1, item.name(), item.size_label());
    }
}

fn print_outcome(outcome: &SendOutcome) {
    let batch = outcome.batch_id.as_ref().map_or("-", |b| b.as_str());
    match &outcome.error {
        Some(error) => println!(
            "{:<8} {}  {}  {batch}  {error}",
            outcome.status.as_str(),
            local_time(outcome.sent_at),
            outcome.recipient
        ),
        None => println!(
            "{:<8} {}  {}  {batch}",
            outcome.status.as_str(),
            local_time(outcome.sent_at),
            outcome.recipient
        ),
    }
}

fn print_history_entry(entry: &HistoryEntry) {
    let mut line = format!(
        "{:<8} {}  {}  {}  {} attachment(s)",
        entry.status.as_str(),
        local_time(entry.sent_at),
        entry.recruiter_email,
        entry.subject,
        entry.attachments_count
    );
    if let Some(error) = &entry.error_message {
        line.push_str("  ");
        line.push_str(error);
    }
    println!("{line}");
}

fn print_profile(profile: &Profile) {
    println!("Name:     {}", profile.name);
    println!("Email:    {}", profile.email);
    println!(
        "Provider: {}",
        profile
            .provider()
            .map_or("not configured", |p| p.display_name())
    );
    if let Some(from) = profile.from_mail.as_deref().filter(|f| !f.is_empty()) {
        println!("From:     {from}");
    }
    if let Some(created) = profile.created_at {
        println!("Joined:   {}", local_time(created));
    }
}

fn print_settings(profile: &Profile) {
    println!(
        "Provider:     {}",
        profile.provider().map_or("not configured", |p| p.as_str())
    );
    println!(
        "From:         {}",
        profile.from_mail.as_deref().unwrap_or_default()
    );
    let password = profile.app_password.as_deref().unwrap_or_default();
    println!(
        "App password: {}",
        if password.is_empty() { "not set" } else { "********" }
    );
}

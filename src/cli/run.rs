// src/cli/run.rs
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use tracing::error;

use crate::cli::cli::{CliApp, MenuAction};
use crate::models::{EmailProvider, Result};
use crate::outreach::{log_entry, SendRequest, SenderInfo};
use crate::storage::sqlite::get_database_stats;
use crate::storage::ProspectStore;

impl CliApp {
    pub async fn run(&self) -> Result<()> {
        println!("\n🚀 Welcome to Outreach Pipeline!");
        println!("═══════════════════════════════════════");

        self.show_stats().await?;

        loop {
            let actions = vec![
                MenuAction::ImportCsv,
                MenuAction::ProcessSingleCompany,
                MenuAction::DraftAndSendEmail,
                MenuAction::ShowStats,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::ImportCsv => {
                    if let Err(e) = self.run_import_csv().await {
                        error!("CSV import failed: {}", e);
                    }
                }
                MenuAction::ProcessSingleCompany => {
                    if let Err(e) = self.run_single_company().await {
                        error!("Company processing failed: {}", e);
                    }
                }
                MenuAction::DraftAndSendEmail => {
                    if let Err(e) = self.run_draft_and_send().await {
                        error!("Outreach email failed: {}", e);
                    }
                }
                MenuAction::ShowStats => {
                    if let Err(e) = self.show_stats().await {
                        error!("Failed to show stats: {}", e);
                    }
                }
                MenuAction::Exit => {
                    println!("\n👋 Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn run_import_csv(&self) -> Result<()> {
        let path: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Path to CSV file")
            .interact_text()?;
        let csv_data = tokio::fs::read_to_string(path.trim()).await?;

        let coordinator = self.build_coordinator()?;
        let results = coordinator.process_companies_from_csv("local", &csv_data).await;
        coordinator.close().await;

        println!("\n📋 Batch results ({} rows):", results.len());
        for row in &results {
            match &row.outcome {
                Ok(outcome) => println!(
                    "  ✅ line {}: {} → {:?} (score: {}, contacts: {}, {}ms)",
                    row.line,
                    outcome.company_name,
                    outcome.status,
                    outcome
                        .data_quality_score
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    outcome.contact_count,
                    outcome.processing_time_ms,
                ),
                Err(e) => println!("  ❌ line {}: {}", row.line, e),
            }
        }
        Ok(())
    }

    async fn run_single_company(&self) -> Result<()> {
        let name: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Company name")
            .interact_text()?;
        let website: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Website URL (optional)")
            .allow_empty(true)
            .interact_text()?;
        let linkedin: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("LinkedIn URL (optional)")
            .allow_empty(true)
            .interact_text()?;

        let website = Some(website.trim()).filter(|s| !s.is_empty());
        let linkedin = Some(linkedin.trim()).filter(|s| !s.is_empty());

        let coordinator = self.build_coordinator()?;
        let outcome = coordinator
            .process_company("local", name.trim(), website, linkedin)
            .await;
        coordinator.close().await;

        println!(
            "\n🎯 {} → {:?} (score: {:?}, contacts: {}, {}ms)",
            outcome.company_name,
            outcome.status,
            outcome.data_quality_score,
            outcome.contact_count,
            outcome.processing_time_ms,
        );
        for failure in &outcome.stage_failures {
            println!("  ⚠️ {} stage: {}", failure.stage.as_str(), failure.message);
        }
        if let Some(e) = &outcome.error {
            println!("  ❌ {}", e);
        }
        Ok(())
    }

    async fn run_draft_and_send(&self) -> Result<()> {
        let prospect_id: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Prospect id")
            .interact_text()?;
        let prospect_id = prospect_id.trim().to_string();

        let Some(company) = self.store.get_company(&prospect_id).await? else {
            println!("❌ No prospect with id {}", prospect_id);
            return Ok(());
        };

        let sender_info = SenderInfo {
            name: self.config.email.from_name.clone(),
            company: "Outreach Pipeline".to_string(),
            role: "Business Development".to_string(),
            offering: "lead generation automation".to_string(),
        };

        let kinds = ["Company outreach", "Individual contact"];
        let kind = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Email type")
            .items(&kinds)
            .default(0)
            .interact()?;

        let generator = self.build_generator()?;
        let (draft, recipient, contact_id, email_type) = if kind == 0 {
            let recipient: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Recipient address")
                .interact_text()?;
            let draft = generator.generate_company_email(&company, &sender_info).await?;
            (draft, recipient.trim().to_string(), None, "company")
        } else {
            let contacts = self.store.get_contacts_by_company(&prospect_id).await?;
            let with_email: Vec<_> = contacts
                .into_iter()
                .filter(|c| c.email_primary.is_some())
                .collect();
            if with_email.is_empty() {
                println!("❌ No contacts with an email for this prospect");
                return Ok(());
            }
            let labels: Vec<String> = with_email
                .iter()
                .map(|c| {
                    format!(
                        "{} <{}>",
                        c.name,
                        c.email_primary.as_deref().unwrap_or_default()
                    )
                })
                .collect();
            let chosen = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Contact")
                .items(&labels)
                .default(0)
                .interact()?;
            let contact = &with_email[chosen];
            let draft = generator
                .generate_individual_email(contact, &company, &sender_info)
                .await?;
            (
                draft,
                contact.email_primary.clone().unwrap_or_default(),
                Some(contact.id.clone()),
                "individual",
            )
        };

        self.store
            .upsert_email_draft(&prospect_id, contact_id.as_deref(), &draft)
            .await?;

        println!("\n✉️  Subject: {}", draft.subject);
        println!("{}\n", draft.body);

        let providers = ["gmail", "outlook"];
        let chosen = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Provider")
            .items(&providers)
            .default(0)
            .interact()?;
        let provider = EmailProvider::parse(providers[chosen])?;

        if !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Send to {}?", recipient))
            .default(false)
            .interact()?
        {
            println!("Draft discarded.");
            return Ok(());
        }

        let sender = self.build_sender()?;
        let outcome = sender
            .send(&SendRequest {
                to: recipient.clone(),
                subject: draft.subject.clone(),
                body: draft.body.clone(),
                provider,
                from_name: Some(self.config.email.from_name.clone()),
            })
            .await?;

        let entry = log_entry(
            &prospect_id,
            contact_id.as_deref(),
            email_type,
            &recipient,
            provider,
            &outcome,
        );
        self.store.insert_email_log(&entry).await?;

        if outcome.success {
            println!("✅ Sent (message id: {:?})", outcome.message_id);
        } else {
            println!("❌ Send failed: {:?}", outcome.error);
        }
        Ok(())
    }

    async fn show_stats(&self) -> Result<()> {
        let stats = get_database_stats(&self.pool).await?;
        println!("\n📊 Database");
        println!("  Prospects:     {}", stats.total_prospects);
        println!("    ready:        {}", stats.ready);
        println!("    partial data: {}", stats.partial_data);
        println!("    error:        {}", stats.error);
        println!("  Contacts:      {}", stats.total_contacts);
        println!("  Emails logged: {}", stats.emails_logged);
        Ok(())
    }
}

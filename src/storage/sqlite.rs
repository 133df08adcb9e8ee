// src/storage/sqlite.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mobc::{Manager, Pool};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::path::Path;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::{EmailLogEntry, ProspectStatus};
use crate::storage::{
    CampaignProspect, CompanyPatch, ContactPatch, ProspectStore, StoredCampaign, StoredCompany,
    StoredContact, StoredUser,
};

pub struct SqliteManager {
    db_path: String,
}

impl SqliteManager {
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }
}

#[async_trait::async_trait]
impl Manager for SqliteManager {
    type Connection = Connection;
    type Error = rusqlite::Error;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let conn = Connection::open(&self.db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "memory")?;

        init_database(&conn)?;
        Ok(conn)
    }

    async fn check(&self, conn: Self::Connection) -> Result<Self::Connection, Self::Error> {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(conn)
    }
}

pub type DbPool = Pool<SqliteManager>;

pub async fn create_db_pool(db_path: &str) -> crate::models::Result<DbPool> {
    if let Some(parent) = Path::new(db_path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let manager = SqliteManager::new(db_path.to_string());
    let pool = Pool::builder().max_open(10).max_idle(5).build(manager);

    info!("✓ SQLite connection pool created: {}", db_path);
    Ok(pool)
}

fn init_database(conn: &Connection) -> SqliteResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS prospects (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            company_name TEXT NOT NULL,
            website_url TEXT,
            linkedin_url TEXT,
            industry TEXT,
            revenue_range TEXT,
            employee_count_range TEXT,
            technologies_used TEXT NOT NULL DEFAULT '[]',
            mission_summary TEXT,
            recent_activity_summary TEXT,
            contact_form_url TEXT,
            description TEXT,
            founded_year INTEGER,
            headquarters TEXT,
            enrichment_org_id TEXT,
            website_text_snippet TEXT,
            status TEXT NOT NULL,
            campaign_status TEXT NOT NULL,
            data_quality_score INTEGER,
            enrichment_timestamp INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            enrichment_contact_id TEXT,
            name TEXT NOT NULL,
            title TEXT,
            email_primary TEXT,
            email_other_business TEXT NOT NULL DEFAULT '[]',
            email_personal_staff TEXT NOT NULL DEFAULT '[]',
            email_executive TEXT NOT NULL DEFAULT '[]',
            phone_numbers TEXT NOT NULL DEFAULT '[]',
            social_profiles TEXT,
            linkedin_profile_url TEXT,
            profile_summary TEXT,
            recent_activity TEXT NOT NULL DEFAULT '[]',
            accomplishments_summary TEXT,
            past_work_summary TEXT,
            current_work_summary TEXT,
            online_contributions_summary TEXT,
            seniority_level TEXT,
            departments TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY (company_id) REFERENCES prospects (id)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS email_log (
            id TEXT PRIMARY KEY,
            prospect_id TEXT NOT NULL,
            contact_id TEXT,
            email_type TEXT NOT NULL,
            recipient TEXT NOT NULL,
            status TEXT NOT NULL,
            provider TEXT NOT NULL,
            message_id TEXT,
            error TEXT,
            sent_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    // contact_id '' marks the prospect-level (company) draft.
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS email_drafts (
            prospect_id TEXT NOT NULL,
            contact_id TEXT NOT NULL DEFAULT '',
            subject TEXT NOT NULL,
            body TEXT NOT NULL,
            personalization_elements TEXT NOT NULL DEFAULT '[]',
            updated_at TEXT NOT NULL,
            PRIMARY KEY (prospect_id, contact_id)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS campaigns (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS campaign_prospects (
            campaign_id TEXT NOT NULL,
            prospect_id TEXT NOT NULL,
            status TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (campaign_id, prospect_id)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            company_name TEXT,
            created_at TEXT NOT NULL
        )
        "#,
        [],
    )?;

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_prospects_status ON prospects(status)",
        "CREATE INDEX IF NOT EXISTS idx_prospects_user ON prospects(user_id)",
        "CREATE INDEX IF NOT EXISTS idx_contacts_company ON contacts(company_id)",
        "CREATE INDEX IF NOT EXISTS idx_contacts_email ON contacts(email_primary)",
        "CREATE INDEX IF NOT EXISTS idx_email_log_prospect ON email_log(prospect_id)",
        "CREATE INDEX IF NOT EXISTS idx_email_log_sent_at ON email_log(sent_at DESC)",
        "CREATE INDEX IF NOT EXISTS idx_campaign_prospects_campaign ON campaign_prospects(campaign_id)",
    ];
    for index_sql in indexes {
        conn.execute(index_sql, [])?;
    }

    debug!("Database schema initialized");
    Ok(())
}

#[derive(Debug, Default, serde::Serialize)]
pub struct DatabaseStats {
    pub total_prospects: i64,
    pub ready: i64,
    pub partial_data: i64,
    pub error: i64,
    pub total_contacts: i64,
    pub emails_logged: i64,
}

pub async fn get_database_stats(pool: &DbPool) -> crate::models::Result<DatabaseStats> {
    let conn = pool.get().await?;

    let count = |query: &str| -> Result<i64, rusqlite::Error> {
        conn.query_row(query, [], |row| row.get(0))
    };

    Ok(DatabaseStats {
        total_prospects: count("SELECT COUNT(*) FROM prospects")?,
        ready: count("SELECT COUNT(*) FROM prospects WHERE status = 'ready'")?,
        partial_data: count("SELECT COUNT(*) FROM prospects WHERE status = 'partial_data'")?,
        error: count("SELECT COUNT(*) FROM prospects WHERE status = 'error'")?,
        total_contacts: count("SELECT COUNT(*) FROM contacts")?,
        emails_logged: count("SELECT COUNT(*) FROM email_log")?,
    })
}

/// Production storage implementation backed by pooled SQLite connections.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<mobc::Connection<SqliteManager>, StorageError> {
        self.pool
            .get()
            .await
            .map_err(|e| StorageError::Database(e.to_string()))
    }
}

fn to_json(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

fn from_json_list(raw: Option<String>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(&s).ok()).unwrap_or_default()
}

fn parse_datetime(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn optional_string(row: &Row<'_>, idx: usize) -> Option<String> {
    match row.get::<_, Option<String>>(idx) {
        Ok(Some(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn row_to_company(row: &Row<'_>) -> SqliteResult<StoredCompany> {
    Ok(StoredCompany {
        id: row.get(0)?,
        user_id: row.get(1)?,
        company_name: row.get(2)?,
        website_url: optional_string(row, 3),
        linkedin_url: optional_string(row, 4),
        industry: optional_string(row, 5),
        revenue_range: optional_string(row, 6),
        employee_count_range: optional_string(row, 7),
        technologies_used: from_json_list(row.get(8)?),
        mission_summary: optional_string(row, 9),
        recent_activity_summary: optional_string(row, 10),
        contact_form_url: optional_string(row, 11),
        description: optional_string(row, 12),
        founded_year: row.get::<_, Option<i64>>(13).unwrap_or(None),
        headquarters: optional_string(row, 14),
        enrichment_org_id: optional_string(row, 15),
        website_text_snippet: optional_string(row, 16),
        status: row
            .get::<_, String>(17)
            .ok()
            .and_then(|s| ProspectStatus::parse(&s))
            .unwrap_or(ProspectStatus::Processing),
        campaign_status: row.get(18)?,
        data_quality_score: row.get::<_, Option<i64>>(19).unwrap_or(None),
        enrichment_timestamp: row.get::<_, Option<i64>>(20).unwrap_or(None),
        created_at: parse_datetime(row.get(21)?),
        updated_at: parse_datetime(row.get(22)?),
    })
}

fn row_to_contact(row: &Row<'_>) -> SqliteResult<StoredContact> {
    Ok(StoredContact {
        id: row.get(0)?,
        company_id: row.get(1)?,
        user_id: row.get(2)?,
        enrichment_contact_id: optional_string(row, 3),
        name: row.get(4)?,
        title: optional_string(row, 5),
        email_primary: optional_string(row, 6),
        email_other_business: from_json_list(row.get(7)?),
        email_personal_staff: from_json_list(row.get(8)?),
        email_executive: from_json_list(row.get(9)?),
        phone_numbers: from_json_list(row.get(10)?),
        social_profiles: row
            .get::<_, Option<String>>(11)
            .unwrap_or(None)
            .and_then(|s| serde_json::from_str(&s).ok()),
        linkedin_profile_url: optional_string(row, 12),
        profile_summary: optional_string(row, 13),
        recent_activity: from_json_list(row.get(14)?),
        accomplishments_summary: optional_string(row, 15),
        past_work_summary: optional_string(row, 16),
        current_work_summary: optional_string(row, 17),
        online_contributions_summary: optional_string(row, 18),
        seniority_level: optional_string(row, 19),
        departments: from_json_list(row.get(20)?),
        created_at: parse_datetime(row.get(21)?),
        updated_at: parse_datetime(row.get(22)?),
    })
}

const COMPANY_COLUMNS: &str = "id, user_id, company_name, website_url, linkedin_url, industry, \
     revenue_range, employee_count_range, technologies_used, mission_summary, \
     recent_activity_summary, contact_form_url, description, founded_year, headquarters, \
     enrichment_org_id, website_text_snippet, status, campaign_status, data_quality_score, \
     enrichment_timestamp, created_at, updated_at";

const CONTACT_COLUMNS: &str = "id, company_id, user_id, enrichment_contact_id, name, title, \
     email_primary, email_other_business, email_personal_staff, email_executive, phone_numbers, \
     social_profiles, linkedin_profile_url, profile_summary, recent_activity, \
     accomplishments_summary, past_work_summary, current_work_summary, \
     online_contributions_summary, seniority_level, departments, created_at, updated_at";

fn write_company(conn: &Connection, company: &StoredCompany) -> SqliteResult<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO prospects ({}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, \
              ?19, ?20, ?21, ?22, ?23)",
            COMPANY_COLUMNS
        ),
        params![
            company.id,
            company.user_id,
            company.company_name,
            company.website_url,
            company.linkedin_url,
            company.industry,
            company.revenue_range,
            company.employee_count_range,
            to_json(&company.technologies_used),
            company.mission_summary,
            company.recent_activity_summary,
            company.contact_form_url,
            company.description,
            company.founded_year,
            company.headquarters,
            company.enrichment_org_id,
            company.website_text_snippet,
            company.status.as_str(),
            company.campaign_status,
            company.data_quality_score,
            company.enrichment_timestamp,
            company.created_at.to_rfc3339(),
            company.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn write_contact(conn: &Connection, contact: &StoredContact) -> SqliteResult<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO contacts ({}) VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, \
              ?19, ?20, ?21, ?22, ?23)",
            CONTACT_COLUMNS
        ),
        params![
            contact.id,
            contact.company_id,
            contact.user_id,
            contact.enrichment_contact_id,
            contact.name,
            contact.title,
            contact.email_primary,
            to_json(&contact.email_other_business),
            to_json(&contact.email_personal_staff),
            to_json(&contact.email_executive),
            to_json(&contact.phone_numbers),
            contact
                .social_profiles
                .as_ref()
                .and_then(|p| serde_json::to_string(p).ok()),
            contact.linkedin_profile_url,
            contact.profile_summary,
            to_json(&contact.recent_activity),
            contact.accomplishments_summary,
            contact.past_work_summary,
            contact.current_work_summary,
            contact.online_contributions_summary,
            contact.seniority_level,
            to_json(&contact.departments),
            contact.created_at.to_rfc3339(),
            contact.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

#[async_trait]
impl ProspectStore for SqliteStore {
    async fn insert_company(&self, company: &StoredCompany) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        write_company(&conn, company)?;
        debug!("Upserted prospect {}", company.id);
        Ok(())
    }

    async fn update_company(&self, id: &str, patch: &CompanyPatch) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        let mut company = {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM prospects WHERE id = ?1",
                COMPANY_COLUMNS
            ))?;
            let mut rows = stmt.query_map(params![id], row_to_company)?;
            match rows.next() {
                Some(row) => row?,
                None => return Err(StorageError::NotFound(format!("company {}", id))),
            }
        };
        company.apply(patch);
        write_company(&conn, &company)?;
        Ok(())
    }

    async fn get_company(&self, id: &str) -> Result<Option<StoredCompany>, StorageError> {
        let conn = self.conn().await?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM prospects WHERE id = ?1",
            COMPANY_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], row_to_company)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn insert_contact(&self, contact: &StoredContact) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        write_contact(&conn, contact)?;
        Ok(())
    }

    async fn update_contact(&self, id: &str, patch: &ContactPatch) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        let mut contact = {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM contacts WHERE id = ?1",
                CONTACT_COLUMNS
            ))?;
            let mut rows = stmt.query_map(params![id], row_to_contact)?;
            match rows.next() {
                Some(row) => row?,
                None => return Err(StorageError::NotFound(format!("contact {}", id))),
            }
        };
        contact.apply(patch);
        write_contact(&conn, &contact)?;
        Ok(())
    }

    async fn get_contact(&self, id: &str) -> Result<Option<StoredContact>, StorageError> {
        let conn = self.conn().await?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contacts WHERE id = ?1",
            CONTACT_COLUMNS
        ))?;
        let mut rows = stmt.query_map(params![id], row_to_contact)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn get_contacts_by_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<StoredContact>, StorageError> {
        let conn = self.conn().await?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contacts WHERE company_id = ?1 ORDER BY created_at ASC",
            CONTACT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![company_id], row_to_contact)?;
        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?);
        }
        Ok(contacts)
    }

    async fn insert_email_log(&self, entry: &EmailLogEntry) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO email_log (id, prospect_id, contact_id, email_type, recipient, status, \
             provider, message_id, error, sent_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                entry.id,
                entry.prospect_id,
                entry.contact_id,
                entry.email_type,
                entry.recipient,
                entry.status,
                entry.provider,
                entry.message_id,
                entry.error,
                entry.sent_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn upsert_email_draft(
        &self,
        prospect_id: &str,
        contact_id: Option<&str>,
        draft: &crate::models::EmailDraft,
    ) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT OR REPLACE INTO email_drafts (prospect_id, contact_id, subject, body, \
             personalization_elements, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                prospect_id,
                contact_id.unwrap_or(""),
                draft.subject,
                draft.body,
                to_json(&draft.personalization_elements),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn get_email_draft(
        &self,
        prospect_id: &str,
        contact_id: Option<&str>,
    ) -> Result<Option<crate::models::EmailDraft>, StorageError> {
        let conn = self.conn().await?;
        let mut stmt = conn.prepare(
            "SELECT subject, body, personalization_elements FROM email_drafts \
             WHERE prospect_id = ?1 AND contact_id = ?2",
        )?;
        let mut rows = stmt.query_map(params![prospect_id, contact_id.unwrap_or("")], |row| {
            Ok(crate::models::EmailDraft {
                subject: row.get(0)?,
                body: row.get(1)?,
                personalization_elements: from_json_list(row.get(2)?),
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn insert_campaign(&self, campaign: &StoredCampaign) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT OR REPLACE INTO campaigns (id, user_id, name, description, status, \
             created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                campaign.id,
                campaign.user_id,
                campaign.name,
                campaign.description,
                campaign.status,
                campaign.created_at.to_rfc3339(),
                campaign.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn update_campaign(&self, id: &str, status: &str) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        let changed = conn.execute(
            "UPDATE campaigns SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status, Utc::now().to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(format!("campaign {}", id)));
        }
        Ok(())
    }

    async fn get_campaign(&self, id: &str) -> Result<Option<StoredCampaign>, StorageError> {
        let conn = self.conn().await?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, description, status, created_at, updated_at \
             FROM campaigns WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], |row| {
            Ok(StoredCampaign {
                id: row.get(0)?,
                user_id: row.get(1)?,
                name: row.get(2)?,
                description: optional_string(row, 3),
                status: row.get(4)?,
                created_at: parse_datetime(row.get(5)?),
                updated_at: parse_datetime(row.get(6)?),
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn get_campaign_prospects(
        &self,
        campaign_id: &str,
    ) -> Result<Vec<CampaignProspect>, StorageError> {
        let conn = self.conn().await?;
        let mut stmt = conn.prepare(
            "SELECT campaign_id, prospect_id, status, updated_at FROM campaign_prospects \
             WHERE campaign_id = ?1",
        )?;
        let rows = stmt.query_map(params![campaign_id], |row| {
            Ok(CampaignProspect {
                campaign_id: row.get(0)?,
                prospect_id: row.get(1)?,
                status: row.get(2)?,
                updated_at: parse_datetime(row.get(3)?),
            })
        })?;
        let mut prospects = Vec::new();
        for row in rows {
            prospects.push(row?);
        }
        Ok(prospects)
    }

    async fn update_campaign_prospect(
        &self,
        campaign_id: &str,
        prospect_id: &str,
        status: &str,
    ) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT INTO campaign_prospects (campaign_id, prospect_id, status, updated_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (campaign_id, prospect_id) DO UPDATE SET \
                 status = excluded.status, updated_at = excluded.updated_at",
            params![campaign_id, prospect_id, status, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<StoredUser>, StorageError> {
        let conn = self.conn().await?;
        let mut stmt = conn.prepare(
            "SELECT id, email, first_name, last_name, company_name, created_at \
             FROM users WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], |row| {
            Ok(StoredUser {
                id: row.get(0)?,
                email: row.get(1)?,
                first_name: row.get(2)?,
                last_name: row.get(3)?,
                company_name: optional_string(row, 4),
                created_at: parse_datetime(row.get(5)?),
            })
        })?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    async fn insert_user(&self, user: &StoredUser) -> Result<(), StorageError> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT OR REPLACE INTO users (id, email, first_name, last_name, company_name, \
             created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id,
                user.email,
                user.first_name,
                user.last_name,
                user.company_name,
                user.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

//! Data transformation
//!
//! Transformation is the fourth pipeline stage: it receives the validated,
//! cursor-filtered batch and produces the batch that is loaded to staging.
//! Every entity gets the standard audit columns (`processed_at`,
//! `partition_date`, `partition_hour`); entities with a built-in derivation
//! additionally get their derived columns, and entities with a declared
//! cipher column get that free-text column obfuscated.
//!
//! The registry is built and validated at startup from configuration, so an
//! entity arriving at run time either has a ready transformer or is an
//! UnsupportedEntity failure for that file alone.

pub mod entities;

use crate::config::SiloConfig;
use crate::core::cipher;
use crate::domain::batch::Batch;
use crate::domain::ids::EntityName;
use crate::domain::result::Result;
use chrono::{DateTime, Local, NaiveDate, Timelike};
use serde_json::json;
use std::collections::HashMap;

/// Built-in column derivation applied for known entity names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Derivation {
    CreditCardsBilling,
    CustomerProfiles,
    SupportTickets,
    Loans,
    Transactions,
    /// Audit columns only
    Generic,
}

impl Derivation {
    fn for_entity(name: &str) -> Self {
        match name {
            "credit_cards_billing" => Self::CreditCardsBilling,
            "customer_profiles" => Self::CustomerProfiles,
            "support_tickets" => Self::SupportTickets,
            "loans" => Self::Loans,
            "transactions" => Self::Transactions,
            _ => Self::Generic,
        }
    }

    fn apply(self, batch: Batch, today: NaiveDate) -> Result<Batch> {
        match self {
            Self::CreditCardsBilling => entities::credit_cards_billing(batch, today),
            Self::CustomerProfiles => entities::customer_profiles(batch, today),
            Self::SupportTickets => entities::support_tickets(batch, today),
            Self::Loans => entities::loans(batch, today),
            Self::Transactions => entities::transactions(batch, today),
            Self::Generic => Ok(batch),
        }
    }
}

/// Transformer for one configured entity
#[derive(Debug, Clone)]
pub struct EntityTransformer {
    entity: EntityName,
    derivation: Derivation,
    cipher_column: Option<String>,
}

impl EntityTransformer {
    /// Transforms a batch at the current wall clock
    pub fn transform(&self, batch: Batch) -> Result<Batch> {
        self.transform_at(batch, Local::now())
    }

    /// Transforms a batch at an explicit instant
    ///
    /// Pure given the batch and the instant: applies the entity derivation,
    /// obfuscates the declared cipher column, and appends audit columns.
    ///
    /// # Errors
    ///
    /// Returns a transform error if a required source column is missing or
    /// mistyped.
    pub fn transform_at(&self, batch: Batch, now: DateTime<Local>) -> Result<Batch> {
        let mut batch = self.derivation.apply(batch, now.date_naive())?;

        if let Some(ref column) = self.cipher_column {
            let key = cipher::encrypt_column(&mut batch, column)?;
            tracing::debug!(
                entity = %self.entity,
                column = %column,
                key,
                "Obfuscated free-text column"
            );
        }

        add_audit_columns(&mut batch, now)?;

        tracing::info!(
            entity = %self.entity,
            rows = batch.row_count(),
            columns = batch.columns().len(),
            "Transformed batch"
        );
        Ok(batch)
    }
}

/// Appends the standard audit columns to a batch
///
/// `processed_at` (RFC 3339), `partition_date` (`YYYY-MM-DD`) and
/// `partition_hour` (`HH`) record when the pipeline handled the batch.
pub fn add_audit_columns(batch: &mut Batch, now: DateTime<Local>) -> Result<()> {
    let rows = batch.row_count();
    let processed_at = now.to_rfc3339();
    let partition_date = now.date_naive().format("%Y-%m-%d").to_string();
    let partition_hour = format!("{:02}", now.hour());

    batch.add_column("processed_at", vec![json!(processed_at); rows])?;
    batch.add_column("partition_date", vec![json!(partition_date); rows])?;
    batch.add_column("partition_hour", vec![json!(partition_hour); rows])?;
    Ok(())
}

/// Startup-validated table of per-entity transformers
#[derive(Debug, Default)]
pub struct TransformerRegistry {
    transformers: HashMap<EntityName, EntityTransformer>,
}

impl TransformerRegistry {
    /// Builds the registry from configuration
    ///
    /// Every configured entity gets a transformer; names matching a built-in
    /// derivation get that derivation, everything else gets audit columns
    /// only.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid entity name.
    pub fn from_config(config: &SiloConfig) -> Result<Self> {
        let mut transformers = HashMap::new();
        for entity_config in &config.entities {
            let entity = EntityName::new(&entity_config.name)
                .map_err(crate::domain::SiloError::Configuration)?;
            let transformer = EntityTransformer {
                entity: entity.clone(),
                derivation: Derivation::for_entity(&entity_config.name),
                cipher_column: entity_config.cipher_column.clone(),
            };
            transformers.insert(entity, transformer);
        }
        Ok(Self { transformers })
    }

    /// Looks up the transformer for an entity
    pub fn get(&self, entity: &EntityName) -> Option<&EntityTransformer> {
        self.transformers.get(entity)
    }
}

use clap::{Subcommand, ValueEnum};
use orderdesk_core::{ConfigHandle, ConfigList, SystemConfig};
use orderdesk_storage::DocumentStore;

use super::{print_json, CommandError, Context};
use crate::OutputFormat;

#[derive(Subcommand)]
pub(crate) enum ConfigCommand {
    /// Show the configured value lists
    Show,
    /// Add a value to a list
    Add { list: ListName, value: String },
    /// Replace a value in place, keeping its position
    Rename {
        list: ListName,
        old: String,
        new: String,
    },
    /// Remove a value from a list
    Remove { list: ListName, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ListName {
    Cities,
    Clusters,
    Supervisors,
    Statuses,
    Updaters,
    DraftStatuses,
}

impl From<ListName> for ConfigList {
    fn from(name: ListName) -> Self {
        match name {
            ListName::Cities => ConfigList::Cities,
            ListName::Clusters => ConfigList::Clusters,
            ListName::Supervisors => ConfigList::Supervisors,
            ListName::Statuses => ConfigList::Statuses,
            ListName::Updaters => ConfigList::Updaters,
            ListName::DraftStatuses => ConfigList::DraftStatuses,
        }
    }
}

pub(crate) async fn run<S: DocumentStore>(
    ctx: &Context<S>,
    command: ConfigCommand,
) -> Result<(), CommandError> {
    let repo = ctx.configs();
    let handle = repo.fetch().await?;
    if handle.document_id.is_none() {
        tracing::warn!("configuration is not stored yet; showing built-in defaults");
    }

    let handle = match command {
        ConfigCommand::Show => handle,
        ConfigCommand::Add { list, value } => {
            let mut config = handle.config;
            add_value(&mut config, list.into(), &value)?;
            repo.save(handle.document_id.as_deref(), &config).await?
        }
        ConfigCommand::Rename { list, old, new } => {
            let mut config = handle.config;
            rename_value(&mut config, list.into(), &old, &new)?;
            repo.save(handle.document_id.as_deref(), &config).await?
        }
        ConfigCommand::Remove { list, value } => {
            let mut config = handle.config;
            remove_value(&mut config, list.into(), &value)?;
            repo.save(handle.document_id.as_deref(), &config).await?
        }
    };

    show(ctx.output, &handle);
    Ok(())
}

/// Trimmed value; blank values are refused.
fn entry(value: &str) -> Result<String, CommandError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CommandError::Usage("value must not be blank".to_string()));
    }
    Ok(value.to_string())
}

fn ensure_absent(values: &[String], value: &str, list: ConfigList) -> Result<(), CommandError> {
    if values.iter().any(|v| v == value) {
        return Err(CommandError::Usage(format!(
            "'{value}' is already in {}",
            list.attribute()
        )));
    }
    Ok(())
}

fn add_value(
    config: &mut SystemConfig,
    list: ConfigList,
    value: &str,
) -> Result<(), CommandError> {
    let value = entry(value)?;
    let values = config.list_mut(list);
    ensure_absent(values, &value, list)?;
    values.push(value);
    Ok(())
}

fn rename_value(
    config: &mut SystemConfig,
    list: ConfigList,
    old: &str,
    new: &str,
) -> Result<(), CommandError> {
    let new = entry(new)?;
    let values = config.list_mut(list);
    let index = values
        .iter()
        .position(|v| v == old)
        .ok_or_else(|| CommandError::Usage(format!("'{old}' is not in {}", list.attribute())))?;
    if values[index] == new {
        return Ok(());
    }
    ensure_absent(values, &new, list)?;
    values[index] = new;
    Ok(())
}

fn remove_value(
    config: &mut SystemConfig,
    list: ConfigList,
    value: &str,
) -> Result<(), CommandError> {
    let values = config.list_mut(list);
    match values.iter().position(|v| v == value) {
        Some(index) => {
            values.remove(index);
            Ok(())
        }
        None => Err(CommandError::Usage(format!(
            "'{value}' is not in {}",
            list.attribute()
        ))),
    }
}

fn show(output: OutputFormat, handle: &ConfigHandle) {
    match output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "document_id": handle.document_id,
            "config": handle.config,
        })),
        OutputFormat::Text => {
            for list in ConfigList::ALL {
                println!("{}: {}", list.attribute(), handle.config.list(list).join(", "));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use orderdesk_core::{decode_list, Collections, WriteExecutor};
    use orderdesk_storage::{AttributeSpec, CollectionSchema, MemoryStore};

    fn context() -> Context<MemoryStore> {
        let mut schema = CollectionSchema::new();
        for list in ConfigList::ALL {
            schema.add_attribute(AttributeSpec::string(list.attribute(), 4096));
        }
        Context {
            store: Arc::new(MemoryStore::new().with_collection("config", schema)),
            collections: Collections::default(),
            executor: WriteExecutor::default(),
            output: OutputFormat::Json,
        }
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut config = SystemConfig::default();
        add_value(&mut config, ConfigList::Cities, "Recife").unwrap();
        assert_eq!(config.cities.len(), 5);
        let err = add_value(&mut config, ConfigList::Cities, "Recife").unwrap_err();
        assert_eq!(err.to_string(), "'Recife' is already in cidades");
    }

    #[test]
    fn add_trims_and_refuses_blanks() {
        let mut config = SystemConfig::default();
        add_value(&mut config, ConfigList::Clusters, "  Cluster Centro ").unwrap();
        assert_eq!(config.clusters.last().map(String::as_str), Some("Cluster Centro"));
        for blank in ["", "   ", "\t\n"] {
            let err = add_value(&mut config, ConfigList::Clusters, blank).unwrap_err();
            assert_eq!(err.to_string(), "value must not be blank");
        }
        assert_eq!(config.clusters.len(), 5);
        // Trimmed duplicates are still duplicates.
        assert!(add_value(&mut config, ConfigList::Clusters, " Cluster Sul ").is_err());
    }

    #[test]
    fn rename_replaces_in_place() {
        let mut config = SystemConfig::default();
        rename_value(&mut config, ConfigList::Supervisors, "Carlos Oliveira", " Carla Oliveira ")
            .unwrap();
        assert_eq!(
            config.supervisors,
            ["Ana Silva", "Carla Oliveira", "Mariana Santos"]
        );

        let blank = rename_value(&mut config, ConfigList::Supervisors, "Ana Silva", "  ");
        assert!(blank.is_err());
        let missing = rename_value(&mut config, ConfigList::Supervisors, "Nobody", "X");
        assert_eq!(missing.unwrap_err().to_string(), "'Nobody' is not in supervisores");
        let clash = rename_value(
            &mut config,
            ConfigList::Supervisors,
            "Ana Silva",
            "Mariana Santos",
        );
        assert_eq!(
            clash.unwrap_err().to_string(),
            "'Mariana Santos' is already in supervisores"
        );
        rename_value(&mut config, ConfigList::Supervisors, "Ana Silva", "Ana Silva ").unwrap();
        assert_eq!(config.supervisors[0], "Ana Silva");
    }

    #[test]
    fn remove_requires_presence() {
        let mut config = SystemConfig::default();
        remove_value(&mut config, ConfigList::Updaters, "Maria Ops").unwrap();
        assert_eq!(config.updaters, ["João Tech", "Pedro Field"]);
        assert!(remove_value(&mut config, ConfigList::Updaters, "Maria Ops").is_err());
    }

    #[tokio::test]
    async fn add_persists_to_config_document() {
        let ctx = context();
        run(
            &ctx,
            ConfigCommand::Add {
                list: ListName::DraftStatuses,
                value: "Pausado".to_string(),
            },
        )
        .await
        .unwrap();

        let stored = ctx.store.documents("config");
        assert_eq!(stored.len(), 1);
        assert_eq!(
            decode_list(&stored[0].data["statusDraftList"]),
            ["Aberto", "Em Andamento", "Finalizado", "Pausado"]
        );
    }

    #[tokio::test]
    async fn rename_persists_to_config_document() {
        let ctx = context();
        run(
            &ctx,
            ConfigCommand::Rename {
                list: ListName::Statuses,
                old: "Novo".to_string(),
                new: "Recebido".to_string(),
            },
        )
        .await
        .unwrap();

        let stored = ctx.store.documents("config");
        assert_eq!(stored.len(), 1);
        assert_eq!(decode_list(&stored[0].data["statusList"])[0], "Recebido");
    }

    #[test]
    fn list_names_map_to_attributes() {
        assert_eq!(
            ConfigList::from(ListName::DraftStatuses).attribute(),
            "statusDraftList"
        );
        assert_eq!(ConfigList::from(ListName::Cities).attribute(), "cidades");
    }
}

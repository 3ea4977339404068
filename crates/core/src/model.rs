//! Domain types and their mapping to stored attributes.
//!
//! Attribute names (`pedido`, `cidades`, ...) belong to the remote schema and
//! must not change; the Rust field names are free.

use std::fmt;
use std::str::FromStr;

use orderdesk_storage::{Document, Payload};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::codec::{decode_list, encode_list};

// ──────────────────────────────────────────────
// Orders
// ──────────────────────────────────────────────

/// Whether fulfilling the order changed the network (`"Sim"` / `"Não"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkChange {
    #[serde(rename = "Sim")]
    Yes,
    #[default]
    #[serde(rename = "Não")]
    No,
}

impl NetworkChange {
    pub fn as_stored(&self) -> &'static str {
        match self {
            NetworkChange::Yes => "Sim",
            NetworkChange::No => "Não",
        }
    }

    /// Lenient read: anything other than `"Sim"` is `No`.
    pub fn from_stored(value: &str) -> Self {
        if value == "Sim" {
            NetworkChange::Yes
        } else {
            NetworkChange::No
        }
    }
}

impl FromStr for NetworkChange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sim" | "yes" | "true" => Ok(NetworkChange::Yes),
            "não" | "nao" | "no" | "false" => Ok(NetworkChange::No),
            other => Err(format!("expected yes/no (Sim/Não), got '{other}'")),
        }
    }
}

impl fmt::Display for NetworkChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_stored())
    }
}

/// Business fields of an order, as written to the store.
///
/// Serializing yields the storage payload. `draft` and `draft_status` are
/// left out when unset, so an update without them keeps whatever the
/// document holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFields {
    #[serde(rename = "pedido")]
    pub order_number: String,
    #[serde(rename = "cliente")]
    pub customer: String,
    #[serde(rename = "cidade")]
    pub city: String,
    pub cluster: String,
    pub status: String,
    #[serde(rename = "obs")]
    pub notes: String,
    pub supervisor: String,
    #[serde(rename = "alteracaoRede")]
    pub network_change: NetworkChange,
    #[serde(rename = "redeDesignada")]
    pub designated_network: String,
    #[serde(rename = "redeConstruida")]
    pub built_network: String,
    #[serde(rename = "chamado")]
    pub ticket: String,
    #[serde(rename = "atualizadoPor")]
    pub updated_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<i64>,
    #[serde(rename = "statusDraft", skip_serializing_if = "Option::is_none")]
    pub draft_status: Option<String>,
}

impl OrderFields {
    /// Storage payload for these fields.
    pub fn to_payload(&self) -> Payload {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Payload::new(),
        }
    }

    /// Read fields from stored attributes.
    ///
    /// Never fails: an absent or wrongly typed attribute takes the field's
    /// default, so one odd document cannot break a whole listing.
    pub fn from_payload(data: &Payload) -> Self {
        let text = |key: &str| -> String {
            match data.get(key) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                Some(Value::Bool(b)) => b.to_string(),
                _ => String::new(),
            }
        };
        let draft = data.get("draft").and_then(|v| match v {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });
        let draft_status = match data.get("statusDraft") {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        OrderFields {
            order_number: text("pedido"),
            customer: text("cliente"),
            city: text("cidade"),
            cluster: text("cluster"),
            status: text("status"),
            notes: text("obs"),
            supervisor: text("supervisor"),
            network_change: NetworkChange::from_stored(&text("alteracaoRede")),
            designated_network: text("redeDesignada"),
            built_network: text("redeConstruida"),
            ticket: text("chamado"),
            updated_by: text("atualizadoPor"),
            draft,
            draft_status,
        }
    }
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(flatten)]
    pub fields: OrderFields,
    /// Creation time in milliseconds since the Unix epoch (0 if unknown).
    pub created_at_ms: i64,
}

impl Order {
    pub fn from_document(document: &Document) -> Self {
        Order {
            id: document.id.clone(),
            fields: OrderFields::from_payload(&document.data),
            created_at_ms: timestamp_millis(&document.created_at).unwrap_or(0),
        }
    }
}

fn timestamp_millis(text: &str) -> Option<i64> {
    let at = OffsetDateTime::parse(text, &Rfc3339).ok()?;
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).ok()
}

// ──────────────────────────────────────────────
// System configuration
// ──────────────────────────────────────────────

/// The list-valued fields of [`SystemConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigList {
    Cities,
    Clusters,
    Supervisors,
    Statuses,
    Updaters,
    DraftStatuses,
}

impl ConfigList {
    pub const ALL: [ConfigList; 6] = [
        ConfigList::Cities,
        ConfigList::Clusters,
        ConfigList::Supervisors,
        ConfigList::Statuses,
        ConfigList::Updaters,
        ConfigList::DraftStatuses,
    ];

    /// Attribute name of the text column holding this list.
    pub fn attribute(&self) -> &'static str {
        match self {
            ConfigList::Cities => "cidades",
            ConfigList::Clusters => "clusters",
            ConfigList::Supervisors => "supervisores",
            ConfigList::Statuses => "statusList",
            ConfigList::Updaters => "atualizadores",
            ConfigList::DraftStatuses => "statusDraftList",
        }
    }
}

/// Lists of valid values offered when recording orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    pub cities: Vec<String>,
    pub clusters: Vec<String>,
    pub supervisors: Vec<String>,
    pub statuses: Vec<String>,
    pub updaters: Vec<String>,
    pub draft_statuses: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SystemConfig {
    /// Compiled-in configuration used on first run.
    fn default() -> Self {
        SystemConfig {
            cities: strings(&["São Paulo", "Rio de Janeiro", "Belo Horizonte", "Curitiba"]),
            clusters: strings(&["Cluster Norte", "Cluster Sul", "Cluster Leste", "Cluster Oeste"]),
            supervisors: strings(&["Ana Silva", "Carlos Oliveira", "Mariana Santos"]),
            statuses: strings(&[
                "Novo",
                "Em Análise",
                "Aprovado",
                "Em Construção",
                "Concluído",
                "Cancelado",
            ]),
            updaters: strings(&["João Tech", "Maria Ops", "Pedro Field"]),
            draft_statuses: strings(&["Aberto", "Em Andamento", "Finalizado"]),
        }
    }
}

impl SystemConfig {
    pub fn list(&self, list: ConfigList) -> &Vec<String> {
        match list {
            ConfigList::Cities => &self.cities,
            ConfigList::Clusters => &self.clusters,
            ConfigList::Supervisors => &self.supervisors,
            ConfigList::Statuses => &self.statuses,
            ConfigList::Updaters => &self.updaters,
            ConfigList::DraftStatuses => &self.draft_statuses,
        }
    }

    pub fn list_mut(&mut self, list: ConfigList) -> &mut Vec<String> {
        match list {
            ConfigList::Cities => &mut self.cities,
            ConfigList::Clusters => &mut self.clusters,
            ConfigList::Supervisors => &mut self.supervisors,
            ConfigList::Statuses => &mut self.statuses,
            ConfigList::Updaters => &mut self.updaters,
            ConfigList::DraftStatuses => &mut self.draft_statuses,
        }
    }

    /// Storage payload: every list encoded into its text column.
    pub fn to_payload(&self) -> Payload {
        let mut payload = Payload::new();
        for list in ConfigList::ALL {
            payload.insert(
                list.attribute().to_string(),
                Value::String(encode_list(self.list(list))),
            );
        }
        payload
    }

    /// Decode every list from stored attributes. Absent columns decode to
    /// empty lists.
    pub fn from_payload(data: &Payload) -> Self {
        let mut config = SystemConfig {
            cities: Vec::new(),
            clusters: Vec::new(),
            supervisors: Vec::new(),
            statuses: Vec::new(),
            updaters: Vec::new(),
            draft_statuses: Vec::new(),
        };
        for list in ConfigList::ALL {
            *config.list_mut(list) = decode_list(data.get(list.attribute()).unwrap_or(&Value::Null));
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_fields() -> OrderFields {
        OrderFields {
            order_number: "P-100".to_string(),
            customer: "ACME".to_string(),
            city: "Curitiba".to_string(),
            cluster: "Cluster Sul".to_string(),
            status: "Novo".to_string(),
            notes: String::new(),
            supervisor: "Ana Silva".to_string(),
            network_change: NetworkChange::Yes,
            designated_network: "R1".to_string(),
            built_network: "R2".to_string(),
            ticket: "T-9".to_string(),
            updated_by: "Maria Ops".to_string(),
            draft: None,
            draft_status: None,
        }
    }

    #[test]
    fn order_payload_uses_stored_attribute_names() {
        let payload = sample_fields().to_payload();
        let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "pedido",
                "cliente",
                "cidade",
                "cluster",
                "status",
                "obs",
                "supervisor",
                "alteracaoRede",
                "redeDesignada",
                "redeConstruida",
                "chamado",
                "atualizadoPor"
            ]
        );
        assert_eq!(payload["alteracaoRede"], json!("Sim"));
    }

    #[test]
    fn optional_fields_serialized_when_set() {
        let mut fields = sample_fields();
        fields.draft = Some(2);
        fields.draft_status = Some("Aberto".to_string());
        let payload = fields.to_payload();
        assert_eq!(payload["draft"], json!(2));
        assert_eq!(payload["statusDraft"], json!("Aberto"));
        assert_eq!(OrderFields::from_payload(&payload), fields);
    }

    #[test]
    fn reading_old_document_defaults_missing_fields() {
        let data = match json!({"pedido": "P-1", "cidade": "Curitiba", "draft": "x"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let fields = OrderFields::from_payload(&data);
        assert_eq!(fields.order_number, "P-1");
        assert_eq!(fields.customer, "");
        assert_eq!(fields.network_change, NetworkChange::No);
        assert_eq!(fields.draft, None);
        assert_eq!(fields.draft_status, None);
    }

    #[test]
    fn order_from_document_reads_creation_time() {
        let document = Document {
            id: "o1".to_string(),
            created_at: "2025-01-01T00:00:01.500+00:00".to_string(),
            updated_at: String::new(),
            data: sample_fields().to_payload(),
        };
        let order = Order::from_document(&document);
        assert_eq!(order.id, "o1");
        assert_eq!(order.created_at_ms, 1_735_689_601_500);
        assert_eq!(order.fields, sample_fields());

        let bad = Document {
            created_at: "yesterday".to_string(),
            ..document
        };
        assert_eq!(Order::from_document(&bad).created_at_ms, 0);
    }

    #[test]
    fn network_change_parsing() {
        assert_eq!("Sim".parse::<NetworkChange>().unwrap(), NetworkChange::Yes);
        assert_eq!("não".parse::<NetworkChange>().unwrap(), NetworkChange::No);
        assert_eq!("yes".parse::<NetworkChange>().unwrap(), NetworkChange::Yes);
        assert!("maybe".parse::<NetworkChange>().is_err());
        assert_eq!(NetworkChange::from_stored("garbage"), NetworkChange::No);
    }

    #[test]
    fn default_config_shape() {
        let config = SystemConfig::default();
        assert_eq!(config.cities.len(), 4);
        assert_eq!(config.statuses.len(), 6);
        assert_eq!(config.draft_statuses, ["Aberto", "Em Andamento", "Finalizado"]);
    }

    #[test]
    fn config_payload_round_trips_through_text_columns() {
        let config = SystemConfig::default();
        let payload = config.to_payload();
        assert_eq!(payload.len(), 6);
        assert!(payload.values().all(Value::is_string));
        assert_eq!(
            payload["cidades"],
            json!(r#"["São Paulo","Rio de Janeiro","Belo Horizonte","Curitiba"]"#)
        );
        assert_eq!(SystemConfig::from_payload(&payload), config);
    }

    #[test]
    fn config_from_legacy_and_partial_document() {
        let data = match json!({"cidades": "Curitiba", "clusters": "[]"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let config = SystemConfig::from_payload(&data);
        assert_eq!(config.cities, ["Curitiba"]);
        assert!(config.clusters.is_empty());
        assert!(config.draft_statuses.is_empty());
    }
}

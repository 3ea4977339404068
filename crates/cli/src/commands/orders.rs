use clap::{Args, Subcommand};
use orderdesk_core::{NetworkChange, Order, OrderFields, OrderStats};
use orderdesk_storage::{DocumentStore, Query, StoreError, ATTR_ID};

use super::{print_json, CommandError, Context};
use crate::OutputFormat;

#[derive(Subcommand)]
pub(crate) enum OrdersCommand {
    /// List orders, newest first
    List {
        /// Only orders in this city
        #[arg(long)]
        city: Option<String>,
        /// Only orders with this status
        #[arg(long)]
        status: Option<String>,
    },
    /// Record a new order
    Create {
        /// Order number
        #[arg(long)]
        number: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Change fields of an existing order; omitted fields keep their values
    Update {
        /// Order id
        id: String,
        /// Order number
        #[arg(long)]
        number: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Order count and daily average over the period the orders cover
    Stats {
        /// Only orders in this city
        #[arg(long)]
        city: Option<String>,
    },
    /// Delete an order
    Delete {
        /// Order id
        id: String,
    },
}

/// Order fields settable from the command line.
#[derive(Args, Debug, Default, Clone)]
pub(crate) struct FieldArgs {
    #[arg(long)]
    customer: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    cluster: Option<String>,
    #[arg(long)]
    status: Option<String>,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    supervisor: Option<String>,
    /// Whether the network changed (yes/no)
    #[arg(long)]
    network_change: Option<NetworkChange>,
    #[arg(long)]
    designated_network: Option<String>,
    #[arg(long)]
    built_network: Option<String>,
    /// Support ticket reference
    #[arg(long)]
    ticket: Option<String>,
    /// Who made this change
    #[arg(long)]
    updated_by: Option<String>,
    #[arg(long)]
    draft: Option<i64>,
    #[arg(long)]
    draft_status: Option<String>,
}

impl FieldArgs {
    fn apply(&self, fields: &mut OrderFields) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        set(&mut fields.customer, &self.customer);
        set(&mut fields.city, &self.city);
        set(&mut fields.cluster, &self.cluster);
        set(&mut fields.status, &self.status);
        set(&mut fields.notes, &self.notes);
        set(&mut fields.supervisor, &self.supervisor);
        set(&mut fields.designated_network, &self.designated_network);
        set(&mut fields.built_network, &self.built_network);
        set(&mut fields.ticket, &self.ticket);
        set(&mut fields.updated_by, &self.updated_by);
        if let Some(change) = self.network_change {
            fields.network_change = change;
        }
        if self.draft.is_some() {
            fields.draft = self.draft;
        }
        if self.draft_status.is_some() {
            fields.draft_status = self.draft_status.clone();
        }
    }
}

pub(crate) async fn run<S: DocumentStore>(
    ctx: &Context<S>,
    command: OrdersCommand,
) -> Result<(), CommandError> {
    let repo = ctx.orders();
    match command {
        OrdersCommand::List { city, status } => {
            let mut filters = Vec::new();
            if let Some(city) = city {
                filters.push(Query::equal("cidade", city));
            }
            if let Some(status) = status {
                filters.push(Query::equal("status", status));
            }
            let orders = repo.list_filtered(&filters).await?;
            match ctx.output {
                OutputFormat::Json => print_json(&orders),
                OutputFormat::Text => {
                    if orders.is_empty() {
                        println!("no orders");
                    }
                    for order in &orders {
                        println!("{}", summary_line(order));
                    }
                }
            }
        }
        OrdersCommand::Create { number, fields } => {
            let mut order = OrderFields {
                order_number: number,
                ..OrderFields::default()
            };
            fields.apply(&mut order);
            let created = repo.create(&order).await?;
            report(ctx.output, "created", &created);
        }
        OrdersCommand::Update { id, number, fields } => {
            let existing = repo
                .list_filtered(&[Query::equal(ATTR_ID, id.as_str())])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| StoreError::DocumentNotFound {
                    collection: ctx.collections.orders.clone(),
                    document_id: id.clone(),
                })?;
            let mut order = existing.fields;
            if let Some(number) = number {
                order.order_number = number;
            }
            fields.apply(&mut order);
            let updated = repo.update(&id, &order).await?;
            report(ctx.output, "updated", &updated);
        }
        OrdersCommand::Stats { city } => {
            let orders = repo.list().await?;
            let stats = OrderStats::compute(&orders, city.as_deref());
            match ctx.output {
                OutputFormat::Json => print_json(&stats_json(&stats)),
                OutputFormat::Text => println!("{}", stats_text(&stats)),
            }
        }
        OrdersCommand::Delete { id } => {
            repo.delete(&id).await?;
            match ctx.output {
                OutputFormat::Json => print_json(&serde_json::json!({ "deleted": id })),
                OutputFormat::Text => println!("deleted {id}"),
            }
        }
    }
    Ok(())
}

fn report(output: OutputFormat, verb: &str, order: &Order) {
    match output {
        OutputFormat::Json => print_json(order),
        OutputFormat::Text => println!("{verb} {}", summary_line(order)),
    }
}

fn summary_line(order: &Order) -> String {
    let f = &order.fields;
    format!(
        "{}  {}  {}  {}  {}",
        order.id, f.order_number, f.customer, f.city, f.status
    )
}

fn stats_json(stats: &OrderStats) -> serde_json::Value {
    serde_json::json!({
        "total": stats.total,
        "days": stats.days,
        "daily_average": stats.daily_average,
        "first_day": stats.first_day.map(|d| d.to_string()),
        "last_day": stats.last_day.map(|d| d.to_string()),
    })
}

fn stats_text(stats: &OrderStats) -> String {
    let period = match (stats.first_day, stats.last_day) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{first} to {last}"),
        _ => return "no orders".to_string(),
    };
    format!(
        "{} orders over {} day(s) ({period}), {:.1} per day",
        stats.total, stats.days, stats.daily_average
    )
}

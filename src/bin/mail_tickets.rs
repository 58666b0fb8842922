use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

use mail_tickets::auth::oauth::PkceProvider;
use mail_tickets::auth::{Purpose, Session};
use mail_tickets::config::{Config, load_config};
use mail_tickets::domain::mapping::FieldMapping;
use mail_tickets::domain::sharepoint::mappable_columns;
use mail_tickets::graph::{GraphApi, GraphClient};
use mail_tickets::terminal::run_tui;
use mail_tickets::tickets::{SubmitRequest, submit_tickets};

#[derive(Parser)]
#[command(name = "mail_tickets")]
#[command(about = "Turn Outlook emails into SharePoint list tickets", long_about = None)]
struct Cli {
    /// Sign in with one account for reading mail and another for writing tickets
    #[arg(long, global = true)]
    separate_accounts: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive ticket form (default)
    Tui,

    /// Print the first page of the inbox
    Inbox,

    /// Print the SharePoint sites the writer can see
    Sites,

    /// Print the lists of a site
    Lists {
        #[arg(long)]
        site: String,
    },

    /// Print the columns of a list a ticket field can be mapped to
    Columns {
        #[arg(long)]
        site: String,
        #[arg(long)]
        list: String,
    },

    /// Create one ticket per message and print the results as JSON
    Submit {
        #[arg(long)]
        site: String,
        #[arg(long)]
        list: String,
        /// Message id from `inbox`; repeat for several
        #[arg(long = "message", required = true)]
        messages: Vec<String>,
        /// field=column, e.g. subject=Title; repeat for several
        #[arg(long = "map")]
        maps: Vec<String>,
    },
}

/// Graph client and a fresh session for one-shot commands.
fn headless(cfg: &Config, same_account: bool) -> Result<(GraphClient, Session<PkceProvider>)> {
    let graph = GraphClient::new(cfg.graph_base_url())?;
    let provider = PkceProvider::new(&cfg.client_id, cfg.authority(), cfg.redirect_uri())?;
    Ok((graph, Session::new(provider, cfg.scopes(), same_account)))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    let same_account = cfg.same_account() && !cli.separate_accounts;

    match cli.cmd.unwrap_or(Command::Tui) {
        Command::Tui => run_tui(&cfg, same_account),

        Command::Inbox => {
            let (graph, mut session) = headless(&cfg, same_account)?;
            let reader = session.acquire_credential(Purpose::MailRead)?;
            for m in graph.list_messages(&reader)? {
                println!(
                    "{}\t{}\t{}\t{}",
                    m.id,
                    m.received_date_time.as_deref().unwrap_or("-"),
                    m.sender_address().unwrap_or("-"),
                    m.display_subject()
                );
            }
            Ok(())
        }

        Command::Sites => {
            let (graph, mut session) = headless(&cfg, same_account)?;
            let writer = session.acquire_credential(Purpose::ListWrite)?;
            for s in graph.list_sites(&writer)? {
                println!("{}\t{}", s.id, s.label());
            }
            Ok(())
        }

        Command::Lists { site } => {
            let (graph, mut session) = headless(&cfg, same_account)?;
            let writer = session.acquire_credential(Purpose::ListWrite)?;
            for l in graph.list_lists(&writer, &site)? {
                println!("{}\t{}", l.id, l.label());
            }
            Ok(())
        }

        Command::Columns { site, list } => {
            let (graph, mut session) = headless(&cfg, same_account)?;
            let writer = session.acquire_credential(Purpose::ListWrite)?;
            for c in mappable_columns(graph.list_columns(&writer, &site, &list)?) {
                println!("{}\t{}", c.name, c.label());
            }
            Ok(())
        }

        Command::Submit {
            site,
            list,
            messages,
            maps,
        } => {
            let mut request = SubmitRequest {
                selection: messages,
                messages: Vec::new(),
                site_id: Some(site),
                list_id: Some(list),
                mapping: None,
            };
            request.validate()?;
            let pairs = maps
                .iter()
                .map(|p| FieldMapping::parse_pair(p))
                .collect::<Result<Vec<_>, _>>()?;

            let (graph, mut session) = headless(&cfg, same_account)?;

            let reader = session.acquire_credential(Purpose::MailRead)?;
            request.messages = graph
                .list_messages(&reader)
                .context("loading the inbox")?;
            for id in &request.selection {
                if !request.messages.iter().any(|m| &m.id == id) {
                    log::warn!("message {id} is not on the first inbox page, skipping");
                }
            }

            let writer = session.acquire_credential(Purpose::ListWrite)?;
            let (site_id, list_id) = request.validate()?;
            if !pairs.is_empty() {
                let columns = mappable_columns(
                    graph
                        .list_columns(&writer, site_id, list_id)
                        .context("loading list columns")?,
                );
                let mut mapping = FieldMapping::new();
                for (field, column) in pairs {
                    mapping.assign(field, &column, &columns)?;
                }
                request.mapping = Some(mapping);
            }

            let results = submit_tickets(&graph, &writer, &request, cfg.ticket_clock())?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
    }
}

//! jirakit - search JIRA and track bulk jobs from the terminal.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use jirakit::api::{Issue, JiraClient, SearchService};
use jirakit::bulk::BulkService;
use jirakit::config::Config;
use jirakit::search::{QueryBuilder, SearchCursor, SearchOptions};
use jirakit::{logging, AppError, Context, Result};

#[derive(Debug, Parser)]
#[command(name = "jirakit", version, about = "Search JIRA and track bulk jobs")]
struct Cli {
    /// Profile to use (defaults to the configured default profile).
    #[arg(long, global = true)]
    profile: Option<String>,

    /// Log to stderr instead of the log file.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the JQL built from filter flags.
    Jql(QueryArgs),

    /// Search issues and print one per line.
    Search {
        /// Raw JQL; when omitted the query is built from filter flags.
        jql: Option<String>,

        #[command(flatten)]
        query: QueryArgs,

        /// Use continuation-token pagination.
        #[arg(long)]
        token: bool,

        /// Stop after this many issues.
        #[arg(long)]
        limit: Option<usize>,

        /// Fields to request.
        #[arg(long, value_delimiter = ',', default_value = "summary,status")]
        fields: Vec<String>,
    },

    /// Submit a bulk delete and print the task id.
    SubmitDelete {
        /// Issue keys or ids.
        #[arg(required = true)]
        issues: Vec<String>,

        /// Wait for the task to finish.
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        wait_args: WaitArgs,
    },

    /// Wait for a task to reach a terminal status.
    Wait {
        task_id: String,

        #[command(flatten)]
        wait_args: WaitArgs,
    },
}

#[derive(Debug, Args)]
struct QueryArgs {
    #[arg(long)]
    project: Option<String>,
    #[arg(long)]
    status: Option<String>,
    /// Assignee; pass an empty string for unassigned issues.
    #[arg(long)]
    assignee: Option<String>,
    #[arg(long = "label")]
    labels: Vec<String>,
    /// Free-text search over summary, description, and comments.
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    order_by: Option<String>,
    /// Sort descending.
    #[arg(long)]
    desc: bool,
}

impl QueryArgs {
    fn build(&self) -> QueryBuilder {
        let mut builder = QueryBuilder::new();
        if let Some(project) = &self.project {
            builder = builder.and().project(project);
        }
        if let Some(status) = &self.status {
            builder = builder.and().status(status);
        }
        if let Some(assignee) = &self.assignee {
            builder = builder.and().assignee(assignee);
        }
        if !self.labels.is_empty() {
            builder = builder.and().labels(&self.labels);
        }
        if let Some(text) = &self.text {
            builder = builder.and().text(text);
        }
        if let Some(field) = &self.order_by {
            let direction = if self.desc { "DESC" } else { "ASC" };
            builder = builder.order_by(field, direction);
        }
        builder
    }
}

#[derive(Debug, Args)]
struct WaitArgs {
    /// Seconds between polls.
    #[arg(long)]
    interval: Option<u64>,

    /// Give up after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let logged = if cli.verbose {
        logging::init_stderr()
    } else {
        logging::init()
    };
    if let Err(e) = logged {
        eprintln!("warning: logging disabled: {}", e);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e);
        eprintln!("error: {}", e.user_message());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Command::Jql(query) = &cli.command {
        println!("{}", query.build());
        return Ok(());
    }

    let config = Config::load()?;
    let profile = config.profile(cli.profile.as_deref())?;
    let client = JiraClient::from_profile(profile, config.settings.resilience.clone())?;

    match cli.command {
        Command::Jql(_) => Ok(()),
        Command::Search {
            jql,
            query,
            token,
            limit,
            fields,
        } => {
            let jql = jql.unwrap_or_else(|| query.build().render());
            let service = SearchService::new(&client);
            let options = SearchOptions::new(jql).with_fields(fields);

            let count = if token {
                let options = options.with_page_size(config.settings.search.token_page_size);
                print_issues(service.iter_jql(&options)?, limit).await?
            } else {
                let options = options.with_page_size(config.settings.search.page_size);
                print_issues(service.iter(&options)?, limit).await?
            };
            eprintln!("{} issue(s)", count);
            Ok(())
        }
        Command::SubmitDelete {
            issues,
            wait,
            wait_args,
        } => {
            let service = BulkService::new(&client);
            let task_id = service.submit_delete(&issues).await?;
            println!("{}", task_id);
            if wait {
                wait_for_task(&service, &config, &task_id, &wait_args).await?;
            }
            Ok(())
        }
        Command::Wait { task_id, wait_args } => {
            let service = BulkService::new(&client);
            wait_for_task(&service, &config, &task_id, &wait_args).await
        }
    }
}

async fn print_issues<C>(mut cursor: C, limit: Option<usize>) -> Result<usize>
where
    C: SearchCursor<Item = Issue>,
{
    let mut count = 0;
    while limit.map_or(true, |max| count < max) && cursor.advance().await {
        if let Some(issue) = cursor.current() {
            println!("{}", issue);
            count += 1;
        }
    }
    match cursor.take_error() {
        Some(err) => Err(err.into()),
        None => Ok(count),
    }
}

async fn wait_for_task(
    service: &BulkService<'_, JiraClient>,
    config: &Config,
    task_id: &str,
    args: &WaitArgs,
) -> Result<()> {
    let interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.settings.bulk.poll_interval());
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .or_else(|| config.settings.bulk.timeout());

    let ctx = match timeout {
        Some(timeout) => Context::with_timeout(timeout),
        None => Context::new(),
    };

    let interrupt = ctx.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let outcome = service
        .tracker()
        .with_poll_interval(interval)
        .wait_with_progress(&ctx, task_id, |job| eprintln!("{}", job))
        .await;
    watcher.abort();

    let job = outcome?;
    println!("{}", job);
    if job.status != jirakit::bulk::JobStatus::Complete {
        return Err(AppError::other(format!(
            "task {} finished as {}",
            job.id, job.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(args: &[&str]) -> String {
        let argv = ["jirakit", "jql"].into_iter().chain(args.iter().copied());
        let cli = Cli::parse_from(argv);
        match cli.command {
            Command::Jql(query) => query.build().render(),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_jql_from_flags() {
        assert_eq!(
            query(&["--project", "X", "--status", "Open", "--order-by", "created", "--desc"]),
            "project = X AND status = Open ORDER BY created DESC"
        );
    }

    #[test]
    fn test_jql_labels_and_unassigned() {
        assert_eq!(
            query(&["--assignee", "", "--label", "a", "--label", "b"]),
            "assignee is EMPTY AND labels = a AND labels = b"
        );
    }

    #[test]
    fn test_jql_text_is_quoted() {
        assert_eq!(query(&["--text", "out of memory"]), r#"text ~ "out of memory""#);
    }

    #[test]
    fn test_cli_parses_wait() {
        let cli = Cli::parse_from(["jirakit", "wait", "10641", "--interval", "2", "--timeout", "60"]);
        match cli.command {
            Command::Wait { task_id, wait_args } => {
                assert_eq!(task_id, "10641");
                assert_eq!(wait_args.interval, Some(2));
                assert_eq!(wait_args.timeout, Some(60));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

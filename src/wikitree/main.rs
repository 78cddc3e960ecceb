use chrono::{DateTime, Utc};
use clap::Parser;
use colored::*;
use std::io::Read;
use std::path::PathBuf;
use wikitree::api::{CmdMessage, CmdResult, MessageLevel, TreeEntry, WikiApi};
use wikitree::config::WikiConfig;
use wikitree::error::Result;

mod args;
use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    config: WikiConfig,
    root: PathBuf,
    readonly: bool,
}

impl AppContext {
    fn open(&self) -> Result<WikiApi> {
        WikiApi::open(self.config.clone(), &self.root, self.readonly)
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = init_context(&cli);

    match cli.command {
        Commands::Init => print_result(&WikiApi::init(&ctx.root)?),
        Commands::ResetRoot => print_result(&WikiApi::reset_root(&ctx.root)?),
        Commands::Tree { page } => handle_tree(&ctx, page),
        Commands::Add {
            parent,
            title,
            page_type,
            tags,
        } => print_result(&ctx.open()?.create_page(&parent, &title, &page_type, &tags)?),
        Commands::Rename { page, title } => print_result(&ctx.open()?.rename_page(&page, &title)?),
        Commands::Mv { page, new_parent } => {
            print_result(&ctx.open()?.move_page(&page, &new_parent)?)
        }
        Commands::Rm { page } => print_result(&ctx.open()?.remove_page(&page)?),
        Commands::Sort { page } => print_result(&ctx.open()?.sort_children(&page)?),
        Commands::Order { page, position } => {
            print_result(&ctx.open()?.set_order(&page, position)?)
        }
        Commands::Write { page, content } => handle_write(&ctx, page, content),
        Commands::Tag { page, tags, remove } => {
            let mut api = ctx.open()?;
            let result = if remove {
                api.remove_tags(&page, &tags)?
            } else {
                api.add_tags(&page, &tags)?
            };
            print_result(&result)
        }
        Commands::Render { pages } => {
            let result = ctx.open()?.render(&pages)?;
            for path in &result.html_paths {
                println!("{}", path.display());
            }
            print_result(&result)
        }
        Commands::Invalidate { pages } => print_result(&ctx.open()?.invalidate(&pages)?),
        Commands::Attach { page, files } => print_result(&ctx.open()?.attach(&page, &files)?),
        Commands::Detach { page, name } => print_result(&ctx.open()?.detach(&page, &name)?),
        Commands::Attachments { page } => {
            let result = ctx.open()?.attachments(&page)?;
            if result.attachments.is_empty() {
                println!("{}", "No attachments.".dimmed());
            }
            for name in &result.attachments {
                println!("{}", name);
            }
            print_result(&result)
        }
        Commands::Stat { page } => print_result(&ctx.open()?.stat(page.as_deref())?),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "wikitree=warn",
        1 => "wikitree=debug",
        _ => "wikitree=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn init_context(cli: &Cli) -> AppContext {
    let config = WikiConfig::config_dir()
        .and_then(WikiConfig::load)
        .unwrap_or_default();

    let root = cli
        .root
        .clone()
        .or_else(|| config.default_root.clone())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    AppContext {
        config,
        root,
        readonly: cli.readonly,
    }
}

fn handle_tree(ctx: &AppContext, page: Option<String>) -> Result<()> {
    let api = ctx.open()?;
    let result = api.tree(page.as_deref().unwrap_or("/"))?;
    if result.listed_pages.is_empty() {
        println!("{}", "No pages yet.".dimmed());
    }
    print_tree(&result.listed_pages);
    print_messages(&result.messages);
    Ok(())
}

fn handle_write(ctx: &AppContext, page: String, content: Option<String>) -> Result<()> {
    let content = match content {
        Some(content) => content,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    print_result(&ctx.open()?.write_content(&page, &content)?)
}

fn print_result(result: &CmdResult) -> Result<()> {
    print_messages(&result.messages);
    Ok(())
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
        }
    }
}

const TIME_WIDTH: usize = 16;

fn print_tree(entries: &[TreeEntry]) {
    let base = entries.iter().map(|e| e.depth).min().unwrap_or(1);
    for entry in entries {
        let indent = "  ".repeat(entry.depth - base);
        let tags = if entry.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", entry.tags.join(", "))
        };
        println!(
            "{} {}{} {}{}",
            format_time_ago(entry.modified).dimmed(),
            indent,
            entry.title.bold(),
            entry.page_type.dimmed(),
            tags.cyan()
        );
    }
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

//! philoagents CLI binary entry point.

use std::io::Write;

use futures::StreamExt;
use philoagents::cli::{ChatArgs, Cli, Commands};
use philoagents::config::Settings;
use philoagents::conversation::{ConversationService, Persona};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::DeleteMemory(args) => {
            philoagents::cli::memory::handle_delete_memory(args, &settings).await?;
        }
        Commands::Chat(args) => handle_chat(args, &settings).await?,
    }
    Ok(())
}

async fn handle_chat(
    args: ChatArgs,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let message = match args.message {
        Some(m) => m,
        None => {
            eprintln!("Usage: philoagents chat \"your message here\"");
            std::process::exit(1);
        }
    };

    let persona = Persona::builder()
        .id(args.id)
        .name(args.name)
        .perspective(args.perspective)
        .style(args.style)
        .context(args.context)
        .build();

    let service = ConversationService::from_settings(settings)?;
    let mut stream = service.get_streaming_response(message, &persona, args.new_thread);

    let mut stdout = std::io::stdout();
    while let Some(fragment) = stream.next().await {
        print!("{}", fragment?);
        let _ = stdout.flush();
    }
    println!();
    Ok(())
}

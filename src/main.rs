use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use shotpair::{handle, render, CaptureConfig, Session};

#[derive(Parser)]
#[command(name = "shotpair", version, about = "Paired mobile/desktop screenshot capture")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Capture one URL and write mobile.png / desktop.png
    Take {
        /// Target URL to capture
        url: String,
        /// Directory the two images are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Capture endpoint (service or relay)
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Interactive loop: read URLs from stdin, capture each pair
    Prompt {
        /// Capture endpoint (service or relay)
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Run the credential relay holding the access key server-side
    #[cfg(feature = "relay")]
    Relay {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8787")]
        listen: std::net::SocketAddr,
        /// Upstream capture endpoint
        #[arg(long)]
        endpoint: Option<String>,
    },
}

fn config_for(endpoint: Option<String>) -> CaptureConfig {
    let mut config = CaptureConfig::from_env();
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    config
}

/// Transient images live here until persisted or released.
fn session_dir() -> PathBuf {
    std::env::temp_dir().join(format!("shotpair-{}", std::process::id()))
}

async fn take(url: &str, out_dir: PathBuf, endpoint: Option<String>) -> anyhow::Result<()> {
    let config = config_for(endpoint);
    let mut session = Session::new(&config, session_dir())?;

    session.submit(url).await;
    if let Some(error) = &session.state().error {
        anyhow::bail!("{}", error);
    }

    let (mobile, desktop) = session
        .take_images()
        .context("capture settled without images")?;

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let (mobile_path, desktop_path) = handle::persist_pair(
        mobile,
        desktop,
        &out_dir.join("mobile.png"),
        &out_dir.join("desktop.png"),
    )?;

    println!("mobile:  {}", mobile_path.display());
    println!("desktop: {}", desktop_path.display());
    Ok(())
}

async fn prompt(endpoint: Option<String>) -> anyhow::Result<()> {
    let config = config_for(endpoint);
    let mut session = Session::new(&config, session_dir())?;

    let stdin = io::stdin();
    let mut out = io::stdout();
    loop {
        write!(out, "url> ")?;
        out.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF; dropping the session releases remaining images
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        session.submit(input).await;
        print!("{}", render::render(session.state()));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Take {
            url,
            out_dir,
            endpoint,
        } => take(&url, out_dir, endpoint).await,
        Command::Prompt { endpoint } => prompt(endpoint).await,
        #[cfg(feature = "relay")]
        Command::Relay { listen, endpoint } => {
            shotpair::relay::serve(listen, &config_for(endpoint))
                .await
                .context("relay failed")
        }
    }
}

// src/main.rs
use imgpipe::commands::{self, Command, Reply};
use imgpipe::services::HttpImageService;
use imgpipe::state::ModalHost;
use imgpipe::{AppState, Config, render};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// `commands::execute` refuses background commands while the viewer is open,
/// so the host only records the transitions.
struct TerminalHost;

impl ModalHost for TerminalHost {
    fn lock_interaction(&self) {
        debug!("Viewer opened, background commands suspended");
    }

    fn unlock_interaction(&self) {
        debug!("Viewer closed, background commands resumed");
    }

    fn bind_navigation_keys(&self) {
        debug!("Viewer keys bound");
    }

    fn unbind_navigation_keys(&self) {
        debug!("Viewer keys unbound");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;
    info!("Using image service at {}", config.api_base);

    let service = Arc::new(HttpImageService::new(&config)?);
    let mut app = AppState::new(service, Arc::new(TerminalHost));

    println!("{}", commands::HELP);
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut buf = Vec::new();

    loop {
        tokio::select! {
            read = stdin.read_until(b'\n', &mut buf) => {
                match read {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Stopped reading input: {}", e);
                        break;
                    }
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                buf.clear();
                if line.trim().is_empty() {
                    continue;
                }
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                match commands::execute(&mut app, command).await {
                    Ok(Reply::Quit) => break,
                    Ok(Reply::Output(text)) if !text.is_empty() => println!("{}", text),
                    Ok(Reply::Output(_)) => {}
                    Err(e) => println!("{}", e.notice()),
                }
            }
            Some(event) = app.next_event() => {
                let applied = app.handle_event(event);
                if let Some(text) = render::applied(&app, &applied) {
                    println!("{}", text);
                }
            }
        }
    }

    info!("Bye");
    Ok(())
}

// src/commands.rs
use crate::app::AppState;
use crate::errors::SyncError;
use crate::models::ImageId;
use crate::render;
use crate::state::NavKey;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  file <path>   pick an image (.jpg, .jpeg, .png) to upload
  upload        send the picked image for processing
  reset         forget the picked image and last result
  refresh       fetch all processed images
  list          show the loaded images
  select <id>   open an image's details (again to close)
  close         close the details
  show          print the open image's details
  json          print the open image as raw JSON
  view [n]      open the viewer on the open image's thumbnails
  next | prev   move through the viewer (wraps around)
  jump <n>      show thumbnail n in the viewer
  esc | outside close the viewer
  stats         fetch processing statistics
  dismiss       clear the current notice
  help          show this text
  quit          leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    File(PathBuf),
    Upload,
    Reset,
    Refresh,
    List,
    Select(ImageId),
    Close,
    Show,
    Json,
    View(usize),
    Next,
    Prev,
    Jump(usize),
    Escape,
    Outside,
    Stats,
    Dismiss,
    Help,
    Quit,
}

impl Command {
    /// Commands still accepted while the viewer holds the interaction lock.
    pub fn allowed_in_viewer(&self) -> bool {
        matches!(
            self,
            Command::Next
                | Command::Prev
                | Command::Jump(_)
                | Command::Escape
                | Command::Outside
                | Command::Help
                | Command::Quit
        )
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Expected a position starting at 1, got {0:?}")]
    BadPosition(String),
}

fn position(arg: &str) -> Result<usize, CommandError> {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| CommandError::BadPosition(arg.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "file" if !rest.is_empty() => Command::File(PathBuf::from(rest)),
            "file" => return Err(CommandError::Usage("file <path>")),
            "upload" => Command::Upload,
            "reset" => Command::Reset,
            "refresh" | "fetch" => Command::Refresh,
            "list" | "ls" => Command::List,
            "select" if !rest.is_empty() => Command::Select(ImageId::from(rest)),
            "select" => return Err(CommandError::Usage("select <id>")),
            "close" => Command::Close,
            "show" => Command::Show,
            "json" => Command::Json,
            "view" if rest.is_empty() => Command::View(0),
            "view" => Command::View(position(rest)?),
            "next" | "right" => Command::Next,
            "prev" | "left" => Command::Prev,
            "jump" if !rest.is_empty() => Command::Jump(position(rest)?),
            "jump" => return Err(CommandError::Usage("jump <n>")),
            "esc" | "escape" => Command::Escape,
            "outside" => Command::Outside,
            "stats" => Command::Stats,
            "dismiss" => Command::Dismiss,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

#[derive(Debug, PartialEq)]
pub enum Reply {
    Output(String),
    Quit,
}

pub async fn execute(app: &mut AppState, command: Command) -> Result<Reply, SyncError> {
    if app.lightbox().is_open() && !command.allowed_in_viewer() {
        return Err(SyncError::InvalidOperation(
            "Close the viewer first (esc or outside)".to_string(),
        ));
    }

    let output = match command {
        Command::File(path) => {
            app.select_file(&path).await?;
            render::upload_card(app.upload())
        }
        Command::Upload => {
            if app.submit()? {
                "Uploading...".to_string()
            } else {
                "An upload is already in progress.".to_string()
            }
        }
        Command::Reset => {
            app.reset_upload();
            "Upload form cleared.".to_string()
        }
        Command::Refresh => {
            app.refresh();
            "Loading...".to_string()
        }
        Command::List => render::collection(app),
        Command::Select(id) => {
            if !app.collection().contains(&id) {
                return Err(SyncError::InvalidOperation(format!("No image with id {}", id)));
            }
            app.toggle_select(id);
            match app.selected_record() {
                Some(record) => render::record_detail(record),
                None => "Details closed.".to_string(),
            }
        }
        Command::Close => {
            app.clear_selection();
            "Details closed.".to_string()
        }
        Command::Show => app
            .selected_record()
            .map(render::record_detail)
            .unwrap_or_else(|| "No image selected.".to_string()),
        Command::Json => {
            let record = app
                .selected_record()
                .ok_or_else(|| SyncError::InvalidOperation("No image selected".to_string()))?;
            serde_json::to_string_pretty(&record.to_raw())
                .map_err(|e| SyncError::Decode(e.to_string()))?
        }
        Command::View(start) => {
            app.open_lightbox(start)?;
            render::lightbox(app.lightbox())
        }
        Command::Next => navigate(app, NavKey::Right),
        Command::Prev => navigate(app, NavKey::Left),
        Command::Escape => {
            if app.lightbox_mut().handle_key(NavKey::Escape) {
                "Viewer closed.".to_string()
            } else {
                "No viewer open.".to_string()
            }
        }
        Command::Jump(index) => {
            if app.lightbox_mut().jump_to(index) {
                render::lightbox(app.lightbox())
            } else if app.lightbox().is_open() {
                format!("The viewer has {} entries.", app.lightbox().entries().len())
            } else {
                "No viewer open.".to_string()
            }
        }
        Command::Outside => {
            if app.lightbox_mut().click_outside() {
                "Viewer closed.".to_string()
            } else {
                "No viewer open.".to_string()
            }
        }
        Command::Stats => {
            app.request_stats();
            "Fetching stats...".to_string()
        }
        Command::Dismiss => {
            app.dismiss_notice();
            String::new()
        }
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(Reply::Quit),
    };
    Ok(Reply::Output(output))
}

fn navigate(app: &mut AppState, key: NavKey) -> String {
    if app.lightbox_mut().handle_key(key) {
        render::lightbox(app.lightbox())
    } else {
        "No viewer open.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::NoopHost;
    use crate::test_support::*;
    use std::sync::Arc;

    #[test]
    fn parses_arguments_and_aliases() {
        assert_eq!("file  ./cat 1.png ".parse::<Command>(), Ok(Command::File(PathBuf::from("./cat 1.png"))));
        assert_eq!("SELECT img_1".parse::<Command>(), Ok(Command::Select(ImageId::from("img_1"))));
        assert_eq!("view".parse::<Command>(), Ok(Command::View(0)));
        assert_eq!("view 2".parse::<Command>(), Ok(Command::View(1)));
        assert_eq!("right".parse::<Command>(), Ok(Command::Next));
        assert_eq!("q".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!("jump 0".parse::<Command>(), Err(CommandError::BadPosition("0".to_string())));
        assert_eq!("jump".parse::<Command>(), Err(CommandError::Usage("jump <n>")));
        assert_eq!("dance".parse::<Command>(), Err(CommandError::Unknown("dance".to_string())));
    }

    #[tokio::test]
    async fn select_unknown_id_is_refused() {
        let service = Arc::new(ScriptedService::default());
        let mut app = AppState::new(service, Arc::new(NoopHost));
        let err = execute(&mut app, Command::Select(ImageId::from("nope")))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn viewer_commands_drive_the_lightbox() {
        let service = Arc::new(ScriptedService::default());
        let mut app = AppState::new(service.clone(), Arc::new(NoopHost));

        service.respond_list(Ok(vec![record("a", "success", &[("small", "s"), ("medium", "m")])]));
        app.refresh();
        let event = app.next_event().await.unwrap();
        app.handle_event(event);

        execute(&mut app, Command::Select(ImageId::from("a"))).await.unwrap();
        execute(&mut app, Command::View(0)).await.unwrap();
        execute(&mut app, Command::Prev).await.unwrap();
        assert_eq!(app.lightbox().index(), Some(1));

        let reply = execute(&mut app, Command::Outside).await.unwrap();
        assert_eq!(reply, Reply::Output("Viewer closed.".to_string()));
        assert!(!app.lightbox().is_open());

        let reply = execute(&mut app, Command::Next).await.unwrap();
        assert_eq!(reply, Reply::Output("No viewer open.".to_string()));
    }

    #[tokio::test]
    async fn open_viewer_blocks_background_commands() {
        let service = Arc::new(ScriptedService::default());
        let mut app = AppState::new(service.clone(), Arc::new(NoopHost));

        service.respond_list(Ok(vec![
            record("a", "success", &[("small", "s"), ("medium", "m")]),
            record("b", "processing", &[]),
        ]));
        app.refresh();
        let event = app.next_event().await.unwrap();
        app.handle_event(event);

        execute(&mut app, Command::Select(ImageId::from("a"))).await.unwrap();
        execute(&mut app, Command::View(0)).await.unwrap();

        for command in [
            Command::Select(ImageId::from("b")),
            Command::Close,
            Command::Refresh,
            Command::Reset,
            Command::Upload,
            Command::File(PathBuf::from("cat.png")),
            Command::View(1),
        ] {
            let err = execute(&mut app, command.clone()).await.unwrap_err();
            assert!(matches!(err, SyncError::InvalidOperation(_)), "{:?} ran", command);
        }
        assert_eq!(app.selected_id(), Some(&ImageId::from("a")));
        assert_eq!(service.list_calls(), 1);
        assert!(!app.collection().is_loading());

        execute(&mut app, Command::Next).await.unwrap();
        assert_eq!(app.lightbox().index(), Some(1));
        execute(&mut app, Command::Escape).await.unwrap();

        let reply = execute(&mut app, Command::Select(ImageId::from("b"))).await.unwrap();
        assert!(matches!(reply, Reply::Output(text) if text.contains("b.png")));
        assert_eq!(app.selected_id(), Some(&ImageId::from("b")));
    }

    #[tokio::test]
    async fn json_prints_the_wire_shape() {
        let service = Arc::new(ScriptedService::default());
        let mut app = AppState::new(service.clone(), Arc::new(NoopHost));

        service.respond_list(Ok(vec![record("bad1", "failed", &[])]));
        app.refresh();
        let event = app.next_event().await.unwrap();
        app.handle_event(event);
        app.toggle_select(ImageId::from("bad1"));

        let Reply::Output(json) = execute(&mut app, Command::Json).await.unwrap() else {
            panic!("expected output");
        };
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["error"], "processing failed");
    }
}

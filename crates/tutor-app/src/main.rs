use anyhow::Context;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use tutor_app::{
    config::Config, logging::init_logging, state::format_relative, ChatController, ChatSettings,
    NewStudentForm,
};
use tutor_auth::{AuthSession, AuthWidget, BypassWidget};
use tutor_types::{ChatEvent, NoticeLevel, Sender};

const HELP: &str = "\
Commands:
  /new <name> | <grade> | <interest>, <interest>   create a student thread
  /threads                                          list threads
  /select <n>                                       switch to thread n
  /sidebar                                          toggle the thread list
  /logout                                           sign out and quit
  /quit                                             exit
Anything else is sent to the assistant on the selected thread.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config.logging);

    tracing::info!("Starting teaching assistant");
    tracing::info!(
        "Assistant: {:?}, database: {:?}",
        config.assistant.provider,
        config.database.backend
    );

    let assistant = config
        .assistant_config()
        .create_client()
        .context("Failed to create assistant client")?;
    let persistence = config
        .persistence_client()
        .context("Failed to create persistence client")?;

    // The hosted widget is browser-only; the terminal signs in with the fixed member
    if !config.auth.bypass {
        anyhow::bail!("The terminal front-end requires auth.bypass = true");
    }
    let widget: Arc<dyn AuthWidget> = Arc::new(BypassWidget::default());
    let auth = Arc::new(AuthSession::new(widget, &config.auth));

    auth.mount().await;
    if !auth.is_authenticated() {
        auth.login().await;
        let mut rx = auth.subscribe();
        let wait = Duration::from_millis(config.auth.recheck_delay_ms) * 3;
        tokio::time::timeout(wait, rx.wait_for(|s| s.is_authenticated()))
            .await
            .context("Timed out waiting for sign-in")?
            .context("Auth session closed")?;
    }

    let (controller, events) =
        ChatController::new(persistence, assistant, auth, ChatSettings::from(&config.chat));
    let printer = tokio::spawn(print_events(events));

    controller.bootstrap().await?;
    print_threads(&controller).await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit", _) => break,
            ("/help", _) => println!("{}", HELP),
            ("/threads", _) => print_threads(&controller).await,
            ("/sidebar", _) => {
                if controller.toggle_sidebar().await {
                    print_threads(&controller).await;
                }
            }
            ("/logout", _) => {
                controller.sign_out().await;
                break;
            }
            ("/new", args) => {
                controller.open_create_modal().await;
                if let Err(e) = controller.create_thread(&parse_form(args)).await {
                    println!("! {}", e);
                    controller.close_create_modal().await;
                }
            }
            ("/select", args) => select_by_index(&controller, args).await,
            _ => {
                if let Err(e) = controller.send_message(line).await {
                    println!("! {}", e);
                }
            }
        }
    }

    drop(controller);
    printer.await.ok();
    Ok(())
}

/// "<name> | <grade> | a, b, c"
fn parse_form(args: &str) -> NewStudentForm {
    let mut parts = args.splitn(3, '|').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let grade = parts.next().unwrap_or_default();
    let interests = parts
        .next()
        .unwrap_or_default()
        .split(',')
        .map(str::to_string)
        .collect();

    NewStudentForm::new(name, grade, interests)
}

async fn select_by_index(controller: &ChatController, args: &str) {
    let previews = controller.previews().await;
    let picked = args
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| previews.get(i));

    match picked {
        Some(preview) => {
            if let Err(e) = controller.select_thread(&preview.thread_id).await {
                println!("! {}", e);
            }
        }
        None => println!("! No thread number {}", args),
    }
}

async fn print_threads(controller: &ChatController) {
    let now = chrono::Utc::now();
    let previews = controller.previews().await;
    if previews.is_empty() {
        println!("No threads yet. Create one with /new");
        return;
    }

    for (i, preview) in previews.iter().enumerate() {
        let marker = if preview.active { '*' } else { ' ' };
        let mut tags = preview.interests.join(", ");
        if preview.hidden_interests > 0 {
            tags.push_str(&format!(" +{}", preview.hidden_interests));
        }
        let last = match (&preview.last_message, preview.last_message_at) {
            (Some(text), Some(at)) => format!("{} ({})", text, format_relative(at, now)),
            _ => "no messages".to_string(),
        };

        println!(
            "{}{:>2}. {} [{}] {} - {}",
            marker,
            i + 1,
            preview.student_name,
            preview.grade,
            tags,
            last
        );
    }
}

async fn print_events(mut events: mpsc::UnboundedReceiver<ChatEvent>) {
    let mut streaming = false;

    while let Some(event) = events.recv().await {
        match event {
            ChatEvent::Delta { content, .. } => {
                if !streaming {
                    print!("assistant> ");
                    streaming = true;
                }
                print!("{}", content);
                std::io::stdout().flush().ok();
            }
            ChatEvent::Typing { active: true, .. } => println!("(assistant is typing...)"),
            ChatEvent::ThreadSelected { thread_id } => println!("-- thread {} --", thread_id),
            ChatEvent::Notice(notice) => {
                let tag = match notice.level {
                    NoticeLevel::Error => "error",
                    NoticeLevel::Success => "ok",
                    NoticeLevel::Info => "info",
                };
                println!("[{}] {}: {}", tag, notice.title, notice.description);
            }
            ChatEvent::MessageAdded {
                sender: Sender::Ai,
                content,
                ..
            } => {
                if streaming {
                    println!();
                    streaming = false;
                } else {
                    println!("assistant> {}", content);
                }
            }
            ChatEvent::MessageAdded { .. } => {}
            ChatEvent::ThreadsLoaded { count } => println!("Loaded {} thread(s)", count),
            ChatEvent::Typing { .. } => {}
        }
    }
}

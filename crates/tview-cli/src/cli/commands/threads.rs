//! Thread command handlers.

use anyhow::{Context, Result, bail};
use tview_core::api::ApiClient;
use tview_core::model::NewThread;
use tview_core::report;
use tview_core::store::SessionState;
use tview_core::view::{ThreadBody, ThreadNode, reconcile};

use super::finish;

pub async fn list(client: &ApiClient) -> Result<()> {
    let threads = client.list_threads().await.context("list threads")?;
    let view = reconcile(&threads, SessionState::new()).view;
    if let Some(empty) = view.empty_state {
        println!("{empty}");
        return Ok(());
    }
    for node in &view.threads {
        println!("{}", summary_line(node));
    }
    Ok(())
}

pub async fn show(client: &ApiClient, id: &str) -> Result<()> {
    let threads = client.list_threads().await.context("list threads")?;
    let view = reconcile(&threads, SessionState::with_active(id)).view;
    let Some(node) = view.expanded() else {
        bail!("Thread '{id}' not found.");
    };

    println!("{}", summary_line(node));
    match &node.body {
        ThreadBody::Empty(placeholder) => println!("  {placeholder}"),
        ThreadBody::Messages(messages) => {
            for message in messages {
                println!();
                println!("  {}  {}", message.role_label, message.timestamp);
                for line in message.text.lines() {
                    println!("  {line}");
                }
                for citation in &message.citations {
                    println!("    ↳ {citation}");
                }
            }
        }
    }
    Ok(())
}

pub async fn create(
    client: &ApiClient,
    title: String,
    client_slug: String,
    source_slug: String,
) -> Result<()> {
    let request = NewThread {
        title,
        client_slug,
        source_slug,
    };
    let result = client.create_thread(&request).await;
    finish(&result, report::thread_created(&result))
}

pub async fn archive(client: &ApiClient, id: &str, archive: bool) -> Result<()> {
    let result = client.archive_thread(id, archive).await;
    finish(&result, report::thread_archived(id, archive, &result))
}

pub async fn send(client: &ApiClient, id: &str, prompt: &str) -> Result<()> {
    let result = client.send_message(id, prompt).await;
    finish(&result, report::message_sent(id, &result))
}

fn summary_line(node: &ThreadNode) -> String {
    let archived = if node.archived { "  [archived]" } else { "" };
    format!(
        "{}  {}  {} · {}{archived}",
        node.id, node.title, node.client_label, node.source_label
    )
}

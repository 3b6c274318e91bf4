use std::path::Path;

use serde::Serialize;

use crate::app::{AppContext, Result};
use crate::cache::CachePolicy;
use crate::client::ThreadQuery;
use crate::domain::{
    ActionResult, Attachment, Board, NewReply, NewThread, SearchResult, Thread, ThreadDetail,
};

/// Output settings shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
    pub policy: CachePolicy,
}

fn emit<T: Serialize>(output: Output, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}

async fn attachment(path: Option<&Path>) -> Result<Option<Attachment>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok(Some(Attachment { filename, bytes }))
}

pub async fn list_boards(ctx: &AppContext, output: Output) -> Result<()> {
    let boards = ctx.client.get_boards(output.policy).await;
    emit(output, &boards, || render_boards(&boards))
}

pub async fn list_threads(
    ctx: &AppContext,
    output: Output,
    board: &str,
    page: u32,
    catalog: bool,
) -> Result<()> {
    let query = ThreadQuery {
        page,
        catalog,
        policy: output.policy,
    };
    let threads = ctx.client.get_threads(board, &query).await;
    emit(output, &threads, || render_threads(&threads))
}

pub async fn show_thread(ctx: &AppContext, output: Output, board: &str, id: &str) -> Result<()> {
    let detail = ctx.client.get_thread(board, id, output.policy).await;
    emit(output, &detail, || render_thread(&detail))
}

pub async fn search(ctx: &AppContext, output: Output, query: &str) -> Result<()> {
    let results = ctx.client.search(query, output.policy).await?;
    emit(output, &results, || render_search(&results))
}

pub async fn create_thread(
    ctx: &AppContext,
    output: Output,
    board: &str,
    title: &str,
    text: &str,
    image: Option<&Path>,
) -> Result<()> {
    let data = NewThread {
        title: title.to_string(),
        text: text.to_string(),
        image: attachment(image).await?,
    };
    let result = ctx.client.create_thread(board, &data).await?;
    emit(output, &result, || render_action("Thread created", &result))
}

pub async fn reply(
    ctx: &AppContext,
    output: Output,
    board: &str,
    thread: &str,
    text: &str,
    image: Option<&Path>,
) -> Result<()> {
    let data = NewReply {
        text: text.to_string(),
        image: attachment(image).await?,
    };
    let result = ctx.client.reply_to_thread(board, thread, &data).await?;
    emit(output, &result, || render_action("Reply posted", &result))
}

pub fn render_boards(boards: &[Board]) -> String {
    let mut out = String::new();
    for board in boards {
        let marker = if board.is_fallback() { " (built-in)" } else { "" };
        out.push_str(&format!("/{}/ - {}{}\n", board.id, board.name, marker));
        if !board.description.is_empty() {
            out.push_str(&format!("  {}\n", board.description));
        }
    }
    out
}

pub fn render_threads(threads: &[Thread]) -> String {
    if threads.is_empty() {
        return "No threads\n".to_string();
    }

    let mut out = String::new();
    for thread in threads {
        out.push_str(&format!(
            "#{} {} ({} replies)\n  {}\n",
            thread.id, thread.title, thread.reply_count, thread.url
        ));
    }
    out
}

pub fn render_thread(detail: &ThreadDetail) -> String {
    let mut out = format!("#{} {}\n{}\n", detail.id, detail.title, detail.url);
    if let Some(error) = &detail.error {
        out.push_str(&format!("Unavailable: {}\n", error));
        return out;
    }

    if !detail.text.is_empty() {
        out.push_str(&format!("\n{}\n", detail.text));
    }
    for post in &detail.posts {
        out.push_str(&format!("\n>>{}\n{}\n", post.id, post.text));
        if !post.image_url.is_empty() {
            out.push_str(&format!("[{}]\n", post.image_url));
        }
    }
    out.push_str(&format!("\n{} replies\n", detail.reply_count));
    out
}

pub fn render_search(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results\n".to_string();
    }

    let mut out = String::new();
    for result in results {
        out.push_str(&format!("{}\n  {}\n", result.title, result.url));
        if !result.snippet.is_empty() {
            out.push_str(&format!("  {}\n", result.snippet));
        }
    }
    out
}

pub fn render_action(what: &str, result: &ActionResult) -> String {
    let mut out = what.to_string();
    if let Some(id) = &result.id {
        out.push_str(&format!(": {}", id));
    }
    out.push('\n');
    if let Some(url) = &result.url {
        out.push_str(&format!("{}\n", url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BoardOrigin;

    #[test]
    fn test_render_boards_marks_builtin() {
        let mut tech = Board::new("tech", "Tech", BoardOrigin::Link);
        tech.description = "Computers".to_string();
        let boards = vec![tech, Board::new("b", "Random", BoardOrigin::Builtin)];

        let out = render_boards(&boards);
        assert_eq!(out, "/tech/ - Tech\n  Computers\n/b/ - Random (built-in)\n");
    }

    #[test]
    fn test_render_degraded_thread() {
        let detail = ThreadDetail::unavailable(
            "b",
            "9",
            "https://boards.test/board/b/thread/9".to_string(),
            "HTTP 503".to_string(),
        );
        let out = render_thread(&detail);
        assert!(out.starts_with("#9 Thread 9\n"));
        assert!(out.contains("Unavailable: HTTP 503"));
    }

    #[test]
    fn test_render_action() {
        let result = ActionResult {
            success: true,
            id: Some("555".to_string()),
            board: "b".to_string(),
            url: Some("https://boards.test/board/b/thread/555".to_string()),
        };
        assert_eq!(
            render_action("Thread created", &result),
            "Thread created: 555\nhttps://boards.test/board/b/thread/555\n"
        );
    }

    #[test]
    fn test_empty_listings() {
        assert_eq!(render_threads(&[]), "No threads\n");
        assert_eq!(render_search(&[]), "No results\n");
    }

    #[tokio::test]
    async fn test_attachment_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let image = attachment(Some(&path)).await.unwrap().unwrap();
        assert_eq!(image.filename.as_deref(), Some("cat.png"));
        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert!(attachment(None).await.unwrap().is_none());
    }
}

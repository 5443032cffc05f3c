//! Placeholder substitution for post and comment fragments and pages.

mod templates;

use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;

use crate::constants::{is_image_extension, is_video_extension, REDDIT_WEB_BASE};
use crate::reddit::{Comment, Post};

pub use templates::Templates;

static ARCHIVED_PAGE_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="posts.+?</a>"#).unwrap());

fn fill(template: &str, replacements: &[(&str, &str)]) -> String {
    replacements
        .iter()
        .fold(template.to_string(), |html, (placeholder, value)| {
            html.replace(placeholder, value)
        })
}

#[allow(clippy::cast_possible_truncation)]
fn utc(created_utc: f64) -> Result<DateTime<Utc>> {
    if !created_utc.is_finite() {
        anyhow::bail!("invalid timestamp: {created_utc}");
    }
    let secs = created_utc.floor();
    let nanos = ((created_utc - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .with_context(|| format!("timestamp out of range: {created_utc}"))
}

/// Point relative subreddit links at the live site.
fn absolute_links(html: Option<&str>) -> String {
    html.unwrap_or_default()
        .replace(r#"<a href="/r/"#, r#"<a href="https://reddit.com/r/"#)
}

/// Render the index fragment for a post.
///
/// `page_link` is the relative path of the post's standalone page.
///
/// # Errors
///
/// Returns an error if the post's timestamp cannot be represented.
pub fn post_fragment(templates: &Templates, post: &Post, page_link: &str) -> Result<String> {
    let created = utc(post.created_utc)?;
    let subreddit = format!("/r/{}", post.subreddit);
    let user = post
        .author
        .as_ref()
        .map_or_else(|| "[deleted]".to_string(), |name| format!("/u/{name}"));
    let reddit_link = format!("{REDDIT_WEB_BASE}{}", post.permalink);
    let timestamp = created.format("%Y-%m-%d %H:%M:%S").to_string();
    let date = created.format("%d %B, %Y").to_string();
    let body = absolute_links(post.selftext_html.as_deref());

    Ok(fill(
        &templates.post_div,
        &[
            ("<!--id-->", post.id.as_str()),
            ("<!--subreddit-->", subreddit.as_str()),
            ("<!--user-->", user.as_str()),
            ("<!--link-->", page_link),
            ("<!--reddit-link-->", reddit_link.as_str()),
            ("<!--content-link-->", post.url.as_str()),
            ("<!--timestamp-->", timestamp.as_str()),
            ("<!--date-->", date.as_str()),
            ("<!--title-->", post.title.as_str()),
            ("<!--body-->", body.as_str()),
        ],
    ))
}

/// Insert a preview for a downloaded media file.
///
/// Files that are neither images nor videos leave the fragment unchanged.
#[must_use]
pub fn add_media_preview(fragment: &str, media: &str) -> String {
    let extension = media.rsplit_once('.').map_or("", |(_, ext)| ext);
    let location = format!("media/{media}");

    let preview = if is_image_extension(extension) {
        format!(r#"<img src="{location}">"#)
    } else if is_video_extension(extension) {
        format!(r#"<video controls><source src="{location}"></video>"#)
    } else {
        return fragment.to_string();
    };

    fragment.replace("<!--preview-->", &preview)
}

fn comment_div(
    templates: &Templates,
    comment: &Comment,
    children: &str,
    op: Option<&str>,
) -> Result<String> {
    let created = utc(comment.created_utc)?;
    let user = match comment.author.as_deref() {
        Some(name) if Some(name) == op => format!(r#"<span class="op">/u/{name}</span>"#),
        Some(name) => format!("/u/{name}"),
        None => "[deleted]".to_string(),
    };
    let score = comment.score.to_string();
    let link = format!("{REDDIT_WEB_BASE}{}", comment.permalink);
    let timestamp = created.format("%Y-%m-%d %H:%M:%S").to_string();
    let date = created.format("%H:%M - %d %B, %Y").to_string();
    let body = absolute_links(comment.body_html.as_deref());

    Ok(fill(
        &templates.comment_div,
        &[
            ("<!--id-->", comment.id.as_str()),
            ("<!--user-->", user.as_str()),
            ("<!--score-->", score.as_str()),
            ("<!--link-->", link.as_str()),
            ("<!--timestamp-->", timestamp.as_str()),
            ("<!--date-->", date.as_str()),
            ("<!--body-->", body.as_str()),
            ("<!--children-->", children),
        ],
    ))
}

/// Render a comment and its whole reply tree.
///
/// Uses an explicit stack, so thread depth is bounded only by memory.
///
/// # Errors
///
/// Returns an error if any comment in the tree has an invalid timestamp.
pub fn comment_tree(templates: &Templates, root: &Comment, op: Option<&str>) -> Result<String> {
    enum Step<'a> {
        Enter(&'a Comment),
        Exit(&'a Comment),
    }

    let mut stack = vec![Step::Enter(root)];
    let mut rendered: Vec<String> = Vec::new();

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(comment) => {
                stack.push(Step::Exit(comment));
                stack.extend(comment.replies.iter().rev().map(Step::Enter));
            }
            Step::Exit(comment) => {
                // Children finished in order, so they sit at the end.
                let children = rendered.split_off(rendered.len() - comment.replies.len());
                rendered.push(comment_div(templates, comment, &children.join("\n"), op)?);
            }
        }
    }

    Ok(rendered.pop().unwrap_or_default())
}

/// Render the standalone page for a post from its index fragment.
///
/// # Errors
///
/// Returns an error if a comment cannot be rendered.
pub fn post_page(
    templates: &Templates,
    post: &Post,
    fragment: &str,
    comments: &[Comment],
) -> Result<String> {
    let adjusted = fragment
        .replace("h2>", "h1>")
        .replace(r#"<img src="media/"#, r#"<img src="../media/"#)
        .replace(r#"<source src="media/"#, r#"<source src="../media/"#);
    let adjusted = ARCHIVED_PAGE_LINK.replace_all(&adjusted, "").into_owned();

    let op = post.author.as_deref();
    let comments_html = comments
        .iter()
        .map(|comment| comment_tree(templates, comment, op))
        .collect::<Result<Vec<_>>>()?
        .join("\n");

    Ok(fill(
        &templates.post_page,
        &[
            ("<style></style>", inline_style(templates).as_str()),
            ("<script></script>", inline_script(templates).as_str()),
            ("<!--title-->", post.title.as_str()),
            ("<!--post-->", adjusted.as_str()),
            ("<!--comments-->", comments_html.as_str()),
        ],
    ))
}

/// Render a mode's index page around its fragments.
#[must_use]
pub fn index_page(
    template: &str,
    templates: &Templates,
    posts: &[String],
    comments: &[String],
) -> String {
    fill(
        template,
        &[
            ("<style></style>", inline_style(templates).as_str()),
            ("<script></script>", inline_script(templates).as_str()),
            ("<!--posts-->", posts.join("\n").as_str()),
            ("<!--comments-->", comments.join("\n").as_str()),
        ],
    )
}

fn inline_style(templates: &Templates) -> String {
    format!("<style>\n{}\n</style>", templates.style)
}

fn inline_script(templates: &Templates) -> String {
    format!("<script>\n{}\n</script>", templates.script)
}

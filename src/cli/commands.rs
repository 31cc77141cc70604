//! Command implementations for the board CLI.
//!
//! Every command runs as the local operator, who holds admin rights but
//! cannot author content.

use crate::board::{
    url_identifier, Actor, BoardService, BoardStore, CategoryId, ForumPage, Role,
};
use crate::cli::utils::{format_timestamp, write_json};
use crate::Result;
use serde_json::json;
use std::io::Write;
use tracing::info;

/// Execute `category add`
pub fn category_add<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    name: &str,
    description: Option<String>,
    sort_order: i32,
) -> Result<()> {
    let category = service.create_category(&Actor::Operator, name, description, sort_order)?;
    writeln!(out, "Created category '{}' ({})", category.name, category.id)?;
    Ok(())
}

/// Execute `category list`
pub fn category_list<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    as_json: bool,
) -> Result<()> {
    let index = service.board_index()?;

    if as_json {
        let value: Vec<_> = index
            .iter()
            .map(|listing| {
                json!({
                    "category": listing.category,
                    "forums": listing.forums,
                })
            })
            .collect();
        return write_json(out, &value);
    }

    if index.is_empty() {
        writeln!(out, "No categories")?;
        return Ok(());
    }

    for listing in &index {
        let category = &listing.category;
        writeln!(out, "{} [{}]", category.name, category.id)?;
        if let Some(description) = &category.description {
            writeln!(out, "    {}", description)?;
        }
        for forum in &listing.forums {
            let lock = if forum.is_locked { " (locked)" } else { "" };
            writeln!(out, "  /{}  {}{}", url_identifier(forum), forum.name, lock)?;
        }
    }
    Ok(())
}

/// Execute `category delete`
pub fn category_delete<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    id: &CategoryId,
) -> Result<()> {
    service.delete_category(&Actor::Operator, id)?;
    writeln!(out, "Deleted category {}", id)?;
    Ok(())
}

/// Execute `forum add`
pub fn forum_add<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    category_id: &CategoryId,
    name: &str,
    description: Option<String>,
    sort_order: i32,
) -> Result<()> {
    let forum = service.create_forum(&Actor::Operator, category_id, name, description, sort_order)?;
    writeln!(
        out,
        "Created forum '{}' at /{}",
        forum.name,
        url_identifier(&forum)
    )?;
    Ok(())
}

/// Execute `forum show`
pub fn forum_show<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    identifier: &str,
    cursor: Option<&str>,
    as_json: bool,
) -> Result<()> {
    let page = service.forum_page(identifier, cursor)?;

    if as_json {
        return write_json(out, &forum_page_json(&page));
    }

    let forum = &page.forum;
    writeln!(out, "{}", forum.name)?;
    writeln!(out, "  id:         {}", forum.id)?;
    writeln!(out, "  short code: {}", forum.short_code.as_deref().unwrap_or("-"))?;
    if let Some(category) = &page.category {
        writeln!(out, "  category:   {}", category.name)?;
    }
    if let Some(description) = &forum.description {
        writeln!(out, "  about:      {}", description)?;
    }
    writeln!(out, "  locked:     {}", forum.is_locked)?;
    writeln!(out, "  created:    {}", format_timestamp(forum.created_at))?;
    writeln!(out, "  threads:    {}", page.threads.total_count)?;

    for summary in &page.threads.items {
        let thread = &summary.thread;
        let mut flags = String::new();
        if thread.is_pinned {
            flags.push_str("[pinned] ");
        }
        if thread.is_locked {
            flags.push_str("[locked] ");
        }
        writeln!(
            out,
            "  {}{}  ({} posts, {} views, last active {})",
            flags,
            thread.title,
            summary.post_count,
            thread.view_count,
            format_timestamp(thread.updated_at)
        )?;
    }
    if let Some(next) = &page.threads.next_cursor {
        writeln!(out, "  more: --cursor {}", next.encode())?;
    }
    Ok(())
}

fn forum_page_json(page: &ForumPage) -> serde_json::Value {
    let threads: Vec<_> = page
        .threads
        .items
        .iter()
        .map(|summary| {
            json!({
                "thread": summary.thread,
                "post_count": summary.post_count,
            })
        })
        .collect();
    json!({
        "forum": page.forum,
        "url_identifier": url_identifier(&page.forum),
        "category": page.category,
        "threads": threads,
        "total_threads": page.threads.total_count,
        "next_cursor": page.threads.next_cursor.as_ref().map(|c| c.encode()),
    })
}

/// Execute `forum rename`
pub fn forum_rename<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    identifier: &str,
    name: &str,
) -> Result<()> {
    let forum = service.rename_forum(&Actor::Operator, identifier, name)?;
    writeln!(
        out,
        "Renamed forum to '{}', now at /{}",
        forum.name,
        url_identifier(&forum)
    )?;
    Ok(())
}

/// Execute `forum lock` and `forum unlock`
pub fn forum_lock<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    identifier: &str,
    locked: bool,
) -> Result<()> {
    let forum = service.set_forum_locked(&Actor::Operator, identifier, locked)?;
    let state = if forum.is_locked { "Locked" } else { "Unlocked" };
    writeln!(out, "{} forum /{}", state, url_identifier(&forum))?;
    Ok(())
}

/// Execute `forum delete`
pub fn forum_delete<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    identifier: &str,
) -> Result<()> {
    service.delete_forum(&Actor::Operator, identifier)?;
    writeln!(out, "Deleted forum {}", identifier)?;
    Ok(())
}

/// Execute `shortcode`: print the code a forum would get, writing nothing
pub fn short_code<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    name: &str,
    category_id: Option<&CategoryId>,
) -> Result<()> {
    // Without a category the preview uses an id that matches no category,
    // so no prefix is available.
    let category_id = category_id.copied().unwrap_or_default();
    match service.preview_short_code(name, &category_id)? {
        Some(code) => writeln!(out, "{}", code)?,
        None => writeln!(out, "(none: forum would be addressed by id)")?,
    }
    Ok(())
}

/// Execute `user add`
pub fn user_add<S: BoardStore, W: Write>(
    service: &BoardService<S>,
    out: &mut W,
    username: &str,
    admin: bool,
) -> Result<()> {
    let role = if admin { Role::Admin } else { Role::User };
    let user = service.register_user(username, role)?;
    info!(user = %user.id, role = %user.role, "Registered user from CLI");
    writeln!(out, "Created {} '{}' ({})", user.role, user.username, user.id)?;
    Ok(())
}

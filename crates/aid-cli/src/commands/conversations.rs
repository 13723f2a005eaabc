use anyhow::anyhow;

use aid_feed::{AssignedCount, ConversationList};
use aid_types::ConversationId;

use crate::App;

pub async fn list(app: &App) -> anyhow::Result<()> {
    let session = app.sessions.require()?;
    let mut list = ConversationList::new(app.api.clone(), Some(session.user_id()));
    if !list.refresh().await {
        return Err(anyhow!("could not load conversations"));
    }
    let Some(board) = list.board() else {
        return Ok(());
    };

    let rows = board.rows();
    if rows.is_empty() {
        println!("No conversations yet");
        return Ok(());
    }

    for row in rows {
        let mut flags = Vec::new();
        if row.completed {
            flags.push("complete".to_string());
        }
        if row.republished {
            flags.push("republished".to_string());
        }
        if row.actions.offered {
            let helpers = match row.assigned {
                AssignedCount::Explicit(n) => format!("{} helpers", n),
                AssignedCount::Derived(n) => format!("{} helpers seen", n),
            };
            flags.push(helpers);
            if row.actions.republish {
                flags.push("can republish".to_string());
            }
        }

        println!(
            "[{}] request #{} with user {}  {}  {}",
            row.conversation_id,
            row.help_request_id,
            row.counterpart,
            row.updated_at.format("%Y-%m-%d %H:%M"),
            flags.join(", ")
        );
        if let Some(last) = &row.last_message {
            println!("      {}", last);
        }
    }
    Ok(())
}

pub async fn complete(app: &App, conversation_id: ConversationId) -> anyhow::Result<()> {
    let mut list = loaded(app).await?;
    list.mark_complete(conversation_id).await?;
    println!("Marked complete");
    Ok(())
}

pub async fn republish(app: &App, conversation_id: ConversationId) -> anyhow::Result<()> {
    let mut list = loaded(app).await?;
    list.republish(conversation_id).await?;
    println!("Republished");
    Ok(())
}

async fn loaded(app: &App) -> anyhow::Result<ConversationList<aid_api::ApiClient>> {
    let session = app.sessions.require()?;
    let mut list = ConversationList::new(app.api.clone(), Some(session.user_id()));
    if !list.refresh().await {
        return Err(anyhow!("could not load conversations"));
    }
    Ok(list)
}

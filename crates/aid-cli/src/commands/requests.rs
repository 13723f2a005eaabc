use anyhow::bail;
use tokio_util::sync::CancellationToken;

use aid_api::HelpRequestApi;
use aid_feed::stats::watch_completed_count;
use aid_feed::{HelpRequestBoard, HelpRequestForm, NoticeKind};
use aid_types::HelpRequestId;

use super::SubmitArgs;
use crate::App;

pub async fn list(app: &App) -> anyhow::Result<()> {
    let session = app.sessions.require()?;
    let requests = app.api.list_help_requests(&session.token).await?;
    let requests = aid_feed::requests::visible_requests(requests);

    if requests.is_empty() {
        println!("No open requests");
        return Ok(());
    }
    for r in &requests {
        println!(
            "#{:<5} {:<14} {}  ({:.4}, {:.4})",
            r.id, r.request_type, r.title, r.latitude, r.longitude
        );
        if !r.description.is_empty() {
            println!("       {}", r.description);
        }
    }
    Ok(())
}

pub async fn submit(app: &App, args: SubmitArgs) -> anyhow::Result<()> {
    let session = app.sessions.require()?;
    let mut board = HelpRequestBoard::new(app.api.clone(), session);

    let form = HelpRequestForm {
        title: args.title,
        request_type: args.request_type,
        description: args.description,
        latitude: args.lat,
        longitude: args.lng,
    };
    let notice = board.submit(&form).await;
    match notice.kind {
        NoticeKind::Success => {
            println!("{}", notice.text);
            Ok(())
        }
        NoticeKind::Error => bail!("{}", notice.text),
    }
}

pub async fn assign(app: &App, help_request_id: HelpRequestId) -> anyhow::Result<()> {
    let session = app.sessions.require()?;
    let mut board = HelpRequestBoard::new(app.api.clone(), session);

    let conversation_id = board.assign(help_request_id).await?;
    println!(
        "Assigned. Chat with the requester using `aid chat {}`",
        conversation_id
    );
    Ok(())
}

pub async fn stats(app: &App, watch: bool) -> anyhow::Result<()> {
    if !watch {
        println!("{} requests completed", app.api.completed_requests_count().await?);
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let mut count = watch_completed_count(
        app.api.clone(),
        aid_feed::stats::COMPLETED_POLL_INTERVAL,
        shutdown.clone(),
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = count.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(n) = *count.borrow_and_update() {
                    println!("{} requests completed", n);
                }
            }
        }
    }
    shutdown.cancel();
    Ok(())
}

use anyhow::bail;

use aid_types::api::{Credentials, SignupForm};

use super::{LoginArgs, SignupArgs};
use crate::App;

pub async fn login(app: &App, args: LoginArgs) -> anyhow::Result<()> {
    let credentials = Credentials {
        email: args.email,
        password: args.password,
    };
    let session = match app.api.login(credentials).await {
        Ok(session) => session,
        Err(e) => bail!("{}", e.user_message()),
    };

    app.sessions.save(&session)?;
    println!("Logged in as {}", session.user.display_name());
    Ok(())
}

pub async fn signup(app: &App, args: SignupArgs) -> anyhow::Result<()> {
    let password_confirmation = args
        .password_confirmation
        .unwrap_or_else(|| args.password.clone());
    let form = SignupForm {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email.clone(),
        password: args.password,
        password_confirmation,
        photo: args.photo,
    };

    if let Err(e) = app.api.signup(form).await {
        bail!("{}", e.user_message());
    }
    println!("Account created for {}. You can now log in.", args.email);
    Ok(())
}

pub async fn logout(app: &App) -> anyhow::Result<()> {
    let Some(session) = app.sessions.load()? else {
        println!("Not logged in");
        return Ok(());
    };

    // The local session is only forgotten once the server has ended it.
    app.api.logout(&session.token).await?;
    app.sessions.clear()?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(app: &App) -> anyhow::Result<()> {
    match app.sessions.load()? {
        Some(session) => {
            let email = session.user.email.as_deref().unwrap_or("no email");
            println!(
                "{} <{}> (user {})",
                session.user.display_name(),
                email,
                session.user_id()
            );
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

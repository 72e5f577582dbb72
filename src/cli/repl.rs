use anyhow::Result;
use std::io::{self, Write};

use crate::auth::AuthSession;
use crate::chat::ChatEvent;
use crate::core::model::{builtin_models, find_model};

fn prompt_line(prompt: &str) -> Result<Option<String>> {
    eprint!("{prompt}");
    io::stderr().flush().ok();

    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => Ok(None),
        Ok(_) => Ok(Some(input.trim().to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Mock sign-in: any credentials are accepted.
pub async fn sign_in(auth: &mut AuthSession) -> Result<()> {
    println!("Sign in to Arceus (any credentials work for now).");
    let email = loop {
        match prompt_line("Email: ")? {
            None => anyhow::bail!("sign-in aborted"),
            Some(email) if email.contains('@') => break email,
            Some(_) => eprintln!("Please enter an email address."),
        }
    };
    let password = prompt_line("Password: ")?.unwrap_or_default();
    auth.sign_in(&email, &password).await?;
    println!("Signed in as {email}.\n");
    Ok(())
}

pub async fn onboarding(auth: &mut AuthSession) -> Result<()> {
    let display_name = prompt_line("Display name (enter to skip): ")?;
    auth.complete_onboarding(display_name.as_deref()).await?;
    Ok(())
}

pub async fn run(mut app: super::App) -> Result<()> {
    println!("\x1b[1mArceus\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    println!("Model: \x1b[36m{}\x1b[0m", app.chat.model().await.display_name);
    println!("Type \x1b[33m/help\x1b[0m for commands, \x1b[33mCtrl-D\x1b[0m to exit.\n");

    loop {
        let input = match prompt_line("\x1b[32;1marceus>\x1b[0m ")? {
            None => {
                // EOF (Ctrl-D)
                println!("\nGoodbye!");
                break;
            }
            Some(input) => input,
        };
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match handle_command(&input, &mut app).await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(e) => {
                    eprintln!("\x1b[31mCommand error: {e}\x1b[0m");
                    continue;
                }
            }
        }

        if app.chat.current_session().await.is_none() {
            eprintln!("No active chat. Start one with \x1b[33m/new\x1b[0m.");
            continue;
        }

        let Some(mut rx) = app.chat.send(&input).await else {
            continue;
        };
        eprintln!("\x1b[90mGenerating response...\x1b[0m");
        while let Some(event) = rx.recv().await {
            match event {
                ChatEvent::Started { .. } => {}
                ChatEvent::Reply { message } => {
                    println!("\n{}\n", message.content);
                    break;
                }
                ChatEvent::Cancelled { .. } => break,
                ChatEvent::Error { error } => {
                    eprintln!("\x1b[31mError: {error}\x1b[0m");
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn handle_command(input: &str, app: &mut super::App) -> Result<bool> {
    let (command, arg) = match input.split_once(' ') {
        Some((c, a)) => (c, a.trim()),
        None => (input, ""),
    };

    match command {
        "/help" | "/h" => {
            println!("\x1b[1mCommands:\x1b[0m");
            println!("  /help            Show this help");
            println!("  /new [title]     Start a new chat");
            println!("  /sessions        List recent chats");
            println!("  /switch <n>      Switch to the n-th listed chat");
            println!("  /model [name]    Show or change the selected model");
            println!("  /models          List available models");
            println!("  /whoami          Show the signed-in user");
            println!("  /signout         Sign out and exit");
            println!("  /exit            Exit");
            Ok(true)
        }
        "/exit" | "/quit" | "/q" => {
            println!("Goodbye!");
            Ok(false)
        }
        "/new" | "/n" => {
            let title = if arg.is_empty() { "New Chat" } else { arg };
            let session = app.chat.new_chat(title).await?;
            println!("Started \x1b[36m{}\x1b[0m ({})", session.title, session.id);
            Ok(true)
        }
        "/sessions" | "/s" => {
            let sessions = app.chat.sessions().await;
            if sessions.is_empty() {
                println!("No chats yet. Start one with /new.");
                return Ok(true);
            }
            let current = app.chat.current_session().await.map(|s| s.id);
            for (i, s) in sessions.iter().enumerate() {
                let marker = if Some(&s.id) == current.as_ref() { " *" } else { "" };
                println!(
                    "  {:>2}. {}{}  \x1b[90m{}\x1b[0m",
                    i + 1,
                    s.title,
                    marker,
                    s.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(true)
        }
        "/switch" | "/sw" => {
            let sessions = app.chat.sessions().await;
            let index: usize = arg
                .parse()
                .map_err(|_| anyhow::anyhow!("usage: /switch <n>"))?;
            let session = sessions
                .get(index.wrapping_sub(1))
                .ok_or_else(|| anyhow::anyhow!("no chat at position {index}"))?;
            app.chat.select_session(&session.id).await?;
            println!("Switched to \x1b[36m{}\x1b[0m", session.title);
            for message in app.chat.messages().await {
                let who = match message.role {
                    crate::core::message::MessageRole::User => "\x1b[32myou\x1b[0m",
                    crate::core::message::MessageRole::Assistant => "\x1b[36massistant\x1b[0m",
                };
                println!("{who}: {}", message.content);
            }
            Ok(true)
        }
        "/model" => {
            if arg.is_empty() {
                let model = app.chat.model().await;
                println!("Model: {} ({})", model.display_name, model.id);
            } else {
                let model = find_model(arg)
                    .ok_or_else(|| anyhow::anyhow!("unknown model: {arg}, see /models"))?;
                println!("Model set to {}", model.display_name);
                app.chat.set_model(model).await;
            }
            Ok(true)
        }
        "/models" => {
            for m in builtin_models() {
                println!("  {:<24} \x1b[90m{}\x1b[0m", m.display_name, m.description);
            }
            Ok(true)
        }
        "/whoami" => {
            match (app.auth.user(), app.auth.profile()) {
                (Some(user), Some(profile)) => {
                    println!("{} <{}>", profile.display_name, user.email);
                }
                _ => println!("Not signed in."),
            }
            Ok(true)
        }
        "/signout" => {
            app.auth.sign_out().await?;
            println!("Signed out.");
            Ok(false)
        }
        _ => {
            eprintln!("Unknown command: {command}. Type /help for available commands.");
            Ok(true)
        }
    }
}

use std::time::Duration;

use anyhow::Context;
use client::api::users;
use client::notify::submission_key;
use client::{ClientState, ToastLevel};
use common::CreateSubmissionRequest;
use console::style;
use dialoguer::Password;
use tracing::info;

use crate::terminal::ConsoleNotifier;

const WAIT_STEP: Duration = Duration::from_millis(100);

pub async fn login(
    state: &ClientState,
    account: &str,
    password: Option<String>,
) -> anyhow::Result<bool> {
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };

    match users::login(&state.request, account, &password).await {
        Ok(user) => {
            println!(
                "{} signed in as {} ({})",
                style("✓").green().bold(),
                style(&user.username).bold(),
                user.group
            );
            Ok(true)
        }
        Err(e) => {
            eprintln!("{} {e}", style("✗").red().bold());
            Ok(false)
        }
    }
}

pub async fn logout(state: &ClientState) -> anyhow::Result<bool> {
    users::logout(&state.request).await;
    println!("{} signed out", style("✓").green().bold());
    Ok(true)
}

pub async fn whoami(state: &ClientState) -> anyhow::Result<bool> {
    if !state.session.is_authenticated() {
        println!("not signed in");
        return Ok(false);
    }
    match users::profile(&state.request).await? {
        Some(user) => {
            println!("{} ({}, id {})", style(&user.username).bold(), user.group, user.id);
            if !user.nickname.is_empty() && user.nickname != user.username {
                println!("  nickname: {}", user.nickname);
            }
            if let Some(email) = &user.email {
                println!("  email:    {email}");
            }
            Ok(true)
        }
        None => {
            println!("session expired");
            Ok(false)
        }
    }
}

pub async fn submit(
    state: &ClientState,
    notifier: &ConsoleNotifier,
    request: &CreateSubmissionRequest,
) -> anyhow::Result<bool> {
    let submission = match state.submit_flag(request).await {
        Ok(submission) => submission,
        Err(e) => {
            eprintln!("{} {e}", style("✗").red().bold());
            return Ok(false);
        }
    };
    println!(
        "submission {} {}",
        style(format!("#{}", submission.id)).bold(),
        submission.status
    );

    if !wait_for(state, &[submission.id]).await? {
        return Ok(false);
    }
    Ok(solved(notifier, submission.id))
}

pub async fn watch(
    state: &ClientState,
    notifier: &ConsoleNotifier,
    ids: &[i64],
) -> anyhow::Result<bool> {
    let mut found = Vec::with_capacity(ids.len());
    for &id in ids {
        match state.watch(id).await {
            Ok(Some(submission)) => found.push(submission.id),
            Ok(None) => eprintln!(
                "{} no submission {}",
                style("!").yellow().bold(),
                style(format!("#{id}")).bold()
            ),
            Err(e) => eprintln!("{} #{id}: {e}", style("✗").red().bold()),
        }
    }
    if found.is_empty() {
        return Ok(false);
    }

    if !wait_for(state, &found).await? {
        return Ok(false);
    }
    Ok(found.len() == ids.len() && found.iter().all(|&id| solved(notifier, id)))
}

/// Block until none of `ids` is tracked. Returns false on Ctrl-C.
async fn wait_for(state: &ClientState, ids: &[i64]) -> anyhow::Result<bool> {
    let mut step = tokio::time::interval(WAIT_STEP);
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                state.shutdown();
                info!(pending = state.tracker.len(), "Interrupted, verdicts not awaited");
                return Ok(false);
            }
            _ = step.tick() => {}
        }
        if ids.iter().all(|&id| !state.tracker.contains(id)) {
            return Ok(true);
        }
    }
}

fn solved(notifier: &ConsoleNotifier, id: i64) -> bool {
    notifier
        .latest(&submission_key(id))
        .is_some_and(|toast| toast.level == ToastLevel::Success)
}

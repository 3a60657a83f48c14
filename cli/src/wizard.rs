//! Interactive purchase wizard

use std::io::{self, Write};
use std::time::Duration;

use nr_core::domain::entities::{Capability, Step};
use nr_core::errors::FlowError;
use nr_core::services::purchase::{
    NotificationSink, PurchaseFlow, RetryKind, RetryMenuOption, VerificationApi, WalletApi,
};

/// Run one purchase session end to end
pub async fn run<A, W, N>(flow: &PurchaseFlow<A, W, N>) -> anyhow::Result<()>
where
    A: VerificationApi + 'static,
    W: WalletApi,
    N: NotificationSink + 'static,
{
    flow.open().await;

    let balance = flow.balance().await?;
    println!("Wallet balance: {} credits\n", balance);

    // Country
    let countries = flow.list_countries().await?;
    for (i, country) in countries.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, country.name, country.code);
    }
    let country = pick(&countries, "Country", |c| c.code.clone())?;
    flow.select_country(country).await?;

    // Service
    let services = flow.list_services().await?;
    for (i, service) in services.iter().enumerate() {
        println!("  {}. {} ({} credits)", i + 1, service.name, service.cost);
    }
    let service = pick(&services, "Service", |s| s.name.clone())?;
    let carrier = optional(&prompt("Carrier filter (enter to skip)")?);
    let area_code = optional(&prompt("Area-code filter (enter to skip)")?);
    flow.select_service(service, carrier, area_code).await?;

    // Capability
    let answer = prompt("Delivery [sms/voice] (default sms)")?;
    if answer.eq_ignore_ascii_case("voice") {
        flow.select_capability(Capability::Voice).await?;
    }

    // Confirm
    flow.go_to_step(Step::Confirm).await?;
    let session = flow.session().await;
    println!(
        "\nThis will cost {} credits for a {} verification.",
        session.quoted_cost,
        session.capability.as_str()
    );
    if !confirmed(&prompt("Purchase? [y/N]")?) {
        flow.close().await;
        return Ok(());
    }

    if let Err(err) = flow.submit_purchase().await {
        // The sink already showed the failure; transient errors are worth
        // one manual retry prompt.
        if err.is_transient() && confirmed(&prompt("Network problem. Try again? [y/N]")?) {
            flow.submit_purchase().await?;
        } else {
            flow.close().await;
            return Err(err.into());
        }
    }

    wait_for_code(flow).await?;
    flow.close().await;
    Ok(())
}

/// Watch the session until it finishes, driving the retry menu on timeout
async fn wait_for_code<A, W, N>(flow: &PurchaseFlow<A, W, N>) -> anyhow::Result<()>
where
    A: VerificationApi + 'static,
    W: WalletApi,
    N: NotificationSink + 'static,
{
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let session = flow.session().await;
        match session.step {
            Step::Done | Step::Cancelled => return Ok(()),
            Step::AwaitingCode if session.timed_out => {
                if !retry_menu(flow).await? {
                    return Ok(());
                }
            }
            _ => {}
        }
    }
}

/// Present the post-timeout menu. Returns false when the session ended.
async fn retry_menu<A, W, N>(flow: &PurchaseFlow<A, W, N>) -> anyhow::Result<bool>
where
    A: VerificationApi + 'static,
    W: WalletApi,
    N: NotificationSink + 'static,
{
    let options = flow.retry_options().await;
    println!("\nWhat next?");
    for (i, option) in options.iter().enumerate() {
        let label = match option {
            RetryMenuOption::SwitchCapability => "Switch between SMS and voice",
            RetryMenuOption::SameNumber => "Keep waiting on the same number",
            RetryMenuOption::NewNumber => "Try a new number",
            RetryMenuOption::CancelAndRefund => "Cancel and refund",
        };
        println!("  {}. {}", i + 1, label);
    }

    let choice = prompt("Choice")?;
    let index: usize = choice.trim().parse().unwrap_or(0);
    let Some(option) = index.checked_sub(1).and_then(|i| options.get(i)) else {
        println!("Unrecognised choice.");
        return Ok(true);
    };

    match option {
        RetryMenuOption::SwitchCapability => flow.retry(RetryKind::SwitchCapability).await?,
        RetryMenuOption::SameNumber => flow.retry(RetryKind::SameNumber).await?,
        RetryMenuOption::NewNumber => flow.retry(RetryKind::NewNumber).await?,
        RetryMenuOption::CancelAndRefund => {
            // Destructive: confirm before issuing the refund call.
            if confirmed(&prompt("Cancel this verification and refund? [y/N]")?) {
                match flow.cancel().await {
                    Ok(_) => return Ok(false),
                    Err(FlowError::AlreadyTerminal) => return Ok(false),
                    Err(err) => {
                        println!("Cancellation failed: {}. Still waiting.", err);
                    }
                }
            }
        }
    }
    Ok(true)
}

fn pick<I>(items: &[I], label: &str, key: impl Fn(&I) -> String) -> anyhow::Result<String> {
    let answer = prompt(label)?;
    if let Ok(index) = answer.trim().parse::<usize>() {
        if let Some(item) = index.checked_sub(1).and_then(|i| items.get(i)) {
            return Ok(key(item));
        }
    }
    Ok(answer)
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn optional(answer: &str) -> Option<String> {
    if answer.is_empty() {
        None
    } else {
        Some(answer.to_string())
    }
}

fn confirmed(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

//! End-to-end tour of the redaction engine.
//!
//! Redacts a support-ticket style message locally, runs a batch, registers
//! a custom pattern, degrades through a failing provider, and finally
//! unmasks everything from the token ledgers.
//!
//! ```bash
//! cargo run --example redact_and_unmask
//! ```

use std::sync::Arc;

use redaction::testing::MockProvider;
use redaction::{unmask, RedactionOptions, RedactionService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,redaction=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Local-only redaction with the builtin patterns
    let service = RedactionService::new(RedactionOptions::default())?;
    let ticket = "Customer Jane (jane.doe@example.com, 555-123-4567) reports \
                  card 4111 1111 1111 1111 was charged twice. SSN on file: 123-45-6789.";

    let result = service.redact(ticket).await?;
    println!("--- redacted ---");
    println!("{}", result.redacted_text);
    println!();
    println!("ledger ({} tokens):", result.tokens.len());
    for token in &result.tokens {
        println!("  {} -> {} [{}]", token.placeholder, token.original_value, token.category);
    }
    println!();

    // Batches keep their order no matter which text finishes first
    let batch = [
        "first: reach me at x@y.com",
        "second: nothing sensitive here",
        "third: fax 555-987-6543",
    ];
    let results = service.redact_many(&batch).await?;
    println!("--- batch ---");
    for r in &results {
        println!("{}", r.redacted_text);
    }
    println!();

    // Custom patterns get their own category label
    let with_custom = RedactionService::builder()
        .with_custom_pattern("EMPLOYEE_ID", r"\bEMP-\d{6}\b")
        .build()?;
    let custom_result = with_custom
        .redact("escalated by EMP-204817 during the night shift")
        .await?;
    println!("--- custom pattern ---");
    println!("{}", custom_result.redacted_text);
    println!();

    // A failing provider degrades the result instead of losing the call
    let flaky = Arc::new(MockProvider::new("cloud-pii").fail_with_transient());
    let degraded_service = RedactionService::builder()
        .with_options(RedactionOptions::default().with_cloud_detection(true))
        .with_provider(flaky)
        .build()?;
    let degraded = degraded_service.redact("mail ops@example.com").await?;
    println!("--- degraded ---");
    println!("{}", degraded.redacted_text);
    for warning in &degraded.warnings {
        println!("  warning from {}: {}", warning.provider, warning.detail);
    }
    println!();

    // The ledger restores the original exactly
    let restored = unmask(&result.redacted_text, &result.tokens)?;
    println!("--- restored ---");
    println!("{}", restored);
    assert_eq!(restored, ticket);

    Ok(())
}

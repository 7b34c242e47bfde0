//! Minimal walkthrough against a local server: database lifecycle plus
//! document CRUD.
//!
//! Run with a server listening on localhost:5984:
//! `cargo run --example basic`

use davenport_rs::{Client, Connection, DocParams};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "davenport=info".into()),
        )
        .init();

    let client = Client::new(
        Connection::default()
            .credentials("admin", "password")
            .default_database("demo")
            .logging(true),
    );

    let server = client.info().await?;
    println!("connected: {:?} {:?}", server.couchdb, server.version);

    if !client.database_exists(None).await? {
        client.create_database(None).await?;
        println!("created database 'demo'");
    }

    let ack = client
        .put_document(None, "sofa-1", json!({"kind": "sofa", "seats": 3}))
        .await?;
    println!("stored sofa-1 at rev {:?}", ack.rev);

    let doc = client.get_document(None, "sofa-1", &DocParams::new()).await?;
    println!("fetched: {}", doc);

    if let Some(rev) = ack.rev {
        client.delete_document(None, "sofa-1", &rev).await?;
        println!("deleted sofa-1");
    }

    client.delete_database(None).await?;
    println!("dropped database 'demo'");

    Ok(())
}
